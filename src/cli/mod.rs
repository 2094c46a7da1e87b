//! Command-line interface for salesload.
//!
//! Provides the `load` and `generate` commands.

mod commands;

pub use commands::{parse_cli, run, run_with_cli, Cli, Commands, GenerateArgs, LoadArgs};
