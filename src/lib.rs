//! salesload: batch loader for per-till retail sales exports.
//!
//! Discovers `<shop>_<cash>.csv` files, loads each one into a relational
//! store inside its own transaction and archives it once committed. A seeded
//! generator produces synthetic exports for testing.

pub mod cli;
pub mod config;
pub mod error;
pub mod generator;
pub mod ingest;
pub mod storage;

// Re-export commonly used error types
pub use config::ConfigError;
pub use error::{ArchiveError, GeneratorError, ParseError, RunError};
pub use storage::DatabaseError;
