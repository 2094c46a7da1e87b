//! Till export ingestion.
//!
//! This module turns per-till CSV exports into committed rows in the sales
//! store and archives each file once its batch is durable.
//!
//! # Pipeline
//!
//! 1. **Discovery**: [`NamingValidator`] accepts `<shop>_<cash>.<ext>` names
//! 2. **Parsing**: [`RecordParser`] validates the header and converts rows
//! 3. **Loading**: [`crate::storage::BatchLoader`] commits the batch in one transaction
//! 4. **Archiving**: [`Archiver`] moves the file into the processed area
//!
//! [`Orchestrator`] runs these steps file by file and collects a [`RunSummary`].
//!
//! # Example
//!
//! ```rust,ignore
//! use salesload::ingest::{IngestOptions, Orchestrator, ParseFailurePolicy};
//! use salesload::storage::SalesDatabase;
//!
//! let db = SalesDatabase::connect(&database_url).await?;
//! let options = IngestOptions::new("data").with_parse_policy(ParseFailurePolicy::Continue);
//! let summary = Orchestrator::new(options, Some(&db)).run().await?;
//! println!("{summary}");
//! ```

pub mod archive;
pub mod naming;
pub mod orchestrator;
pub mod parser;
pub mod record;

pub use archive::{Archiver, DEFAULT_PROCESSED_DIR};
pub use naming::{NamingValidator, DEFAULT_EXTENSION};
pub use orchestrator::{
    CandidateFile, FileReport, FileState, IngestOptions, Orchestrator, ParseFailurePolicy,
    RunSummary,
};
pub use parser::RecordParser;
pub use record::{SalesRecord, TillId, REQUIRED_COLUMNS};
