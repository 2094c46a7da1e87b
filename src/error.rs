//! Error types for salesload operations.
//!
//! Defines the failure taxonomy of an ingestion run:
//! - Parsing and schema validation of till exports
//! - Archiving loaded files into the processed area
//! - Run-level failures that stop the orchestrator
//! - Synthetic export generation
//!
//! Database and configuration errors live next to the code that raises them
//! (`storage::DatabaseError`, `config::ConfigError`).

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while turning one export file into records.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("File {file} is missing required columns: {}", missing.join(", "))]
    MissingColumns { file: String, missing: Vec<String> },

    #[error("Failed to parse row {row} (line {line}) in file {file}: {reason}")]
    InvalidRow {
        file: String,
        row: usize,
        line: u64,
        reason: String,
    },

    #[error("Malformed CSV in file {file}: {source}")]
    Csv {
        file: String,
        #[source]
        source: csv::Error,
    },

    #[error("IO error reading {file}: {source}")]
    Io {
        file: String,
        #[source]
        source: std::io::Error,
    },
}

impl ParseError {
    /// Returns the name of the file the error originated from.
    pub fn file(&self) -> &str {
        match self {
            ParseError::MissingColumns { file, .. }
            | ParseError::InvalidRow { file, .. }
            | ParseError::Csv { file, .. }
            | ParseError::Io { file, .. } => file,
        }
    }
}

/// Errors that can occur while moving a loaded file to the processed area.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Failed to create processed directory {path:?}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to move {from:?} to {to:?}: {source}")]
    Move {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Path {0:?} has no file name")]
    NoFileName(PathBuf),
}

/// Errors that stop an ingestion run as a whole.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("Data directory not found: {0:?}")]
    DataDirMissing(PathBuf),

    #[error("Failed to list data directory {path:?}: {source}")]
    ListDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Run aborted: {0}")]
    ParseAborted(#[source] ParseError),

    #[error("A database connection is required unless running in dry-run mode")]
    MissingDatabase,
}

/// Errors that can occur while generating synthetic till exports.
#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("Invalid parameter value: {0}")]
    InvalidParameter(String),

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_columns_display() {
        let err = ParseError::MissingColumns {
            file: "9_1.csv".to_string(),
            missing: vec!["category".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("9_1.csv"));
        assert!(msg.contains("category"));
        assert_eq!(err.file(), "9_1.csv");
    }

    #[test]
    fn test_invalid_row_display() {
        let err = ParseError::InvalidRow {
            file: "3_2.csv".to_string(),
            row: 4,
            line: 5,
            reason: "invalid digit found in string".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("row 4"));
        assert!(msg.contains("line 5"));
        assert!(msg.contains("3_2.csv"));
    }

    #[test]
    fn test_parse_aborted_wraps_source() {
        let err = RunError::ParseAborted(ParseError::MissingColumns {
            file: "9_1.csv".to_string(),
            missing: vec!["category".to_string()],
        });
        assert!(err.to_string().contains("Run aborted"));
        assert!(err.to_string().contains("9_1.csv"));
    }
}
