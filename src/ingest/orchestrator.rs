//! Run orchestration for till export ingestion.
//!
//! The orchestrator walks one data directory and drives every accepted file
//! through parse → load → archive, strictly one file at a time:
//!
//! ```text
//! discovered ─┬─> rejected
//!             └─> accepted ─┬─> parse_failed
//!                           └─> parsed ─┬─> load_failed
//!                                       └─> loaded ─┬─> archived
//!                                                   └─> archive_failed
//! ```
//!
//! Load and archive failures are recorded per file and the run continues.
//! Parse failures follow [`ParseFailurePolicy`]: `Abort` ends the run on the
//! first malformed file, `Continue` records it and moves on.

use std::path::PathBuf;
use std::str::FromStr;

use serde::Serialize;
use tokio::fs;
use tracing::{error, info, warn};

use crate::error::{ParseError, RunError};
use crate::storage::{content_fingerprint, BatchLoader, LoadOutcome, SalesDatabase, DEFAULT_CHUNK_SIZE};

use super::archive::{Archiver, DEFAULT_PROCESSED_DIR};
use super::naming::{NamingValidator, DEFAULT_EXTENSION};
use super::parser::RecordParser;
use super::record::{SalesRecord, TillId};

/// What the run does when a file fails schema validation or row parsing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseFailurePolicy {
    /// Stop the whole run; files not yet visited stay unprocessed.
    #[default]
    Abort,
    /// Report the file as `parse_failed`, leave it in place, keep going.
    Continue,
}

impl FromStr for ParseFailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "abort" => Ok(ParseFailurePolicy::Abort),
            "continue" => Ok(ParseFailurePolicy::Continue),
            other => Err(format!(
                "invalid parse failure policy '{other}': expected 'abort' or 'continue'"
            )),
        }
    }
}

impl std::fmt::Display for ParseFailurePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseFailurePolicy::Abort => write!(f, "abort"),
            ParseFailurePolicy::Continue => write!(f, "continue"),
        }
    }
}

/// Terminal state of one accepted file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileState {
    /// Dry run: parsed and validated, nothing written or moved.
    Validated,
    /// Committed and moved to the processed area.
    Archived,
    /// Committed, but the move failed; the file is still in place.
    ArchiveFailed,
    /// Transaction rolled back; the file is still in place.
    LoadFailed,
    /// Schema or row error; the file is still in place.
    ParseFailed,
    /// The ledger already held this content; moved without inserting.
    AlreadyLoaded,
}

impl std::fmt::Display for FileState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileState::Validated => write!(f, "validated"),
            FileState::Archived => write!(f, "archived"),
            FileState::ArchiveFailed => write!(f, "archive_failed"),
            FileState::LoadFailed => write!(f, "load_failed"),
            FileState::ParseFailed => write!(f, "parse_failed"),
            FileState::AlreadyLoaded => write!(f, "already_loaded"),
        }
    }
}

/// A file whose name follows the till export convention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFile {
    pub path: PathBuf,
    pub file_name: String,
    pub till: TillId,
}

/// Outcome of processing one accepted file.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub file_name: String,
    pub shop_num: i32,
    pub cash_num: i32,
    pub state: FileState,
    /// Records parsed from the file.
    pub rows: usize,
    /// Records committed to the store by this run.
    pub rows_loaded: u64,
    pub error: Option<String>,
}

impl FileReport {
    fn new(candidate: &CandidateFile, state: FileState, rows: usize) -> Self {
        Self {
            file_name: candidate.file_name.clone(),
            shop_num: candidate.till.shop_num,
            cash_num: candidate.till.cash_num,
            state,
            rows,
            rows_loaded: 0,
            error: None,
        }
    }

    fn with_rows_loaded(mut self, rows_loaded: u64) -> Self {
        self.rows_loaded = rows_loaded;
        self
    }

    fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }
}

/// Aggregate result of one ingestion run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub dry_run: bool,
    /// Names skipped for not following the naming convention.
    pub rejected: Vec<String>,
    /// One report per accepted file that was visited, in processing order.
    pub files: Vec<FileReport>,
}

impl RunSummary {
    /// Number of accepted files visited by the run.
    pub fn files_processed(&self) -> usize {
        self.files.len()
    }

    /// Number of visited files that ended in `state`.
    pub fn count(&self, state: FileState) -> usize {
        self.files.iter().filter(|f| f.state == state).count()
    }

    /// Total records committed by this run.
    pub fn rows_loaded(&self) -> u64 {
        self.files.iter().map(|f| f.rows_loaded).sum()
    }

    /// Looks up the report for `file_name`.
    pub fn file(&self, file_name: &str) -> Option<&FileReport> {
        self.files.iter().find(|f| f.file_name == file_name)
    }
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "Files processed: {} (rejected names: {}){}",
            self.files_processed(),
            self.rejected.len(),
            if self.dry_run { " [dry-run]" } else { "" }
        )?;
        for report in &self.files {
            write!(
                f,
                "  {:<24} {:<15} rows={:<6} loaded={}",
                report.file_name,
                report.state.to_string(),
                report.rows,
                report.rows_loaded
            )?;
            if let Some(err) = &report.error {
                write!(f, "  error: {err}")?;
            }
            writeln!(f)?;
        }
        write!(
            f,
            "Rows loaded: {} | archived: {} | already loaded: {} | load failed: {} | archive failed: {} | parse failed: {}",
            self.rows_loaded(),
            self.count(FileState::Archived),
            self.count(FileState::AlreadyLoaded),
            self.count(FileState::LoadFailed),
            self.count(FileState::ArchiveFailed),
            self.count(FileState::ParseFailed),
        )
    }
}

/// Options controlling one ingestion run.
#[derive(Debug, Clone)]
pub struct IngestOptions {
    /// Directory scanned for till exports.
    pub data_dir: PathBuf,
    /// Parse and validate only; no database writes, no moves.
    pub dry_run: bool,
    pub on_parse_error: ParseFailurePolicy,
    /// Record loaded file contents in the ledger and skip repeats.
    pub skip_loaded: bool,
    /// Rows per INSERT statement within a file's transaction.
    pub chunk_size: usize,
    /// Name of the processed subdirectory under `data_dir`.
    pub processed_dir_name: String,
    /// Accepted file extension.
    pub extension: String,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            dry_run: false,
            on_parse_error: ParseFailurePolicy::Abort,
            skip_loaded: false,
            chunk_size: DEFAULT_CHUNK_SIZE,
            processed_dir_name: DEFAULT_PROCESSED_DIR.to_string(),
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }
}

impl IngestOptions {
    /// Creates options for `data_dir` with default settings.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    /// Builder method to toggle dry-run mode.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Builder method to set the parse failure policy.
    pub fn with_parse_policy(mut self, policy: ParseFailurePolicy) -> Self {
        self.on_parse_error = policy;
        self
    }

    /// Builder method to toggle the loaded-file ledger.
    pub fn with_skip_loaded(mut self, skip_loaded: bool) -> Self {
        self.skip_loaded = skip_loaded;
        self
    }

    /// Builder method to set the INSERT chunk size.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Full path of the processed directory.
    pub fn processed_dir(&self) -> PathBuf {
        self.data_dir.join(&self.processed_dir_name)
    }
}

/// Drives discovery, parsing, loading and archiving for one data directory.
pub struct Orchestrator<'a> {
    options: IngestOptions,
    naming: NamingValidator,
    parser: RecordParser,
    archiver: Archiver,
    db: Option<&'a SalesDatabase>,
}

impl<'a> Orchestrator<'a> {
    /// Creates an orchestrator. `db` may be `None` only for dry runs.
    pub fn new(options: IngestOptions, db: Option<&'a SalesDatabase>) -> Self {
        let naming = NamingValidator::new(&options.extension);
        let archiver = Archiver::new(options.processed_dir());
        Self {
            options,
            naming,
            parser: RecordParser::new(),
            archiver,
            db,
        }
    }

    /// Lists regular files in the data directory and splits them into
    /// accepted candidates and rejected names.
    ///
    /// Candidates are ordered by shop, then cash, then name.
    pub async fn discover(&self) -> Result<(Vec<CandidateFile>, Vec<String>), RunError> {
        let data_dir = &self.options.data_dir;
        let list_err = |source: std::io::Error| RunError::ListDir {
            path: data_dir.clone(),
            source,
        };

        let mut entries = fs::read_dir(data_dir).await.map_err(list_err)?;
        let mut candidates = Vec::new();
        let mut rejected = Vec::new();

        while let Some(entry) = entries.next_entry().await.map_err(list_err)? {
            let path = entry.path();
            let is_file = fs::metadata(&path).await.map(|m| m.is_file()).unwrap_or(false);
            if !is_file {
                continue;
            }

            let file_name = entry.file_name().to_string_lossy().to_string();
            match self.naming.classify(&file_name) {
                Some(till) => candidates.push(CandidateFile {
                    path,
                    file_name,
                    till,
                }),
                None => {
                    info!(file = %file_name, "Skipping file with non-matching name");
                    rejected.push(file_name);
                }
            }
        }

        candidates.sort_by(|a, b| (a.till, &a.file_name).cmp(&(b.till, &b.file_name)));
        rejected.sort();
        Ok((candidates, rejected))
    }

    /// Runs ingestion over every accepted file in the data directory.
    ///
    /// # Errors
    ///
    /// Returns `RunError` when the data directory is missing or unreadable,
    /// when a database handle is required but absent, and, under
    /// [`ParseFailurePolicy::Abort`], on the first file that fails to parse.
    pub async fn run(&self) -> Result<RunSummary, RunError> {
        if !self.options.dry_run && self.db.is_none() {
            return Err(RunError::MissingDatabase);
        }
        if !fs::metadata(&self.options.data_dir)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false)
        {
            return Err(RunError::DataDirMissing(self.options.data_dir.clone()));
        }

        let (candidates, rejected) = self.discover().await?;
        let mut summary = RunSummary {
            dry_run: self.options.dry_run,
            rejected,
            files: Vec::with_capacity(candidates.len()),
        };

        if candidates.is_empty() {
            info!(data_dir = %self.options.data_dir.display(), "No files to process");
            return Ok(summary);
        }
        info!(count = candidates.len(), "Found files to process");

        for candidate in &candidates {
            match self.process_file(candidate).await {
                Ok(report) => summary.files.push(report),
                Err(err) => match self.options.on_parse_error {
                    ParseFailurePolicy::Abort => {
                        error!(file = %candidate.file_name, error = %err, "Parse failed, aborting run");
                        return Err(RunError::ParseAborted(err));
                    }
                    ParseFailurePolicy::Continue => {
                        warn!(file = %candidate.file_name, error = %err, "Parse failed, file left in place");
                        summary.files.push(
                            FileReport::new(candidate, FileState::ParseFailed, 0)
                                .with_error(err.to_string()),
                        );
                    }
                },
            }
        }

        info!(
            files = summary.files_processed(),
            rows_loaded = summary.rows_loaded(),
            archived = summary.count(FileState::Archived),
            load_failed = summary.count(FileState::LoadFailed),
            "Run finished"
        );
        Ok(summary)
    }

    /// Processes one accepted file.
    ///
    /// Parse failures are returned as `Err` so the caller can apply the run
    /// policy; every later failure is folded into the returned report.
    pub async fn process_file(&self, candidate: &CandidateFile) -> Result<FileReport, ParseError> {
        info!(
            file = %candidate.file_name,
            shop = candidate.till.shop_num,
            cash = candidate.till.cash_num,
            "Processing file"
        );

        let content = fs::read(&candidate.path)
            .await
            .map_err(|source| ParseError::Io {
                file: candidate.file_name.clone(),
                source,
            })?;
        let records = self
            .parser
            .parse_reader(content.as_slice(), &candidate.file_name, candidate.till)?;
        info!(file = %candidate.file_name, rows = records.len(), "Rows parsed");

        let db = match (self.options.dry_run, self.db) {
            (false, Some(db)) => db,
            _ => {
                info!(file = %candidate.file_name, "Dry run: not loading, not moving");
                return Ok(FileReport::new(candidate, FileState::Validated, records.len()));
            }
        };

        let fingerprint = self
            .options
            .skip_loaded
            .then(|| content_fingerprint(&content));

        Ok(self
            .load_and_archive(db, candidate, &records, fingerprint.as_deref())
            .await)
    }

    async fn load_and_archive(
        &self,
        db: &SalesDatabase,
        candidate: &CandidateFile,
        records: &[SalesRecord],
        fingerprint: Option<&str>,
    ) -> FileReport {
        let loader = BatchLoader::new(db).with_chunk_size(self.options.chunk_size);

        let report = match loader.load(&candidate.file_name, records, fingerprint).await {
            Ok(LoadOutcome::Committed { rows }) => {
                info!(file = %candidate.file_name, rows, "Batch committed");
                FileReport::new(candidate, FileState::Archived, records.len()).with_rows_loaded(rows)
            }
            Ok(LoadOutcome::AlreadyLoaded) => {
                FileReport::new(candidate, FileState::AlreadyLoaded, records.len())
            }
            Err(err) => {
                error!(file = %candidate.file_name, error = %err, "Load failed, transaction rolled back, file left in place");
                return FileReport::new(candidate, FileState::LoadFailed, records.len())
                    .with_error(err.to_string());
            }
        };

        match self.archiver.archive(&candidate.path).await {
            Ok(_) => report,
            Err(err) => {
                warn!(file = %candidate.file_name, error = %err, "Data committed but archiving failed");
                FileReport {
                    state: FileState::ArchiveFailed,
                    ..report
                }
                .with_error(err.to_string())
            }
        }
    }
}
