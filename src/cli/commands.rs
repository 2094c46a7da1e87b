//! CLI command definitions for salesload.
//!
//! `load` ingests till exports from a data directory into the sales store,
//! `generate` writes synthetic exports for testing the loader.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use rand::{RngExt, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::info;

use crate::config::DatabaseConfig;
use crate::generator::{generate_exports, GeneratorConfig};
use crate::ingest::{
    IngestOptions, Orchestrator, ParseFailurePolicy, RunSummary, DEFAULT_EXTENSION,
    DEFAULT_PROCESSED_DIR,
};
use crate::storage::{SalesDatabase, DEFAULT_CHUNK_SIZE};

/// Default directory scanned for exports and written by the generator.
const DEFAULT_DATA_DIR: &str = "data";

/// Batch loader for per-till sales exports.
#[derive(Parser)]
#[command(name = "salesload")]
#[command(about = "Load per-till sales CSV exports into a relational store")]
#[command(version)]
#[command(
    long_about = "salesload discovers <shop>_<cash>.csv exports in a data directory, loads each file in its own transaction and moves loaded files into a processed directory.\n\nExample usage:\n  salesload load --data-dir ./data\n  salesload generate --n-shops 3 --seed 42"
)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info", global = true)]
    pub log_level: String,
}

/// Available CLI subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Load till exports from the data directory into the database.
    Load(LoadArgs),

    /// Generate synthetic till exports.
    #[command(alias = "gen")]
    Generate(GenerateArgs),
}

/// Arguments for `salesload load`.
#[derive(Parser, Debug)]
pub struct LoadArgs {
    /// Directory containing the exports.
    #[arg(short = 'd', long, default_value = DEFAULT_DATA_DIR, env = "SALESLOAD_DATA_DIR")]
    pub data_dir: PathBuf,

    /// Parse and validate files without touching the database or moving files.
    #[arg(long)]
    pub dry_run: bool,

    /// What to do when a file fails to parse (abort, continue).
    #[arg(long, default_value = "abort")]
    pub on_parse_error: ParseFailurePolicy,

    /// Record loaded file contents and skip files whose contents were already loaded.
    #[arg(long)]
    pub skip_loaded: bool,

    /// Rows per INSERT statement.
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
    pub chunk_size: usize,

    /// Name of the processed subdirectory inside the data directory.
    #[arg(long, default_value = DEFAULT_PROCESSED_DIR)]
    pub processed_dir: String,

    /// Accepted export file extension.
    #[arg(long, default_value = DEFAULT_EXTENSION)]
    pub extension: String,

    /// Create the tables if they do not exist before loading.
    #[arg(long)]
    pub create_schema: bool,

    /// Output the run summary as JSON.
    #[arg(short = 'j', long)]
    pub json: bool,
}

/// Arguments for `salesload generate`.
#[derive(Parser, Debug)]
pub struct GenerateArgs {
    /// Number of shops to generate.
    #[arg(short = 'n', long)]
    pub n_shops: u32,

    /// Minimum tills per shop.
    #[arg(long, default_value = "1")]
    pub min_cash: u32,

    /// Maximum tills per shop.
    #[arg(long, default_value = "3")]
    pub max_cash: u32,

    /// Minimum receipts per till.
    #[arg(long, default_value = "20")]
    pub min_checks: u32,

    /// Maximum receipts per till.
    #[arg(long, default_value = "50")]
    pub max_checks: u32,

    /// Output directory for generated exports.
    #[arg(short = 'o', long, default_value = DEFAULT_DATA_DIR)]
    pub output_dir: PathBuf,

    /// RNG seed for reproducible output. A random seed is drawn and logged if omitted.
    #[arg(short = 's', long)]
    pub seed: Option<u64>,

    /// Delete exports in the output directory older than this many days.
    #[arg(long, default_value = "1")]
    pub days_to_keep: u32,
}

/// Parse CLI arguments.
pub fn parse_cli() -> Cli {
    Cli::parse()
}

/// Run the CLI by parsing arguments and executing the command.
pub async fn run() -> anyhow::Result<()> {
    run_with_cli(parse_cli()).await
}

/// Run the CLI with the parsed arguments.
pub async fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Load(args) => run_load_command(args).await,
        Commands::Generate(args) => run_generate_command(args),
    }
}

// ============================================================================
// Load Command Implementation
// ============================================================================

async fn run_load_command(args: LoadArgs) -> anyhow::Result<()> {
    let mut options = IngestOptions::new(&args.data_dir)
        .with_dry_run(args.dry_run)
        .with_parse_policy(args.on_parse_error)
        .with_skip_loaded(args.skip_loaded)
        .with_chunk_size(args.chunk_size);
    options.processed_dir_name = args.processed_dir.clone();
    options.extension = args.extension.clone();

    let summary = if args.dry_run {
        info!(data_dir = %args.data_dir.display(), "Dry run, database will not be used");
        Orchestrator::new(options, None).run().await?
    } else {
        let config = DatabaseConfig::from_env().context("Database configuration is incomplete")?;
        let db = SalesDatabase::connect(&config.url())
            .await
            .context("Failed to connect to the database")?;

        if args.create_schema {
            db.ensure_schema().await?;
            info!("Schema ensured");
        }

        let result = Orchestrator::new(options, Some(&db)).run().await;
        db.close().await;
        result?
    };

    print_summary(&summary, args.json)
}

fn print_summary(summary: &RunSummary, json: bool) -> anyhow::Result<()> {
    if json {
        let output = serde_json::json!({
            "finished_at": chrono::Utc::now().to_rfc3339(),
            "files_processed": summary.files_processed(),
            "rows_loaded": summary.rows_loaded(),
            "summary": summary,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{summary}");
    }
    Ok(())
}

// ============================================================================
// Generate Command Implementation
// ============================================================================

fn run_generate_command(args: GenerateArgs) -> anyhow::Result<()> {
    let config = GeneratorConfig::new(args.n_shops)
        .with_cash_range(args.min_cash, args.max_cash)
        .with_check_range(args.min_checks, args.max_checks)
        .with_output_dir(&args.output_dir)
        .with_days_to_keep(args.days_to_keep);

    let seed = args.seed.unwrap_or_else(|| rand::rng().random::<u64>());
    info!(seed, n_shops = config.n_shops, "Generating till exports");

    let files = generate_exports(&config, ChaCha8Rng::seed_from_u64(seed))?;

    println!("Generated {} files in {}", files.len(), args.output_dir.display());
    println!("  Seed: {seed}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_load_defaults() {
        let cli = Cli::try_parse_from(["salesload", "load"]).unwrap();
        let Commands::Load(args) = cli.command else {
            panic!("expected load command");
        };
        assert_eq!(args.on_parse_error, ParseFailurePolicy::Abort);
        assert_eq!(args.chunk_size, DEFAULT_CHUNK_SIZE);
        assert_eq!(args.processed_dir, "processed");
        assert_eq!(args.extension, "csv");
        assert!(!args.dry_run);
        assert!(!args.skip_loaded);
        assert_eq!(cli.log_level, "info");
    }

    #[test]
    fn test_load_flags() {
        let cli = Cli::try_parse_from([
            "salesload",
            "--log-level",
            "debug",
            "load",
            "--data-dir",
            "/tmp/in",
            "--dry-run",
            "--on-parse-error",
            "continue",
            "--skip-loaded",
        ])
        .unwrap();
        let Commands::Load(args) = cli.command else {
            panic!("expected load command");
        };
        assert_eq!(args.data_dir, PathBuf::from("/tmp/in"));
        assert!(args.dry_run);
        assert!(args.skip_loaded);
        assert_eq!(args.on_parse_error, ParseFailurePolicy::Continue);
        assert_eq!(cli.log_level, "debug");
    }

    #[test]
    fn test_load_rejects_unknown_policy() {
        assert!(Cli::try_parse_from(["salesload", "load", "--on-parse-error", "ignore"]).is_err());
    }

    #[test]
    fn test_generate_requires_shops() {
        assert!(Cli::try_parse_from(["salesload", "generate"]).is_err());

        let cli = Cli::try_parse_from(["salesload", "gen", "-n", "4", "--seed", "7"]).unwrap();
        let Commands::Generate(args) = cli.command else {
            panic!("expected generate command");
        };
        assert_eq!(args.n_shops, 4);
        assert_eq!(args.seed, Some(7));
        assert_eq!((args.min_cash, args.max_cash), (1, 3));
        assert_eq!((args.min_checks, args.max_checks), (20, 50));
        assert_eq!(args.days_to_keep, 1);
    }

    #[tokio::test]
    async fn test_dry_run_needs_no_database() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("1_1.csv"),
            "doc_id,item,category,amount,price,discount\nA,Towel,textile,1,10.00,0\n",
        )
        .unwrap();

        let cli = Cli::try_parse_from([
            "salesload",
            "load",
            "--dry-run",
            "--data-dir",
            dir.path().to_str().unwrap(),
        ])
        .unwrap();
        run_with_cli(cli).await.unwrap();

        assert!(dir.path().join("1_1.csv").exists());
        assert!(!dir.path().join("processed").exists());
    }
}
