//! Synthetic till export generation.
//!
//! Produces `<shop>_<cash>.csv` files shaped like real terminal exports, for
//! exercising the loader without production data:
//!
//! 1. **Layout** - each shop gets a random number of tills
//! 2. **Receipts** - each till gets a random number of receipts of 1-5 line items
//! 3. **Retention** - exports older than the retention window are deleted
//!
//! All randomness flows from one [`ChaCha8Rng`] passed in by the caller, so
//! a seed fully determines the output.
//!
//! # Example
//!
//! ```ignore
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//! use salesload::generator::{generate_exports, GeneratorConfig};
//!
//! let config = GeneratorConfig::new(3).with_output_dir("data");
//! let files = generate_exports(&config, ChaCha8Rng::seed_from_u64(42))?;
//! ```

pub mod catalog;
pub mod cleanup;
pub mod sales;

pub use cleanup::cleanup_old_files;
pub use sales::{write_export, GeneratedRow, SalesDataGenerator};

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use rand_chacha::ChaCha8Rng;
use tracing::info;

use crate::error::GeneratorError;

/// Result type alias for generator operations.
pub type Result<T> = std::result::Result<T, GeneratorError>;

/// Parameters of a generation run.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Number of shops, numbered from 1.
    pub n_shops: u32,
    pub min_cash: u32,
    pub max_cash: u32,
    /// Receipts per till, inclusive bounds.
    pub min_checks: u32,
    pub max_checks: u32,
    pub output_dir: PathBuf,
    /// Exports older than this many days are deleted after generation.
    pub days_to_keep: u32,
}

impl GeneratorConfig {
    /// Creates a configuration for `n_shops` shops with default bounds.
    pub fn new(n_shops: u32) -> Self {
        Self {
            n_shops,
            min_cash: 1,
            max_cash: 3,
            min_checks: 20,
            max_checks: 50,
            output_dir: PathBuf::from("data"),
            days_to_keep: 1,
        }
    }

    /// Builder method to set the output directory.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Builder method to set the till count bounds.
    pub fn with_cash_range(mut self, min: u32, max: u32) -> Self {
        self.min_cash = min;
        self.max_cash = max;
        self
    }

    /// Builder method to set the receipt count bounds.
    pub fn with_check_range(mut self, min: u32, max: u32) -> Self {
        self.min_checks = min;
        self.max_checks = max;
        self
    }

    /// Builder method to set the retention window.
    pub fn with_days_to_keep(mut self, days: u32) -> Self {
        self.days_to_keep = days;
        self
    }

    /// Validates the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `GeneratorError::InvalidParameter` if any bound is inconsistent.
    pub fn validate(&self) -> Result<()> {
        if self.n_shops == 0 {
            return Err(GeneratorError::InvalidParameter(
                "n_shops must be at least 1".to_string(),
            ));
        }
        if self.min_cash == 0 || self.min_cash > self.max_cash {
            return Err(GeneratorError::InvalidParameter(format!(
                "cash range [{}, {}] must satisfy 1 <= min <= max",
                self.min_cash, self.max_cash
            )));
        }
        if self.min_checks == 0 || self.min_checks > self.max_checks {
            return Err(GeneratorError::InvalidParameter(format!(
                "check range [{}, {}] must satisfy 1 <= min <= max",
                self.min_checks, self.max_checks
            )));
        }
        Ok(())
    }
}

/// Writes one export per till into the output directory, then applies the
/// retention cleanup. Returns the paths written.
pub fn generate_exports(config: &GeneratorConfig, rng: ChaCha8Rng) -> Result<Vec<PathBuf>> {
    config.validate()?;
    std::fs::create_dir_all(&config.output_dir)?;

    let mut generator = SalesDataGenerator::new(config.clone(), rng);
    let mut written = Vec::new();

    for shop in 1..=config.n_shops {
        let cashes = generator.cash_count();
        info!(shop, cashes, "Generating shop");

        for cash in 1..=cashes {
            let rows = generator.rows_for_cash();
            let path = config.output_dir.join(format!("{shop}_{cash}.csv"));
            write_export(BufWriter::new(File::create(&path)?), &rows)?;
            info!(file = %path.display(), rows = rows.len(), "Export generated");
            written.push(path);
        }
    }

    cleanup_old_files(&config.output_dir, "csv", config.days_to_keep)?;
    Ok(written)
}
