//! Transactional batch loading of sales records.

use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::ingest::SalesRecord;

use super::database::{DatabaseError, SalesDatabase};
use super::schema::LOADED_FILES_TABLE;

/// Default number of records per INSERT statement.
pub const DEFAULT_CHUNK_SIZE: usize = 1000;

/// Result of loading one file's batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Every record was inserted and the transaction committed.
    Committed { rows: u64 },
    /// The ledger already holds this file content; nothing was inserted.
    AlreadyLoaded,
}

/// Computes the hex SHA-256 of a file's content, used as its ledger key.
pub fn content_fingerprint(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Inserts one file's records inside a single transaction.
///
/// Inserts may be split into several statements of `chunk_size` rows, but all
/// of them run in the same transaction: either every record of the batch is
/// committed or none is visible. Errors are returned as-is; nothing is retried.
pub struct BatchLoader<'a> {
    db: &'a SalesDatabase,
    chunk_size: usize,
}

impl<'a> BatchLoader<'a> {
    /// Creates a loader writing through `db`.
    pub fn new(db: &'a SalesDatabase) -> Self {
        Self {
            db,
            chunk_size: DEFAULT_CHUNK_SIZE.min(db.dialect().max_chunk_size()),
        }
    }

    /// Sets the number of rows per INSERT statement, clamped to
    /// `1..=Dialect::max_chunk_size()` of the connected backend.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.clamp(1, self.db.dialect().max_chunk_size());
        self
    }

    /// Rows per INSERT statement after clamping.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Loads `records` originating from `file_name`.
    ///
    /// When `fingerprint` is given, the file is first recorded in the
    /// `loaded_files` ledger within the same transaction. A ledger conflict
    /// means this exact content was loaded before: the transaction is rolled
    /// back and [`LoadOutcome::AlreadyLoaded`] is returned.
    pub async fn load(
        &self,
        file_name: &str,
        records: &[SalesRecord],
        fingerprint: Option<&str>,
    ) -> Result<LoadOutcome, DatabaseError> {
        // Dropping `tx` on an early return rolls the whole batch back.
        let mut tx = self.db.pool().begin().await?;

        if let Some(sha) = fingerprint {
            let sql = format!(
                "INSERT INTO {LOADED_FILES_TABLE} (file_name, content_sha256, row_count) \
                 VALUES ($1, $2, $3) \
                 ON CONFLICT (file_name, content_sha256) DO NOTHING"
            );
            let claimed = sqlx::query(&sql)
                .bind(file_name)
                .bind(sha)
                .bind(records.len() as i64)
                .execute(&mut *tx)
                .await?;

            if claimed.rows_affected() == 0 {
                tx.rollback().await?;
                info!(file = file_name, "File content already loaded, skipping insert");
                return Ok(LoadOutcome::AlreadyLoaded);
            }
        }

        let dialect = self.db.dialect();
        let mut rows = 0u64;

        for chunk in records.chunks(self.chunk_size) {
            let sql = dialect.insert_sales_sql(chunk.len());
            let mut query = sqlx::query(&sql);

            for record in chunk {
                query = query
                    .bind(record.doc_id.as_str())
                    .bind(record.item.as_str())
                    .bind(record.category.as_str())
                    .bind(record.amount)
                    .bind(record.price.to_string())
                    .bind(record.discount.to_string())
                    .bind(record.shop_num)
                    .bind(record.cash_num)
                    .bind(file_name);
            }

            let result = query.execute(&mut *tx).await?;
            rows += result.rows_affected();
            debug!(file = file_name, chunk_rows = chunk.len(), "Chunk inserted");
        }

        tx.commit().await?;
        Ok(LoadOutcome::Committed { rows })
    }
}
