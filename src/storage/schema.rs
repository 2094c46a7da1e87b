//! Database schema constants for the sales sink.
//!
//! Each table has one definition per supported dialect. Monetary columns are
//! `NUMERIC` on PostgreSQL and exact decimal text on SQLite, so neither
//! backend stores them as binary floating point.

/// Name of the table line items are inserted into.
pub const SALES_TABLE: &str = "sales";

/// Name of the ledger table recording fully loaded files.
pub const LOADED_FILES_TABLE: &str = "loaded_files";

/// PostgreSQL definition of the sales table.
pub const PG_CREATE_SALES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS sales (
    id BIGSERIAL PRIMARY KEY,
    doc_id TEXT NOT NULL,
    item TEXT NOT NULL,
    category TEXT NOT NULL,
    amount INTEGER NOT NULL,
    price NUMERIC NOT NULL,
    discount NUMERIC NOT NULL,
    shop_num INTEGER NOT NULL,
    cash_num INTEGER NOT NULL,
    file_name TEXT NOT NULL,
    loaded_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
)
"#;

/// PostgreSQL definition of the loaded-file ledger.
pub const PG_CREATE_LOADED_FILES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS loaded_files (
    file_name TEXT NOT NULL,
    content_sha256 CHAR(64) NOT NULL,
    row_count BIGINT NOT NULL,
    loaded_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    PRIMARY KEY (file_name, content_sha256)
)
"#;

/// SQLite definition of the sales table.
pub const SQLITE_CREATE_SALES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS sales (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    doc_id TEXT NOT NULL,
    item TEXT NOT NULL,
    category TEXT NOT NULL,
    amount INTEGER NOT NULL,
    price TEXT NOT NULL,
    discount TEXT NOT NULL,
    shop_num INTEGER NOT NULL,
    cash_num INTEGER NOT NULL,
    file_name TEXT NOT NULL,
    loaded_at TEXT NOT NULL DEFAULT (datetime('now'))
)
"#;

/// SQLite definition of the loaded-file ledger.
pub const SQLITE_CREATE_LOADED_FILES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS loaded_files (
    file_name TEXT NOT NULL,
    content_sha256 TEXT NOT NULL,
    row_count INTEGER NOT NULL,
    loaded_at TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (file_name, content_sha256)
)
"#;

/// Index supporting per-file lookups on the sales table.
pub const CREATE_SALES_FILE_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_sales_file_name ON sales(file_name)";

/// Columns written for every sales record, in bind order.
pub const SALES_INSERT_COLUMNS: [&str; 9] = [
    "doc_id",
    "item",
    "category",
    "amount",
    "price",
    "discount",
    "shop_num",
    "cash_num",
    "file_name",
];
