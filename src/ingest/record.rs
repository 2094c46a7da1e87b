//! Typed line-item records parsed from till exports.

use rust_decimal::Decimal;
use serde::Serialize;

/// Columns every export header must declare.
pub const REQUIRED_COLUMNS: [&str; 6] = ["doc_id", "item", "category", "amount", "price", "discount"];

/// One line item of one receipt.
///
/// `shop_num` and `cash_num` come from the source file name, never from the
/// file content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SalesRecord {
    /// Receipt identifier. Not unique across records.
    pub doc_id: String,
    pub item: String,
    pub category: String,
    /// Quantity sold. Zero and negative values are accepted as-is.
    pub amount: i32,
    pub price: Decimal,
    pub discount: Decimal,
    pub shop_num: i32,
    pub cash_num: i32,
    /// Name of the originating file, kept for audit.
    pub source_file: String,
}

/// Shop and till identifiers encoded in an export file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct TillId {
    pub shop_num: i32,
    pub cash_num: i32,
}

impl TillId {
    pub fn new(shop_num: i32, cash_num: i32) -> Self {
        Self { shop_num, cash_num }
    }
}

impl std::fmt::Display for TillId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "shop {} / cash {}", self.shop_num, self.cash_num)
    }
}
