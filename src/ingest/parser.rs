//! Parser for till export CSV files.
//!
//! A file is accepted or rejected as a whole: a missing required column or a
//! single unconvertible cell fails the entire file, and no partial batch is
//! ever returned.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use rust_decimal::Decimal;

use crate::error::ParseError;

use super::record::{SalesRecord, TillId, REQUIRED_COLUMNS};

/// Column positions of the required fields within one file's header.
#[derive(Debug, Clone, Copy)]
struct ColumnIndex {
    doc_id: usize,
    item: usize,
    category: usize,
    amount: usize,
    price: usize,
    discount: usize,
}

impl ColumnIndex {
    /// Resolves the required columns against `headers`; extra columns are ignored.
    ///
    /// A repeated header name resolves to its last occurrence.
    fn resolve(headers: &StringRecord, file: &str) -> Result<Self, ParseError> {
        let positions: HashMap<&str, usize> = headers
            .iter()
            .enumerate()
            .map(|(idx, name)| (name, idx))
            .collect();

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|col| !positions.contains_key(**col))
            .map(|col| col.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(ParseError::MissingColumns {
                file: file.to_string(),
                missing,
            });
        }

        let at = |name: &str| positions.get(name).copied().unwrap_or_default();
        Ok(Self {
            doc_id: at("doc_id"),
            item: at("item"),
            category: at("category"),
            amount: at("amount"),
            price: at("price"),
            discount: at("discount"),
        })
    }
}

/// Parses till export files into [`SalesRecord`] batches.
#[derive(Debug, Clone, Default)]
pub struct RecordParser;

impl RecordParser {
    pub fn new() -> Self {
        Self
    }

    /// Opens and parses the file at `path`.
    pub fn parse_path(&self, path: &Path, till: TillId) -> Result<Vec<SalesRecord>, ParseError> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());

        let file = File::open(path).map_err(|source| ParseError::Io {
            file: file_name.clone(),
            source,
        })?;

        self.parse_reader(file, &file_name, till)
    }

    /// Parses CSV content from `reader`, stamping each record with `till` and `file_name`.
    ///
    /// Records are returned in input row order.
    pub fn parse_reader<R: Read>(
        &self,
        reader: R,
        file_name: &str,
        till: TillId,
    ) -> Result<Vec<SalesRecord>, ParseError> {
        let csv_err = |source: csv::Error| ParseError::Csv {
            file: file_name.to_string(),
            source,
        };

        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);
        let columns = ColumnIndex::resolve(rdr.headers().map_err(csv_err)?, file_name)?;

        let mut records = Vec::new();
        let mut row = StringRecord::new();
        let mut row_num = 0usize;

        while rdr.read_record(&mut row).map_err(csv_err)? {
            row_num += 1;
            let line = row.position().map(|p| p.line()).unwrap_or_default();

            let record = Self::convert_row(&row, &columns, file_name, till).map_err(|reason| {
                ParseError::InvalidRow {
                    file: file_name.to_string(),
                    row: row_num,
                    line,
                    reason,
                }
            })?;
            records.push(record);
        }

        Ok(records)
    }

    fn convert_row(
        row: &StringRecord,
        columns: &ColumnIndex,
        file_name: &str,
        till: TillId,
    ) -> Result<SalesRecord, String> {
        let cell = |idx: usize, name: &str| {
            row.get(idx)
                .map(str::trim)
                .ok_or_else(|| format!("missing value for '{name}'"))
        };

        let amount = cell(columns.amount, "amount")?;
        let price = cell(columns.price, "price")?;
        let discount = cell(columns.discount, "discount")?;

        Ok(SalesRecord {
            doc_id: cell(columns.doc_id, "doc_id")?.to_string(),
            item: cell(columns.item, "item")?.to_string(),
            category: cell(columns.category, "category")?.to_string(),
            amount: amount
                .parse()
                .map_err(|e| format!("invalid amount '{amount}': {e}"))?,
            price: parse_decimal(price, "price")?,
            discount: parse_decimal(discount, "discount")?,
            shop_num: till.shop_num,
            cash_num: till.cash_num,
            source_file: file_name.to_string(),
        })
    }
}

fn parse_decimal(value: &str, name: &str) -> Result<Decimal, String> {
    Decimal::from_str_exact(value).map_err(|e| format!("invalid {name} '{value}': {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "doc_id,item,category,amount,price,discount\n";

    fn parse(content: &str) -> Result<Vec<SalesRecord>, ParseError> {
        RecordParser::new().parse_reader(content.as_bytes(), "3_2.csv", TillId::new(3, 2))
    }

    #[test]
    fn test_parse_single_row() {
        let records = parse(&format!("{HEADER}ABC123,Towel,textile,2,199.99,0.00\n")).unwrap();

        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.doc_id, "ABC123");
        assert_eq!(r.item, "Towel");
        assert_eq!(r.category, "textile");
        assert_eq!(r.amount, 2);
        assert_eq!(r.price, Decimal::new(19999, 2));
        assert_eq!(r.discount, Decimal::new(0, 2));
        assert_eq!(r.shop_num, 3);
        assert_eq!(r.cash_num, 2);
        assert_eq!(r.source_file, "3_2.csv");
    }

    #[test]
    fn test_preserves_row_order_and_trims() {
        let content = format!(
            "{HEADER}  D1 , Pan ,kitchen, 1 , 10.50 ,0\nD2,Bucket,home,-3,5,1.25\nD1,Plate,kitchen,0,0.10,0.00\n"
        );
        let records = parse(&content).unwrap();

        let ids: Vec<_> = records.iter().map(|r| r.doc_id.as_str()).collect();
        assert_eq!(ids, ["D1", "D2", "D1"]);
        assert_eq!(records[0].item, "Pan");
        assert_eq!(records[0].amount, 1);
        assert_eq!(records[0].price.to_string(), "10.50");
        assert_eq!(records[1].amount, -3);
        assert_eq!(records[2].amount, 0);
    }

    #[test]
    fn test_decimal_values_are_exact() {
        let records = parse(&format!("{HEADER}D,I,C,1,0.1,0.2\n")).unwrap();
        assert_eq!(records[0].price + records[0].discount, Decimal::new(3, 1));
    }

    #[test]
    fn test_columns_in_any_order_with_extras() {
        let content = "price,extra,discount,doc_id,amount,category,item\n12.00,x,1.00,Z9,4,textile,Towel\n";
        let records = parse(content).unwrap();

        assert_eq!(records[0].doc_id, "Z9");
        assert_eq!(records[0].item, "Towel");
        assert_eq!(records[0].amount, 4);
        assert_eq!(records[0].price, Decimal::new(1200, 2));
    }

    #[test]
    fn test_repeated_header_uses_last_column() {
        let content = "doc_id,item,category,amount,price,discount,price
D,I,C,1,1.00,0.00,2.00
";
        let records = parse(content).unwrap();

        assert_eq!(records[0].price, Decimal::new(200, 2));
    }

    #[test]
    fn test_missing_column_fails_whole_file() {
        let content = "doc_id,item,amount,price,discount\nD,I,1,1.00,0.00\n";
        match parse(content) {
            Err(ParseError::MissingColumns { file, missing }) => {
                assert_eq!(file, "3_2.csv");
                assert_eq!(missing, vec!["category".to_string()]);
            }
            other => panic!("expected MissingColumns, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_file_is_a_schema_error() {
        assert!(matches!(parse(""), Err(ParseError::MissingColumns { .. })));
    }

    #[test]
    fn test_header_only_yields_empty_batch() {
        assert!(parse(HEADER).unwrap().is_empty());
    }

    #[test]
    fn test_bad_amount_reports_row_and_line() {
        let content = format!("{HEADER}D1,I,C,1,1.00,0.00\nD2,I,C,two,1.00,0.00\nD3,I,C,3,1.00,0.00\n");
        match parse(&content) {
            Err(ParseError::InvalidRow { file, row, line, reason }) => {
                assert_eq!(file, "3_2.csv");
                assert_eq!(row, 2);
                assert_eq!(line, 3);
                assert!(reason.contains("amount"));
            }
            other => panic!("expected InvalidRow, got {other:?}"),
        }
    }

    #[test]
    fn test_bad_decimal_fails_file() {
        let content = format!("{HEADER}D1,I,C,1,1.00,0.00\nD2,I,C,1,12,3O,0.00\n");
        assert!(parse(&content).is_err());

        let content = format!("{HEADER}D1,I,C,1,abc,0.00\n");
        match parse(&content) {
            Err(ParseError::InvalidRow { row, reason, .. }) => {
                assert_eq!(row, 1);
                assert!(reason.contains("price"));
            }
            other => panic!("expected InvalidRow, got {other:?}"),
        }
    }

    #[test]
    fn test_short_row_reports_missing_value() {
        let content = format!("{HEADER}D1,I,C,1,1.00\n");
        match parse(&content) {
            Err(ParseError::InvalidRow { row, reason, .. }) => {
                assert_eq!(row, 1);
                assert!(reason.contains("discount"));
            }
            other => panic!("expected InvalidRow, got {other:?}"),
        }
    }

    #[test]
    fn test_amount_out_of_range_fails() {
        let content = format!("{HEADER}D1,I,C,99999999999,1.00,0.00\n");
        assert!(matches!(parse(&content), Err(ParseError::InvalidRow { .. })));
    }

    #[test]
    fn test_parse_path_missing_file() {
        let err = RecordParser::new()
            .parse_path(Path::new("/nonexistent/dir/1_1.csv"), TillId::new(1, 1))
            .unwrap_err();
        assert!(matches!(err, ParseError::Io { .. }));
        assert_eq!(err.file(), "1_1.csv");
    }
}
