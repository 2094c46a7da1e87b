//! File-name convention for till exports: `<shopNumber>_<cashNumber>.<ext>`.

use regex::Regex;

use super::record::TillId;

/// Default extension of till export files.
pub const DEFAULT_EXTENSION: &str = "csv";

/// Classifies file names against the till export naming convention.
///
/// Matching is exact: both identifiers must be plain decimal digits, the
/// extension must match byte for byte, and nothing may precede or follow.
#[derive(Debug, Clone)]
pub struct NamingValidator {
    pattern: Regex,
}

impl Default for NamingValidator {
    fn default() -> Self {
        Self::new(DEFAULT_EXTENSION)
    }
}

impl NamingValidator {
    /// Creates a validator accepting `<digits>_<digits>.<extension>`.
    pub fn new(extension: &str) -> Self {
        let pattern = Regex::new(&format!(r"^(\d+)_(\d+)\.{}$", regex::escape(extension)))
            .expect("Invalid regex for till export names");

        Self { pattern }
    }

    /// Extracts the till identifiers from `file_name`, or `None` on mismatch.
    ///
    /// Identifiers that do not fit the 32-bit store columns count as a mismatch.
    pub fn classify(&self, file_name: &str) -> Option<TillId> {
        let caps = self.pattern.captures(file_name)?;
        let shop_num: i32 = caps.get(1)?.as_str().parse().ok()?;
        let cash_num: i32 = caps.get(2)?.as_str().parse().ok()?;
        Some(TillId::new(shop_num, cash_num))
    }

    /// Returns `true` if `file_name` follows the convention.
    pub fn is_match(&self, file_name: &str) -> bool {
        self.classify(file_name).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_valid_names() {
        let v = NamingValidator::default();
        assert_eq!(v.classify("3_2.csv"), Some(TillId::new(3, 2)));
        assert_eq!(v.classify("0_0.csv"), Some(TillId::new(0, 0)));
        assert_eq!(v.classify("007_12.csv"), Some(TillId::new(7, 12)));
    }

    #[test]
    fn test_classify_rejects_near_misses() {
        let v = NamingValidator::default();
        for name in [
            "3_2.CSV",
            "3_2.csv.bak",
            "3_2.txt",
            "3-2.csv",
            "3_2_1.csv",
            "a_2.csv",
            "-3_2.csv",
            " 3_2.csv",
            "3_.csv",
            "_2.csv",
            "3_2csv",
            "generator.log",
            "processed",
        ] {
            assert!(v.classify(name).is_none(), "{name} should be rejected");
        }
    }

    #[test]
    fn test_classify_rejects_out_of_range_numbers() {
        let v = NamingValidator::default();
        assert!(v.classify("99999999999_1.csv").is_none());
        assert_eq!(
            v.classify("2147483647_1.csv"),
            Some(TillId::new(i32::MAX, 1))
        );
    }

    #[test]
    fn test_custom_extension_is_escaped() {
        let v = NamingValidator::new("tsv");
        assert!(v.is_match("1_1.tsv"));
        assert!(!v.is_match("1_1.csv"));

        let dotted = NamingValidator::new("c.v");
        assert!(dotted.is_match("1_1.c.v"));
        assert!(!dotted.is_match("1_1.cxv"));
    }
}
