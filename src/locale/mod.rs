//! Decimal separator rewriting for numeric-looking fields.

use regex::Regex;

/// Rewrites numbers from one decimal separator convention to another.
///
/// Only fields that look like a plain number in the source convention are
/// touched, so text such as "a,b" survives unchanged.
#[derive(Debug, Clone)]
pub struct LocaleNormalizer {
    from: char,
    to: char,
    numeric: Regex,
}

impl LocaleNormalizer {
    /// Returns `None` when both conventions agree and there is nothing to do.
    pub fn new(from: char, to: char) -> Option<Self> {
        if from == to {
            return None;
        }
        let sep = regex::escape(&from.to_string());
        let numeric = Regex::new(&format!(r"^-?\d+(?:{}\d+)?$", sep)).ok()?;
        Some(Self { from, to, numeric })
    }

    pub fn normalize_field(&self, value: &str) -> String {
        if self.numeric.is_match(value.trim()) {
            let mut buf = [0u8; 4];
            value.replacen(self.from, self.to.encode_utf8(&mut buf), 1)
        } else {
            value.to_string()
        }
    }

    /// Normalize every field of a parsed record.
    pub fn normalize_row(&self, row: Vec<String>) -> Vec<String> {
        row.into_iter().map(|f| self.normalize_field(&f)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_separators_short_circuit() {
        assert!(LocaleNormalizer::new('.', '.').is_none());
    }

    #[test]
    fn test_comma_to_dot() {
        let n = LocaleNormalizer::new(',', '.').unwrap();
        assert_eq!(n.normalize_field("12,50"), "12.50");
        assert_eq!(n.normalize_field("-3,1"), "-3.1");
        assert_eq!(n.normalize_field(" 7,0 "), " 7.0 ");
        assert_eq!(n.normalize_field("42"), "42");
    }

    #[test]
    fn test_non_numeric_fields_pass_through() {
        let n = LocaleNormalizer::new(',', '.').unwrap();
        assert_eq!(n.normalize_field("a,b"), "a,b");
        assert_eq!(n.normalize_field("1,2,3"), "1,2,3");
        assert_eq!(n.normalize_field("1,"), "1,");
        assert_eq!(n.normalize_field(""), "");
    }

    #[test]
    fn test_dot_to_comma_escapes_separator() {
        let n = LocaleNormalizer::new('.', ',').unwrap();
        assert_eq!(n.normalize_field("3.14"), "3,14");
        // '.' must not act as a regex wildcard
        assert_eq!(n.normalize_field("3x14"), "3x14");
    }

    #[test]
    fn test_normalize_row() {
        let n = LocaleNormalizer::new(',', '.').unwrap();
        let row = vec!["x".to_string(), "1,5".to_string(), "a,b".to_string()];
        assert_eq!(n.normalize_row(row), vec!["x", "1.5", "a,b"]);
    }
}
