//! Delimited record parsing for source files.

use crate::config::{ColumnSelection, Delimiter, SyncConfig};
use csv::ReaderBuilder;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("File is not valid UTF-8 (byte {0})")]
    InvalidUtf8(usize),

    #[error("Failed to parse record {0}: {1}")]
    Record(usize, String),
}

/// How a file's records are split, skipped and projected
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParseOptions {
    pub delimiter: Delimiter,
    pub skip_rows: usize,
    pub columns: ColumnSelection,
}

impl ParseOptions {
    pub fn from_config(config: &SyncConfig) -> Self {
        Self {
            delimiter: config.delimiter,
            skip_rows: config.skip_rows,
            columns: config.columns.clone(),
        }
    }
}

/// Parse raw file content into records.
///
/// Records before `skip_rows` are dropped. With a column list, each record is
/// reduced to those positions in that order and missing positions become "".
pub fn parse_records(bytes: &[u8], options: &ParseOptions) -> Result<Vec<Vec<String>>, ParseError> {
    let text = std::str::from_utf8(bytes).map_err(|e| ParseError::InvalidUtf8(e.valid_up_to()))?;

    let mut reader = ReaderBuilder::new()
        .delimiter(options.delimiter.as_byte())
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut records = Vec::new();
    for (index, result) in reader.records().enumerate() {
        let record = result.map_err(|e| ParseError::Record(index + 1, e.to_string()))?;
        if index < options.skip_rows {
            continue;
        }

        let fields = match &options.columns {
            ColumnSelection::All => record.iter().map(str::to_string).collect(),
            ColumnSelection::Positions(positions) => positions
                .iter()
                .map(|&p| record.get(p).unwrap_or("").to_string())
                .collect(),
        };
        records.push(fields);
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(skip_rows: usize, columns: ColumnSelection) -> ParseOptions {
        ParseOptions {
            delimiter: Delimiter::Comma,
            skip_rows,
            columns,
        }
    }

    #[test]
    fn test_skips_header_and_keeps_all_columns() {
        let content = b"name,qty\napple,3\npear,5\n";
        let records = parse_records(content, &options(1, ColumnSelection::All)).unwrap();
        assert_eq!(records, vec![vec!["apple", "3"], vec!["pear", "5"]]);
    }

    #[test]
    fn test_quoted_fields() {
        let content = b"\"a, b\",\"say \"\"hi\"\"\"\n\"multi\nline\",x\n";
        let records = parse_records(content, &options(0, ColumnSelection::All)).unwrap();
        assert_eq!(records[0], vec!["a, b", "say \"hi\""]);
        assert_eq!(records[1], vec!["multi\nline", "x"]);
    }

    #[test]
    fn test_projection_reorders_and_pads_missing() {
        let content = b"h1,h2,h3\na,b,c\nd\n";
        let records = parse_records(
            content,
            &options(1, ColumnSelection::Positions(vec![2, 0, 7])),
        )
        .unwrap();
        assert_eq!(records, vec![vec!["c", "a", ""], vec!["", "d", ""]]);
    }

    #[test]
    fn test_semicolon_and_tab_delimiters() {
        let semi = ParseOptions {
            delimiter: Delimiter::Semicolon,
            ..Default::default()
        };
        let records = parse_records(b"1;2,5\n", &semi).unwrap();
        assert_eq!(records, vec![vec!["1", "2,5"]]);

        let tab = ParseOptions {
            delimiter: Delimiter::Tab,
            ..Default::default()
        };
        let records = parse_records(b"x\ty\n", &tab).unwrap();
        assert_eq!(records, vec![vec!["x", "y"]]);
    }

    #[test]
    fn test_header_only_file_yields_no_records() {
        let records = parse_records(b"a,b\n", &options(1, ColumnSelection::All)).unwrap();
        assert!(records.is_empty());

        let records = parse_records(b"", &options(1, ColumnSelection::All)).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_invalid_utf8_is_an_error() {
        let result = parse_records(b"ok,\xff\xfe\n", &options(0, ColumnSelection::All));
        assert!(matches!(result, Err(ParseError::InvalidUtf8(3))));
    }

    #[test]
    fn test_ragged_rows_are_kept() {
        let records = parse_records(b"a\nb,c,d\n", &options(0, ColumnSelection::All)).unwrap();
        assert_eq!(records, vec![vec!["a"], vec!["b", "c", "d"]]);
    }
}
