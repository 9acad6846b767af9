pub mod csv;
pub mod json;

use crate::model::Dataset;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("csv: {0}")]
    Csv(#[from] csv::CsvParseError),
    #[error("json: {0}")]
    Json(#[from] json::JsonParseError),
}

/// Auto-detect the dataset format and parse it.
///
/// Detection strategy:
/// 1. A payload whose first non-whitespace byte is `[` is a JSON array of records.
/// 2. Everything else is treated as CSV with a header row.
pub fn parse_auto(data: &[u8]) -> Result<Dataset, ParseError> {
    let data = data.strip_prefix(b"\xef\xbb\xbf").unwrap_or(data);
    let first = data.iter().find(|b| !b.is_ascii_whitespace());
    let records = if first == Some(&b'[') {
        json::parse_json(data)?
    } else {
        csv::parse_csv(data)?
    };
    Ok(Dataset::new(records))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_json() {
        let data = br#"  [{"country": "Chad", "year": 1960, "life_expectancy": 38.0}]"#;
        let dataset = parse_auto(data).unwrap();
        assert_eq!(dataset.len(), 1);
    }

    #[test]
    fn falls_back_to_csv() {
        let data = b"country,year,life_expectancy\nChad,1960,38.0\nChad,1965,39.5\n";
        let dataset = parse_auto(data).unwrap();
        assert_eq!(dataset.len(), 2);
    }

    #[test]
    fn errors_carry_format_prefix() {
        let err = parse_auto(b"country,year\nChad,1960\n").unwrap_err();
        assert!(err.to_string().starts_with("csv:"));
    }
}
