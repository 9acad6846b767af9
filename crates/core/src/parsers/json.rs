use serde::Deserialize;
use thiserror::Error;

use crate::model::{Record, RecordError};
use crate::parsers::csv::integral_year;

#[derive(Debug, Error)]
pub enum JsonParseError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("entry {entry}: invalid year {value}")]
    InvalidYear { entry: usize, value: f64 },
    #[error("entry {entry}: {source}")]
    Record {
        entry: usize,
        #[source]
        source: RecordError,
    },
    #[error("no records found")]
    Empty,
}

/// Wire shape of one entry. Numbers stay raw until `Record::new` validates them.
#[derive(Debug, Deserialize)]
struct RawRecord {
    country: String,
    /// Read as a number so `1960.0` is accepted like in CSV.
    year: f64,
    #[serde(alias = "lifeExp", alias = "life_exp", alias = "lifeExpectancy")]
    life_expectancy: f64,
}

/// Parse a JSON array of `{ "country", "year", "life_expectancy" }` objects.
///
/// Entry numbers in errors are 0-based array indices.
pub fn parse_json(data: &[u8]) -> Result<Vec<Record>, JsonParseError> {
    let raw: Vec<RawRecord> = serde_json::from_slice(data)?;
    if raw.is_empty() {
        return Err(JsonParseError::Empty);
    }
    raw.into_iter()
        .enumerate()
        .map(|(entry, r)| {
            let year = integral_year(r.year).ok_or(JsonParseError::InvalidYear {
                entry,
                value: r.year,
            })?;
            Record::new(r.country, year, r.life_expectancy)
                .map_err(|source| JsonParseError::Record { entry, source })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_array_with_aliases() {
        let input = br#"[
            {"country": "China", "year": 1960, "life_expectancy": 43.7},
            {"country": "Japan", "year": 1960, "lifeExp": 67.7}
        ]"#;
        let records = parse_json(input).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].country, "Japan");
        assert_eq!(records[1].life_expectancy, 67.7);
    }

    #[test]
    fn string_year_is_rejected() {
        let input = br#"[{"country": "Chad", "year": "1960", "life_expectancy": 38.0}]"#;
        assert!(matches!(parse_json(input), Err(JsonParseError::Json(_))));
    }

    #[test]
    fn whole_float_year_matches_csv() {
        let input = br#"[{"country": "Chad", "year": 1960.0, "life_expectancy": 38.0}]"#;
        let records = parse_json(input).unwrap();
        assert_eq!(records[0].year, 1960);

        let csv_input = b"country,year,life_expectancy\nChad,1960.0,38.0\n";
        let csv = crate::parsers::csv::parse_csv(csv_input).unwrap();
        assert_eq!(records, csv);
    }

    #[test]
    fn fractional_year_reports_entry() {
        let input = br#"[
            {"country": "Chad", "year": 1960, "life_expectancy": 38.0},
            {"country": "Chad", "year": 1960.5, "life_expectancy": 38.0}
        ]"#;
        assert!(matches!(
            parse_json(input),
            Err(JsonParseError::InvalidYear { entry: 1, .. })
        ));
    }

    #[test]
    fn blank_country_reports_entry() {
        let input = br#"[
            {"country": "Chad", "year": 1960, "life_expectancy": 38.0},
            {"country": "", "year": 1960, "life_expectancy": 38.0}
        ]"#;
        assert!(matches!(
            parse_json(input),
            Err(JsonParseError::Record { entry: 1, .. })
        ));
    }

    #[test]
    fn empty_array_errors() {
        assert!(matches!(parse_json(b"[]"), Err(JsonParseError::Empty)));
    }
}
