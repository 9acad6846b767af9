use thiserror::Error;

use crate::model::{Record, RecordError};

const COUNTRY_COLUMNS: &[&str] = &["country", "country_name", "entity"];
const YEAR_COLUMNS: &[&str] = &["year"];
const LIFE_EXPECTANCY_COLUMNS: &[&str] = &[
    "life_expectancy",
    "lifeexp",
    "life_exp",
    "lifeexpectancy",
];

#[derive(Debug, Error)]
pub enum CsvParseError {
    #[error("invalid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    #[error("no header row found")]
    MissingHeader,
    #[error("header has no {0} column")]
    MissingColumn(&'static str),
    #[error("row {row}: unterminated quoted field")]
    UnterminatedQuote { row: usize },
    #[error("row {row}: expected at least {expected} fields, found {found}")]
    FieldCount {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("row {row}: invalid {column} value {value:?}")]
    InvalidNumber {
        row: usize,
        column: &'static str,
        value: String,
    },
    #[error("row {row}: {source}")]
    Record {
        row: usize,
        #[source]
        source: RecordError,
    },
    #[error("no data rows found")]
    Empty,
}

/// Column positions resolved from the header row.
struct Columns {
    country: usize,
    year: usize,
    life_expectancy: usize,
}

impl Columns {
    fn from_header(fields: &[String]) -> Result<Self, CsvParseError> {
        let find = |names: &[&str], label: &'static str| {
            fields
                .iter()
                .position(|f| names.contains(&f.trim().to_ascii_lowercase().as_str()))
                .ok_or(CsvParseError::MissingColumn(label))
        };
        Ok(Self {
            country: find(COUNTRY_COLUMNS, "country")?,
            year: find(YEAR_COLUMNS, "year")?,
            life_expectancy: find(LIFE_EXPECTANCY_COLUMNS, "life expectancy")?,
        })
    }

    fn width(&self) -> usize {
        self.country.max(self.year).max(self.life_expectancy) + 1
    }
}

/// Parse a comma-separated life expectancy table.
///
/// The first non-blank, non-`#` line is the header; it must name a country
/// column, a `year` column and a life expectancy column (`life_expectancy`,
/// `lifeExp`, `life_exp` or `lifeExpectancy`, case-insensitive). Extra
/// columns are ignored. Fields may be double-quoted with `""` escapes.
///
/// Row numbers in errors are 1-based line numbers of the input.
pub fn parse_csv(data: &[u8]) -> Result<Vec<Record>, CsvParseError> {
    let text = std::str::from_utf8(data)?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut columns: Option<Columns> = None;
    let mut records = Vec::new();

    for (line_index, line) in text.lines().enumerate() {
        let row = line_index + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let fields = split_fields(line).ok_or(CsvParseError::UnterminatedQuote { row })?;

        let Some(cols) = &columns else {
            columns = Some(Columns::from_header(&fields)?);
            continue;
        };

        if fields.len() < cols.width() {
            return Err(CsvParseError::FieldCount {
                row,
                expected: cols.width(),
                found: fields.len(),
            });
        }

        let year = parse_year(&fields[cols.year]).ok_or_else(|| CsvParseError::InvalidNumber {
            row,
            column: "year",
            value: fields[cols.year].clone(),
        })?;
        let life_expectancy = fields[cols.life_expectancy]
            .trim()
            .parse::<f64>()
            .map_err(|_| CsvParseError::InvalidNumber {
                row,
                column: "life expectancy",
                value: fields[cols.life_expectancy].clone(),
            })?;

        let record = Record::new(fields[cols.country].trim(), year, life_expectancy)
            .map_err(|source| CsvParseError::Record { row, source })?;
        records.push(record);
    }

    if columns.is_none() {
        return Err(CsvParseError::MissingHeader);
    }
    if records.is_empty() {
        return Err(CsvParseError::Empty);
    }
    Ok(records)
}

/// Accept `1960` as well as `1960.0`; reject fractional or non-finite years.
fn parse_year(field: &str) -> Option<i32> {
    let field = field.trim();
    if let Ok(year) = field.parse::<i32>() {
        return Some(year);
    }
    integral_year(field.parse::<f64>().ok()?)
}

/// A year given as a number: only whole, finite values in `i32` range.
pub(crate) fn integral_year(value: f64) -> Option<i32> {
    if value.is_finite() && value.fract() == 0.0 && value.abs() <= f64::from(i32::MAX) {
        Some(value as i32)
    } else {
        None
    }
}

/// Split one line into fields, honoring double quotes. Returns `None` when a
/// quoted field is not closed on the same line.
fn split_fields(line: &str) -> Option<Vec<String>> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            '"' if current.trim().is_empty() => {
                current.clear();
                in_quotes = true;
            }
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }

    if in_quotes {
        return None;
    }
    fields.push(current);
    Some(fields)
}
