//! CSV import.
//!
//! Reads one date column and one value column into raw [`Observation`]s. Rows are
//! returned in file order; sorting, gap handling and periodisation belong to the
//! resampler.

use backfill_series::{Observation, Period};
use chrono::NaiveDate;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, trace};

/// Errors raised while reading a series from CSV.
#[derive(Debug, Error)]
pub enum ImportError {
    /// CSV parsing error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A requested column is not in the header.
    #[error("Column '{column}' not found (available: {available})")]
    MissingColumn {
        /// Requested column
        column: String,
        /// Header as read, comma separated
        available: String,
    },

    /// A cell could not be parsed.
    #[error("Line {line}: {message}")]
    Parse {
        /// 1-based line number in the file
        line: u64,
        /// What went wrong
        message: String,
    },
}

/// Which columns hold the dates and the values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvColumns {
    /// Date column header.
    pub date: String,

    /// Value column header; `None` takes the first column that is not the date column.
    pub value: Option<String>,
}

impl Default for CsvColumns {
    fn default() -> Self {
        Self {
            date: "Date".to_string(),
            value: None,
        }
    }
}

impl CsvColumns {
    /// Date column `date`, value column `value`.
    pub fn new(date: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            value: Some(value.into()),
        }
    }

    fn resolve(&self, headers: &csv::StringRecord) -> Result<(usize, usize), ImportError> {
        let date = find_column(headers, &self.date)?;
        let value = match &self.value {
            Some(name) => find_column(headers, name)?,
            None => (0..headers.len()).find(|&i| i != date).ok_or_else(|| {
                ImportError::MissingColumn {
                    column: "<value>".to_string(),
                    available: join_headers(headers),
                }
            })?,
        };
        Ok((date, value))
    }
}

/// Exact match first, then case-insensitive.
fn find_column(headers: &csv::StringRecord, name: &str) -> Result<usize, ImportError> {
    let name = name.trim();
    headers
        .iter()
        .position(|h| h.trim() == name)
        .or_else(|| headers.iter().position(|h| h.trim().eq_ignore_ascii_case(name)))
        .ok_or_else(|| ImportError::MissingColumn {
            column: name.to_string(),
            available: join_headers(headers),
        })
}

fn join_headers(headers: &csv::StringRecord) -> String {
    headers.iter().collect::<Vec<_>>().join(", ")
}

/// Parse a date cell.
///
/// Accepts `YYYY-MM-DD` with an optional trailing time component, `MM/DD/YYYY`, and
/// `MM/YYYY`, which is read as the last day of that month.
fn parse_date(cell: &str) -> Option<NaiveDate> {
    let cell = cell.trim();
    if let Some(prefix) = cell.get(..10) {
        if let Ok(date) = NaiveDate::parse_from_str(prefix, "%Y-%m-%d") {
            return Some(date);
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(cell, "%m/%d/%Y") {
        return Some(date);
    }
    let (month, year) = cell.split_once('/')?;
    let first = NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, 1)?;
    Period::MonthEnd.label(first)
}

/// Parse a value cell; blanks and the usual missing markers become NaN.
fn parse_value(cell: &str) -> Result<f64, String> {
    let cell = cell.trim();
    if cell.is_empty()
        || cell.eq_ignore_ascii_case("nan")
        || cell.eq_ignore_ascii_case("null")
        || cell.eq_ignore_ascii_case("na")
    {
        return Ok(f64::NAN);
    }
    cell.parse::<f64>()
        .map_err(|e| format!("invalid value '{cell}': {e}"))
}

/// Read observations from any CSV source with a header row.
///
/// # Errors
/// Returns [`ImportError::MissingColumn`] if a column is absent and
/// [`ImportError::Parse`] for an unreadable date or value.
pub fn read_series_csv<R: Read>(
    reader: R,
    columns: &CsvColumns,
) -> Result<Vec<Observation>, ImportError> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = rdr.headers()?.clone();
    let (date_idx, value_idx) = columns.resolve(&headers)?;

    let mut out = Vec::new();
    for record in rdr.records() {
        let record = record?;
        let line = record.position().map_or(0, |p| p.line());
        let date_cell = record.get(date_idx).unwrap_or_default();
        if date_cell.trim().is_empty() {
            trace!(line, "skipping row without a date");
            continue;
        }
        let date = parse_date(date_cell).ok_or_else(|| ImportError::Parse {
            line,
            message: format!("invalid date '{}'", date_cell.trim()),
        })?;
        let value = parse_value(record.get(value_idx).unwrap_or_default())
            .map_err(|message| ImportError::Parse { line, message })?;
        out.push(Observation::new(date, value));
    }

    debug!(
        rows = out.len(),
        date_column = %headers.get(date_idx).unwrap_or_default(),
        value_column = %headers.get(value_idx).unwrap_or_default(),
        "read series"
    );
    Ok(out)
}

/// Read observations from a CSV file.
///
/// # Errors
/// Returns [`ImportError::Io`] if the file cannot be opened, otherwise as
/// [`read_series_csv`].
pub fn read_series_file(
    path: impl AsRef<Path>,
    columns: &CsvColumns,
) -> Result<Vec<Observation>, ImportError> {
    let path = path.as_ref();
    debug!(path = %path.display(), "opening series");
    read_series_csv(File::open(path)?, columns)
}
