//! CSV and JSON export.
//!
//! Series are written as a two-column table, `Date` followed by one value column.
//! Summaries and other records implement [`Exporter`] the same way, so callers pick a
//! format once and write any of them.

use backfill_series::TimeSeries;
use serde_json::{Map, Value};
use std::fmt;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur during export operations.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV serialization error.
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The CSV writer produced bytes that are not UTF-8.
    #[error("Encoding error: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),

    /// Invalid format error.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

/// Export format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    /// Comma-separated values format.
    #[default]
    Csv,

    /// Compact JSON format.
    Json,

    /// Pretty-printed JSON format.
    PrettyJson,
}

impl ExportFormat {
    /// Get the file extension for this format.
    pub const fn extension(&self) -> &str {
        match self {
            Self::Csv => "csv",
            Self::Json | Self::PrettyJson => "json",
        }
    }

    /// Guess the format from a file extension, defaulting to CSV.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::PrettyJson,
            _ => Self::Csv,
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Csv => write!(f, "csv"),
            Self::Json => write!(f, "json"),
            Self::PrettyJson => write!(f, "pretty-json"),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "pretty-json" | "pretty_json" | "pretty" => Ok(Self::PrettyJson),
            other => Err(ExportError::InvalidFormat(other.to_string())),
        }
    }
}

/// Trait for exporting data in various formats.
pub trait Exporter {
    /// Export data to a string in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError>;

    /// Export data to a file in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or file writing fails.
    fn export_to_file(&self, path: &Path, format: ExportFormat) -> Result<(), ExportError> {
        let content = self.export_to_string(format)?;
        let mut file = File::create(path)?;
        file.write_all(content.as_bytes())?;
        debug!(path = %path.display(), %format, bytes = content.len(), "exported");
        Ok(())
    }
}

/// Finish a CSV writer that buffers into memory.
pub(crate) fn finish_csv(wtr: csv::Writer<Vec<u8>>) -> Result<String, ExportError> {
    let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8(bytes)?)
}

/// A series paired with the column name it is written under.
///
/// ```
/// use backfill_io::{ExportFormat, Exporter, SeriesExport};
/// use backfill_series::{Observation, TimeSeries};
/// use chrono::NaiveDate;
///
/// let date = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
/// let series = TimeSeries::new(vec![Observation::new(date, 101.5)]).unwrap();
/// let csv = SeriesExport::new("Spliced Price", &series)
///     .with_precision(6)
///     .export_to_string(ExportFormat::Csv)
///     .unwrap();
/// assert_eq!(csv, "Date,Spliced Price\n2024-01-31,101.500000\n");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SeriesExport<'a> {
    column: &'a str,
    series: &'a TimeSeries,
    precision: Option<usize>,
}

impl<'a> SeriesExport<'a> {
    /// Export `series` under the value column `column`, at full precision.
    pub const fn new(column: &'a str, series: &'a TimeSeries) -> Self {
        Self {
            column,
            series,
            precision: None,
        }
    }

    /// Round values to `digits` decimal places.
    pub const fn with_precision(mut self, digits: usize) -> Self {
        self.precision = Some(digits);
        self
    }

    fn csv_value(&self, value: f64) -> String {
        match self.precision {
            Some(digits) => format!("{value:.digits$}"),
            None => value.to_string(),
        }
    }

    fn json_value(&self, value: f64) -> Value {
        let value = match self.precision {
            Some(digits) => {
                let scale = 10f64.powi(i32::try_from(digits).unwrap_or(i32::MAX));
                if scale.is_finite() {
                    (value * scale).round() / scale
                } else {
                    value
                }
            }
            None => value,
        };
        serde_json::Number::from_f64(value).map_or(Value::Null, Value::Number)
    }

    fn json_rows(&self) -> Vec<Value> {
        self.series
            .iter()
            .map(|o| {
                let mut row = Map::with_capacity(2);
                row.insert("date".to_string(), Value::String(o.date.to_string()));
                row.insert(self.column.to_string(), self.json_value(o.value));
                Value::Object(row)
            })
            .collect()
    }
}

impl Exporter for SeriesExport<'_> {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => {
                let mut wtr = csv::Writer::from_writer(vec![]);
                wtr.write_record(["Date", self.column])?;
                for o in self.series {
                    wtr.write_record([o.date.to_string(), self.csv_value(o.value)])?;
                }
                finish_csv(wtr)
            }
            ExportFormat::Json => Ok(serde_json::to_string(&self.json_rows())?),
            ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(&self.json_rows())?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use backfill_series::Observation;
    use chrono::NaiveDate;
    use rstest::rstest;

    fn returns() -> TimeSeries {
        let d = |m, day| NaiveDate::from_ymd_opt(2020, m, day).unwrap();
        TimeSeries::new(vec![
            Observation::new(d(1, 31), 0.012_345_678_9),
            Observation::new(d(2, 29), -0.05),
        ])
        .unwrap()
    }

    #[test]
    fn test_series_csv_full_precision() {
        let series = returns();
        let csv = SeriesExport::new("Monthly Return", &series)
            .export_to_string(ExportFormat::Csv)
            .unwrap();
        assert_eq!(
            csv,
            "Date,Monthly Return\n2020-01-31,0.0123456789\n2020-02-29,-0.05\n"
        );
    }

    #[test]
    fn test_series_csv_rounded() {
        let series = returns();
        let csv = SeriesExport::new("Monthly Return", &series)
            .with_precision(8)
            .export_to_string(ExportFormat::Csv)
            .unwrap();
        assert!(csv.contains("2020-01-31,0.01234568\n"));
        assert!(csv.contains("2020-02-29,-0.05000000\n"));
    }

    #[test]
    fn test_series_json_rows() {
        let series = returns();
        let json = SeriesExport::new("ret", &series)
            .with_precision(4)
            .export_to_string(ExportFormat::Json)
            .unwrap();
        let rows: Vec<Value> = serde_json::from_str(&json).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["date"], "2020-01-31");
        assert_eq!(rows[0]["ret"].as_f64(), Some(0.0123));
        assert_eq!(rows[1]["ret"].as_f64(), Some(-0.05));
    }

    #[test]
    fn test_empty_series_has_header_only() {
        let series = TimeSeries::empty();
        let csv = SeriesExport::new("Price", &series)
            .export_to_string(ExportFormat::Csv)
            .unwrap();
        assert_eq!(csv, "Date,Price\n");
    }

    #[rstest]
    #[case("csv", ExportFormat::Csv)]
    #[case("JSON", ExportFormat::Json)]
    #[case("pretty-json", ExportFormat::PrettyJson)]
    #[case("pretty", ExportFormat::PrettyJson)]
    fn test_format_parse(#[case] input: &str, #[case] expected: ExportFormat) {
        assert_eq!(input.parse::<ExportFormat>().unwrap(), expected);
    }

    #[test]
    fn test_format_parse_rejects_unknown() {
        assert!(matches!(
            "xlsx".parse::<ExportFormat>(),
            Err(ExportError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(ExportFormat::from_path(Path::new("out/prices.csv")), ExportFormat::Csv);
        assert_eq!(ExportFormat::from_path(Path::new("summary.JSON")), ExportFormat::PrettyJson);
        assert_eq!(ExportFormat::from_path(Path::new("noext")), ExportFormat::Csv);
        assert_eq!(ExportFormat::PrettyJson.extension(), "json");
    }
}
