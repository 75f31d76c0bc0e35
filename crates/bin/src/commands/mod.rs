//! Subcommand implementations.

pub(crate) mod resample;
pub(crate) mod splice;
pub(crate) mod total_return;

pub(crate) use resample::ResampleArgs;
pub(crate) use splice::SpliceArgs;
pub(crate) use total_return::TotalReturnArgs;

use backfill::io::{ExportError, ExportFormat, Exporter, SeriesExport};
use backfill::series::{Period, TimeSeries};
use clap::ValueEnum;
use std::path::Path;
use tracing::info;

/// How results are printed on stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// Pretty-printed JSON
    Json,
}

/// Parse a fixed calendar name such as `month-end` or `weekly-fri`.
pub(crate) fn parse_period(s: &str) -> Result<Period, String> {
    s.parse::<Period>().map_err(|e| e.to_string())
}

/// Write `series` to `path` (format from the extension), or as CSV to stdout.
pub(crate) fn emit_series(
    path: Option<&Path>,
    column: &str,
    series: &TimeSeries,
    precision: usize,
) -> Result<(), ExportError> {
    let export = SeriesExport::new(column, series).with_precision(precision);
    match path {
        Some(path) => {
            export.export_to_file(path, ExportFormat::from_path(path))?;
            info!(path = %path.display(), rows = series.len(), column, "wrote series");
        }
        None => print!("{}", export.export_to_string(ExportFormat::Csv)?),
    }
    Ok(())
}
