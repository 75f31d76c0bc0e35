//! `backfill resample`

use super::{emit_series, parse_period};
use backfill::io::{CsvColumns, read_series_file};
use backfill::series::{InputOrder, Period, resample, simple_returns};
use clap::Args;
use std::error::Error;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Args)]
pub(crate) struct ResampleArgs {
    /// CSV file to resample
    #[arg(long)]
    input: PathBuf,

    /// Date column
    #[arg(long, default_value = "Date")]
    date_column: String,

    /// Value column (default: first non-date column)
    #[arg(long)]
    value_column: Option<String>,

    /// Period grid (daily, weekly[-day], month-end, quarter-end, year-end)
    #[arg(long, value_parser = parse_period, default_value = "month-end")]
    period: Period,

    /// Reject unsorted input instead of sorting it
    #[arg(long)]
    strict: bool,

    /// Write period-end prices here (default: stdout)
    #[arg(long)]
    out: Option<PathBuf>,

    /// Write period returns here
    #[arg(long)]
    returns_out: Option<PathBuf>,

    /// Column name for prices
    #[arg(long, default_value = "Price")]
    price_label: String,

    /// Column name for returns
    #[arg(long, default_value = "Return")]
    return_label: String,

    /// Decimal places for prices
    #[arg(long, default_value_t = 6)]
    price_precision: usize,

    /// Decimal places for returns
    #[arg(long, default_value_t = 8)]
    return_precision: usize,
}

pub(crate) fn run(args: &ResampleArgs) -> Result<(), Box<dyn Error>> {
    let raw = read_series_file(
        &args.input,
        &CsvColumns {
            date: args.date_column.clone(),
            value: args.value_column.clone(),
        },
    )?;
    let prices = resample(&raw, &args.period, InputOrder::from_strict(args.strict))?;
    info!(raw = raw.len(), periods = prices.len(), period = %args.period, "resampled");

    emit_series(args.out.as_deref(), &args.price_label, &prices, args.price_precision)?;
    if let Some(path) = &args.returns_out {
        let returns = simple_returns(&prices)?;
        emit_series(Some(path), &args.return_label, &returns, args.return_precision)?;
    }
    Ok(())
}
