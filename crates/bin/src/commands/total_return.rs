//! `backfill total-return`

use super::{emit_series, parse_period};
use backfill::io::{CsvColumns, read_series_file};
use backfill::series::{InputOrder, Observation, Period, resample, total_return_index};
use clap::Args;
use std::error::Error;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Args)]
pub(crate) struct TotalReturnArgs {
    /// CSV file with prices
    #[arg(long)]
    prices: PathBuf,

    /// CSV file with cash dividends (default: the prices file)
    #[arg(long)]
    dividends: Option<PathBuf>,

    /// Date column in both files
    #[arg(long, default_value = "Date")]
    date_column: String,

    /// Price column
    #[arg(long, default_value = "Close")]
    price_column: String,

    /// Dividend column
    #[arg(long, default_value = "Dividends")]
    dividend_column: String,

    /// Resample the index onto this grid after building it
    #[arg(long, value_parser = parse_period)]
    period: Option<Period>,

    /// Write the index here (default: stdout)
    #[arg(long)]
    out: Option<PathBuf>,

    /// Column name for the index
    #[arg(long, default_value = "Total Return")]
    label: String,

    /// Decimal places
    #[arg(long, default_value_t = 6)]
    precision: usize,
}

pub(crate) fn run(args: &TotalReturnArgs) -> Result<(), Box<dyn Error>> {
    let prices = read_series_file(
        &args.prices,
        &CsvColumns::new(args.date_column.as_str(), args.price_column.as_str()),
    )?;
    let dividends = read_series_file(
        args.dividends.as_ref().unwrap_or(&args.prices),
        &CsvColumns::new(args.date_column.as_str(), args.dividend_column.as_str()),
    )?;
    // Blank and zero cells are days without a payment.
    let dividends: Vec<Observation> = dividends
        .into_iter()
        .filter(|o| o.value.is_finite() && o.value != 0.0)
        .collect();

    let prices = resample(&prices, &Period::Daily, InputOrder::Lenient)?;
    let dividends = resample(&dividends, &Period::Daily, InputOrder::Lenient)?;
    let mut index = total_return_index(&prices, &dividends)?;
    info!(prices = prices.len(), dividends = dividends.len(), "built total-return index");

    if let Some(period) = &args.period {
        index = resample(index.observations(), period, InputOrder::Lenient)?;
    }
    emit_series(args.out.as_deref(), &args.label, &index, args.precision)?;
    Ok(())
}
