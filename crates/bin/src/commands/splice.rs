//! `backfill splice`

use super::{OutputFormat, emit_series, parse_period};
use backfill::io::{CsvColumns, ExportFormat, Exporter, SpliceSummary, read_series_file};
use backfill::series::Period;
use backfill::splice::{ReturnMethod, ScalePolicy, SpliceConfig, SpliceEngine};
use chrono::NaiveDate;
use clap::{Args, ValueEnum};
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Return derivation, as named on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum ReturnMethodArg {
    /// Period change of the spliced prices
    Prices,
    /// Proxy returns before the cutover, target returns after
    ProxyThenTarget,
    /// As proxy-then-target, with proxy returns multiplied by the scale factor
    ScaledProxyThenTarget,
}

impl From<ReturnMethodArg> for ReturnMethod {
    fn from(arg: ReturnMethodArg) -> Self {
        match arg {
            ReturnMethodArg::Prices => Self::FromSplicedPrices,
            ReturnMethodArg::ProxyThenTarget => Self::ProxyThenTarget {
                scale_proxy_returns: false,
            },
            ReturnMethodArg::ScaledProxyThenTarget => Self::ProxyThenTarget {
                scale_proxy_returns: true,
            },
        }
    }
}

#[derive(Debug, Args)]
pub(crate) struct SpliceArgs {
    /// CSV file with the long proxy history
    #[arg(long)]
    proxy: PathBuf,

    /// CSV file with the short target history
    #[arg(long)]
    target: PathBuf,

    /// Date column in both files
    #[arg(long, default_value = "Date")]
    date_column: String,

    /// Proxy value column (default: first non-date column)
    #[arg(long)]
    proxy_column: Option<String>,

    /// Target value column
    #[arg(long, default_value = "Adj Close")]
    target_column: String,

    /// JSON splice configuration; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Period grid (daily, weekly[-day], month-end, quarter-end, year-end)
    #[arg(long, value_parser = parse_period)]
    period: Option<Period>,

    /// Scale policy (single-point or regression)
    #[arg(long)]
    policy: Option<ScalePolicy>,

    /// Anchor period end for the single-point policy (YYYY-MM-DD, on the --period grid)
    #[arg(long)]
    anchor: Option<NaiveDate>,

    /// First period taken from the target (YYYY-MM-DD, inside the span both files cover)
    #[arg(long)]
    cutover: Option<NaiveDate>,

    /// Drop the return of the cutover period
    #[arg(long)]
    drop_cutover_return: bool,

    /// Reject unsorted input instead of sorting it
    #[arg(long)]
    strict: bool,

    /// How returns are derived
    #[arg(long, value_enum)]
    return_method: Option<ReturnMethodArg>,

    /// Write spliced prices here (.csv or .json)
    #[arg(long)]
    prices_out: Option<PathBuf>,

    /// Write returns here (.csv or .json)
    #[arg(long)]
    returns_out: Option<PathBuf>,

    /// Write the summary here (.csv or .json)
    #[arg(long)]
    summary_out: Option<PathBuf>,

    /// Column name for spliced prices
    #[arg(long, default_value = "Spliced Price")]
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

    /// Summary format on stdout
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

impl SpliceArgs {
    /// Configuration file (or defaults) with flag overrides applied.
    fn splice_config(&self) -> Result<SpliceConfig, Box<dyn Error>> {
        let mut config = self
            .config
            .as_deref()
            .map(load_config)
            .transpose()?
            .unwrap_or_default();

        if let Some(period) = &self.period {
            config.periodicity = period.clone();
        }
        if let Some(policy) = self.policy {
            config.scale_policy = policy;
        }
        if self.anchor.is_some() {
            config.anchor_date = self.anchor;
        }
        if self.cutover.is_some() {
            config.cutover = self.cutover;
        }
        if self.drop_cutover_return {
            config.keep_cutover_period_return = false;
        }
        if self.strict {
            config.strict_input_order = true;
        }
        if let Some(method) = self.return_method {
            config.return_method = method.into();
        }
        Ok(config)
    }
}

fn load_config(path: &Path) -> Result<SpliceConfig, Box<dyn Error>> {
    let text = fs::read_to_string(path)?;
    let config = serde_json::from_str(&text)?;
    debug!(path = %path.display(), "loaded configuration");
    Ok(config)
}

pub(crate) fn run(args: &SpliceArgs) -> Result<(), Box<dyn Error>> {
    let config = args.splice_config()?;
    info!(
        period = %config.periodicity,
        policy = %config.scale_policy,
        "splicing {} onto {}",
        args.proxy.display(),
        args.target.display()
    );

    let proxy = read_series_file(
        &args.proxy,
        &CsvColumns {
            date: args.date_column.clone(),
            value: args.proxy_column.clone(),
        },
    )?;
    let target = read_series_file(
        &args.target,
        &CsvColumns::new(args.date_column.as_str(), args.target_column.as_str()),
    )?;

    let output = SpliceEngine::new(config)?.run(&proxy, &target)?;

    if let Some(path) = &args.prices_out {
        emit_series(Some(path), &args.price_label, &output.prices, args.price_precision)?;
    }
    if let Some(path) = &args.returns_out {
        emit_series(Some(path), &args.return_label, &output.returns, args.return_precision)?;
    }

    let summary = SpliceSummary::from_output(&output);
    if let Some(path) = &args.summary_out {
        summary.export_to_file(path, ExportFormat::from_path(path))?;
    }
    match args.format {
        OutputFormat::Text => print!("{summary}"),
        OutputFormat::Json => println!("{}", summary.export_to_string(ExportFormat::PrettyJson)?),
    }
    Ok(())
}
