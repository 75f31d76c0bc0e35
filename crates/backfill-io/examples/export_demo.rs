//! Splice two small in-memory CSV files and print the results in every format.

use backfill_io::{CsvColumns, ExportFormat, Exporter, SeriesExport, SpliceSummary, read_series_csv};
use backfill_splice::{SpliceConfig, run_splice};

const PROXY: &str = "Date,Index\n2010-01-29,100\n2010-02-26,104\n2010-03-31,108\n2010-04-30,105\n";
const TARGET: &str = "Date,Adj Close\n2010-03-31,27.0\n2010-04-30,26.4\n2010-05-28,25.9\n";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let proxy = read_series_csv(PROXY.as_bytes(), &CsvColumns::default())?;
    let target = read_series_csv(TARGET.as_bytes(), &CsvColumns::new("Date", "Adj Close"))?;
    let output = run_splice(&proxy, &target, SpliceConfig::default())?;

    println!("{}", SpliceSummary::from_output(&output));
    println!(
        "{}",
        SeriesExport::new("Spliced Price", &output.prices)
            .with_precision(6)
            .export_to_string(ExportFormat::Csv)?
    );
    println!(
        "{}",
        SeriesExport::new("Monthly Return", &output.returns)
            .with_precision(8)
            .export_to_string(ExportFormat::PrettyJson)?
    );
    Ok(())
}
