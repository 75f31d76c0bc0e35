#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/backfill/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export main types from sub-crates
pub use backfill_io as io;
pub use backfill_series as series;
pub use backfill_splice as splice;

// Re-export common types
pub use backfill_io::{CsvColumns, ExportFormat, Exporter, SeriesExport, SpliceSummary};
pub use backfill_series::{Observation, Period, TimeSeries};
pub use backfill_splice::{
    ReturnMethod, ScalePolicy, SpliceConfig, SpliceEngine, SpliceError, SpliceOutput, run_splice,
};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
