#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/backfill/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod export;
pub mod import;
pub mod summary;

pub use export::{ExportError, ExportFormat, Exporter, SeriesExport};
pub use import::{CsvColumns, ImportError, read_series_csv, read_series_file};
pub use summary::{Coverage, SpliceSummary};
