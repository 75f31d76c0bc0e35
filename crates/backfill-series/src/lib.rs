#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/backfill/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod period;
pub mod resample;
pub mod returns;
pub mod series;
pub mod total_return;

pub use error::{Result, SeriesError};
pub use period::Period;
pub use resample::{InputOrder, resample};
pub use returns::{compound, simple_returns};
pub use series::{DateRange, Observation, TimeSeries};
pub use total_return::total_return_index;
