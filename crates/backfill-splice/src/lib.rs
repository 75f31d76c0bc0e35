#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/backfill/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod config;
pub mod engine;
pub mod error;
pub mod scale;
pub mod splice;

pub use config::{ReturnMethod, ScalePolicy, SpliceConfig};
pub use engine::{SpliceEngine, SpliceOutput};
pub use error::{CutoverProblem, Result, SeriesRole, SpliceError};
pub use scale::{
    MIN_REGRESSION_PAIRS, OverlapWindow, RegressionAnchor, ScaleEstimate, ScaleEstimator,
    ScaleFactor, SinglePointAnchor,
};
pub use splice::{splice_prices, splice_returns, validate_cutover};

/// Splice `proxy` onto `target` with `config`.
///
/// Shorthand for [`SpliceEngine::new`] followed by [`SpliceEngine::run`].
pub fn run_splice(
    proxy: &[backfill_series::Observation],
    target: &[backfill_series::Observation],
    config: SpliceConfig,
) -> Result<SpliceOutput> {
    SpliceEngine::new(config)?.run(proxy, target)
}
