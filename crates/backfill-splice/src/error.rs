//! Error types for the splice engine.

use backfill_series::{DateRange, Period, SeriesError};
use chrono::NaiveDate;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for splice operations.
pub type Result<T> = std::result::Result<T, SpliceError>;

/// Which series an error or diagnostic refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesRole {
    /// Long, lower-fidelity history.
    #[display("proxy")]
    Proxy,
    /// Short, authoritative history.
    #[display("target")]
    Target,
    /// The stitched output.
    #[display("spliced")]
    Spliced,
}

/// Why a cutover date was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum CutoverProblem {
    /// Not a period-end date on the configured grid.
    #[display("not on a period boundary")]
    Unaligned,
    /// Before the later first period or after the earlier last period of the two series.
    #[display("outside the overlap window")]
    OutsideOverlap,
    /// Inside the overlap window, but the target has no value for that period.
    #[display("no target value for that period")]
    MissingTargetValue,
}

/// Errors that abort a splice.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SpliceError {
    /// An input series has no usable observations.
    #[error("Empty input: the {role} series has no observations")]
    EmptyInput {
        /// Series that was empty
        role: SeriesRole,
    },

    /// Not enough shared periods to compute a scale factor.
    #[error(
        "No overlap between proxy ({proxy}) and target ({target}): \
         {paired} paired observations, need {required}"
    )]
    NoOverlap {
        /// Span of the resampled proxy
        proxy: DateRange,
        /// Span of the resampled target
        target: DateRange,
        /// Paired observations found
        paired: usize,
        /// Paired observations required
        required: usize,
    },

    /// All proxy returns over the overlap are zero.
    #[error(
        "Degenerate regression over {overlap}: sum of squared proxy returns is zero \
         across {observations} paired returns"
    )]
    DegenerateRegression {
        /// Span of the paired returns
        overlap: DateRange,
        /// Number of paired returns
        observations: usize,
    },

    /// The cutover date cannot partition the output.
    #[error("Invalid cutover {cutover}: {problem} (overlap window {valid})")]
    InvalidCutover {
        /// Requested cutover
        cutover: NaiveDate,
        /// Span covered by both resampled series
        valid: DateRange,
        /// What is wrong with it
        problem: CutoverProblem,
    },

    /// Input dates are not strictly increasing and strict ordering was requested.
    #[error("Non-monotonic {role} input at position {index}: {date} does not follow {previous}")]
    NonMonotonicInput {
        /// Offending series
        role: SeriesRole,
        /// Position of the offending observation
        index: usize,
        /// Date of the preceding observation
        previous: NaiveDate,
        /// Offending date
        date: NaiveDate,
    },

    /// The configured anchor date is missing from one or both series.
    #[error("Anchor {anchor} not found (in proxy: {in_proxy}, in target: {in_target})")]
    MissingAnchor {
        /// Configured anchor date
        anchor: NaiveDate,
        /// Whether the resampled proxy has the date
        in_proxy: bool,
        /// Whether the resampled target has the date
        in_target: bool,
    },

    /// The configured anchor date is not a period end on the configured grid.
    #[error(
        "Anchor {anchor} is not a period end on the {period} grid{}",
        period_end_hint(.period_end)
    )]
    UnalignedAnchor {
        /// Configured anchor date
        anchor: NaiveDate,
        /// Configured grid
        period: Period,
        /// Label of the period containing the anchor, if any
        period_end: Option<NaiveDate>,
    },

    /// The computed ratio or slope is not a finite positive number.
    #[error("Invalid scale factor {value}: must be finite and positive")]
    InvalidScaleFactor {
        /// Computed value
        value: f64,
    },

    /// A series-level invariant was violated.
    #[error("Invalid {role} series: {source}")]
    InvalidSeries {
        /// Series the error was raised for
        role: SeriesRole,
        /// Underlying series error
        #[source]
        source: SeriesError,
    },

    /// The configuration cannot be used.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

fn period_end_hint(period_end: &Option<NaiveDate>) -> String {
    period_end.map_or_else(String::new, |date| format!(" (period ends {date})"))
}

impl SpliceError {
    /// Attribute a series error to `role`, surfacing ordering violations as
    /// [`SpliceError::NonMonotonicInput`].
    pub fn for_series(role: SeriesRole, err: SeriesError) -> Self {
        match err {
            SeriesError::NonMonotonic {
                index,
                previous,
                date,
            } => Self::NonMonotonicInput {
                role,
                index,
                previous,
                date,
            },
            source => Self::InvalidSeries { role, source },
        }
    }
}
