//! Error types for series operations.

use chrono::NaiveDate;
use thiserror::Error;

/// Result type for series operations.
pub type Result<T> = std::result::Result<T, SeriesError>;

/// Errors that can occur while building or transforming a series.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SeriesError {
    /// A date is not strictly after the one before it.
    #[error("Non-monotonic input at position {index}: {date} does not follow {previous}")]
    NonMonotonic {
        /// Position of the offending observation
        index: usize,
        /// Date of the preceding observation
        previous: NaiveDate,
        /// Offending date
        date: NaiveDate,
    },

    /// A value is NaN or infinite.
    #[error("Non-finite value {value} on {date}")]
    NonFinite {
        /// Date of the offending observation
        date: NaiveDate,
        /// Offending value
        value: f64,
    },

    /// A return was requested against a zero or negative price.
    #[error("Cannot compute a return on {date}: previous price {previous_price} is not positive")]
    NonPositivePrice {
        /// Date whose return could not be computed
        date: NaiveDate,
        /// Price of the preceding period
        previous_price: f64,
    },

    /// A dividend falls on a date the price series does not contain.
    #[error("Dividend on {date} has no matching price")]
    UnalignedDividend {
        /// Dividend date
        date: NaiveDate,
    },

    /// A custom period grid is malformed.
    #[error("Invalid period grid: {0}")]
    InvalidPeriod(String),
}
