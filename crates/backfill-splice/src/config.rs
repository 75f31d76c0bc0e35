//! Splice configuration.

use backfill_series::{InputOrder, Period};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How the proxy is scaled onto the target's level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalePolicy {
    /// `target / proxy` on one shared period: the anchor date, or the first overlap.
    #[default]
    SinglePoint,
    /// Least-squares slope through the origin of target returns on proxy returns,
    /// over every period both series have a return for.
    Regression,
}

impl fmt::Display for ScalePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SinglePoint => write!(f, "single-point"),
            Self::Regression => write!(f, "regression"),
        }
    }
}

impl FromStr for ScalePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "single-point" | "anchor" => Ok(Self::SinglePoint),
            "regression" | "ols" => Ok(Self::Regression),
            other => Err(format!("unknown scale policy '{other}'")),
        }
    }
}

/// How the return series is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum ReturnMethod {
    /// Period-over-period change of the spliced price series.
    #[default]
    FromSplicedPrices,
    /// Proxy returns before the cutover, target returns from the cutover on.
    ProxyThenTarget {
        /// Multiply proxy returns by the scale factor.
        scale_proxy_returns: bool,
    },
}

/// Configuration for a single splice.
///
/// Deserialises from partial JSON; missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpliceConfig {
    /// Period grid both inputs are resampled onto (default: month-end)
    pub periodicity: Period,

    /// Scale reconciliation policy (default: single point)
    pub scale_policy: ScalePolicy,

    /// Anchor period for the single-point policy (default: first overlap)
    pub anchor_date: Option<NaiveDate>,

    /// First period taken from the target (default: the target's first period)
    pub cutover: Option<NaiveDate>,

    /// Keep the return of the cutover period (default: true)
    pub keep_cutover_period_return: bool,

    /// Reject unsorted input instead of sorting it (default: false)
    pub strict_input_order: bool,

    /// Return derivation (default: from spliced prices)
    pub return_method: ReturnMethod,
}

impl Default for SpliceConfig {
    fn default() -> Self {
        Self {
            periodicity: Period::MonthEnd,
            scale_policy: ScalePolicy::SinglePoint,
            anchor_date: None,
            cutover: None,
            keep_cutover_period_return: true,
            strict_input_order: false,
            return_method: ReturnMethod::FromSplicedPrices,
        }
    }
}

impl SpliceConfig {
    /// Input ordering policy implied by `strict_input_order`.
    pub const fn input_order(&self) -> InputOrder {
        InputOrder::from_strict(self.strict_input_order)
    }
}
