//! Scale reconciliation between proxy and target levels.
//!
//! Two estimators share the [`ScaleEstimator`] trait:
//!
//! - [`SinglePointAnchor`]: `scale = target(t*) / proxy(t*)` on one shared period.
//! - [`RegressionAnchor`]: ordinary least squares through the origin on paired
//!   period returns, `scale = Σ(r_target · r_proxy) / Σ(r_proxy²)`.

use crate::config::ScalePolicy;
use crate::error::{Result, SeriesRole, SpliceError};
use backfill_series::{DateRange, TimeSeries, simple_returns};
use chrono::NaiveDate;
use derive_more::{Display, Into};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Positive multiplicative constant reconciling proxy and target levels.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Display, Into, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct ScaleFactor(f64);

impl ScaleFactor {
    /// Wrap a computed ratio or slope.
    ///
    /// # Errors
    /// Returns [`SpliceError::InvalidScaleFactor`] unless `value` is finite and positive.
    pub fn new(value: f64) -> Result<Self> {
        if value.is_finite() && value > 0.0 {
            Ok(Self(value))
        } else {
            Err(SpliceError::InvalidScaleFactor { value })
        }
    }

    /// The raw multiplier.
    pub const fn value(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for ScaleFactor {
    type Error = SpliceError;

    fn try_from(value: f64) -> Result<Self> {
        Self::new(value)
    }
}

/// Periods present in both resampled series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlapWindow {
    /// First and last shared period.
    pub range: DateRange,

    /// Number of shared periods.
    pub periods: usize,
}

impl OverlapWindow {
    /// Overlap of two series, if they share any period.
    pub fn between(proxy: &TimeSeries, target: &TimeSeries) -> Option<Self> {
        let shared = proxy.common_dates(target);
        match (shared.first(), shared.last()) {
            (Some(&start), Some(&end)) => Some(Self {
                range: DateRange::new(start, end),
                periods: shared.len(),
            }),
            _ => None,
        }
    }
}

/// A computed scale factor together with what it was computed from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleEstimate {
    /// The scale factor.
    pub factor: ScaleFactor,

    /// Policy that produced it.
    pub policy: ScalePolicy,

    /// Anchor period (single-point policy only).
    pub anchor: Option<NaiveDate>,

    /// Shared periods of the two resampled series.
    pub overlap: Option<OverlapWindow>,

    /// Paired observations the estimate used: one for an anchor, the number of
    /// paired returns for the regression.
    pub observations: usize,
}

/// Estimates a [`ScaleEstimate`] from two series resampled onto the same grid.
pub trait ScaleEstimator {
    /// Compute the scale factor mapping `proxy` levels onto `target` levels.
    ///
    /// Both series must be non-empty.
    fn estimate(&self, proxy: &TimeSeries, target: &TimeSeries) -> Result<ScaleEstimate>;
}

fn span(series: &TimeSeries, role: SeriesRole) -> Result<DateRange> {
    series.range().ok_or(SpliceError::EmptyInput { role })
}

/// Ratio of target to proxy on a single shared period.
#[derive(Debug, Clone, Copy, Default)]
pub struct SinglePointAnchor {
    anchor: Option<NaiveDate>,
}

impl SinglePointAnchor {
    /// Anchor on `anchor`, or on the first shared period when `None`.
    pub const fn new(anchor: Option<NaiveDate>) -> Self {
        Self { anchor }
    }
}

impl ScaleEstimator for SinglePointAnchor {
    fn estimate(&self, proxy: &TimeSeries, target: &TimeSeries) -> Result<ScaleEstimate> {
        let overlap = OverlapWindow::between(proxy, target);

        let anchor = match (self.anchor, overlap) {
            (Some(anchor), _) => anchor,
            (None, Some(window)) => window.range.start,
            (None, None) => {
                return Err(SpliceError::NoOverlap {
                    proxy: span(proxy, SeriesRole::Proxy)?,
                    target: span(target, SeriesRole::Target)?,
                    paired: 0,
                    required: 1,
                });
            }
        };

        let (Some(proxy_level), Some(target_level)) = (proxy.get(anchor), target.get(anchor))
        else {
            return Err(SpliceError::MissingAnchor {
                anchor,
                in_proxy: proxy.contains(anchor),
                in_target: target.contains(anchor),
            });
        };

        let factor = ScaleFactor::new(target_level / proxy_level)?;
        debug!(%anchor, proxy_level, target_level, %factor, "single-point scale");

        Ok(ScaleEstimate {
            factor,
            policy: ScalePolicy::SinglePoint,
            anchor: Some(anchor),
            overlap,
            observations: 1,
        })
    }
}

/// Least-squares slope through the origin on paired period returns.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegressionAnchor;

/// Minimum number of paired returns for a regression.
pub const MIN_REGRESSION_PAIRS: usize = 2;

/// Outcome of fitting `y ≈ slope × x` over the dates two series share.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Fit {
    TooFew {
        paired: usize,
    },
    Degenerate {
        overlap: DateRange,
        observations: usize,
    },
    Slope {
        slope: f64,
        observations: usize,
    },
}

fn fit_through_origin(x: &TimeSeries, y: &TimeSeries) -> Fit {
    let shared = x.common_dates(y);
    let (Some(&start), Some(&end)) = (shared.first(), shared.last()) else {
        return Fit::TooFew { paired: 0 };
    };
    if shared.len() < MIN_REGRESSION_PAIRS {
        return Fit::TooFew {
            paired: shared.len(),
        };
    }

    let (mut sxy, mut sxx) = (0.0, 0.0);
    for date in &shared {
        if let (Some(xi), Some(yi)) = (x.get(*date), y.get(*date)) {
            sxy += xi * yi;
            sxx += xi * xi;
        }
    }

    if sxx == 0.0 {
        Fit::Degenerate {
            overlap: DateRange::new(start, end),
            observations: shared.len(),
        }
    } else {
        Fit::Slope {
            slope: sxy / sxx,
            observations: shared.len(),
        }
    }
}

impl ScaleEstimator for RegressionAnchor {
    fn estimate(&self, proxy: &TimeSeries, target: &TimeSeries) -> Result<ScaleEstimate> {
        let proxy_returns =
            simple_returns(proxy).map_err(|e| SpliceError::for_series(SeriesRole::Proxy, e))?;
        let target_returns =
            simple_returns(target).map_err(|e| SpliceError::for_series(SeriesRole::Target, e))?;

        let (slope, pairs) = match fit_through_origin(&proxy_returns, &target_returns) {
            Fit::Slope {
                slope,
                observations,
            } => (slope, observations),
            Fit::TooFew { paired } => {
                return Err(SpliceError::NoOverlap {
                    proxy: span(proxy, SeriesRole::Proxy)?,
                    target: span(target, SeriesRole::Target)?,
                    paired,
                    required: MIN_REGRESSION_PAIRS,
                });
            }
            Fit::Degenerate {
                overlap,
                observations,
            } => {
                return Err(SpliceError::DegenerateRegression {
                    overlap,
                    observations,
                });
            }
        };

        let factor = ScaleFactor::new(slope)?;
        debug!(pairs, %factor, "regression scale");

        Ok(ScaleEstimate {
            factor,
            policy: ScalePolicy::Regression,
            anchor: None,
            overlap: OverlapWindow::between(proxy, target),
            observations: pairs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use backfill_series::Observation;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn series(points: &[(NaiveDate, f64)]) -> TimeSeries {
        TimeSeries::new(points.iter().map(|&p| Observation::from(p)).collect()).unwrap()
    }

    #[test]
    fn test_scale_factor_validation() {
        assert!(ScaleFactor::new(2.0).is_ok());
        assert!(ScaleFactor::new(0.0).is_err());
        assert!(ScaleFactor::new(-1.0).is_err());
        assert!(ScaleFactor::new(f64::INFINITY).is_err());
        assert_eq!(ScaleFactor::new(2.5).unwrap().to_string(), "2.5");
        assert_eq!(f64::from(ScaleFactor::new(2.5).unwrap()), 2.5);
    }

    #[test]
    fn test_single_point_first_overlap() {
        let proxy = series(&[(d(2000, 1, 31), 100.0), (d(2000, 2, 29), 110.0), (d(2000, 3, 31), 121.0)]);
        let target = series(&[(d(2000, 3, 31), 242.0)]);
        let estimate = SinglePointAnchor::new(None).estimate(&proxy, &target).unwrap();
        assert_eq!(estimate.factor.value(), 2.0);
        assert_eq!(estimate.anchor, Some(d(2000, 3, 31)));
        assert_eq!(estimate.observations, 1);
        assert_eq!(estimate.overlap.unwrap().periods, 1);
    }

    #[test]
    fn test_single_point_explicit_anchor() {
        let proxy = series(&[(d(2000, 1, 31), 100.0), (d(2000, 2, 29), 110.0)]);
        let target = series(&[(d(2000, 1, 31), 50.0), (d(2000, 2, 29), 44.0)]);
        let estimate = SinglePointAnchor::new(Some(d(2000, 2, 29)))
            .estimate(&proxy, &target)
            .unwrap();
        assert_relative_eq!(estimate.factor.value(), 0.4, epsilon = 1e-12);
    }

    #[test]
    fn test_single_point_missing_anchor() {
        let proxy = series(&[(d(2000, 1, 31), 100.0)]);
        let target = series(&[(d(2000, 2, 29), 44.0)]);
        let err = SinglePointAnchor::new(Some(d(2000, 2, 29)))
            .estimate(&proxy, &target)
            .unwrap_err();
        assert_eq!(
            err,
            SpliceError::MissingAnchor {
                anchor: d(2000, 2, 29),
                in_proxy: false,
                in_target: true,
            }
        );
    }

    #[test]
    fn test_single_point_no_overlap() {
        let proxy = series(&[(d(2000, 1, 31), 100.0)]);
        let target = series(&[(d(2000, 2, 29), 44.0)]);
        let err = SinglePointAnchor::default().estimate(&proxy, &target).unwrap_err();
        assert!(matches!(err, SpliceError::NoOverlap { paired: 0, required: 1, .. }));
    }

    #[test]
    fn test_regression_slope_exact() {
        let dates = [d(2000, 2, 29), d(2000, 3, 31), d(2000, 4, 30)];
        let proxy = series(&[(dates[0], 0.05), (dates[1], -0.02), (dates[2], 0.03)]);
        let target = series(&[(dates[0], 0.10), (dates[1], -0.04), (dates[2], 0.06)]);
        let Fit::Slope {
            slope,
            observations,
        } = fit_through_origin(&proxy, &target)
        else {
            panic!("expected a slope");
        };
        assert_relative_eq!(slope, 2.0, epsilon = 1e-12);
        assert_eq!(observations, 3);
    }

    #[test]
    fn test_regression_degenerate() {
        let dates = [d(2000, 2, 29), d(2000, 3, 31)];
        let proxy = series(&[(dates[0], 0.0), (dates[1], 0.0)]);
        let target = series(&[(dates[0], 0.01), (dates[1], 0.02)]);
        assert_eq!(
            fit_through_origin(&proxy, &target),
            Fit::Degenerate {
                overlap: DateRange::new(dates[0], dates[1]),
                observations: 2,
            }
        );
    }

    #[test]
    fn test_regression_needs_two_pairs() {
        let proxy = series(&[(d(2000, 1, 31), 100.0), (d(2000, 2, 29), 101.0)]);
        let target = series(&[(d(2000, 1, 31), 10.0), (d(2000, 2, 29), 10.2)]);
        let err = RegressionAnchor.estimate(&proxy, &target).unwrap_err();
        assert!(matches!(err, SpliceError::NoOverlap { paired: 1, required: 2, .. }));
    }

    #[test]
    fn test_regression_negative_slope_rejected() {
        let proxy = series(&[(d(2000, 1, 31), 100.0), (d(2000, 2, 29), 110.0), (d(2000, 3, 31), 99.0)]);
        let target = series(&[(d(2000, 1, 31), 100.0), (d(2000, 2, 29), 90.0), (d(2000, 3, 31), 99.0)]);
        let err = RegressionAnchor.estimate(&proxy, &target).unwrap_err();
        assert!(matches!(err, SpliceError::InvalidScaleFactor { .. }));
    }
}
