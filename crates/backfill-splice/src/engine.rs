//! The splice engine.
//!
//! [`SpliceEngine::run`] is a pure function of two raw series and the
//! configuration: resample both, reconcile levels, splice at the cutover and
//! derive returns. Nothing is cached between calls, so one engine can be shared
//! across threads.

use crate::config::{ReturnMethod, ScalePolicy, SpliceConfig};
use crate::error::{Result, SeriesRole, SpliceError};
use crate::scale::{RegressionAnchor, ScaleEstimate, ScaleEstimator, SinglePointAnchor};
use crate::splice::{splice_prices, splice_returns, validate_cutover};
use backfill_series::{Observation, Period, TimeSeries, resample, simple_returns};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Everything a splice produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpliceOutput {
    /// Continuous price series.
    pub prices: TimeSeries,

    /// Period returns.
    pub returns: TimeSeries,

    /// Scale factor and how it was computed.
    pub scale: ScaleEstimate,

    /// First period taken from the target.
    pub cutover: NaiveDate,

    /// Grid both inputs were resampled onto.
    pub periodicity: Period,

    /// Resampled proxy before scaling.
    pub proxy: TimeSeries,

    /// Resampled target.
    pub target: TimeSeries,

    /// Whole resampled proxy history multiplied by the scale factor.
    pub rescaled_proxy: TimeSeries,
}

impl SpliceOutput {
    /// Number of spliced periods taken from the proxy.
    pub fn proxy_periods(&self) -> usize {
        self.prices.before(self.cutover).len()
    }

    /// Number of spliced periods taken from the target.
    pub fn target_periods(&self) -> usize {
        self.prices.since(self.cutover).len()
    }

    /// Return of the cutover period, if it was kept.
    pub fn cutover_return(&self) -> Option<f64> {
        self.returns.get(self.cutover)
    }
}

/// Splices a proxy history onto a target series.
#[derive(Debug, Clone)]
pub struct SpliceEngine {
    config: SpliceConfig,
}

impl SpliceEngine {
    /// Create an engine, validating the configuration.
    ///
    /// # Errors
    /// Returns [`SpliceError::InvalidConfig`] for an unusable period grid and
    /// [`SpliceError::UnalignedAnchor`] for a single-point anchor that is not a period
    /// end on that grid.
    pub fn new(config: SpliceConfig) -> Result<Self> {
        config
            .periodicity
            .validate()
            .map_err(|e| SpliceError::InvalidConfig(e.to_string()))?;
        match (config.scale_policy, config.anchor_date) {
            (ScalePolicy::Regression, Some(_)) => {
                debug!("anchor_date is not used by the regression policy");
            }
            (ScalePolicy::SinglePoint, Some(anchor))
                if !config.periodicity.is_boundary(anchor) =>
            {
                return Err(SpliceError::UnalignedAnchor {
                    anchor,
                    period: config.periodicity.clone(),
                    period_end: config.periodicity.label(anchor),
                });
            }
            _ => {}
        }
        Ok(Self { config })
    }

    /// Configuration in use.
    pub const fn config(&self) -> &SpliceConfig {
        &self.config
    }

    /// Splice raw `proxy` observations onto raw `target` observations.
    ///
    /// # Errors
    /// - [`SpliceError::EmptyInput`] if either input has no usable observations.
    /// - [`SpliceError::NonMonotonicInput`] for unsorted input in strict mode.
    /// - [`SpliceError::NoOverlap`], [`SpliceError::MissingAnchor`],
    ///   [`SpliceError::DegenerateRegression`] or [`SpliceError::InvalidScaleFactor`]
    ///   when the scale factor cannot be computed.
    /// - [`SpliceError::InvalidCutover`] for a cutover off the period grid, outside the
    ///   span both series cover, or without a target value.
    /// - [`SpliceError::InvalidSeries`] if rescaling the proxy overflows.
    pub fn run(&self, proxy: &[Observation], target: &[Observation]) -> Result<SpliceOutput> {
        let proxy = self.prepare(proxy, SeriesRole::Proxy)?;
        let target = self.prepare(target, SeriesRole::Target)?;

        let scale = self.estimate_scale(&proxy, &target)?;
        let cutover = self.resolve_cutover(&proxy, &target)?;
        let rescaled_proxy = proxy
            .scaled(scale.factor.value())
            .map_err(|e| SpliceError::for_series(SeriesRole::Proxy, e))?;

        let prices = splice_prices(&rescaled_proxy, &target, cutover)?;
        self.check_gap(&prices, cutover);

        let mut returns = match self.config.return_method {
            ReturnMethod::FromSplicedPrices => simple_returns(&prices)
                .map_err(|e| SpliceError::for_series(SeriesRole::Spliced, e))?,
            ReturnMethod::ProxyThenTarget {
                scale_proxy_returns,
            } => splice_returns(
                &proxy,
                &target,
                cutover,
                scale_proxy_returns.then_some(scale.factor),
            )?,
        };
        if !self.config.keep_cutover_period_return {
            returns = returns.without(cutover);
        }

        info!(
            scale = %scale.factor,
            policy = %scale.policy,
            %cutover,
            prices = prices.len(),
            returns = returns.len(),
            "splice complete"
        );

        Ok(SpliceOutput {
            prices,
            returns,
            scale,
            cutover,
            periodicity: self.config.periodicity.clone(),
            proxy,
            target,
            rescaled_proxy,
        })
    }

    fn prepare(&self, raw: &[Observation], role: SeriesRole) -> Result<TimeSeries> {
        if raw.is_empty() {
            return Err(SpliceError::EmptyInput { role });
        }
        let series = resample(raw, &self.config.periodicity, self.config.input_order())
            .map_err(|e| SpliceError::for_series(role, e))?;
        if series.is_empty() {
            return Err(SpliceError::EmptyInput { role });
        }
        debug!(%role, raw = raw.len(), periods = series.len(), "prepared input");
        Ok(series)
    }

    /// Configured cutover, or the first target period inside the proxy's span.
    fn resolve_cutover(&self, proxy: &TimeSeries, target: &TimeSeries) -> Result<NaiveDate> {
        let cutover = match self.config.cutover {
            Some(date) => date,
            None => proxy
                .first()
                .and_then(|p| target.since(p.date).first().map(|o| o.date))
                .or_else(|| target.first().map(|o| o.date))
                .ok_or(SpliceError::EmptyInput {
                    role: SeriesRole::Target,
                })?,
        };
        validate_cutover(cutover, &self.config.periodicity, proxy, target)?;
        Ok(cutover)
    }

    fn estimate_scale(&self, proxy: &TimeSeries, target: &TimeSeries) -> Result<ScaleEstimate> {
        match self.config.scale_policy {
            ScalePolicy::SinglePoint => {
                SinglePointAnchor::new(self.config.anchor_date).estimate(proxy, target)
            }
            ScalePolicy::Regression => RegressionAnchor.estimate(proxy, target),
        }
    }

    /// Warn when periods are missing between the proxy prefix and the target suffix.
    fn check_gap(&self, prices: &TimeSeries, cutover: NaiveDate) {
        let (Some(last_proxy), Some(first_target)) =
            (prices.before(cutover).last().copied(), prices.since(cutover).first().copied())
        else {
            return;
        };
        if self.config.periodicity.next_label(last_proxy.date) != Some(first_target.date) {
            warn!(
                last_proxy = %last_proxy.date,
                first_target = %first_target.date,
                "gap between proxy prefix and target suffix"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn obs(y: i32, m: u32, day: u32, v: f64) -> Observation {
        Observation::new(d(y, m, day), v)
    }

    #[test]
    fn test_rejects_bad_custom_grid() {
        let config = SpliceConfig {
            periodicity: Period::Custom { boundaries: vec![] },
            ..Default::default()
        };
        assert!(matches!(
            SpliceEngine::new(config),
            Err(SpliceError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_all_missing_is_empty() {
        let engine = SpliceEngine::new(SpliceConfig::default()).unwrap();
        let err = engine
            .run(&[obs(2000, 1, 31, f64::NAN)], &[obs(2000, 1, 31, 1.0)])
            .unwrap_err();
        assert_eq!(
            err,
            SpliceError::EmptyInput {
                role: SeriesRole::Proxy
            }
        );
    }

    #[test]
    fn test_daily_inputs_are_resampled() {
        let proxy = vec![
            obs(2008, 1, 15, 90.0),
            obs(2008, 1, 31, 100.0),
            obs(2008, 2, 14, 103.0),
            obs(2008, 2, 29, 105.0),
            obs(2008, 3, 31, 110.0),
        ];
        let target = vec![obs(2008, 2, 27, 20.0), obs(2008, 2, 28, 21.0), obs(2008, 3, 31, 22.0)];
        let output = SpliceEngine::new(SpliceConfig::default())
            .unwrap()
            .run(&proxy, &target)
            .unwrap();
        assert_eq!(output.cutover, d(2008, 2, 29));
        assert_relative_eq!(output.scale.factor.value(), 0.2, epsilon = 1e-12);
        assert_eq!(output.prices.len(), 3);
        assert_relative_eq!(output.prices.get(d(2008, 1, 31)).unwrap(), 20.0, epsilon = 1e-12);
        assert_eq!(output.prices.get(d(2008, 2, 29)), Some(21.0));
        assert_eq!(output.proxy_periods(), 1);
        assert_eq!(output.target_periods(), 2);
    }

    #[test]
    fn test_proxy_then_target_returns() {
        let proxy = vec![obs(2008, 1, 31, 100.0), obs(2008, 2, 29, 110.0), obs(2008, 3, 31, 121.0)];
        let target = vec![obs(2008, 3, 31, 60.0), obs(2008, 4, 30, 63.0)];
        let config = SpliceConfig {
            return_method: ReturnMethod::ProxyThenTarget {
                scale_proxy_returns: false,
            },
            ..Default::default()
        };
        let output = SpliceEngine::new(config).unwrap().run(&proxy, &target).unwrap();
        assert_eq!(output.returns.len(), 3);
        assert_relative_eq!(output.cutover_return().unwrap(), 0.10, epsilon = 1e-12);
        assert_relative_eq!(output.returns.get(d(2008, 4, 30)).unwrap(), 0.05, epsilon = 1e-12);
    }

    #[test]
    fn test_rejects_anchor_off_grid() {
        let config = SpliceConfig {
            anchor_date: Some(d(2008, 3, 28)),
            ..Default::default()
        };
        let err = SpliceEngine::new(config).unwrap_err();
        assert_eq!(
            err,
            SpliceError::UnalignedAnchor {
                anchor: d(2008, 3, 28),
                period: Period::MonthEnd,
                period_end: Some(d(2008, 3, 31)),
            }
        );
    }

    #[test]
    fn test_regression_ignores_anchor_off_grid() {
        let config = SpliceConfig {
            scale_policy: ScalePolicy::Regression,
            anchor_date: Some(d(2008, 3, 28)),
            ..Default::default()
        };
        assert!(SpliceEngine::new(config).is_ok());
    }

    #[test]
    fn test_default_cutover_inside_proxy_span() {
        let proxy = vec![obs(2008, 2, 29, 100.0), obs(2008, 3, 31, 110.0)];
        let target = vec![obs(2008, 1, 31, 48.0), obs(2008, 2, 29, 50.0), obs(2008, 3, 31, 55.0)];
        let output = SpliceEngine::new(SpliceConfig::default())
            .unwrap()
            .run(&proxy, &target)
            .unwrap();
        assert_eq!(output.cutover, d(2008, 2, 29));
        assert_eq!(output.prices.first().map(|o| o.date), Some(d(2008, 2, 29)));
        assert_eq!(output.proxy_periods(), 0);
    }

    #[test]
    fn test_scale_errors_come_before_cutover_errors() {
        let config = SpliceConfig {
            cutover: Some(d(2008, 6, 30)),
            ..Default::default()
        };
        let err = SpliceEngine::new(config)
            .unwrap()
            .run(&[obs(2008, 1, 31, 1.0)], &[obs(2008, 6, 30, 2.0)])
            .unwrap_err();
        assert!(matches!(err, SpliceError::NoOverlap { .. }));
    }

    #[test]
    fn test_rescale_overflow_is_an_error() {
        let proxy = vec![obs(2008, 1, 31, 1e300), obs(2008, 2, 29, 1e-10)];
        let target = vec![obs(2008, 2, 29, 1e10)];
        let err = SpliceEngine::new(SpliceConfig::default())
            .unwrap()
            .run(&proxy, &target)
            .unwrap_err();
        assert_eq!(
            err,
            SpliceError::InvalidSeries {
                role: SeriesRole::Proxy,
                source: backfill_series::SeriesError::NonFinite {
                    date: d(2008, 1, 31),
                    value: f64::INFINITY,
                },
            }
        );
    }
}
