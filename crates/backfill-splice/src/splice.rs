//! Cutover and concatenation.
//!
//! Everything strictly before the cutover comes from the rescaled proxy,
//! everything at or after it from the target. The cutover period therefore
//! always takes the target's value when the target has one.

use crate::error::{CutoverProblem, Result, SeriesRole, SpliceError};
use crate::scale::ScaleFactor;
use backfill_series::{Observation, Period, TimeSeries, simple_returns};
use chrono::NaiveDate;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Check that `cutover` is a period end of `period`, lies in the span both series
/// cover, and has a target value.
///
/// The span runs from the later of the two first periods to the earlier of the two
/// last periods. A cutover before it would drop proxy history without a target
/// value to replace it; one after it would leave periods with no source.
///
/// # Errors
/// Returns [`SpliceError::InvalidCutover`] describing the violated condition,
/// [`SpliceError::NoOverlap`] if the spans are disjoint, or
/// [`SpliceError::EmptyInput`] if either series is empty.
pub fn validate_cutover(
    cutover: NaiveDate,
    period: &Period,
    proxy: &TimeSeries,
    target: &TimeSeries,
) -> Result<()> {
    let proxy_span = proxy.range().ok_or(SpliceError::EmptyInput {
        role: SeriesRole::Proxy,
    })?;
    let target_span = target.range().ok_or(SpliceError::EmptyInput {
        role: SeriesRole::Target,
    })?;
    let valid = proxy_span
        .intersection(&target_span)
        .ok_or(SpliceError::NoOverlap {
            proxy: proxy_span,
            target: target_span,
            paired: 0,
            required: 1,
        })?;

    let problem = if !period.is_boundary(cutover) {
        CutoverProblem::Unaligned
    } else if !valid.contains(cutover) {
        CutoverProblem::OutsideOverlap
    } else if !target.contains(cutover) {
        CutoverProblem::MissingTargetValue
    } else {
        return Ok(());
    };
    Err(SpliceError::InvalidCutover {
        cutover,
        valid,
        problem,
    })
}

/// Concatenate the rescaled proxy before `cutover` with the target from `cutover` on.
///
/// Duplicate dates are dropped keeping the first occurrence, then the result is
/// checked for strictly increasing dates.
///
/// # Errors
/// Returns [`SpliceError::InvalidSeries`] for the spliced role if the concatenation is
/// not strictly increasing.
pub fn splice_prices(
    rescaled_proxy: &TimeSeries,
    target: &TimeSeries,
    cutover: NaiveDate,
) -> Result<TimeSeries> {
    let head = rescaled_proxy.before(cutover);
    let tail = target.since(cutover);
    if !tail.contains(cutover) {
        warn!(%cutover, "target has no value for the cutover period");
    }

    let mut combined: Vec<Observation> = head.into_observations();
    combined.extend(tail.iter().copied());

    let before = combined.len();
    let mut seen = HashSet::with_capacity(before);
    combined.retain(|o| seen.insert(o.date));
    if combined.len() != before {
        warn!(removed = before - combined.len(), "removed duplicate periods at the boundary");
    }

    TimeSeries::new(combined).map_err(|e| SpliceError::for_series(SeriesRole::Spliced, e))
}

/// Splice at the return level: the proxy's own period returns before `cutover`, the
/// target's from `cutover` on.
///
/// Proxy returns are multiplied by `scale` when one is given. If the target has no
/// return for the cutover period (its first observation), the proxy's return fills
/// that period.
///
/// # Errors
/// Propagates return-derivation failures for the proxy or target series.
pub fn splice_returns(
    proxy: &TimeSeries,
    target: &TimeSeries,
    cutover: NaiveDate,
    scale: Option<ScaleFactor>,
) -> Result<TimeSeries> {
    let proxy_returns =
        simple_returns(proxy).map_err(|e| SpliceError::for_series(SeriesRole::Proxy, e))?;
    let target_returns =
        simple_returns(target).map_err(|e| SpliceError::for_series(SeriesRole::Target, e))?;
    let multiplier = scale.map_or(1.0, ScaleFactor::value);

    let rescale = |o: &Observation| Observation::new(o.date, o.value * multiplier);
    let mut out: Vec<Observation> = proxy_returns.before(cutover).iter().map(rescale).collect();

    let tail = target_returns.since(cutover);
    if !tail.contains(cutover) {
        if let Some(value) = proxy_returns.get(cutover) {
            debug!(%cutover, "cutover return taken from the proxy");
            out.push(rescale(&Observation::new(cutover, value)));
        }
    }
    out.extend(tail.iter().copied());

    TimeSeries::new(out).map_err(|e| SpliceError::for_series(SeriesRole::Spliced, e))
}
