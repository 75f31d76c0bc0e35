//! Resampling onto a period grid.
//!
//! Keeps the last observation inside each period and labels it with the
//! period-end date. Periods without observations produce no row; nothing is
//! interpolated or filled.

use crate::error::{Result, SeriesError};
use crate::period::Period;
use crate::series::{Observation, TimeSeries};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// How the resampler treats input that is not in ascending date order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputOrder {
    /// Stable-sort by date before bucketing.
    #[default]
    Lenient,
    /// Reject any date that does not strictly follow its predecessor.
    Strict,
}

impl InputOrder {
    /// Order policy matching a `strict_input_order` flag.
    pub const fn from_strict(strict: bool) -> Self {
        if strict { Self::Strict } else { Self::Lenient }
    }
}

/// Resample raw observations onto `period`.
///
/// Non-finite values are treated as missing and dropped before bucketing.
///
/// # Errors
/// - [`SeriesError::NonMonotonic`] in [`InputOrder::Strict`] mode when a date does not
///   strictly follow the previous one.
/// - [`SeriesError::InvalidPeriod`] for a malformed custom grid.
pub fn resample(raw: &[Observation], period: &Period, order: InputOrder) -> Result<TimeSeries> {
    period.validate()?;

    if raw.is_empty() {
        return Ok(TimeSeries::empty());
    }

    if order == InputOrder::Strict {
        if let Some(i) = (1..raw.len()).find(|&i| raw[i - 1].date >= raw[i].date) {
            return Err(SeriesError::NonMonotonic {
                index: i,
                previous: raw[i - 1].date,
                date: raw[i].date,
            });
        }
    }

    let mut points: Vec<Observation> = raw.iter().filter(|o| o.value.is_finite()).copied().collect();
    let dropped = raw.len() - points.len();
    if dropped > 0 {
        warn!(dropped, "dropped non-finite observations before resampling");
    }

    if !points.windows(2).all(|w| w[0].date <= w[1].date) {
        warn!(observations = points.len(), "input not sorted by date, sorting");
        points.sort_by_key(|o| o.date);
    }

    let mut out: Vec<Observation> = Vec::new();
    let mut unlabelled = 0usize;
    for obs in points {
        let Some(label) = period.label(obs.date) else {
            unlabelled += 1;
            continue;
        };
        match out.last_mut() {
            Some(last) if last.date == label => last.value = obs.value,
            _ => out.push(Observation::new(label, obs.value)),
        }
    }
    if unlabelled > 0 {
        warn!(unlabelled, %period, "observations outside the period grid were dropped");
    }

    debug!(input = raw.len(), output = out.len(), %period, "resampled series");
    Ok(TimeSeries::from_sorted(out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn obs(y: i32, m: u32, day: u32, v: f64) -> Observation {
        Observation::new(d(y, m, day), v)
    }

    #[test]
    fn test_empty_input() {
        let out = resample(&[], &Period::MonthEnd, InputOrder::Strict).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_last_value_per_month() {
        let raw = vec![
            obs(2008, 3, 26, 50.0),
            obs(2008, 3, 28, 51.0),
            obs(2008, 4, 1, 52.0),
            obs(2008, 4, 30, 53.0),
        ];
        let out = resample(&raw, &Period::MonthEnd, InputOrder::Lenient).unwrap();
        assert_eq!(
            out.observations(),
            &[obs(2008, 3, 31, 51.0), obs(2008, 4, 30, 53.0)]
        );
    }

    #[test]
    fn test_empty_months_are_omitted() {
        let raw = vec![obs(2008, 1, 10, 1.0), obs(2008, 4, 10, 2.0)];
        let out = resample(&raw, &Period::MonthEnd, InputOrder::Lenient).unwrap();
        assert_eq!(out.len(), 2);
        assert!(!out.contains(d(2008, 2, 29)));
    }

    #[test]
    fn test_lenient_sorts() {
        let raw = vec![obs(2008, 4, 30, 53.0), obs(2008, 3, 28, 51.0), obs(2008, 3, 3, 49.0)];
        let out = resample(&raw, &Period::MonthEnd, InputOrder::Lenient).unwrap();
        assert_eq!(
            out.observations(),
            &[obs(2008, 3, 31, 51.0), obs(2008, 4, 30, 53.0)]
        );
    }

    #[test]
    fn test_strict_rejects_unsorted() {
        let raw = vec![obs(2008, 4, 30, 53.0), obs(2008, 3, 28, 51.0)];
        let err = resample(&raw, &Period::MonthEnd, InputOrder::Strict).unwrap_err();
        assert_eq!(
            err,
            SeriesError::NonMonotonic {
                index: 1,
                previous: d(2008, 4, 30),
                date: d(2008, 3, 28),
            }
        );
    }

    #[test]
    fn test_strict_rejects_duplicates() {
        let raw = vec![obs(2008, 3, 28, 51.0), obs(2008, 3, 28, 52.0)];
        assert!(resample(&raw, &Period::MonthEnd, InputOrder::Strict).is_err());
    }

    #[test]
    fn test_lenient_duplicate_keeps_later_row() {
        let raw = vec![obs(2008, 3, 28, 51.0), obs(2008, 3, 28, 52.0)];
        let out = resample(&raw, &Period::MonthEnd, InputOrder::Lenient).unwrap();
        assert_eq!(out.observations(), &[obs(2008, 3, 31, 52.0)]);
    }

    #[test]
    fn test_drops_nan() {
        let raw = vec![obs(2008, 3, 3, 49.0), obs(2008, 3, 31, f64::NAN)];
        let out = resample(&raw, &Period::MonthEnd, InputOrder::Strict).unwrap();
        assert_eq!(out.observations(), &[obs(2008, 3, 31, 49.0)]);
    }

    #[test]
    fn test_custom_grid_drops_tail() {
        let period = Period::custom(vec![d(2000, 1, 15), d(2000, 2, 15)]).unwrap();
        let raw = vec![obs(2000, 1, 1, 1.0), obs(2000, 1, 20, 2.0), obs(2000, 3, 1, 3.0)];
        let out = resample(&raw, &period, InputOrder::Strict).unwrap();
        assert_eq!(
            out.observations(),
            &[obs(2000, 1, 15, 1.0), obs(2000, 2, 15, 2.0)]
        );
    }

    #[test]
    fn test_idempotent() {
        let raw = vec![obs(2008, 3, 26, 50.0), obs(2008, 3, 28, 51.0), obs(2008, 5, 2, 52.0)];
        let once = resample(&raw, &Period::MonthEnd, InputOrder::Lenient).unwrap();
        let twice = resample(once.observations(), &Period::MonthEnd, InputOrder::Strict).unwrap();
        assert_eq!(once, twice);
    }
}
