//! Period-over-period returns.

use crate::error::{Result, SeriesError};
use crate::series::{Observation, TimeSeries};

/// Simple returns `price[t] / price[t-1] - 1`, dated at `t`.
///
/// The first observation has no predecessor and therefore no return, so the
/// result has exactly one entry fewer than `prices` (none for an empty or
/// single-point series).
///
/// # Errors
/// Returns [`SeriesError::NonPositivePrice`] when a predecessor price is zero or
/// negative.
pub fn simple_returns(prices: &TimeSeries) -> Result<TimeSeries> {
    let points = prices.observations();
    let mut out = Vec::with_capacity(points.len().saturating_sub(1));
    for w in points.windows(2) {
        let (prev, cur) = (w[0], w[1]);
        if prev.value <= 0.0 {
            return Err(SeriesError::NonPositivePrice {
                date: cur.date,
                previous_price: prev.value,
            });
        }
        out.push(Observation::new(cur.date, cur.value / prev.value - 1.0));
    }
    TimeSeries::new(out)
}

/// Rebuild a price path from a starting observation and returns dated after it.
///
/// Returns on or before `start.date` are ignored. The result starts with `start`.
///
/// # Errors
/// Returns [`SeriesError::NonFinite`] if compounding overflows.
pub fn compound(start: Observation, returns: &TimeSeries) -> Result<TimeSeries> {
    let mut level = start.value;
    let mut out = vec![start];
    for r in returns.since(start.date).iter().filter(|r| r.date > start.date) {
        level *= 1.0 + r.value;
        out.push(Observation::new(r.date, level));
    }
    TimeSeries::new(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn prices() -> TimeSeries {
        TimeSeries::new(vec![
            Observation::new(d(2000, 1, 31), 200.0),
            Observation::new(d(2000, 2, 29), 220.0),
            Observation::new(d(2000, 3, 31), 242.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_simple_returns() {
        let returns = simple_returns(&prices()).unwrap();
        assert_eq!(returns.len(), 2);
        assert_eq!(returns.first().unwrap().date, d(2000, 2, 29));
        for r in &returns {
            assert_relative_eq!(r.value, 0.10, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_single_point_has_no_returns() {
        let single = TimeSeries::new(vec![Observation::new(d(2000, 1, 31), 1.0)]).unwrap();
        assert!(simple_returns(&single).unwrap().is_empty());
        assert!(simple_returns(&TimeSeries::empty()).unwrap().is_empty());
    }

    #[test]
    fn test_zero_price_rejected() {
        let series = TimeSeries::new(vec![
            Observation::new(d(2000, 1, 31), 0.0),
            Observation::new(d(2000, 2, 29), 1.0),
        ])
        .unwrap();
        assert!(matches!(
            simple_returns(&series),
            Err(SeriesError::NonPositivePrice { .. })
        ));
    }

    #[test]
    fn test_compound_round_trip() {
        let p = prices();
        let r = simple_returns(&p).unwrap();
        let rebuilt = compound(*p.first().unwrap(), &r).unwrap();
        assert_eq!(rebuilt.len(), p.len());
        for (a, b) in rebuilt.iter().zip(p.iter()) {
            assert_eq!(a.date, b.date);
            assert_relative_eq!(a.value, b.value, max_relative = 1e-12);
        }
    }

    #[test]
    fn test_compound_skips_earlier_returns() {
        let r = simple_returns(&prices()).unwrap();
        let rebuilt = compound(Observation::new(d(2000, 2, 29), 10.0), &r).unwrap();
        assert_eq!(rebuilt.len(), 2);
        assert_relative_eq!(rebuilt.last().unwrap().value, 11.0, epsilon = 1e-12);
    }
}
