//! Total-return index construction.
//!
//! Reinvests cash dividends into a price series:
//!
//! `tr_t = price_t * prod_{s <= t} (1 + div_s / price_{s-1})`
//!
//! with a factor of one on the first date, so the index starts at the first price.

use crate::error::{Result, SeriesError};
use crate::series::{Observation, TimeSeries};

/// Build a total-return index from prices and a sparse dividend series.
///
/// Every dividend must fall on a date present in `prices`. A dividend on the very
/// first price date has no prior price to reinvest against and is ignored, which is
/// how the first factor is fixed at one.
///
/// # Errors
/// - [`SeriesError::UnalignedDividend`] for a dividend without a matching price date.
/// - [`SeriesError::NonPositivePrice`] when a dividend follows a non-positive price.
pub fn total_return_index(prices: &TimeSeries, dividends: &TimeSeries) -> Result<TimeSeries> {
    if let Some(orphan) = dividends.iter().find(|div| !prices.contains(div.date)) {
        return Err(SeriesError::UnalignedDividend { date: orphan.date });
    }

    let points = prices.observations();
    let Some(first) = points.first() else {
        return Ok(TimeSeries::empty());
    };

    let mut growth = 1.0;
    let mut out = Vec::with_capacity(points.len());
    out.push(*first);
    for w in points.windows(2) {
        let (prev, cur) = (w[0], w[1]);
        let dividend = dividends.get(cur.date).unwrap_or(0.0);
        let factor = if dividend == 0.0 {
            1.0
        } else if prev.value > 0.0 {
            1.0 + dividend / prev.value
        } else {
            return Err(SeriesError::NonPositivePrice {
                date: cur.date,
                previous_price: prev.value,
            });
        };
        growth *= factor;
        out.push(Observation::new(cur.date, cur.value * growth));
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
            Observation::new(d(2024, 1, 2), 100.0),
            Observation::new(d(2024, 1, 3), 100.0),
            Observation::new(d(2024, 1, 4), 98.0),
            Observation::new(d(2024, 1, 5), 99.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_no_dividends_is_identity() {
        let tr = total_return_index(&prices(), &TimeSeries::empty()).unwrap();
        assert_eq!(tr, prices());
    }

    #[test]
    fn test_dividend_is_reinvested() {
        let divs = TimeSeries::new(vec![Observation::new(d(2024, 1, 4), 2.0)]).unwrap();
        let tr = total_return_index(&prices(), &divs).unwrap();
        // Ex-dividend drop of 2.0 is offset by the 2% reinvestment factor.
        assert_relative_eq!(tr.get(d(2024, 1, 4)).unwrap(), 98.0 * 1.02, epsilon = 1e-12);
        assert_relative_eq!(tr.get(d(2024, 1, 5)).unwrap(), 99.0 * 1.02, epsilon = 1e-12);
        assert_eq!(tr.get(d(2024, 1, 2)), Some(100.0));
    }

    #[test]
    fn test_unaligned_dividend() {
        let divs = TimeSeries::new(vec![Observation::new(d(2024, 1, 6), 1.0)]).unwrap();
        assert_eq!(
            total_return_index(&prices(), &divs),
            Err(SeriesError::UnalignedDividend { date: d(2024, 1, 6) })
        );
    }

    #[test]
    fn test_first_date_dividend_ignored() {
        let divs = TimeSeries::new(vec![Observation::new(d(2024, 1, 2), 5.0)]).unwrap();
        let tr = total_return_index(&prices(), &divs).unwrap();
        assert_eq!(tr, prices());
    }
}
