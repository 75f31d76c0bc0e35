//! Ordered (date, value) series.
//!
//! A [`TimeSeries`] holds strictly increasing dates and finite values. Every
//! transformation returns a fresh series; nothing mutates a caller's data.

use crate::error::{Result, SeriesError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single dated value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Observation date.
    pub date: NaiveDate,

    /// Observed value (price level, index level or return).
    pub value: f64,
}

impl Observation {
    /// Create a new observation.
    pub const fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

impl From<(NaiveDate, f64)> for Observation {
    fn from((date, value): (NaiveDate, f64)) -> Self {
        Self::new(date, value)
    }
}

/// Inclusive date range, used for diagnostics and summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// First date in the range.
    pub start: NaiveDate,

    /// Last date in the range.
    pub end: NaiveDate,
}

impl DateRange {
    /// Create a new range.
    pub const fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Whether `date` falls inside the range (inclusive on both ends).
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Dates covered by both ranges, if any.
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        (start <= end).then_some(Self { start, end })
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

/// Series of observations with strictly increasing dates and finite values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Observation>", into = "Vec<Observation>")]
pub struct TimeSeries {
    points: Vec<Observation>,
}

impl TimeSeries {
    /// Build a series, validating ordering and finiteness.
    ///
    /// # Errors
    /// Returns [`SeriesError::NonMonotonic`] if a date does not strictly follow its
    /// predecessor and [`SeriesError::NonFinite`] for NaN or infinite values.
    pub fn new(points: Vec<Observation>) -> Result<Self> {
        for (index, obs) in points.iter().enumerate() {
            if !obs.value.is_finite() {
                return Err(SeriesError::NonFinite {
                    date: obs.date,
                    value: obs.value,
                });
            }
            if index > 0 && points[index - 1].date >= obs.date {
                return Err(SeriesError::NonMonotonic {
                    index,
                    previous: points[index - 1].date,
                    date: obs.date,
                });
            }
        }
        Ok(Self { points })
    }

    /// An empty series.
    pub const fn empty() -> Self {
        Self { points: Vec::new() }
    }

    /// Wrap points already known to satisfy the series invariants.
    pub(crate) fn from_sorted(points: Vec<Observation>) -> Self {
        debug_assert!(points.windows(2).all(|w| w[0].date < w[1].date));
        debug_assert!(points.iter().all(|o| o.value.is_finite()));
        Self { points }
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the series has no observations.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Iterate over observations in date order.
    pub fn iter(&self) -> std::slice::Iter<'_, Observation> {
        self.points.iter()
    }

    /// Borrow the underlying observations.
    pub fn observations(&self) -> &[Observation] {
        &self.points
    }

    /// Consume the series, returning its observations.
    pub fn into_observations(self) -> Vec<Observation> {
        self.points
    }

    /// First observation, if any.
    pub fn first(&self) -> Option<&Observation> {
        self.points.first()
    }

    /// Last observation, if any.
    pub fn last(&self) -> Option<&Observation> {
        self.points.last()
    }

    /// Date span covered by the series.
    pub fn range(&self) -> Option<DateRange> {
        match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) => Some(DateRange::new(first.date, last.date)),
            _ => None,
        }
    }

    /// Dates in order.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.points.iter().map(|o| o.date)
    }

    /// Values in date order.
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|o| o.value)
    }

    fn position(&self, date: NaiveDate) -> std::result::Result<usize, usize> {
        self.points.binary_search_by_key(&date, |o| o.date)
    }

    /// Value on `date`, if the series has one.
    pub fn get(&self, date: NaiveDate) -> Option<f64> {
        self.position(date).ok().map(|i| self.points[i].value)
    }

    /// Whether the series has an observation on `date`.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.position(date).is_ok()
    }

    /// Multiply every value by `factor`.
    ///
    /// # Errors
    /// Returns [`SeriesError::NonFinite`] for the first product that overflows or is
    /// not a number.
    pub fn scaled(&self, factor: f64) -> Result<Self> {
        let points = self
            .points
            .iter()
            .map(|o| {
                let value = o.value * factor;
                if value.is_finite() {
                    Ok(Observation::new(o.date, value))
                } else {
                    Err(SeriesError::NonFinite {
                        date: o.date,
                        value,
                    })
                }
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::from_sorted(points))
    }

    /// Observations strictly before `date`.
    pub fn before(&self, date: NaiveDate) -> Self {
        let end = self.position(date).unwrap_or_else(|i| i);
        Self::from_sorted(self.points[..end].to_vec())
    }

    /// Observations on or after `date`.
    pub fn since(&self, date: NaiveDate) -> Self {
        let start = self.position(date).unwrap_or_else(|i| i);
        Self::from_sorted(self.points[start..].to_vec())
    }

    /// Copy of the series with the observation on `date` removed, if present.
    pub fn without(&self, date: NaiveDate) -> Self {
        match self.position(date) {
            Ok(i) => {
                let mut points = self.points.clone();
                points.remove(i);
                Self::from_sorted(points)
            }
            Err(_) => self.clone(),
        }
    }

    /// Dates present in both series, in order.
    pub fn common_dates(&self, other: &Self) -> Vec<NaiveDate> {
        let (mut i, mut j) = (0, 0);
        let mut shared = Vec::new();
        while i < self.points.len() && j < other.points.len() {
            let (a, b) = (self.points[i].date, other.points[j].date);
            match a.cmp(&b) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    shared.push(a);
                    i += 1;
                    j += 1;
                }
            }
        }
        shared
    }
}

impl TryFrom<Vec<Observation>> for TimeSeries {
    type Error = SeriesError;

    fn try_from(points: Vec<Observation>) -> Result<Self> {
        Self::new(points)
    }
}

impl From<TimeSeries> for Vec<Observation> {
    fn from(series: TimeSeries) -> Self {
        series.points
    }
}

impl<'a> IntoIterator for &'a TimeSeries {
    type Item = &'a Observation;
    type IntoIter = std::slice::Iter<'a, Observation>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}
