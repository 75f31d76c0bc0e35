//! Period grids.
//!
//! A [`Period`] maps any date to the period-end date ("label") of the period it
//! falls into. Resampled series are indexed by these labels, so two series
//! resampled onto the same grid line up date-for-date.

use crate::error::{Result, SeriesError};
use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Periodicity of a resampled series.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Period {
    /// Every calendar date is its own period.
    Daily,
    /// Weeks ending on the given weekday.
    Weekly {
        /// Last day of each week.
        ending: Weekday,
    },
    /// Calendar months, labelled with the last day of the month.
    #[default]
    MonthEnd,
    /// Calendar quarters, labelled with the last day of the quarter.
    QuarterEnd,
    /// Calendar years, labelled with December 31st.
    YearEnd,
    /// Arbitrary period-end dates. A date belongs to the first boundary on or after it.
    Custom {
        /// Strictly increasing period-end dates.
        boundaries: Vec<NaiveDate>,
    },
}

fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let (next_year, next_month) = if month == 12 {
        (year.checked_add(1)?, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)?.pred_opt()
}

impl Period {
    /// Build a custom grid from period-end dates.
    ///
    /// # Errors
    /// Returns [`SeriesError::InvalidPeriod`] if the boundaries are empty or not
    /// strictly increasing.
    pub fn custom(boundaries: Vec<NaiveDate>) -> Result<Self> {
        let period = Self::Custom { boundaries };
        period.validate()?;
        Ok(period)
    }

    /// Check that the grid is usable.
    ///
    /// # Errors
    /// Returns [`SeriesError::InvalidPeriod`] for an empty or unordered custom grid.
    pub fn validate(&self) -> Result<()> {
        if let Self::Custom { boundaries } = self {
            if boundaries.is_empty() {
                return Err(SeriesError::InvalidPeriod(
                    "custom grid has no boundaries".to_string(),
                ));
            }
            if let Some(w) = boundaries.windows(2).find(|w| w[0] >= w[1]) {
                return Err(SeriesError::InvalidPeriod(format!(
                    "custom boundaries not strictly increasing: {} then {}",
                    w[0], w[1]
                )));
            }
        }
        Ok(())
    }

    /// Period-end date of the period containing `date`.
    ///
    /// Returns `None` when `date` lies past the last boundary of a custom grid, or when
    /// the label would overflow the calendar.
    pub fn label(&self, date: NaiveDate) -> Option<NaiveDate> {
        match self {
            Self::Daily => Some(date),
            Self::Weekly { ending } => {
                let ahead = (ending.num_days_from_monday() + 7
                    - date.weekday().num_days_from_monday())
                    % 7;
                date.checked_add_days(Days::new(u64::from(ahead)))
            }
            Self::MonthEnd => last_day_of_month(date.year(), date.month()),
            Self::QuarterEnd => {
                let quarter_end_month = (date.month() - 1) / 3 * 3 + 3;
                last_day_of_month(date.year(), quarter_end_month)
            }
            Self::YearEnd => NaiveDate::from_ymd_opt(date.year(), 12, 31),
            Self::Custom { boundaries } => {
                let idx = boundaries.partition_point(|b| *b < date);
                boundaries.get(idx).copied()
            }
        }
    }

    /// Whether `date` is a period-end date on this grid.
    pub fn is_boundary(&self, date: NaiveDate) -> bool {
        self.label(date) == Some(date)
    }

    /// Label of the period following the one labelled `label`.
    pub fn next_label(&self, label: NaiveDate) -> Option<NaiveDate> {
        self.label(label.succ_opt()?)
    }

    /// Number of periods in a year, for calendars with a fixed count.
    pub const fn periods_per_year(&self) -> Option<f64> {
        match self {
            Self::Weekly { .. } => Some(52.0),
            Self::MonthEnd => Some(12.0),
            Self::QuarterEnd => Some(4.0),
            Self::YearEnd => Some(1.0),
            Self::Daily | Self::Custom { .. } => None,
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Daily => write!(f, "daily"),
            Self::Weekly { ending } => write!(f, "weekly-{}", ending.to_string().to_lowercase()),
            Self::MonthEnd => write!(f, "month-end"),
            Self::QuarterEnd => write!(f, "quarter-end"),
            Self::YearEnd => write!(f, "year-end"),
            Self::Custom { boundaries } => write!(f, "custom({} boundaries)", boundaries.len()),
        }
    }
}

impl FromStr for Period {
    type Err = SeriesError;

    /// Parse the fixed calendars: `daily`, `weekly` (Friday close), `weekly-<day>`,
    /// `month-end`, `quarter-end`, `year-end`, plus the pandas aliases `D`, `W`, `ME`,
    /// `QE` and `YE`.
    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_ascii_lowercase();
        match lower.as_str() {
            "daily" | "d" => Ok(Self::Daily),
            "weekly" | "w" => Ok(Self::Weekly {
                ending: Weekday::Fri,
            }),
            "month-end" | "monthly" | "m" | "me" => Ok(Self::MonthEnd),
            "quarter-end" | "quarterly" | "q" | "qe" => Ok(Self::QuarterEnd),
            "year-end" | "yearly" | "annual" | "y" | "ye" => Ok(Self::YearEnd),
            other => other
                .strip_prefix("weekly-")
                .or_else(|| other.strip_prefix("w-"))
                .and_then(|day| day.parse::<Weekday>().ok())
                .map(|ending| Self::Weekly { ending })
                .ok_or_else(|| SeriesError::InvalidPeriod(format!("unknown period '{s}'"))),
        }
    }
}
