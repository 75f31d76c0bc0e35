//! Resample an irregular daily series to month-end and derive monthly returns.

use backfill_series::{InputOrder, Observation, Period, resample, simple_returns};
use chrono::{Days, NaiveDate};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Backfill Resample Demo ===\n");

    let start = NaiveDate::from_ymd_opt(2013, 6, 4).ok_or("invalid start date")?;
    let raw: Vec<Observation> = (0..120u64)
        .filter(|offset| offset % 7 < 5)
        .map(|offset| {
            let level = 50.0 * (1.0 + 0.0004 * offset as f64);
            Observation::new(start + Days::new(offset), level)
        })
        .collect();

    let monthly = resample(&raw, &Period::MonthEnd, InputOrder::Strict)?;
    let returns = simple_returns(&monthly)?;

    println!("Daily observations : {}", raw.len());
    println!("Month-end prices   : {}", monthly.len());
    for obs in &monthly {
        println!("  {}  {:>10.6}", obs.date, obs.value);
    }
    println!("\nMonthly returns    : {}", returns.len());
    for obs in &returns {
        println!("  {}  {:>+10.8}", obs.date, obs.value);
    }

    Ok(())
}
