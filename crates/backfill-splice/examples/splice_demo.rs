//! Splice a synthetic index history onto a synthetic fund with both scale policies.

use backfill_series::Observation;
use backfill_splice::{ScalePolicy, SpliceConfig, SpliceEngine};
use chrono::{Days, NaiveDate};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Backfill Splice Demo ===\n");

    let start = NaiveDate::from_ymd_opt(1998, 1, 2).ok_or("invalid start date")?;
    let listing = NaiveDate::from_ymd_opt(2003, 4, 14).ok_or("invalid listing date")?;

    // Index level with a slow trend and a wobble, one row per weekday-ish day.
    let index: Vec<Observation> = (0..3_000u64)
        .filter(|offset| offset % 7 < 5)
        .map(|offset| {
            let t = offset as f64;
            let level = 250.0 * (1.0 + 0.0002 * t) * (1.0 + 0.03 * (t / 45.0).sin());
            Observation::new(start + Days::new(offset), level)
        })
        .collect();

    // Fund trades at roughly a tenth of the index from its listing date.
    let fund: Vec<Observation> = index
        .iter()
        .filter(|o| o.date >= listing)
        .map(|o| Observation::new(o.date, o.value / 10.0 * 1.001))
        .collect();

    for policy in [ScalePolicy::SinglePoint, ScalePolicy::Regression] {
        let engine = SpliceEngine::new(SpliceConfig {
            scale_policy: policy,
            ..Default::default()
        })?;
        let output = engine.run(&index, &fund)?;

        println!("Policy           : {policy}");
        println!("Scale factor     : {:.6}", output.scale.factor.value());
        println!("Cutover          : {}", output.cutover);
        println!(
            "Periods          : {} proxy + {} target",
            output.proxy_periods(),
            output.target_periods()
        );
        if let Some(r) = output.cutover_return() {
            println!("Cutover return   : {:+.4}%", r * 100.0);
        }
        println!();
    }

    Ok(())
}
