//! Splice summaries.
//!
//! A [`SpliceSummary`] is the audit record for one run: what each input covered,
//! how the levels were reconciled, where the cutover fell and how the spliced
//! series grew.

use crate::export::{ExportError, ExportFormat, Exporter, finish_csv};
use backfill_series::{DateRange, Period, TimeSeries};
use backfill_splice::{OverlapWindow, ScalePolicy, SpliceOutput};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Coverage of one series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coverage {
    /// First and last period, if any.
    pub range: Option<DateRange>,

    /// Number of periods.
    pub periods: usize,
}

impl Coverage {
    /// Coverage of `series`.
    pub fn of(series: &TimeSeries) -> Self {
        Self {
            range: series.range(),
            periods: series.len(),
        }
    }
}

impl fmt::Display for Coverage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.range {
            Some(range) => write!(f, "{range} ({} periods)", self.periods),
            None => write!(f, "empty"),
        }
    }
}

/// Audit record for one splice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpliceSummary {
    /// Period grid.
    pub periodicity: Period,

    /// Resampled proxy.
    pub proxy: Coverage,

    /// Resampled target.
    pub target: Coverage,

    /// Spliced prices.
    pub prices: Coverage,

    /// Derived returns.
    pub returns: Coverage,

    /// Scale reconciliation policy.
    pub policy: ScalePolicy,

    /// Scale factor applied to the proxy.
    pub scale_factor: f64,

    /// Anchor period (single-point policy).
    pub anchor: Option<NaiveDate>,

    /// Shared periods of proxy and target.
    pub overlap: Option<OverlapWindow>,

    /// Paired observations behind the scale factor.
    pub scale_observations: usize,

    /// First period taken from the target.
    pub cutover: NaiveDate,

    /// Spliced periods taken from the proxy.
    pub proxy_periods: usize,

    /// Spliced periods taken from the target.
    pub target_periods: usize,

    /// Return of the cutover period, if kept.
    pub cutover_return: Option<f64>,

    /// Last spliced price over the first, minus one.
    pub cumulative_growth: Option<f64>,

    /// Cumulative growth expressed per year, for grids with a fixed period count.
    pub annualized_growth: Option<f64>,
}

impl SpliceSummary {
    /// Summarise a splice.
    pub fn from_output(output: &SpliceOutput) -> Self {
        let cumulative_growth = growth(&output.prices);
        let annualized_growth = match (cumulative_growth, output.periodicity.periods_per_year()) {
            (Some(g), Some(per_year)) if output.prices.len() > 1 => {
                let years = (output.prices.len() - 1) as f64 / per_year;
                Some((1.0 + g).powf(1.0 / years) - 1.0)
            }
            _ => None,
        };

        Self {
            periodicity: output.periodicity.clone(),
            proxy: Coverage::of(&output.proxy),
            target: Coverage::of(&output.target),
            prices: Coverage::of(&output.prices),
            returns: Coverage::of(&output.returns),
            policy: output.scale.policy,
            scale_factor: output.scale.factor.value(),
            anchor: output.scale.anchor,
            overlap: output.scale.overlap,
            scale_observations: output.scale.observations,
            cutover: output.cutover,
            proxy_periods: output.proxy_periods(),
            target_periods: output.target_periods(),
            cutover_return: output.cutover_return(),
            cumulative_growth,
            annualized_growth,
        }
    }

    /// Field/value pairs, in display order.
    fn to_flat_records(&self) -> Vec<SummaryField> {
        let opt = |v: Option<String>| v.unwrap_or_default();
        vec![
            SummaryField::new("periodicity", self.periodicity.to_string()),
            SummaryField::new("proxy_range", opt(self.proxy.range.map(|r| r.to_string()))),
            SummaryField::new("proxy_input_periods", self.proxy.periods.to_string()),
            SummaryField::new("target_range", opt(self.target.range.map(|r| r.to_string()))),
            SummaryField::new("target_input_periods", self.target.periods.to_string()),
            SummaryField::new("policy", self.policy.to_string()),
            SummaryField::new("scale_factor", self.scale_factor.to_string()),
            SummaryField::new("anchor", opt(self.anchor.map(|d| d.to_string()))),
            SummaryField::new("overlap", opt(self.overlap.map(|o| o.range.to_string()))),
            SummaryField::new(
                "overlap_periods",
                self.overlap.map_or(0, |o| o.periods).to_string(),
            ),
            SummaryField::new("scale_observations", self.scale_observations.to_string()),
            SummaryField::new("cutover", self.cutover.to_string()),
            SummaryField::new("proxy_periods", self.proxy_periods.to_string()),
            SummaryField::new("target_periods", self.target_periods.to_string()),
            SummaryField::new("price_range", opt(self.prices.range.map(|r| r.to_string()))),
            SummaryField::new("price_periods", self.prices.periods.to_string()),
            SummaryField::new("return_periods", self.returns.periods.to_string()),
            SummaryField::new(
                "cutover_return",
                opt(self.cutover_return.map(|v| v.to_string())),
            ),
            SummaryField::new(
                "cumulative_growth",
                opt(self.cumulative_growth.map(|v| v.to_string())),
            ),
            SummaryField::new(
                "annualized_growth",
                opt(self.annualized_growth.map(|v| v.to_string())),
            ),
        ]
    }
}

fn growth(prices: &TimeSeries) -> Option<f64> {
    let first = prices.first()?.value;
    let last = prices.last()?.value;
    (first != 0.0).then(|| last / first - 1.0)
}

#[derive(Debug, Serialize)]
struct SummaryField {
    field: &'static str,
    value: String,
}

impl SummaryField {
    const fn new(field: &'static str, value: String) -> Self {
        Self { field, value }
    }
}

impl fmt::Display for SpliceSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Splice Summary ===")?;
        writeln!(f, "  Periodicity: {}", self.periodicity)?;
        writeln!(f, "  Proxy: {}", self.proxy)?;
        writeln!(f, "  Target: {}", self.target)?;
        match self.overlap {
            Some(o) => writeln!(f, "  Overlap: {} ({} periods)", o.range, o.periods)?,
            None => writeln!(f, "  Overlap: none")?,
        }
        write!(f, "  Scale: {:.6} ({}", self.scale_factor, self.policy)?;
        match self.anchor {
            Some(anchor) => writeln!(f, ", anchor {anchor})")?,
            None => writeln!(f, ", {} paired returns)", self.scale_observations)?,
        }
        writeln!(
            f,
            "  Cutover: {} ({} proxy + {} target periods)",
            self.cutover, self.proxy_periods, self.target_periods
        )?;
        writeln!(f, "  Prices: {}", self.prices)?;
        writeln!(f, "  Returns: {}", self.returns)?;
        if let Some(r) = self.cutover_return {
            writeln!(f, "  Cutover Return: {:.4}%", r * 100.0)?;
        }
        if let Some(g) = self.cumulative_growth {
            writeln!(f, "  Cumulative Growth: {:.2}%", g * 100.0)?;
        }
        if let Some(g) = self.annualized_growth {
            writeln!(f, "  Annualized Growth: {:.2}%", g * 100.0)?;
        }
        Ok(())
    }
}

impl Exporter for SpliceSummary {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => {
                let mut wtr = csv::Writer::from_writer(vec![]);
                for record in self.to_flat_records() {
                    wtr.serialize(&record)?;
                }
                finish_csv(wtr)
            }
            ExportFormat::Json => Ok(serde_json::to_string(self)?),
            ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(self)?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use backfill_series::Observation;
    use backfill_splice::{SpliceConfig, run_splice};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn output() -> SpliceOutput {
        let proxy = vec![
            Observation::new(d(2020, 1, 31), 100.0),
            Observation::new(d(2020, 2, 29), 110.0),
            Observation::new(d(2020, 3, 31), 121.0),
        ];
        let target = vec![
            Observation::new(d(2020, 2, 29), 55.0),
            Observation::new(d(2020, 3, 31), 60.5),
            Observation::new(d(2020, 4, 30), 66.55),
        ];
        run_splice(&proxy, &target, SpliceConfig::default()).unwrap()
    }

    #[test]
    fn test_summary_fields() {
        let summary = SpliceSummary::from_output(&output());
        assert_eq!(summary.policy, ScalePolicy::SinglePoint);
        assert_relative_eq!(summary.scale_factor, 0.5, epsilon = 1e-12);
        assert_eq!(summary.anchor, Some(d(2020, 2, 29)));
        assert_eq!(summary.cutover, d(2020, 2, 29));
        assert_eq!(summary.proxy_periods, 1);
        assert_eq!(summary.target_periods, 3);
        assert_eq!(summary.prices.periods, 4);
        assert_eq!(summary.returns.periods, 3);
        assert_eq!(summary.overlap.map(|o| o.periods), Some(2));
        assert_relative_eq!(summary.cutover_return.unwrap(), 0.10, epsilon = 1e-12);
        assert_relative_eq!(summary.cumulative_growth.unwrap(), 0.331, epsilon = 1e-12);
        // three monthly steps of 10%
        let expected = 1.1f64.powi(12) - 1.0;
        assert_relative_eq!(summary.annualized_growth.unwrap(), expected, epsilon = 1e-9);
    }

    #[test]
    fn test_summary_display() {
        let text = SpliceSummary::from_output(&output()).to_string();
        assert!(text.starts_with("=== Splice Summary ==="));
        assert!(text.contains("Scale: 0.500000 (single-point, anchor 2020-02-29)"));
        assert!(text.contains("Cutover: 2020-02-29 (1 proxy + 3 target periods)"));
        assert!(text.contains("Overlap: 2020-02-29 to 2020-03-31 (2 periods)"));
    }

    #[test]
    fn test_summary_csv_is_field_value() {
        let csv = SpliceSummary::from_output(&output())
            .export_to_string(ExportFormat::Csv)
            .unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("field,value"));
        assert!(csv.contains("periodicity,month-end\n"));
        assert!(csv.contains("cutover,2020-02-29\n"));
        assert!(csv.contains("scale_factor,0.5\n"));
    }

    #[test]
    fn test_summary_json_round_trip() {
        let summary = SpliceSummary::from_output(&output());
        let json = summary.export_to_string(ExportFormat::PrettyJson).unwrap();
        let back: SpliceSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(back, summary);
    }

    #[test]
    fn test_no_annualized_growth_for_daily() {
        let proxy = vec![
            Observation::new(d(2020, 1, 1), 10.0),
            Observation::new(d(2020, 1, 2), 11.0),
        ];
        let target = vec![Observation::new(d(2020, 1, 2), 22.0)];
        let config = SpliceConfig {
            periodicity: Period::Daily,
            ..Default::default()
        };
        let summary = SpliceSummary::from_output(&run_splice(&proxy, &target, config).unwrap());
        assert!(summary.annualized_growth.is_none());
        assert_relative_eq!(summary.cumulative_growth.unwrap(), 0.1, epsilon = 1e-12);
    }
}
