//! Headline indicators for the reference-year snapshot.
//!
//! Every field is an `Option`: `None` means the underlying data is absent,
//! which is not the same thing as a zero emission value. Scaling matches the
//! display units the dashboard presents (millions of kt, billions of people).

use crate::aggregate::AggregationResult;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Indicators {
    /// World total CO2 in millions of kt.
    pub total_co2_mkt: Option<f64>,
    /// Mean temperature-change contribution across reporting countries, °C.
    pub mean_temp_change: Option<f64>,
    /// World methane in thousands of kt.
    pub methane_kkt: Option<f64>,
    /// World population in billions.
    pub population_bn: Option<f64>,
    /// Coal share of total CO2, percent.
    pub coal_share_pct: Option<f64>,
    /// Combined oil + gas share of total CO2, percent.
    pub oil_gas_share_pct: Option<f64>,
    /// World renewable energy in millions of kt.
    pub renewable_energy_mkt: Option<f64>,
    /// Total CO2 growth from the baseline year to the reference year, percent.
    pub co2_growth_pct: Option<f64>,
    /// Largest emitter in the reference year (rollups excluded).
    pub top_emitter: Option<String>,
    /// Highest per-capita emitter in the reference year (rollups excluded).
    pub top_per_capita: Option<String>,
}

/// Derive the headline values. Absent reference-year data leaves every field
/// unavailable; an absent baseline only suppresses the growth figure.
pub fn compute(agg: &AggregationResult, reference_year: i32, baseline_year: i32) -> Indicators {
    let mut out = Indicators {
        top_emitter: agg.max_total_co2.as_ref().map(|r| r.country.clone()),
        top_per_capita: agg.max_per_capita_co2.as_ref().map(|r| r.country.clone()),
        ..Indicators::default()
    };

    let reference = match agg.world_summary(reference_year) {
        Some(summary) => summary,
        None => return out,
    };

    out.total_co2_mkt = Some(reference.total_co2 / 1_000_000.0);
    out.mean_temp_change = Some(reference.mean_temp_change);
    out.methane_kkt = Some(reference.methane / 1_000.0);
    out.population_bn = Some(reference.population / 1_000_000_000.0);
    out.renewable_energy_mkt = Some(reference.renewable_energy / 1_000_000.0);

    // Shares stay unavailable when the denominator is zero.
    if reference.total_co2 != 0.0 {
        out.coal_share_pct = Some(reference.coal_co2 / reference.total_co2 * 100.0);
        out.oil_gas_share_pct =
            Some((reference.oil_co2 + reference.gas_co2) / reference.total_co2 * 100.0);
    }

    if let Some(baseline) = agg.world_summary(baseline_year) {
        if baseline.total_co2 != 0.0 {
            out.co2_growth_pct =
                Some((reference.total_co2 - baseline.total_co2) / baseline.total_co2 * 100.0);
        }
    }

    out
}

fn fmt(value: Option<f64>, precision: usize, suffix: &str) -> String {
    match value {
        Some(v) => format!("{:.*}{}", precision, v, suffix),
        None => "N/A".to_string(),
    }
}

impl Indicators {
    /// Display rows for the KPI block, in presentation order.
    pub fn display_rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("total_co2", fmt(self.total_co2_mkt, 2, " M kt")),
            ("temp_change", fmt(self.mean_temp_change, 2, " °C")),
            ("methane", fmt(self.methane_kkt, 2, " K kt")),
            ("population", fmt(self.population_bn, 2, " Bn")),
            ("coal_share", fmt(self.coal_share_pct, 1, "%")),
            ("oil_gas_share", fmt(self.oil_gas_share_pct, 1, "%")),
            ("renewable_energy", fmt(self.renewable_energy_mkt, 2, " M kt")),
            ("co2_growth", fmt(self.co2_growth_pct, 0, "%")),
            (
                "top_emitter",
                self.top_emitter.clone().unwrap_or_else(|| "N/A".to_string()),
            ),
            (
                "top_per_capita",
                self.top_per_capita
                    .clone()
                    .unwrap_or_else(|| "N/A".to_string()),
            ),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{aggregate, sample_record as record};

    #[test]
    fn growth_from_baseline_to_reference() {
        let rows = vec![record("World", 1980, 1000.0), record("World", 2021, 3000.0)];
        let agg = aggregate(rows, 2021);
        let ind = compute(&agg, 2021, 1980);
        assert_eq!(ind.co2_growth_pct, Some(200.0));
    }

    #[test]
    fn missing_reference_year_leaves_everything_unavailable() {
        let agg = aggregate(vec![record("A", 1999, 10.0)], 2021);
        let ind = compute(&agg, 2021, 1980);
        assert_eq!(ind, Indicators::default());
        assert!(ind.total_co2_mkt.is_none());
        assert!(ind.co2_growth_pct.is_none());
    }

    #[test]
    fn missing_baseline_only_suppresses_growth() {
        let agg = aggregate(vec![record("A", 2021, 500.0)], 2021);
        let ind = compute(&agg, 2021, 1980);
        assert!(ind.total_co2_mkt.is_some());
        assert!(ind.co2_growth_pct.is_none());
    }

    #[test]
    fn shares_unavailable_when_world_total_is_zero() {
        let mut row = record("A", 2021, 0.0);
        row.coal_co2 = 0.0;
        row.oil_co2 = 0.0;
        row.gas_co2 = 0.0;
        row.cement_co2 = 0.0;
        let agg = aggregate(vec![row], 2021);
        let ind = compute(&agg, 2021, 1980);
        assert_eq!(ind.total_co2_mkt, Some(0.0));
        assert!(ind.coal_share_pct.is_none());
        assert!(ind.oil_gas_share_pct.is_none());
    }

    #[test]
    fn scaling_matches_display_units() {
        let mut row = record("A", 2021, 2_000_000.0);
        row.methane = 5_000.0;
        row.population = 2_000_000_000.0;
        row.renewable_energy = 1_000_000.0;
        let agg = aggregate(vec![row], 2021);
        let ind = compute(&agg, 2021, 1980);
        assert_eq!(ind.total_co2_mkt, Some(2.0));
        assert_eq!(ind.methane_kkt, Some(5.0));
        assert_eq!(ind.population_bn, Some(2.0));
        assert_eq!(ind.renewable_energy_mkt, Some(1.0));
    }

    #[test]
    fn unavailable_fields_format_as_na() {
        let ind = Indicators::default();
        for (_, value) in ind.display_rows() {
            assert_eq!(value, "N/A");
        }
    }
}
