//! One-shot aggregation over the cleaned dataset.
//!
//! `aggregate` runs exactly once per load. The result is built during that
//! single call and treated as read-only by every consumer; renderers and the
//! indicator calculator hold shared references into it.

use std::collections::BTreeMap;

use crate::loader::Record;
use crate::logging::{json_log, obj, v_int, Domain};

/// Pseudo-countries that are pre-aggregated rollups of other rows. Their
/// values still count toward world totals, but they are excluded from
/// per-country analyses.
pub const AGGREGATE_PSEUDO_ENTRIES: [&str; 2] = ["World", "EU-27"];

pub fn is_pseudo_entry(name: &str) -> bool {
    AGGREGATE_PSEUDO_ENTRIES.contains(&name)
}

/// World-level rollup of one year's qualifying records. Sums throughout,
/// except temperature-change which is the arithmetic mean across the
/// countries reporting that year.
#[derive(Debug, Clone, PartialEq)]
pub struct WorldYearSummary {
    pub year: i32,
    pub total_co2: f64,
    pub coal_co2: f64,
    pub oil_co2: f64,
    pub gas_co2: f64,
    pub cement_co2: f64,
    pub methane: f64,
    pub population: f64,
    pub renewable_energy: f64,
    pub mean_temp_change: f64,
}

/// Everything downstream consumers need, built once at startup.
#[derive(Debug, Default)]
pub struct AggregationResult {
    pub by_country: BTreeMap<String, Vec<Record>>,
    pub by_year: BTreeMap<i32, Vec<Record>>,
    /// Distinct years present, ascending.
    pub years: Vec<i32>,
    /// Country names, pseudo-entries excluded, sorted ascending, deduped.
    pub country_names: Vec<String>,
    /// One summary per year, ascending by year.
    pub world_by_year: Vec<WorldYearSummary>,
    /// Record with the maximum total CO2 in the reference year, pseudo-entries
    /// excluded. `None` when the reference year is absent.
    pub max_total_co2: Option<Record>,
    /// Record with the maximum per-capita CO2 in the reference year,
    /// pseudo-entries excluded. `None` when the reference year is absent.
    pub max_per_capita_co2: Option<Record>,
}

impl AggregationResult {
    pub fn world_summary(&self, year: i32) -> Option<&WorldYearSummary> {
        self.world_by_year.iter().find(|s| s.year == year)
    }

    pub fn year_records(&self, year: i32) -> &[Record] {
        self.by_year.get(&year).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn country_records(&self, country: &str) -> &[Record] {
        self.by_country
            .get(country)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn min_year(&self) -> Option<i32> {
        self.years.first().copied()
    }

    pub fn max_year(&self) -> Option<i32> {
        self.years.last().copied()
    }
}

fn summarize_year(year: i32, records: &[Record]) -> WorldYearSummary {
    let mut summary = WorldYearSummary {
        year,
        total_co2: 0.0,
        coal_co2: 0.0,
        oil_co2: 0.0,
        gas_co2: 0.0,
        cement_co2: 0.0,
        methane: 0.0,
        population: 0.0,
        renewable_energy: 0.0,
        mean_temp_change: 0.0,
    };
    let mut temp_sum = 0.0;
    for r in records {
        summary.total_co2 += r.total_co2;
        summary.coal_co2 += r.coal_co2;
        summary.oil_co2 += r.oil_co2;
        summary.gas_co2 += r.gas_co2;
        summary.cement_co2 += r.cement_co2;
        summary.methane += r.methane;
        summary.population += r.population;
        summary.renewable_energy += r.renewable_energy;
        temp_sum += r.temp_change;
    }
    if !records.is_empty() {
        summary.mean_temp_change = temp_sum / records.len() as f64;
    }
    summary
}

/// Find the reference-year record maximizing `key`, first-encountered wins on
/// ties. Rollup pseudo-entries are excluded so the superlative names a real
/// country rather than "World".
fn superlative(records: &[Record], key: impl Fn(&Record) -> f64) -> Option<Record> {
    let mut best: Option<&Record> = None;
    for r in records {
        if is_pseudo_entry(&r.country) {
            continue;
        }
        match best {
            Some(b) if key(r) <= key(b) => {}
            _ => best = Some(r),
        }
    }
    best.cloned()
}

/// Build the process-wide aggregation result. Pure and deterministic; called
/// once per loaded dataset.
pub fn aggregate(records: Vec<Record>, reference_year: i32) -> AggregationResult {
    let mut by_country: BTreeMap<String, Vec<Record>> = BTreeMap::new();
    let mut by_year: BTreeMap<i32, Vec<Record>> = BTreeMap::new();
    for record in records {
        by_country
            .entry(record.country.clone())
            .or_default()
            .push(record.clone());
        by_year.entry(record.year).or_default().push(record);
    }

    let years: Vec<i32> = by_year.keys().copied().collect();
    let country_names: Vec<String> = by_country
        .keys()
        .filter(|name| !is_pseudo_entry(name))
        .cloned()
        .collect();

    let world_by_year: Vec<WorldYearSummary> = by_year
        .iter()
        .map(|(&year, records)| summarize_year(year, records))
        .collect();

    let reference = by_year.get(&reference_year).map(Vec::as_slice).unwrap_or(&[]);
    let max_total_co2 = superlative(reference, |r| r.total_co2);
    let max_per_capita_co2 = superlative(reference, |r| r.per_capita_co2);

    json_log(
        Domain::Aggregate,
        "aggregation_built",
        obj(&[
            ("countries", v_int(country_names.len() as i64)),
            ("years", v_int(years.len() as i64)),
            ("reference_year", v_int(reference_year as i64)),
            (
                "reference_year_present",
                serde_json::json!(by_year.contains_key(&reference_year)),
            ),
        ]),
    );

    AggregationResult {
        by_country,
        by_year,
        years,
        country_names,
        world_by_year,
        max_total_co2,
        max_per_capita_co2,
    }
}

/// Synthetic country-year row for tests across the crate.
#[cfg(test)]
pub(crate) fn sample_record(country: &str, year: i32, total: f64) -> Record {
    Record {
        country: country.to_string(),
        iso3: Some(format!("{:.3}", country).to_uppercase()),
        year,
        total_co2: total,
        coal_co2: total * 0.4,
        oil_co2: total * 0.3,
        gas_co2: total * 0.2,
        cement_co2: total * 0.1,
        flaring_co2: 0.0,
        per_capita_co2: total / 10.0,
        temp_change: 0.5,
        energy_production: total * 2.0,
        renewable_energy: total * 0.5,
        methane: total * 0.1,
        population: 1_000.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::sample_record as record;

    #[test]
    fn country_list_excludes_pseudo_entries_and_is_sorted() {
        let rows = vec![
            record("World", 2021, 300.0),
            record("Brazil", 2021, 50.0),
            record("EU-27", 2021, 120.0),
            record("Argentina", 2021, 30.0),
            record("Brazil", 2020, 45.0),
        ];
        let agg = aggregate(rows, 2021);
        assert_eq!(agg.country_names, vec!["Argentina", "Brazil"]);
    }

    #[test]
    fn world_total_is_sum_over_all_rows_including_rollups() {
        let rows = vec![
            record("A", 2021, 100.0),
            record("B", 2021, 50.0),
            record("World", 2021, 150.0),
        ];
        let agg = aggregate(rows, 2021);
        let summary = agg.world_summary(2021).unwrap();
        assert_eq!(summary.total_co2, 300.0);
    }

    #[test]
    fn world_summary_consistency_with_per_country_totals() {
        let rows = vec![
            record("A", 2020, 10.0),
            record("B", 2020, 20.0),
            record("A", 2021, 12.0),
        ];
        let agg = aggregate(rows, 2021);
        for summary in &agg.world_by_year {
            let by_hand: f64 = agg
                .by_country
                .values()
                .flatten()
                .filter(|r| r.year == summary.year)
                .map(|r| r.total_co2)
                .sum();
            assert!((summary.total_co2 - by_hand).abs() < 1e-9);
        }
    }

    #[test]
    fn temp_change_is_mean_not_sum() {
        let mut a = record("A", 2021, 10.0);
        a.temp_change = 1.0;
        let mut b = record("B", 2021, 20.0);
        b.temp_change = 3.0;
        let agg = aggregate(vec![a, b], 2021);
        assert_eq!(agg.world_summary(2021).unwrap().mean_temp_change, 2.0);
    }

    #[test]
    fn superlatives_exclude_rollups_and_break_ties_by_encounter_order() {
        let mut tie = record("Tied", 2021, 100.0);
        tie.per_capita_co2 = 10.0;
        let rows = vec![
            record("World", 2021, 900.0),
            record("First", 2021, 100.0),
            tie,
            record("Small", 2021, 5.0),
        ];
        let agg = aggregate(rows, 2021);
        assert_eq!(agg.max_total_co2.as_ref().unwrap().country, "First");
        assert_eq!(agg.max_per_capita_co2.as_ref().unwrap().country, "First");
    }

    #[test]
    fn absent_reference_year_yields_no_superlatives() {
        let agg = aggregate(vec![record("A", 1999, 10.0)], 2021);
        assert!(agg.max_total_co2.is_none());
        assert!(agg.max_per_capita_co2.is_none());
    }

    #[test]
    fn years_are_ascending_and_distinct() {
        let rows = vec![
            record("A", 2001, 1.0),
            record("B", 1999, 1.0),
            record("C", 2001, 1.0),
        ];
        let agg = aggregate(rows, 2021);
        assert_eq!(agg.years, vec![1999, 2001]);
        assert_eq!(agg.min_year(), Some(1999));
        assert_eq!(agg.max_year(), Some(2001));
    }
}
