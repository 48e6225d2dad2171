//! Dataset loading: CSV file in, cleaned country-year records out.
//!
//! Rows are retained only when the country and year are present and the three
//! analysis-critical numerics (total CO2, per-capita CO2, temperature-change)
//! parse as finite numbers. Everything else is coerced with a zero fallback,
//! matching the permissive coercion the dataset was published with. Dropped
//! rows are counted, never surfaced as errors.

use std::fs::File;
use std::io;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::logging::{json_log, obj, v_int, Domain};

/// Header columns the dataset must carry. Order is irrelevant; extra columns
/// are ignored.
pub const REQUIRED_COLUMNS: [&str; 15] = [
    "Country",
    "Year",
    "Total.CO2",
    "Coal.CO2",
    "Oil.CO2",
    "Gas.CO2",
    "Cement.CO2",
    "Flaring.CO2",
    "Per.Capita.CO2",
    "Temp_Change",
    "Total.Energy.Production",
    "Renewables.and.other.Energy",
    "CH4",
    "Population",
    "ISO.alpha-3",
];

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot open dataset {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("dataset header is missing columns: {}", missing.join(", "))]
    MissingColumns { missing: Vec<String> },
    #[error("dataset is malformed: {0}")]
    Malformed(#[from] csv::Error),
}

/// One country-year observation, after cleaning.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub country: String,
    pub iso3: Option<String>,
    pub year: i32,
    pub total_co2: f64,
    pub coal_co2: f64,
    pub oil_co2: f64,
    pub gas_co2: f64,
    pub cement_co2: f64,
    pub flaring_co2: f64,
    pub per_capita_co2: f64,
    pub temp_change: f64,
    pub energy_production: f64,
    pub renewable_energy: f64,
    pub methane: f64,
    pub population: f64,
}

/// Raw row as it appears in the file. Everything is a string so that a bad
/// value in one column cannot poison the whole row before the retention gate
/// has looked at it.
#[derive(Debug, Deserialize)]
struct RawRow {
    #[serde(rename = "Country", default)]
    country: String,
    #[serde(rename = "ISO.alpha-3", default)]
    iso3: String,
    #[serde(rename = "Year", default)]
    year: String,
    #[serde(rename = "Total.CO2", default)]
    total_co2: String,
    #[serde(rename = "Coal.CO2", default)]
    coal_co2: String,
    #[serde(rename = "Oil.CO2", default)]
    oil_co2: String,
    #[serde(rename = "Gas.CO2", default)]
    gas_co2: String,
    #[serde(rename = "Cement.CO2", default)]
    cement_co2: String,
    #[serde(rename = "Flaring.CO2", default)]
    flaring_co2: String,
    #[serde(rename = "Per.Capita.CO2", default)]
    per_capita_co2: String,
    #[serde(rename = "Temp_Change", default)]
    temp_change: String,
    #[serde(rename = "Total.Energy.Production", default)]
    energy_production: String,
    #[serde(rename = "Renewables.and.other.Energy", default)]
    renewable_energy: String,
    #[serde(rename = "CH4", default)]
    methane: String,
    #[serde(rename = "Population", default)]
    population: String,
}

#[derive(Debug, Clone, Default)]
pub struct LoadStats {
    pub rows_seen: u64,
    pub rows_kept: u64,
    pub rows_dropped: u64,
}

#[derive(Debug)]
pub struct LoadReport {
    pub records: Vec<Record>,
    pub stats: LoadStats,
}

/// Strict parse for the retention gate: present, numeric, finite.
fn required_f64(field: &str) -> Option<f64> {
    field.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Lenient coercion for the remaining numerics.
fn lenient_f64(field: &str) -> f64 {
    required_f64(field).unwrap_or(0.0)
}

impl RawRow {
    /// Apply the retention rule; `None` means the row is dropped.
    fn clean(self) -> Option<Record> {
        let country = self.country.trim().to_string();
        if country.is_empty() {
            return None;
        }
        let year = self.year.trim().parse::<i32>().ok()?;
        let total_co2 = required_f64(&self.total_co2)?;
        let per_capita_co2 = required_f64(&self.per_capita_co2)?;
        let temp_change = required_f64(&self.temp_change)?;
        let iso3 = {
            let trimmed = self.iso3.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        };
        Some(Record {
            country,
            iso3,
            year,
            total_co2,
            coal_co2: lenient_f64(&self.coal_co2),
            oil_co2: lenient_f64(&self.oil_co2),
            gas_co2: lenient_f64(&self.gas_co2),
            cement_co2: lenient_f64(&self.cement_co2),
            flaring_co2: lenient_f64(&self.flaring_co2),
            per_capita_co2,
            temp_change,
            energy_production: lenient_f64(&self.energy_production),
            renewable_energy: lenient_f64(&self.renewable_energy),
            methane: lenient_f64(&self.methane),
            population: lenient_f64(&self.population),
        })
    }
}

/// Load and clean the dataset, with per-run statistics.
pub fn load_report(path: &Path) -> Result<LoadReport, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Open {
        path: path.display().to_string(),
        source,
    })?;
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader.headers()?.clone();
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|col| !headers.iter().any(|h| h == **col))
        .map(|col| col.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(LoadError::MissingColumns { missing });
    }

    let mut stats = LoadStats::default();
    let mut records = Vec::new();
    for row in reader.deserialize::<RawRow>() {
        let row = row?;
        stats.rows_seen += 1;
        match row.clean() {
            Some(record) => {
                stats.rows_kept += 1;
                records.push(record);
            }
            None => stats.rows_dropped += 1,
        }
    }

    json_log(
        Domain::Data,
        "dataset_loaded",
        obj(&[
            ("rows_seen", v_int(stats.rows_seen as i64)),
            ("rows_kept", v_int(stats.rows_kept as i64)),
            ("rows_dropped", v_int(stats.rows_dropped as i64)),
        ]),
    );

    Ok(LoadReport { records, stats })
}

/// Convenience wrapper when the statistics are not needed.
pub fn load(path: &Path) -> Result<Vec<Record>, LoadError> {
    load_report(path).map(|report| report.records)
}
