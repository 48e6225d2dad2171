//! Runtime configuration, read once from the environment at startup.

#[derive(Debug, Clone)]
pub struct Config {
    pub data_path: String,
    pub out_dir: String,
    /// Year used for "current" snapshots, superlatives, and the top-N chart.
    pub reference_year: i32,
    /// Earlier year used as the denominator for the growth indicator.
    pub baseline_year: i32,
    pub top_n: usize,
    /// Intersection ratio at which a story section counts as visible.
    pub reveal_threshold: f64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            data_path: std::env::var("DATA_PATH").unwrap_or_else(|_| "data/MASTER.csv".to_string()),
            out_dir: std::env::var("OUT_DIR").unwrap_or_else(|_| "out".to_string()),
            reference_year: std::env::var("REFERENCE_YEAR")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(2021),
            baseline_year: std::env::var("BASELINE_YEAR")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1980),
            top_n: std::env::var("TOP_N")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
            reveal_threshold: std::env::var("REVEAL_THRESHOLD")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0.2),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_path: "data/MASTER.csv".to_string(),
            out_dir: "out".to_string(),
            reference_year: 2021,
            baseline_year: 1980,
            top_n: 10,
            reveal_threshold: 0.2,
        }
    }
}
