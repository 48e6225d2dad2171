//! Shared visual theme: dark base layered under every chart.

use serde::Serialize;

pub const ACCENT: &str = "#37b776";
pub const RENEWABLE_GREEN: &str = "#4CAF50";
pub const BACKGROUND: &str = "#0d1117";
pub const GRID: &str = "#2a2a2a";
pub const TEXT: &str = "#c9d1d9";
pub const BODY_FONT: &str = "Roboto, sans-serif";
pub const TITLE_FONT: &str = "Playfair Display, serif";

/// Fixed emission-source palette, in stacking order: coal, oil, gas, cement.
pub const SOURCE_COLORS: [&str; 4] = ["#0074D9", "#FF4136", "#FF851B", "#AAAAAA"];

/// Donut palette for the per-country source breakdown.
pub const DONUT_COLORS: [&str; 4] = ["#37b776", "#4CAF50", "#8BC34A", "#C0C0C0"];

pub const VIRIDIS: &str = "Viridis";

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Theme {
    pub background: String,
    pub grid: String,
    pub text: String,
    pub accent: String,
    pub body_font: String,
    pub title_font: String,
}

impl Theme {
    pub fn base() -> Self {
        Self {
            background: BACKGROUND.to_string(),
            grid: GRID.to_string(),
            text: TEXT.to_string(),
            accent: ACCENT.to_string(),
            body_font: BODY_FONT.to_string(),
            title_font: TITLE_FONT.to_string(),
        }
    }
}
