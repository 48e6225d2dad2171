//! Serializable figure model: what one draw call carries to a surface.
//!
//! A figure is a list of traces plus a layout, mirroring the trace/layout
//! split the original dashboard used. Surfaces serialize the whole thing;
//! nothing here knows how pixels get made.

use serde::Serialize;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Figure {
    pub traces: Vec<Trace>,
    pub layout: Layout,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Trace {
    Line {
        name: String,
        x: Vec<f64>,
        y: Vec<f64>,
        color: String,
        width: f64,
    },
    /// One band of a stacked area chart; bands stack in list order.
    AreaBand {
        name: String,
        x: Vec<f64>,
        y: Vec<f64>,
        fill_color: String,
    },
    /// Geographic heat map keyed by ISO-3 code.
    Choropleth {
        locations: Vec<String>,
        values: Vec<f64>,
        labels: Vec<String>,
        color_scale: String,
    },
    /// Horizontal bars, one per category, top to bottom.
    BarH {
        categories: Vec<String>,
        values: Vec<f64>,
        color: String,
    },
    Scatter {
        name: String,
        x: Vec<f64>,
        y: Vec<f64>,
        labels: Vec<String>,
        /// Marker areas, same length as `x`.
        sizes: Vec<f64>,
        color_scale: String,
    },
    Donut {
        labels: Vec<String>,
        values: Vec<f64>,
        colors: Vec<String>,
        hole: f64,
    },
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Layout {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_label: Option<String>,
    pub show_legend: bool,
    pub theme: super::theme::Theme,
}

impl Layout {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            x_label: None,
            y_label: None,
            show_legend: false,
            theme: super::theme::Theme::base(),
        }
    }

    pub fn x_label(mut self, label: impl Into<String>) -> Self {
        self.x_label = Some(label.into());
        self
    }

    pub fn y_label(mut self, label: impl Into<String>) -> Self {
        self.y_label = Some(label.into());
        self
    }

    pub fn legend(mut self) -> Self {
        self.show_legend = true;
        self
    }
}
