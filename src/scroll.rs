//! Scroll-driven reveal: an explicit stand-in for the browser's
//! IntersectionObserver.
//!
//! Each story section is a tiny state machine {hidden, visible}. Crossing the
//! visibility threshold latches the section visible and invokes its chart;
//! the latch never reverts, while the chart invocation stays idempotent on
//! the renderer side. The two input controls are always live, independent of
//! any section's state.

use std::collections::HashMap;

use anyhow::Result;

use crate::aggregate::AggregationResult;
use crate::charts::{ChartId, ChartRenderer};
use crate::logging::{json_log, obj, v_int, v_num, v_str, Domain};

/// Story sections, in page order. Each maps to exactly one chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionId {
    WorldTrend,
    SourceComposition,
    PerCapitaMap,
    TopEmitters,
    TempCorrelation,
    SourceBreakdown,
    RenewableTrend,
}

impl SectionId {
    pub const ALL: [SectionId; 7] = [
        SectionId::WorldTrend,
        SectionId::SourceComposition,
        SectionId::PerCapitaMap,
        SectionId::TopEmitters,
        SectionId::TempCorrelation,
        SectionId::SourceBreakdown,
        SectionId::RenewableTrend,
    ];

    pub fn chart(&self) -> ChartId {
        match self {
            SectionId::WorldTrend => ChartId::WorldTrend,
            SectionId::SourceComposition => ChartId::SourceComposition,
            SectionId::PerCapitaMap => ChartId::PerCapitaMap,
            SectionId::TopEmitters => ChartId::TopEmitters,
            SectionId::TempCorrelation => ChartId::TempCorrelation,
            SectionId::SourceBreakdown => ChartId::SourceBreakdown,
            SectionId::RenewableTrend => ChartId::RenewableTrend,
        }
    }

    pub fn as_str(&self) -> &'static str {
        self.chart().surface_name()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SectionState {
    #[default]
    Hidden,
    Visible,
}

/// Year-range control bound to the choropleth.
#[derive(Debug, Clone)]
pub struct YearControl {
    pub min: i32,
    pub max: i32,
    pub current: i32,
}

/// Country selector bound to the source-breakdown donut.
#[derive(Debug, Clone)]
pub struct CountryControl {
    pub options: Vec<String>,
    pub selected: String,
}

pub struct ScrollController<'a> {
    renderer: ChartRenderer<'a>,
    threshold: f64,
    sections: HashMap<SectionId, SectionState>,
    year_control: YearControl,
    country_control: CountryControl,
}

impl<'a> ScrollController<'a> {
    /// Wire the controller up after aggregation: control bounds come from the
    /// data, the default country is the reference-year top emitter with
    /// "World" as the fallback.
    pub fn new(agg: &'a AggregationResult, renderer: ChartRenderer<'a>, threshold: f64) -> Self {
        let max_year = agg.max_year().unwrap_or(0);
        let year_control = YearControl {
            min: agg.min_year().unwrap_or(0),
            max: max_year,
            current: max_year,
        };
        let country_control = CountryControl {
            options: agg.country_names.clone(),
            selected: agg
                .max_total_co2
                .as_ref()
                .map(|r| r.country.clone())
                .unwrap_or_else(|| "World".to_string()),
        };
        Self {
            renderer,
            threshold,
            sections: SectionId::ALL
                .iter()
                .map(|&s| (s, SectionState::Hidden))
                .collect(),
            year_control,
            country_control,
        }
    }

    pub fn section_state(&self, section: SectionId) -> SectionState {
        self.sections.get(&section).copied().unwrap_or_default()
    }

    pub fn year_control(&self) -> &YearControl {
        &self.year_control
    }

    pub fn country_control(&self) -> &CountryControl {
        &self.country_control
    }

    pub fn renderer(&self) -> &ChartRenderer<'a> {
        &self.renderer
    }

    /// Feed one intersection observation. At or above the threshold the
    /// section latches visible and its chart is invoked; the renderer decides
    /// whether an actual draw happens. Below the threshold nothing changes:
    /// revealed sections stay revealed.
    pub fn on_intersection(&mut self, section: SectionId, ratio: f64) -> Result<()> {
        if ratio < self.threshold {
            return Ok(());
        }
        let state = self.sections.entry(section).or_default();
        if *state == SectionState::Hidden {
            *state = SectionState::Visible;
            json_log(
                Domain::Scroll,
                "section_revealed",
                obj(&[
                    ("section", v_str(section.as_str())),
                    ("ratio", v_num(ratio)),
                ]),
            );
        }
        self.render_section(section)
    }

    /// Year-range control change; re-renders the choropleth regardless of the
    /// map section's scroll state. Values are clamped to the data's bounds
    /// the way a range input clamps.
    pub fn on_year_change(&mut self, year: i32) -> Result<()> {
        let year = year.clamp(self.year_control.min, self.year_control.max);
        self.year_control.current = year;
        json_log(
            Domain::Scroll,
            "year_selected",
            obj(&[("year", v_int(year as i64))]),
        );
        self.renderer.per_capita_map(year)
    }

    /// Country selector change; re-renders the source-breakdown donut. An
    /// unknown country reaches the renderer and no-ops there.
    pub fn on_country_change(&mut self, country: &str) -> Result<()> {
        self.country_control.selected = country.to_string();
        json_log(
            Domain::Scroll,
            "country_selected",
            obj(&[("country", v_str(country))]),
        );
        self.renderer.source_breakdown(country)
    }

    fn render_section(&mut self, section: SectionId) -> Result<()> {
        match section {
            SectionId::WorldTrend => self.renderer.world_trend(),
            SectionId::SourceComposition => self.renderer.source_composition(),
            SectionId::PerCapitaMap => {
                let year = self.year_control.current;
                self.renderer.per_capita_map(year)
            }
            SectionId::TopEmitters => self.renderer.top_emitters(),
            SectionId::TempCorrelation => self.renderer.temp_correlation(None),
            SectionId::SourceBreakdown => {
                let country = self.country_control.selected.clone();
                self.renderer.source_breakdown(&country)
            }
            SectionId::RenewableTrend => self.renderer.renewable_trend(),
        }
    }
}
