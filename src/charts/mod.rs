//! Chart rendering: select a slice of the aggregation result, shape it into
//! series or geometry, and issue one draw call against the chart's surface.
//!
//! Every operation is a no-op when its data is absent and skips the draw when
//! invoked with the same parameters as its last successful draw. Absence is an
//! expected state here, never an error.

pub mod figure;
pub mod surface;
pub mod theme;

use std::collections::HashMap;

use anyhow::Result;

use crate::aggregate::{is_pseudo_entry, AggregationResult};
use crate::logging::{json_log, obj, v_int, v_str, Domain};
use figure::{Figure, Layout, Trace};
use surface::Surface;

/// The seven chart mount points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartId {
    WorldTrend,
    SourceComposition,
    PerCapitaMap,
    TopEmitters,
    TempCorrelation,
    SourceBreakdown,
    RenewableTrend,
}

impl ChartId {
    pub const ALL: [ChartId; 7] = [
        ChartId::WorldTrend,
        ChartId::SourceComposition,
        ChartId::PerCapitaMap,
        ChartId::TopEmitters,
        ChartId::TempCorrelation,
        ChartId::SourceBreakdown,
        ChartId::RenewableTrend,
    ];

    /// Stable name of the chart's output surface.
    pub fn surface_name(&self) -> &'static str {
        match self {
            ChartId::WorldTrend => "world_trend",
            ChartId::SourceComposition => "source_composition",
            ChartId::PerCapitaMap => "per_capita_map",
            ChartId::TopEmitters => "top_emitters",
            ChartId::TempCorrelation => "temp_correlation",
            ChartId::SourceBreakdown => "source_breakdown",
            ChartId::RenewableTrend => "renewable_trend",
        }
    }
}

/// Parameters a chart was last drawn with. Charts without user input use
/// `Fixed`; the interactive ones carry their selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderParams {
    Fixed,
    Year(i32),
    CountryFilter(Option<String>),
    Country(String),
}

/// Per-chart draw state. A chart re-draws only when its parameters differ
/// from the ones recorded here.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RenderState {
    #[default]
    NotRendered,
    Rendered(RenderParams),
}

/// Owns the surfaces and the per-chart render states; borrows the immutable
/// aggregation result for the lifetime of the dashboard.
pub struct ChartRenderer<'a> {
    agg: &'a AggregationResult,
    reference_year: i32,
    top_n: usize,
    surfaces: HashMap<ChartId, Box<dyn Surface + 'a>>,
    states: HashMap<ChartId, RenderState>,
}

impl<'a> ChartRenderer<'a> {
    pub fn new(agg: &'a AggregationResult, reference_year: i32, top_n: usize) -> Self {
        Self {
            agg,
            reference_year,
            top_n,
            surfaces: HashMap::new(),
            states: HashMap::new(),
        }
    }

    /// Attach the output surface for one chart. Charts without a surface
    /// no-op on render, which keeps partial setups (and tests) harmless.
    pub fn mount(&mut self, chart: ChartId, surface: Box<dyn Surface + 'a>) {
        self.surfaces.insert(chart, surface);
    }

    pub fn state(&self, chart: ChartId) -> RenderState {
        self.states.get(&chart).cloned().unwrap_or_default()
    }

    /// Shared redraw discipline: skip when parameters are unchanged, draw and
    /// record otherwise. `figure: None` means the chart's data is absent and
    /// the whole invocation is a no-op.
    fn render(&mut self, chart: ChartId, params: RenderParams, figure: Option<Figure>) -> Result<()> {
        if self.state(chart) == RenderState::Rendered(params.clone()) {
            json_log(
                Domain::Render,
                "draw_skipped",
                obj(&[
                    ("chart", v_str(chart.surface_name())),
                    ("reason", v_str("unchanged_params")),
                ]),
            );
            return Ok(());
        }
        let Some(figure) = figure else {
            json_log(
                Domain::Render,
                "draw_skipped",
                obj(&[
                    ("chart", v_str(chart.surface_name())),
                    ("reason", v_str("no_data")),
                ]),
            );
            return Ok(());
        };
        let Some(surface) = self.surfaces.get_mut(&chart) else {
            return Ok(());
        };
        surface.draw(&figure)?;
        self.states.insert(chart, RenderState::Rendered(params));
        json_log(
            Domain::Render,
            "draw",
            obj(&[
                ("chart", v_str(chart.surface_name())),
                ("traces", v_int(figure.traces.len() as i64)),
            ]),
        );
        Ok(())
    }

    /// World CO2 trend over time (line).
    pub fn world_trend(&mut self) -> Result<()> {
        let figure = series_figure(
            self.agg,
            |s| s.total_co2,
            "Global CO2 Emissions Over Time (kt)",
            "Total CO2 (kt)",
            "Global emissions",
            theme::ACCENT,
        );
        self.render(ChartId::WorldTrend, RenderParams::Fixed, figure)
    }

    /// Stacked composition by emission source over time. Band order is fixed:
    /// coal, oil, gas, cement.
    pub fn source_composition(&mut self) -> Result<()> {
        let figure = if self.agg.world_by_year.is_empty() {
            None
        } else {
            let x: Vec<f64> = self.agg.world_by_year.iter().map(|s| s.year as f64).collect();
            let sources: [(&str, fn(&crate::aggregate::WorldYearSummary) -> f64); 4] = [
                ("Coal", |s| s.coal_co2),
                ("Oil", |s| s.oil_co2),
                ("Gas", |s| s.gas_co2),
                ("Cement", |s| s.cement_co2),
            ];
            let traces = sources
                .iter()
                .enumerate()
                .map(|(i, (name, value))| Trace::AreaBand {
                    name: name.to_string(),
                    x: x.clone(),
                    y: self.agg.world_by_year.iter().map(value).collect(),
                    fill_color: theme::SOURCE_COLORS[i].to_string(),
                })
                .collect();
            Some(Figure {
                traces,
                layout: Layout::new("Global CO2 Emissions by Source (kt)")
                    .x_label("Year")
                    .y_label("Total CO2 (kt)")
                    .legend(),
            })
        };
        self.render(ChartId::SourceComposition, RenderParams::Fixed, figure)
    }

    /// Per-capita CO2 by geography for the selected year. Only strictly
    /// positive values with an ISO-3 code make it onto the map.
    pub fn per_capita_map(&mut self, year: i32) -> Result<()> {
        let records = self.agg.year_records(year);
        let figure = if records.is_empty() {
            None
        } else {
            let mut locations = Vec::new();
            let mut values = Vec::new();
            let mut labels = Vec::new();
            for r in records {
                let Some(iso3) = &r.iso3 else { continue };
                if r.per_capita_co2 <= 0.0 {
                    continue;
                }
                locations.push(iso3.clone());
                values.push(r.per_capita_co2);
                labels.push(format!("{}: {:.2}t per capita", r.country, r.per_capita_co2));
            }
            Some(Figure {
                traces: vec![Trace::Choropleth {
                    locations,
                    values,
                    labels,
                    color_scale: theme::VIRIDIS.to_string(),
                }],
                layout: Layout::new(format!("Per-Capita CO2 Emissions by Country, {}", year)),
            })
        };
        self.render(ChartId::PerCapitaMap, RenderParams::Year(year), figure)
    }

    /// Top-N countries by total CO2 in the reference year (horizontal bars,
    /// descending). Rollup pseudo-entries and non-positive totals are
    /// excluded; ties keep encounter order.
    pub fn top_emitters(&mut self) -> Result<()> {
        let records = self.agg.year_records(self.reference_year);
        let figure = if records.is_empty() {
            None
        } else {
            let mut ranked: Vec<_> = records
                .iter()
                .filter(|r| !is_pseudo_entry(&r.country) && r.total_co2 > 0.0)
                .collect();
            ranked.sort_by(|a, b| {
                b.total_co2
                    .partial_cmp(&a.total_co2)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
            ranked.truncate(self.top_n);
            Some(Figure {
                traces: vec![Trace::BarH {
                    categories: ranked.iter().map(|r| r.country.clone()).collect(),
                    values: ranked.iter().map(|r| r.total_co2).collect(),
                    color: theme::ACCENT.to_string(),
                }],
                layout: Layout::new(format!(
                    "Top {} CO2-Emitting Countries, {}",
                    self.top_n, self.reference_year
                ))
                .x_label("Total CO2 (kt)"),
            })
        };
        self.render(ChartId::TopEmitters, RenderParams::Fixed, figure)
    }

    /// Per-capita CO2 vs temperature-change correlation for the reference
    /// year, optionally narrowed to one country. Marker size is proportional
    /// to total CO2.
    pub fn temp_correlation(&mut self, country: Option<&str>) -> Result<()> {
        let records = self.agg.year_records(self.reference_year);
        let selected: Vec<_> = match country {
            Some(name) => records.iter().filter(|r| r.country == name).collect(),
            None => records.iter().collect(),
        };
        let figure = if selected.is_empty() {
            None
        } else {
            Some(Figure {
                traces: vec![Trace::Scatter {
                    name: "Countries".to_string(),
                    x: selected.iter().map(|r| r.per_capita_co2).collect(),
                    y: selected.iter().map(|r| r.temp_change).collect(),
                    labels: selected
                        .iter()
                        .map(|r| {
                            format!(
                                "{}: {:.2}t per capita, {:.2} °C",
                                r.country, r.per_capita_co2, r.temp_change
                            )
                        })
                        .collect(),
                    sizes: selected.iter().map(|r| r.total_co2).collect(),
                    color_scale: theme::VIRIDIS.to_string(),
                }],
                layout: Layout::new(format!(
                    "Per-Capita CO2 vs Temperature Change, {}",
                    self.reference_year
                ))
                .x_label("Per-capita CO2 (t)")
                .y_label("Temperature change (°C)"),
            })
        };
        self.render(
            ChartId::TempCorrelation,
            RenderParams::CountryFilter(country.map(str::to_string)),
            figure,
        )
    }

    /// Emission-source breakdown for one country in the reference year
    /// (donut, four fixed categories).
    pub fn source_breakdown(&mut self, country: &str) -> Result<()> {
        let record = self
            .agg
            .country_records(country)
            .iter()
            .find(|r| r.year == self.reference_year);
        let figure = record.map(|r| Figure {
            traces: vec![Trace::Donut {
                labels: vec![
                    "Coal".to_string(),
                    "Oil".to_string(),
                    "Gas".to_string(),
                    "Cement".to_string(),
                ],
                values: vec![r.coal_co2, r.oil_co2, r.gas_co2, r.cement_co2],
                colors: theme::DONUT_COLORS.iter().map(|c| c.to_string()).collect(),
                hole: 0.4,
            }],
            layout: Layout::new(format!(
                "CO2 Emission Sources for {}, {}",
                country, self.reference_year
            ))
            .legend(),
        });
        self.render(
            ChartId::SourceBreakdown,
            RenderParams::Country(country.to_string()),
            figure,
        )
    }

    /// Renewable energy production trend over time (line).
    pub fn renewable_trend(&mut self) -> Result<()> {
        let figure = series_figure(
            self.agg,
            |s| s.renewable_energy,
            "Renewable Energy Production Over Time (kt)",
            "Renewable energy (kt)",
            "Global renewables",
            theme::RENEWABLE_GREEN,
        );
        self.render(ChartId::RenewableTrend, RenderParams::Fixed, figure)
    }
}

/// Year-series line figure over the world summaries; `None` when there are no
/// summaries at all.
fn series_figure(
    agg: &AggregationResult,
    value: impl Fn(&crate::aggregate::WorldYearSummary) -> f64,
    title: &str,
    y_label: &str,
    series_name: &str,
    color: &str,
) -> Option<Figure> {
    if agg.world_by_year.is_empty() {
        return None;
    }
    Some(Figure {
        traces: vec![Trace::Line {
            name: series_name.to_string(),
            x: agg.world_by_year.iter().map(|s| s.year as f64).collect(),
            y: agg.world_by_year.iter().map(&value).collect(),
            color: color.to_string(),
            width: 4.0,
        }],
        layout: Layout::new(title).x_label("Year").y_label(y_label),
    })
}

#[cfg(test)]
mod tests {
    use super::surface::RecordingSurface;
    use super::*;
    use crate::aggregate::{aggregate, sample_record as record};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn mounted(renderer: &mut ChartRenderer<'_>, chart: ChartId) -> Rc<RefCell<RecordingSurface>> {
        let shared = Rc::new(RefCell::new(RecordingSurface::new()));
        renderer.mount(chart, Box::new(shared.clone()));
        shared
    }

    #[test]
    fn top_emitters_excludes_rollups_and_caps_at_n() {
        let mut rows = vec![record("World", 2021, 10_000.0), record("EU-27", 2021, 5_000.0)];
        for i in 0..12 {
            rows.push(record(&format!("C{:02}", i), 2021, 100.0 + i as f64));
        }
        let agg = aggregate(rows, 2021);
        let mut renderer = ChartRenderer::new(&agg, 2021, 10);
        let surface = mounted(&mut renderer, ChartId::TopEmitters);
        renderer.top_emitters().unwrap();

        let drawn = surface.borrow();
        let Trace::BarH { categories, values, .. } = &drawn.figures[0].traces[0] else {
            panic!("expected horizontal bars");
        };
        assert_eq!(categories.len(), 10);
        assert!(!categories.iter().any(|c| c == "World" || c == "EU-27"));
        assert!(values.windows(2).all(|w| w[0] >= w[1]));
        assert_eq!(categories[0], "C11");
    }

    #[test]
    fn repeated_invocation_with_same_params_draws_once() {
        let agg = aggregate(vec![record("A", 2021, 100.0)], 2021);
        let mut renderer = ChartRenderer::new(&agg, 2021, 10);
        let surface = mounted(&mut renderer, ChartId::WorldTrend);
        renderer.world_trend().unwrap();
        renderer.world_trend().unwrap();
        renderer.world_trend().unwrap();
        assert_eq!(surface.borrow().draw_count(), 1);
    }

    #[test]
    fn parameter_change_triggers_redraw_and_same_params_do_not() {
        let rows = vec![record("A", 2020, 10.0), record("A", 2021, 20.0)];
        let agg = aggregate(rows, 2021);
        let mut renderer = ChartRenderer::new(&agg, 2021, 10);
        let surface = mounted(&mut renderer, ChartId::PerCapitaMap);
        renderer.per_capita_map(2020).unwrap();
        renderer.per_capita_map(2020).unwrap();
        renderer.per_capita_map(2021).unwrap();
        renderer.per_capita_map(2021).unwrap();
        assert_eq!(surface.borrow().draw_count(), 2);
    }

    #[test]
    fn missing_year_is_a_noop_not_an_error() {
        let agg = aggregate(vec![record("A", 2020, 10.0)], 2021);
        let mut renderer = ChartRenderer::new(&agg, 2021, 10);
        let surface = mounted(&mut renderer, ChartId::PerCapitaMap);
        renderer.per_capita_map(1900).unwrap();
        assert_eq!(surface.borrow().draw_count(), 0);
        assert_eq!(renderer.state(ChartId::PerCapitaMap), RenderState::NotRendered);
    }

    #[test]
    fn choropleth_keeps_only_positive_values_with_iso3() {
        let mut no_iso = record("NoIso", 2021, 10.0);
        no_iso.iso3 = None;
        let mut negative = record("Negative", 2021, 10.0);
        negative.per_capita_co2 = -1.0;
        let rows = vec![no_iso, negative, record("Kept", 2021, 10.0)];
        let agg = aggregate(rows, 2021);
        let mut renderer = ChartRenderer::new(&agg, 2021, 10);
        let surface = mounted(&mut renderer, ChartId::PerCapitaMap);
        renderer.per_capita_map(2021).unwrap();

        let drawn = surface.borrow();
        let Trace::Choropleth { locations, values, .. } = &drawn.figures[0].traces[0] else {
            panic!("expected choropleth");
        };
        assert_eq!(locations.len(), 1);
        assert_eq!(values.len(), 1);
        assert_eq!(locations[0], "KEP");
    }

    #[test]
    fn source_composition_band_order_is_fixed() {
        let agg = aggregate(vec![record("A", 2021, 100.0)], 2021);
        let mut renderer = ChartRenderer::new(&agg, 2021, 10);
        let surface = mounted(&mut renderer, ChartId::SourceComposition);
        renderer.source_composition().unwrap();

        let drawn = surface.borrow();
        let names: Vec<&str> = drawn.figures[0]
            .traces
            .iter()
            .map(|t| match t {
                Trace::AreaBand { name, .. } => name.as_str(),
                _ => panic!("expected area bands"),
            })
            .collect();
        assert_eq!(names, vec!["Coal", "Oil", "Gas", "Cement"]);
    }

    #[test]
    fn scatter_country_filter_narrows_points() {
        let rows = vec![record("A", 2021, 10.0), record("B", 2021, 20.0)];
        let agg = aggregate(rows, 2021);
        let mut renderer = ChartRenderer::new(&agg, 2021, 10);
        let surface = mounted(&mut renderer, ChartId::TempCorrelation);
        renderer.temp_correlation(None).unwrap();
        renderer.temp_correlation(Some("A")).unwrap();

        let figures = surface.borrow();
        let Trace::Scatter { x, .. } = &figures.figures[0].traces[0] else {
            panic!("expected scatter");
        };
        assert_eq!(x.len(), 2);
        let Trace::Scatter { x, .. } = &figures.figures[1].traces[0] else {
            panic!("expected scatter");
        };
        assert_eq!(x.len(), 1);
    }

    #[test]
    fn source_breakdown_noop_for_unknown_country() {
        let agg = aggregate(vec![record("A", 2021, 10.0)], 2021);
        let mut renderer = ChartRenderer::new(&agg, 2021, 10);
        let surface = mounted(&mut renderer, ChartId::SourceBreakdown);
        renderer.source_breakdown("Atlantis").unwrap();
        assert_eq!(surface.borrow().draw_count(), 0);

        renderer.source_breakdown("A").unwrap();
        assert_eq!(surface.borrow().draw_count(), 1);
    }
}
