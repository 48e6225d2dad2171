use std::path::Path;

use anyhow::{Context, Result};

use carbonscope::aggregate::aggregate;
use carbonscope::charts::{surface::JsonDirSurface, ChartId, ChartRenderer};
use carbonscope::config::Config;
use carbonscope::indicators;
use carbonscope::loader;
use carbonscope::logging::{json_log, log, obj, v_int, v_str, Domain, Level};
use carbonscope::scroll::{ScrollController, SectionId};

fn main() -> Result<()> {
    let cfg = Config::from_env();
    json_log(
        Domain::System,
        "startup",
        obj(&[
            ("data_path", v_str(&cfg.data_path)),
            ("out_dir", v_str(&cfg.out_dir)),
            ("reference_year", v_int(cfg.reference_year as i64)),
            ("baseline_year", v_int(cfg.baseline_year as i64)),
        ]),
    );

    // A failed load is terminal: nothing downstream can run without data.
    let report = loader::load_report(Path::new(&cfg.data_path)).map_err(|err| {
        log(
            Level::Fatal,
            Domain::System,
            "load_failed",
            obj(&[
                ("error", v_str(&err.to_string())),
                (
                    "hint",
                    v_str("verify that the data file exists at the configured DATA_PATH"),
                ),
            ]),
        );
        err
    })?;
    if report.records.is_empty() {
        log(
            Level::Warn,
            Domain::Data,
            "empty_dataset",
            obj(&[("rows_seen", v_int(report.stats.rows_seen as i64))]),
        );
    }

    // Built once, read-only afterward; everything below borrows it.
    let agg = aggregate(report.records, cfg.reference_year);

    let kpis = indicators::compute(&agg, cfg.reference_year, cfg.baseline_year);
    let mut fields = serde_json::Map::new();
    for (name, value) in kpis.display_rows() {
        fields.insert(name.to_string(), serde_json::Value::String(value));
    }
    json_log(Domain::Kpi, "headline", fields);

    let mut renderer = ChartRenderer::new(&agg, cfg.reference_year, cfg.top_n);
    for chart in ChartId::ALL {
        renderer.mount(
            chart,
            Box::new(JsonDirSurface::new(&cfg.out_dir, chart.surface_name())),
        );
    }
    let mut controller = ScrollController::new(&agg, renderer, cfg.reveal_threshold);

    // Headless pass over the story: every section reported fully visible once,
    // then each control exercised at its default value. Renderer-side dedup
    // makes the control events cheap when nothing changed.
    for section in SectionId::ALL {
        controller
            .on_intersection(section, 1.0)
            .with_context(|| format!("rendering section {}", section.as_str()))?;
    }
    let default_year = controller.year_control().current;
    controller.on_year_change(default_year)?;
    let default_country = controller.country_control().selected.clone();
    controller.on_country_change(&default_country)?;

    json_log(
        Domain::System,
        "done",
        obj(&[
            ("out_dir", v_str(&cfg.out_dir)),
            ("sections", v_int(SectionId::ALL.len() as i64)),
        ]),
    );
    Ok(())
}
