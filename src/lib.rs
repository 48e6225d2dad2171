//! carbonscope: a headless CO2 scrollytelling dashboard.
//!
//! Pipeline: load a per-country CO2/energy CSV, aggregate it once into an
//! immutable result, derive headline indicators, and render seven charts as
//! figure payloads on named surfaces. A scroll controller stands in for the
//! browser, latching story sections visible and re-invoking idempotent
//! renderers on intersection and control events.

pub mod aggregate;
pub mod charts;
pub mod config;
pub mod indicators;
pub mod loader;
pub mod logging;
pub mod scroll;
