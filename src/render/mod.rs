//! Report rendering.
//!
//! The renderer is an external collaborator: this module assembles the
//! presentation documents from the computed aggregates and hands them to a
//! `Renderer` implementation. The shipped `JsonRenderer` serializes the
//! documents; an HTML or image renderer plugs in behind the same trait.

use std::error::Error;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::model::{Freshness, SeriesStatus};
use crate::registry::{GroupStation, ReportGroup};
use crate::synoptic::StationAggregate;

pub mod charts;
pub mod output;

pub use charts::{build_chart_specs, ChartSeries, ChartSpec, Palette};

// ---------------------------------------------------------------------------
// Documents
// ---------------------------------------------------------------------------

/// The group page: one panel per station, in binding order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupDocument {
    pub name: String,
    pub slug: String,
    pub stations: Vec<StationPanel>,
}

/// One station's current-conditions panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationPanel {
    pub name: String,
    pub order: u16,
    pub latitude: f64,
    pub longitude: f64,
    pub freshness: Freshness,
    /// Common date with the group's offset appended,
    /// e.g. `2015-10-22 15:20 (+0200)`. Absent when the station has no data.
    pub last_common_date: Option<String>,
    /// Common date without the offset, for compact map labels.
    pub last_common_date_without_offset: Option<String>,
    /// True when at least one series failed to resolve - rendered as a
    /// partial-data banner.
    pub error: bool,
    pub rows: Vec<PanelRow>,
}

/// One measurement row of a panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelRow {
    /// `Wind (speed)` for a leading series, `(gust)` for a grouped one.
    pub label: String,
    /// Formatted value with unit, or an explicit unknown indicator - a
    /// missing measurement still renders its row.
    pub value: String,
    pub status: SeriesStatus,
}

// ---------------------------------------------------------------------------
// Renderer collaborator
// ---------------------------------------------------------------------------

pub trait Renderer {
    fn render_group(&self, document: &GroupDocument) -> Result<Vec<u8>, Box<dyn Error>>;
    fn render_station(&self, panel: &StationPanel) -> Result<Vec<u8>, Box<dyn Error>>;
    fn render_chart(&self, chart: &ChartSpec) -> Result<Vec<u8>, Box<dyn Error>>;
}

/// Renders every document as pretty-printed JSON.
#[derive(Debug, Default)]
pub struct JsonRenderer;

impl Renderer for JsonRenderer {
    fn render_group(&self, document: &GroupDocument) -> Result<Vec<u8>, Box<dyn Error>> {
        Ok(serde_json::to_vec_pretty(document)?)
    }

    fn render_station(&self, panel: &StationPanel) -> Result<Vec<u8>, Box<dyn Error>> {
        Ok(serde_json::to_vec_pretty(panel)?)
    }

    fn render_chart(&self, chart: &ChartSpec) -> Result<Vec<u8>, Box<dyn Error>> {
        Ok(serde_json::to_vec_pretty(chart)?)
    }
}

// ---------------------------------------------------------------------------
// Document assembly
// ---------------------------------------------------------------------------

/// Assemble a station's panel from its aggregate.
pub fn build_station_panel(
    station: &GroupStation,
    aggregate: &StationAggregate,
    freshness: Freshness,
    utc_offset_minutes: i32,
) -> StationPanel {
    let mut rows = Vec::with_capacity(aggregate.series.len());
    for snapshot in &aggregate.series {
        let Some(binding) = station.series_by_order(snapshot.order) else {
            continue;
        };
        let label = if binding.is_primary() {
            binding.full_name()
        } else {
            format!("({})", binding.display_subtitle())
        };
        rows.push(PanelRow {
            label,
            value: format_value(snapshot.value, binding.precision, &binding.unit),
            status: snapshot.status,
        });
    }

    StationPanel {
        name: station.name.clone(),
        order: station.order,
        latitude: station.latitude,
        longitude: station.longitude,
        freshness,
        last_common_date: aggregate
            .common_date
            .map(|d| format_date_with_offset(d, utc_offset_minutes)),
        last_common_date_without_offset: aggregate
            .common_date
            .map(|d| d.format("%Y-%m-%d %H:%M").to_string()),
        error: aggregate.error,
        rows,
    }
}

/// Assemble the group page from the panels of its stations, already in
/// binding order.
pub fn build_group_document(group: &ReportGroup, stations: Vec<StationPanel>) -> GroupDocument {
    GroupDocument {
        name: group.name.clone(),
        slug: group.slug.clone(),
        stations,
    }
}

fn format_value(value: Option<f64>, precision: u8, unit: &str) -> String {
    match value {
        Some(v) => format!("{:.*} {}", precision as usize, v, unit),
        None => "n/a".to_string(),
    }
}

fn format_date_with_offset(date: NaiveDateTime, utc_offset_minutes: i32) -> String {
    let sign = if utc_offset_minutes < 0 { '-' } else { '+' };
    let abs = utc_offset_minutes.unsigned_abs();
    format!(
        "{} ({}{:02}{:02})",
        date.format("%Y-%m-%d %H:%M"),
        sign,
        abs / 60,
        abs % 60
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
