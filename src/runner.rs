//! Run orchestration.
//!
//! A run walks every configured group, aggregates each of its stations,
//! publishes the rendered documents, and flushes the group's early-warning
//! queue. Stations are isolated from each other: a store failure fails one
//! station and the rest of the group still renders. Groups are isolated the
//! same way, so a misconfigured group cannot take down the others.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::alert::{freshness_at, Notifier, WarningQueue};
use crate::logging::{self, Subsystem};
use crate::registry::{Registry, ReportGroup};
use crate::render::{
    build_chart_specs, build_group_document, build_station_panel, output, Palette, Renderer,
};
use crate::store::TimeseriesStore;
use crate::synoptic::aggregate_station;
use crate::model::SynopticError;

/// What happened to one group during a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupRunSummary {
    pub slug: String,
    pub stations_total: usize,
    pub stations_rendered: usize,
    pub stations_failed: usize,
    /// Distinct variables that had a violation flushed to the notifier.
    pub warnings_flushed: usize,
}

/// What happened across all groups.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub groups: Vec<GroupRunSummary>,
    pub groups_failed: usize,
}

/// Process one group: aggregate, render, publish, flush warnings.
///
/// Returns `ConfigurationError` when the group is missing its time zone or
/// fresh time limit; everything else is handled inside with per-station
/// isolation.
pub fn run_group(
    group: &ReportGroup,
    store: &mut dyn TimeseriesStore,
    renderer: &dyn Renderer,
    notifier: &mut dyn Notifier,
    output_root: &Path,
    palette: &Palette,
    now: DateTime<Utc>,
) -> Result<GroupRunSummary, SynopticError> {
    let utc_offset = group.utc_offset_minutes()?;
    let fresh_time_limit = group.fresh_time_limit()?;

    let mut warnings = WarningQueue::new();
    let mut panels = Vec::with_capacity(group.stations.len());
    let mut failed = 0;

    for station in &group.stations {
        let aggregate = match aggregate_station(store, station, &mut warnings) {
            Ok(aggregate) => aggregate,
            Err(e) => {
                logging::log_station_failure(&station.name, "aggregation", &e);
                failed += 1;
                continue;
            }
        };

        for chart in build_chart_specs(station, &aggregate, palette) {
            let path = output::chart_path(&group.slug, station.order, chart.leader_order);
            publish(renderer.render_chart(&chart), output_root, &path, &station.name);
        }

        let freshness = freshness_at(aggregate.common_date, utc_offset, fresh_time_limit, now);
        let panel = build_station_panel(station, &aggregate, freshness, utc_offset);
        let path = output::station_path(&group.slug, station.order);
        publish(renderer.render_station(&panel), output_root, &path, &station.name);
        panels.push(panel);
    }

    let rendered = panels.len();
    let document = build_group_document(group, panels);
    let path = output::group_path(&group.slug);
    publish(renderer.render_group(&document), output_root, &path, &group.slug);

    let warnings_flushed = warnings.len();
    if let Err(e) = warnings.flush(group, notifier) {
        logging::error(
            Subsystem::Alert,
            None,
            &format!("early-warning delivery for '{}' failed: {}", group.slug, e),
        );
    }

    logging::log_run_summary(&group.slug, group.stations.len(), rendered, failed);

    Ok(GroupRunSummary {
        slug: group.slug.clone(),
        stations_total: group.stations.len(),
        stations_rendered: rendered,
        stations_failed: failed,
        warnings_flushed,
    })
}

/// Process every group in the registry, isolating failures per group.
pub fn run_all(
    registry: &Registry,
    store: &mut dyn TimeseriesStore,
    renderer: &dyn Renderer,
    notifier: &mut dyn Notifier,
    output_root: &Path,
    palette: &Palette,
    now: DateTime<Utc>,
) -> RunSummary {
    let mut groups = Vec::with_capacity(registry.groups.len());
    let mut groups_failed = 0;

    for group in &registry.groups {
        match run_group(group, store, renderer, notifier, output_root, palette, now) {
            Ok(summary) => groups.push(summary),
            Err(e) => {
                logging::error(
                    Subsystem::Config,
                    None,
                    &format!("skipping group '{}': {}", group.slug, e),
                );
                groups_failed += 1;
            }
        }
    }

    RunSummary { groups, groups_failed }
}

/// Write one rendered document, logging instead of failing the run: a
/// render or disk problem loses one artifact, not the whole group.
fn publish(
    rendered: Result<Vec<u8>, Box<dyn std::error::Error>>,
    output_root: &Path,
    relative: &str,
    context: &str,
) {
    let content = match rendered {
        Ok(content) => content,
        Err(e) => {
            logging::error(
                Subsystem::Render,
                Some(context),
                &format!("rendering {} failed: {}", relative, e),
            );
            return;
        }
    };
    if let Err(e) = output::write_output(output_root, relative, &content) {
        logging::error(
            Subsystem::Render,
            Some(context),
            &format!("writing {} failed: {}", relative, e),
        );
    }
}
