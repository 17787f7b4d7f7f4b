//! Chart assembly.
//!
//! One chart per primary series; series grouped with a leader share its
//! chart. The chart spec carries everything an image renderer needs: the
//! windows of sample data, y-axis clamp hints, and a palette color per
//! series.

use serde::Serialize;

use crate::model::Sample;
use crate::registry::{GroupSeries, GroupStation};
use crate::synoptic::StationAggregate;

// ---------------------------------------------------------------------------
// Palette
// ---------------------------------------------------------------------------

/// The color cycle for multi-series charts. The palette is configuration:
/// deployments that need more contrast or a house style swap the entries,
/// and the cycle wraps for charts with more series than colors.
#[derive(Debug, Clone)]
pub struct Palette {
    colors: Vec<String>,
}

impl Palette {
    pub fn new(colors: Vec<String>) -> Self {
        Self { colors }
    }

    /// Color for the series at `index`, cycling through the palette.
    pub fn color_for(&self, index: usize) -> &str {
        &self.colors[index % self.colors.len()]
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::new(
            ["red", "green", "blue", "magenta", "gold", "aqua", "grey"]
                .iter()
                .map(|c| c.to_string())
                .collect(),
        )
    }
}

// ---------------------------------------------------------------------------
// Chart specs
// ---------------------------------------------------------------------------

/// Everything needed to draw one chart image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    /// Order of the leading series; keys the chart's output path.
    pub leader_order: u16,
    pub title: String,
    pub unit: String,
    /// Y-axis clamp hints from the leading series. The axis still expands
    /// beyond them when the data requires it.
    pub y_min: Option<f64>,
    pub y_max: Option<f64>,
    /// Grouped members first, the leading series last.
    pub series: Vec<ChartSeries>,
}

/// One line of a chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub label: String,
    pub color: String,
    pub points: Vec<Sample>,
}

/// Build the chart specs for one station, one per primary series, in
/// display order. A station with no common date has no charts.
pub fn build_chart_specs(
    station: &GroupStation,
    aggregate: &StationAggregate,
    palette: &Palette,
) -> Vec<ChartSpec> {
    if aggregate.common_date.is_none() {
        return Vec::new();
    }

    station
        .primary_series()
        .map(|leader| {
            // Grouped members precede their leader in the chart, matching
            // the report layout where the leader's row closes the block.
            let mut members: Vec<&GroupSeries> = station.grouped_with(leader.order).collect();
            members.push(leader);
            let grouped = members.len() > 1;

            let series = members
                .iter()
                .enumerate()
                .map(|(i, member)| ChartSeries {
                    label: if grouped {
                        member.display_subtitle().to_string()
                    } else {
                        member.display_title().to_string()
                    },
                    color: palette.color_for(i).to_string(),
                    points: aggregate
                        .series
                        .iter()
                        .find(|s| s.order == member.order)
                        .map(|s| s.window.clone())
                        .unwrap_or_default(),
                })
                .collect();

            ChartSpec {
                leader_order: leader.order,
                title: leader.display_title().to_string(),
                unit: leader.unit.clone(),
                y_min: leader.default_chart_min,
                y_max: leader.default_chart_max,
                series,
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
