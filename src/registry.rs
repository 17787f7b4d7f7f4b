/// Configuration registry for the synoptic monitoring service.
///
/// Defines the reporting groups, the stations bound into each group, and the
/// time series bound into each station, along with their display metadata and
/// warning limits. The registry is the single source of truth for what a run
/// processes — all other modules receive these structs rather than reading
/// configuration themselves.
///
/// The registry is loaded from a TOML file once at run start and is immutable
/// for the duration of the run. Station ordering invariants are checked at
/// load time by `integrity::check_station_integrity`.

use std::fs;
use std::path::Path;

use chrono::Duration;
use serde::Deserialize;

use crate::integrity;
use crate::model::SynopticError;

// ---------------------------------------------------------------------------
// Registry structs
// ---------------------------------------------------------------------------

/// Top-level structure of the registry file.
#[derive(Debug, Clone, Deserialize)]
pub struct Registry {
    #[serde(default, rename = "group")]
    pub groups: Vec<ReportGroup>,
}

/// A named reporting configuration: one dashboard page, one warning
/// recipient list, one freshness tolerance.
#[derive(Debug, Clone, Deserialize)]
pub struct ReportGroup {
    /// Display name of the group.
    pub name: String,
    /// Identifier used in output paths. Unique across the registry.
    pub slug: String,
    /// Time zone the group's timestamps are reported in. Stored samples are
    /// zone-naive; this offset anchors them to real time.
    pub time_zone: Option<TimeZoneSpec>,
    /// A station whose common date is older than this many minutes is
    /// reported as stale.
    pub fresh_time_limit_minutes: Option<i64>,
    /// Addresses that receive early-warning notifications. May be empty.
    #[serde(default)]
    pub warning_recipients: Vec<String>,
    #[serde(default, rename = "station")]
    pub stations: Vec<GroupStation>,
}

/// A time zone as deployments configure it: a display code and a fixed
/// offset from UTC in minutes.
#[derive(Debug, Clone, Deserialize)]
pub struct TimeZoneSpec {
    pub code: String,
    pub utc_offset_minutes: i32,
}

/// One monitored station bound into a group.
#[derive(Debug, Clone, Deserialize)]
pub struct GroupStation {
    /// Station display name.
    pub name: String,
    /// WGS84 coordinates, carried for map rendering.
    pub latitude: f64,
    pub longitude: f64,
    /// Rendering sequence within the group. Unique within the group.
    pub order: u16,
    #[serde(default, rename = "series")]
    pub series: Vec<GroupSeries>,
}

/// One time series bound into a station.
#[derive(Debug, Clone, Deserialize)]
pub struct GroupSeries {
    /// Key of the underlying series in the time-series store.
    pub series_id: String,
    /// Name of the underlying series, used when no title override is set.
    pub name: String,
    /// Unit symbol appended to rendered values.
    pub unit: String,
    /// Decimal places for rendered values.
    #[serde(default)]
    pub precision: u8,
    /// Rendering sequence within the station. Starts at 1, contiguous.
    pub order: u16,
    /// Chart/report title override. Empty means use the series name.
    #[serde(default)]
    pub title: String,
    /// Legend/report subtitle, shown in brackets when series are grouped.
    #[serde(default)]
    pub subtitle: String,
    /// A value below this limit triggers an early warning.
    #[serde(default)]
    pub low_limit: Option<f64>,
    /// A value above this limit triggers an early warning.
    #[serde(default)]
    pub high_limit: Option<f64>,
    /// Y-axis clamp hints for the chart. The chart still expands beyond
    /// these when the data requires it.
    #[serde(default)]
    pub default_chart_min: Option<f64>,
    #[serde(default)]
    pub default_chart_max: Option<f64>,
    /// `order` of the leading series this one is charted and reported with.
    /// Grouped series must immediately follow their leader.
    #[serde(default)]
    pub group_with: Option<u16>,
}

// ---------------------------------------------------------------------------
// Display helpers
// ---------------------------------------------------------------------------

impl GroupSeries {
    /// The chart title and report label: the configured override, or the
    /// series name when no override is set.
    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            &self.name
        } else {
            &self.title
        }
    }

    /// The legend label of a grouped series.
    pub fn display_subtitle(&self) -> &str {
        if self.subtitle.is_empty() {
            &self.name
        } else {
            &self.subtitle
        }
    }

    /// Title plus bracketed subtitle, e.g. `Wind (speed)`.
    pub fn full_name(&self) -> String {
        if self.subtitle.is_empty() {
            self.display_title().to_string()
        } else {
            format!("{} ({})", self.display_title(), self.subtitle)
        }
    }

    /// A primary series leads its own chart; a non-primary one is charted
    /// with the leader named by `group_with`.
    pub fn is_primary(&self) -> bool {
        self.group_with.is_none()
    }
}

impl GroupStation {
    /// Series that lead a chart, in display order.
    pub fn primary_series(&self) -> impl Iterator<Item = &GroupSeries> {
        self.series.iter().filter(|s| s.is_primary())
    }

    /// Series grouped under the leader with the given order, in display
    /// order.
    pub fn grouped_with(&self, leader_order: u16) -> impl Iterator<Item = &GroupSeries> {
        self.series
            .iter()
            .filter(move |s| s.group_with == Some(leader_order))
    }

    pub fn series_by_order(&self, order: u16) -> Option<&GroupSeries> {
        self.series.iter().find(|s| s.order == order)
    }
}

impl ReportGroup {
    /// The group's UTC offset in minutes.
    pub fn utc_offset_minutes(&self) -> Result<i32, SynopticError> {
        self.time_zone
            .as_ref()
            .map(|tz| tz.utc_offset_minutes)
            .ok_or_else(|| {
                SynopticError::ConfigurationError(format!(
                    "group '{}' has no time zone",
                    self.slug
                ))
            })
    }

    /// The group's freshness tolerance.
    pub fn fresh_time_limit(&self) -> Result<Duration, SynopticError> {
        self.fresh_time_limit_minutes
            .map(Duration::minutes)
            .ok_or_else(|| {
                SynopticError::ConfigurationError(format!(
                    "group '{}' has no fresh time limit",
                    self.slug
                ))
            })
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Load and validate the registry from a TOML file.
///
/// Stations and series are sorted by their configured order; every station's
/// ordering/grouping invariants are checked. Group-level completeness (time
/// zone, fresh time limit) is deliberately NOT checked here — an incomplete
/// group fails its own run without blocking the others.
pub fn load(path: &Path) -> Result<Registry, SynopticError> {
    let text = fs::read_to_string(path).map_err(|e| {
        SynopticError::ConfigurationError(format!("cannot read {}: {}", path.display(), e))
    })?;
    parse(&text)
}

/// Parse registry TOML. Split out of `load` so tests can feed literals.
pub fn parse(text: &str) -> Result<Registry, SynopticError> {
    let mut registry: Registry = toml::from_str(text)
        .map_err(|e| SynopticError::ConfigurationError(format!("bad registry file: {}", e)))?;

    for group in &mut registry.groups {
        group.stations.sort_by_key(|s| s.order);
        let mut orders = std::collections::HashSet::new();
        for station in &mut group.stations {
            if !orders.insert(station.order) {
                return Err(SynopticError::IntegrityViolation(format!(
                    "group '{}': station order {} is used more than once",
                    group.slug, station.order
                )));
            }
            station.series.sort_by_key(|s| s.order);
            integrity::check_station_integrity(station)?;
        }
    }

    let mut slugs = std::collections::HashSet::new();
    for group in &registry.groups {
        if !slugs.insert(group.slug.as_str()) {
            return Err(SynopticError::IntegrityViolation(format!(
                "duplicate group slug '{}'",
                group.slug
            )));
        }
    }

    Ok(registry)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
