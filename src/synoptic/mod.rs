//! The freshness/aggregation engine.
//!
//! For a station whose series update independently, this module determines
//! the single "as-of" timestamp (the common date), extracts each series'
//! value at that timestamp, classifies it against the configured limits,
//! and assembles the ordered list of display items the renderer consumes.
//!
//! The results are run-scoped value objects. Nothing here is cached on the
//! configuration structs; a new run recomputes everything from the store.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::model::{Sample, SeriesStatus};

pub mod aggregator;
pub mod common_date;

pub use aggregator::{aggregate_station, resolve_at};
pub use common_date::resolve_common_date;

/// Length of the retrieved sample window, in minutes. The window plus the
/// instant sample at the common date span exactly 24 hours without counting
/// the boundary minute twice.
pub const WINDOW_MINUTES: i64 = 1439;

/// One series of a station, as of the station's common date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesSnapshot {
    /// Key of the underlying series in the time-series store.
    pub series_id: String,
    /// Display order within the station.
    pub order: u16,
    /// The last 24 hours of samples ending at the common date.
    pub window: Vec<Sample>,
    /// The value at exactly the common date. `None` when the sample was
    /// missing or carried no measurement; the series then renders with an
    /// explicit unknown indicator instead of disappearing.
    pub value: Option<f64>,
    pub status: SeriesStatus,
}

/// Everything computed for one station in one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationAggregate {
    /// Display order of the station within its group.
    pub station_order: u16,
    /// The single reference timestamp for this station, or `None` when no
    /// bound series has any data.
    pub common_date: Option<NaiveDateTime>,
    /// Snapshots in series display order.
    pub series: Vec<SeriesSnapshot>,
    /// True when at least one series failed to resolve a value. Purely
    /// informational for rendering (partial-data banner); never a run
    /// failure.
    pub error: bool,
}
