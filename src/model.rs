/// Core data types for the synoptic monitoring service.
///
/// This module defines the shared domain model imported by all other modules.
/// It contains no logic, no I/O, and no external dependencies — only types.

use chrono::NaiveDateTime;
use serde::Serialize;

// ---------------------------------------------------------------------------
// Sample types
// ---------------------------------------------------------------------------

/// A single recorded measurement from one time series.
///
/// Stored samples are zone-naive: the time-series store keeps local wall
/// clock timestamps and the owning group's configured offset is applied only
/// when a comparison against real time is needed.
///
/// `value` is `None` when the logger recorded the instant but the
/// measurement field was empty (a common failure mode for wind sensors).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sample {
    pub timestamp: NaiveDateTime,
    pub value: Option<f64>,
}

// ---------------------------------------------------------------------------
// Status types
// ---------------------------------------------------------------------------

/// Classification of a resolved value against the configured limits.
///
/// Serialized in lowercase because rendered documents use these tags
/// directly as CSS classes on the value cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesStatus {
    Ok,
    Low,
    High,
    Error,
}

impl std::fmt::Display for SeriesStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SeriesStatus::Ok => write!(f, "ok"),
            SeriesStatus::Low => write!(f, "low"),
            SeriesStatus::High => write!(f, "high"),
            SeriesStatus::Error => write!(f, "error"),
        }
    }
}

/// Whether a station's common date is within the group's tolerance of "now".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Freshness {
    Recent,
    Old,
}

impl std::fmt::Display for Freshness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Freshness::Recent => write!(f, "recent"),
            Freshness::Old => write!(f, "old"),
        }
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can arise when loading configuration or computing aggregates.
#[derive(Debug, PartialEq)]
pub enum SynopticError {
    /// No sample exists at the requested exact timestamp. Recovered locally
    /// as `SeriesStatus::Error` for that one series; never aborts a station.
    SeriesLookupMiss {
        series_id: String,
        timestamp: NaiveDateTime,
    },
    /// Transient failure reaching the time-series store. Fails the affected
    /// station only; the scheduler retries on the next run.
    StoreUnavailable(String),
    /// Ordering/grouping invariants violated in the configuration.
    IntegrityViolation(String),
    /// Incomplete group configuration (missing time zone, missing fresh
    /// time limit). Fatal for that group's run, not for other groups.
    ConfigurationError(String),
}

impl std::fmt::Display for SynopticError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SynopticError::SeriesLookupMiss {
                series_id,
                timestamp,
            } => {
                write!(f, "No sample for series {} at {}", series_id, timestamp)
            }
            SynopticError::StoreUnavailable(msg) => {
                write!(f, "Time-series store unavailable: {}", msg)
            }
            SynopticError::IntegrityViolation(msg) => {
                write!(f, "Integrity violation: {}", msg)
            }
            SynopticError::ConfigurationError(msg) => {
                write!(f, "Configuration error: {}", msg)
            }
        }
    }
}

impl std::error::Error for SynopticError {}
