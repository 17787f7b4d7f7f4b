//! Station freshness evaluation.
//!
//! A station whose common date has fallen behind the group's tolerance is
//! reported as `Old` so dashboards can grey it out. Station loggers upload
//! on fixed cadences, so a missed tolerance window usually means a logger
//! or uplink outage rather than a quiet sensor.
//!
//! # Clock injection
//! `freshness_at` accepts `now` rather than reading the wall clock, which
//! keeps the boundary cases deterministic in tests. `freshness_now` is the
//! production wrapper. The verdict is recomputed on every call: the same
//! aggregate evaluated before and after the tolerance boundary flips from
//! `Recent` to `Old` without any data being re-fetched.

use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};

use crate::model::Freshness;

/// Evaluate a station's freshness at the given instant.
///
/// `common_date` is the station's zone-naive common date; `utc_offset_minutes`
/// is the owning group's configured offset, used to anchor it to real time.
/// A station with no common date is always `Old`. Oldness exactly equal to
/// the limit is still `Recent`; the comparison is strictly greater than.
pub fn freshness_at(
    common_date: Option<NaiveDateTime>,
    utc_offset_minutes: i32,
    fresh_time_limit: Duration,
    now: DateTime<Utc>,
) -> Freshness {
    let Some(common_date) = common_date else {
        return Freshness::Old;
    };
    let instant = Utc.from_utc_datetime(&(common_date - Duration::minutes(utc_offset_minutes as i64)));
    if now - instant > fresh_time_limit {
        Freshness::Old
    } else {
        Freshness::Recent
    }
}

/// Convenience wrapper that uses the real current time.
/// Use `freshness_at` in tests to keep them deterministic.
pub fn freshness_now(
    common_date: Option<NaiveDateTime>,
    utc_offset_minutes: i32,
    fresh_time_limit: Duration,
) -> Freshness {
    freshness_at(common_date, utc_offset_minutes, fresh_time_limit, Utc::now())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
