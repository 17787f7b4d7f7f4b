//! Common-date resolution.

use chrono::NaiveDateTime;

use crate::model::SynopticError;
use crate::registry::GroupStation;
use crate::store::TimeseriesStore;

/// The single reference timestamp usable across all of a station's series.
///
/// We don't compute the true last common date — that would mean
/// intersecting every series' sample set. The minimum of the per-series
/// end-of-data timestamps is used instead: exact whenever the series share
/// a sampling cadence and at most one of them lags, which is the normal
/// state of a station with one silent sensor. Series with no data at all
/// don't participate; if none has data the result is `None`.
pub fn resolve_common_date(
    store: &mut dyn TimeseriesStore,
    station: &GroupStation,
) -> Result<Option<NaiveDateTime>, SynopticError> {
    let mut result: Option<NaiveDateTime> = None;
    for series in &station.series {
        if let Some(end) = store.latest_timestamp(&series.series_id)? {
            result = match result {
                Some(current) if current <= end => Some(current),
                _ => Some(end),
            };
        }
    }
    Ok(result)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
