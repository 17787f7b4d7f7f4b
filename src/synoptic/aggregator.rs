//! Per-station aggregation.

use chrono::{Duration, NaiveDateTime};

use crate::alert::{classify, LimitKind, WarningEvent, WarningQueue};
use crate::model::{Sample, SeriesStatus, SynopticError};
use crate::registry::GroupStation;
use crate::store::TimeseriesStore;
use crate::synoptic::{common_date::resolve_common_date, SeriesSnapshot, StationAggregate, WINDOW_MINUTES};

/// The sample at exactly `at`. No interpolation, no nearest match; a missing
/// sample is a per-series miss the caller turns into an error status.
pub fn resolve_at(
    samples: &[Sample],
    series_id: &str,
    at: NaiveDateTime,
) -> Result<Sample, SynopticError> {
    samples
        .iter()
        .find(|s| s.timestamp == at)
        .copied()
        .ok_or_else(|| SynopticError::SeriesLookupMiss {
            series_id: series_id.to_string(),
            timestamp: at,
        })
}

/// Compute one station's aggregate for this run.
///
/// Resolves the common date, then walks the series in display order:
/// fetches the 24-hour window ending at the common date, resolves the value
/// at exactly that instant, classifies it, and records an early-warning
/// event for out-of-range values. A station with no data at all yields an
/// empty aggregate — that is not an error condition. A store failure aborts
/// this station only; the caller keeps processing the rest of the group.
pub fn aggregate_station(
    store: &mut dyn TimeseriesStore,
    station: &GroupStation,
    warnings: &mut WarningQueue,
) -> Result<StationAggregate, SynopticError> {
    let Some(common_date) = resolve_common_date(store, station)? else {
        return Ok(StationAggregate {
            station_order: station.order,
            common_date: None,
            series: Vec::new(),
            error: false,
        });
    };

    let start_date = common_date - Duration::minutes(WINDOW_MINUTES);
    let mut series = Vec::with_capacity(station.series.len());
    let mut error = false;

    for binding in &station.series {
        let window = store.get_range(&binding.series_id, start_date, common_date)?;

        // Stored samples are zone-naive and so is the common date, so the
        // lookup needs no offset juggling.
        let value = match resolve_at(&window, &binding.series_id, common_date) {
            Ok(sample) => sample.value,
            Err(SynopticError::SeriesLookupMiss { .. }) => None,
            Err(other) => return Err(other),
        };
        if value.is_none() {
            error = true;
        }

        let status = classify(value, binding.low_limit, binding.high_limit);
        if let Some(kind) = violated_kind(status) {
            // classify() only reports Low/High for present values.
            if let Some(value) = value {
                warnings.record(WarningEvent {
                    station: station.name.clone(),
                    variable: binding.display_title().to_string(),
                    timestamp: common_date.format("%Y-%m-%dT%H:%M").to_string(),
                    value,
                    kind,
                    low_limit: binding.low_limit,
                    high_limit: binding.high_limit,
                });
            }
        }

        series.push(SeriesSnapshot {
            series_id: binding.series_id.clone(),
            order: binding.order,
            window,
            value,
            status,
        });
    }

    Ok(StationAggregate {
        station_order: station.order,
        common_date: Some(common_date),
        series,
        error,
    })
}

fn violated_kind(status: SeriesStatus) -> Option<LimitKind> {
    match status {
        SeriesStatus::Low => Some(LimitKind::Low),
        SeriesStatus::High => Some(LimitKind::High),
        SeriesStatus::Ok | SeriesStatus::Error => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
