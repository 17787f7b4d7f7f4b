//! Ordering/grouping integrity checks for station configuration.
//!
//! The checks here are a standalone, separately-invocable validator:
//! `registry::load` runs them once per station after parsing, and an
//! integrator that edits configuration through some other channel can call
//! them again at any time. They are read-only and never auto-correct.

use crate::model::SynopticError;
use crate::registry::GroupStation;

/// Check a station's series ordering and grouping invariants.
///
/// Expects `station.series` sorted by `order` (as `registry::parse` leaves
/// it). Verified invariants:
///
/// * series orders start at 1 and are contiguous;
/// * no underlying series is bound twice;
/// * a `group_with` target exists, is itself primary, and all series
///   sharing the target immediately follow it as one contiguous block.
pub fn check_station_integrity(station: &GroupStation) -> Result<(), SynopticError> {
    check_order_contiguity(station)?;
    check_unique_series(station)?;
    check_grouping_adjacency(station)?;
    Ok(())
}

fn check_order_contiguity(station: &GroupStation) -> Result<(), SynopticError> {
    let mut expected = 0;
    for series in &station.series {
        expected += 1;
        if series.order != expected {
            return Err(SynopticError::IntegrityViolation(format!(
                "station '{}': the order of the time series must start from 1 \
                 and be continuous (found order {} where {} was expected)",
                station.name, series.order, expected
            )));
        }
    }
    Ok(())
}

fn check_unique_series(station: &GroupStation) -> Result<(), SynopticError> {
    let mut seen = std::collections::HashSet::new();
    for series in &station.series {
        if !seen.insert(series.series_id.as_str()) {
            return Err(SynopticError::IntegrityViolation(format!(
                "station '{}': series '{}' is bound more than once",
                station.name, series.series_id
            )));
        }
    }
    Ok(())
}

fn check_grouping_adjacency(station: &GroupStation) -> Result<(), SynopticError> {
    for (i, series) in station.series.iter().enumerate() {
        let Some(target) = series.group_with else {
            continue;
        };

        let leader = station.series_by_order(target).ok_or_else(|| {
            SynopticError::IntegrityViolation(format!(
                "station '{}': series order {} is grouped with order {}, \
                 which does not exist",
                station.name, series.order, target
            ))
        })?;
        if !leader.is_primary() {
            return Err(SynopticError::IntegrityViolation(format!(
                "station '{}': series order {} is grouped with order {}, \
                 which is itself grouped",
                station.name, series.order, target
            )));
        }

        // A grouped series is directly preceded either by its leader or by
        // another member of the same group.
        let adjacent = i > 0 && {
            let prev = &station.series[i - 1];
            prev.order == target || prev.group_with == Some(target)
        };
        if !adjacent {
            return Err(SynopticError::IntegrityViolation(format!(
                "station '{}': grouped time series must be ordered together \
                 (order {} is not adjacent to its group led by order {})",
                station.name, series.order, target
            )));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
