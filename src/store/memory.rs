//! In-memory time-series store.
//!
//! Used by the test suite and for replaying captured sample data without a
//! database. Series are loaded either as ready-made sample vectors or from
//! the same `timestamp,value,` CSV lines the HTTP store consumes.

use std::collections::HashMap;

use chrono::NaiveDateTime;

use crate::model::{Sample, SynopticError};
use crate::store::{http, TimeseriesStore};

#[derive(Debug, Default)]
pub struct MemoryStore {
    series: HashMap<String, Vec<Sample>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a series, replacing any previous samples under the same id.
    /// Samples are sorted by timestamp so fixtures may list them freely.
    pub fn insert(&mut self, series_id: &str, mut samples: Vec<Sample>) {
        samples.sort_by_key(|s| s.timestamp);
        self.series.insert(series_id.to_string(), samples);
    }

    /// Insert a series from `timestamp,value,` CSV lines.
    pub fn insert_csv(&mut self, series_id: &str, csv: &str) -> Result<(), SynopticError> {
        let samples = http::parse_samples_csv(csv)?;
        self.insert(series_id, samples);
        Ok(())
    }
}

impl TimeseriesStore for MemoryStore {
    fn get_range(
        &mut self,
        series_id: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<Sample>, SynopticError> {
        Ok(self
            .series
            .get(series_id)
            .map(|samples| {
                samples
                    .iter()
                    .filter(|s| s.timestamp >= start && s.timestamp <= end)
                    .copied()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn latest_timestamp(
        &mut self,
        series_id: &str,
    ) -> Result<Option<NaiveDateTime>, SynopticError> {
        Ok(self
            .series
            .get(series_id)
            .and_then(|samples| samples.last())
            .map(|s| s.timestamp))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
