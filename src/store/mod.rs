//! Time-series store adapters.
//!
//! The store is an external collaborator: the engine only ever asks for a
//! range of samples or the end-of-data timestamp of one series. Three
//! adapters are provided — an in-memory store for tests and captured-data
//! replay, a Postgres store, and an HTTP store for deployments where the
//! samples live behind a remote time-series API.

use chrono::NaiveDateTime;

use crate::model::{Sample, SynopticError};

pub mod http;
pub mod memory;
pub mod postgres;

pub use http::HttpStore;
pub use memory::MemoryStore;
pub use postgres::PostgresStore;

/// Access to the samples of the underlying time series.
///
/// A series unknown to the store is indistinguishable from one with no data:
/// `get_range` returns an empty vector and `latest_timestamp` returns
/// `None`. Transport failures surface as `SynopticError::StoreUnavailable`
/// and fail only the station being processed.
pub trait TimeseriesStore {
    /// Samples of `series_id` with `start <= timestamp <= end`, ascending.
    fn get_range(
        &mut self,
        series_id: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<Sample>, SynopticError>;

    /// The timestamp of the last sample of `series_id`, or `None` when the
    /// series has no data.
    fn latest_timestamp(
        &mut self,
        series_id: &str,
    ) -> Result<Option<NaiveDateTime>, SynopticError>;
}
