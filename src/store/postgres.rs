//! Postgres time-series store.
//!
//! One `samples` table holds every series:
//!
//!   CREATE TABLE samples (
//!       series_id   TEXT NOT NULL,
//!       sample_time TIMESTAMP NOT NULL,
//!       value       DOUBLE PRECISION,
//!       PRIMARY KEY (series_id, sample_time)
//!   );
//!
//! `sample_time` is a zone-naive TIMESTAMP; `value` is nullable for recorded
//! instants with an empty measurement field. The connection string comes
//! from `DATABASE_URL` (via `.env`).

use chrono::NaiveDateTime;
use postgres::{Client, NoTls};

use crate::model::{Sample, SynopticError};
use crate::store::TimeseriesStore;

pub struct PostgresStore {
    client: Client,
}

impl PostgresStore {
    /// Connect using `DATABASE_URL` from the environment (loading `.env`
    /// first if present).
    pub fn connect_from_env() -> Result<Self, SynopticError> {
        dotenv::dotenv().ok();
        let url = std::env::var("DATABASE_URL").map_err(|_| {
            SynopticError::ConfigurationError("DATABASE_URL is not set".to_string())
        })?;
        Self::connect(&url)
    }

    pub fn connect(url: &str) -> Result<Self, SynopticError> {
        let client =
            Client::connect(url, NoTls).map_err(|e| SynopticError::StoreUnavailable(e.to_string()))?;
        Ok(Self { client })
    }
}

impl TimeseriesStore for PostgresStore {
    fn get_range(
        &mut self,
        series_id: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<Sample>, SynopticError> {
        let rows = self
            .client
            .query(
                "SELECT sample_time, value
                 FROM samples
                 WHERE series_id = $1
                   AND sample_time >= $2
                   AND sample_time <= $3
                 ORDER BY sample_time",
                &[&series_id, &start, &end],
            )
            .map_err(|e| SynopticError::StoreUnavailable(e.to_string()))?;

        Ok(rows
            .iter()
            .map(|row| Sample {
                timestamp: row.get(0),
                value: row.get(1),
            })
            .collect())
    }

    fn latest_timestamp(
        &mut self,
        series_id: &str,
    ) -> Result<Option<NaiveDateTime>, SynopticError> {
        let row = self
            .client
            .query_one(
                "SELECT MAX(sample_time) FROM samples WHERE series_id = $1",
                &[&series_id],
            )
            .map_err(|e| SynopticError::StoreUnavailable(e.to_string()))?;
        Ok(row.get(0))
    }
}
