//! HTTP time-series store.
//!
//! Talks to a remote time-series API that serves sample data as CSV, one
//! `timestamp,value,` line per sample, the format the station loggers
//! upload. Every request carries the caller-supplied timeout; a transport
//! failure or an unexpected status maps to `StoreUnavailable` and fails only
//! the station being processed.
//!
//! Endpoints:
//!   GET {base}/series/{id}/data?start=...&end=...   sample CSV for a range
//!   GET {base}/series/{id}/latest                   one sample CSV line,
//!                                                   empty body if no data

use std::time::Duration;

use chrono::{NaiveDateTime, ParseResult};

use crate::model::{Sample, SynopticError};
use crate::store::TimeseriesStore;

/// Timestamp format of the sample CSV, minute precision, zone-naive.
const SAMPLE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

pub struct HttpStore {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl HttpStore {
    /// Build a store for the API at `base_url` (no trailing slash). The
    /// timeout applies per request.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, SynopticError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SynopticError::StoreUnavailable(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn fetch(&self, url: &str) -> Result<String, SynopticError> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| SynopticError::StoreUnavailable(e.to_string()))?;
        if !response.status().is_success() {
            return Err(SynopticError::StoreUnavailable(format!(
                "HTTP {} from {}",
                response.status(),
                url
            )));
        }
        response
            .text()
            .map_err(|e| SynopticError::StoreUnavailable(e.to_string()))
    }
}

impl TimeseriesStore for HttpStore {
    fn get_range(
        &mut self,
        series_id: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<Sample>, SynopticError> {
        let url = format!(
            "{}/series/{}/data?start={}&end={}",
            self.base_url,
            series_id,
            start.format("%Y-%m-%dT%H:%M"),
            end.format("%Y-%m-%dT%H:%M"),
        );
        parse_samples_csv(&self.fetch(&url)?)
    }

    fn latest_timestamp(
        &mut self,
        series_id: &str,
    ) -> Result<Option<NaiveDateTime>, SynopticError> {
        let url = format!("{}/series/{}/latest", self.base_url, series_id);
        let body = self.fetch(&url)?;
        Ok(parse_samples_csv(&body)?.last().map(|s| s.timestamp))
    }
}

// ---------------------------------------------------------------------------
// CSV parsing
// ---------------------------------------------------------------------------

/// Parse `timestamp,value,` sample lines.
///
/// An empty value field is a recorded instant with no measurement and is
/// kept as `value: None`. Lines that don't parse at all (bad timestamp,
/// non-numeric value, too few fields) are skipped — station loggers
/// occasionally emit garbage and one bad line must not hide a day of data.
pub fn parse_samples_csv(csv: &str) -> Result<Vec<Sample>, SynopticError> {
    let mut samples = Vec::new();

    for line in csv.lines() {
        if line.trim().is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() < 2 {
            continue;
        }

        let Ok(timestamp) = parse_sample_time(fields[0].trim()) else {
            continue;
        };

        let raw_value = fields[1].trim();
        let value = if raw_value.is_empty() {
            None
        } else {
            match raw_value.parse::<f64>() {
                Ok(v) => Some(v),
                Err(_) => continue,
            }
        };

        samples.push(Sample { timestamp, value });
    }

    Ok(samples)
}

fn parse_sample_time(s: &str) -> ParseResult<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, SAMPLE_TIME_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S"))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
