//! The per-run early-warning queue.
//!
//! While a group's stations are being aggregated, every out-of-range
//! classification records an event here. After the last station the queue
//! is flushed as one notification to the group's recipients. The queue is
//! scoped to a single run and discarded afterward; concurrent runs must
//! each own their instance.

use std::collections::BTreeMap;
use std::error::Error;

use crate::logging::{self, Subsystem};
use crate::registry::ReportGroup;

// ---------------------------------------------------------------------------
// Notifier collaborator
// ---------------------------------------------------------------------------

/// Delivery of a flushed warning notification. Email delivery lives outside
/// this crate; deployments plug their transport in here.
pub trait Notifier {
    fn send(
        &mut self,
        subject: &str,
        body: &str,
        recipients: &[String],
    ) -> Result<(), Box<dyn Error>>;
}

/// Notifier that writes the notification to the log. The default when no
/// delivery transport is configured.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn send(
        &mut self,
        subject: &str,
        body: &str,
        recipients: &[String],
    ) -> Result<(), Box<dyn Error>> {
        logging::info(
            Subsystem::Alert,
            None,
            &format!("to {}: {} / {}", recipients.join(", "), subject, body.trim_end()),
        );
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Which limit a value crossed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitKind {
    Low,
    High,
}

impl std::fmt::Display for LimitKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LimitKind::Low => write!(f, "low"),
            LimitKind::High => write!(f, "high"),
        }
    }
}

/// One out-of-range classification, as recorded during aggregation.
#[derive(Debug, Clone, PartialEq)]
pub struct WarningEvent {
    /// Station display name.
    pub station: String,
    /// Series display title.
    pub variable: String,
    /// The station's common date, minute precision, zone-naive.
    pub timestamp: String,
    pub value: f64,
    pub kind: LimitKind,
    /// Both configured limits travel with the event; the body line prints
    /// the violated one.
    pub low_limit: Option<f64>,
    pub high_limit: Option<f64>,
}

impl WarningEvent {
    fn violated_limit(&self) -> Option<f64> {
        match self.kind {
            LimitKind::Low => self.low_limit,
            LimitKind::High => self.high_limit,
        }
    }

    /// One notification body line:
    /// `Komboti 2015-10-22T15:20 Wind gust 4.1 (high limit 4)`.
    fn line(&self) -> String {
        let limit = self
            .violated_limit()
            .map(|l| l.to_string())
            .unwrap_or_else(|| "?".to_string());
        format!(
            "{} {} {} {} ({} limit {})",
            self.station, self.timestamp, self.variable, self.value, self.kind, limit
        )
    }
}

// ---------------------------------------------------------------------------
// Queue
// ---------------------------------------------------------------------------

/// Collected warning events for one group, keyed by series display title.
/// A later event for the same title overwrites the earlier one, so only the
/// most recent in-run violation per variable is reported.
#[derive(Debug, Default)]
pub struct WarningQueue {
    events: BTreeMap<String, WarningEvent>,
}

impl WarningQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, event: WarningEvent) {
        self.events.insert(event.variable.clone(), event);
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Build and send the group's notification, then clear the queue.
    /// An empty queue sends nothing.
    pub fn flush(
        &mut self,
        group: &ReportGroup,
        notifier: &mut dyn Notifier,
    ) -> Result<(), Box<dyn Error>> {
        if self.events.is_empty() {
            return Ok(());
        }

        let mut stations: Vec<&str> = Vec::new();
        for event in self.events.values() {
            if !stations.contains(&event.station.as_str()) {
                stations.push(&event.station);
            }
        }
        let subject = format!("Early warning ({})", stations.join(", "));

        let mut body = String::new();
        for event in self.events.values() {
            body.push_str(&event.line());
            body.push('\n');
        }

        let result = notifier.send(&subject, &body, &group.warning_recipients);
        self.events.clear();
        result
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
