//! Alerting: threshold classification, freshness evaluation, and the
//! per-run early-warning queue.

pub mod freshness;
pub mod thresholds;
pub mod warnings;

pub use freshness::{freshness_at, freshness_now};
pub use thresholds::classify;
pub use warnings::{LimitKind, LogNotifier, Notifier, WarningEvent, WarningQueue};
