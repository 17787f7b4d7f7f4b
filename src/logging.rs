/// Structured logging for the synoptic monitoring service.
///
/// Log lines carry a severity, a subsystem tag, and optionally the station
/// being processed, so an operator reading the scheduler's captured output
/// can tell a silent sensor from a broken store. Output goes to the console
/// and, when configured, to an append-only log file for daemon operation.

use chrono::Utc;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::model::SynopticError;

// ---------------------------------------------------------------------------
// Levels and subsystem tags
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl LogLevel {
    fn as_str(self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARN",
            LogLevel::Error => "ERROR",
        }
    }
}

/// Which part of the service produced a log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subsystem {
    Store,
    Aggregate,
    Alert,
    Render,
    Config,
    System,
}

impl Subsystem {
    fn as_str(self) -> &'static str {
        match self {
            Subsystem::Store => "STORE",
            Subsystem::Aggregate => "AGG",
            Subsystem::Alert => "ALERT",
            Subsystem::Render => "RENDER",
            Subsystem::Config => "CONFIG",
            Subsystem::System => "SYS",
        }
    }
}

// ---------------------------------------------------------------------------
// Global logger
// ---------------------------------------------------------------------------

static LOGGER: Mutex<Option<Logger>> = Mutex::new(None);

struct Logger {
    min_level: LogLevel,
    log_file: Option<PathBuf>,
}

/// Install the global logger. Until this is called, logging is a no-op,
/// which keeps unit tests quiet.
pub fn init_logger(min_level: LogLevel, log_file: Option<&str>) {
    let logger = Logger {
        min_level,
        log_file: log_file.map(PathBuf::from),
    };
    if let Ok(mut slot) = LOGGER.lock() {
        *slot = Some(logger);
    }
}

fn emit(level: LogLevel, subsystem: Subsystem, station: Option<&str>, message: &str) {
    let Ok(slot) = LOGGER.lock() else {
        return;
    };
    let Some(logger) = slot.as_ref() else {
        return;
    };
    if level < logger.min_level {
        return;
    }

    let mut line = format!(
        "{} {:5} [{}]",
        Utc::now().format("%Y-%m-%dT%H:%M:%SZ"),
        level.as_str(),
        subsystem.as_str(),
    );
    if let Some(station) = station {
        line.push_str(&format!(" {}:", station));
    }
    line.push(' ');
    line.push_str(message);

    if level >= LogLevel::Warning {
        eprintln!("{}", line);
    } else {
        println!("{}", line);
    }

    if let Some(path) = &logger.log_file {
        let appended = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .and_then(|mut file| writeln!(file, "{}", line));
        if let Err(e) = appended {
            eprintln!("cannot append to log file {}: {}", path.display(), e);
        }
    }
}

pub fn debug(subsystem: Subsystem, station: Option<&str>, message: &str) {
    emit(LogLevel::Debug, subsystem, station, message);
}

pub fn info(subsystem: Subsystem, station: Option<&str>, message: &str) {
    emit(LogLevel::Info, subsystem, station, message);
}

pub fn warn(subsystem: Subsystem, station: Option<&str>, message: &str) {
    emit(LogLevel::Warning, subsystem, station, message);
}

pub fn error(subsystem: Subsystem, station: Option<&str>, message: &str) {
    emit(LogLevel::Error, subsystem, station, message);
}

// ---------------------------------------------------------------------------
// Failure classification
// ---------------------------------------------------------------------------

/// How alarming a station-processing failure is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureType {
    /// Part of normal operation - a lagging or silent sensor.
    Expected,
    /// Needs operator attention - store outage or broken configuration.
    Unexpected,
}

/// Map a failure to a severity class by its error variant.
pub fn classify_station_failure(err: &SynopticError) -> FailureType {
    match err {
        SynopticError::SeriesLookupMiss { .. } => FailureType::Expected,
        SynopticError::StoreUnavailable(_)
        | SynopticError::IntegrityViolation(_)
        | SynopticError::ConfigurationError(_) => FailureType::Unexpected,
    }
}

/// Log a station-processing failure at the severity its classification
/// warrants: expected failures stay at debug so a flaky sensor doesn't
/// page anyone, unexpected ones are errors.
pub fn log_station_failure(station: &str, operation: &str, err: &SynopticError) {
    match classify_station_failure(err) {
        FailureType::Expected => debug(
            Subsystem::Aggregate,
            Some(station),
            &format!("{} skipped: {}", operation, err),
        ),
        FailureType::Unexpected => error(
            Subsystem::Aggregate,
            Some(station),
            &format!("{} failed: {}", operation, err),
        ),
    }
}

// ---------------------------------------------------------------------------
// Run summaries
// ---------------------------------------------------------------------------

/// One line per finished group, at a severity reflecting how it went.
pub fn log_run_summary(group_slug: &str, total: usize, successful: usize, failed: usize) {
    let message = format!(
        "group '{}': {}/{} stations rendered, {} failed",
        group_slug, successful, total, failed
    );
    if failed == 0 {
        info(Subsystem::System, None, &message);
    } else if successful == 0 {
        error(Subsystem::System, None, &message);
    } else {
        warn(Subsystem::System, None, &message);
    }
}
