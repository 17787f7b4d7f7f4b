//! Scheduler entry point.
//!
//! One invocation is one run: load the registry, open the store, process
//! every group, publish the outputs. Intended to be run from cron or a
//! systemd timer.
//!
//! Environment:
//!   SYNMON_REGISTRY   registry TOML path      (default ./synoptic.toml)
//!   SYNMON_OUTPUT     output root directory   (default ./output)
//!   SYNMON_STORE      postgres | http         (default postgres)
//!   SYNMON_STORE_URL  base URL for the http store
//!   SYNMON_LOG_FILE   optional log file path
//!   DATABASE_URL      connection string for the postgres store

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use chrono::Utc;

use synmon_service::alert::LogNotifier;
use synmon_service::logging::{self, LogLevel, Subsystem};
use synmon_service::model::SynopticError;
use synmon_service::registry;
use synmon_service::render::{JsonRenderer, Palette};
use synmon_service::runner;
use synmon_service::store::{HttpStore, PostgresStore, TimeseriesStore};

/// Timeout for each request of the HTTP store.
const HTTP_STORE_TIMEOUT: Duration = Duration::from_secs(30);

fn main() -> ExitCode {
    dotenv::dotenv().ok();

    let log_file = std::env::var("SYNMON_LOG_FILE").ok();
    logging::init_logger(LogLevel::Info, log_file.as_deref());

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            logging::error(Subsystem::System, None, &e.to_string());
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), SynopticError> {
    let registry_path =
        std::env::var("SYNMON_REGISTRY").unwrap_or_else(|_| "synoptic.toml".to_string());
    let output_root: PathBuf = std::env::var("SYNMON_OUTPUT")
        .unwrap_or_else(|_| "output".to_string())
        .into();

    let registry = registry::load(Path::new(&registry_path))?;
    let mut store = open_store()?;

    let summary = runner::run_all(
        &registry,
        store.as_mut(),
        &JsonRenderer,
        &mut LogNotifier,
        &output_root,
        &Palette::default(),
        Utc::now(),
    );

    if !summary.groups.is_empty() || summary.groups_failed == 0 {
        Ok(())
    } else {
        Err(SynopticError::ConfigurationError(
            "every configured group failed".to_string(),
        ))
    }
}

fn open_store() -> Result<Box<dyn TimeseriesStore>, SynopticError> {
    let kind = std::env::var("SYNMON_STORE").unwrap_or_else(|_| "postgres".to_string());
    match kind.as_str() {
        "postgres" => Ok(Box::new(PostgresStore::connect_from_env()?)),
        "http" => {
            let base_url = std::env::var("SYNMON_STORE_URL").map_err(|_| {
                SynopticError::ConfigurationError(
                    "SYNMON_STORE=http requires SYNMON_STORE_URL".to_string(),
                )
            })?;
            Ok(Box::new(HttpStore::new(&base_url, HTTP_STORE_TIMEOUT)?))
        }
        other => Err(SynopticError::ConfigurationError(format!(
            "unknown store kind '{}'",
            other
        ))),
    }
}
