//! End-to-end run scenarios.
//!
//! These tests drive a whole run — registry parsing, aggregation,
//! classification, freshness, rendering, publication, and early-warning
//! delivery — against the in-memory store, using a two-station fixture:
//! Komboti (rain, temperature,
//! wind speed leading a grouped wind gust with a high limit) and Agios
//! Athanasios (rain, temperature with a low limit, and a wind sensor that
//! reports instants without values). A third station, Arta, is bound into
//! the group with no series at all.
//!
//! No database, network, or clock is touched: the store is in memory and
//! "now" is injected.

use std::fs;
use std::path::PathBuf;
use std::time::Duration as StdDuration;

use chrono::{TimeZone, Utc};

use synmon_service::alert::Notifier;
use synmon_service::model::SynopticError;
use synmon_service::registry::{self, Registry};
use synmon_service::render::{JsonRenderer, Palette};
use synmon_service::runner::{run_all, run_group};
use synmon_service::store::{MemoryStore, TimeseriesStore};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

const REGISTRY_TOML: &str = r#"
    [[group]]
    name = "Arachthos basin"
    slug = "arachthos"
    fresh_time_limit_minutes = 60
    warning_recipients = ["duty-officer@example.com"]
    time_zone = { code = "EET", utc_offset_minutes = 120 }

    [[group.station]]
    name = "Komboti"
    latitude = 39.09518
    longitude = 21.06071
    order = 1

    [[group.station.series]]
    series_id = "komboti-rain"
    name = "Rain"
    unit = "mm"
    order = 1

    [[group.station.series]]
    series_id = "komboti-temperature"
    name = "Air temperature"
    unit = "°C"
    order = 2

    [[group.station.series]]
    series_id = "komboti-wind-speed"
    name = "Wind speed"
    unit = "m/s"
    precision = 1
    order = 3
    title = "Wind"
    subtitle = "speed"

    [[group.station.series]]
    series_id = "komboti-wind-gust"
    name = "Wind gust"
    unit = "m/s"
    precision = 1
    order = 4
    title = "Wind"
    subtitle = "gust"
    group_with = 3
    high_limit = 4.0

    [[group.station]]
    name = "Agios Athanasios"
    latitude = 39.14904
    longitude = 20.87591
    order = 2

    [[group.station.series]]
    series_id = "agios-rain"
    name = "Rain"
    unit = "mm"
    precision = 1
    order = 1

    [[group.station.series]]
    series_id = "agios-temperature"
    name = "Air temperature"
    unit = "°C"
    precision = 1
    order = 2
    low_limit = 17.1

    [[group.station.series]]
    series_id = "agios-wind-speed"
    name = "Wind speed"
    unit = "m/s"
    precision = 1
    order = 3

    [[group.station]]
    name = "Arta"
    latitude = 39.15104
    longitude = 20.97527
    order = 3
"#;

fn fixture_registry() -> Registry {
    registry::parse(REGISTRY_TOML).expect("fixture registry should parse")
}

fn fixture_store() -> MemoryStore {
    let mut store = MemoryStore::new();
    store
        .insert_csv(
            "komboti-rain",
            "2015-10-22 15:00,0,\n2015-10-22 15:10,0,\n2015-10-22 15:20,0,\n",
        )
        .unwrap();
    store
        .insert_csv(
            "komboti-temperature",
            "2015-10-22 15:00,15,\n2015-10-22 15:10,16,\n2015-10-22 15:20,17,\n",
        )
        .unwrap();
    store
        .insert_csv(
            "komboti-wind-speed",
            "2015-10-22 15:00,2.9,\n2015-10-22 15:10,3.2,\n2015-10-22 15:20,3,\n",
        )
        .unwrap();
    store
        .insert_csv(
            "komboti-wind-gust",
            "2015-10-22 15:00,3.7,\n2015-10-22 15:10,4.5,\n2015-10-22 15:20,4.1,\n",
        )
        .unwrap();
    // Agios reports a day later than Komboti, and its rain runs ahead of
    // the rest of the station.
    store
        .insert_csv(
            "agios-rain",
            "2015-10-22 15:00,0,\n2015-10-23 15:10,0,\n2015-10-23 15:20,0.2,\n2015-10-23 15:30,1.4,\n",
        )
        .unwrap();
    store
        .insert_csv(
            "agios-temperature",
            "2015-10-23 15:00,40,\n2015-10-23 15:10,39,\n2015-10-23 15:20,38.5,\n",
        )
        .unwrap();
    // The wind sensor records instants with empty measurement fields.
    store
        .insert_csv(
            "agios-wind-speed",
            "2015-10-23 15:00,,\n2015-10-23 15:10,,\n2015-10-23 15:20,,\n",
        )
        .unwrap();
    store
}

/// A fixed "now" for the whole run: 2015-10-23 13:45:00 UTC. Agios' common
/// date (15:20 EET = 13:20 UTC) is 25 minutes old; Komboti's is a day older.
fn fixed_now() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2015, 10, 23, 13, 45, 0).unwrap()
}

fn scratch_root(name: &str) -> PathBuf {
    let root =
        std::env::temp_dir().join(format!("synmon-e2e-{}-{}", name, std::process::id()));
    let _ = fs::remove_dir_all(&root);
    root
}

struct RecordingNotifier {
    sent: Vec<(String, String, Vec<String>)>,
}

impl Notifier for RecordingNotifier {
    fn send(
        &mut self,
        subject: &str,
        body: &str,
        recipients: &[String],
    ) -> Result<(), Box<dyn std::error::Error>> {
        self.sent
            .push((subject.to_string(), body.to_string(), recipients.to_vec()));
        Ok(())
    }
}

/// Store wrapper that fails every request for one station's series,
/// simulating a partial store outage.
struct PartialOutageStore {
    inner: MemoryStore,
    failing_prefix: &'static str,
}

impl TimeseriesStore for PartialOutageStore {
    fn get_range(
        &mut self,
        series_id: &str,
        start: chrono::NaiveDateTime,
        end: chrono::NaiveDateTime,
    ) -> Result<Vec<synmon_service::model::Sample>, SynopticError> {
        if series_id.starts_with(self.failing_prefix) {
            return Err(SynopticError::StoreUnavailable("connection reset".to_string()));
        }
        self.inner.get_range(series_id, start, end)
    }

    fn latest_timestamp(
        &mut self,
        series_id: &str,
    ) -> Result<Option<chrono::NaiveDateTime>, SynopticError> {
        if series_id.starts_with(self.failing_prefix) {
            return Err(SynopticError::StoreUnavailable("connection reset".to_string()));
        }
        self.inner.latest_timestamp(series_id)
    }
}

fn read_json(root: &PathBuf, relative: &str) -> serde_json::Value {
    let path = root.join(relative);
    let bytes = fs::read(&path)
        .unwrap_or_else(|e| panic!("missing output {}: {}", path.display(), e));
    serde_json::from_slice(&bytes)
        .unwrap_or_else(|e| panic!("unparseable output {}: {}", path.display(), e))
}

// ---------------------------------------------------------------------------
// Full-run scenarios
// ---------------------------------------------------------------------------

#[test]
fn test_full_run_renders_stations_in_binding_order_with_expected_values() {
    let registry = fixture_registry();
    let mut store = fixture_store();
    let mut notifier = RecordingNotifier { sent: vec![] };
    let root = scratch_root("full");

    let summary = run_group(
        &registry.groups[0],
        &mut store,
        &JsonRenderer,
        &mut notifier,
        &root,
        &Palette::default(),
        fixed_now(),
    )
    .expect("a healthy run should succeed");

    assert_eq!(summary.stations_total, 3);
    assert_eq!(summary.stations_rendered, 3);
    assert_eq!(summary.stations_failed, 0);

    let group = read_json(&root, "arachthos/index.json");
    let stations = group["stations"].as_array().unwrap();
    assert_eq!(stations.len(), 3);
    assert_eq!(stations[0]["name"], "Komboti");
    assert_eq!(stations[1]["name"], "Agios Athanasios");
    assert_eq!(stations[2]["name"], "Arta");

    // Komboti: everything resolved at the 15:20 common date.
    let komboti = &stations[0];
    assert_eq!(komboti["last_common_date"], "2015-10-22 15:20 (+0200)");
    assert_eq!(komboti["error"], false);
    let rows = komboti["rows"].as_array().unwrap();
    let cells: Vec<(String, String, String)> = rows
        .iter()
        .map(|r| {
            (
                r["label"].as_str().unwrap().to_string(),
                r["value"].as_str().unwrap().to_string(),
                r["status"].as_str().unwrap().to_string(),
            )
        })
        .collect();
    assert_eq!(
        cells,
        vec![
            ("Rain".to_string(), "0 mm".to_string(), "ok".to_string()),
            ("Air temperature".to_string(), "17 °C".to_string(), "ok".to_string()),
            ("Wind (speed)".to_string(), "3.0 m/s".to_string(), "ok".to_string()),
            ("(gust)".to_string(), "4.1 m/s".to_string(), "high".to_string()),
        ]
    );

    // Agios: rain runs ahead, so temperature's 15:20 limits the station;
    // 38.5 is comfortably above the 17.1 low limit; the valueless wind
    // sensor renders an explicit unknown row and flags partial data.
    let agios = &stations[1];
    assert_eq!(agios["last_common_date"], "2015-10-23 15:20 (+0200)");
    assert_eq!(agios["error"], true);
    let rows = agios["rows"].as_array().unwrap();
    assert_eq!(rows[0]["value"], "0.2 mm");
    assert_eq!(rows[0]["status"], "ok");
    assert_eq!(rows[1]["value"], "38.5 °C");
    assert_eq!(rows[1]["status"], "ok");
    assert_eq!(rows[2]["value"], "n/a");
    assert_eq!(rows[2]["status"], "error");

    // Arta: bound with no series — still rendered, empty, not an error.
    let arta = &stations[2];
    assert_eq!(arta["last_common_date"], serde_json::Value::Null);
    assert_eq!(arta["error"], false);
    assert_eq!(arta["rows"].as_array().unwrap().len(), 0);
    assert_eq!(arta["freshness"], "old");

    fs::remove_dir_all(&root).unwrap();
}

#[test]
fn test_freshness_splits_the_group_at_the_fixed_now() {
    let registry = fixture_registry();
    let mut store = fixture_store();
    let mut notifier = RecordingNotifier { sent: vec![] };
    let root = scratch_root("freshness");

    run_group(
        &registry.groups[0],
        &mut store,
        &JsonRenderer,
        &mut notifier,
        &root,
        &Palette::default(),
        fixed_now(),
    )
    .unwrap();

    let group = read_json(&root, "arachthos/index.json");
    let stations = group["stations"].as_array().unwrap();
    assert_eq!(stations[0]["freshness"], "old", "Komboti last reported a day ago");
    assert_eq!(stations[1]["freshness"], "recent", "Agios is 25 minutes old");

    fs::remove_dir_all(&root).unwrap();
}

#[test]
fn test_gust_violation_is_delivered_once_to_the_group_recipients() {
    let registry = fixture_registry();
    let mut store = fixture_store();
    let mut notifier = RecordingNotifier { sent: vec![] };
    let root = scratch_root("warning");

    let summary = run_group(
        &registry.groups[0],
        &mut store,
        &JsonRenderer,
        &mut notifier,
        &root,
        &Palette::default(),
        fixed_now(),
    )
    .unwrap();

    assert_eq!(summary.warnings_flushed, 1);
    assert_eq!(notifier.sent.len(), 1, "one notification per group per run");
    let (subject, body, recipients) = &notifier.sent[0];
    assert_eq!(subject, "Early warning (Komboti)");
    assert_eq!(body, "Komboti 2015-10-22T15:20 Wind gust 4.1 (high limit 4)\n");
    assert_eq!(recipients, &vec!["duty-officer@example.com".to_string()]);

    fs::remove_dir_all(&root).unwrap();
}

#[test]
fn test_wind_chart_groups_gust_before_speed() {
    let registry = fixture_registry();
    let mut store = fixture_store();
    let mut notifier = RecordingNotifier { sent: vec![] };
    let root = scratch_root("charts");

    run_group(
        &registry.groups[0],
        &mut store,
        &JsonRenderer,
        &mut notifier,
        &root,
        &Palette::default(),
        fixed_now(),
    )
    .unwrap();

    // Komboti leads charts at orders 1 (rain), 2 (temperature), 3 (wind);
    // the gust (order 4) shares the wind chart instead of leading its own.
    assert!(root.join("arachthos/chart/1-3.json").exists());
    assert!(
        !root.join("arachthos/chart/1-4.json").exists(),
        "a grouped series must not lead a chart of its own",
    );

    let wind = read_json(&root, "arachthos/chart/1-3.json");
    assert_eq!(wind["title"], "Wind");
    let series = wind["series"].as_array().unwrap();
    assert_eq!(series.len(), 2);
    assert_eq!(series[0]["label"], "gust");
    assert_eq!(series[1]["label"], "speed");
    assert_eq!(series[0]["points"][2]["value"], 4.1);
    assert_eq!(series[1]["points"][2]["value"], 3.0);
    assert_ne!(series[0]["color"], series[1]["color"]);

    // Arta has no data, hence no charts.
    assert!(!root.join("arachthos/chart/3-1.json").exists());

    fs::remove_dir_all(&root).unwrap();
}

#[test]
fn test_station_store_outage_fails_that_station_only() {
    let registry = fixture_registry();
    let mut store = PartialOutageStore {
        inner: fixture_store(),
        failing_prefix: "komboti-",
    };
    let mut notifier = RecordingNotifier { sent: vec![] };
    let root = scratch_root("outage");

    let summary = run_group(
        &registry.groups[0],
        &mut store,
        &JsonRenderer,
        &mut notifier,
        &root,
        &Palette::default(),
        fixed_now(),
    )
    .expect("a partial outage must not fail the group");

    assert_eq!(summary.stations_failed, 1);
    assert_eq!(summary.stations_rendered, 2);

    let group = read_json(&root, "arachthos/index.json");
    let names: Vec<_> = group["stations"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["Agios Athanasios", "Arta"]);

    assert!(
        notifier.sent.is_empty(),
        "the gust violation was unreachable, so nothing is delivered",
    );

    fs::remove_dir_all(&root).unwrap();
}

#[test]
fn test_misconfigured_group_does_not_block_the_others() {
    let registry = registry::parse(
        r#"
        [[group]]
        name = "No clock"
        slug = "broken"
        fresh_time_limit_minutes = 60

        [[group]]
        name = "Healthy"
        slug = "healthy"
        fresh_time_limit_minutes = 60
        time_zone = { code = "UTC", utc_offset_minutes = 0 }
        "#,
    )
    .unwrap();
    let mut store = MemoryStore::new();
    let mut notifier = RecordingNotifier { sent: vec![] };
    let root = scratch_root("isolation");

    let summary = run_all(
        &registry,
        &mut store,
        &JsonRenderer,
        &mut notifier,
        &root,
        &Palette::default(),
        fixed_now(),
    );

    assert_eq!(summary.groups_failed, 1);
    assert_eq!(summary.groups.len(), 1);
    assert_eq!(summary.groups[0].slug, "healthy");
    assert!(root.join("healthy/index.json").exists());
    assert!(!root.join("broken/index.json").exists());

    fs::remove_dir_all(&root).unwrap();
}

#[test]
fn test_repeated_runs_regenerate_identical_documents() {
    let registry = fixture_registry();
    let mut store = fixture_store();
    let mut notifier = RecordingNotifier { sent: vec![] };
    let root = scratch_root("idempotent");
    let palette = Palette::default();

    run_group(
        &registry.groups[0],
        &mut store,
        &JsonRenderer,
        &mut notifier,
        &root,
        &palette,
        fixed_now(),
    )
    .unwrap();
    let first = fs::read(root.join("arachthos/index.json")).unwrap();

    run_group(
        &registry.groups[0],
        &mut store,
        &JsonRenderer,
        &mut notifier,
        &root,
        &palette,
        fixed_now(),
    )
    .unwrap();
    let second = fs::read(root.join("arachthos/index.json")).unwrap();

    assert_eq!(first, second, "unchanged data and clock reproduce the bytes");
    assert!(
        !root.join("arachthos/index.json.1").exists(),
        "no temporary file survives the atomic replace",
    );

    fs::remove_dir_all(&root).unwrap();
}

// Keep the HTTP store's timeout type in the e2e surface so a signature
// change there is caught by this suite as well.
#[test]
fn test_http_store_builds_with_a_caller_supplied_timeout() {
    let store =
        synmon_service::store::HttpStore::new("http://localhost:9", StdDuration::from_secs(5));
    assert!(store.is_ok());
}
