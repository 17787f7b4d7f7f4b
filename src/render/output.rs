//! Static output publication.
//!
//! Rendered documents are published beneath an output root at stable
//! relative paths, so a web server can serve them directly and every run
//! regenerates the same files. Each file is written to a temporary sibling
//! and renamed over the final name; a reader never observes a half-written
//! document, and a run aborted mid-way leaves the previous outputs intact.

use std::fs;
use std::io;
use std::path::Path;

/// Relative path of the group page.
pub fn group_path(slug: &str) -> String {
    format!("{}/index.json", slug)
}

/// Relative path of one station's page.
pub fn station_path(slug: &str, station_order: u16) -> String {
    format!("{}/station/{}/index.json", slug, station_order)
}

/// Relative path of one chart, keyed by station and leading-series order.
pub fn chart_path(slug: &str, station_order: u16, leader_order: u16) -> String {
    format!("{}/chart/{}-{}.json", slug, station_order, leader_order)
}

/// Write `content` to `root/relative`, atomically replacing any previous
/// version. Parent directories are created as needed.
pub fn write_output(root: &Path, relative: &str, content: &[u8]) -> io::Result<()> {
    let target = root.join(relative);
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }

    // Write to a sibling first; the rename replaces the final file in one
    // step on the same filesystem.
    let mut temporary = target.clone().into_os_string();
    temporary.push(".1");
    fs::write(&temporary, content)?;
    fs::rename(&temporary, &target)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
