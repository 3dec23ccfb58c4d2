//! Sync stamp marker — three consecutive HTML comment lines.
//!
//! ```text
//! <!-- Last synced: 2024-05-01T12:00:00.000Z -->
//! <!-- Source: /home/me/project/.windsurf/rules/CLAUDE.md -->
//! <!-- Sync version: 1.0.0 -->
//! ```
//!
//! [`format_stamp`] and [`parse_stamp`] are exact inverses for stamps built
//! through [`SyncStamp::at`] / [`SyncStamp::now`].

use std::path::PathBuf;
use std::sync::OnceLock;

use chrono::{DateTime, SecondsFormat, Utc};
use regex::Regex;

use crate::types::SyncStamp;

const LAST_SYNCED: &str = "<!-- Last synced:";
const SOURCE: &str = "<!-- Source:";
const SYNC_VERSION: &str = "<!-- Sync version:";

static STAMP_RE: OnceLock<Regex> = OnceLock::new();

fn stamp_re() -> &'static Regex {
    STAMP_RE.get_or_init(|| {
        Regex::new(
            r"<!-- Last synced: (.+?) -->\s*<!-- Source: (.+?) -->\s*<!-- Sync version: (.+?) -->",
        )
        .expect("stamp pattern is valid")
    })
}

/// Render the three-line marker (no trailing newline).
pub fn format_stamp(stamp: &SyncStamp) -> String {
    format!(
        "{LAST_SYNCED} {} -->\n{SOURCE} {} -->\n{SYNC_VERSION} {} -->",
        stamp
            .last_sync_time
            .to_rfc3339_opts(SecondsFormat::Millis, true),
        stamp.source_file.display(),
        stamp.sync_version,
    )
}

/// Find the first complete marker anywhere in `content`.
///
/// Returns `None` when any of the three lines is missing or the timestamp
/// does not parse.
pub fn parse_stamp(content: &str) -> Option<SyncStamp> {
    let caps = stamp_re().captures(content)?;
    let time = DateTime::parse_from_rfc3339(caps[1].trim()).ok()?;
    Some(SyncStamp {
        last_sync_time: time.with_timezone(&Utc),
        source_file: PathBuf::from(caps[2].trim()),
        sync_version: caps[3].trim().to_string(),
    })
}

/// True for any of the three marker lines.
pub fn is_stamp_line(line: &str) -> bool {
    let line = line.trim_start();
    line.starts_with(LAST_SYNCED) || line.starts_with(SOURCE) || line.starts_with(SYNC_VERSION)
}

/// Remove every marker line and trim the result.
pub fn strip_stamp_lines(content: &str) -> String {
    content
        .lines()
        .filter(|line| !is_stamp_line(line))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}
