//! Filter request log: one JSONL line per date-range filter attempt.
//!
//! Records what was asked for, how it ended, and whether the summaries came
//! from the cache or the remote service. Read back by `revlens history` and
//! `revlens stats`.
//!
//! Log file: `~/.revlens/events.jsonl` (configurable).

use std::fs::{self, OpenOptions, create_dir_all};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Event entry
// ---------------------------------------------------------------------------

/// A filter request outcome. One line per request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterEvent {
    pub timestamp: String,
    pub start: String,
    pub end: String,
    /// `"applied"`, or the failure kind (`"validation"`, `"empty"`,
    /// `"timeout"`, `"remote_error"`, `"superseded"`).
    pub outcome: String,
    /// Where the summaries came from: `"cache"` or `"remote"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Number of reviews in the filtered set.
    #[serde(default)]
    pub reviews: usize,
    #[serde(default)]
    pub latency_ms: u64,
    /// User-facing error text for failed requests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl FilterEvent {
    pub fn new(at: DateTime<Utc>, start: &str, end: &str, outcome: &str) -> Self {
        Self {
            timestamp: at.to_rfc3339(),
            start: start.to_string(),
            end: end.to_string(),
            outcome: outcome.to_string(),
            source: None,
            reviews: 0,
            latency_ms: 0,
            message: None,
        }
    }

    pub fn succeeded(&self) -> bool {
        self.outcome == "applied"
    }
}

// ---------------------------------------------------------------------------
// Log handle
// ---------------------------------------------------------------------------

/// Append-only JSONL log. A log without a path discards everything.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    path: Option<PathBuf>,
}

impl EventLog {
    /// Log at `~/.revlens/events.jsonl`.
    pub fn open_default() -> Self {
        Self {
            path: default_path(),
        }
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    pub fn disabled() -> Self {
        Self { path: None }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Append an event.
    ///
    /// Best-effort: failures are silently ignored.
    pub fn log(&self, event: &FilterEvent) {
        if let Some(path) = &self.path {
            let _ = append_event(path, event);
        }
    }

    /// Read every event, skipping malformed lines. Empty if the file does
    /// not exist or cannot be read.
    pub fn read_all(&self) -> Vec<FilterEvent> {
        let Some(path) = &self.path else {
            return Vec::new();
        };
        let Ok(file) = fs::File::open(path) else {
            return Vec::new();
        };

        BufReader::new(file)
            .lines()
            .map_while(Result::ok)
            .filter_map(|line| serde_json::from_str::<FilterEvent>(&line).ok())
            .collect()
    }

    /// Events from the last `days` days, or all of them when `days` is
    /// `None`.
    pub fn read_since_days(&self, days: Option<u32>) -> Vec<FilterEvent> {
        let entries = self.read_all();
        let Some(days) = days else {
            return entries;
        };

        let cutoff = Utc::now() - chrono::Duration::days(i64::from(days));
        entries
            .into_iter()
            .filter(|e| {
                DateTime::parse_from_rfc3339(&e.timestamp)
                    .is_ok_and(|ts| ts.with_timezone(&Utc) >= cutoff)
            })
            .collect()
    }
}

fn append_event(path: &Path, event: &FilterEvent) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        create_dir_all(parent)?;
    }

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    let json = serde_json::to_string(event)?;
    writeln!(file, "{json}")?;

    Ok(())
}

/// Default log location.
pub fn default_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".revlens").join("events.jsonl"))
}
