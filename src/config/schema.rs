//! Configuration schema and defaults for revlens.
//!
//! Defines the TOML-serializable configuration structure with all sections:
//! `[data]`, `[remote]`, `[cache]`, `[filter]`, `[web]` and `[logging]`.
//!
//! Every field has a sensible built-in default. Users only need to set the
//! values they want to override.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level revlens configuration.
///
/// Maps directly to the `~/.revlens/config.toml` and `.revlens.toml` file
/// schemas. All sections and fields are optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevlensConfig {
    pub data: DataConfig,
    pub remote: RemoteConfig,
    pub cache: CacheConfig,
    pub filter: FilterConfig,
    pub web: WebConfig,
    pub logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// [data]
// ---------------------------------------------------------------------------

/// Where the baseline analysis document comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// File path or `http(s)://` URL of the analysis JSON.
    pub baseline: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            baseline: "analysis_results.json".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// [remote]
// ---------------------------------------------------------------------------

/// Dimension-summary service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    pub url: String,
    /// Request deadline in seconds.
    pub timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            url: crate::remote::DEFAULT_URL.to_string(),
            timeout_secs: 90,
        }
    }
}

impl RemoteConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

// ---------------------------------------------------------------------------
// [cache]
// ---------------------------------------------------------------------------

/// Filter result cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Persist cached results to disk. When off, results live only for the
    /// life of the process.
    pub enabled: bool,
    pub ttl_hours: u64,
    pub path: String,
    /// Delete expired entries at startup.
    pub sweep_on_start: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_hours: 12,
            path: "~/.revlens/cache.json".to_string(),
            sweep_on_start: true,
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_hours * 60 * 60)
    }

    pub fn resolved_path(&self) -> PathBuf {
        expand_home(&self.path)
    }
}

// ---------------------------------------------------------------------------
// [filter]
// ---------------------------------------------------------------------------

/// Filter workflow and review list settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Minimum time the busy indicator stays visible.
    pub min_busy_ms: u64,
    /// Maximum number of review cards shown.
    pub review_display_cap: usize,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            min_busy_ms: 600,
            review_display_cap: 50,
        }
    }
}

impl FilterConfig {
    pub fn min_busy(&self) -> Duration {
        Duration::from_millis(self.min_busy_ms)
    }
}

// ---------------------------------------------------------------------------
// [web]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    pub addr: String,
    /// Open the dashboard in the default browser on `revlens serve`.
    pub open_browser: bool,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:9747".to_string(),
            open_browser: true,
        }
    }
}

// ---------------------------------------------------------------------------
// [logging]
// ---------------------------------------------------------------------------

/// Filter request event log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub enabled: bool,
    pub path: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "~/.revlens/events.jsonl".to_string(),
        }
    }
}

impl LoggingConfig {
    pub fn resolved_path(&self) -> PathBuf {
        expand_home(&self.path)
    }
}

/// Expand a leading `~/` to the home directory.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    PathBuf::from(path)
}

// ---------------------------------------------------------------------------
// Default TOML content
// ---------------------------------------------------------------------------

impl RevlensConfig {
    /// Generate the annotated default TOML config file content.
    ///
    /// Used by `revlens config init` to create a starting config file with
    /// all settings documented.
    pub fn default_toml() -> String {
        r#"# revlens Configuration
#
# Configuration hierarchy (highest precedence wins):
#   1. Environment variables (REVLENS_*)
#   2. Project config (.revlens.toml in current directory)
#   3. User global config (~/.revlens/config.toml)
#   4. Built-in defaults

[data]
baseline = "analysis_results.json"   # File path or http(s):// URL

[remote]
url = "https://psmmc-back.vercel.app/api/generate_summaries"
timeout_secs = 90

[cache]
enabled = true                       # false keeps results in memory only
ttl_hours = 12
path = "~/.revlens/cache.json"
sweep_on_start = true

[filter]
min_busy_ms = 600
review_display_cap = 50

[web]
addr = "127.0.0.1:9747"
open_browser = true

[logging]
enabled = true
path = "~/.revlens/events.jsonl"
"#
        .to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
