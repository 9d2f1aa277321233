//! Configuration system for revlens.
//!
//! Provides a layered configuration hierarchy:
//!
//! 1. **Built-in defaults**: hardcoded in [`schema::RevlensConfig::default()`]
//! 2. **User global config**: `~/.revlens/config.toml`
//! 3. **Project local config**: `.revlens.toml` in the current working directory
//! 4. **Environment variables**: `REVLENS_*` overrides (highest precedence)
//!
//! Later layers override earlier ones key by key: a project file that only
//! sets `[cache] ttl_hours` keeps every other value from the global file.
//! Malformed files are ignored.

pub mod schema;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub use schema::RevlensConfig;

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the fully resolved configuration.
pub fn load() -> RevlensConfig {
    let mut config = load_layers(&[global_config_path(), project_config_path()]);
    apply_env_overrides(&mut config);
    config
}

/// Merge defaults with each existing TOML file in order.
pub fn load_layers(paths: &[Option<PathBuf>]) -> RevlensConfig {
    let defaults = RevlensConfig::default();
    let Ok(mut merged) = toml::Value::try_from(&defaults) else {
        return defaults;
    };

    for path in paths.iter().flatten() {
        if let Some(layer) = load_toml_value(path) {
            merge_values(&mut merged, layer);
        }
    }

    merged.try_into().unwrap_or(defaults)
}

/// Read a TOML file as a raw value tree. `None` if missing or malformed.
fn load_toml_value(path: &Path) -> Option<toml::Value> {
    let content = fs::read_to_string(path).ok()?;
    toml::from_str(&content).ok()
}

/// Overlay `overlay` onto `base`, recursing into tables.
fn merge_values(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base), toml::Value::Table(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

// ---------------------------------------------------------------------------
// File paths
// ---------------------------------------------------------------------------

/// Path to the user global config: `~/.revlens/config.toml`.
fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".revlens").join("config.toml"))
}

/// Path to the project local config: `.revlens.toml` in the current directory.
fn project_config_path() -> Option<PathBuf> {
    std::env::current_dir()
        .ok()
        .map(|cwd| cwd.join(".revlens.toml"))
}

/// Return the path to the global config file for display/init purposes.
pub fn global_config_file() -> Option<PathBuf> {
    global_config_path()
}

/// Return the path to the project config file for display purposes.
pub fn project_config_file() -> Option<PathBuf> {
    project_config_path()
}

// ---------------------------------------------------------------------------
// Environment variable overrides
// ---------------------------------------------------------------------------

/// Apply environment variable overrides (highest precedence layer).
///
/// Supported variables:
/// - `REVLENS_BASELINE`: baseline document path or URL
/// - `REVLENS_REMOTE_URL`: summary service endpoint
/// - `REVLENS_REMOTE_TIMEOUT_SECS`: summary request deadline
/// - `REVLENS_CACHE`: persist the cache to disk (`1`/`true`/`yes`/`on`)
/// - `REVLENS_CACHE_TTL_HOURS`: cache entry lifetime
/// - `REVLENS_CACHE_PATH`: cache file
/// - `REVLENS_MIN_BUSY_MS`: minimum busy indicator time
/// - `REVLENS_WEB_ADDR`: dashboard listen address
/// - `REVLENS_LOGGING`: event log on/off
/// - `REVLENS_LOG_PATH`: event log file
fn apply_env_overrides(config: &mut RevlensConfig) {
    apply_overrides(config, |name| std::env::var(name).ok());
}

fn apply_overrides(config: &mut RevlensConfig, var: impl Fn(&str) -> Option<String>) {
    let non_empty = |name: &str| var(name).filter(|v| !v.is_empty());

    if let Some(val) = non_empty("REVLENS_BASELINE") {
        config.data.baseline = val;
    }
    if let Some(val) = non_empty("REVLENS_REMOTE_URL") {
        config.remote.url = val;
    }
    if let Some(val) = var("REVLENS_REMOTE_TIMEOUT_SECS")
        && let Ok(secs) = val.parse::<u64>()
    {
        config.remote.timeout_secs = secs;
    }
    if let Some(val) = var("REVLENS_CACHE") {
        config.cache.enabled = is_truthy(&val);
    }
    if let Some(val) = var("REVLENS_CACHE_TTL_HOURS")
        && let Ok(hours) = val.parse::<u64>()
    {
        config.cache.ttl_hours = hours;
    }
    if let Some(val) = non_empty("REVLENS_CACHE_PATH") {
        config.cache.path = val;
    }
    if let Some(val) = var("REVLENS_MIN_BUSY_MS")
        && let Ok(ms) = val.parse::<u64>()
    {
        config.filter.min_busy_ms = ms;
    }
    if let Some(val) = non_empty("REVLENS_WEB_ADDR") {
        config.web.addr = val;
    }
    if let Some(val) = var("REVLENS_LOGGING") {
        config.logging.enabled = is_truthy(&val);
    }
    if let Some(val) = non_empty("REVLENS_LOG_PATH") {
        config.logging.path = val;
    }
}

/// Check if a string value represents a truthy boolean.
fn is_truthy(val: &str) -> bool {
    matches!(
        val.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

// ---------------------------------------------------------------------------
// Config init / set / reset
// ---------------------------------------------------------------------------

/// Write the default annotated config to `~/.revlens/config.toml`.
///
/// Creates the `~/.revlens/` directory if it doesn't exist. Returns an error
/// if the file already exists (use `force = true` to overwrite).
pub fn init_config(force: bool) -> Result<PathBuf> {
    let path = global_config_path().context("could not determine home directory")?;

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create ~/.revlens/ directory")?;
    }

    fs::write(&path, RevlensConfig::default_toml()).context("failed to write config file")?;

    Ok(path)
}

/// Set a single config key to a value in the global config file.
///
/// Supports dotted keys like `cache.ttl_hours`. When no file exists yet the
/// defaults are written out first.
pub fn set_config_value(key: &str, value: &str) -> Result<()> {
    let path = global_config_path().context("could not determine home directory")?;
    set_config_value_at(&path, key, value)
}

fn set_config_value_at(path: &Path, key: &str, value: &str) -> Result<()> {
    let mut root: toml::Value = if path.exists() {
        let content = fs::read_to_string(path).context("failed to read config file")?;
        toml::from_str(&content).context("failed to parse config as TOML value")?
    } else {
        toml::Value::try_from(RevlensConfig::default())
            .context("failed to serialize default config")?
    };

    // Keys missing from a hand-written file still resolve against defaults.
    let mut with_defaults = toml::Value::try_from(RevlensConfig::default())
        .context("failed to serialize default config")?;
    merge_values(&mut with_defaults, root.clone());
    set_toml_value(&mut with_defaults, key, value)?;
    let section = key.split('.').next().unwrap_or(key);
    if let (Some(updated), Some(table)) = (with_defaults.get(section), root.as_table_mut()) {
        table.insert(section.to_string(), updated.clone());
    }

    let output = toml::to_string_pretty(&root).context("failed to serialize updated config")?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create config directory")?;
    }
    fs::write(path, output).context("failed to write config file")?;

    Ok(())
}

/// Set a value in a TOML value tree using a dotted key path.
fn set_toml_value(root: &mut toml::Value, key: &str, raw_value: &str) -> Result<()> {
    let parts: Vec<&str> = key.split('.').collect();
    if parts.len() < 2 {
        anyhow::bail!("config key must be <section>.<name>, got '{key}'");
    }

    // Navigate to the parent table
    let mut current = root;
    for &part in &parts[..parts.len() - 1] {
        current = current
            .get_mut(part)
            .with_context(|| format!("config key not found: section '{part}' in '{key}'"))?;
    }

    let leaf = parts[parts.len() - 1];
    let table = current.as_table_mut().with_context(|| {
        format!(
            "expected table at '{}'",
            key.rsplit_once('.').map(|(s, _)| s).unwrap_or("")
        )
    })?;

    // Parse according to the type of the existing value
    let new_value = match table.get(leaf) {
        None => anyhow::bail!("unknown config key '{key}'"),
        Some(toml::Value::Boolean(_)) => toml::Value::Boolean(is_truthy(raw_value)),
        Some(toml::Value::Integer(_)) => {
            let n: i64 = raw_value
                .parse()
                .with_context(|| format!("expected integer for '{key}', got '{raw_value}'"))?;
            toml::Value::Integer(n)
        }
        Some(toml::Value::Float(_)) => {
            let f: f64 = raw_value
                .parse()
                .with_context(|| format!("expected float for '{key}', got '{raw_value}'"))?;
            toml::Value::Float(f)
        }
        Some(_) => toml::Value::String(raw_value.to_string()),
    };

    table.insert(leaf.to_string(), new_value);
    Ok(())
}

/// Reset the global config to defaults (overwrite the file).
pub fn reset_config() -> Result<PathBuf> {
    init_config(true)
}

/// Show the effective (fully resolved) config as TOML.
pub fn show_effective_config() -> Result<String> {
    let config = load();
    toml::to_string_pretty(&config).context("failed to serialize effective config")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn is_truthy_accepts_variants() {
        assert!(is_truthy("1"));
        assert!(is_truthy("TRUE"));
        assert!(is_truthy("yes"));
        assert!(is_truthy("on"));
        assert!(!is_truthy("0"));
        assert!(!is_truthy("off"));
        assert!(!is_truthy(""));
    }

    #[test]
    fn layers_merge_key_by_key() {
        let dir = tempfile::tempdir().unwrap();
        let global = dir.path().join("global.toml");
        let project = dir.path().join("project.toml");
        fs::write(&global, "[cache]\nttl_hours = 2\n[web]\naddr = \"0.0.0.0:1\"\n").unwrap();
        fs::write(&project, "[cache]\nenabled = false\n").unwrap();

        let config = load_layers(&[Some(global), Some(project)]);

        assert_eq!(config.cache.ttl_hours, 2);
        assert!(!config.cache.enabled);
        assert_eq!(config.web.addr, "0.0.0.0:1");
        assert_eq!(config.filter.min_busy_ms, 600);
    }

    #[test]
    fn malformed_layer_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let bad = dir.path().join("bad.toml");
        fs::write(&bad, "[cache\nttl_hours = ").unwrap();

        assert_eq!(load_layers(&[Some(bad), None]), RevlensConfig::default());
    }

    #[test]
    fn env_overrides_win() {
        let vars: HashMap<&str, &str> = [
            ("REVLENS_REMOTE_TIMEOUT_SECS", "30"),
            ("REVLENS_CACHE", "off"),
            ("REVLENS_MIN_BUSY_MS", "not a number"),
            ("REVLENS_BASELINE", ""),
        ]
        .into_iter()
        .collect();
        let mut config = RevlensConfig::default();
        apply_overrides(&mut config, |name| vars.get(name).map(|v| v.to_string()));

        assert_eq!(config.remote.timeout_secs, 30);
        assert!(!config.cache.enabled);
        assert_eq!(config.filter.min_busy_ms, 600);
        assert_eq!(config.data.baseline, "analysis_results.json");
    }

    #[test]
    fn set_toml_value_updates_integer() {
        let mut root: toml::Value = toml::from_str("[filter]\nmin_busy_ms = 600\n").unwrap();
        set_toml_value(&mut root, "filter.min_busy_ms", "250").unwrap();
        assert_eq!(root["filter"]["min_busy_ms"].as_integer(), Some(250));
    }

    #[test]
    fn set_toml_value_rejects_unknown_keys() {
        let mut root: toml::Value = toml::from_str("[cache]\nenabled = true\n").unwrap();
        assert!(set_toml_value(&mut root, "cache.nope", "1").is_err());
        assert!(set_toml_value(&mut root, "nonexistent.key", "1").is_err());
        assert!(set_toml_value(&mut root, "cache", "1").is_err());
    }

    #[test]
    fn set_value_creates_file_from_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        set_config_value_at(&path, "cache.enabled", "false").unwrap();

        let config = load_layers(&[Some(path)]);
        assert!(!config.cache.enabled);
        assert_eq!(config.cache.ttl_hours, 12);
    }

    #[test]
    fn set_value_fills_section_missing_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[web]\nopen_browser = false\n").unwrap();

        set_config_value_at(&path, "remote.timeout_secs", "45").unwrap();

        let config = load_layers(&[Some(path)]);
        assert_eq!(config.remote.timeout_secs, 45);
        assert!(!config.web.open_browser);
    }

    #[test]
    fn show_effective_config_returns_toml() {
        let toml_str = show_effective_config().unwrap();
        let _: RevlensConfig = toml::from_str(&toml_str).unwrap();
    }
}
