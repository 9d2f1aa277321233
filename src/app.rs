//! Wiring from a resolved [`RevlensConfig`] to a ready dashboard and filter
//! orchestrator. Shared by the CLI commands and the web server.

use anyhow::{Context, Result};

use crate::analytics::events::EventLog;
use crate::cache::ExpiringCache;
use crate::cache::store::{FileStore, KeyValueStore, MemoryStore};
use crate::config::RevlensConfig;
use crate::dashboard::Dashboard;
use crate::filter::{FilterOrchestrator, FilterSettings};
use crate::model::BaselineDocument;
use crate::remote::HttpSummarizer;
use crate::utils::clock::SharedClock;

/// Load the baseline document named by `[data] baseline`.
pub fn load_dashboard(config: &RevlensConfig) -> Result<Dashboard> {
    let document = BaselineDocument::load(&config.data.baseline)
        .with_context(|| format!("failed to load baseline from {}", config.data.baseline))?;
    Ok(Dashboard::new(document).with_display_cap(config.filter.review_display_cap))
}

/// The cache backing store selected by `[cache] enabled`.
pub fn cache_store(config: &RevlensConfig) -> Box<dyn KeyValueStore> {
    if config.cache.enabled {
        Box::new(FileStore::open(config.cache.resolved_path()))
    } else {
        Box::new(MemoryStore::new())
    }
}

/// The filter request log selected by `[logging]`.
pub fn event_log(config: &RevlensConfig) -> EventLog {
    if config.logging.enabled {
        EventLog::at(config.logging.resolved_path())
    } else {
        EventLog::disabled()
    }
}

/// The expiring cache over the configured store.
pub fn build_cache(config: &RevlensConfig, clock: SharedClock) -> ExpiringCache {
    ExpiringCache::new(cache_store(config), clock, config.cache.ttl())
}

/// An orchestrator talking to the configured summary service. Expired
/// entries are swept first when `[cache] sweep_on_start` is set.
pub fn build_orchestrator(config: &RevlensConfig, clock: SharedClock) -> FilterOrchestrator {
    let settings = FilterSettings {
        timeout: config.remote.timeout(),
        min_busy: config.filter.min_busy(),
    };
    let mut orchestrator = FilterOrchestrator::new(
        build_cache(config, clock.clone()),
        Box::new(HttpSummarizer::new(config.remote.url.clone())),
        clock,
        settings,
    )
    .with_event_log(event_log(config));

    if config.cache.sweep_on_start {
        orchestrator.sweep_cache();
    }
    orchestrator
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::clock;

    fn config_in(dir: &std::path::Path) -> RevlensConfig {
        let mut config = RevlensConfig::default();
        config.cache.path = dir.join("cache.json").display().to_string();
        config.logging.path = dir.join("events.jsonl").display().to_string();
        config
    }

    #[test]
    fn orchestrator_uses_configured_timing() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(dir.path());
        config.remote.timeout_secs = 5;
        config.filter.min_busy_ms = 10;

        let orchestrator = build_orchestrator(&config, clock::system());
        assert_eq!(orchestrator.settings().timeout.as_secs(), 5);
        assert_eq!(orchestrator.settings().min_busy.as_millis(), 10);
        assert_eq!(orchestrator.cache().ttl(), config.cache.ttl());
    }

    #[test]
    fn disabled_logging_has_no_path() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(dir.path());
        assert!(event_log(&config).path().is_some());
        config.logging.enabled = false;
        assert!(event_log(&config).path().is_none());
    }

    #[test]
    fn load_dashboard_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(dir.path());
        config.data.baseline = dir.path().join("missing.json").display().to_string();

        let err = load_dashboard(&config).err().unwrap();
        assert!(err.to_string().contains("failed to load baseline"));
    }

    #[test]
    fn load_dashboard_accepts_empty_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("analysis.json");
        std::fs::write(&path, r#"{"analyzed_reviews": []}"#).unwrap();
        let mut config = config_in(dir.path());
        config.data.baseline = path.display().to_string();
        config.filter.review_display_cap = 3;

        let dashboard = load_dashboard(&config).unwrap();
        assert!(dashboard.dataset().current_reviews().is_empty());
    }
}
