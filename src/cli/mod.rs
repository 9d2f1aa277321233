//! CLI command implementations for revlens.
//!
//! Provides subcommand handlers for:
//! - `revlens serve`: run the web dashboard
//! - `revlens summary`: print the dashboard for a selection and optional date range
//! - `revlens presets`: list quick ranges resolved against today
//! - `revlens cache list|clear|sweep`: inspect and maintain the filter cache
//! - `revlens history` / `revlens stats`: filter request log and its statistics
//! - `revlens health`: check config, baseline, cache and log files
//! - `revlens config show|init|set|reset`: configuration management

use anyhow::{Context, Result};
use chrono::Local;
use colored::Colorize;
use serde::Serialize;

use crate::analytics::events::FilterEvent;
use crate::analytics::reporter::{self, Stats};
use crate::app;
use crate::cache::CACHE_PREFIX;
use crate::config;
use crate::filter::{FilterError, FilterOutcome, QuickRange};
use crate::model::{Dimension, Sentiment};
use crate::utils::clock;
use crate::view::terminal::TerminalRenderer;
use crate::view::{DashboardView, ViewRenderer};

/// Output format for reporting commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

impl OutputFormat {
    pub fn from_str_opt(s: Option<&str>) -> Self {
        match s {
            Some("json") => Self::Json,
            Some("csv") => Self::Csv,
            _ => Self::Table,
        }
    }
}

// ---------------------------------------------------------------------------
// revlens serve
// ---------------------------------------------------------------------------

/// Start the web dashboard, optionally overriding the listen address.
pub fn run_serve(addr: Option<String>, no_browser: bool) -> Result<()> {
    let mut cfg = config::load();
    if let Some(addr) = addr {
        cfg.web.addr = addr;
    }
    if no_browser {
        cfg.web.open_browser = false;
    }
    crate::web::serve(&cfg)
}

// ---------------------------------------------------------------------------
// revlens summary
// ---------------------------------------------------------------------------

/// Selection and range for `revlens summary`.
#[derive(Debug, Clone, Default)]
pub struct SummaryArgs {
    pub sentiment: Option<String>,
    pub dimension: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub preset: Option<String>,
    /// Review cards to print.
    pub limit: Option<usize>,
}

#[derive(Serialize)]
struct SummaryJson {
    #[serde(skip_serializing_if = "Option::is_none")]
    outcome: Option<FilterOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    view: DashboardView,
}

/// Print the dashboard for a selection, after applying a date range when
/// one is given.
pub fn run_summary(args: SummaryArgs, format: OutputFormat) -> Result<()> {
    let cfg = config::load();
    let mut dashboard = app::load_dashboard(&cfg)?;

    if let Some(raw) = &args.sentiment {
        let s = Sentiment::parse(raw).with_context(|| format!("unknown sentiment '{raw}'"))?;
        dashboard.select_sentiment(s);
    }
    if let Some(raw) = &args.dimension {
        let d = Dimension::parse(raw).with_context(|| format!("unknown dimension '{raw}'"))?;
        dashboard.select_dimension(d);
    }

    let range = resolve_range(&args)?;

    let mut renderer = TerminalRenderer::stdout();
    if let Some(limit) = args.limit {
        renderer = renderer.with_review_limit(limit);
    }

    match (range, format) {
        (None, OutputFormat::Json | OutputFormat::Csv) => {
            print_json(&SummaryJson {
                outcome: None,
                error: None,
                view: dashboard.view(),
            })?;
        }
        (None, OutputFormat::Table) => dashboard.refresh(&mut renderer),
        (Some((start, end)), OutputFormat::Table) => {
            let mut orchestrator = app::build_orchestrator(&cfg, clock::system());
            let result = orchestrator.run(&mut dashboard, &mut renderer, &start, &end);
            return filter_status(result.err().as_ref());
        }
        (Some((start, end)), _) => {
            let mut orchestrator = app::build_orchestrator(&cfg, clock::system());
            let result = orchestrator.apply(&mut dashboard, &start, &end);
            let failure = result.as_ref().err().cloned();
            print_json(&SummaryJson {
                outcome: result.ok(),
                error: failure.as_ref().map(|e| e.user_message()),
                view: dashboard.view(),
            })?;
            return filter_status(failure.as_ref());
        }
    }

    Ok(())
}

/// Exit status for a filter run whose output (view or error banner) has
/// already been printed.
fn filter_status(failure: Option<&FilterError>) -> Result<()> {
    match failure {
        Some(e) => anyhow::bail!("filter failed ({})", e.kind()),
        None => Ok(()),
    }
}

/// `--preset` wins over `--start`/`--end`. A lone `--start` or `--end` is
/// passed through so validation reports the missing side.
fn resolve_range(args: &SummaryArgs) -> Result<Option<(String, String)>> {
    if let Some(id) = &args.preset {
        let preset = QuickRange::parse(id).with_context(|| {
            format!("unknown preset '{id}' (see `revlens presets` for the list)")
        })?;
        return Ok(Some(preset.resolve_strings(Local::now().date_naive())));
    }
    match (&args.start, &args.end) {
        (None, None) => Ok(None),
        (start, end) => Ok(Some((
            start.clone().unwrap_or_default(),
            end.clone().unwrap_or_default(),
        ))),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    println!("{json}");
    Ok(())
}

// ---------------------------------------------------------------------------
// revlens presets
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct PresetRow {
    id: String,
    label: String,
    start: String,
    end: String,
}

/// List the quick ranges with today's resolved dates.
pub fn run_presets(format: OutputFormat) -> Result<()> {
    let today = Local::now().date_naive();
    let rows: Vec<PresetRow> = QuickRange::ALL
        .into_iter()
        .map(|q| {
            let (start, end) = q.resolve_strings(today);
            PresetRow {
                id: q.id(),
                label: q.label(),
                start,
                end,
            }
        })
        .collect();

    match format {
        OutputFormat::Json => print_json(&rows)?,
        OutputFormat::Csv => {
            println!("id,label,start,end");
            for r in &rows {
                println!("{},{},{},{}", r.id, r.label, r.start, r.end);
            }
        }
        OutputFormat::Table => {
            println!("{}", "Quick Ranges".bold().cyan());
            println!("{}", "=".repeat(50));
            println!("  {:<14} {:<16} {:<11}   {}", "Preset", "Label", "Start", "End");
            println!("  {}", "-".repeat(48));
            for r in &rows {
                println!(
                    "  {:<14} {:<16} {:<11} → {}",
                    r.id.bold(),
                    r.label,
                    r.start,
                    r.end
                );
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// revlens cache list | clear | sweep
// ---------------------------------------------------------------------------

/// Show the live cached ranges.
pub fn run_cache_list() -> Result<()> {
    let cfg = config::load();
    let cache = app::build_cache(&cfg, clock::system());
    let keys = cache.live_keys(CACHE_PREFIX);

    if keys.is_empty() {
        println!("{}", "No cached filter results.".yellow());
        return Ok(());
    }

    println!("{}", "Cached Filter Results".bold().cyan());
    println!("{}", "=".repeat(40));
    for key in &keys {
        let range = key.strip_prefix(CACHE_PREFIX).unwrap_or(key);
        println!("  {}", range.replacen('_', " → ", 1));
    }
    println!();
    println!(
        "  {} entries, TTL {}h",
        keys.len(),
        cfg.cache.ttl_hours
    );
    Ok(())
}

/// Remove every cached filter result.
pub fn run_cache_clear() -> Result<()> {
    let cfg = config::load();
    let mut orchestrator = app::build_orchestrator(&cfg, clock::system());
    let mut renderer = TerminalRenderer::stdout();
    orchestrator.clear_cache(&mut renderer);
    Ok(())
}

/// Remove expired or corrupt cached filter results.
pub fn run_cache_sweep() -> Result<()> {
    let cfg = config::load();
    let mut cache = app::build_cache(&cfg, clock::system());
    let removed = cache.sweep_expired(CACHE_PREFIX);
    let mut renderer = TerminalRenderer::stdout();
    renderer.render_notice(&format!("Removed {removed} expired cache entr{}", plural_y(removed)));
    Ok(())
}

fn plural_y(n: usize) -> &'static str {
    if n == 1 { "y" } else { "ies" }
}

// ---------------------------------------------------------------------------
// revlens history
// ---------------------------------------------------------------------------

/// Show recent filter requests, newest first.
pub fn run_history(format: OutputFormat, days: Option<u32>, limit: usize) -> Result<()> {
    let cfg = config::load();
    let mut events = app::event_log(&cfg).read_since_days(days);
    events.reverse();
    events.truncate(limit);

    if events.is_empty() {
        println!(
            "{}",
            "No filter requests logged yet. Apply a date range to see history.".yellow()
        );
        return Ok(());
    }

    match format {
        OutputFormat::Json => print_json(&events)?,
        OutputFormat::Csv => print_history_csv(&events),
        OutputFormat::Table => print_history_table(&events),
    }
    Ok(())
}

fn print_history_table(events: &[FilterEvent]) {
    println!("{}", "Filter Request History".bold().cyan());
    println!("{}", "=".repeat(78));
    println!(
        "  {:<20} {:<11} {:<11} {:<13} {:>7} {:>9}",
        "When", "Start", "End", "Outcome", "Reviews", "Latency"
    );
    println!("  {}", "-".repeat(76));

    for e in events {
        let when = chrono::DateTime::parse_from_rfc3339(&e.timestamp)
            .map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|_| e.timestamp.clone());
        let outcome = match e.source.as_deref() {
            Some(source) if e.succeeded() => format!("{} ({source})", e.outcome),
            _ => e.outcome.clone(),
        };
        println!(
            "  {:<20} {:<11} {:<11} {:<13} {:>7} {:>7}ms",
            when,
            truncate(&e.start, 11),
            truncate(&e.end, 11),
            colorize_outcome(&e.outcome, &outcome),
            e.reviews,
            format_number(e.latency_ms as usize),
        );
        if let Some(message) = &e.message {
            println!("  {:<20} {}", "", message.dimmed());
        }
    }
}

fn print_history_csv(events: &[FilterEvent]) {
    println!("timestamp,start,end,outcome,source,reviews,latency_ms");
    for e in events {
        println!(
            "{},{},{},{},{},{},{}",
            e.timestamp,
            e.start,
            e.end,
            e.outcome,
            e.source.as_deref().unwrap_or(""),
            e.reviews,
            e.latency_ms
        );
    }
}

// ---------------------------------------------------------------------------
// revlens stats
// ---------------------------------------------------------------------------

/// Show filter request statistics.
pub fn run_stats(format: OutputFormat, days: Option<u32>) -> Result<()> {
    let cfg = config::load();
    let events = app::event_log(&cfg).read_since_days(days);
    let stats = reporter::compute_stats(&events);

    if stats.total_requests == 0 {
        println!(
            "{}",
            "No data yet. Apply some date filters to see stats.".yellow()
        );
        return Ok(());
    }

    match format {
        OutputFormat::Json => print_stats_json(&stats)?,
        OutputFormat::Csv => print_stats_csv(&stats),
        OutputFormat::Table => print_stats_table(&stats),
    }

    Ok(())
}

fn print_stats_table(stats: &Stats) {
    println!("{}", "revlens Filter Report".bold().cyan());
    println!("{}", "=".repeat(60));
    println!();

    let o = &stats.outcomes;
    println!("  {} {}", "Total requests:".bold(), stats.total_requests);
    println!("  {} {}", "Applied:       ".bold(), o.applied());
    println!("  {} {:.1}%", "Cache hit rate:".bold(), o.cache_hit_rate());
    println!(
        "  {} {:.0}ms remote / {:.0}ms cached",
        "Avg latency:   ".bold(),
        stats.avg_remote_latency_ms,
        stats.avg_cache_latency_ms
    );
    println!();

    println!("{}", "Outcomes".bold().cyan());
    for (name, count) in [
        ("cache", o.cache_hits),
        ("remote", o.remote),
        ("empty", o.empty),
        ("validation", o.validation),
        ("timeout", o.timeout),
        ("remote_error", o.remote_error),
        ("superseded", o.superseded),
    ] {
        if count > 0 {
            println!(
                "  {:<14} {:>6} ({:.0}%)",
                colorize_outcome(name, name),
                count,
                o.pct(count)
            );
        }
    }
    println!();

    if !stats.range_stats.is_empty() {
        println!("{}", "Most Requested Ranges".bold().cyan());
        println!(
            "  {:<11} {:<11} {:>9} {:>8}",
            "Start", "End", "Requests", "Applied"
        );
        println!("  {}", "-".repeat(42));

        for (i, r) in stats.range_stats.iter().take(15).enumerate() {
            let line = format!(
                "  {:<11} {:<11} {:>9} {:>8}",
                truncate(&r.start, 11),
                truncate(&r.end, 11),
                r.requests,
                r.applied
            );
            if i % 2 == 0 {
                println!("{line}");
            } else {
                println!("{}", line.dimmed());
            }
        }
    }
}

fn print_stats_json(stats: &Stats) -> Result<()> {
    let o = &stats.outcomes;
    let json = serde_json::json!({
        "total_requests": stats.total_requests,
        "applied": o.applied(),
        "cache_hit_rate": o.cache_hit_rate(),
        "avg_remote_latency_ms": stats.avg_remote_latency_ms,
        "avg_cache_latency_ms": stats.avg_cache_latency_ms,
        "outcomes": {
            "cache": o.cache_hits,
            "remote": o.remote,
            "empty": o.empty,
            "validation": o.validation,
            "timeout": o.timeout,
            "remote_error": o.remote_error,
            "superseded": o.superseded,
        },
        "ranges": stats.range_stats.iter().map(|r| serde_json::json!({
            "start": r.start,
            "end": r.end,
            "requests": r.requests,
            "applied": r.applied,
        })).collect::<Vec<_>>(),
    });
    print_json(&json)
}

fn print_stats_csv(stats: &Stats) {
    println!("start,end,requests,applied");
    for r in &stats.range_stats {
        println!("{},{},{},{}", r.start, r.end, r.requests, r.applied);
    }
}

// ---------------------------------------------------------------------------
// revlens health
// ---------------------------------------------------------------------------

/// Check config files, the baseline document, the cache and the event log.
pub fn run_health() -> Result<()> {
    println!("{}", "revlens Health Check".bold().cyan());
    println!("{}", "=".repeat(40));

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let cfg = config::load();
    print_health_item(
        "Global config",
        global_exists,
        if global_exists {
            "~/.revlens/config.toml found"
        } else {
            "not found (run `revlens config init` to create)"
        },
    );
    print_health_item(
        "Project config",
        project_exists,
        if project_exists {
            ".revlens.toml found"
        } else {
            "none (optional)"
        },
    );

    match app::load_dashboard(&cfg) {
        Ok(dashboard) => print_health_item(
            "Baseline",
            true,
            &format!(
                "{} reviews from {}",
                dashboard.dataset().baseline_reviews().len(),
                cfg.data.baseline
            ),
        ),
        Err(e) => print_health_item("Baseline", false, &format!("{e:#}")),
    }

    print_health_item("Summary service", true, &cfg.remote.url);

    let cache = app::build_cache(&cfg, clock::system());
    print_health_item(
        "Cache",
        true,
        &if cfg.cache.enabled {
            format!(
                "{} live entries in {}",
                cache.live_keys(CACHE_PREFIX).len(),
                cfg.cache.resolved_path().display()
            )
        } else {
            "in-memory only".to_string()
        },
    );

    let log = app::event_log(&cfg);
    let log_exists = log.path().is_some_and(|p| p.exists());
    print_health_item(
        "Event log",
        log_exists || !cfg.logging.enabled,
        &match (cfg.logging.enabled, log_exists) {
            (false, _) => "disabled".to_string(),
            (true, true) => format!("{} entries", log.read_all().len()),
            (true, false) => "no log file yet".to_string(),
        },
    );

    Ok(())
}

fn print_health_item(name: &str, ok: bool, detail: &str) {
    let status = if ok {
        "✓".green().bold()
    } else {
        "✗".red().bold()
    };
    println!("  {} {:<18} {}", status, name, detail.dimmed());
}

// ---------------------------------------------------------------------------
// revlens config show | init | set | reset
// ---------------------------------------------------------------------------

/// Show the effective (merged) configuration as TOML.
pub fn run_config_show() -> Result<()> {
    let toml_str = config::show_effective_config()?;
    println!("{}", "Effective revlens Configuration".bold().cyan());
    println!("{}", "=".repeat(50));
    println!();
    println!("{toml_str}");

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    println!("{}", "Sources (highest priority last):".dimmed());
    println!("  {} built-in defaults", "·".dimmed());
    print_source("~/.revlens/config.toml", global_exists);
    print_source(".revlens.toml", project_exists);
    println!(
        "  {} {}",
        "·".dimmed(),
        "REVLENS_* environment variables".dimmed()
    );

    Ok(())
}

fn print_source(name: &str, exists: bool) {
    if exists {
        println!("  {} {}", "✓".green(), name.dimmed());
    } else {
        println!("  {} {}", "·".dimmed(), format!("{name} (not found)").dimmed());
    }
}

/// Initialize a default config file at `~/.revlens/config.toml`.
pub fn run_config_init(force: bool) -> Result<()> {
    let path = config::init_config(force)?;
    println!(
        "{} Config written to {}",
        "✓".green().bold(),
        path.display()
    );
    println!("  {}", "Edit the file to point revlens at your data.".dimmed());
    Ok(())
}

/// Set a single configuration value in the global config file.
pub fn run_config_set(key: &str, value: &str) -> Result<()> {
    config::set_config_value(key, value)?;
    println!("{} Set {} = {}", "✓".green().bold(), key.bold(), value);
    Ok(())
}

/// Reset configuration to defaults.
pub fn run_config_reset() -> Result<()> {
    let path = config::reset_config()?;
    println!(
        "{} Config reset to defaults at {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

/// Format a number with comma separators for readability.
fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, ch) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(ch);
    }
    result.chars().rev().collect()
}

/// Truncate a string to `max_len` characters, appending "…" if truncated.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(1)).collect();
        format!("{kept}…")
    }
}

/// Colorize `text` by the filter outcome it describes.
fn colorize_outcome(outcome: &str, text: &str) -> colored::ColoredString {
    match outcome {
        "applied" | "cache" | "remote" => text.green(),
        "empty" | "validation" | "superseded" => text.yellow(),
        "timeout" | "remote_error" => text.red(),
        _ => text.normal(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1234567), "1,234,567");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world", 5), "hell…");
        assert_eq!(truncate("ab", 2), "ab");
        assert_eq!(truncate("ééééé", 3), "éé…");
    }

    #[test]
    fn test_filter_failure_exits_nonzero() {
        assert!(filter_status(None).is_ok());

        let err = filter_status(Some(&FilterError::Timeout { secs: 90 })).unwrap_err();
        assert_eq!(err.to_string(), "filter failed (timeout)");

        let err = filter_status(Some(&FilterError::EmptyResult)).unwrap_err();
        assert_eq!(err.to_string(), "filter failed (empty)");
    }

    #[test]
    fn test_output_format_parsing() {
        assert_eq!(OutputFormat::from_str_opt(None), OutputFormat::Table);
        assert_eq!(OutputFormat::from_str_opt(Some("json")), OutputFormat::Json);
        assert_eq!(OutputFormat::from_str_opt(Some("csv")), OutputFormat::Csv);
        assert_eq!(
            OutputFormat::from_str_opt(Some("unknown")),
            OutputFormat::Table
        );
    }

    #[test]
    fn range_from_explicit_dates() {
        let args = SummaryArgs {
            start: Some("2024-01-01".to_string()),
            end: Some("2024-03-31".to_string()),
            ..Default::default()
        };
        assert_eq!(
            resolve_range(&args).unwrap(),
            Some(("2024-01-01".to_string(), "2024-03-31".to_string()))
        );
    }

    #[test]
    fn lone_start_passes_through_for_validation() {
        let args = SummaryArgs {
            start: Some("2024-01-01".to_string()),
            ..Default::default()
        };
        assert_eq!(
            resolve_range(&args).unwrap(),
            Some(("2024-01-01".to_string(), String::new()))
        );
        assert_eq!(resolve_range(&SummaryArgs::default()).unwrap(), None);
    }

    #[test]
    fn preset_wins_over_dates() {
        let args = SummaryArgs {
            start: Some("1999-01-01".to_string()),
            end: Some("1999-12-31".to_string()),
            preset: Some("2022".to_string()),
            ..Default::default()
        };
        assert_eq!(
            resolve_range(&args).unwrap(),
            Some(("2022-01-01".to_string(), "2022-12-31".to_string()))
        );

        let bad = SummaryArgs {
            preset: Some("forever".to_string()),
            ..Default::default()
        };
        assert!(resolve_range(&bad).is_err());
    }

    #[test]
    fn pluralizes_entries() {
        assert_eq!(plural_y(1), "y");
        assert_eq!(plural_y(0), "ies");
    }
}
