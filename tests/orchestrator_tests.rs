/// Filter workflow tests.
///
/// Drive the orchestrator end to end against an in-memory cache, a manual
/// clock and scripted summarizers, asserting on the dataset state and on
/// what the renderer was asked to draw.
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use chrono::{TimeZone, Utc};
use serde_json::{Value, json};

use revlens::cache::ExpiringCache;
use revlens::cache::store::MemoryStore;
use revlens::dashboard::Dashboard;
use revlens::filter::{
    FilterError, FilterOrchestrator, FilterPhase, FilterSettings, SummarySource,
};
use revlens::model::{BaselineDocument, Dimension, DimensionSummaries, Review, Sentiment};
use revlens::remote::{CancelToken, Summarizer};
use revlens::utils::clock::ManualClock;
use revlens::view::snapshot::{RenderEvent, SnapshotRenderer};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Counts calls and answers with fixed summaries after `delay` of clock time.
struct ScriptedSummarizer {
    calls: Arc<AtomicUsize>,
    clock: ManualClock,
    delay: Duration,
    reply: Result<DimensionSummaries, FilterError>,
}

impl Summarizer for ScriptedSummarizer {
    fn summarize(
        &self,
        _reviews: &[Review],
        _cancel: &CancelToken,
    ) -> Result<DimensionSummaries, FilterError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.clock.advance(self.delay);
        self.reply.clone()
    }
}

fn filtered_summaries() -> DimensionSummaries {
    serde_json::from_value(json!({
        "Clinical Care": {
            "negative": {"summary": "Filtered: long waits", "key_insights": ["wait"]}
        }
    }))
    .unwrap()
}

/// 100 reviews: 60 positive, 20 negative, 10 neutral, 10 doubtful.
///
/// Five negative reviews tag Clinical Care as negative; one more negative
/// review mentions Clinical Care with a positive tag. Dates run through
/// 2023 and 2024; the two March 2024 reviews sit on the range edges.
fn baseline_document() -> BaselineDocument {
    let mut reviews: Vec<Value> = Vec::new();
    for i in 0..100 {
        let (sentiment, tags) = match i {
            0..60 => ("positive", json!([{"name": "Service Quality", "sentiment": "positive"}])),
            60..65 => ("negative", json!([{"name": "Clinical Care", "sentiment": "negative"}])),
            65 => ("negative", json!([{"name": "Clinical Care", "sentiment": "positive"}])),
            66..80 => ("negative", json!([{"name": "Operations", "sentiment": "negative"}])),
            80..90 => ("neutral", json!([{"name": "Clinical Care", "sentiment": "neutral"}])),
            _ => ("doubtful", json!([])),
        };
        let date = match i {
            0 => "2024-03-01T00:00:00".to_string(),
            60 => "2024-03-31T23:59:30".to_string(),
            _ => format!("2023-{:02}-{:02}", i % 12 + 1, i % 28 + 1),
        };
        reviews.push(json!({
            "author": format!("Reviewer {i}"),
            "date": date,
            "rating": 4,
            "text": format!("review {i}"),
            "analysis": {"sentiment": sentiment, "dimensions": tags}
        }));
    }

    serde_json::from_value(json!({
        "metadata": {"total_reviews": 100},
        "summary_statistics": {
            "sentiment_distribution": {
                "counts": {"positive": 60, "negative": 20, "neutral": 10, "doubtful": 10}
            },
            "top_dimensions": [["Service Quality", 60], ["Clinical Care", 16], ["Operations", 14]]
        },
        "dimension_summaries": {
            "Clinical Care": {"negative": {"summary": "Baseline: long waits"}}
        },
        "analyzed_reviews": reviews
    }))
    .unwrap()
}

struct Harness {
    dashboard: Dashboard,
    orchestrator: FilterOrchestrator,
    clock: ManualClock,
    calls: Arc<AtomicUsize>,
}

fn harness_with(delay: Duration, reply: Result<DimensionSummaries, FilterError>) -> Harness {
    let clock = ManualClock::starting_at(Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap());
    let calls = Arc::new(AtomicUsize::new(0));
    let summarizer = ScriptedSummarizer {
        calls: calls.clone(),
        clock: clock.clone(),
        delay,
        reply,
    };
    let cache = ExpiringCache::new(
        Box::new(MemoryStore::new()),
        clock.shared(),
        Duration::from_secs(12 * 3600),
    );
    let orchestrator = FilterOrchestrator::new(
        cache,
        Box::new(summarizer),
        clock.shared(),
        FilterSettings::default(),
    );
    Harness {
        dashboard: Dashboard::new(baseline_document()),
        orchestrator,
        clock,
        calls,
    }
}

fn harness() -> Harness {
    harness_with(Duration::from_millis(2000), Ok(filtered_summaries()))
}

fn calls(h: &Harness) -> usize {
    h.calls.load(Ordering::SeqCst)
}

// ---------------------------------------------------------------------------
// Selection over the baseline
// ---------------------------------------------------------------------------

#[test]
fn negative_clinical_care_selects_tagged_reviews_only() {
    let mut h = harness();
    h.dashboard.select_sentiment(Sentiment::Negative);
    h.dashboard.select_dimension(Dimension::ClinicalCare);

    let selected = h.dashboard.selected_reviews();
    assert_eq!(selected.len(), 5);
    assert!(
        selected
            .iter()
            .all(|r| r.has_tag("Clinical Care", Sentiment::Negative))
    );

    let view = h.dashboard.view();
    let counts: Vec<u64> = view.cards.iter().map(|c| c.count).collect();
    assert_eq!(counts, vec![60, 20, 10, 10]);
    assert_eq!(view.insights.summary, "Baseline: long waits");
}

#[test]
fn neutral_selection_uses_overall_sentiment_and_mentions() {
    let mut h = harness();
    h.dashboard.select_sentiment(Sentiment::Neutral);
    h.dashboard.select_dimension(Dimension::ClinicalCare);

    assert_eq!(h.dashboard.selected_reviews().len(), 10);
    let view = h.dashboard.view();
    assert!(!view.insights.visible);
    assert!(!view.overall.visible);
}

// ---------------------------------------------------------------------------
// Applying a range
// ---------------------------------------------------------------------------

#[test]
fn applying_a_range_overrides_reviews_and_summaries() {
    let mut h = harness();
    let mut renderer = SnapshotRenderer::new();

    let outcome = h
        .orchestrator
        .run(&mut h.dashboard, &mut renderer, "2024-03-01", "2024-03-31")
        .unwrap();

    assert_eq!(outcome.reviews, 2);
    assert_eq!(outcome.source, SummarySource::Remote);
    assert!(h.dashboard.dataset().is_filter_active());
    assert_eq!(h.dashboard.dataset().current_reviews().len(), 2);

    h.dashboard.select_sentiment(Sentiment::Negative);
    h.dashboard.select_dimension(Dimension::ClinicalCare);
    let view = h.dashboard.view();
    assert_eq!(view.insights.summary, "Filtered: long waits");
    assert_eq!(view.cards[0].count, 1);
    assert_eq!(view.cards[1].count, 1);
    assert_eq!(view.status.text, "Showing 2 reviews from 2024-03-01 to 2024-03-31");
    // The doughnut keeps describing the whole baseline.
    assert_eq!(view.doughnut.count(Sentiment::Positive), 60);

    assert!(renderer.rendered_view());
    assert!(!renderer.is_busy());
}

#[test]
fn range_bounds_are_inclusive_calendar_days() {
    let mut h = harness();
    let pending = h
        .orchestrator
        .begin(h.dashboard.dataset(), "2024-03-31", "2024-03-31")
        .unwrap();
    assert_eq!(pending.reviews.len(), 1);
    assert_eq!(pending.reviews[0].text.as_deref(), Some("review 60"));

    let pending = h
        .orchestrator
        .begin(h.dashboard.dataset(), "2024-03-01", "2024-03-01")
        .unwrap();
    assert_eq!(pending.reviews.len(), 1);
}

#[test]
fn filters_always_start_from_the_baseline() {
    let mut h = harness();
    let mut renderer = SnapshotRenderer::new();
    h.orchestrator
        .run(&mut h.dashboard, &mut renderer, "2024-03-31", "2024-03-31")
        .unwrap();
    assert_eq!(h.dashboard.dataset().current_reviews().len(), 1);

    h.orchestrator
        .run(&mut h.dashboard, &mut renderer, "2023-01-01", "2024-12-31")
        .unwrap();
    assert_eq!(h.dashboard.dataset().current_reviews().len(), 100);
}

#[test]
fn empty_range_leaves_dataset_untouched() {
    let mut h = harness();
    let mut renderer = SnapshotRenderer::new();

    let err = h
        .orchestrator
        .run(&mut h.dashboard, &mut renderer, "2010-01-01", "2010-12-31")
        .unwrap_err();

    assert_eq!(err, FilterError::EmptyResult);
    assert!(!h.dashboard.dataset().is_filter_active());
    assert_eq!(h.dashboard.dataset().current_reviews().len(), 100);
    assert_eq!(calls(&h), 0);
    assert_eq!(renderer.errors(), vec!["No reviews found in selected date range"]);
    assert!(!renderer.rendered_view());
    assert_eq!(renderer.events().last(), Some(&RenderEvent::HideBusy));
}

// ---------------------------------------------------------------------------
// Cache
// ---------------------------------------------------------------------------

#[test]
fn repeated_range_is_served_from_cache() {
    let mut h = harness();
    let mut renderer = SnapshotRenderer::new();

    let first = h
        .orchestrator
        .run(&mut h.dashboard, &mut renderer, "2023-01-01", "2023-12-31")
        .unwrap();
    let second = h
        .orchestrator
        .run(&mut h.dashboard, &mut renderer, "2023-01-01", "2023-12-31")
        .unwrap();

    assert_eq!(first.source, SummarySource::Remote);
    assert_eq!(second.source, SummarySource::Cache);
    assert_eq!(calls(&h), 1);
    assert!(h.orchestrator.trail().contains(&FilterPhase::CacheHit));
    assert!(!h.orchestrator.trail().contains(&FilterPhase::RemoteFetch));
}

#[test]
fn cache_key_uses_literal_input() {
    let mut h = harness();
    let mut renderer = SnapshotRenderer::new();
    h.orchestrator
        .run(&mut h.dashboard, &mut renderer, "2023-01-01", "2023-12-31")
        .unwrap();

    let keys = h.orchestrator.cache().live_keys("filter_");
    assert_eq!(keys, vec!["filter_2023-01-01_2023-12-31".to_string()]);
}

#[test]
fn expired_entry_triggers_a_fresh_remote_call() {
    let mut h = harness();
    let mut renderer = SnapshotRenderer::new();
    h.orchestrator
        .run(&mut h.dashboard, &mut renderer, "2023-01-01", "2023-12-31")
        .unwrap();

    h.clock.advance(Duration::from_secs(12 * 3600));
    let again = h
        .orchestrator
        .run(&mut h.dashboard, &mut renderer, "2023-01-01", "2023-12-31")
        .unwrap();

    assert_eq!(again.source, SummarySource::Remote);
    assert_eq!(calls(&h), 2);
    assert_eq!(h.orchestrator.cache().evictions(), 1);
}

#[test]
fn clear_cache_reports_removed_count() {
    let mut h = harness();
    let mut renderer = SnapshotRenderer::new();
    for (start, end) in [("2023-01-01", "2023-06-30"), ("2023-07-01", "2023-12-31")] {
        h.orchestrator
            .run(&mut h.dashboard, &mut renderer, start, end)
            .unwrap();
    }

    assert_eq!(h.orchestrator.clear_cache(&mut renderer), 2);
    assert_eq!(renderer.notices(), vec!["Cleared 2 cached filter result(s)"]);
    assert!(h.orchestrator.cache().live_keys("filter_").is_empty());
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

#[test]
fn validation_errors_render_before_busy() {
    let mut h = harness();
    let cases = [
        ("", "2024-01-01", "Please select both start and end dates"),
        ("2024-02-01", "2024-01-01", "Start date must be before end date"),
        ("2024-13-01", "2024-12-31", "Invalid date: 2024-13-01"),
    ];

    for (start, end, message) in cases {
        let mut renderer = SnapshotRenderer::new();
        let err = h
            .orchestrator
            .run(&mut h.dashboard, &mut renderer, start, end)
            .unwrap_err();
        assert!(matches!(err, FilterError::Validation(_)));
        assert_eq!(renderer.errors(), vec![message]);
        assert_eq!(renderer.position(&RenderEvent::ShowBusy), None);
    }
    assert_eq!(h.clock.total_slept(), Duration::ZERO);
}

#[test]
fn remote_failure_keeps_previous_state() {
    let mut h = harness_with(
        Duration::from_millis(100),
        Err(FilterError::Remote("Failed to generate summaries".to_string())),
    );
    let mut renderer = SnapshotRenderer::new();

    let err = h
        .orchestrator
        .run(&mut h.dashboard, &mut renderer, "2023-01-01", "2023-12-31")
        .unwrap_err();

    assert_eq!(err.kind(), "remote_error");
    assert!(!h.dashboard.dataset().is_filter_active());
    assert_eq!(
        renderer.errors(),
        vec!["Error applying filter: Failed to generate summaries"]
    );
    assert!(h.orchestrator.cache().live_keys("filter_").is_empty());
    assert_eq!(h.orchestrator.phase(), FilterPhase::Idle);
}

#[test]
fn slow_remote_times_out() {
    let mut h = harness_with(Duration::from_secs(91), Ok(filtered_summaries()));
    let mut renderer = SnapshotRenderer::new();

    let err = h
        .orchestrator
        .run(&mut h.dashboard, &mut renderer, "2023-01-01", "2023-12-31")
        .unwrap_err();

    assert_eq!(err, FilterError::Timeout { secs: 90 });
    assert_eq!(
        renderer.errors(),
        vec!["Error applying filter: Request timed out after 90 seconds"]
    );
    assert!(!h.dashboard.dataset().is_filter_active());
    assert!(h.orchestrator.cache().live_keys("filter_").is_empty());
}

#[test]
fn stale_response_is_discarded() {
    let mut h = harness();
    let pending = h
        .orchestrator
        .begin(h.dashboard.dataset(), "2023-01-01", "2023-12-31")
        .unwrap();
    let (summaries, _) = h
        .orchestrator
        .resolve_summaries(&pending.reviews, &pending.range)
        .unwrap();

    // The user cleared the (absent) filter while the request was in flight.
    let mut renderer = SnapshotRenderer::new();
    h.orchestrator.clear(&mut h.dashboard, &mut renderer);

    let err = h
        .orchestrator
        .complete(h.dashboard.dataset_mut(), pending, summaries)
        .unwrap_err();
    assert_eq!(err, FilterError::Superseded);
    assert!(!h.dashboard.dataset().is_filter_active());
    assert_eq!(h.dashboard.dataset().current_reviews().len(), 100);
}

// ---------------------------------------------------------------------------
// Busy indicator and clearing
// ---------------------------------------------------------------------------

#[test]
fn busy_indicator_stays_up_for_the_minimum_time() {
    let mut h = harness();
    let mut renderer = SnapshotRenderer::new();

    // Remote answer takes 2s: no extra wait.
    h.orchestrator
        .run(&mut h.dashboard, &mut renderer, "2023-01-01", "2023-12-31")
        .unwrap();
    assert_eq!(h.clock.total_slept(), Duration::ZERO);

    // Cache hit is instant: padded to 600ms.
    h.orchestrator
        .run(&mut h.dashboard, &mut renderer, "2023-01-01", "2023-12-31")
        .unwrap();
    assert_eq!(h.clock.total_slept(), Duration::from_millis(600));

    let shown = renderer.position(&RenderEvent::ShowBusy).unwrap();
    let hidden = renderer.position(&RenderEvent::HideBusy).unwrap();
    assert!(shown < hidden);
}

#[test]
fn clearing_restores_the_baseline_and_is_idempotent() {
    let mut h = harness();
    let mut renderer = SnapshotRenderer::new();
    h.orchestrator
        .run(&mut h.dashboard, &mut renderer, "2024-03-01", "2024-03-31")
        .unwrap();

    h.orchestrator.clear(&mut h.dashboard, &mut renderer);
    h.orchestrator.clear(&mut h.dashboard, &mut renderer);

    let dataset = h.dashboard.dataset();
    assert!(!dataset.is_filter_active());
    assert!(dataset.active_range().is_none());
    assert_eq!(dataset.current_reviews().len(), 100);

    let view = h.dashboard.view();
    assert!(!view.status.active);
    assert_eq!(view.cards[0].count, 60);
}
