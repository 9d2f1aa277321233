//! Date-range filter workflow.
//!
//! validate → filter by date → cache lookup → remote summaries on a miss →
//! apply to the dataset. The request is split into [`FilterOrchestrator::begin`],
//! [`FilterOrchestrator::resolve_summaries`] and [`FilterOrchestrator::complete`]
//! so the dataset is only touched at the very end, and only if nothing else
//! changed it in the meantime. [`FilterOrchestrator::run`] wraps the three
//! with the busy-indicator contract, error rendering and event logging.

pub mod error;
pub mod range;

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::analytics::events::{EventLog, FilterEvent};
use crate::cache::{CACHE_PREFIX, ExpiringCache};
use crate::dashboard::Dashboard;
use crate::dataset::DatasetView;
use crate::model::{DimensionSummaries, Review};
use crate::remote::{CancelToken, DEFAULT_TIMEOUT, Summarizer};
use crate::utils::clock::SharedClock;
use crate::view::ViewRenderer;

pub use error::FilterError;
pub use range::{DateRange, QuickRange, filter_by_date, validate};

/// Default minimum time the busy indicator stays up.
pub const DEFAULT_MIN_BUSY: Duration = Duration::from_millis(600);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterSettings {
    /// Deadline for the remote summaries request.
    pub timeout: Duration,
    /// Minimum time between `show_busy` and `hide_busy`.
    pub min_busy: Duration,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            min_busy: DEFAULT_MIN_BUSY,
        }
    }
}

/// Workflow phase, for diagnostics and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterPhase {
    Idle,
    Validating,
    Filtering,
    CacheLookup,
    CacheHit,
    RemoteFetch,
    Applying,
    Error,
}

/// Where a request's dimension summaries came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SummarySource {
    Cache,
    Remote,
}

impl SummarySource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cache => "cache",
            Self::Remote => "remote",
        }
    }
}

/// A validated, date-filtered request waiting for its summaries.
#[derive(Debug, Clone)]
pub struct PendingFilter {
    pub range: DateRange,
    pub reviews: Vec<Review>,
    /// Dataset generation when the request began.
    pub generation: u64,
}

/// A successfully applied filter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterOutcome {
    pub range: DateRange,
    pub reviews: usize,
    pub source: SummarySource,
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

pub struct FilterOrchestrator {
    cache: ExpiringCache,
    summarizer: Box<dyn Summarizer>,
    clock: SharedClock,
    settings: FilterSettings,
    log: EventLog,
    phase: FilterPhase,
    trail: Vec<FilterPhase>,
}

impl FilterOrchestrator {
    pub fn new(
        cache: ExpiringCache,
        summarizer: Box<dyn Summarizer>,
        clock: SharedClock,
        settings: FilterSettings,
    ) -> Self {
        Self {
            cache,
            summarizer,
            clock,
            settings,
            log: EventLog::disabled(),
            phase: FilterPhase::Idle,
            trail: Vec::new(),
        }
    }

    pub fn with_event_log(mut self, log: EventLog) -> Self {
        self.log = log;
        self
    }

    pub fn settings(&self) -> FilterSettings {
        self.settings
    }

    pub fn phase(&self) -> FilterPhase {
        self.phase
    }

    /// Phases visited by the most recent request, in order.
    pub fn trail(&self) -> &[FilterPhase] {
        &self.trail
    }

    pub fn cache(&self) -> &ExpiringCache {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut ExpiringCache {
        &mut self.cache
    }

    // -- Steps --

    /// Validate the raw input and filter the dataset's baseline reviews.
    pub fn begin(
        &mut self,
        dataset: &DatasetView,
        start: &str,
        end: &str,
    ) -> Result<PendingFilter, FilterError> {
        self.trail.clear();
        self.enter(FilterPhase::Validating);
        let range = validate(start, end).inspect_err(|_| self.enter(FilterPhase::Error))?;

        self.enter(FilterPhase::Filtering);
        let reviews = filter_by_date(dataset.baseline_reviews(), &range)
            .inspect_err(|_| self.enter(FilterPhase::Error))?;

        Ok(PendingFilter {
            range,
            reviews,
            generation: dataset.generation(),
        })
    }

    /// Cached summaries for the range, or fresh ones from the remote service
    /// (stored in the cache before they are returned).
    pub fn resolve_summaries(
        &mut self,
        filtered: &[Review],
        range: &DateRange,
    ) -> Result<(DimensionSummaries, SummarySource), FilterError> {
        self.enter(FilterPhase::CacheLookup);
        let key = range.cache_key();
        if let Some(cached) = self.cache.get::<DimensionSummaries>(&key) {
            self.enter(FilterPhase::CacheHit);
            return Ok((cached, SummarySource::Cache));
        }

        self.enter(FilterPhase::RemoteFetch);
        let token = CancelToken::with_timeout(self.clock.clone(), self.settings.timeout);
        let result = self.summarizer.summarize(filtered, &token);
        let summaries = match result {
            // The deadline wins over whatever arrived after it.
            _ if token.is_expired() => Err(token.timeout_error()),
            other => other,
        }
        .inspect_err(|_| self.enter(FilterPhase::Error))?;

        // Best-effort store.
        let _ = self.cache.set(&key, &summaries);
        Ok((summaries, SummarySource::Remote))
    }

    /// Apply a resolved request, unless the dataset moved on since it began.
    pub fn complete(
        &mut self,
        dataset: &mut DatasetView,
        pending: PendingFilter,
        summaries: DimensionSummaries,
    ) -> Result<(), FilterError> {
        self.enter(FilterPhase::Applying);
        if dataset.generation() != pending.generation {
            self.enter(FilterPhase::Error);
            return Err(FilterError::Superseded);
        }
        dataset.apply_override(pending.reviews, summaries, pending.range);
        self.enter(FilterPhase::Idle);
        Ok(())
    }

    /// Run a full request against the dashboard without drawing anything.
    pub fn apply(
        &mut self,
        dashboard: &mut Dashboard,
        start: &str,
        end: &str,
    ) -> Result<FilterOutcome, FilterError> {
        let started = self.clock.now();
        let result = self.apply_inner(dashboard, start, end);
        self.record(started, start, end, &result);
        result
    }

    fn apply_inner(
        &mut self,
        dashboard: &mut Dashboard,
        start: &str,
        end: &str,
    ) -> Result<FilterOutcome, FilterError> {
        let pending = self.begin(dashboard.dataset(), start, end)?;
        let (summaries, source) = self.resolve_summaries(&pending.reviews, &pending.range)?;
        let outcome = FilterOutcome {
            range: pending.range.clone(),
            reviews: pending.reviews.len(),
            source,
        };
        self.complete(dashboard.dataset_mut(), pending, summaries)?;
        Ok(outcome)
    }

    /// The user-facing filter action.
    ///
    /// Input errors are rendered before the busy indicator appears. Once it
    /// is shown, every outcome (success, empty range, remote failure) is
    /// drawn while it is up and it is hidden no sooner than `min_busy`
    /// after it appeared.
    pub fn run(
        &mut self,
        dashboard: &mut Dashboard,
        renderer: &mut dyn ViewRenderer,
        start: &str,
        end: &str,
    ) -> Result<FilterOutcome, FilterError> {
        if let Err(e) = validate(start, end) {
            self.trail = vec![FilterPhase::Validating, FilterPhase::Error];
            self.phase = FilterPhase::Error;
            self.record(self.clock.now(), start, end, &Err(e.clone()));
            renderer.render_error(&e.user_message());
            return Err(e);
        }

        let shown_at = self.clock.now();
        renderer.show_busy();

        let result = self.apply(dashboard, start, end);
        match &result {
            Ok(_) => dashboard.refresh(renderer),
            Err(e) => renderer.render_error(&e.user_message()),
        }

        let elapsed = (self.clock.now() - shown_at).to_std().unwrap_or(Duration::ZERO);
        if elapsed < self.settings.min_busy {
            self.clock.sleep(self.settings.min_busy - elapsed);
        }
        renderer.hide_busy();
        if result.is_err() {
            self.phase = FilterPhase::Idle;
        }

        result
    }

    /// Drop any active filter and redraw. Idempotent.
    pub fn clear(&mut self, dashboard: &mut Dashboard, renderer: &mut dyn ViewRenderer) {
        dashboard.dataset_mut().clear();
        self.phase = FilterPhase::Idle;
        dashboard.refresh(renderer);
    }

    /// Remove every cached filter result and report the count.
    pub fn clear_cache(&mut self, renderer: &mut dyn ViewRenderer) -> usize {
        let n = self.cache.clear_matching_prefix(CACHE_PREFIX);
        renderer.render_notice(&format!("Cleared {n} cached filter result(s)"));
        n
    }

    /// Remove expired or corrupt cached filter results.
    pub fn sweep_cache(&mut self) -> usize {
        self.cache.sweep_expired(CACHE_PREFIX)
    }

    // -- Internal --

    fn enter(&mut self, phase: FilterPhase) {
        self.phase = phase;
        self.trail.push(phase);
    }

    fn record(
        &self,
        started: DateTime<Utc>,
        start: &str,
        end: &str,
        result: &Result<FilterOutcome, FilterError>,
    ) {
        let now = self.clock.now();
        let mut event = match result {
            Ok(outcome) => {
                let mut e = FilterEvent::new(started, start, end, "applied");
                e.source = Some(outcome.source.as_str().to_string());
                e.reviews = outcome.reviews;
                e
            }
            Err(err) => {
                let mut e = FilterEvent::new(started, start, end, err.kind());
                e.message = Some(err.to_string());
                e
            }
        };
        event.latency_ms = (now - started).num_milliseconds().max(0) as u64;
        self.log.log(&event);
    }
}
