//! JSON API handlers for the web dashboard.
//!
//! Each handler corresponds to an API endpoint and returns a
//! `Response<Cursor<Vec<u8>>>` with JSON content. State-changing handlers
//! answer with the freshly derived view so the page never has to derive
//! anything itself.

use anyhow::{Context, Result};
use chrono::Local;
use serde::{Deserialize, Serialize};
use tiny_http::{Response, StatusCode};

use crate::analytics::reporter;
use crate::cache::CACHE_PREFIX;
use crate::filter::{FilterOutcome, QuickRange};
use crate::model::{Dimension, Sentiment};
use crate::view::DashboardView;
use crate::view::snapshot::{RenderEvent, SnapshotRenderer};

use super::{HttpResponse, WebState, error_response, with_content_type};

// ---------------------------------------------------------------------------
// JSON request / response types
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct ViewResponse {
    view: DashboardView,
    cached_ranges: Vec<String>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct SelectionRequest {
    sentiment: Option<String>,
    dimension: Option<String>,
}

/// Either an explicit `start`/`end` pair or a preset id.
#[derive(Deserialize, Default)]
#[serde(default)]
struct FilterRequest {
    start: String,
    end: String,
    preset: Option<String>,
}

#[derive(Serialize)]
struct FilterResponse {
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    outcome: Option<FilterOutcome>,
    /// Text shown in the error banner.
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<&'static str>,
    /// Renderer calls made while handling the request.
    events: Vec<RenderEvent>,
    view: DashboardView,
}

#[derive(Serialize)]
struct PresetResponse {
    id: String,
    label: String,
    start: String,
    end: String,
}

#[derive(Serialize)]
struct CacheClearResponse {
    cleared: usize,
    notice: String,
}

/// Stats API response, mirrors `reporter::Stats` but is Serialize.
#[derive(Serialize)]
struct StatsResponse {
    total_requests: usize,
    applied: usize,
    cache_hits: usize,
    remote: usize,
    empty: usize,
    validation: usize,
    timeout: usize,
    remote_error: usize,
    superseded: usize,
    cache_hit_rate: f64,
    avg_remote_latency_ms: f64,
    avg_cache_latency_ms: f64,
    ranges: Vec<RangeStatResponse>,
}

#[derive(Serialize)]
struct RangeStatResponse {
    start: String,
    end: String,
    requests: usize,
    applied: usize,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Build a JSON success response.
fn json_response<T: Serialize>(data: &T) -> Result<HttpResponse> {
    let body = serde_json::to_string(data).context("failed to serialize JSON response")?;
    let resp = Response::from_data(body.into_bytes()).with_status_code(StatusCode(200));
    Ok(with_content_type(resp, "application/json; charset=utf-8"))
}

/// Parse the `?days=N` query parameter from a URL.
fn parse_days_param(url: &str) -> Option<u32> {
    url.split('?').nth(1)?.split('&').find_map(|pair| {
        let (k, v) = pair.split_once('=')?;
        if k == "days" { v.parse().ok() } else { None }
    })
}

fn view_response(state: &WebState) -> Result<HttpResponse> {
    json_response(&ViewResponse {
        view: state.dashboard.view(),
        cached_ranges: state.orchestrator.cache().live_keys(CACHE_PREFIX),
    })
}

// ---------------------------------------------------------------------------
// API Handlers
// ---------------------------------------------------------------------------

/// `GET /api/view`: the current dashboard frame.
pub fn get_view(state: &mut WebState) -> Result<HttpResponse> {
    view_response(state)
}

/// `POST /api/selection`: change the sentiment and/or dimension selector.
///
/// Expects JSON body: `{ "sentiment": "negative", "dimension": "Operations" }`
pub fn post_selection(state: &mut WebState, body: &str) -> Result<HttpResponse> {
    let req: SelectionRequest =
        serde_json::from_str(body).context("invalid JSON in selection request")?;

    if let Some(raw) = &req.sentiment {
        match Sentiment::parse(raw) {
            Some(s) => state.dashboard.select_sentiment(s),
            None => return Ok(error_response(400, &format!("unknown sentiment '{raw}'"))),
        }
    }
    if let Some(raw) = &req.dimension {
        match Dimension::parse(raw) {
            Some(d) => state.dashboard.select_dimension(d),
            None => return Ok(error_response(400, &format!("unknown dimension '{raw}'"))),
        }
    }

    view_response(state)
}

/// `GET /api/presets`: quick ranges resolved against today's local date.
pub fn get_presets(state: &mut WebState) -> Result<HttpResponse> {
    let today = state.clock.now().with_timezone(&Local).date_naive();
    let presets: Vec<PresetResponse> = QuickRange::ALL
        .into_iter()
        .map(|q| {
            let (start, end) = q.resolve_strings(today);
            PresetResponse {
                id: q.id(),
                label: q.label(),
                start,
                end,
            }
        })
        .collect();

    json_response(&presets)
}

/// `POST /api/filter`: apply a date range.
///
/// Expects JSON body: `{ "start": "2024-01-01", "end": "2024-06-30" }` or
/// `{ "preset": "lastyear" }`. Filter failures are reported in the body
/// with status 200; they are outcomes the page displays, not API errors.
pub fn post_filter(state: &mut WebState, body: &str) -> Result<HttpResponse> {
    let req: FilterRequest =
        serde_json::from_str(body).context("invalid JSON in filter request")?;

    let (start, end) = match &req.preset {
        Some(id) => match QuickRange::parse(id) {
            Some(q) => q.resolve_strings(state.clock.now().with_timezone(&Local).date_naive()),
            None => return Ok(error_response(400, &format!("unknown preset '{id}'"))),
        },
        None => (req.start, req.end),
    };

    let mut renderer = SnapshotRenderer::new();
    let result = state
        .orchestrator
        .run(&mut state.dashboard, &mut renderer, &start, &end);

    let resp = match result {
        Ok(outcome) => FilterResponse {
            ok: true,
            outcome: Some(outcome),
            error: None,
            kind: None,
            events: renderer.events().to_vec(),
            view: state.dashboard.view(),
        },
        Err(e) => FilterResponse {
            ok: false,
            outcome: None,
            error: Some(e.user_message()),
            kind: Some(e.kind()),
            events: renderer.events().to_vec(),
            view: state.dashboard.view(),
        },
    };

    json_response(&resp)
}

/// `POST /api/filter/clear`: return to the baseline dataset.
pub fn post_filter_clear(state: &mut WebState) -> Result<HttpResponse> {
    let mut renderer = SnapshotRenderer::new();
    state.orchestrator.clear(&mut state.dashboard, &mut renderer);
    view_response(state)
}

/// `POST /api/cache/clear`: drop every cached filter result.
pub fn post_cache_clear(state: &mut WebState) -> Result<HttpResponse> {
    let mut renderer = SnapshotRenderer::new();
    let cleared = state.orchestrator.clear_cache(&mut renderer);
    let notice = renderer.notices().first().map(|n| n.to_string()).unwrap_or_default();

    json_response(&CacheClearResponse { cleared, notice })
}

/// `GET /api/stats?days=N`: filter request statistics.
pub fn get_stats(state: &mut WebState, url: &str) -> Result<HttpResponse> {
    let events = state.log.read_since_days(parse_days_param(url));
    let stats = reporter::compute_stats(&events);
    let o = &stats.outcomes;

    let resp = StatsResponse {
        total_requests: stats.total_requests,
        applied: o.applied(),
        cache_hits: o.cache_hits,
        remote: o.remote,
        empty: o.empty,
        validation: o.validation,
        timeout: o.timeout,
        remote_error: o.remote_error,
        superseded: o.superseded,
        cache_hit_rate: o.cache_hit_rate(),
        avg_remote_latency_ms: stats.avg_remote_latency_ms,
        avg_cache_latency_ms: stats.avg_cache_latency_ms,
        ranges: stats
            .range_stats
            .into_iter()
            .map(|r| RangeStatResponse {
                start: r.start,
                end: r.end,
                requests: r.requests,
                applied: r.applied,
            })
            .collect(),
    };

    json_response(&resp)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
