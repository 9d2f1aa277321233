//! Embedded web dashboard for revlens.
//!
//! Provides a lightweight HTTP server (sync, via `tiny_http`) that serves:
//! - The single-page review dashboard (cards, selectors, charts, date filter)
//! - JSON API endpoints that drive the dashboard state
//!
//! Launched via `revlens serve` (default: `http://127.0.0.1:9747`).
//!
//! Requests are handled one at a time against a single [`WebState`], so a
//! filter request and a "clear filter" click can never interleave.

mod api;
mod frontend;

use std::io::Cursor;

use anyhow::{Context, Result};
use tiny_http::{Header, Method, Response, Server, StatusCode};

use crate::analytics::events::EventLog;
use crate::app;
use crate::config::RevlensConfig;
use crate::dashboard::Dashboard;
use crate::filter::FilterOrchestrator;
use crate::utils::clock::{self, SharedClock};

pub(crate) type HttpResponse = Response<Cursor<Vec<u8>>>;

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Everything a request handler may touch.
pub struct WebState {
    pub dashboard: Dashboard,
    pub orchestrator: FilterOrchestrator,
    pub clock: SharedClock,
    /// Read back by `GET /api/stats`.
    pub log: EventLog,
}

impl WebState {
    pub fn new(
        dashboard: Dashboard,
        orchestrator: FilterOrchestrator,
        clock: SharedClock,
        log: EventLog,
    ) -> Self {
        Self {
            dashboard,
            orchestrator,
            clock,
            log,
        }
    }
}

// ---------------------------------------------------------------------------
// Server entry point
// ---------------------------------------------------------------------------

/// Load the baseline and start the dashboard server.
///
/// Blocks the current thread. Handles requests sequentially (sufficient for
/// a local single-user dashboard). Gracefully handles errors per-request
/// without crashing the server.
pub fn serve(config: &RevlensConfig) -> Result<()> {
    let dashboard = app::load_dashboard(config)?;
    let clock = clock::system();
    let orchestrator = app::build_orchestrator(config, clock.clone());
    let mut state = WebState::new(dashboard, orchestrator, clock, app::event_log(config));

    let addr = config.web.addr.as_str();
    let server = Server::http(addr)
        .map_err(|e| anyhow::anyhow!("failed to start HTTP server on {addr}: {e}"))?;

    println!(
        "revlens dashboard running at http://{addr} ({} reviews)",
        state.dashboard.dataset().baseline_reviews().len()
    );
    println!("Press Ctrl+C to stop.\n");

    if config.web.open_browser {
        // Best-effort
        let _ = open_browser(&format!("http://{addr}"));
    }

    for mut request in server.incoming_requests() {
        let method = request.method().clone();
        let url = request.url().to_string();

        // Read body up-front for methods that carry one
        let body = if matches!(method, Method::Put | Method::Post | Method::Patch) {
            let mut buf = String::new();
            let _ = request.as_reader().read_to_string(&mut buf);
            Some(buf)
        } else {
            None
        };

        let resp = dispatch(&mut state, &method, &url, body.as_deref())
            .unwrap_or_else(|e| error_response(500, &e.to_string()));
        let status = resp.status_code().0;
        let _ = request.respond(resp);

        // Brief access log
        println!(
            "{} {} {} {}",
            method,
            url,
            status,
            chrono::Local::now().format("%H:%M:%S")
        );
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Dispatch an incoming request to the appropriate handler.
pub fn dispatch(
    state: &mut WebState,
    method: &Method,
    url: &str,
    body: Option<&str>,
) -> Result<HttpResponse> {
    // Strip query string for path matching
    let path = url.split('?').next().unwrap_or(url);
    let body = body.unwrap_or("{}");

    match (method, path) {
        // Frontend
        (&Method::Get, "/") | (&Method::Get, "/index.html") => Ok(serve_frontend()),

        // API: Dashboard
        (&Method::Get, "/api/view") => api::get_view(state),
        (&Method::Post, "/api/selection") => api::post_selection(state, body),
        (&Method::Get, "/api/presets") => api::get_presets(state),

        // API: Filter
        (&Method::Post, "/api/filter") => api::post_filter(state, body),
        (&Method::Post, "/api/filter/clear") => api::post_filter_clear(state),
        (&Method::Post, "/api/cache/clear") => api::post_cache_clear(state),

        // API: Analytics
        (&Method::Get, "/api/stats") => api::get_stats(state, url),

        // 404
        _ => Ok(error_response(404, "not found")),
    }
}

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

/// Serve the embedded single-page frontend.
fn serve_frontend() -> HttpResponse {
    let resp = Response::from_data(frontend::INDEX_HTML.as_bytes().to_vec())
        .with_status_code(StatusCode(200));
    with_content_type(resp, "text/html; charset=utf-8")
}

/// JSON `{"error": ...}` with the given status.
pub(crate) fn error_response(status: u16, message: &str) -> HttpResponse {
    let body = serde_json::json!({ "error": message }).to_string();
    let resp = Response::from_data(body.into_bytes()).with_status_code(StatusCode(status));
    with_content_type(resp, "application/json; charset=utf-8")
}

/// Attach a `Content-Type` header.
pub(crate) fn with_content_type(resp: HttpResponse, value: &str) -> HttpResponse {
    match Header::from_bytes("Content-Type", value) {
        Ok(header) => resp.with_header(header),
        Err(()) => resp,
    }
}

/// Attempt to open a URL in the system default browser.
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", url])
            .spawn()
            .context("failed to open browser")?;
    }

    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open")
            .arg(url)
            .spawn()
            .context("failed to open browser")?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open")
            .arg(url)
            .spawn()
            .context("failed to open browser")?;
    }

    Ok(())
}
