/// Client for the remote dimension-summary service.
///
/// The service takes `POST {"reviews": [...]}` and answers with a
/// [`DimensionSummaries`] JSON object, or `{"error": "..."}` on failure.
/// Requests are synchronous `ureq` calls bounded by a [`CancelToken`]
/// deadline; the token's remaining time becomes the request timeout.
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::filter::error::FilterError;
use crate::model::{DimensionSummaries, Review};
use crate::utils::clock::SharedClock;

/// Default summarization endpoint.
pub const DEFAULT_URL: &str = "https://psmmc-back.vercel.app/api/generate_summaries";

/// Default request deadline.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(90);

/// Generic failure text when the service returns JSON without an `error`.
const GENERIC_FAILURE: &str = "Failed to generate summaries";

// ---------------------------------------------------------------------------
// Cancellation
// ---------------------------------------------------------------------------

/// Deadline plus an explicit cancel flag for one remote request.
///
/// Clones share the cancel flag.
#[derive(Clone)]
pub struct CancelToken {
    clock: SharedClock,
    deadline: DateTime<Utc>,
    timeout: Duration,
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    /// Token that expires `timeout` from the clock's current time.
    pub fn with_timeout(clock: SharedClock, timeout: Duration) -> Self {
        let span = chrono::Duration::from_std(timeout).unwrap_or(chrono::Duration::days(1));
        let deadline = clock.now() + span;
        Self {
            clock,
            deadline,
            timeout,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Time left before the deadline; zero once it has passed.
    pub fn remaining(&self) -> Duration {
        (self.deadline - self.clock.now())
            .to_std()
            .unwrap_or(Duration::ZERO)
    }

    pub fn is_expired(&self) -> bool {
        self.clock.now() >= self.deadline
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// The error for a request stopped by this token, if it has been
    /// stopped.
    pub fn check(&self) -> Result<(), FilterError> {
        if self.is_cancelled() {
            Err(FilterError::Superseded)
        } else if self.is_expired() {
            Err(self.timeout_error())
        } else {
            Ok(())
        }
    }

    pub fn timeout_error(&self) -> FilterError {
        FilterError::Timeout {
            secs: self.timeout.as_secs(),
        }
    }
}

// ---------------------------------------------------------------------------
// Summarizer
// ---------------------------------------------------------------------------

/// Produces dimension summaries for a review subset.
pub trait Summarizer {
    fn summarize(
        &self,
        reviews: &[Review],
        cancel: &CancelToken,
    ) -> Result<DimensionSummaries, FilterError>;
}

#[derive(Serialize)]
struct SummaryRequest<'a> {
    reviews: &'a [Review],
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// HTTP summarizer backed by `ureq`.
#[derive(Debug, Clone)]
pub struct HttpSummarizer {
    url: String,
}

impl HttpSummarizer {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Summarizer for HttpSummarizer {
    fn summarize(
        &self,
        reviews: &[Review],
        cancel: &CancelToken,
    ) -> Result<DimensionSummaries, FilterError> {
        cancel.check()?;

        let result = ureq::post(&self.url)
            .timeout(cancel.remaining())
            .send_json(SummaryRequest { reviews });

        match result {
            Ok(resp) => {
                let body = resp
                    .into_string()
                    .map_err(|e| transport_failure(cancel, &e.to_string()))?;
                serde_json::from_str(&body)
                    .map_err(|e| FilterError::Remote(format!("Invalid summary response: {e}")))
            }
            Err(ureq::Error::Status(code, resp)) => {
                let body = resp.into_string().unwrap_or_default();
                Err(FilterError::Remote(status_message(code, &body)))
            }
            Err(ureq::Error::Transport(t)) => Err(transport_failure(cancel, &t.to_string())),
        }
    }
}

/// Message for a non-success response: the server's `error` text when the
/// body is JSON carrying one, a generic failure for other JSON, and the bare
/// status otherwise.
pub fn status_message(status: u16, body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody { error: Some(msg) }) if !msg.is_empty() => msg,
        Ok(_) => GENERIC_FAILURE.to_string(),
        Err(_) => format!("Server error: {status}"),
    }
}

fn transport_failure(cancel: &CancelToken, detail: &str) -> FilterError {
    if cancel.is_expired() {
        cancel.timeout_error()
    } else {
        FilterError::Remote(detail.to_string())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
