//! The baseline analysis document and the summary structures it carries.
//!
//! Every section is optional on the wire. A document without
//! `summary_statistics` gets them recomputed from `analyzed_reviews` at load
//! time (see [`BaselineDocument::ensure_statistics`]).

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::labels::Sentiment;
use super::review::{Review, null_as_default};
use crate::aggregate::stats;

/// Timeout for fetching a baseline document over HTTP.
const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// The full precomputed analysis loaded once at startup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BaselineDocument {
    #[serde(default, deserialize_with = "null_as_default")]
    pub metadata: Metadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary_statistics: Option<SummaryStatistics>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sentiment_summaries: BTreeMap<String, SentimentSummary>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub dimension_summaries: DimensionSummaries,
    #[serde(default, deserialize_with = "null_as_default")]
    pub analyzed_reviews: Vec<Review>,
}

/// Document metadata. Only `total_reviews` is interpreted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_reviews: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Whole-dataset narrative for one sentiment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SentimentSummary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_insights: Option<Vec<String>>,
}

impl BaselineDocument {
    /// Load from a file path or an `http(s)://` URL, recomputing summary
    /// statistics when the document does not carry them.
    pub fn load(source: &str) -> Result<Self> {
        let mut doc = if source.starts_with("http://") || source.starts_with("https://") {
            Self::fetch(source)?
        } else {
            Self::from_path(Path::new(source))?
        };
        doc.ensure_statistics();
        Ok(doc)
    }

    /// Read and parse a document from disk.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read baseline {}", path.display()))?;
        Self::from_json(&content)
            .with_context(|| format!("failed to parse baseline {}", path.display()))
    }

    /// Parse a document from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("invalid baseline document")
    }

    fn fetch(url: &str) -> Result<Self> {
        let resp = ureq::get(url)
            .timeout(FETCH_TIMEOUT)
            .call()
            .with_context(|| format!("failed to fetch baseline from {url}"))?;
        resp.into_json()
            .with_context(|| format!("failed to parse baseline from {url}"))
    }

    /// Fill in `summary_statistics` from the reviews if it is missing or has
    /// no sentiment counts at all.
    pub fn ensure_statistics(&mut self) {
        let missing = match &self.summary_statistics {
            None => true,
            Some(s) => s.sentiment_distribution.counts.total() == 0,
        };
        if missing && !self.analyzed_reviews.is_empty() {
            self.summary_statistics = Some(stats::summary_statistics(&self.analyzed_reviews));
        }
    }

    /// Summary statistics, or an empty set when there are none.
    pub fn statistics(&self) -> SummaryStatistics {
        self.summary_statistics.clone().unwrap_or_default()
    }

    /// Baseline overall summary for a sentiment.
    pub fn sentiment_summary(&self, sentiment: Sentiment) -> Option<&SentimentSummary> {
        self.sentiment_summaries.get(sentiment.as_str())
    }
}

// ---------------------------------------------------------------------------
// Summary statistics
// ---------------------------------------------------------------------------

/// Precomputed whole-dataset statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryStatistics {
    #[serde(default)]
    pub sentiment_distribution: SentimentDistribution,
    /// `[theme, count]` pairs, most frequent first.
    #[serde(default, deserialize_with = "null_as_default")]
    pub top_themes: Vec<(String, u64)>,
    /// `[dimension, count]` pairs, most mentioned first.
    #[serde(default, deserialize_with = "null_as_default")]
    pub top_dimensions: Vec<(String, u64)>,
    /// Star rating (`"1"`..`"5"`) to count.
    #[serde(default, deserialize_with = "null_as_default")]
    pub rating_distribution: BTreeMap<String, u64>,
    #[serde(default)]
    pub average_rating: f64,
    #[serde(default)]
    pub average_sentiment_score: f64,
    #[serde(default)]
    pub average_severity: f64,
    #[serde(default)]
    pub high_severity_count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SentimentDistribution {
    #[serde(default)]
    pub counts: SentimentCounts,
    #[serde(default)]
    pub percentages: SentimentPercentages,
}

/// Number of reviews per sentiment. Reviews with no recognized sentiment are
/// not counted anywhere.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentCounts {
    #[serde(default)]
    pub positive: u64,
    #[serde(default)]
    pub negative: u64,
    #[serde(default)]
    pub neutral: u64,
    #[serde(default)]
    pub doubtful: u64,
}

impl SentimentCounts {
    pub fn get(&self, sentiment: Sentiment) -> u64 {
        match sentiment {
            Sentiment::Positive => self.positive,
            Sentiment::Negative => self.negative,
            Sentiment::Neutral => self.neutral,
            Sentiment::Doubtful => self.doubtful,
        }
    }

    pub fn increment(&mut self, sentiment: Sentiment) {
        match sentiment {
            Sentiment::Positive => self.positive += 1,
            Sentiment::Negative => self.negative += 1,
            Sentiment::Neutral => self.neutral += 1,
            Sentiment::Doubtful => self.doubtful += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.positive + self.negative + self.neutral + self.doubtful
    }

    /// Share of each sentiment in percent, rounded to 2 decimals, against
    /// `total` reviews. All zero when `total` is zero.
    pub fn percentages(&self, total: u64) -> SentimentPercentages {
        let pct = |count: u64| {
            if total == 0 {
                0.0
            } else {
                round2(count as f64 / total as f64 * 100.0)
            }
        };
        SentimentPercentages {
            positive: pct(self.positive),
            negative: pct(self.negative),
            neutral: pct(self.neutral),
            doubtful: pct(self.doubtful),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SentimentPercentages {
    #[serde(default)]
    pub positive: f64,
    #[serde(default)]
    pub negative: f64,
    #[serde(default)]
    pub neutral: f64,
    #[serde(default)]
    pub doubtful: f64,
}

impl SentimentPercentages {
    pub fn get(&self, sentiment: Sentiment) -> f64 {
        match sentiment {
            Sentiment::Positive => self.positive,
            Sentiment::Negative => self.negative,
            Sentiment::Neutral => self.neutral,
            Sentiment::Doubtful => self.doubtful,
        }
    }
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// ---------------------------------------------------------------------------
// Dimension summaries
// ---------------------------------------------------------------------------

/// Dimension name to sentiment label to narrative block.
///
/// Both the baseline document and the remote service produce this shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DimensionSummaries(pub BTreeMap<String, BTreeMap<String, SentimentBlock>>);

impl DimensionSummaries {
    /// The block for one dimension / sentiment pair, if present.
    pub fn block(&self, dimension: &str, sentiment: Sentiment) -> Option<&SentimentBlock> {
        self.0.get(dimension)?.get(sentiment.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Narrative for one dimension under one sentiment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SentimentBlock {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub key_insights: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub recommendations: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_count: Option<u64>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
