//! Pure derivations over a review set.
//!
//! Everything here takes the current review slice (or the baseline document)
//! and returns fresh values; nothing is mutated and nothing is cached.

pub mod stats;

use serde::Serialize;

use crate::model::{BaselineDocument, Dimension, Review, Sentiment, SentimentCounts};

// ---------------------------------------------------------------------------
// Counts
// ---------------------------------------------------------------------------

/// Count reviews per overall sentiment. Unrecognized sentiments are skipped.
pub fn sentiment_counts(reviews: &[Review]) -> SentimentCounts {
    let mut counts = SentimentCounts::default();
    for sentiment in reviews.iter().filter_map(Review::sentiment) {
        counts.increment(sentiment);
    }
    counts
}

/// For each fixed dimension (in button order), the number of reviews whose
/// overall sentiment is `sentiment` and that carry a tag with that name.
pub fn dimension_counts(reviews: &[Review], sentiment: Sentiment) -> Vec<(Dimension, u64)> {
    Dimension::ALL
        .into_iter()
        .map(|dim| {
            let n = reviews
                .iter()
                .filter(|r| r.sentiment() == Some(sentiment) && r.mentions(dim.label()))
                .count();
            (dim, n as u64)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Review selection
// ---------------------------------------------------------------------------

/// Reviews shown for a sentiment / dimension selection, in input order.
///
/// Neutral and doubtful match on the review's overall sentiment plus any tag
/// with the dimension's name. Positive and negative match on a tag whose
/// name *and* tag-level sentiment both agree, regardless of the overall
/// sentiment.
pub fn filtered_reviews(
    reviews: &[Review],
    sentiment: Sentiment,
    dimension: Dimension,
) -> Vec<&Review> {
    let label = dimension.label();
    reviews
        .iter()
        .filter(|r| {
            if sentiment.matches_on_tag() {
                r.has_tag(label, sentiment)
            } else {
                r.sentiment() == Some(sentiment) && r.mentions(label)
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Chart data
// ---------------------------------------------------------------------------

/// Grouped bar chart data: one dataset per sentiment, one value per label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub datasets: Vec<ChartDataset>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartDataset {
    pub sentiment: Sentiment,
    pub label: &'static str,
    pub color: &'static str,
    pub data: Vec<u64>,
}

impl ChartSeries {
    /// Values for one sentiment, aligned with `labels`.
    pub fn values(&self, sentiment: Sentiment) -> &[u64] {
        self.datasets
            .iter()
            .find(|d| d.sentiment == sentiment)
            .map(|d| d.data.as_slice())
            .unwrap_or(&[])
    }
}

/// Per label and per sentiment, the number of reviews carrying a tag with
/// that label whose overall sentiment is that sentiment.
pub fn chart_series(reviews: &[Review], labels: &[String]) -> ChartSeries {
    let datasets = Sentiment::ALL
        .into_iter()
        .map(|sentiment| ChartDataset {
            sentiment,
            label: sentiment.title(),
            color: sentiment.color(),
            data: labels
                .iter()
                .map(|label| {
                    reviews
                        .iter()
                        .filter(|r| r.sentiment() == Some(sentiment) && r.mentions(label))
                        .count() as u64
                })
                .collect(),
        })
        .collect();

    ChartSeries {
        labels: labels.to_vec(),
        datasets,
    }
}

/// Doughnut chart data: one slice per sentiment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Distribution {
    pub slices: Vec<Slice>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slice {
    pub sentiment: Sentiment,
    pub label: &'static str,
    pub color: &'static str,
    pub count: u64,
}

impl Distribution {
    pub fn count(&self, sentiment: Sentiment) -> u64 {
        self.slices
            .iter()
            .find(|s| s.sentiment == sentiment)
            .map_or(0, |s| s.count)
    }
}

/// Sentiment distribution from the baseline document's precomputed counts.
///
/// Unlike the bar chart this never follows the date filter: it always shows
/// the whole dataset.
pub fn sentiment_distribution(doc: &BaselineDocument) -> Distribution {
    let counts = doc
        .summary_statistics
        .as_ref()
        .map(|s| s.sentiment_distribution.counts)
        .unwrap_or_default();
    Distribution {
        slices: Sentiment::ALL
            .into_iter()
            .map(|sentiment| Slice {
                sentiment,
                label: sentiment.title(),
                color: sentiment.color(),
                count: counts.get(sentiment),
            })
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn review(sentiment: &str, tags: &[(&str, &str)]) -> Review {
        let dims: Vec<_> = tags
            .iter()
            .map(|(name, s)| json!({"name": name, "sentiment": s}))
            .collect();
        serde_json::from_value(json!({
            "analysis": {"sentiment": sentiment, "dimensions": dims}
        }))
        .unwrap()
    }

    #[test]
    fn counts_skip_unknown_sentiments() {
        let reviews = vec![
            review("positive", &[]),
            review("positive", &[]),
            review("doubtful", &[]),
            review("mixed", &[]),
        ];
        let counts = sentiment_counts(&reviews);

        assert_eq!(counts.positive, 2);
        assert_eq!(counts.doubtful, 1);
        assert_eq!(counts.total(), 3);
    }

    #[test]
    fn dimension_counts_use_overall_sentiment() {
        let reviews = vec![
            review("positive", &[("Clinical Care", "negative")]),
            review("negative", &[("Clinical Care", "negative")]),
        ];
        let counts = dimension_counts(&reviews, Sentiment::Positive);

        assert_eq!(counts.len(), 5);
        assert_eq!(counts[3], (Dimension::ClinicalCare, 1));
        assert_eq!(counts[0], (Dimension::ServiceQuality, 0));
    }

    #[test]
    fn positive_selection_matches_on_tag_sentiment() {
        let r = review("negative", &[("Service Quality", "positive")]);
        let reviews = vec![r];

        assert_eq!(
            filtered_reviews(&reviews, Sentiment::Positive, Dimension::ServiceQuality).len(),
            1
        );
        assert!(filtered_reviews(&reviews, Sentiment::Negative, Dimension::ServiceQuality).is_empty());
    }

    #[test]
    fn neutral_selection_matches_on_overall_sentiment() {
        let reviews = vec![
            review("neutral", &[("Operations", "negative")]),
            review("positive", &[("Operations", "neutral")]),
        ];
        let hits = filtered_reviews(&reviews, Sentiment::Neutral, Dimension::Operations);

        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].sentiment(), Some(Sentiment::Neutral));
    }

    #[test]
    fn chart_series_covers_every_sentiment() {
        let reviews = vec![
            review("positive", &[("Service Quality", "positive")]),
            review("doubtful", &[("Service Quality", "neutral"), ("Operations", "neutral")]),
        ];
        let labels = vec!["Service Quality".to_string(), "Operations".to_string()];
        let chart = chart_series(&reviews, &labels);

        assert_eq!(chart.datasets.len(), 4);
        assert_eq!(chart.values(Sentiment::Positive), &[1, 0]);
        assert_eq!(chart.values(Sentiment::Doubtful), &[1, 1]);
        assert_eq!(chart.values(Sentiment::Negative), &[0, 0]);
    }

    #[test]
    fn distribution_without_statistics_is_zero() {
        let doc = BaselineDocument::default();
        let dist = sentiment_distribution(&doc);
        assert_eq!(dist.slices.len(), 4);
        assert_eq!(dist.count(Sentiment::Positive), 0);
    }
}
