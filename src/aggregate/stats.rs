//! Whole-dataset summary statistics, for documents that ship without them.

use std::collections::{BTreeMap, HashMap};

use crate::model::document::round2;
use crate::model::{Review, Sentiment, SummaryStatistics};

use super::sentiment_counts;

/// Number of themes kept in `top_themes`.
const TOP_THEMES: usize = 10;

/// Number of dimensions kept in `top_dimensions`.
const TOP_DIMENSIONS: usize = 5;

/// Severity at or above which a negative review counts as high severity.
const HIGH_SEVERITY: f64 = 4.0;

/// Compute summary statistics over `reviews`.
///
/// Percentages are against the full review count, so reviews with an
/// unrecognized sentiment lower every share. Ties in theme and dimension
/// ranking keep first-seen order.
pub fn summary_statistics(reviews: &[Review]) -> SummaryStatistics {
    let total = reviews.len() as u64;
    if total == 0 {
        return SummaryStatistics::default();
    }

    let counts = sentiment_counts(reviews);

    let mut themes = Tally::default();
    let mut dimensions = Tally::default();
    let mut scores = Vec::new();
    let mut severities = Vec::new();
    let mut ratings: BTreeMap<String, u64> = (1..=5).map(|k| (k.to_string(), 0)).collect();
    let mut rating_sum = 0u64;

    for review in reviews {
        let analysis = &review.analysis;

        for theme in &analysis.key_themes {
            themes.add(theme);
        }
        for tag in &analysis.dimensions {
            if !tag.name.is_empty() {
                dimensions.add(&tag.name);
            }
        }
        if let Some(score) = analysis.sentiment_score {
            scores.push(score);
        }
        if review.sentiment() == Some(Sentiment::Negative)
            && let Some(severity) = analysis.severity
        {
            severities.push(severity);
        }
        if let Some(rating) = review.rating
            && rating.fract() == 0.0
            && (1.0..=5.0).contains(&rating)
        {
            let stars = rating as u64;
            *ratings.entry(stars.to_string()).or_default() += 1;
            rating_sum += stars;
        }
    }

    let mut stats = SummaryStatistics {
        top_themes: themes.top(TOP_THEMES),
        top_dimensions: dimensions.top(TOP_DIMENSIONS),
        rating_distribution: ratings,
        average_rating: round2(rating_sum as f64 / total as f64),
        average_sentiment_score: mean(&scores).map_or(0.0, |m| (m * 1000.0).round() / 1000.0),
        average_severity: mean(&severities).map_or(0.0, round2),
        high_severity_count: severities.iter().filter(|&&s| s >= HIGH_SEVERITY).count() as u64,
        ..Default::default()
    };
    stats.sentiment_distribution.counts = counts;
    stats.sentiment_distribution.percentages = counts.percentages(total);
    stats
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Insertion-ordered frequency counter.
#[derive(Default)]
struct Tally {
    order: Vec<String>,
    counts: HashMap<String, u64>,
}

impl Tally {
    fn add(&mut self, key: &str) {
        let count = self.counts.entry(key.to_string()).or_insert_with(|| {
            self.order.push(key.to_string());
            0
        });
        *count += 1;
    }

    /// The `n` most frequent keys; a stable sort keeps first-seen order on ties.
    fn top(&self, n: usize) -> Vec<(String, u64)> {
        let mut ranked: Vec<(String, u64)> = self
            .order
            .iter()
            .map(|k| (k.clone(), self.counts.get(k).copied().unwrap_or(0)))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(n);
        ranked
    }
}
