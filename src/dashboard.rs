//! Dashboard state: the baseline document, the current dataset and the two
//! selectors, and the derivation of a [`DashboardView`] from them.

use crate::aggregate;
use crate::dataset::DatasetView;
use crate::model::{BaselineDocument, Dimension, Review, Sentiment};
use crate::utils::dates;
use crate::view::{
    DashboardView, DimensionButton, FilterStatus, InsightsPanel, OverallSummary, ReviewCard,
    ReviewList, SentimentCard, ViewRenderer,
};

/// Default number of review cards shown.
pub const DEFAULT_DISPLAY_CAP: usize = 50;

/// Number of themes listed under the overall summary.
const THEMES_SHOWN: usize = 5;

/// Current sentiment / dimension selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    pub sentiment: Sentiment,
    pub dimension: Dimension,
}

/// Explicit holder for everything the page derives its view from.
pub struct Dashboard {
    document: BaselineDocument,
    dataset: DatasetView,
    selection: Selection,
    display_cap: usize,
}

impl Dashboard {
    /// Build from a loaded document. The reviews and dimension summaries
    /// move into the [`DatasetView`] as its baseline.
    pub fn new(mut document: BaselineDocument) -> Self {
        let reviews = std::mem::take(&mut document.analyzed_reviews);
        let summaries = std::mem::take(&mut document.dimension_summaries);
        Self {
            document,
            dataset: DatasetView::new(reviews, summaries),
            selection: Selection::default(),
            display_cap: DEFAULT_DISPLAY_CAP,
        }
    }

    pub fn with_display_cap(mut self, cap: usize) -> Self {
        self.display_cap = cap;
        self
    }

    pub fn document(&self) -> &BaselineDocument {
        &self.document
    }

    pub fn dataset(&self) -> &DatasetView {
        &self.dataset
    }

    pub fn dataset_mut(&mut self) -> &mut DatasetView {
        &mut self.dataset
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Change the sentiment selector. The dataset is untouched.
    pub fn select_sentiment(&mut self, sentiment: Sentiment) {
        self.selection.sentiment = sentiment;
    }

    /// Change the dimension selector. The dataset is untouched.
    pub fn select_dimension(&mut self, dimension: Dimension) {
        self.selection.dimension = dimension;
    }

    /// Reviews matching the current selection over the current dataset.
    pub fn selected_reviews(&self) -> Vec<&Review> {
        aggregate::filtered_reviews(
            self.dataset.current_reviews(),
            self.selection.sentiment,
            self.selection.dimension,
        )
    }

    /// Derive the full view for the current state.
    pub fn view(&self) -> DashboardView {
        let Selection {
            sentiment,
            dimension,
        } = self.selection;
        let reviews = self.dataset.current_reviews();
        let stats = self.document.statistics();
        let tagged = sentiment.matches_on_tag();

        let counts = aggregate::sentiment_counts(reviews);
        let percentages = counts.percentages(reviews.len() as u64);
        let cards = Sentiment::ALL
            .into_iter()
            .map(|s| SentimentCard {
                sentiment: s,
                label: s.title(),
                count: counts.get(s),
                percentage: percentages.get(s),
                active: s == sentiment,
            })
            .collect();

        let dimension_buttons = aggregate::dimension_counts(reviews, sentiment)
            .into_iter()
            .map(|(dim, count)| DimensionButton {
                dimension: dim,
                label: dim.label(),
                count,
                active: dim == dimension,
            })
            .collect();

        let block = self
            .dataset
            .current_dimension_summaries()
            .block(dimension.label(), sentiment)
            .cloned()
            .unwrap_or_default();
        let insights = InsightsPanel {
            visible: tagged,
            dimension,
            sentiment,
            summary: block
                .summary
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "\u{2014}".to_string()),
            key_insights: block.key_insights,
            recommendations: block.recommendations,
        };

        let selected = self.selected_reviews();
        let list = ReviewList {
            total: selected.len(),
            cards: selected
                .into_iter()
                .take(self.display_cap)
                .map(review_card)
                .collect(),
        };

        let labels: Vec<String> = stats.top_dimensions.iter().map(|(l, _)| l.clone()).collect();

        DashboardView {
            total_reviews: self.document.metadata.total_reviews,
            sentiment,
            dimension,
            cards,
            overall: OverallSummary {
                sentiment,
                lines: self.overall_lines(sentiment),
                top_themes: stats.top_themes.iter().take(THEMES_SHOWN).cloned().collect(),
                visible: tagged,
            },
            dimension_buttons,
            insights,
            reviews: list,
            bar_chart: aggregate::chart_series(reviews, &labels),
            doughnut: aggregate::sentiment_distribution(&self.document),
            status: self.status(),
        }
    }

    /// Derive and draw the current view.
    pub fn refresh(&self, renderer: &mut dyn ViewRenderer) {
        renderer.render_view(&self.view());
    }

    fn overall_lines(&self, sentiment: Sentiment) -> Vec<String> {
        match self.document.sentiment_summary(sentiment) {
            Some(s) => match (&s.key_insights, &s.summary) {
                (Some(insights), _) => insights.clone(),
                (None, Some(line)) if !line.is_empty() => vec![line.clone()],
                _ => Vec::new(),
            },
            None => Vec::new(),
        }
    }

    fn status(&self) -> FilterStatus {
        match self.dataset.active_range() {
            Some(range) => FilterStatus {
                active: true,
                text: format!(
                    "Showing {} reviews from {} to {}",
                    self.dataset.current_reviews().len(),
                    range.start_raw,
                    range.end_raw
                ),
            },
            None => FilterStatus::default(),
        }
    }
}

fn review_card(review: &Review) -> ReviewCard {
    ReviewCard {
        author: review
            .author
            .clone()
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| "Anonymous".to_string()),
        rating: review.rating,
        text: review.text.clone().filter(|t| !t.is_empty()),
        date: review
            .date
            .as_deref()
            .map(dates::format_display_date)
            .unwrap_or_default(),
        images: review.images.clone(),
        key_insights: review.analysis.key_insights.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::range::validate;
    use crate::model::DimensionSummaries;
    use serde_json::json;

    fn document() -> BaselineDocument {
        serde_json::from_value(json!({
            "metadata": {"total_reviews": 3},
            "summary_statistics": {
                "sentiment_distribution": {"counts": {"positive": 2, "negative": 1}},
                "top_themes": [["a", 6], ["b", 5], ["c", 4], ["d", 3], ["e", 2], ["f", 1]],
                "top_dimensions": [["Service Quality", 3], ["Operations", 1]]
            },
            "sentiment_summaries": {
                "positive": {"summary": "Good", "key_insights": ["x", "y"]},
                "negative": {"summary": "Bad"}
            },
            "dimension_summaries": {
                "Service Quality": {"positive": {"summary": "Kind staff", "recommendations": ["keep"]}}
            },
            "analyzed_reviews": [
                {"author": "A", "date": "2024-01-10", "analysis": {"sentiment": "positive",
                    "dimensions": [{"name": "Service Quality", "sentiment": "positive"}]}},
                {"date": "2024-03-05", "analysis": {"sentiment": "positive",
                    "dimensions": [{"name": "Operations", "sentiment": "positive"}]}},
                {"author": "", "date": "2024-06-01", "analysis": {"sentiment": "negative",
                    "dimensions": [{"name": "Service Quality", "sentiment": "negative"}]}}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn initial_view_uses_defaults() {
        let dash = Dashboard::new(document());
        let view = dash.view();

        assert_eq!(view.sentiment, Sentiment::Positive);
        assert_eq!(view.dimension, Dimension::ServiceQuality);
        assert_eq!(view.total_reviews, Some(3));
        assert_eq!(view.cards[0].count, 2);
        assert_eq!(view.cards[0].percentage, 66.67);
        assert_eq!(view.overall.lines, vec!["x", "y"]);
        assert_eq!(view.overall.top_themes.len(), 5);
        assert_eq!(view.insights.summary, "Kind staff");
        assert_eq!(view.reviews.total, 1);
        assert_eq!(view.reviews.cards[0].date, "January 10, 2024");
        assert!(!view.status.active);
    }

    #[test]
    fn missing_block_shows_dash_and_summary_line_fallback() {
        let mut dash = Dashboard::new(document());
        dash.select_sentiment(Sentiment::Negative);
        let view = dash.view();

        assert_eq!(view.insights.summary, "\u{2014}");
        assert_eq!(view.overall.lines, vec!["Bad"]);
        assert_eq!(view.reviews.cards[0].author, "Anonymous");
    }

    #[test]
    fn neutral_hides_insights_panel() {
        let mut dash = Dashboard::new(document());
        dash.select_sentiment(Sentiment::Neutral);
        let view = dash.view();

        assert!(!view.insights.visible);
        assert!(!view.overall.visible);
    }

    #[test]
    fn selector_changes_do_not_touch_dataset() {
        let mut dash = Dashboard::new(document());
        let before = dash.dataset().generation();
        dash.select_dimension(Dimension::Operations);
        dash.select_sentiment(Sentiment::Negative);

        assert_eq!(dash.dataset().generation(), before);
        assert!(!dash.dataset().is_filter_active());
    }

    #[test]
    fn override_drives_counts_but_not_doughnut() {
        let mut dash = Dashboard::new(document());
        let filtered = dash.dataset().baseline_reviews()[..1].to_vec();
        let range = validate("2024-01-01", "2024-01-31").unwrap();
        dash.dataset_mut()
            .apply_override(filtered, DimensionSummaries::default(), range);
        let view = dash.view();

        assert_eq!(view.cards[0].count, 1);
        assert_eq!(view.cards[0].percentage, 100.0);
        assert_eq!(view.doughnut.count(Sentiment::Positive), 2);
        assert_eq!(view.bar_chart.values(Sentiment::Positive), &[1, 0]);
        assert_eq!(view.status.text, "Showing 1 reviews from 2024-01-01 to 2024-01-31");
        assert_eq!(view.insights.summary, "\u{2014}");
    }

    #[test]
    fn review_list_is_capped() {
        let mut doc = document();
        let template = doc.analyzed_reviews[0].clone();
        doc.analyzed_reviews = vec![template; 60];
        let view = Dashboard::new(doc).with_display_cap(50).view();

        assert_eq!(view.reviews.total, 60);
        assert_eq!(view.reviews.cards.len(), 50);
    }
}
