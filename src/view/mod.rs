//! Plain-data view model and the renderer seam.
//!
//! A [`DashboardView`] is everything the page shows, already derived. A
//! [`ViewRenderer`] takes those pieces and draws them; it never reaches back
//! into dashboard state.

pub mod snapshot;
pub mod terminal;

use serde::Serialize;

use crate::aggregate::{ChartSeries, Distribution};
use crate::model::{Dimension, Sentiment};

/// Canvas id of the per-dimension bar chart.
pub const BAR_CANVAS: &str = "barChart";

/// Canvas id of the sentiment doughnut.
pub const DOUGHNUT_CANVAS: &str = "pieChart";

// ---------------------------------------------------------------------------
// View model
// ---------------------------------------------------------------------------

/// One fully derived dashboard frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    /// `metadata.total_reviews` of the baseline; `None` renders as "-".
    pub total_reviews: Option<u64>,
    pub sentiment: Sentiment,
    pub dimension: Dimension,
    pub cards: Vec<SentimentCard>,
    pub overall: OverallSummary,
    pub dimension_buttons: Vec<DimensionButton>,
    pub insights: InsightsPanel,
    pub reviews: ReviewList,
    pub bar_chart: ChartSeries,
    pub doughnut: Distribution,
    pub status: FilterStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentimentCard {
    pub sentiment: Sentiment,
    pub label: &'static str,
    pub count: u64,
    pub percentage: f64,
    pub active: bool,
}

/// Baseline narrative for the selected sentiment plus the top themes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverallSummary {
    pub sentiment: Sentiment,
    pub lines: Vec<String>,
    pub top_themes: Vec<(String, u64)>,
    /// Hidden (space kept) for neutral and doubtful.
    pub visible: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DimensionButton {
    pub dimension: Dimension,
    pub label: &'static str,
    pub count: u64,
    pub active: bool,
}

/// Dimension summary block for the current selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsightsPanel {
    pub visible: bool,
    pub dimension: Dimension,
    pub sentiment: Sentiment,
    /// Block summary, or `"-"` when there is none.
    pub summary: String,
    pub key_insights: Vec<String>,
    pub recommendations: Vec<String>,
}

/// The displayed slice of the selected reviews.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewList {
    /// Number of reviews matching the selection, before the display cap.
    pub total: usize,
    pub cards: Vec<ReviewCard>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewCard {
    pub author: String,
    pub rating: Option<f64>,
    pub text: Option<String>,
    pub date: String,
    pub images: Vec<String>,
    pub key_insights: Vec<String>,
}

/// Filter status line.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterStatus {
    pub active: bool,
    /// `"Showing N reviews from S to E"` while a filter is active.
    pub text: String,
}

/// Data for one chart canvas.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Chart {
    Bar(ChartSeries),
    Doughnut(Distribution),
}

// ---------------------------------------------------------------------------
// Renderer seam
// ---------------------------------------------------------------------------

/// Draws view-model pieces onto some surface.
pub trait ViewRenderer {
    fn show_busy(&mut self);
    fn hide_busy(&mut self);
    fn render_status(&mut self, status: &FilterStatus);
    fn render_counts(&mut self, total_reviews: Option<u64>, cards: &[SentimentCard]);
    fn render_overall_summary(&mut self, overall: &OverallSummary);
    fn render_dimension_buttons(&mut self, buttons: &[DimensionButton]);
    fn render_insights(&mut self, panel: &InsightsPanel);
    fn render_review_list(&mut self, list: &ReviewList);
    fn render_chart(&mut self, canvas_id: &str, chart: &Chart);
    fn render_error(&mut self, message: &str);
    fn render_notice(&mut self, message: &str);

    /// Draw a whole frame, top of the page first.
    fn render_view(&mut self, view: &DashboardView) {
        self.render_status(&view.status);
        self.render_counts(view.total_reviews, &view.cards);
        self.render_overall_summary(&view.overall);
        self.render_dimension_buttons(&view.dimension_buttons);
        self.render_insights(&view.insights);
        self.render_review_list(&view.reviews);
        self.render_chart(BAR_CANVAS, &Chart::Bar(view.bar_chart.clone()));
        self.render_chart(DOUGHNUT_CANVAS, &Chart::Doughnut(view.doughnut.clone()));
    }
}
