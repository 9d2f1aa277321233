//! Recording renderer.
//!
//! Keeps every call in order so the web API can report what a workflow
//! drew (errors, notices, busy transitions) and tests can assert on it.

use serde::Serialize;

use super::{
    Chart, DimensionButton, FilterStatus, InsightsPanel, OverallSummary, ReviewList,
    SentimentCard, ViewRenderer,
};

/// One recorded renderer call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RenderEvent {
    ShowBusy,
    HideBusy,
    Status { text: String, active: bool },
    Counts { counts: Vec<u64> },
    OverallSummary { lines: Vec<String> },
    DimensionButtons { counts: Vec<u64> },
    Insights { summary: String, visible: bool },
    ReviewList { total: usize, shown: usize },
    Chart { canvas_id: String },
    Error { message: String },
    Notice { message: String },
}

#[derive(Debug, Default)]
pub struct SnapshotRenderer {
    events: Vec<RenderEvent>,
    busy: bool,
    last_chart: Option<(String, Chart)>,
}

impl SnapshotRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[RenderEvent] {
        &self.events
    }

    /// Whether the busy indicator is currently shown.
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn errors(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                RenderEvent::Error { message } => Some(message.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn notices(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                RenderEvent::Notice { message } => Some(message.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Index of the first event equal to `event`.
    pub fn position(&self, event: &RenderEvent) -> Option<usize> {
        self.events.iter().position(|e| e == event)
    }

    /// Whether a full frame (status line onwards) was drawn.
    pub fn rendered_view(&self) -> bool {
        self.events
            .iter()
            .any(|e| matches!(e, RenderEvent::Chart { .. }))
    }

    pub fn last_chart(&self) -> Option<&(String, Chart)> {
        self.last_chart.as_ref()
    }

    pub fn clear(&mut self) {
        self.events.clear();
        self.last_chart = None;
    }
}

impl ViewRenderer for SnapshotRenderer {
    fn show_busy(&mut self) {
        self.busy = true;
        self.events.push(RenderEvent::ShowBusy);
    }

    fn hide_busy(&mut self) {
        self.busy = false;
        self.events.push(RenderEvent::HideBusy);
    }

    fn render_status(&mut self, status: &FilterStatus) {
        self.events.push(RenderEvent::Status {
            text: status.text.clone(),
            active: status.active,
        });
    }

    fn render_counts(&mut self, _total_reviews: Option<u64>, cards: &[SentimentCard]) {
        self.events.push(RenderEvent::Counts {
            counts: cards.iter().map(|c| c.count).collect(),
        });
    }

    fn render_overall_summary(&mut self, overall: &OverallSummary) {
        self.events.push(RenderEvent::OverallSummary {
            lines: overall.lines.clone(),
        });
    }

    fn render_dimension_buttons(&mut self, buttons: &[DimensionButton]) {
        self.events.push(RenderEvent::DimensionButtons {
            counts: buttons.iter().map(|b| b.count).collect(),
        });
    }

    fn render_insights(&mut self, panel: &InsightsPanel) {
        self.events.push(RenderEvent::Insights {
            summary: panel.summary.clone(),
            visible: panel.visible,
        });
    }

    fn render_review_list(&mut self, list: &ReviewList) {
        self.events.push(RenderEvent::ReviewList {
            total: list.total,
            shown: list.cards.len(),
        });
    }

    fn render_chart(&mut self, canvas_id: &str, chart: &Chart) {
        self.events.push(RenderEvent::Chart {
            canvas_id: canvas_id.to_string(),
        });
        self.last_chart = Some((canvas_id.to_string(), chart.clone()));
    }

    fn render_error(&mut self, message: &str) {
        self.events.push(RenderEvent::Error {
            message: message.to_string(),
        });
    }

    fn render_notice(&mut self, message: &str) {
        self.events.push(RenderEvent::Notice {
            message: message.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_busy_state_and_messages() {
        let mut r = SnapshotRenderer::new();
        r.show_busy();
        assert!(r.is_busy());
        r.render_error("boom");
        r.hide_busy();

        assert!(!r.is_busy());
        assert_eq!(r.errors(), vec!["boom"]);
        assert!(r.position(&RenderEvent::ShowBusy) < r.position(&RenderEvent::HideBusy));
        assert!(!r.rendered_view());
    }
}
