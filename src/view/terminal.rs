//! Colored terminal rendering for `revlens summary` and filter commands.

use std::io::{self, Write};

use colored::Colorize;

use super::{
    Chart, DimensionButton, FilterStatus, InsightsPanel, OverallSummary, ReviewList,
    SentimentCard, ViewRenderer,
};
use crate::model::Sentiment;

/// Width of the longest bar in terminal charts.
const BAR_WIDTH: u64 = 30;

/// Review text longer than this is cut in the list.
const TEXT_PREVIEW: usize = 160;

/// Renders to any writer; write failures are ignored like a closed pipe.
pub struct TerminalRenderer<W: Write = io::Stdout> {
    out: W,
    reviews_shown: Option<usize>,
}

impl TerminalRenderer<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            reviews_shown: None,
        }
    }

    /// Cap the number of review cards printed (below the view's own cap).
    pub fn with_review_limit(mut self, limit: usize) -> Self {
        self.reviews_shown = Some(limit);
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, text: impl std::fmt::Display) {
        let _ = writeln!(self.out, "{text}");
    }

    fn heading(&mut self, title: &str) {
        self.line("");
        self.line(title.bold().cyan());
        self.line("=".repeat(60));
    }
}

impl<W: Write> ViewRenderer for TerminalRenderer<W> {
    fn show_busy(&mut self) {
        self.line("Generating summaries...".dimmed());
    }

    fn hide_busy(&mut self) {}

    fn render_status(&mut self, status: &FilterStatus) {
        if status.active {
            self.line(format!("  {}", status.text).green());
        } else {
            self.line("  Showing all reviews".dimmed());
        }
    }

    fn render_counts(&mut self, total_reviews: Option<u64>, cards: &[SentimentCard]) {
        self.heading("Sentiment");
        let total = total_reviews.map_or_else(|| "\u{2014}".to_string(), |n| n.to_string());
        self.line(format!("  {} {}", "Total reviews:".bold(), total));
        for card in cards {
            let marker = if card.active { "\u{25b8}" } else { " " };
            let label = colorize_sentiment(card.sentiment, &format!("{:<9}", card.label));
            self.line(format!(
                "  {marker} {label} {:>6}  {:>6.2}%",
                card.count, card.percentage
            ));
        }
    }

    fn render_overall_summary(&mut self, overall: &OverallSummary) {
        if overall.visible {
            self.heading(&format!("Overall {} Summary", overall.sentiment.title()));
            for line in &overall.lines {
                self.line(format!("  \u{2022} {line}"));
            }
        }
        if !overall.top_themes.is_empty() {
            self.heading("Top Themes");
            for (theme, count) in &overall.top_themes {
                self.line(format!("  {theme} ({count})"));
            }
        }
    }

    fn render_dimension_buttons(&mut self, buttons: &[DimensionButton]) {
        self.heading("Dimensions");
        for b in buttons {
            let text = format!("{:<22} ({})", b.label, b.count);
            if b.active {
                self.line(format!("  \u{25b8} {}", text.bold()));
            } else {
                self.line(format!("    {text}"));
            }
        }
    }

    fn render_insights(&mut self, panel: &InsightsPanel) {
        if !panel.visible {
            return;
        }
        self.heading(&format!(
            "{} \u{00b7} {}",
            panel.dimension.label(),
            panel.sentiment.title()
        ));
        self.line(format!("  {}", panel.summary));
        if !panel.key_insights.is_empty() {
            self.line("  Key insights:".bold());
            for k in &panel.key_insights {
                self.line(format!("    \u{2022} {k}"));
            }
        }
        if !panel.recommendations.is_empty() {
            self.line("  Recommendations:".bold());
            for r in &panel.recommendations {
                self.line(format!("    \u{2022} {r}"));
            }
        }
    }

    fn render_review_list(&mut self, list: &ReviewList) {
        self.heading(&format!("Reviews ({})", list.total));
        if list.cards.is_empty() {
            self.line("  No reviews found.".dimmed());
            return;
        }
        let limit = self.reviews_shown.unwrap_or(list.cards.len());
        for (i, card) in list.cards.iter().take(limit).enumerate() {
            let rating = card.rating.map(format_rating).unwrap_or_default();
            self.line(format!(
                "  {} {} {}",
                card.author.bold(),
                format!("{rating} \u{2605}").yellow(),
                card.date.dimmed()
            ));
            let text = match &card.text {
                Some(t) => truncate(t, TEXT_PREVIEW),
                None => "(no text)".to_string(),
            };
            if i % 2 == 0 {
                self.line(format!("    {text}"));
            } else {
                self.line(format!("    {}", text.dimmed()));
            }
            if !card.images.is_empty() {
                self.line(format!("    Attached Images ({})", card.images.len()).dimmed());
            }
        }
        let shown = limit.min(list.cards.len());
        if list.total > shown {
            self.line(format!("  ... {} more", list.total - shown).dimmed());
        }
    }

    fn render_chart(&mut self, _canvas_id: &str, chart: &Chart) {
        match chart {
            Chart::Bar(series) => {
                self.heading("Dimensions by Sentiment");
                let max = series
                    .datasets
                    .iter()
                    .flat_map(|d| d.data.iter().copied())
                    .max()
                    .unwrap_or(0);
                for (i, label) in series.labels.iter().enumerate() {
                    self.line(format!("  {}", label.bold()));
                    for ds in &series.datasets {
                        let value = ds.data.get(i).copied().unwrap_or(0);
                        let bar = colorize_sentiment(ds.sentiment, &bar(value, max));
                        self.line(format!("    {:<9} {bar} {value}", ds.label));
                    }
                }
            }
            Chart::Doughnut(dist) => {
                self.heading("Overall Sentiment Distribution");
                let max = dist.slices.iter().map(|s| s.count).max().unwrap_or(0);
                for slice in &dist.slices {
                    let bar = colorize_sentiment(slice.sentiment, &bar(slice.count, max));
                    self.line(format!("  {:<9} {bar} {}", slice.label, slice.count));
                }
            }
        }
    }

    fn render_error(&mut self, message: &str) {
        let _ = writeln!(self.out, "{} {}", "error:".red().bold(), message);
    }

    fn render_notice(&mut self, message: &str) {
        self.line(message.yellow());
    }
}

fn colorize_sentiment(sentiment: Sentiment, text: &str) -> colored::ColoredString {
    match sentiment {
        Sentiment::Positive => text.green(),
        Sentiment::Negative => text.red(),
        Sentiment::Neutral => text.white(),
        Sentiment::Doubtful => text.yellow(),
    }
}

fn bar(value: u64, max: u64) -> String {
    if max == 0 {
        return String::new();
    }
    let width = (value * BAR_WIDTH).div_ceil(max);
    "\u{2588}".repeat(width as usize)
}

fn format_rating(rating: f64) -> String {
    if rating.fract() == 0.0 {
        format!("{rating:.0}")
    } else {
        format!("{rating:.1}")
    }
}

/// Truncate to `max_len` characters, appending "…" if truncated.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_len.saturating_sub(1)).collect();
        format!("{cut}\u{2026}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Dimension;

    fn render(f: impl FnOnce(&mut TerminalRenderer<Vec<u8>>)) -> String {
        let mut r = TerminalRenderer::new(Vec::new());
        f(&mut r);
        String::from_utf8(r.into_inner()).unwrap()
    }

    #[test]
    fn bar_scales_to_max() {
        assert_eq!(bar(0, 0), "");
        assert_eq!(bar(10, 10).chars().count(), 30);
        assert_eq!(bar(1, 10).chars().count(), 3);
    }

    #[test]
    fn truncate_is_char_safe() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("héllo wörld", 5), "héll\u{2026}");
    }

    #[test]
    fn hidden_insights_print_nothing() {
        let panel = InsightsPanel {
            visible: false,
            dimension: Dimension::Operations,
            sentiment: Sentiment::Neutral,
            summary: "\u{2014}".to_string(),
            key_insights: vec![],
            recommendations: vec![],
        };
        assert!(render(|r| r.render_insights(&panel)).is_empty());
    }

    #[test]
    fn empty_review_list_says_so() {
        let list = ReviewList {
            total: 0,
            cards: vec![],
        };
        assert!(render(|r| r.render_review_list(&list)).contains("No reviews found."));
    }

    #[test]
    fn error_includes_message() {
        let out = render(|r| r.render_error("Server error: 500"));
        assert!(out.contains("Server error: 500"));
    }
}
