//! The "current" dataset: the baseline, or a date-filtered override of it.
//!
//! State lives in a single enum so a transition is one assignment; there is
//! no way to observe filtered reviews alongside baseline summaries. Every
//! transition bumps a generation counter that in-flight filter requests use
//! to detect that their result has gone stale.

use crate::filter::range::DateRange;
use crate::model::{DimensionSummaries, Review};

/// A date-filtered review subset and its dimension summaries.
#[derive(Debug, Clone, PartialEq)]
pub struct Override {
    pub reviews: Vec<Review>,
    pub summaries: DimensionSummaries,
    pub range: DateRange,
}

#[derive(Debug, Clone, PartialEq)]
enum ViewState {
    Baseline,
    Overridden(Override),
}

/// Baseline reviews and summaries plus the optional override.
#[derive(Debug, Clone)]
pub struct DatasetView {
    reviews: Vec<Review>,
    summaries: DimensionSummaries,
    state: ViewState,
    generation: u64,
}

impl DatasetView {
    pub fn new(reviews: Vec<Review>, summaries: DimensionSummaries) -> Self {
        Self {
            reviews,
            summaries,
            state: ViewState::Baseline,
            generation: 0,
        }
    }

    /// Replace the current state with a filtered override.
    pub fn apply_override(
        &mut self,
        reviews: Vec<Review>,
        summaries: DimensionSummaries,
        range: DateRange,
    ) {
        self.state = ViewState::Overridden(Override {
            reviews,
            summaries,
            range,
        });
        self.generation += 1;
    }

    /// Return to the baseline. Idempotent apart from the generation bump.
    pub fn clear(&mut self) {
        self.state = ViewState::Baseline;
        self.generation += 1;
    }

    pub fn current_reviews(&self) -> &[Review] {
        match &self.state {
            ViewState::Baseline => &self.reviews,
            ViewState::Overridden(o) => &o.reviews,
        }
    }

    pub fn current_dimension_summaries(&self) -> &DimensionSummaries {
        match &self.state {
            ViewState::Baseline => &self.summaries,
            ViewState::Overridden(o) => &o.summaries,
        }
    }

    pub fn is_filter_active(&self) -> bool {
        matches!(self.state, ViewState::Overridden(_))
    }

    pub fn active_range(&self) -> Option<&DateRange> {
        match &self.state {
            ViewState::Baseline => None,
            ViewState::Overridden(o) => Some(&o.range),
        }
    }

    pub fn baseline_reviews(&self) -> &[Review] {
        &self.reviews
    }

    pub fn baseline_summaries(&self) -> &DimensionSummaries {
        &self.summaries
    }

    /// Transition counter.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::range::validate;

    fn baseline() -> DatasetView {
        let reviews = vec![Review::default(), Review::default(), Review::default()];
        DatasetView::new(reviews, DimensionSummaries::default())
    }

    #[test]
    fn starts_at_baseline() {
        let view = baseline();
        assert!(!view.is_filter_active());
        assert_eq!(view.current_reviews().len(), 3);
        assert!(view.active_range().is_none());
    }

    #[test]
    fn override_replaces_reviews_and_summaries() {
        let mut view = baseline();
        let mut summaries = DimensionSummaries::default();
        summaries.0.insert("Operations".to_string(), Default::default());
        let range = validate("2024-01-01", "2024-01-31").unwrap();

        view.apply_override(vec![Review::default()], summaries.clone(), range.clone());

        assert!(view.is_filter_active());
        assert_eq!(view.current_reviews().len(), 1);
        assert_eq!(view.current_dimension_summaries(), &summaries);
        assert_eq!(view.active_range(), Some(&range));
        assert_eq!(view.baseline_reviews().len(), 3);
    }

    #[test]
    fn clear_is_idempotent() {
        let mut view = baseline();
        let range = validate("2024-01-01", "2024-01-31").unwrap();
        view.apply_override(vec![], DimensionSummaries::default(), range);

        view.clear();
        let first = (view.is_filter_active(), view.current_reviews().len());
        view.clear();
        let second = (view.is_filter_active(), view.current_reviews().len());

        assert_eq!(first, (false, 3));
        assert_eq!(first, second);
        assert_eq!(view.generation(), 3);
    }
}
