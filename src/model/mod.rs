//! Data model: reviews, labels and the baseline analysis document.

pub mod document;
pub mod labels;
pub mod review;

pub use document::{
    BaselineDocument, DimensionSummaries, SentimentBlock, SentimentCounts, SentimentPercentages,
    SentimentSummary, SummaryStatistics,
};
pub use labels::{Dimension, Sentiment};
pub use review::{DimensionTag, Review, ReviewAnalysis};
