//! Analyzed reviews as shipped in the baseline document.

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::labels::Sentiment;
use crate::utils::dates;

/// A single analyzed review. Immutable once loaded.
///
/// Fields this crate does not interpret (`review_id`, `processed_at`, ...)
/// are kept in `extra` so a review posted to the summarization service
/// carries everything it was loaded with.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Review {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub images: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub analysis: ReviewAnalysis,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Per-review analysis output.
///
/// Sentiment labels are kept verbatim; unknown spellings such as `"mixed"`
/// stay in the record but never count under one of the four sentiments.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReviewAnalysis {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub dimensions: Vec<DimensionTag>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub key_insights: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub key_themes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A dimension mention with its own sentiment, independent of the review's
/// overall sentiment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DimensionTag {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<String>,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub key_points: Vec<String>,
}

impl DimensionTag {
    /// Tag-level sentiment, if it is one of the four known labels.
    pub fn label(&self) -> Option<Sentiment> {
        self.sentiment.as_deref().and_then(Sentiment::from_label)
    }
}

impl Review {
    /// Overall sentiment, if it is one of the four known labels.
    pub fn sentiment(&self) -> Option<Sentiment> {
        self.analysis
            .sentiment
            .as_deref()
            .and_then(Sentiment::from_label)
    }

    /// Parsed review timestamp; `None` when the date is missing or not in a
    /// recognized format.
    pub fn timestamp(&self) -> Option<NaiveDateTime> {
        self.date.as_deref().and_then(dates::parse_timestamp)
    }

    /// Whether the review carries at least one tag with this dimension name.
    pub fn mentions(&self, dimension: &str) -> bool {
        self.analysis.dimensions.iter().any(|d| d.name == dimension)
    }

    /// Whether the review carries a tag with this name *and* this tag-level
    /// sentiment.
    pub fn has_tag(&self, dimension: &str, sentiment: Sentiment) -> bool {
        self.analysis
            .dimensions
            .iter()
            .any(|d| d.name == dimension && d.label() == Some(sentiment))
    }
}

/// Treat an explicit JSON `null` like a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_full_review() {
        let json = r#"{
            "review_id": "12345",
            "author": "Sara",
            "rating": 5,
            "text": "Great staff",
            "date": "2024-05-01",
            "images": ["https://img/1.jpg"],
            "analysis": {
                "sentiment": "positive",
                "confidence": 0.9,
                "dimensions": [
                    {"name": "Service Quality", "sentiment": "positive", "key_points": ["kind"]}
                ],
                "key_insights": ["staff praised"]
            },
            "processed_at": "2024-05-02T10:00:00"
        }"#;
        let review: Review = serde_json::from_str(json).unwrap();

        assert_eq!(review.sentiment(), Some(Sentiment::Positive));
        assert!(review.mentions("Service Quality"));
        assert!(review.has_tag("Service Quality", Sentiment::Positive));
        assert!(!review.has_tag("Service Quality", Sentiment::Negative));
        assert_eq!(review.extra["review_id"], "12345");
        assert_eq!(review.analysis.extra["confidence"], 0.9);
    }

    #[test]
    fn tolerates_nulls_and_unknown_labels() {
        let json = r#"{
            "author": null,
            "images": null,
            "analysis": {"sentiment": "mixed", "dimensions": null}
        }"#;
        let review: Review = serde_json::from_str(json).unwrap();

        assert_eq!(review.sentiment(), None);
        assert!(review.images.is_empty());
        assert!(review.analysis.dimensions.is_empty());
        assert!(review.timestamp().is_none());
    }

    #[test]
    fn unknown_and_miscased_labels_are_kept_but_not_counted() {
        let json = r#"{"analysis": {"sentiment": "mixed", "dimensions": [
            {"name": "Operations", "sentiment": "Mixed"},
            {"name": "Clinical Care", "sentiment": "Positive"}
        ]}}"#;
        let review: Review = serde_json::from_str(json).unwrap();

        assert_eq!(review.sentiment(), None);
        assert!(!review.has_tag("Clinical Care", Sentiment::Positive));

        let out = serde_json::to_value(&review).unwrap();
        assert_eq!(out["analysis"]["sentiment"], "mixed");
        assert_eq!(out["analysis"]["dimensions"][0]["sentiment"], "Mixed");
        assert_eq!(out["analysis"]["dimensions"][1]["sentiment"], "Positive");
    }

    #[test]
    fn null_tag_name_matches_no_dimension() {
        let json = r#"{"analysis": {"sentiment": "positive", "dimensions": [
            {"name": null, "sentiment": "positive"},
            {"name": "Operations", "sentiment": "positive"}
        ]}}"#;
        let review: Review = serde_json::from_str(json).unwrap();

        assert_eq!(review.analysis.dimensions[0].name, "");
        assert!(review.has_tag("Operations", Sentiment::Positive));
        assert!(!review.mentions("Service Quality"));
    }

    #[test]
    fn extra_fields_survive_serialization() {
        let json = r#"{"review_id": "abc", "date": "2024-01-02", "analysis": {"sentiment": "neutral"}}"#;
        let review: Review = serde_json::from_str(json).unwrap();
        let out = serde_json::to_value(&review).unwrap();

        assert_eq!(out["review_id"], "abc");
        assert_eq!(out["analysis"]["sentiment"], "neutral");
    }
}
