//! The two fixed label sets every review is tagged against.
//!
//! Sentiment labels appear both at review level (`analysis.sentiment`) and on
//! each dimension tag. Dimension labels are the five topical categories the
//! dashboard exposes as buttons; their declaration order is the display order.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Sentiment
// ---------------------------------------------------------------------------

/// Sentiment label, shared by reviews and dimension tags.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    #[default]
    Positive,
    Negative,
    Neutral,
    Doubtful,
}

impl Sentiment {
    /// All sentiments in card / chart order.
    pub const ALL: [Sentiment; 4] = [
        Sentiment::Positive,
        Sentiment::Negative,
        Sentiment::Neutral,
        Sentiment::Doubtful,
    ];

    /// Lowercase wire label (`"positive"`, ...).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
            Self::Neutral => "neutral",
            Self::Doubtful => "doubtful",
        }
    }

    /// Capitalized label for headings and chart legends.
    pub fn title(self) -> &'static str {
        match self {
            Self::Positive => "Positive",
            Self::Negative => "Negative",
            Self::Neutral => "Neutral",
            Self::Doubtful => "Doubtful",
        }
    }

    /// Chart color for this sentiment.
    pub fn color(self) -> &'static str {
        match self {
            Self::Positive => "#10b981",
            Self::Negative => "#ef4444",
            Self::Neutral => "#6b7280",
            Self::Doubtful => "#f59e0b",
        }
    }

    /// Whether review selection for this sentiment is decided by the
    /// dimension tag's own sentiment (positive / negative) rather than the
    /// review's overall sentiment (neutral / doubtful).
    pub fn matches_on_tag(self) -> bool {
        matches!(self, Self::Positive | Self::Negative)
    }

    /// Match a label exactly as analysis output spells it. `"Positive"` or
    /// `"mixed"` are not one of the four labels.
    pub fn from_label(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == raw)
    }

    /// Parse user input case-insensitively. Returns `None` for anything
    /// outside the four known labels.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "positive" => Some(Self::Positive),
            "negative" => Some(Self::Negative),
            "neutral" => Some(Self::Neutral),
            "doubtful" => Some(Self::Doubtful),
            _ => None,
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Dimension
// ---------------------------------------------------------------------------

/// One of the five fixed topical dimensions.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Dimension {
    #[default]
    #[serde(rename = "Service Quality")]
    ServiceQuality,
    #[serde(rename = "Facility Experience")]
    FacilityExperience,
    #[serde(rename = "Trust & Safety")]
    TrustSafety,
    #[serde(rename = "Clinical Care")]
    ClinicalCare,
    #[serde(rename = "Operations")]
    Operations,
}

impl Dimension {
    /// All dimensions in button order.
    pub const ALL: [Dimension; 5] = [
        Dimension::ServiceQuality,
        Dimension::FacilityExperience,
        Dimension::TrustSafety,
        Dimension::ClinicalCare,
        Dimension::Operations,
    ];

    /// The label used in analysis data and summaries.
    pub fn label(self) -> &'static str {
        match self {
            Self::ServiceQuality => "Service Quality",
            Self::FacilityExperience => "Facility Experience",
            Self::TrustSafety => "Trust & Safety",
            Self::ClinicalCare => "Clinical Care",
            Self::Operations => "Operations",
        }
    }

    /// Parse a dimension from its label or a loose spelling
    /// (`"clinical-care"`, `"trust and safety"`, `"OPERATIONS"`).
    pub fn parse(raw: &str) -> Option<Self> {
        let wanted = normalize(raw);
        Self::ALL
            .into_iter()
            .find(|d| normalize(d.label()) == wanted)
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Lowercase alphanumerics only, with `and` folded into `&`.
fn normalize(raw: &str) -> String {
    raw.to_ascii_lowercase()
        .replace(" and ", "&")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '&')
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
