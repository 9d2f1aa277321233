use thiserror::Error;

/// Ways a date-range filter request can fail.
///
/// The `Display` text of each variant is the message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    /// Bad or missing date input. Reported before any work starts.
    #[error("{0}")]
    Validation(String),

    /// The range matched no reviews; the dataset is left unchanged.
    #[error("No reviews found in selected date range")]
    EmptyResult,

    /// The summarization request ran past its deadline.
    #[error("Request timed out after {secs} seconds")]
    Timeout { secs: u64 },

    /// Transport failure or non-success response from the summarization
    /// service.
    #[error("{0}")]
    Remote(String),

    /// The dataset changed (cleared or re-filtered) while this request was
    /// in flight, so its result was discarded.
    #[error("Filter result discarded because the dataset changed while it was loading")]
    Superseded,
}

impl FilterError {
    /// Text for the error banner. Failures after the work started carry an
    /// "Error applying filter:" prefix; input problems are shown bare.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(_) | Self::EmptyResult => self.to_string(),
            _ => format!("Error applying filter: {self}"),
        }
    }

    /// Short outcome label for the event log.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::EmptyResult => "empty",
            Self::Timeout { .. } => "timeout",
            Self::Remote(_) => "remote_error",
            Self::Superseded => "superseded",
        }
    }
}
