use thiserror::Error;

/// Errors produced while extracting, applying, or persisting a refactor.
#[derive(Error, Debug)]
pub enum RefactorError {
    #[error("No JSON found in LLM response")]
    NoJsonFound,

    #[error("Unbalanced JSON in LLM response")]
    UnbalancedJson,

    #[error("Malformed JSON in LLM response: {0}")]
    MalformedJson(#[source] serde_json::Error),

    #[error("Could not extract segments from LLM response: {0}")]
    NoRecognizedSchema(String),

    #[error("No valid segments found: none of {candidates} suggested phrases occur in the prompt")]
    NoAnchorableSegments { candidates: usize },

    #[error("LLM returned an empty response")]
    EmptyResponse,

    #[error("LLM provider returned HTTP {status}: {message}")]
    Provider { status: u16, message: String },

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Failed to save version: {0}")]
    Persistence(String),

    #[error("Cannot {action} while refactor session is {phase}")]
    InvalidState {
        phase: &'static str,
        action: &'static str,
    },

    #[error("Result discarded: refactor session changed while the request was in flight")]
    Stale,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("{0}")]
    Other(String),
}

impl RefactorError {
    /// True when the provider rejected the call with HTTP 429.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, RefactorError::Provider { status: 429, .. })
    }
}

impl From<anyhow::Error> for RefactorError {
    fn from(err: anyhow::Error) -> Self {
        RefactorError::Other(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, RefactorError>;
