use thiserror::Error;

/// Failures talking to the LLM provider or interpreting its reply.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("LLM provider is not configured")]
    NotConfigured,

    #[error("LLM request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("LLM API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("LLM returned an empty response")]
    EmptyResponse,

    #[error("LLM response is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("LLM response is missing `{0}`")]
    MissingField(&'static str),
}
