use thiserror::Error;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("email provider is not configured")]
    NotConfigured,

    #[error("email request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("email API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },
}
