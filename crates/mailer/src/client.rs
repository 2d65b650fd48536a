//! Transactional email API client.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::MailError;

pub const DEFAULT_BASE_URL: &str = "https://api.resend.com";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Provider receipt for an accepted email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentEmail {
    pub id: String,
}

#[async_trait]
pub trait EmailSender: Send + Sync {
    fn is_configured(&self) -> bool;

    async fn send(&self, email: &OutgoingEmail) -> Result<SentEmail, MailError>;
}

// ─── Resend ──────────────────────────────────────────────────────────────────

pub struct ResendClient {
    http: reqwest::Client,
    api_key: Option<String>,
    from: String,
    base_url: String,
}

impl ResendClient {
    pub fn new(
        api_key: Option<String>,
        from: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, MailError> {
        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            from: from.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[derive(Serialize)]
struct SendBody<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
}

#[derive(Deserialize)]
struct SendResponse {
    id: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    message: String,
}

#[async_trait]
impl EmailSender for ResendClient {
    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn send(&self, email: &OutgoingEmail) -> Result<SentEmail, MailError> {
        let api_key = self.api_key.as_deref().ok_or(MailError::NotConfigured)?;

        let resp = self
            .http
            .post(format!("{}/emails", self.base_url))
            .bearer_auth(api_key)
            .json(&SendBody {
                from: &self.from,
                to: [email.to.as_str()],
                subject: &email.subject,
                html: &email.html,
            })
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(MailError::Api {
                status: status.as_u16(),
                message: api_error_message(&body),
            });
        }

        let body: SendResponse = resp.json().await?;
        tracing::debug!(id = %body.id, to = %email.to, "email accepted by provider");
        Ok(SentEmail { id: body.id })
    }
}

fn api_error_message(body: &str) -> String {
    serde_json::from_str::<ErrorResponse>(body)
        .map(|e| e.message)
        .unwrap_or_else(|_| body.trim().to_string())
}
