//! Shared harness for the HTTP integration tests: an in-memory database,
//! fake providers, and request helpers over `tower::ServiceExt::oneshot`.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use strengths_llm::{Completion, CompletionClient, CompletionRequest, LlmError, TokenUsage};
use strengths_mailer::{EmailSender, MailError, OutgoingEmail, SentEmail};
use strengths_server::storage::{self, Db};
use strengths_server::{build_router, AppConfig, AppState};

pub const PASSWORD: &str = "correct horse battery";
pub const CRON_SECRET: &str = "cron-secret";
pub const STRENGTHS: [&str; 5] = ["Achiever", "Learner", "Focus", "Relator", "Input"];

// ---------------------------------------------------------------------------
// Fake providers
// ---------------------------------------------------------------------------

/// Completion client that answers every request with the same text, or fails.
pub struct FakeLlm {
    configured: bool,
    reply: Option<String>,
    calls: AtomicUsize,
    pub requests: Mutex<Vec<CompletionRequest>>,
}

impl FakeLlm {
    pub fn replying(text: &str) -> Self {
        Self {
            configured: true,
            reply: Some(text.to_string()),
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: None,
            ..Self::replying("")
        }
    }

    pub fn unconfigured() -> Self {
        Self {
            configured: false,
            ..Self::failing()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionClient for FakeLlm {
    fn model(&self) -> &str {
        "fake-model"
    }

    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn complete(&self, request: CompletionRequest) -> Result<Completion, LlmError> {
        // Suspend like a network call would, so concurrent callers interleave.
        tokio::task::yield_now().await;
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request);
        match &self.reply {
            Some(text) => Ok(Completion {
                text: text.clone(),
                usage: TokenUsage {
                    input_tokens: 120,
                    output_tokens: 80,
                },
            }),
            None => Err(LlmError::Api {
                status: 529,
                message: "overloaded".into(),
            }),
        }
    }
}

/// Email sender that records every message instead of delivering it.
pub struct FakeMailer {
    configured: bool,
    fail: bool,
    pub sent: Mutex<Vec<OutgoingEmail>>,
}

impl FakeMailer {
    pub fn working() -> Self {
        Self {
            configured: true,
            fail: false,
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::working()
        }
    }

    pub fn unconfigured() -> Self {
        Self {
            configured: false,
            ..Self::working()
        }
    }

    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmailSender for FakeMailer {
    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn send(&self, email: &OutgoingEmail) -> Result<SentEmail, MailError> {
        tokio::task::yield_now().await;
        if self.fail {
            return Err(MailError::Api {
                status: 422,
                message: "invalid recipient".into(),
            });
        }
        let mut sent = self.sent.lock().unwrap();
        sent.push(email.clone());
        Ok(SentEmail {
            id: format!("msg-{}", sent.len()),
        })
    }
}

// ---------------------------------------------------------------------------
// App harness
// ---------------------------------------------------------------------------

pub struct Session {
    pub user_id: String,
    pub access_token: String,
    pub refresh_token: String,
}

pub struct TestApp {
    pub state: AppState,
    pub llm: Arc<FakeLlm>,
    pub mailer: Arc<FakeMailer>,
}

pub fn test_config() -> AppConfig {
    AppConfig {
        base_url: "https://app.test".into(),
        web_dir: "/nonexistent/strengths-web".into(),
        jwt_secret: "test-secret".into(),
        cron_secret: Some(CRON_SECRET.into()),
        ..AppConfig::default()
    }
}

impl TestApp {
    pub fn new() -> Self {
        Self::with(
            FakeLlm::replying("Lean on your Focus strengths this week."),
            FakeMailer::working(),
        )
    }

    pub fn with(llm: FakeLlm, mailer: FakeMailer) -> Self {
        let llm = Arc::new(llm);
        let mailer = Arc::new(mailer);
        let state = AppState::new(
            storage::open_in_memory().unwrap(),
            Arc::new(test_config()),
            llm.clone(),
            mailer.clone(),
        );
        Self { state, llm, mailer }
    }

    /// A second server instance on the same database, with its own providers
    /// and its own weekly pass guard.
    pub fn replica(&self, llm: Arc<FakeLlm>, mailer: Arc<FakeMailer>) -> AppState {
        AppState::new(self.state.db.clone(), Arc::new(test_config()), llm, mailer)
    }

    pub fn db(&self) -> &Db {
        &self.state.db
    }

    /// Send a request and return the status and raw body text.
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, String) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = build_router(self.state.clone())
            .oneshot(request)
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    /// Send a request and parse the JSON body (`Value::Null` when empty).
    pub async fn json(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let (status, text) = self.send(method, uri, token, body).await;
        let value = if text.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or_else(|e| panic!("invalid JSON ({e}): {text}"))
        };
        (status, value)
    }

    pub async fn register(&self, email: &str, first_name: &str) -> Session {
        let (status, body) = self
            .json(
                "POST",
                "/api/auth/register",
                None,
                Some(json!({
                    "email": email,
                    "password": PASSWORD,
                    "first_name": first_name,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
        Session {
            user_id: body["user_id"].as_str().unwrap().to_string(),
            access_token: body["access_token"].as_str().unwrap().to_string(),
            refresh_token: body["refresh_token"].as_str().unwrap().to_string(),
        }
    }

    pub fn promote_to_admin(&self, user_id: &str) {
        self.execute(&format!("UPDATE users SET role = 'admin' WHERE id = '{user_id}'"));
    }

    /// Save a top five without going through the API (no welcome email).
    pub fn set_strengths(&self, user_id: &str, strengths: &[&str]) {
        let encoded = serde_json::to_string(strengths).unwrap();
        self.state
            .db
            .conn()
            .execute(
                "UPDATE users SET top_strengths = ?1 WHERE id = ?2",
                [encoded.as_str(), user_id],
            )
            .unwrap();
    }

    pub fn execute(&self, sql: &str) {
        self.state.db.conn().execute_batch(sql).unwrap();
    }

    pub fn count(&self, sql: &str) -> i64 {
        self.state
            .db
            .conn()
            .query_row(sql, [], |row| row.get(0))
            .unwrap()
    }

    pub fn text(&self, sql: &str) -> Option<String> {
        self.state
            .db
            .conn()
            .query_row(sql, [], |row| row.get(0))
            .unwrap()
    }
}

pub fn five_strengths() -> Value {
    json!(STRENGTHS)
}
