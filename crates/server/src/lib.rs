//! Strengths Manager HTTP server.
//!
//! The binary in `main.rs` wires configuration, storage and providers into an
//! [`AppState`] and serves [`build_router`]. Integration tests build the same
//! router over an in-memory database with fake providers.

pub mod analytics;
pub mod config;
pub mod email;
pub mod error;
pub mod jobs;
pub mod routes;
pub mod storage;
pub mod usage;

use std::sync::Arc;

use axum::{
    extract::FromRef,
    routing::{get, patch, post, put},
    Router,
};
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use strengths_llm::CompletionClient;
use strengths_mailer::EmailSender;

pub use config::AppConfig;
use storage::Db;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    pub config: Arc<AppConfig>,
    pub llm: Arc<dyn CompletionClient>,
    pub mailer: Arc<dyn EmailSender>,
    /// Held for the duration of a weekly email pass.
    pub weekly_pass: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(
        db: Db,
        config: Arc<AppConfig>,
        llm: Arc<dyn CompletionClient>,
        mailer: Arc<dyn EmailSender>,
    ) -> Self {
        Self {
            db,
            config,
            llm,
            mailer,
            weekly_pass: Arc::new(Mutex::new(())),
        }
    }

    /// Whether the in-process weekly email loop should run.
    pub fn scheduler_enabled(&self) -> bool {
        self.config.weekly_email_interval_hours > 0 && self.mailer.is_configured()
    }
}

impl FromRef<AppState> for Db {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}

impl FromRef<AppState> for Arc<AppConfig> {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

/// All JSON endpoints, mounted under `/api`.
fn api_routes() -> Router<AppState> {
    Router::new()
        // Health
        .route("/health", get(routes::health::health))
        // Auth
        .route("/auth/register", post(routes::auth::register))
        .route("/auth/login", post(routes::auth::login))
        .route("/auth/refresh", post(routes::auth::refresh))
        .route("/auth/logout", post(routes::auth::logout))
        .route("/auth/me", get(routes::auth::me))
        // Team members
        .route(
            "/team-members",
            get(routes::team_members::list).post(routes::team_members::create),
        )
        .route(
            "/team-members/{id}",
            put(routes::team_members::update).delete(routes::team_members::delete),
        )
        // User
        .route("/user/strengths", patch(routes::user::update_strengths))
        .route(
            "/user/email-preferences",
            get(routes::user::get_email_preferences).patch(routes::user::update_email_preferences),
        )
        // AI helpers
        .route("/generate-title", post(routes::ai::generate_title))
        .route("/followup-questions", post(routes::ai::followup_questions))
        .route("/starter-questions", post(routes::ai::starter_questions))
        // Chat
        .route("/chat", post(routes::chat::send_message))
        .route("/conversations", get(routes::chat::list_conversations))
        .route(
            "/conversations/{id}",
            get(routes::chat::get_conversation).delete(routes::chat::delete_conversation),
        )
        // Admin
        .route("/admin/users", get(routes::admin::list_users))
        .route(
            "/admin/users/{id}",
            patch(routes::admin::update_user_role).delete(routes::admin::delete_user),
        )
        .route("/admin/ai-stats", get(routes::admin::ai_stats))
        .route("/admin/email-stats", get(routes::admin::email_stats))
        .route("/admin/team-stats", get(routes::admin::team_stats))
        .route("/admin/usage-stats", get(routes::admin::usage_stats))
        .route("/admin/health", get(routes::admin::health))
        // Email
        .route("/email/unsubscribe", get(routes::unsubscribe::unsubscribe))
        .route("/cron/weekly-emails", post(routes::cron::weekly_emails))
}

/// Build the full application router.
pub fn build_router(state: AppState) -> Router {
    let mut app = Router::new().nest("/api", api_routes());

    // Serve the dashboard build if present
    let web_dir = &state.config.web_dir;
    if web_dir.exists() {
        tracing::info!("serving static files from {}", web_dir.display());
        let index_html = web_dir.join("index.html");
        app = app.fallback_service(ServeDir::new(web_dir).fallback(ServeFile::new(index_html)));
    }

    app.layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
