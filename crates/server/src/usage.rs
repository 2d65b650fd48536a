//! AI usage accounting.

use uuid::Uuid;

use strengths_api::db;
use strengths_llm::{Generated, TokenUsage};

use crate::storage::{sq_execute, Db};

/// `ai_usage_logs.request_type` values.
pub mod request_type {
    pub const CHAT: &str = "chat";
    pub const GENERATE_TITLE: &str = "generate_title";
    pub const FOLLOWUP_QUESTIONS: &str = "followup_questions";
    pub const STARTER_QUESTIONS: &str = "starter_questions";
    pub const WELCOME_EMAIL: &str = "welcome_email";
    pub const WEEKLY_EMAIL: &str = "weekly_email";
}

/// Record one model call with its token counts and estimated cost.
///
/// Never fails: a database error is logged and dropped.
pub fn log_ai_usage(
    db: &Db,
    user_id: Option<&str>,
    request_type: &str,
    model: &str,
    usage: TokenUsage,
) {
    let id = Uuid::new_v4().to_string();
    let row = db::ai_usage::NewAiUsage {
        id: &id,
        user_id,
        request_type,
        model,
        input_tokens: usage.input_tokens,
        output_tokens: usage.output_tokens,
        estimated_cost: usage.estimated_cost(),
    };
    let conn = db.conn();
    if let Err(e) = sq_execute(&conn, db::ai_usage::insert(&row)) {
        tracing::error!(request_type, "log ai usage: {e}");
    }
}

/// Log usage of `generated` if it came from the model; fallbacks cost nothing.
pub fn log_generated<T>(
    db: &Db,
    user_id: Option<&str>,
    request_type: &str,
    model: &str,
    generated: &Generated<T>,
) {
    if let Some(usage) = generated.usage() {
        log_ai_usage(db, user_id, request_type, model, usage);
    }
}
