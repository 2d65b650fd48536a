//! Small AI helpers used by the chat screen. These never fail because of
//! the model: any provider problem yields fallback content.

use axum::{extract::State, Json};

use strengths_api::{
    ChatMode, FollowupQuestionsRequest, GenerateTitleRequest, GenerateTitleResponse,
    QuestionsResponse, StarterQuestionsRequest,
};
use strengths_llm::{
    generate_followup_questions, generate_starter_questions, generate_title as title_for,
};

use super::auth::AuthUser;
use super::chat::load_coach_context;
use crate::error::ApiErr;
use crate::usage::{self, request_type};
use crate::AppState;

fn required(value: &str, field: &str) -> Result<String, ApiErr> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApiErr::bad_request(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

/// POST /api/generate-title
pub async fn generate_title(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<GenerateTitleRequest>,
) -> Result<Json<GenerateTitleResponse>, ApiErr> {
    let message = required(&req.message, "message")?;
    let generated = title_for(state.llm.as_ref(), &message).await;
    usage::log_generated(
        &state.db,
        Some(&user.user_id),
        request_type::GENERATE_TITLE,
        state.llm.model(),
        &generated,
    );
    Ok(Json(GenerateTitleResponse {
        title: generated.into_content(),
    }))
}

/// POST /api/followup-questions
pub async fn followup_questions(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<FollowupQuestionsRequest>,
) -> Result<Json<QuestionsResponse>, ApiErr> {
    let question = required(&req.question, "question")?;
    let answer = required(&req.answer, "answer")?;
    let generated = generate_followup_questions(state.llm.as_ref(), &question, &answer).await;
    usage::log_generated(
        &state.db,
        Some(&user.user_id),
        request_type::FOLLOWUP_QUESTIONS,
        state.llm.model(),
        &generated,
    );
    Ok(Json(QuestionsResponse {
        questions: generated.into_content(),
    }))
}

/// POST /api/starter-questions
pub async fn starter_questions(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<StarterQuestionsRequest>,
) -> Result<Json<QuestionsResponse>, ApiErr> {
    let mode = match req.mode.as_deref() {
        None => ChatMode::default(),
        Some(raw) => ChatMode::parse(raw).ok_or_else(|| ApiErr::bad_request("invalid mode"))?,
    };
    let (profile, team) = load_coach_context(&state.db, &user.user_id)?;
    let member_names: Vec<String> = team.into_iter().map(|m| m.name).collect();

    let generated =
        generate_starter_questions(state.llm.as_ref(), mode, &profile.strengths, &member_names)
            .await;
    usage::log_generated(
        &state.db,
        Some(&user.user_id),
        request_type::STARTER_QUESTIONS,
        state.llm.model(),
        &generated,
    );
    Ok(Json(QuestionsResponse {
        questions: generated.into_content(),
    }))
}
