//! Coaching chat: conversations, message history and the model round trip.

use axum::{
    extract::{Path, State},
    Json,
};
use rusqlite::OptionalExtension;
use uuid::Uuid;

use strengths_api::{
    db, service, ChatMode, ChatRequest, ChatResponse, ChatRole, ConversationDetail,
    ListConversationsResponse, OkResponse,
};
use strengths_llm::{
    coach_system_prompt, generate_title, CoachProfile, CompletionRequest, MemberProfile,
    PromptMessage,
};

use super::auth::AuthUser;
use crate::analytics::{self, Event};
use crate::error::ApiErr;
use crate::storage::{
    conversation_from_row, member_from_row, message_from_row, profile_from_row, sq_execute,
    sq_query_map, sq_query_row, Db,
};
use crate::usage::{self, request_type};
use crate::AppState;

/// Messages sent to the model as conversation history.
const HISTORY_LIMIT: u64 = 20;
const CHAT_MAX_TOKENS: u32 = 1024;
const NOT_FOUND: &str = "conversation not found";

/// The caller's own profile and their team, as the coach sees them.
pub(crate) fn load_coach_context(
    db: &Db,
    user_id: &str,
) -> Result<(CoachProfile, Vec<MemberProfile>), ApiErr> {
    let conn = db.conn();
    let profile = sq_query_row(&conn, db::users::profile_by_id(user_id), profile_from_row)
        .map_err(ApiErr::from_db("load profile"))?;
    let team = sq_query_map(&conn, db::team_members::list_by_user(user_id), member_from_row)
        .map_err(ApiErr::from_db("load team"))?;
    Ok((
        CoachProfile {
            first_name: profile.first_name,
            strengths: profile.top_strengths,
        },
        team.into_iter()
            .map(|m| MemberProfile {
                name: m.name,
                strengths: m.strengths,
            })
            .collect(),
    ))
}

/// POST /api/chat — send a message and get the coach's reply.
///
/// Without a `conversation_id` a new conversation is started and titled from
/// the message. The user message is stored before the model is called, so a
/// model failure (500) leaves it in the history.
pub async fn send_message(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiErr> {
    let message = service::validate_chat_message(&req.message)?;
    let requested_mode = match req.mode.as_deref() {
        None => None,
        Some(raw) => Some(ChatMode::parse(raw).ok_or_else(|| ApiErr::bad_request("invalid mode"))?),
    };

    let existing = match req.conversation_id.as_deref() {
        None => None,
        Some(id) => {
            let conn = state.db.conn();
            let conversation = sq_query_row(
                &conn,
                db::chat::get_conversation(id, &user.user_id),
                conversation_from_row,
            )
            .optional()
            .map_err(ApiErr::from_db("load conversation"))?
            .ok_or_else(|| ApiErr::not_found(NOT_FOUND))?;
            Some(conversation)
        }
    };

    let (conversation_id, title, mode) = match existing {
        Some(conversation) => (conversation.id, conversation.title, conversation.mode),
        None => {
            let generated = generate_title(state.llm.as_ref(), &message).await;
            usage::log_generated(
                &state.db,
                Some(&user.user_id),
                request_type::GENERATE_TITLE,
                state.llm.model(),
                &generated,
            );
            let title = generated.into_content();
            let mode = requested_mode.unwrap_or_default();
            let id = Uuid::new_v4().to_string();
            let conn = state.db.conn();
            sq_execute(
                &conn,
                db::chat::insert_conversation(&id, &user.user_id, &title, mode.as_str()),
            )
            .map_err(ApiErr::from_db("insert conversation"))?;
            (id, title, mode)
        }
    };

    let history = {
        let conn = state.db.conn();
        sq_execute(
            &conn,
            db::chat::insert_message(
                &Uuid::new_v4().to_string(),
                &conversation_id,
                ChatRole::User.as_str(),
                &message,
            ),
        )
        .map_err(ApiErr::from_db("insert user message"))?;
        sq_execute(&conn, db::chat::touch_conversation(&conversation_id))
            .map_err(ApiErr::from_db("touch conversation"))?;
        let mut recent = sq_query_map(
            &conn,
            db::chat::recent_messages(&conversation_id, HISTORY_LIMIT),
            message_from_row,
        )
        .map_err(ApiErr::from_db("load history"))?;
        recent.reverse();
        recent
    };

    let (profile, team) = load_coach_context(&state.db, &user.user_id)?;
    let messages: Vec<PromptMessage> = history
        .into_iter()
        // The provider requires the history to open with a user turn.
        .skip_while(|m| m.role == ChatRole::Assistant)
        .map(|m| match m.role {
            ChatRole::User => PromptMessage::user(m.content),
            ChatRole::Assistant => PromptMessage::assistant(m.content),
        })
        .collect();
    let request = CompletionRequest {
        system: Some(coach_system_prompt(&profile, &team, mode)),
        messages,
        max_tokens: CHAT_MAX_TOKENS,
    };

    let completion = state.llm.complete(request).await.map_err(|e| {
        tracing::error!(conversation_id = %conversation_id, "chat completion failed: {e}");
        ApiErr::internal("failed to generate a response")
    })?;
    usage::log_ai_usage(
        &state.db,
        Some(&user.user_id),
        request_type::CHAT,
        state.llm.model(),
        completion.usage,
    );

    let reply = {
        let conn = state.db.conn();
        sq_execute(
            &conn,
            db::chat::insert_message(
                &Uuid::new_v4().to_string(),
                &conversation_id,
                ChatRole::Assistant.as_str(),
                &completion.text,
            ),
        )
        .map_err(ApiErr::from_db("insert assistant message"))?;
        sq_execute(&conn, db::chat::touch_conversation(&conversation_id))
            .map_err(ApiErr::from_db("touch conversation"))?;
        sq_query_row(
            &conn,
            db::chat::recent_messages(&conversation_id, 1),
            message_from_row,
        )
        .map_err(ApiErr::from_db("load reply"))?
    };

    analytics::track_event(
        &state.db,
        Some(&user.user_id),
        Event::ChatMessageSent,
        Some(serde_json::json!({ "conversation_id": conversation_id, "mode": mode.as_str() })),
    );

    Ok(Json(ChatResponse {
        conversation_id,
        title,
        message: reply,
    }))
}

/// GET /api/conversations — most recently active first.
pub async fn list_conversations(
    State(db): State<Db>,
    user: AuthUser,
) -> Result<Json<ListConversationsResponse>, ApiErr> {
    let conn = db.conn();
    let conversations = sq_query_map(
        &conn,
        db::chat::list_conversations(&user.user_id),
        conversation_from_row,
    )
    .map_err(ApiErr::from_db("list conversations"))?;
    Ok(Json(ListConversationsResponse { conversations }))
}

/// GET /api/conversations/:id — one conversation with every message.
pub async fn get_conversation(
    State(db): State<Db>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ConversationDetail>, ApiErr> {
    let conn = db.conn();
    let conversation = sq_query_row(
        &conn,
        db::chat::get_conversation(&id, &user.user_id),
        conversation_from_row,
    )
    .optional()
    .map_err(ApiErr::from_db("load conversation"))?
    .ok_or_else(|| ApiErr::not_found(NOT_FOUND))?;
    let messages = sq_query_map(&conn, db::chat::list_messages(&id), message_from_row)
        .map_err(ApiErr::from_db("load messages"))?;
    Ok(Json(ConversationDetail {
        conversation,
        messages,
    }))
}

/// DELETE /api/conversations/:id
pub async fn delete_conversation(
    State(db): State<Db>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<OkResponse>, ApiErr> {
    let conn = db.conn();
    let deleted = sq_execute(&conn, db::chat::delete_conversation(&id, &user.user_id))
        .map_err(ApiErr::from_db("delete conversation"))?;
    if deleted == 0 {
        return Err(ApiErr::not_found(NOT_FOUND));
    }
    Ok(Json(OkResponse { ok: true }))
}
