//! Chat conversation and message query builders.

use sea_query::{Expr, Order, Query, SqliteQueryBuilder};

use super::tables::{ChatConversations, ChatMessages};
use super::Built;

// ── Conversations ──────────────────────────────────────────────────────────

const CONVERSATION_COLUMNS: [ChatConversations; 5] = [
    ChatConversations::Id,
    ChatConversations::Title,
    ChatConversations::Mode,
    ChatConversations::CreatedAt,
    ChatConversations::UpdatedAt,
];

pub fn insert_conversation(id: &str, user_id: &str, title: &str, mode: &str) -> Built {
    Query::insert()
        .into_table(ChatConversations::Table)
        .columns([
            ChatConversations::Id,
            ChatConversations::UserId,
            ChatConversations::Title,
            ChatConversations::Mode,
        ])
        .values_panic([id.into(), user_id.into(), title.into(), mode.into()])
        .build(SqliteQueryBuilder)
}

/// The user's conversations, most recently active first
/// (id, title, mode, created_at, updated_at).
pub fn list_conversations(user_id: &str) -> Built {
    Query::select()
        .columns(CONVERSATION_COLUMNS)
        .from(ChatConversations::Table)
        .and_where(Expr::col(ChatConversations::UserId).eq(user_id))
        .order_by(ChatConversations::UpdatedAt, Order::Desc)
        .order_by_expr(Expr::cust("rowid"), Order::Desc)
        .build(SqliteQueryBuilder)
}

pub fn get_conversation(id: &str, user_id: &str) -> Built {
    Query::select()
        .columns(CONVERSATION_COLUMNS)
        .from(ChatConversations::Table)
        .and_where(Expr::col(ChatConversations::Id).eq(id))
        .and_where(Expr::col(ChatConversations::UserId).eq(user_id))
        .build(SqliteQueryBuilder)
}

/// Bump `updated_at` after a new message.
pub fn touch_conversation(id: &str) -> Built {
    Query::update()
        .table(ChatConversations::Table)
        .value(ChatConversations::UpdatedAt, Expr::cust("datetime('now')"))
        .and_where(Expr::col(ChatConversations::Id).eq(id))
        .build(SqliteQueryBuilder)
}

/// Delete a conversation; its messages cascade.
pub fn delete_conversation(id: &str, user_id: &str) -> Built {
    Query::delete()
        .from_table(ChatConversations::Table)
        .and_where(Expr::col(ChatConversations::Id).eq(id))
        .and_where(Expr::col(ChatConversations::UserId).eq(user_id))
        .build(SqliteQueryBuilder)
}

// ── Messages ───────────────────────────────────────────────────────────────

const MESSAGE_COLUMNS: [ChatMessages; 4] = [
    ChatMessages::Id,
    ChatMessages::Role,
    ChatMessages::Content,
    ChatMessages::CreatedAt,
];

pub fn insert_message(id: &str, conversation_id: &str, role: &str, content: &str) -> Built {
    Query::insert()
        .into_table(ChatMessages::Table)
        .columns([
            ChatMessages::Id,
            ChatMessages::ConversationId,
            ChatMessages::Role,
            ChatMessages::Content,
        ])
        .values_panic([
            id.into(),
            conversation_id.into(),
            role.into(),
            content.into(),
        ])
        .build(SqliteQueryBuilder)
}

/// Every message of a conversation in insertion order (id, role, content, created_at).
pub fn list_messages(conversation_id: &str) -> Built {
    Query::select()
        .columns(MESSAGE_COLUMNS)
        .from(ChatMessages::Table)
        .and_where(Expr::col(ChatMessages::ConversationId).eq(conversation_id))
        .order_by_expr(Expr::cust("rowid"), Order::Asc)
        .build(SqliteQueryBuilder)
}

/// The newest `limit` messages, newest first. Callers reverse for prompt history.
pub fn recent_messages(conversation_id: &str, limit: u64) -> Built {
    Query::select()
        .columns(MESSAGE_COLUMNS)
        .from(ChatMessages::Table)
        .and_where(Expr::col(ChatMessages::ConversationId).eq(conversation_id))
        .order_by_expr(Expr::cust("rowid"), Order::Desc)
        .limit(limit)
        .build(SqliteQueryBuilder)
}
