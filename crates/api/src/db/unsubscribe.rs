//! One-time unsubscribe link query builders.

use sea_query::{Expr, Query, SqliteQueryBuilder};

use super::tables::UnsubscribeTokens;
use super::Built;

pub fn insert_token(
    id: &str,
    user_id: &str,
    token: &str,
    email_type: &str,
    expires_at: &str,
) -> Built {
    Query::insert()
        .into_table(UnsubscribeTokens::Table)
        .columns([
            UnsubscribeTokens::Id,
            UnsubscribeTokens::UserId,
            UnsubscribeTokens::Token,
            UnsubscribeTokens::EmailType,
            UnsubscribeTokens::ExpiresAt,
        ])
        .values_panic([
            id.into(),
            user_id.into(),
            token.into(),
            email_type.into(),
            expires_at.into(),
        ])
        .build(SqliteQueryBuilder)
}

/// Lookup by token (returns id, user_id, email_type, expires_at, used_at).
pub fn lookup(token: &str) -> Built {
    Query::select()
        .columns([
            UnsubscribeTokens::Id,
            UnsubscribeTokens::UserId,
            UnsubscribeTokens::EmailType,
            UnsubscribeTokens::ExpiresAt,
            UnsubscribeTokens::UsedAt,
        ])
        .from(UnsubscribeTokens::Table)
        .and_where(Expr::col(UnsubscribeTokens::Token).eq(token))
        .build(SqliteQueryBuilder)
}

/// Consume a token. Affects 0 rows if it was already used.
pub fn mark_used(id: &str, used_at: &str) -> Built {
    Query::update()
        .table(UnsubscribeTokens::Table)
        .value(UnsubscribeTokens::UsedAt, used_at)
        .and_where(Expr::col(UnsubscribeTokens::Id).eq(id))
        .and_where(Expr::col(UnsubscribeTokens::UsedAt).is_null())
        .build(SqliteQueryBuilder)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mark_used_only_touches_unused_tokens() {
        let (sql, _) = mark_used("t1", "2026-01-01 00:00:00");
        assert!(sql.contains("\"used_at\" IS NULL"));
    }
}
