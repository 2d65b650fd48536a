use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Html,
};
use rusqlite::OptionalExtension;
use serde::Deserialize;

use strengths_api::db;
use strengths_mailer::{render_unsubscribe_page, UnsubscribeOutcome};

use crate::analytics::{self, Event};
use crate::storage::{sq_execute, sq_query_row, sqlite_now, Db};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct UnsubscribeQuery {
    #[serde(default)]
    pub token: Option<String>,
}

struct TokenRow {
    id: String,
    user_id: String,
    email_type: String,
    expires_at: String,
    used_at: Option<String>,
}

/// Consume `token`: deactivate its subscription and mark it used.
/// Returns the subscription owner on success.
fn redeem(db: &Db, token: &str) -> rusqlite::Result<Option<(String, String)>> {
    let conn = db.conn();
    let row = sq_query_row(&conn, db::unsubscribe::lookup(token), |row| {
        Ok(TokenRow {
            id: row.get(0)?,
            user_id: row.get(1)?,
            email_type: row.get(2)?,
            expires_at: row.get(3)?,
            used_at: row.get(4)?,
        })
    })
    .optional()?;

    let now = sqlite_now();
    let Some(row) = row.filter(|r| r.used_at.is_none() && r.expires_at > now) else {
        return Ok(None);
    };

    let tx = conn.unchecked_transaction()?;
    // A concurrent redemption already consumed it.
    if sq_execute(&tx, db::unsubscribe::mark_used(&row.id, &now))? == 0 {
        return Ok(None);
    }
    sq_execute(&tx, db::email::set_active(&row.user_id, &row.email_type, false))?;
    tx.commit()?;
    Ok(Some((row.user_id, row.email_type)))
}

/// GET /api/email/unsubscribe?token=… — one-click unsubscribe page.
pub async fn unsubscribe(
    State(state): State<AppState>,
    Query(query): Query<UnsubscribeQuery>,
) -> (StatusCode, Html<String>) {
    let token = query.token.as_deref().map(str::trim).unwrap_or_default();
    let outcome = if token.is_empty() {
        UnsubscribeOutcome::LinkExpired
    } else {
        match redeem(&state.db, token) {
            Ok(Some((user_id, email_type))) => {
                tracing::info!(user_id = %user_id, email_type = %email_type, "unsubscribed");
                analytics::track_event(
                    &state.db,
                    Some(&user_id),
                    Event::EmailUnsubscribed,
                    Some(serde_json::json!({ "email_type": email_type })),
                );
                UnsubscribeOutcome::Unsubscribed
            }
            Ok(None) => UnsubscribeOutcome::LinkExpired,
            Err(e) => {
                tracing::error!("unsubscribe: {e}");
                UnsubscribeOutcome::Error
            }
        }
    };

    let status =
        StatusCode::from_u16(outcome.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Html(render_unsubscribe_page(outcome, state.config.public_url())),
    )
}
