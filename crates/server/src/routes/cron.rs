use axum::{extract::State, http::HeaderMap, Json};
use chrono::Utc;

use strengths_api::{crypto, WeeklyRunSummary};

use crate::error::ApiErr;
use crate::jobs::weekly_emails::process_weekly_emails;
use crate::AppState;

/// POST /api/cron/weekly-emails — run one weekly email pass on demand.
///
/// Requires `Authorization: Bearer $CRON_SECRET`; always rejected when no
/// secret is configured. Answers 409 while another pass is still running.
pub async fn weekly_emails(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<WeeklyRunSummary>, ApiErr> {
    let provided = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .unwrap_or("");

    match state.config.cron_secret() {
        Some(secret) if !provided.is_empty() && crypto::secrets_match(provided, secret) => {}
        _ => return Err(ApiErr::unauthorized("unauthorized")),
    }

    let summary = process_weekly_emails(&state, Utc::now()).await.map_err(|e| {
        tracing::error!("weekly email run failed: {e:#}");
        ApiErr::internal("weekly email run failed")
    })?;
    summary
        .map(Json)
        .ok_or_else(|| ApiErr::conflict("weekly email pass already running"))
}
