use axum::{extract::State, Json};
use rusqlite::OptionalExtension;
use uuid::Uuid;

use strengths_api::{
    db, service, EmailPreferencesResponse, EmailType, UpdateEmailPreferencesRequest,
    UpdateStrengthsRequest, UserProfile,
};

use super::auth::AuthUser;
use crate::analytics::{self, Event};
use crate::email;
use crate::error::ApiErr;
use crate::storage::{profile_from_row, sq_execute, sq_query_row, Db};
use crate::AppState;

/// PATCH /api/user/strengths — save the caller's top five.
///
/// The first time a profile becomes complete the welcome email is sent in
/// the background; its outcome never affects this response.
pub async fn update_strengths(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<UpdateStrengthsRequest>,
) -> Result<Json<UserProfile>, ApiErr> {
    let strengths = service::validate_user_strengths(&req.strengths)?;
    let encoded = service::encode_strengths(&strengths);

    let (was_empty, profile) = {
        let conn = state.db.conn();
        let before = sq_query_row(&conn, db::users::profile_by_id(&user.user_id), profile_from_row)
            .map_err(ApiErr::from_db("load profile"))?;
        sq_execute(&conn, db::users::update_strengths(&user.user_id, &encoded))
            .map_err(ApiErr::from_db("update strengths"))?;
        let after = sq_query_row(&conn, db::users::profile_by_id(&user.user_id), profile_from_row)
            .map_err(ApiErr::from_db("load profile"))?;
        (before.top_strengths.is_empty(), after)
    };

    analytics::track_event(
        &state.db,
        Some(&user.user_id),
        Event::StrengthsUpdated,
        Some(serde_json::json!({ "first_time": was_empty })),
    );

    if was_empty {
        let state = state.clone();
        let user_id = user.user_id.clone();
        tokio::spawn(async move {
            if let Err(e) = email::send_welcome_email(&state, &user_id).await {
                tracing::warn!(user_id = %user_id, "welcome email failed: {e:#}");
            }
        });
    }

    Ok(Json(profile))
}

fn load_preferences(db: &Db, user_id: &str) -> Result<EmailPreferencesResponse, ApiErr> {
    let conn = db.conn();
    let row = sq_query_row(
        &conn,
        db::email::get_subscription(user_id, EmailType::WeeklyCoaching.as_str()),
        |row| {
            Ok(EmailPreferencesResponse {
                weekly_coaching: row.get(0)?,
                weekly_email_count: row.get(1)?,
                last_sent_at: row.get(2)?,
            })
        },
    )
    .optional()
    .map_err(ApiErr::from_db("load email preferences"))?;

    Ok(row.unwrap_or(EmailPreferencesResponse {
        weekly_coaching: false,
        weekly_email_count: 0,
        last_sent_at: None,
    }))
}

/// GET /api/user/email-preferences
pub async fn get_email_preferences(
    State(db): State<Db>,
    user: AuthUser,
) -> Result<Json<EmailPreferencesResponse>, ApiErr> {
    load_preferences(&db, &user.user_id).map(Json)
}

/// PATCH /api/user/email-preferences — opt in or out of weekly coaching.
pub async fn update_email_preferences(
    State(db): State<Db>,
    user: AuthUser,
    Json(req): Json<UpdateEmailPreferencesRequest>,
) -> Result<Json<EmailPreferencesResponse>, ApiErr> {
    let email_type = EmailType::WeeklyCoaching.as_str();
    {
        let conn = db.conn();
        sq_execute(
            &conn,
            db::email::insert_subscription(&Uuid::new_v4().to_string(), &user.user_id, email_type),
        )
        .map_err(ApiErr::from_db("ensure subscription"))?;
        sq_execute(
            &conn,
            db::email::set_active(&user.user_id, email_type, req.weekly_coaching),
        )
        .map_err(ApiErr::from_db("update subscription"))?;
    }
    tracing::info!(
        user_id = %user.user_id,
        weekly_coaching = req.weekly_coaching,
        "email preferences updated"
    );
    load_preferences(&db, &user.user_id).map(Json)
}
