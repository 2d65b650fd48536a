//! Admin dashboard endpoints. Every handler takes [`AdminUser`].

use std::collections::BTreeMap;
use std::time::Instant;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{Duration, Utc};

use strengths_api::{
    db, strengths, AdminHealthResponse, AdminUsersResponse, AiStatsResponse, DailyActiveUsers,
    DailyAiUsage, DailyEmailCount, DatabaseHealth, DomainCount, EmailFailure, EmailStatsResponse,
    EventTypeCount, OkResponse, RequestTypeUsage, ServiceHealth, StatsQuery, StrengthCount,
    StrengthDomain, SubscriptionCount, TableCounts, TeamStatsResponse, UpdateUserRoleRequest,
    UsageStatsResponse, UserRole,
};

use super::auth::AdminUser;
use crate::error::ApiErr;
use crate::storage::{admin_user_from_row, sq_execute, sq_query_map, sq_query_row, sqlite_time, Db};
use crate::AppState;

const TOP_STRENGTHS: usize = 10;
const RECENT_FAILURES: u32 = 20;
const USER_NOT_FOUND: &str = "user not found";

/// Lower bound of a `?days=N` window as SQLite datetime text.
fn window_start(days: u32) -> String {
    sqlite_time(Utc::now() - Duration::days(i64::from(days)))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// GET /api/admin/users — every account with its team size.
pub async fn list_users(
    State(db): State<Db>,
    _admin: AdminUser,
) -> Result<Json<AdminUsersResponse>, ApiErr> {
    let conn = db.conn();
    let users = sq_query_map(&conn, db::users::list_for_admin(), admin_user_from_row)
        .map_err(ApiErr::from_db("list users"))?;
    Ok(Json(AdminUsersResponse { users }))
}

/// PATCH /api/admin/users/:id — change a user's role.
pub async fn update_user_role(
    State(db): State<Db>,
    AdminUser(admin): AdminUser,
    Path(id): Path<String>,
    Json(req): Json<UpdateUserRoleRequest>,
) -> Result<Json<OkResponse>, ApiErr> {
    let role = UserRole::parse(&req.role)
        .ok_or_else(|| ApiErr::bad_request("role must be 'user' or 'admin'"))?;

    let conn = db.conn();
    let updated = sq_execute(&conn, db::users::update_role(&id, role.as_str()))
        .map_err(ApiErr::from_db("update role"))?;
    if updated == 0 {
        return Err(ApiErr::not_found(USER_NOT_FOUND));
    }
    tracing::info!(admin_id = %admin.user_id, user_id = %id, role = %role, "user role changed");
    Ok(Json(OkResponse { ok: true }))
}

/// DELETE /api/admin/users/:id — remove an account and everything it owns.
pub async fn delete_user(
    State(db): State<Db>,
    AdminUser(admin): AdminUser,
    Path(id): Path<String>,
) -> Result<Json<OkResponse>, ApiErr> {
    if id == admin.user_id {
        return Err(ApiErr::bad_request("cannot delete your own account"));
    }

    let conn = db.conn();
    let deleted =
        sq_execute(&conn, db::users::delete(&id)).map_err(ApiErr::from_db("delete user"))?;
    if deleted == 0 {
        return Err(ApiErr::not_found(USER_NOT_FOUND));
    }
    tracing::info!(admin_id = %admin.user_id, user_id = %id, "user deleted");
    Ok(Json(OkResponse { ok: true }))
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

/// GET /api/admin/ai-stats?days=N
pub async fn ai_stats(
    State(db): State<Db>,
    _admin: AdminUser,
    Query(query): Query<StatsQuery>,
) -> Result<Json<AiStatsResponse>, ApiErr> {
    let days = query.window_days();
    let since = window_start(days);
    let conn = db.conn();

    let (total_requests, total_input_tokens, total_output_tokens, total_tokens, total_cost) =
        sq_query_row(&conn, db::stats::ai_totals(&since), |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, i64>(3)?,
                row.get::<_, f64>(4)?,
            ))
        })
        .map_err(ApiErr::from_db("ai totals"))?;

    let by_request_type = sq_query_map(&conn, db::stats::ai_by_request_type(&since), |row| {
        Ok(RequestTypeUsage {
            request_type: row.get(0)?,
            requests: row.get(1)?,
            total_tokens: row.get(2)?,
            estimated_cost: round2(row.get(3)?),
        })
    })
    .map_err(ApiErr::from_db("ai by request type"))?;

    let daily = sq_query_map(&conn, db::stats::ai_daily(&since), |row| {
        Ok(DailyAiUsage {
            date: row.get(0)?,
            requests: row.get(1)?,
            total_tokens: row.get(2)?,
            estimated_cost: round2(row.get(3)?),
        })
    })
    .map_err(ApiErr::from_db("ai daily"))?;

    Ok(Json(AiStatsResponse {
        days,
        total_requests,
        total_input_tokens,
        total_output_tokens,
        total_tokens,
        total_cost: round2(total_cost),
        by_request_type,
        daily,
    }))
}

/// GET /api/admin/email-stats?days=N
pub async fn email_stats(
    State(db): State<Db>,
    _admin: AdminUser,
    Query(query): Query<StatsQuery>,
) -> Result<Json<EmailStatsResponse>, ApiErr> {
    let days = query.window_days();
    let since = window_start(days);
    let conn = db.conn();

    let (total_sent, total_failed) = sq_query_row(&conn, db::stats::email_totals(&since), |row| {
        Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?))
    })
    .map_err(ApiErr::from_db("email totals"))?;

    let subscriptions = sq_query_map(&conn, db::stats::subscriptions_by_type(), |row| {
        Ok(SubscriptionCount {
            email_type: row.get(0)?,
            active: row.get(1)?,
            total: row.get(2)?,
        })
    })
    .map_err(ApiErr::from_db("subscriptions by type"))?;

    let daily = sq_query_map(&conn, db::stats::email_daily(&since), |row| {
        Ok(DailyEmailCount {
            date: row.get(0)?,
            sent: row.get(1)?,
            failed: row.get(2)?,
        })
    })
    .map_err(ApiErr::from_db("email daily"))?;

    let recent_failures = sq_query_map(
        &conn,
        db::stats::email_recent_failures(&since, RECENT_FAILURES),
        |row| {
            Ok(EmailFailure {
                email: row.get(0)?,
                email_type: row.get(1)?,
                error_message: row.get(2)?,
                sent_at: row.get(3)?,
            })
        },
    )
    .map_err(ApiErr::from_db("recent email failures"))?;

    Ok(Json(EmailStatsResponse {
        days,
        total_sent,
        total_failed,
        subscriptions,
        daily,
        recent_failures,
    }))
}

/// Strength occurrences folded into the four domains; unknown names are ignored.
fn domain_distribution(counts: &[StrengthCount]) -> Vec<DomainCount> {
    let mut totals: BTreeMap<StrengthDomain, i64> =
        StrengthDomain::ALL.iter().map(|d| (*d, 0)).collect();
    for entry in counts {
        if let Some(domain) = strengths::domain_of(&entry.strength) {
            *totals.entry(domain).or_default() += entry.count;
        }
    }
    totals
        .into_iter()
        .map(|(domain, count)| DomainCount { domain, count })
        .collect()
}

/// GET /api/admin/team-stats
pub async fn team_stats(
    State(db): State<Db>,
    _admin: AdminUser,
) -> Result<Json<TeamStatsResponse>, ApiErr> {
    let conn = db.conn();
    let count = |built, context: &'static str| {
        sq_query_row(&conn, built, |row| row.get::<_, i64>(0)).map_err(ApiErr::from_db(context))
    };
    let total_users = count(db::users::count(), "count users")?;
    let users_with_strengths = count(db::stats::users_with_strengths(), "users with strengths")?;
    let total_team_members = count(db::team_members::count(), "count team members")?;

    let all_counts = sq_query_map(&conn, db::stats::strength_counts(), |row| {
        Ok(StrengthCount {
            strength: row.get(0)?,
            count: row.get(1)?,
        })
    })
    .map_err(ApiErr::from_db("strength counts"))?;

    let domain_distribution = domain_distribution(&all_counts);
    let top_strengths = all_counts.into_iter().take(TOP_STRENGTHS).collect();
    let average_team_size = if total_users > 0 {
        round2(total_team_members as f64 / total_users as f64)
    } else {
        0.0
    };

    Ok(Json(TeamStatsResponse {
        total_users,
        users_with_strengths,
        total_team_members,
        average_team_size,
        top_strengths,
        domain_distribution,
    }))
}

/// GET /api/admin/usage-stats?days=N
pub async fn usage_stats(
    State(db): State<Db>,
    _admin: AdminUser,
    Query(query): Query<StatsQuery>,
) -> Result<Json<UsageStatsResponse>, ApiErr> {
    let days = query.window_days();
    let since = window_start(days);
    let conn = db.conn();

    let events_by_type = sq_query_map(&conn, db::stats::events_by_type(&since), |row| {
        Ok(EventTypeCount {
            event_type: row.get(0)?,
            count: row.get(1)?,
        })
    })
    .map_err(ApiErr::from_db("events by type"))?;

    let daily_active_users = sq_query_map(&conn, db::stats::daily_active_users(&since), |row| {
        Ok(DailyActiveUsers {
            date: row.get(0)?,
            users: row.get(1)?,
        })
    })
    .map_err(ApiErr::from_db("daily active users"))?;

    Ok(Json(UsageStatsResponse {
        days,
        events_by_type,
        daily_active_users,
    }))
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

fn table_counts(db: &Db) -> rusqlite::Result<TableCounts> {
    let conn = db.conn();
    let count = |built| sq_query_row(&conn, built, |row| row.get::<_, i64>(0));
    Ok(TableCounts {
        users: count(db::users::count())?,
        team_members: count(db::team_members::count())?,
        active_subscriptions: count(db::email::count_active())?,
    })
}

/// GET /api/admin/health — 200 `healthy` or 503 `degraded`.
pub async fn health(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> (StatusCode, Json<AdminHealthResponse>) {
    let started = Instant::now();
    let ping = {
        let conn = state.db.conn();
        sq_query_row(&conn, db::stats::ping(), |row| row.get::<_, i64>(0))
    };
    let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

    let database = match ping {
        Ok(_) => DatabaseHealth {
            ok: true,
            latency_ms,
            error: None,
        },
        Err(e) => {
            tracing::error!("health check: {e}");
            DatabaseHealth {
                ok: false,
                latency_ms,
                error: Some(e.to_string()),
            }
        }
    };

    let counts = if database.ok {
        table_counts(&state.db).unwrap_or_else(|e| {
            tracing::error!("health counts: {e}");
            TableCounts::default()
        })
    } else {
        TableCounts::default()
    };

    let (status, label) = if database.ok {
        (StatusCode::OK, "healthy")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    (
        status,
        Json(AdminHealthResponse {
            status: label.to_string(),
            database,
            services: ServiceHealth {
                llm_configured: state.llm.is_configured(),
                email_configured: state.mailer.is_configured(),
                scheduler_enabled: state.scheduler_enabled(),
            },
            counts,
            timestamp: Utc::now().to_rfc3339(),
        }),
    )
}
