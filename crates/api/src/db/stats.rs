//! Aggregate queries for the admin dashboard.
//!
//! Grouped aggregates are written as raw SQL with sea-query values. Every
//! windowed query takes `since`, a `YYYY-MM-DD HH:MM:SS` lower bound.

use sea_query::{Value, Values};

use super::Built;

fn raw(sql: &str, values: Vec<Value>) -> Built {
    (sql.to_string(), Values(values))
}

// ── AI usage ───────────────────────────────────────────────────────────────

/// (requests, input_tokens, output_tokens, total_tokens, cost)
pub fn ai_totals(since: &str) -> Built {
    raw(
        "SELECT COUNT(*), COALESCE(SUM(input_tokens), 0), COALESCE(SUM(output_tokens), 0), \
         COALESCE(SUM(total_tokens), 0), COALESCE(SUM(estimated_cost), 0.0) \
         FROM ai_usage_logs WHERE created_at >= ?",
        vec![since.into()],
    )
}

/// (request_type, requests, total_tokens, cost), busiest first.
pub fn ai_by_request_type(since: &str) -> Built {
    raw(
        "SELECT request_type, COUNT(*), COALESCE(SUM(total_tokens), 0), \
         COALESCE(SUM(estimated_cost), 0.0) \
         FROM ai_usage_logs WHERE created_at >= ? \
         GROUP BY request_type ORDER BY COUNT(*) DESC, request_type ASC",
        vec![since.into()],
    )
}

/// (date, requests, total_tokens, cost) per day.
pub fn ai_daily(since: &str) -> Built {
    raw(
        "SELECT date(created_at) AS day, COUNT(*), COALESCE(SUM(total_tokens), 0), \
         COALESCE(SUM(estimated_cost), 0.0) \
         FROM ai_usage_logs WHERE created_at >= ? \
         GROUP BY day ORDER BY day ASC",
        vec![since.into()],
    )
}

// ── Email ──────────────────────────────────────────────────────────────────

/// (sent, failed)
pub fn email_totals(since: &str) -> Built {
    raw(
        "SELECT COALESCE(SUM(CASE WHEN status = 'sent' THEN 1 ELSE 0 END), 0), \
         COALESCE(SUM(CASE WHEN status = 'failed' THEN 1 ELSE 0 END), 0) \
         FROM email_logs WHERE sent_at >= ?",
        vec![since.into()],
    )
}

/// (email_type, active, total)
pub fn subscriptions_by_type() -> Built {
    raw(
        "SELECT email_type, COALESCE(SUM(is_active), 0), COUNT(*) \
         FROM email_subscriptions GROUP BY email_type ORDER BY email_type ASC",
        Vec::new(),
    )
}

/// (date, sent, failed) per day.
pub fn email_daily(since: &str) -> Built {
    raw(
        "SELECT date(sent_at) AS day, \
         SUM(CASE WHEN status = 'sent' THEN 1 ELSE 0 END), \
         SUM(CASE WHEN status = 'failed' THEN 1 ELSE 0 END) \
         FROM email_logs WHERE sent_at >= ? \
         GROUP BY day ORDER BY day ASC",
        vec![since.into()],
    )
}

/// (email, email_type, error_message, sent_at), newest first.
pub fn email_recent_failures(since: &str, limit: u32) -> Built {
    raw(
        "SELECT u.email, l.email_type, l.error_message, l.sent_at \
         FROM email_logs l INNER JOIN users u ON u.id = l.user_id \
         WHERE l.status = 'failed' AND l.sent_at >= ? \
         ORDER BY l.sent_at DESC LIMIT ?",
        vec![since.into(), i64::from(limit).into()],
    )
}

// ── Teams ──────────────────────────────────────────────────────────────────

/// Accounts with a saved top five.
pub fn users_with_strengths() -> Built {
    raw(
        "SELECT COUNT(*) FROM users WHERE json_array_length(top_strengths) > 0",
        Vec::new(),
    )
}

/// (strength, occurrences) across users and team members, most common first.
pub fn strength_counts() -> Built {
    raw(
        "SELECT j.value, COUNT(*) FROM \
         (SELECT top_strengths FROM users UNION ALL SELECT top_strengths FROM team_members) s, \
         json_each(s.top_strengths) j \
         GROUP BY j.value ORDER BY COUNT(*) DESC, j.value ASC",
        Vec::new(),
    )
}

// ── Product usage ──────────────────────────────────────────────────────────

/// (event_type, count), most frequent first.
pub fn events_by_type(since: &str) -> Built {
    raw(
        "SELECT event_type, COUNT(*) FROM analytics_events WHERE created_at >= ? \
         GROUP BY event_type ORDER BY COUNT(*) DESC, event_type ASC",
        vec![since.into()],
    )
}

/// (date, distinct users) per day.
pub fn daily_active_users(since: &str) -> Built {
    raw(
        "SELECT date(created_at) AS day, COUNT(DISTINCT user_id) FROM analytics_events \
         WHERE created_at >= ? AND user_id IS NOT NULL \
         GROUP BY day ORDER BY day ASC",
        vec![since.into()],
    )
}

/// Cheapest possible round trip, used by the health check.
pub fn ping() -> Built {
    raw("SELECT 1", Vec::new())
}
