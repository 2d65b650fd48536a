//! Email subscription and delivery log query builders.

use sea_query::{Asterisk, Expr, Func, OnConflict, Order, Query, SqliteQueryBuilder};

use super::tables::{EmailLogs, EmailSubscriptions, Users};
use super::Built;

// ── Subscriptions ──────────────────────────────────────────────────────────

/// Create an active subscription; a no-op if the (user, type) pair exists.
pub fn insert_subscription(id: &str, user_id: &str, email_type: &str) -> Built {
    Query::insert()
        .into_table(EmailSubscriptions::Table)
        .columns([
            EmailSubscriptions::Id,
            EmailSubscriptions::UserId,
            EmailSubscriptions::EmailType,
        ])
        .values_panic([id.into(), user_id.into(), email_type.into()])
        .on_conflict(
            OnConflict::columns([EmailSubscriptions::UserId, EmailSubscriptions::EmailType])
                .do_nothing()
                .to_owned(),
        )
        .build(SqliteQueryBuilder)
}

/// One subscription (is_active, weekly_email_count, last_sent_at).
pub fn get_subscription(user_id: &str, email_type: &str) -> Built {
    Query::select()
        .columns([
            EmailSubscriptions::IsActive,
            EmailSubscriptions::WeeklyEmailCount,
            EmailSubscriptions::LastSentAt,
        ])
        .from(EmailSubscriptions::Table)
        .and_where(Expr::col(EmailSubscriptions::UserId).eq(user_id))
        .and_where(Expr::col(EmailSubscriptions::EmailType).eq(email_type))
        .build(SqliteQueryBuilder)
}

/// Active subscriptions of one type joined with their owner.
///
/// Returns: subscription id, user_id, weekly_email_count, last_sent_at,
/// email, first_name, top_strengths.
pub fn list_active(email_type: &str) -> Built {
    Query::select()
        .column((EmailSubscriptions::Table, EmailSubscriptions::Id))
        .column((EmailSubscriptions::Table, EmailSubscriptions::UserId))
        .column((EmailSubscriptions::Table, EmailSubscriptions::WeeklyEmailCount))
        .column((EmailSubscriptions::Table, EmailSubscriptions::LastSentAt))
        .column((Users::Table, Users::Email))
        .column((Users::Table, Users::FirstName))
        .column((Users::Table, Users::TopStrengths))
        .from(EmailSubscriptions::Table)
        .inner_join(
            Users::Table,
            Expr::col((Users::Table, Users::Id))
                .equals((EmailSubscriptions::Table, EmailSubscriptions::UserId)),
        )
        .and_where(
            Expr::col((EmailSubscriptions::Table, EmailSubscriptions::EmailType)).eq(email_type),
        )
        .and_where(Expr::col((EmailSubscriptions::Table, EmailSubscriptions::IsActive)).eq(1))
        .order_by(
            (EmailSubscriptions::Table, EmailSubscriptions::CreatedAt),
            Order::Asc,
        )
        .build(SqliteQueryBuilder)
}

/// Reserve the next weekly email: count it and stamp the send time, but only
/// if the count is still `expected_count`. Zero rows changed means another
/// pass already took this week.
pub fn claim_send(subscription_id: &str, expected_count: u32, sent_at: &str) -> Built {
    Query::update()
        .table(EmailSubscriptions::Table)
        .value(
            EmailSubscriptions::WeeklyEmailCount,
            Expr::col(EmailSubscriptions::WeeklyEmailCount).add(1),
        )
        .value(EmailSubscriptions::LastSentAt, sent_at)
        .value(EmailSubscriptions::UpdatedAt, sent_at)
        .and_where(Expr::col(EmailSubscriptions::Id).eq(subscription_id))
        .and_where(Expr::col(EmailSubscriptions::WeeklyEmailCount).eq(expected_count))
        .build(SqliteQueryBuilder)
}

/// Undo a [`claim_send`] whose delivery failed.
pub fn release_send(
    subscription_id: &str,
    previous_count: u32,
    previous_sent_at: Option<&str>,
) -> Built {
    Query::update()
        .table(EmailSubscriptions::Table)
        .value(EmailSubscriptions::WeeklyEmailCount, previous_count)
        .value(
            EmailSubscriptions::LastSentAt,
            previous_sent_at.map(str::to_string),
        )
        .value(EmailSubscriptions::UpdatedAt, Expr::cust("datetime('now')"))
        .and_where(Expr::col(EmailSubscriptions::Id).eq(subscription_id))
        .and_where(Expr::col(EmailSubscriptions::WeeklyEmailCount).eq(previous_count + 1))
        .build(SqliteQueryBuilder)
}

/// Turn a subscription on or off.
pub fn set_active(user_id: &str, email_type: &str, active: bool) -> Built {
    Query::update()
        .table(EmailSubscriptions::Table)
        .value(EmailSubscriptions::IsActive, i32::from(active))
        .value(EmailSubscriptions::UpdatedAt, Expr::cust("datetime('now')"))
        .and_where(Expr::col(EmailSubscriptions::UserId).eq(user_id))
        .and_where(Expr::col(EmailSubscriptions::EmailType).eq(email_type))
        .build(SqliteQueryBuilder)
}

/// Number of active subscriptions of any type.
pub fn count_active() -> Built {
    Query::select()
        .expr(Func::count(Expr::col(Asterisk)))
        .from(EmailSubscriptions::Table)
        .and_where(Expr::col(EmailSubscriptions::IsActive).eq(1))
        .build(SqliteQueryBuilder)
}

// ── Delivery log ───────────────────────────────────────────────────────────

/// A row for `email_logs`.
pub struct NewEmailLog<'a> {
    pub id: &'a str,
    pub user_id: &'a str,
    pub email_type: &'a str,
    pub subject: &'a str,
    pub week_number: Option<u32>,
    pub provider_id: Option<&'a str>,
    pub status: &'a str,
    pub error_message: Option<&'a str>,
    pub sent_at: &'a str,
}

pub fn insert_log(log: &NewEmailLog<'_>) -> Built {
    Query::insert()
        .into_table(EmailLogs::Table)
        .columns([
            EmailLogs::Id,
            EmailLogs::UserId,
            EmailLogs::EmailType,
            EmailLogs::Subject,
            EmailLogs::WeekNumber,
            EmailLogs::ProviderId,
            EmailLogs::Status,
            EmailLogs::ErrorMessage,
            EmailLogs::SentAt,
        ])
        .values_panic([
            log.id.into(),
            log.user_id.into(),
            log.email_type.into(),
            log.subject.into(),
            log.week_number.map(i64::from).into(),
            log.provider_id.map(str::to_string).into(),
            log.status.into(),
            log.error_message.map(str::to_string).into(),
            log.sent_at.into(),
        ])
        .build(SqliteQueryBuilder)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscription_insert_ignores_duplicates() {
        let (sql, _) = insert_subscription("s1", "u1", "welcome");
        assert!(sql.contains("ON CONFLICT (\"user_id\", \"email_type\") DO NOTHING"));
    }

    #[test]
    fn claim_only_matches_the_count_that_was_read() {
        let (sql, values) = claim_send("s1", 3, "2026-01-05 09:00:00");
        assert!(sql.contains("\"weekly_email_count\" = \"weekly_email_count\" + ?"));
        assert!(sql.contains("WHERE \"id\" = ? AND \"weekly_email_count\" = ?"));
        assert_eq!(values.0.len(), 5);
    }

    #[test]
    fn release_restores_the_previous_send() {
        let (sql, values) = release_send("s1", 3, None);
        assert!(sql.contains("\"last_sent_at\" = ?"));
        assert!(sql.contains("AND \"weekly_email_count\" = ?"));
        assert_eq!(values.0.len(), 4);
    }

    #[test]
    fn log_binds_nullable_columns() {
        let (_, values) = insert_log(&NewEmailLog {
            id: "l1",
            user_id: "u1",
            email_type: "weekly_coaching",
            subject: "Week 1",
            week_number: None,
            provider_id: None,
            status: "failed",
            error_message: Some("boom"),
            sent_at: "2026-01-05 09:00:00",
        });
        assert_eq!(values.0.len(), 9);
    }
}
