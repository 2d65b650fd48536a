//! Background job bookkeeping.

use sea_query::{Expr, OnConflict, Query, SqliteQueryBuilder};

use super::tables::JobRuns;
use super::Built;

/// Name under which the weekly email pass records its runs.
pub const WEEKLY_EMAILS: &str = "weekly_emails";

/// Last completed run of `name` (returns last_run_at).
pub fn last_run(name: &str) -> Built {
    Query::select()
        .column(JobRuns::LastRunAt)
        .from(JobRuns::Table)
        .and_where(Expr::col(JobRuns::Name).eq(name))
        .build(SqliteQueryBuilder)
}

/// Upsert the completion time of `name`.
pub fn record_run(name: &str, ran_at: &str) -> Built {
    Query::insert()
        .into_table(JobRuns::Table)
        .columns([JobRuns::Name, JobRuns::LastRunAt])
        .values_panic([name.into(), ran_at.into()])
        .on_conflict(
            OnConflict::column(JobRuns::Name)
                .update_column(JobRuns::LastRunAt)
                .to_owned(),
        )
        .build(SqliteQueryBuilder)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_run_overwrites_previous_time() {
        let (sql, values) = record_run(WEEKLY_EMAILS, "2026-01-05 09:00:00");
        assert!(sql.contains("ON CONFLICT (\"name\") DO UPDATE SET \"last_run_at\""));
        assert_eq!(values.0.len(), 2);
    }
}
