//! Analytics event query builders.

use sea_query::{Query, SqliteQueryBuilder};

use super::tables::AnalyticsEvents;
use super::Built;

pub fn insert(id: &str, user_id: Option<&str>, event_type: &str, metadata: Option<&str>) -> Built {
    Query::insert()
        .into_table(AnalyticsEvents::Table)
        .columns([
            AnalyticsEvents::Id,
            AnalyticsEvents::UserId,
            AnalyticsEvents::EventType,
            AnalyticsEvents::Metadata,
        ])
        .values_panic([
            id.into(),
            user_id.map(str::to_string).into(),
            event_type.into(),
            metadata.map(str::to_string).into(),
        ])
        .build(SqliteQueryBuilder)
}
