//! Best-effort product analytics events.

use uuid::Uuid;

use strengths_api::db;

use crate::storage::{sq_execute, Db};

/// Event names recorded in `analytics_events.event_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    UserRegistered,
    UserLogin,
    StrengthsUpdated,
    TeamMemberCreated,
    TeamMemberDeleted,
    ChatMessageSent,
    EmailUnsubscribed,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UserRegistered => "user_registered",
            Self::UserLogin => "user_login",
            Self::StrengthsUpdated => "strengths_updated",
            Self::TeamMemberCreated => "team_member_created",
            Self::TeamMemberDeleted => "team_member_deleted",
            Self::ChatMessageSent => "chat_message_sent",
            Self::EmailUnsubscribed => "email_unsubscribed",
        }
    }
}

/// Record an event. Failures are logged and swallowed.
pub fn track_event(
    db: &Db,
    user_id: Option<&str>,
    event: Event,
    metadata: Option<serde_json::Value>,
) {
    let metadata = metadata.map(|m| m.to_string());
    let conn = db.conn();
    if let Err(e) = sq_execute(
        &conn,
        db::analytics::insert(
            &Uuid::new_v4().to_string(),
            user_id,
            event.as_str(),
            metadata.as_deref(),
        ),
    ) {
        tracing::error!(event = event.as_str(), "track event: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{open_in_memory, sq_query_row};

    #[test]
    fn events_are_stored_with_metadata() {
        let db = open_in_memory().unwrap();
        track_event(
            &db,
            None,
            Event::EmailUnsubscribed,
            Some(serde_json::json!({"email_type": "weekly_coaching"})),
        );

        let conn = db.conn();
        let (event_type, metadata): (String, Option<String>) = sq_query_row(
            &conn,
            (
                "SELECT event_type, metadata FROM analytics_events".to_string(),
                sea_query::Values(Vec::new()),
            ),
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .unwrap();
        assert_eq!(event_type, "email_unsubscribed");
        assert_eq!(metadata.as_deref(), Some(r#"{"email_type":"weekly_coaching"}"#));
    }

    #[test]
    fn unknown_user_is_logged_not_raised() {
        let db = open_in_memory().unwrap();
        // Foreign key violation: the user does not exist.
        track_event(&db, Some("ghost"), Event::UserLogin, None);
    }
}
