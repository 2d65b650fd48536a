//! Outgoing email plumbing shared by the welcome email and the weekly job:
//! unsubscribe links, dashboard links and delivery logging.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use rusqlite::{Connection, OptionalExtension};
use uuid::Uuid;

use strengths_api::{crypto, db, EmailStatus, EmailType};
use strengths_llm::{generate_welcome_email_content, WelcomeContext};
use strengths_mailer::{render_welcome_email, OutgoingEmail, WelcomeView};

use crate::config::AppConfig;
use crate::storage::{profile_from_row, sq_execute, sq_query_row, sqlite_time, Db};
use crate::usage::{self, request_type};
use crate::AppState;

/// Unsubscribe links stay valid for this many days.
pub const UNSUBSCRIBE_TOKEN_DAYS: i64 = 30;

/// Create a one-time unsubscribe token for (`user_id`, `email_type`).
pub fn issue_unsubscribe_token(
    conn: &Connection,
    user_id: &str,
    email_type: EmailType,
    now: DateTime<Utc>,
) -> Result<String> {
    let token = crypto::generate_token()?;
    let expires_at = sqlite_time(now + Duration::days(UNSUBSCRIBE_TOKEN_DAYS));
    sq_execute(
        conn,
        db::unsubscribe::insert_token(
            &Uuid::new_v4().to_string(),
            user_id,
            &token,
            email_type.as_str(),
            &expires_at,
        ),
    )
    .context("insert unsubscribe token")?;
    Ok(token)
}

pub fn unsubscribe_url(config: &AppConfig, token: &str) -> String {
    format!(
        "{}/api/email/unsubscribe?token={}",
        config.public_url(),
        urlencoding::encode(token)
    )
}

pub fn dashboard_url(config: &AppConfig) -> String {
    format!("{}/dashboard", config.public_url())
}

/// One `email_logs` row.
pub struct Delivery<'a> {
    pub user_id: &'a str,
    pub email_type: EmailType,
    pub subject: &'a str,
    pub week_number: Option<u32>,
    pub outcome: Result<&'a str, &'a str>,
    pub at: DateTime<Utc>,
}

/// Insert a `sent` (provider id) or `failed` (error message) log row.
pub fn log_delivery(conn: &Connection, delivery: &Delivery<'_>) -> rusqlite::Result<usize> {
    let id = Uuid::new_v4().to_string();
    let sent_at = sqlite_time(delivery.at);
    let (status, provider_id, error_message) = match delivery.outcome {
        Ok(provider_id) => (EmailStatus::Sent, Some(provider_id), None),
        Err(message) => (EmailStatus::Failed, None, Some(message)),
    };
    sq_execute(
        conn,
        db::email::insert_log(&db::email::NewEmailLog {
            id: &id,
            user_id: delivery.user_id,
            email_type: delivery.email_type.as_str(),
            subject: delivery.subject,
            week_number: delivery.week_number,
            provider_id,
            status: status.as_str(),
            error_message,
            sent_at: &sent_at,
        }),
    )
}

fn subscription_active(db: &Db, user_id: &str, email_type: EmailType) -> Result<bool> {
    let conn = db.conn();
    let active = sq_query_row(
        &conn,
        db::email::get_subscription(user_id, email_type.as_str()),
        |row| row.get::<_, bool>(0),
    )
    .optional()
    .context("load subscription")?;
    Ok(active.unwrap_or(false))
}

/// Generate, render and send the welcome email for `user_id`.
///
/// Skipped when the mail provider is not configured or the user has turned
/// the welcome email off. Every attempt that reaches the provider is logged
/// to `email_logs`.
pub async fn send_welcome_email(state: &AppState, user_id: &str) -> Result<()> {
    if !state.mailer.is_configured() {
        tracing::info!(user_id, "email provider not configured, skipping welcome email");
        return Ok(());
    }
    if !subscription_active(&state.db, user_id, EmailType::Welcome)? {
        tracing::info!(user_id, "welcome email disabled, skipping");
        return Ok(());
    }

    let profile = {
        let conn = state.db.conn();
        sq_query_row(&conn, db::users::profile_by_id(user_id), profile_from_row)
            .context("load profile for welcome email")?
    };

    let ctx = WelcomeContext {
        first_name: profile.first_name.clone(),
        strengths: profile.top_strengths.clone(),
    };
    let generated = generate_welcome_email_content(state.llm.as_ref(), &ctx).await;
    usage::log_generated(
        &state.db,
        Some(user_id),
        request_type::WELCOME_EMAIL,
        state.llm.model(),
        &generated,
    );
    let content = generated.into_content();

    let now = Utc::now();
    let token = {
        let conn = state.db.conn();
        issue_unsubscribe_token(&conn, user_id, EmailType::Welcome, now)?
    };
    let unsubscribe = unsubscribe_url(&state.config, &token);
    let dashboard = dashboard_url(&state.config);
    let html = render_welcome_email(&WelcomeView {
        first_name: &profile.first_name,
        strengths: &profile.top_strengths,
        greeting: &content.greeting,
        dna_insight: &content.dna_insight,
        challenge: &content.challenge,
        what_to_expect: &content.what_to_expect,
        dashboard_url: &dashboard,
        unsubscribe_url: &unsubscribe,
    });

    let email = OutgoingEmail {
        to: profile.email.clone(),
        subject: content.subject.clone(),
        html,
    };
    let result = state.mailer.send(&email).await;

    let conn = state.db.conn();
    match result {
        Ok(sent) => {
            log_delivery(
                &conn,
                &Delivery {
                    user_id,
                    email_type: EmailType::Welcome,
                    subject: &content.subject,
                    week_number: None,
                    outcome: Ok(&sent.id),
                    at: now,
                },
            )
            .context("log welcome email")?;
            tracing::info!(user_id, provider_id = %sent.id, "welcome email sent");
            Ok(())
        }
        Err(e) => {
            let message = e.to_string();
            log_delivery(
                &conn,
                &Delivery {
                    user_id,
                    email_type: EmailType::Welcome,
                    subject: &content.subject,
                    week_number: None,
                    outcome: Err(&message),
                    at: now,
                },
            )
            .context("log failed welcome email")?;
            Err(e).context("send welcome email")
        }
    }
}
