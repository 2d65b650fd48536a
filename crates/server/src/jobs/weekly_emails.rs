//! One pass over active weekly coaching subscriptions.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::OptionalExtension;
use tracing::{error, info, warn};

use strengths_api::rotation::{
    member_strength_pick, next_week_number, rotation_pick, sent_on_day, WEEKLY_EMAIL_CAP,
};
use strengths_api::{db, service, EmailType, WeeklyRunSummary};
use strengths_llm::{generate_weekly_email_content, FeaturedMember, WeeklyContext};
use strengths_mailer::{render_weekly_email, OutgoingEmail, WeeklyView};

use crate::email::{
    dashboard_url, issue_unsubscribe_token, log_delivery, unsubscribe_url, Delivery,
};
use crate::storage::{member_from_row, sq_execute, sq_query_map, sq_query_row, sqlite_time, Db};
use crate::usage::{self, request_type};
use crate::AppState;

/// An active subscription joined with its owner.
#[derive(Debug, Clone)]
struct Subscriber {
    subscription_id: String,
    user_id: String,
    weekly_email_count: u32,
    last_sent_at: Option<String>,
    email: String,
    first_name: String,
    strengths: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Sent,
    Failed,
    SkippedCap,
    SkippedToday,
    SkippedNoStrengths,
}

/// Send this week's coaching email to every eligible subscriber.
///
/// Subscriptions are handled one at a time; a failure on one is logged,
/// counted as failed, and the pass continues. Returns `None` without doing
/// anything when another pass on this state is still running.
pub async fn process_weekly_emails(
    state: &AppState,
    now: DateTime<Utc>,
) -> Result<Option<WeeklyRunSummary>> {
    let mut summary = WeeklyRunSummary::default();
    if !state.mailer.is_configured() {
        warn!("email provider not configured, skipping weekly emails");
        return Ok(Some(summary));
    }
    let Ok(_running) = state.weekly_pass.try_lock() else {
        warn!("weekly email pass already running, skipping");
        return Ok(None);
    };

    let subscribers = {
        let conn = state.db.conn();
        sq_query_map(
            &conn,
            db::email::list_active(EmailType::WeeklyCoaching.as_str()),
            |row| {
                let strengths: String = row.get(6)?;
                Ok(Subscriber {
                    subscription_id: row.get(0)?,
                    user_id: row.get(1)?,
                    weekly_email_count: row.get(2)?,
                    last_sent_at: row.get(3)?,
                    email: row.get(4)?,
                    first_name: row.get(5)?,
                    strengths: service::decode_strengths(&strengths),
                })
            },
        )
        .context("load weekly subscriptions")?
    };
    info!(count = subscribers.len(), "weekly email pass started");

    for subscriber in &subscribers {
        summary.processed += 1;
        let outcome = match process_one(state, subscriber, now).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(user_id = %subscriber.user_id, "weekly email failed: {e:#}");
                Outcome::Failed
            }
        };
        match outcome {
            Outcome::Sent => summary.sent += 1,
            Outcome::Failed => summary.failed += 1,
            Outcome::SkippedCap => summary.skipped_cap += 1,
            Outcome::SkippedToday => summary.skipped_today += 1,
            Outcome::SkippedNoStrengths => summary.skipped_no_strengths += 1,
        }
    }

    info!(
        processed = summary.processed,
        sent = summary.sent,
        failed = summary.failed,
        skipped_cap = summary.skipped_cap,
        skipped_today = summary.skipped_today,
        skipped_no_strengths = summary.skipped_no_strengths,
        "weekly email pass finished"
    );

    let recorded = {
        let conn = state.db.conn();
        sq_execute(
            &conn,
            db::job_runs::record_run(db::job_runs::WEEKLY_EMAILS, &sqlite_time(now)),
        )
    };
    if let Err(e) = recorded {
        error!("record weekly email run: {e}");
    }
    Ok(Some(summary))
}

/// When the last weekly pass finished, if one ever did.
pub fn last_weekly_run(db: &Db) -> Option<DateTime<Utc>> {
    let conn = db.conn();
    let raw: String = sq_query_row(
        &conn,
        db::job_runs::last_run(db::job_runs::WEEKLY_EMAILS),
        |row| row.get(0),
    )
    .optional()
    .unwrap_or_else(|e| {
        error!("load last weekly run: {e}");
        None
    })?;
    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|t| t.and_utc())
}

async fn process_one(
    state: &AppState,
    sub: &Subscriber,
    now: DateTime<Utc>,
) -> Result<Outcome> {
    let Some(week) = next_week_number(sub.weekly_email_count) else {
        return Ok(Outcome::SkippedCap);
    };
    if sent_on_day(sub.last_sent_at.as_deref(), now.date_naive()) {
        return Ok(Outcome::SkippedToday);
    }
    let Some(featured_strength) = rotation_pick(&sub.strengths, week).cloned() else {
        return Ok(Outcome::SkippedNoStrengths);
    };

    let team = {
        let conn = state.db.conn();
        sq_query_map(&conn, db::team_members::list_by_user(&sub.user_id), member_from_row)
            .context("load team")?
    };
    let team_member = rotation_pick(&team, week).and_then(|member| {
        member_strength_pick(&member.strengths, week, team.len()).map(|strength| FeaturedMember {
            name: member.name.clone(),
            strength: strength.clone(),
        })
    });

    let ctx = WeeklyContext {
        first_name: sub.first_name.clone(),
        week_number: week,
        featured_strength,
        strengths: sub.strengths.clone(),
        team_member,
    };
    let generated = generate_weekly_email_content(state.llm.as_ref(), &ctx).await;
    usage::log_generated(
        &state.db,
        Some(&sub.user_id),
        request_type::WEEKLY_EMAIL,
        state.llm.model(),
        &generated,
    );
    let content = generated.into_content();

    let token = {
        let conn = state.db.conn();
        issue_unsubscribe_token(&conn, &sub.user_id, EmailType::WeeklyCoaching, now)?
    };
    let unsubscribe = unsubscribe_url(&state.config, &token);
    let dashboard = dashboard_url(&state.config);
    let html = render_weekly_email(&WeeklyView {
        first_name: &sub.first_name,
        week_number: week,
        total_weeks: WEEKLY_EMAIL_CAP,
        featured_strength: &ctx.featured_strength,
        preheader: &content.preheader,
        strength_insight: &content.strength_insight,
        action_item: &content.action_item,
        team_member_name: ctx.team_member.as_ref().map(|m| m.name.as_str()),
        team_tip: content.team_tip.as_deref(),
        quote: content.quote.as_deref(),
        dashboard_url: &dashboard,
        unsubscribe_url: &unsubscribe,
    });

    let email = OutgoingEmail {
        to: sub.email.clone(),
        subject: content.subject.clone(),
        html,
    };

    // Reserve this week before sending; a concurrent pass that read the same
    // count loses here instead of mailing twice.
    let sent_at = sqlite_time(now);
    let claimed = {
        let conn = state.db.conn();
        sq_execute(
            &conn,
            db::email::claim_send(&sub.subscription_id, sub.weekly_email_count, &sent_at),
        )
        .context("claim weekly send")?
    };
    if claimed == 0 {
        info!(user_id = %sub.user_id, week, "weekly email already sent by another pass");
        return Ok(Outcome::SkippedToday);
    }

    let result = state.mailer.send(&email).await;

    let conn = state.db.conn();
    match result {
        Ok(sent) => {
            log_delivery(
                &conn,
                &Delivery {
                    user_id: &sub.user_id,
                    email_type: EmailType::WeeklyCoaching,
                    subject: &content.subject,
                    week_number: Some(week),
                    outcome: Ok(&sent.id),
                    at: now,
                },
            )
            .context("log weekly email")?;
            info!(user_id = %sub.user_id, week, provider_id = %sent.id, "weekly email sent");
            Ok(Outcome::Sent)
        }
        Err(e) => {
            let message = e.to_string();
            warn!(user_id = %sub.user_id, week, "weekly email send failed: {message}");
            let tx = conn
                .unchecked_transaction()
                .context("begin weekly release")?;
            sq_execute(
                &tx,
                db::email::release_send(
                    &sub.subscription_id,
                    sub.weekly_email_count,
                    sub.last_sent_at.as_deref(),
                ),
            )
            .context("release weekly send")?;
            log_delivery(
                &tx,
                &Delivery {
                    user_id: &sub.user_id,
                    email_type: EmailType::WeeklyCoaching,
                    subject: &content.subject,
                    week_number: Some(week),
                    outcome: Err(&message),
                    at: now,
                },
            )
            .context("log failed weekly email")?;
            tx.commit().context("commit weekly release")?;
            Ok(Outcome::Failed)
        }
    }
}
