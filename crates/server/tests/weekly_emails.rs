mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use chrono::Utc;
use serde_json::json;

use strengths_server::jobs::weekly_emails::{last_weekly_run, process_weekly_emails};

use common::{FakeLlm, FakeMailer, TestApp, CRON_SECRET, STRENGTHS};

fn weekly_count(app: &TestApp, user_id: &str) -> i64 {
    app.count(&format!(
        "SELECT weekly_email_count FROM email_subscriptions \
         WHERE user_id = '{user_id}' AND email_type = 'weekly_coaching'"
    ))
}

#[tokio::test]
async fn pass_sends_to_eligible_subscribers_only() {
    let app = TestApp::new();
    let ready = app.register("ready@example.com", "Rae").await;
    let blank = app.register("blank@example.com", "Bea").await;
    let today = app.register("today@example.com", "Tad").await;
    let capped = app.register("capped@example.com", "Cap").await;
    for user in [&ready, &today, &capped] {
        app.set_strengths(&user.user_id, &STRENGTHS);
    }
    app.execute(&format!(
        "UPDATE email_subscriptions SET weekly_email_count = 1, last_sent_at = datetime('now') \
         WHERE user_id = '{}' AND email_type = 'weekly_coaching'",
        today.user_id
    ));
    app.execute(&format!(
        "UPDATE email_subscriptions SET weekly_email_count = 12 \
         WHERE user_id = '{}' AND email_type = 'weekly_coaching'",
        capped.user_id
    ));

    let summary = process_weekly_emails(&app.state, Utc::now())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(summary.processed, 4);
    assert_eq!(summary.sent, 1);
    assert_eq!(summary.failed, 0);
    assert_eq!(summary.skipped_no_strengths, 1);
    assert_eq!(summary.skipped_today, 1);
    assert_eq!(summary.skipped_cap, 1);

    let sent = app.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "ready@example.com");
    assert_eq!(sent[0].subject, "Week 1: Put your Achiever to work");
    assert!(sent[0].html.contains("/api/email/unsubscribe?token="));

    assert_eq!(weekly_count(&app, &ready.user_id), 1);
    assert_eq!(weekly_count(&app, &blank.user_id), 0);
    assert_eq!(
        app.count(
            "SELECT COUNT(*) FROM email_logs \
             WHERE email_type = 'weekly_coaching' AND status = 'sent' AND week_number = 1"
        ),
        1
    );

    assert!(last_weekly_run(app.db()).is_some());

    // A second pass on the same day skips everyone already mailed.
    let again = process_weekly_emails(&app.state, Utc::now())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(again.sent, 0);
    assert_eq!(again.skipped_today, 2);
}

#[tokio::test]
async fn featured_strength_follows_the_week_number() {
    let app = TestApp::new();
    let user = app.register("rot@example.com", "Rob").await;
    app.set_strengths(&user.user_id, &STRENGTHS);
    app.execute(&format!(
        "UPDATE email_subscriptions SET weekly_email_count = 6 \
         WHERE user_id = '{}' AND email_type = 'weekly_coaching'",
        user.user_id
    ));

    let summary = process_weekly_emails(&app.state, Utc::now())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(summary.sent, 1);
    // Week 7 wraps around to the second strength.
    assert_eq!(app.mailer.sent()[0].subject, "Week 7: Put your Learner to work");
    assert_eq!(weekly_count(&app, &user.user_id), 7);
}

#[tokio::test]
async fn failed_send_is_logged_without_advancing() {
    let app = TestApp::with(
        FakeLlm::replying("not json"),
        FakeMailer::failing(),
    );
    let user = app.register("fail@example.com", "Fae").await;
    app.set_strengths(&user.user_id, &STRENGTHS);

    let summary = process_weekly_emails(&app.state, Utc::now())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.sent, 0);
    assert_eq!(weekly_count(&app, &user.user_id), 0);
    assert_eq!(
        app.count(
            "SELECT COUNT(*) FROM email_subscriptions \
             WHERE email_type = 'weekly_coaching' AND last_sent_at IS NULL"
        ),
        1
    );

    let error = app
        .text("SELECT error_message FROM email_logs WHERE status = 'failed'")
        .unwrap();
    assert!(error.contains("invalid recipient"));
}

#[tokio::test]
async fn unconfigured_mailer_skips_the_pass() {
    let app = TestApp::with(FakeLlm::unconfigured(), FakeMailer::unconfigured());
    let user = app.register("off@example.com", "Ola").await;
    app.set_strengths(&user.user_id, &STRENGTHS);

    let summary = process_weekly_emails(&app.state, Utc::now())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(summary, Default::default());
    assert_eq!(app.count("SELECT COUNT(*) FROM email_logs"), 0);
}

#[tokio::test]
async fn cron_endpoint_requires_the_shared_secret() {
    let app = TestApp::new();
    let user = app.register("cron@example.com", "Cro").await;
    app.set_strengths(&user.user_id, &STRENGTHS);

    let (status, _) = app.json("POST", "/api/cron/weekly-emails", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .json("POST", "/api/cron/weekly-emails", Some("wrong"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // A user's access token is not the cron secret either.
    let (status, _) = app
        .json("POST", "/api/cron/weekly-emails", Some(&user.access_token), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, summary) = app
        .json("POST", "/api/cron/weekly-emails", Some(CRON_SECRET), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["processed"], json!(1));
    assert_eq!(summary["sent"], json!(1));
}

#[tokio::test]
async fn overlapping_passes_on_one_server_run_once() {
    let app = TestApp::new();
    let user = app.register("once@example.com", "Oni").await;
    app.set_strengths(&user.user_id, &STRENGTHS);

    let now = Utc::now();
    let (first, second) = tokio::join!(
        process_weekly_emails(&app.state, now),
        process_weekly_emails(&app.state, now),
    );
    let summaries: Vec<_> = [first.unwrap(), second.unwrap()]
        .into_iter()
        .flatten()
        .collect();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].sent, 1);

    assert_eq!(app.mailer.sent().len(), 1);
    assert_eq!(weekly_count(&app, &user.user_id), 1);
}

#[tokio::test]
async fn passes_from_two_servers_send_each_email_once() {
    let app = TestApp::new();
    let user = app.register("twice@example.com", "Twi").await;
    app.set_strengths(&user.user_id, &STRENGTHS);

    // Both instances load the subscription before either has sent.
    let other = app.replica(
        Arc::new(FakeLlm::replying("Lean on your Focus strengths this week.")),
        app.mailer.clone(),
    );
    let now = Utc::now();
    let (first, second) = tokio::join!(
        process_weekly_emails(&app.state, now),
        process_weekly_emails(&other, now),
    );
    let first = first.unwrap().unwrap();
    let second = second.unwrap().unwrap();
    assert_eq!(first.sent + second.sent, 1);
    assert_eq!(first.skipped_today + second.skipped_today, 1);

    assert_eq!(app.mailer.sent().len(), 1);
    assert_eq!(weekly_count(&app, &user.user_id), 1);
    assert_eq!(
        app.count("SELECT COUNT(*) FROM email_logs WHERE email_type = 'weekly_coaching'"),
        1
    );
}

#[tokio::test]
async fn cron_rejects_a_prefix_of_the_secret() {
    let app = TestApp::new();
    let prefix = &CRON_SECRET[..CRON_SECRET.len() - 1];
    let (status, _) = app
        .json("POST", "/api/cron/weekly-emails", Some(prefix), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(app.mailer.sent().len(), 0);
}

#[tokio::test]
async fn cron_answers_conflict_while_a_pass_is_running() {
    let app = TestApp::new();
    let _running = app.state.weekly_pass.lock().await;

    let (status, body) = app
        .json("POST", "/api/cron/weekly-emails", Some(CRON_SECRET), None)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "weekly email pass already running");
}
