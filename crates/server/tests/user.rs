mod common;

use std::time::Duration;

use axum::http::StatusCode;
use serde_json::json;

use common::{five_strengths, TestApp};

async fn wait_for_email_logs(app: &TestApp, expected: i64) {
    for _ in 0..200 {
        if app.count("SELECT COUNT(*) FROM email_logs") >= expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("expected {expected} email log rows");
}

#[tokio::test]
async fn saving_strengths_sends_welcome_email_once() {
    let app = TestApp::new();
    let session = app.register("wes@example.com", "Wes").await;
    let token = Some(session.access_token.as_str());

    let (status, profile) = app
        .json(
            "PATCH",
            "/api/user/strengths",
            token,
            Some(json!({"strengths": ["achiever", "learner", "FOCUS", "Relator", "Input"]})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["top_strengths"], five_strengths());

    wait_for_email_logs(&app, 1).await;
    let sent = app.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "wes@example.com");
    assert!(sent[0].html.contains("https://app.test/api/email/unsubscribe?token="));
    assert_eq!(
        app.text("SELECT status FROM email_logs WHERE email_type = 'welcome'").as_deref(),
        Some("sent")
    );

    // Editing an existing profile does not re-send.
    let (status, _) = app
        .json(
            "PATCH",
            "/api/user/strengths",
            token,
            Some(json!({"strengths": ["Woo", "Learner", "Focus", "Relator", "Input"]})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(app.mailer.sent().len(), 1);
}

#[tokio::test]
async fn strengths_must_be_five_distinct_known_names() {
    let app = TestApp::with(common::FakeLlm::unconfigured(), common::FakeMailer::unconfigured());
    let session = app.register("ivy@example.com", "Ivy").await;
    let token = Some(session.access_token.as_str());

    let (status, body) = app
        .json(
            "PATCH",
            "/api/user/strengths",
            token,
            Some(json!({"strengths": ["Achiever", "Learner", "Focus", "Relator", "Telepathy"]})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "unknown strength: Telepathy");

    let (status, _) = app
        .json(
            "PATCH",
            "/api/user/strengths",
            token,
            Some(json!({"strengths": ["Achiever", "achiever", "Focus", "Relator", "Input"]})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .json(
            "PATCH",
            "/api/user/strengths",
            token,
            Some(json!({"strengths": ["Achiever"]})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn weekly_coaching_can_be_toggled() {
    let app = TestApp::new();
    let session = app.register("tog@example.com", "Tog").await;
    let token = Some(session.access_token.as_str());

    let (status, prefs) = app
        .json("GET", "/api/user/email-preferences", token, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(prefs["weekly_coaching"], true);
    assert_eq!(prefs["weekly_email_count"], 0);

    let (status, prefs) = app
        .json(
            "PATCH",
            "/api/user/email-preferences",
            token,
            Some(json!({"weekly_coaching": false})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(prefs["weekly_coaching"], false);

    let (_, prefs) = app
        .json("GET", "/api/user/email-preferences", token, None)
        .await;
    assert_eq!(prefs["weekly_coaching"], false);
}
