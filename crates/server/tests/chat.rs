mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{FakeLlm, FakeMailer, TestApp, STRENGTHS};

#[tokio::test]
async fn first_message_starts_a_titled_conversation() {
    let app = TestApp::new();
    let session = app.register("cat@example.com", "Cat").await;
    app.set_strengths(&session.user_id, &STRENGTHS);
    let token = Some(session.access_token.as_str());

    let (status, reply) = app
        .json(
            "POST",
            "/api/chat",
            token,
            Some(json!({"message": "How do I use Focus in planning?", "mode": "my-strengths"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reply["message"]["role"], "assistant");
    assert_eq!(
        reply["message"]["content"],
        "Lean on your Focus strengths this week."
    );
    let conversation_id = reply["conversation_id"].as_str().unwrap().to_string();
    assert!(!reply["title"].as_str().unwrap().is_empty());

    // Title and chat completions are both logged.
    assert_eq!(app.llm.calls(), 2);
    assert_eq!(app.count("SELECT COUNT(*) FROM ai_usage_logs"), 2);
    assert_eq!(
        app.count(
            "SELECT COUNT(*) FROM ai_usage_logs \
             WHERE request_type = 'chat' AND total_tokens = 200"
        ),
        1
    );

    // The coach sees the manager's strengths.
    let requests = app.llm.requests.lock().unwrap().clone();
    let system = requests.last().unwrap().system.clone().unwrap();
    assert!(system.contains("Achiever"));

    let (status, detail) = app
        .json(
            "GET",
            &format!("/api/conversations/{conversation_id}"),
            token,
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["conversation"]["mode"], "my_strengths");
    let roles: Vec<&str> = detail["messages"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["role"].as_str().unwrap())
        .collect();
    assert_eq!(roles, ["user", "assistant"]);
}

#[tokio::test]
async fn follow_up_messages_send_history() {
    let app = TestApp::new();
    let session = app.register("his@example.com", "Hal").await;
    let token = Some(session.access_token.as_str());

    let (_, first) = app
        .json("POST", "/api/chat", token, Some(json!({"message": "Hello coach"})))
        .await;
    let conversation_id = first["conversation_id"].as_str().unwrap();

    let (status, second) = app
        .json(
            "POST",
            "/api/chat",
            token,
            Some(json!({"message": "And my team?", "conversation_id": conversation_id})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["conversation_id"], conversation_id);
    assert_eq!(second["title"], first["title"]);

    let requests = app.llm.requests.lock().unwrap().clone();
    let last = requests.last().unwrap();
    assert_eq!(last.messages.len(), 3);
    assert_eq!(last.messages[2].content, "And my team?");
}

#[tokio::test]
async fn llm_failure_is_an_error_but_keeps_the_question() {
    let app = TestApp::with(FakeLlm::failing(), FakeMailer::unconfigured());
    let session = app.register("err@example.com", "Eve").await;

    let (status, body) = app
        .json(
            "POST",
            "/api/chat",
            Some(&session.access_token),
            Some(json!({"message": "Will this work?"})),
        )
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].is_string());
    assert_eq!(app.count("SELECT COUNT(*) FROM chat_conversations"), 1);
    assert_eq!(
        app.count("SELECT COUNT(*) FROM chat_messages WHERE role = 'user'"),
        1
    );
    assert_eq!(app.count("SELECT COUNT(*) FROM ai_usage_logs"), 0);
}

#[tokio::test]
async fn conversations_are_listed_and_deleted() {
    let app = TestApp::new();
    let owner = app.register("own@example.com", "Oma").await;
    let stranger = app.register("str@example.com", "Sia").await;

    let (_, reply) = app
        .json(
            "POST",
            "/api/chat",
            Some(&owner.access_token),
            Some(json!({"message": "Plan my week", "mode": "team_strengths"})),
        )
        .await;
    let id = reply["conversation_id"].as_str().unwrap();

    let (_, list) = app
        .json("GET", "/api/conversations", Some(&owner.access_token), None)
        .await;
    assert_eq!(list["conversations"].as_array().unwrap().len(), 1);
    assert_eq!(list["conversations"][0]["mode"], "team_strengths");

    let (status, _) = app
        .json(
            "GET",
            &format!("/api/conversations/{id}"),
            Some(&stranger.access_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .json(
            "DELETE",
            &format!("/api/conversations/{id}"),
            Some(&owner.access_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.count("SELECT COUNT(*) FROM chat_messages"), 0);
}

#[tokio::test]
async fn chat_rejects_bad_input() {
    let app = TestApp::new();
    let session = app.register("bad@example.com", "Bo").await;
    let token = Some(session.access_token.as_str());

    let (status, _) = app
        .json("POST", "/api/chat", token, Some(json!({"message": "   "})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .json(
            "POST",
            "/api/chat",
            token,
            Some(json!({"message": "hi", "mode": "everyone"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .json(
            "POST",
            "/api/chat",
            token,
            Some(json!({"message": "hi", "conversation_id": "missing"})),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(app.llm.calls(), 0);
}

#[tokio::test]
async fn ai_helpers_fall_back_without_a_provider() {
    let app = TestApp::with(FakeLlm::unconfigured(), FakeMailer::unconfigured());
    let session = app.register("fb@example.com", "Fay").await;
    let token = Some(session.access_token.as_str());

    let (status, body) = app
        .json(
            "POST",
            "/api/generate-title",
            token,
            Some(json!({"message": "How can I help my team lean into their Achiever strengths?"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["title"].as_str().unwrap().chars().count() <= 50);

    let (status, body) = app
        .json(
            "POST",
            "/api/followup-questions",
            token,
            Some(json!({"question": "What is Woo?", "answer": "Winning others over."})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["questions"].as_array().unwrap().len(), 3);

    let (status, body) = app
        .json(
            "POST",
            "/api/starter-questions",
            token,
            Some(json!({"mode": "team_strengths"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["questions"].as_array().unwrap().len(), 4);

    assert_eq!(app.llm.calls(), 0);
    assert_eq!(app.count("SELECT COUNT(*) FROM ai_usage_logs"), 0);
}

#[tokio::test]
async fn ai_helpers_log_usage_when_the_model_answers() {
    let app = TestApp::with(FakeLlm::replying("Leading with Focus"), FakeMailer::unconfigured());
    let session = app.register("use@example.com", "Uma").await;

    let (status, body) = app
        .json(
            "POST",
            "/api/generate-title",
            Some(&session.access_token),
            Some(json!({"message": "Help me prioritise"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Leading with Focus");
    assert_eq!(
        app.count("SELECT COUNT(*) FROM ai_usage_logs WHERE request_type = 'generate_title'"),
        1
    );
}
