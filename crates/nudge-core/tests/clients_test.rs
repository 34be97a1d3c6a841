//! Integration tests for the HTTP clients.
//!
//! Each test stands up a local axum stub that imitates the provider endpoint,
//! points the real client at it, and checks both the outgoing request and the
//! handling of the response.

use std::sync::{Arc, Mutex};

use axum::Json;
use axum::Router;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use serde_json::{Value, json};

use nudge_core::generator::{
    GeminiClient, GenerateError, GeneratorConfig, OpenAiClient, ProviderKind,
};
use nudge_core::notes::{NoteStore, NoteStoreError, NotionClient, NotionConfig};
use nudge_core::{
    AnswerSet, PlanGenerator, PlanItem, PlanRequestHandler, PromptStyle, build_prompt,
};
use nudge_test_utils::spawn_stub_server;

/// Everything the stub saw: (path segment, headers, JSON body).
type Seen = Arc<Mutex<Vec<(String, HeaderMap, Value)>>>;

fn header(headers: &HeaderMap, name: &str) -> String {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

// -----------------------------------------------------------------------
// Gemini
// -----------------------------------------------------------------------

async fn gemini_ok(
    State(seen): State<Seen>,
    Path(model_call): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    seen.lock().unwrap().push((model_call, headers, body));
    Json(json!({
        "candidates": [{
            "content": { "parts": [
                { "text": "제목: 산책\n내용: 매일 20분\n" },
                { "text": "제목: 독서\n내용: 자기 전 10쪽" }
            ]}
        }]
    }))
}

#[tokio::test]
async fn gemini_client_sends_key_and_parses_parts() {
    let seen: Seen = Arc::default();
    let router = Router::new()
        .route("/v1beta/models/{model_call}", post(gemini_ok))
        .with_state(seen.clone());
    let (base_url, _server) = spawn_stub_server(router).await;

    let client = GeminiClient::new(
        GeneratorConfig::new(ProviderKind::Gemini)
            .with_base_url(base_url)
            .with_model("gemini-test")
            .with_api_key("g-key"),
    )
    .unwrap();

    let prompt = build_prompt(&AnswerSet::new("a", "b", "c"), PromptStyle::Plain);
    let text = client.generate(&prompt).await.unwrap();
    assert_eq!(
        text,
        "제목: 산책\n내용: 매일 20분\n제목: 독서\n내용: 자기 전 10쪽"
    );

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    let (model_call, headers, body) = &seen[0];
    assert_eq!(model_call, "gemini-test:generateContent");
    assert_eq!(header(headers, "x-goog-api-key"), "g-key");
    assert_eq!(body["contents"][0]["parts"][0]["text"], prompt.user);
}

#[tokio::test]
async fn gemini_error_status_is_reported_with_body() {
    let router = Router::new().route(
        "/v1beta/models/{model_call}",
        post(|| async { (StatusCode::TOO_MANY_REQUESTS, "RESOURCE_EXHAUSTED") }),
    );
    let (base_url, _server) = spawn_stub_server(router).await;

    let client = GeminiClient::new(
        GeneratorConfig::new(ProviderKind::Gemini)
            .with_base_url(base_url)
            .with_api_key("g-key"),
    )
    .unwrap();

    let err = client
        .generate(&build_prompt(&AnswerSet::default(), PromptStyle::Plain))
        .await
        .unwrap_err();
    match err {
        GenerateError::Status { status, body, .. } => {
            assert_eq!(status, 429);
            assert_eq!(body, "RESOURCE_EXHAUSTED");
        }
        other => panic!("expected Status, got {other:?}"),
    }
}

#[tokio::test]
async fn missing_key_fails_without_a_request() {
    let seen: Seen = Arc::default();
    let router = Router::new()
        .route("/v1beta/models/{model_call}", post(gemini_ok))
        .with_state(seen.clone());
    let (base_url, _server) = spawn_stub_server(router).await;

    let client =
        GeminiClient::new(GeneratorConfig::new(ProviderKind::Gemini).with_base_url(base_url))
            .unwrap();
    let err = client
        .generate(&build_prompt(&AnswerSet::default(), PromptStyle::Plain))
        .await
        .unwrap_err();

    assert!(matches!(err, GenerateError::MissingApiKey { .. }));
    assert!(seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn unreachable_provider_is_a_transport_error() {
    // Bind then drop a listener to get a port nothing is serving on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = OpenAiClient::new(
        GeneratorConfig::new(ProviderKind::OpenAi)
            .with_base_url(format!("http://{addr}"))
            .with_api_key("sk"),
    )
    .unwrap();
    let err = client
        .generate(&build_prompt(&AnswerSet::default(), PromptStyle::WithSystemRole))
        .await
        .unwrap_err();
    assert!(matches!(err, GenerateError::Transport { .. }), "got: {err}");
}

// -----------------------------------------------------------------------
// OpenAI
// -----------------------------------------------------------------------

async fn openai_ok(
    State(seen): State<Seen>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    seen.lock()
        .unwrap()
        .push(("chat/completions".to_string(), headers, body));
    Json(json!({
        "id": "chatcmpl-1",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": "제목: A\n내용: B" }
        }]
    }))
}

#[tokio::test]
async fn openai_client_sends_bearer_and_system_message() {
    let seen: Seen = Arc::default();
    let router = Router::new()
        .route("/v1/chat/completions", post(openai_ok))
        .with_state(seen.clone());
    let (base_url, _server) = spawn_stub_server(router).await;

    let client = OpenAiClient::new(
        GeneratorConfig::new(ProviderKind::OpenAi)
            .with_base_url(format!("{base_url}/v1"))
            .with_model("gpt-test")
            .with_api_key("sk-test"),
    )
    .unwrap();

    let prompt = build_prompt(&AnswerSet::new("a", "b", "c"), PromptStyle::WithSystemRole);
    assert_eq!(client.generate(&prompt).await.unwrap(), "제목: A\n내용: B");

    let seen = seen.lock().unwrap();
    let (_, headers, body) = &seen[0];
    assert_eq!(header(headers, "authorization"), "Bearer sk-test");
    assert_eq!(body["model"], "gpt-test");
    assert_eq!(body["messages"][0]["role"], "system");
    assert_eq!(body["messages"][1]["content"], prompt.user);
}

// -----------------------------------------------------------------------
// Notion
// -----------------------------------------------------------------------

async fn notion_ok(
    State(seen): State<Seen>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    seen.lock().unwrap().push(("pages".to_string(), headers, body));
    Json(json!({ "object": "page", "id": "page-1" }))
}

fn notion_config(base_url: String) -> NotionConfig {
    NotionConfig::from_parts(Some("secret_abc".to_string()), Some("db-42".to_string()))
        .unwrap()
        .with_base_url(base_url)
}

#[tokio::test]
async fn notion_client_creates_page_in_database() {
    let seen: Seen = Arc::default();
    let router = Router::new()
        .route("/v1/pages", post(notion_ok))
        .with_state(seen.clone());
    let (base_url, _server) = spawn_stub_server(router).await;

    let client = NotionClient::new(notion_config(base_url)).unwrap();
    client
        .create_item(&PlanItem::new("산책", "매일 20분"))
        .await
        .unwrap();

    let seen = seen.lock().unwrap();
    let (_, headers, body) = &seen[0];
    assert_eq!(header(headers, "authorization"), "Bearer secret_abc");
    assert_eq!(header(headers, "notion-version"), "2022-06-28");
    assert_eq!(body["parent"]["database_id"], "db-42");
    assert_eq!(body["properties"]["제목"]["title"][0]["text"]["content"], "산책");
    assert_eq!(
        body["properties"]["내용"]["rich_text"][0]["text"]["content"],
        "매일 20분"
    );
}

#[tokio::test]
async fn notion_rejection_is_a_status_error() {
    let router = Router::new().route(
        "/v1/pages",
        post(|| async { (StatusCode::UNAUTHORIZED, r#"{"code":"unauthorized"}"#) }),
    );
    let (base_url, _server) = spawn_stub_server(router).await;

    let client = NotionClient::new(notion_config(base_url)).unwrap();
    let err = client
        .create_item(&PlanItem::new("a", "b"))
        .await
        .unwrap_err();
    match err {
        NoteStoreError::Status { status, body, .. } => {
            assert_eq!(status, 401);
            assert!(body.contains("unauthorized"));
        }
        other => panic!("expected Status, got {other:?}"),
    }
}

// -----------------------------------------------------------------------
// End to end over HTTP
// -----------------------------------------------------------------------

#[tokio::test]
async fn handler_over_real_clients_writes_each_item() {
    let gen_seen: Seen = Arc::default();
    let notion_seen: Seen = Arc::default();

    let gemini = Router::new()
        .route("/v1beta/models/{model_call}", post(gemini_ok))
        .with_state(gen_seen.clone());
    let notion = Router::new()
        .route("/v1/pages", post(notion_ok))
        .with_state(notion_seen.clone());
    let (gemini_url, _g) = spawn_stub_server(gemini).await;
    let (notion_url, _n) = spawn_stub_server(notion).await;

    let generator = GeminiClient::new(
        GeneratorConfig::new(ProviderKind::Gemini)
            .with_base_url(gemini_url)
            .with_api_key("g-key"),
    )
    .unwrap();
    let notes = NotionClient::new(notion_config(notion_url)).unwrap();
    let handler = PlanRequestHandler::new(Arc::new(generator), PromptStyle::Plain)
        .with_note_store(Arc::new(notes));

    let text = handler
        .handle(&AnswerSet::new("a", "b", "c"))
        .await
        .render();

    assert!(text.ends_with("Notion에 일정이 성공적으로 추가되었습니다."));
    let pages = notion_seen.lock().unwrap();
    assert_eq!(pages.len(), 2);
    assert_eq!(
        pages[0].2["properties"]["제목"]["title"][0]["text"]["content"],
        "산책"
    );
    assert_eq!(
        pages[1].2["properties"]["내용"]["rich_text"][0]["text"]["content"],
        "자기 전 10쪽"
    );
}
