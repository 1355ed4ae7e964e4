use axum::{
    Json, Router,
    extract::{Path, RawQuery, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

use memo_summary::services::{GeminiProvider, ProviderError, SummaryProvider};

#[derive(Clone, Default)]
struct Captured {
    calls: Arc<Mutex<Vec<Call>>>,
}

struct Call {
    model_action: String,
    api_key: String,
    query: Option<String>,
    body: Value,
}

async fn spawn_fake_gemini(status: StatusCode, reply: Value) -> (String, Captured) {
    let captured = Captured::default();

    let app = Router::new()
        .route(
            "/v1beta/models/{model_action}",
            post(
                move |State(captured): State<Captured>,
                      Path(model_action): Path<String>,
                      RawQuery(query): RawQuery,
                      headers: HeaderMap,
                      Json(body): Json<Value>| {
                    let reply = reply.clone();
                    async move {
                        let api_key = headers
                            .get("x-goog-api-key")
                            .and_then(|v| v.to_str().ok())
                            .unwrap_or_default()
                            .to_string();
                        captured.calls.lock().unwrap().push(Call {
                            model_action,
                            api_key,
                            query,
                            body,
                        });
                        (status, Json(reply)).into_response()
                    }
                },
            ),
        )
        .with_state(captured.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}", addr), captured)
}

#[tokio::test]
async fn sends_prompt_and_key_and_reads_text() {
    let (base_url, captured) = spawn_fake_gemini(
        StatusCode::OK,
        json!({ "candidates": [{ "content": { "parts": [{ "text": "- 要点A\n- 要点B" }] } }] }),
    )
    .await;

    let provider = GeminiProvider::new(base_url, "gemini-2.5-flash");
    let text = provider.generate("secret-key", "要約して: 本文").await.unwrap();
    assert_eq!(text, "- 要点A\n- 要点B");

    let calls = captured.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    let call = &calls[0];
    assert_eq!(call.model_action, "gemini-2.5-flash:generateContent");
    assert_eq!(call.api_key, "secret-key");
    assert!(call.query.is_none());
    assert_eq!(call.body["contents"][0]["parts"][0]["text"], "要約して: 本文");
}

#[tokio::test]
async fn non_success_status_is_reported_once() {
    let (base_url, captured) = spawn_fake_gemini(
        StatusCode::TOO_MANY_REQUESTS,
        json!({ "error": { "message": "quota" } }),
    )
    .await;

    let provider = GeminiProvider::new(base_url, "gemini-2.5-flash");
    let err = provider.generate("k", "p").await.unwrap_err();
    match err {
        ProviderError::Status { status, body } => {
            assert_eq!(status, 429);
            assert!(body.contains("quota"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    // リトライはしない
    assert_eq!(captured.calls.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn unreachable_endpoint_is_http_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let provider = GeminiProvider::new(format!("http://{}", addr), "m");
    let err = provider.generate("SECRETKEY123", "p").await.unwrap_err();
    assert!(matches!(err, ProviderError::Http(_)));
    assert!(!err.to_string().contains("SECRETKEY123"));
}
