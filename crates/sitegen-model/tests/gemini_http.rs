//! Gemini client against a local mock endpoint.
//!
//! The mock serves `POST /v1beta/models/{model}:generateContent` and
//! answers according to the model name, so each test picks its scenario
//! through `ModelConfig::text_model` / `image_model`.

use serde_json::{json, Value};
use sitegen_model::{
    strip_code_fences, GeminiClient, ImageModel, ImageOutput, ModelConfig, ModelError, RetryPolicy,
    TextModel, TextRequest,
};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use warp::http::StatusCode;
use warp::Filter;

fn text_response(text: &str) -> Value {
    json!({ "candidates": [{ "content": { "parts": [{ "text": text }] } }] })
}

/// Start the mock server; returns its address and a counter of requests
/// that reached the `flaky` model.
async fn spawn_mock() -> (SocketAddr, Arc<AtomicUsize>) {
    let flaky_calls = Arc::new(AtomicUsize::new(0));
    let counter = flaky_calls.clone();

    let route = warp::post()
        .and(warp::path!("v1beta" / "models" / String))
        .and(warp::header::<String>("x-goog-api-key"))
        .and(warp::body::json::<Value>())
        .map(move |target: String, key: String, body: Value| {
            let model = target.trim_end_matches(":generateContent").to_string();
            if key != "test-key" {
                return warp::reply::with_status(
                    warp::reply::json(&json!({ "error": { "message": "bad key" } })),
                    StatusCode::FORBIDDEN,
                );
            }
            let (status, payload) = match model.as_str() {
                "echo-schema" => (
                    StatusCode::OK,
                    text_response(&format!(
                        "```json\n{}\n```",
                        body["generationConfig"]["responseSchema"]
                    )),
                ),
                "echo-system" => (
                    StatusCode::OK,
                    text_response(
                        body["systemInstruction"]["parts"][0]["text"]
                            .as_str()
                            .unwrap_or("none"),
                    ),
                ),
                "painter" => (
                    StatusCode::OK,
                    json!({ "candidates": [{ "content": { "parts": [
                        { "text": "Here is your image" },
                        { "inlineData": { "mimeType": "image/png", "data": "aGVsbG8=" } }
                    ] } }] }),
                ),
                "refuser" => (StatusCode::OK, text_response("I can't depict people.")),
                "flaky" => {
                    if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                        (
                            StatusCode::SERVICE_UNAVAILABLE,
                            json!({ "error": { "message": "overloaded" } }),
                        )
                    } else {
                        (StatusCode::OK, text_response("{\"ok\":true}"))
                    }
                }
                _ => (
                    StatusCode::NOT_FOUND,
                    json!({ "error": { "message": "Requested entity was not found." } }),
                ),
            };
            warp::reply::with_status(warp::reply::json(&payload), status)
        });

    let (addr, server) = warp::serve(route).bind_ephemeral(([127, 0, 0, 1], 0));
    tokio::spawn(server);
    (addr, flaky_calls)
}

fn client(addr: SocketAddr, text_model: &str, image_model: &str) -> GeminiClient {
    let mut config = ModelConfig::new()
        .with_api_base(format!("http://{addr}/v1beta"))
        .with_api_key("test-key")
        .with_text_retry(RetryPolicy {
            max_attempts: 2,
            base_backoff_ms: 1,
        });
    config.text_model = text_model.to_string();
    config.image_model = image_model.to_string();
    GeminiClient::new(config).unwrap()
}

#[tokio::test]
async fn text_call_sends_response_schema() {
    let (addr, _) = spawn_mock().await;
    let client = client(addr, "echo-schema", "painter");

    let request = TextRequest::new("write copy")
        .with_response_schema(json!({ "type": "OBJECT", "required": ["hero"] }));
    let raw = client.generate_text(&request).await.unwrap();

    let echoed: Value = serde_json::from_str(&strip_code_fences(&raw)).unwrap();
    assert_eq!(echoed["type"], "OBJECT");
    assert_eq!(echoed["required"][0], "hero");
}

#[tokio::test]
async fn text_call_sends_system_instruction() {
    let (addr, _) = spawn_mock().await;
    let client = client(addr, "echo-system", "painter");

    let request = TextRequest::new("edit").with_system_instruction("You are an AI editor");
    let raw = client.generate_text(&request).await.unwrap();
    assert_eq!(raw, "You are an AI editor");
}

#[tokio::test]
async fn image_call_returns_first_inline_image() {
    let (addr, _) = spawn_mock().await;
    let client = client(addr, "echo-schema", "painter");

    let output = client.generate_image("a truck").await.unwrap();
    match output {
        ImageOutput::Image(image) => {
            assert_eq!(image.to_data_uri().unwrap(), "data:image/png;base64,aGVsbG8=");
        }
        ImageOutput::Refusal(text) => panic!("unexpected refusal: {text}"),
    }
}

#[tokio::test]
async fn text_only_image_answer_is_a_refusal() {
    let (addr, _) = spawn_mock().await;
    let client = client(addr, "echo-schema", "refuser");

    let output = client.generate_image("a technician").await.unwrap();
    assert_eq!(output, ImageOutput::Refusal("I can't depict people.".to_string()));
}

#[tokio::test]
async fn unknown_model_maps_to_model_not_found() {
    let (addr, _) = spawn_mock().await;
    let client = client(addr, "retired-model", "painter");

    let err = client.generate_text(&TextRequest::new("x")).await.unwrap_err();
    match err {
        ModelError::ModelNotFound(message) => {
            assert_eq!(message, "Requested entity was not found.");
        }
        other => panic!("expected ModelNotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn transient_status_is_retried_once() {
    let (addr, flaky_calls) = spawn_mock().await;
    let client = client(addr, "flaky", "painter");

    let raw = client.generate_text(&TextRequest::new("x")).await.unwrap();
    assert_eq!(raw, "{\"ok\":true}");
    assert_eq!(flaky_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn wrong_key_is_a_credential_problem() {
    let (addr, _) = spawn_mock().await;
    let mut config = client(addr, "echo-schema", "painter").config().clone();
    config.api_key = Some("other".into());
    let client = GeminiClient::new(config).unwrap();

    let err = client.generate_image("x").await.unwrap_err();
    assert!(err.is_credential_problem());
}
