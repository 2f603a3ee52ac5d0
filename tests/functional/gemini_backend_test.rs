//! Functional tests for the Gemini backend and the parallel generation client

use std::sync::Arc;

use image_creator::backend::GeminiBackend;
use image_creator::config::ApiConfig;
use image_creator::error::AppError;
use image_creator::generation::{GenerationClient, GenerationRequest};
use image_creator::upload::UploadedImage;
use serde_json::{json, Value};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MODEL: &str = "gemini-2.5-flash-image-preview";
const ENDPOINT: &str = "/v1beta/models/gemini-2.5-flash-image-preview:generateContent";

fn client_for(server: &MockServer) -> GenerationClient {
    let config = ApiConfig {
        key: "test-key".to_string(),
        base_url: server.uri(),
        model: MODEL.to_string(),
    };
    GenerationClient::new(Arc::new(GeminiBackend::new(&config).unwrap()))
}

fn request() -> GenerationRequest {
    GenerationRequest::new(
        vec![
            UploadedImage::new("iVBORw0KGgo=", "image/png", "a.png"),
            UploadedImage::new("/9j/4AAQ", "image/jpeg", "b.jpg"),
        ],
        "a warrior",
        "",
        true,
    )
}

fn image_response(data: &str) -> Value {
    json!({
        "candidates": [{
            "content": {
                "role": "model",
                "parts": [
                    { "text": "Here is your character." },
                    { "inlineData": { "mimeType": "image/png", "data": data } }
                ]
            },
            "finishReason": "STOP"
        }]
    })
}

#[tokio::test]
async fn test_generate_issues_four_identical_calls() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .and(header("x-goog-api-key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(image_response("R0VOMQ==")))
        .expect(4)
        .mount(&server)
        .await;

    let result = client_for(&server).generate(request()).await.unwrap();

    assert_eq!(result.len(), 4);
    assert!(result.images().iter().all(|image| image == "R0VOMQ=="));

    let received = server.received_requests().await.unwrap();
    assert_eq!(received.len(), 4);

    let bodies: Vec<Value> = received
        .iter()
        .map(|r| serde_json::from_slice(&r.body).unwrap())
        .collect();
    assert!(bodies.iter().all(|body| body == &bodies[0]));

    let parts = bodies[0]["contents"][0]["parts"].as_array().unwrap();
    assert_eq!(parts.len(), 3);
    assert_eq!(parts[0]["inlineData"]["mimeType"], "image/png");
    assert_eq!(parts[0]["inlineData"]["data"], "iVBORw0KGgo=");
    assert_eq!(parts[1]["inlineData"]["mimeType"], "image/jpeg");
    let prompt = parts[2]["text"].as_str().unwrap();
    assert!(prompt.contains("Character Description: a warrior"));
    assert!(prompt.contains("transparent background"));
    assert_eq!(
        bodies[0]["generationConfig"]["responseModalities"],
        json!(["IMAGE", "TEXT"])
    );
}

#[tokio::test]
async fn test_one_failed_call_fails_the_batch() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": {
                "code": 429,
                "message": "Resource has been exhausted",
                "status": "RESOURCE_EXHAUSTED"
            }
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_json(image_response("R0VOMQ==")))
        .mount(&server)
        .await;

    let err = client_for(&server).generate(request()).await.unwrap_err();

    assert!(matches!(err, AppError::Generation(_)));
    assert_eq!(
        err.to_string(),
        "Failed to generate images: Generation API returned 429: Resource has been exhausted"
    );
    // The other calls still ran to completion.
    assert_eq!(server.received_requests().await.unwrap().len(), 4);
}

#[tokio::test]
async fn test_plain_error_body_is_kept() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
        .mount(&server)
        .await;

    let err = client_for(&server).generate(request()).await.unwrap_err();

    assert_eq!(
        err.to_string(),
        "Failed to generate images: Generation API returned 503: upstream unavailable"
    );
}

#[tokio::test]
async fn test_text_only_response_is_an_empty_image() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": { "parts": [ { "text": "I can't help with that." } ] }
            }]
        })))
        .mount(&server)
        .await;

    let err = client_for(&server).generate(request()).await.unwrap_err();

    assert_eq!(
        err.to_string(),
        "Failed to generate images: One of the generated images was empty. The model may have refused the prompt."
    );
}

#[tokio::test]
async fn test_blocked_prompt_is_an_empty_image() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "promptFeedback": { "blockReason": "SAFETY" }
        })))
        .mount(&server)
        .await;

    let err = client_for(&server).generate(request()).await.unwrap_err();

    assert!(err.to_string().contains("The model may have refused the prompt."));
}

#[tokio::test]
async fn test_empty_image_list_makes_no_calls() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(image_response("R0VOMQ==")))
        .expect(0)
        .mount(&server)
        .await;

    let empty = GenerationRequest::new(Vec::new(), "a warrior", "", false);
    let err = client_for(&server).generate(empty).await.unwrap_err();

    assert_eq!(
        err.to_string(),
        "Failed to generate images: At least one image must be provided."
    );
}

#[tokio::test]
async fn test_unreachable_server_is_wrapped() {
    let config = ApiConfig {
        key: "test-key".to_string(),
        base_url: "http://127.0.0.1:1".to_string(),
        model: MODEL.to_string(),
    };
    let client = GenerationClient::new(Arc::new(GeminiBackend::new(&config).unwrap()));

    let err = client.generate(request()).await.unwrap_err();

    assert!(err
        .to_string()
        .starts_with("Failed to generate images: HTTP client error"));
}
