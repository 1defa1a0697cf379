//! Integration tests for the Gemini and OpenAI-compatible clients
//!
//! A local axum server stands in for each provider so the exact request shape
//! and the handling of each response variant can be checked without network
//! access or credentials.

use ai_commenter::{
    AppConfig, EncodedImage, Error, ErrorKind, GeminiClient, OpenAiClient, Provider, ReplyModel,
    build_model, build_prompt, encode_image,
};
use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use serde_json::{Value, json};
use std::io::Cursor;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// What the stub provider saw on its last request.
#[derive(Default)]
struct Seen {
    path: Option<String>,
    headers: Option<HeaderMap>,
    body: Option<Value>,
}

#[derive(Clone)]
struct Stub {
    seen: Arc<Mutex<Seen>>,
    status: StatusCode,
    reply: Arc<String>,
    delay: Duration,
}

impl Stub {
    fn new(status: StatusCode, reply: impl Into<String>) -> Self {
        Self {
            seen: Arc::new(Mutex::new(Seen::default())),
            status,
            reply: Arc::new(reply.into()),
            delay: Duration::ZERO,
        }
    }

    fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

async fn record(stub: &Stub, path: String, headers: HeaderMap, body: Value) -> Response {
    {
        let mut seen = stub.seen.lock().unwrap();
        seen.path = Some(path);
        seen.headers = Some(headers);
        seen.body = Some(body);
    }
    if !stub.delay.is_zero() {
        tokio::time::sleep(stub.delay).await;
    }
    (
        stub.status,
        [("content-type", "application/json")],
        stub.reply.to_string(),
    )
        .into_response()
}

async fn gemini_handler(
    State(stub): State<Stub>,
    Path(action): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    record(&stub, action, headers, body).await
}

async fn openai_handler(
    State(stub): State<Stub>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    record(&stub, "chat/completions".to_string(), headers, body).await
}

async fn spawn_provider(stub: Stub) -> String {
    let app = Router::new()
        .route("/models/{action}", post(gemini_handler))
        .route("/chat/completions", post(openai_handler))
        .with_state(stub);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn config(provider: Provider, base_url: &str) -> AppConfig {
    AppConfig::builder()
        .provider(provider)
        .api_key("test-key")
        .model("vision-test")
        .base_url(base_url)
        .timeout(1)
        .build()
        .unwrap()
}

fn sample_image() -> EncodedImage {
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(10, 10, Rgb([0, 128, 0])));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png).unwrap();
    encode_image(&buf.into_inner()).unwrap()
}

fn gemini_ok(text: &str) -> String {
    json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": text}]},
            "finishReason": "STOP"
        }]
    })
    .to_string()
}

#[tokio::test]
async fn test_gemini_request_shape_and_reply() {
    let stub = Stub::new(StatusCode::OK, gemini_ok("Nice colors!\n"));
    let base = spawn_provider(stub.clone()).await;
    let client = GeminiClient::new(&config(Provider::Gemini, &base)).unwrap();

    let image = sample_image();
    let prompt = build_prompt("Funny");
    let reply = client.generate(&image, &prompt).await.unwrap();
    assert_eq!(reply, "Nice colors!");

    let seen = stub.seen.lock().unwrap();
    assert_eq!(seen.path.as_deref(), Some("vision-test:generateContent"));

    let headers = seen.headers.as_ref().unwrap();
    assert_eq!(headers["x-goog-api-key"], "test-key");

    let body = seen.body.as_ref().unwrap();
    let parts = body["contents"][0]["parts"].as_array().unwrap();
    assert_eq!(parts.len(), 2);
    assert_eq!(parts[0]["text"], prompt.as_str());
    assert_eq!(parts[1]["inline_data"]["mime_type"], "image/png");
    assert_eq!(parts[1]["inline_data"]["data"], image.data());
}

#[tokio::test]
async fn test_gemini_http_error_is_model_call_error() {
    let stub = Stub::new(
        StatusCode::FORBIDDEN,
        r#"{"error":{"code":403,"message":"API key not valid"}}"#,
    );
    let base = spawn_provider(stub).await;
    let client = GeminiClient::new(&config(Provider::Gemini, &base)).unwrap();

    let err = client.generate(&sample_image(), "prompt").await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ModelCall);
    let message = err.to_string();
    assert!(message.contains("403"), "got: {}", message);
    assert!(message.contains("API key not valid"), "got: {}", message);
}

#[tokio::test]
async fn test_gemini_empty_candidates() {
    let stub = Stub::new(StatusCode::OK, r#"{"candidates":[]}"#);
    let base = spawn_provider(stub).await;
    let client = GeminiClient::new(&config(Provider::Gemini, &base)).unwrap();

    let err = client.generate(&sample_image(), "prompt").await.unwrap_err();
    assert!(matches!(err, Error::ModelCall(_)));
}

#[tokio::test]
async fn test_gemini_malformed_body() {
    let stub = Stub::new(StatusCode::OK, "this is not json");
    let base = spawn_provider(stub).await;
    let client = GeminiClient::new(&config(Provider::Gemini, &base)).unwrap();

    let err = client.generate(&sample_image(), "prompt").await.unwrap_err();
    assert!(matches!(err, Error::Json(_)));
    assert_eq!(err.kind(), ErrorKind::ModelCall);
}

#[tokio::test]
async fn test_slow_provider_times_out() {
    let stub = Stub::new(StatusCode::OK, gemini_ok("too late")).delayed(Duration::from_secs(3));
    let base = spawn_provider(stub).await;
    let client = GeminiClient::new(&config(Provider::Gemini, &base)).unwrap();

    let err = client.generate(&sample_image(), "prompt").await.unwrap_err();
    assert!(matches!(err, Error::Timeout), "got: {:?}", err);
}

#[tokio::test]
async fn test_unreachable_provider() {
    // Bind and immediately release a port so nothing is listening on it
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = GeminiClient::new(&config(Provider::Gemini, &format!("http://{}", addr))).unwrap();
    let err = client.generate(&sample_image(), "prompt").await.unwrap_err();

    assert!(matches!(err, Error::Http(_)));
    assert_eq!(err.kind(), ErrorKind::ModelCall);
}

#[tokio::test]
async fn test_openai_request_shape_and_reply() {
    let reply = json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": "  Love the palette!  "},
            "finish_reason": "stop"
        }]
    });
    let stub = Stub::new(StatusCode::OK, reply.to_string());
    let base = spawn_provider(stub.clone()).await;
    let client = OpenAiClient::new(&config(Provider::OpenAi, &base)).unwrap();

    let image = sample_image();
    let text = client.generate(&image, "Be nice").await.unwrap();
    assert_eq!(text, "Love the palette!");

    let seen = stub.seen.lock().unwrap();
    let headers = seen.headers.as_ref().unwrap();
    assert_eq!(headers["authorization"], "Bearer test-key");

    let body = seen.body.as_ref().unwrap();
    assert_eq!(body["model"], "vision-test");
    assert_eq!(body["stream"], false);
    let content = body["messages"][0]["content"].as_array().unwrap();
    assert_eq!(content[0]["type"], "text");
    assert_eq!(content[0]["text"], "Be nice");
    assert_eq!(content[1]["type"], "image_url");
    assert_eq!(content[1]["image_url"]["url"], image.data_uri().as_str());
}

#[tokio::test]
async fn test_openai_rate_limit_is_model_call_error() {
    let stub = Stub::new(
        StatusCode::TOO_MANY_REQUESTS,
        r#"{"error":{"message":"Rate limit reached"}}"#,
    );
    let base = spawn_provider(stub).await;
    let client = OpenAiClient::new(&config(Provider::OpenAi, &base)).unwrap();

    let err = client.generate(&sample_image(), "prompt").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ModelCall);
    assert!(err.to_string().contains("429"));
}

#[tokio::test]
async fn test_build_model_routes_to_configured_provider() {
    let stub = Stub::new(StatusCode::OK, gemini_ok("from gemini"));
    let base = spawn_provider(stub.clone()).await;

    let model = build_model(&config(Provider::Gemini, &base)).unwrap();
    let text = model.generate(&sample_image(), "prompt").await.unwrap();

    assert_eq!(text, "from gemini");
    assert_eq!(model.model_name(), "vision-test");
    assert_eq!(
        stub.seen.lock().unwrap().path.as_deref(),
        Some("vision-test:generateContent")
    );
}
