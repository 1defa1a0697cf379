//! HTTP server for AI Commenter
//!
//! Serves the single-page UI and adapts form submissions onto
//! [`Commenter::reply`]. Every pipeline error is turned into a JSON body with
//! a `kind` and a human-readable `message`; nothing a user uploads can take the
//! process down.

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::client::ReplyModel;
use crate::encoder::SUPPORTED_MEDIA_TYPES;
use crate::error::{Error, ErrorKind};
use crate::pipeline::Commenter;
use crate::prompt::{Tone, ToneSelection};
use crate::types::UploadedImage;

const INDEX_HTML: &str = include_str!("../../assets/index.html");

/// Either a ready commenter or the reason the service cannot answer.
#[derive(Clone)]
enum Backend {
    Ready(Commenter),
    Misconfigured(String),
}

/// Shared, read-only state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    backend: Backend,
    provider: Option<String>,
    max_upload_bytes: usize,
}

impl AppState {
    pub fn new(model: Arc<dyn ReplyModel>, max_upload_bytes: usize) -> Self {
        Self {
            backend: Backend::Ready(Commenter::new(model)),
            provider: None,
            max_upload_bytes,
        }
    }

    /// State for a server whose configuration failed to load. The page still
    /// renders; reply requests answer with the configuration error.
    pub fn misconfigured(error: &Error, max_upload_bytes: usize) -> Self {
        Self {
            backend: Backend::Misconfigured(error.to_string()),
            provider: None,
            max_upload_bytes,
        }
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    // Applies to the whole multipart body, not just the image part
    let limit = state.max_upload_bytes;

    Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
        .route("/api/status", get(status))
        .route("/api/tones", get(tones))
        .route("/api/reply", post(reply))
        .layer(DefaultBodyLimit::max(limit))
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

pub struct Server {
    addr: SocketAddr,
    state: AppState,
}

impl Server {
    pub fn new(addr: SocketAddr, state: AppState) -> Self {
        Self { addr, state }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let app = router(self.state);

        info!("Starting HTTP server on http://{}", self.addr);

        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}

// Error response type
struct AppError(StatusCode, ErrorKind, String);

impl AppError {
    fn bad_request(msg: impl Into<String>) -> Self {
        AppError(StatusCode::BAD_REQUEST, ErrorKind::Encoding, msg.into())
    }
}

impl From<Error> for AppError {
    fn from(err: Error) -> Self {
        let status = match (&err, err.kind()) {
            (Error::Timeout, _) => StatusCode::GATEWAY_TIMEOUT,
            (_, ErrorKind::Encoding) => StatusCode::BAD_REQUEST,
            (_, ErrorKind::ModelCall) => StatusCode::BAD_GATEWAY,
            (_, ErrorKind::Configuration) => StatusCode::SERVICE_UNAVAILABLE,
        };
        AppError(status, err.kind(), err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = json!({
            "error": {
                "kind": self.1,
                "message": self.2,
            }
        });
        (self.0, Json(body)).into_response()
    }
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

// Status endpoint
#[derive(Serialize)]
struct StatusResponse {
    version: &'static str,
    ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    max_upload_bytes: usize,
    media_types: &'static [&'static str],
}

async fn status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let (ready, model, error) = match &state.backend {
        Backend::Ready(commenter) => (true, Some(commenter.model().model_name().to_string()), None),
        Backend::Misconfigured(reason) => (false, None, Some(reason.clone())),
    };

    Json(StatusResponse {
        version: env!("CARGO_PKG_VERSION"),
        ready,
        provider: state.provider.clone(),
        model,
        error,
        max_upload_bytes: state.max_upload_bytes,
        media_types: SUPPORTED_MEDIA_TYPES,
    })
}

#[derive(Serialize)]
struct ToneInfo {
    name: &'static str,
    label: &'static str,
}

async fn tones() -> Json<Vec<ToneInfo>> {
    Json(
        Tone::ALL
            .iter()
            .map(|t| ToneInfo {
                name: t.name(),
                label: t.label(),
            })
            .collect(),
    )
}

/// Fields pulled out of the multipart form.
#[derive(Default)]
struct ReplyForm {
    image: Option<UploadedImage>,
    tone: Option<String>,
    custom_tone: Option<String>,
}

async fn read_form(mut multipart: Multipart) -> Result<ReplyForm, AppError> {
    let mut form = ReplyForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError(e.status(), ErrorKind::Encoding, e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "image" => {
                let media_type = field.content_type().map(str::to_string);
                let file_name = field.file_name().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError(e.status(), ErrorKind::Encoding, e.body_text()))?;

                // Browsers send an empty part when no file was picked
                if bytes.is_empty() && file_name.as_deref().unwrap_or("").is_empty() {
                    continue;
                }

                let mut upload = UploadedImage::new(bytes.to_vec());
                upload.declared_media_type = media_type;
                upload.file_name = file_name;
                form.image = Some(upload);
            }
            "tone" | "custom_tone" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError(e.status(), ErrorKind::Encoding, e.body_text()))?;
                if name == "tone" {
                    form.tone = Some(text);
                } else {
                    form.custom_tone = Some(text);
                }
            }
            other => warn!("ignoring unexpected form field '{}'", other),
        }
    }

    Ok(form)
}

// Reply endpoint
async fn reply(State(state): State<Arc<AppState>>, multipart: Multipart) -> Response {
    let commenter = match &state.backend {
        Backend::Ready(commenter) => commenter,
        Backend::Misconfigured(reason) => {
            return AppError(
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorKind::Configuration,
                reason.clone(),
            )
            .into_response();
        }
    };

    let form = match read_form(multipart).await {
        Ok(form) => form,
        Err(e) => return e.into_response(),
    };

    let preset = match form.tone.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(name) => match Tone::from_str(name) {
            Some(tone) => Some(tone),
            None => {
                return AppError::bad_request(format!("unknown tone '{}'", name)).into_response();
            }
        },
    };
    let selection = ToneSelection {
        preset,
        custom: form.custom_tone,
    };

    match commenter.reply(form.image.as_ref(), &selection).await {
        Ok(generated) => Json(generated).into_response(),
        // Already logged by the pipeline
        Err(e) => AppError::from(e).into_response(),
    }
}
