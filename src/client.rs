//! Model clients for generating replies from an image and a prompt.
//!
//! Everything the pipeline needs from a language model is the single
//! capability described by [`ReplyModel`]: take an encoded image and a prompt,
//! return text. Two HTTP implementations are provided:
//!
//! - [`GeminiClient`] calls Google's `generateContent` endpoint with the image
//!   as `inline_data`.
//! - [`OpenAiClient`] calls any OpenAI-compatible `/chat/completions` endpoint
//!   (OpenAI itself, LM Studio, Ollama, vLLM, ...) with the image as a `data:`
//!   URI.
//!
//! Both are thin: one request per call, a timeout on the underlying HTTP
//! client, no retries, no streaming and no caching. Any failure comes back as a
//! model-call error for the UI to display.
//!
//! # Examples
//!
//! ```rust,no_run
//! use ai_commenter::{build_model, build_prompt, encode_image, AppConfig, ReplyModel};
//!
//! # async fn example(png: Vec<u8>) -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::from_env()?;
//! let model = build_model(&config)?;
//!
//! let image = encode_image(&png)?;
//! let reply = model.generate(&image, &build_prompt("Funny")).await?;
//! println!("{}", reply);
//! # Ok(())
//! # }
//! ```

use crate::config::{AppConfig, Provider};
use crate::types::{
    EncodedImage, GeminiContent, GeminiGenerationConfig, GeminiPart, GeminiRequest,
    GeminiResponse, OpenAIContentPart, OpenAIImageUrl, OpenAIMessage, OpenAIRequest,
    OpenAIResponse,
};
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// The one capability the pipeline needs from a language model.
///
/// Implementations must be cheap to share; the server holds one behind an
/// `Arc` for its whole lifetime. Tests substitute a stub.
#[async_trait]
pub trait ReplyModel: Send + Sync {
    /// Generate reply text for `image` following `prompt`.
    async fn generate(&self, image: &EncodedImage, prompt: &str) -> Result<String>;

    /// Model identifier reported on the status endpoint
    fn model_name(&self) -> &str {
        "custom"
    }
}

/// Build the client for the configured provider.
pub fn build_model(config: &AppConfig) -> Result<Arc<dyn ReplyModel>> {
    let model: Arc<dyn ReplyModel> = match config.provider {
        Provider::Gemini => Arc::new(GeminiClient::new(config)?),
        Provider::OpenAi => Arc::new(OpenAiClient::new(config)?),
    };
    Ok(model)
}

fn http_client(config: &AppConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout))
        .build()
        .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))
}

/// Turn a non-success response into a model-call error carrying status and body.
async fn api_error(response: reqwest::Response) -> Error {
    let status = response.status();
    let body = response.text().await.unwrap_or_else(|e| {
        warn!("Failed to read error response body: {}", e);
        "Unknown error (failed to read response body)".to_string()
    });
    Error::model_call(format!("API error {}: {}", status, body.trim()))
}

/// Client for the Gemini `generateContent` API.
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: Option<u32>,
    temperature: f32,
}

impl GeminiClient {
    pub fn new(config: &AppConfig) -> Result<Self> {
        Ok(Self {
            http: http_client(config)?,
            api_key: config.api_key.clone(),
            base_url: config.base_url.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl ReplyModel for GeminiClient {
    async fn generate(&self, image: &EncodedImage, prompt: &str) -> Result<String> {
        // Prompt first, then the image, as a single user turn
        let request = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart::text(prompt), GeminiPart::image(image)],
            }],
            generation_config: Some(GeminiGenerationConfig {
                max_output_tokens: self.max_tokens,
                temperature: self.temperature,
            }),
        };

        debug!(model = %self.model, media_type = image.media_type(), "calling Gemini");

        // Key goes in a header so it never shows up in logged URLs
        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(Error::from_transport)?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let body = response.bytes().await.map_err(Error::from_transport)?;
        let parsed: GeminiResponse = serde_json::from_slice(&body)?;
        extract_gemini_text(parsed)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Concatenate the text parts of the first candidate.
fn extract_gemini_text(response: GeminiResponse) -> Result<String> {
    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| Error::model_call("No response generated from API"))?;

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    let text = text.trim();
    if text.is_empty() {
        let reason = candidate.finish_reason.unwrap_or_else(|| "unknown".to_string());
        return Err(Error::model_call(format!(
            "Model returned no text (finish reason: {})",
            reason
        )));
    }

    Ok(text.to_string())
}

/// Client for OpenAI-compatible chat completion servers.
pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: Option<u32>,
    temperature: f32,
}

impl OpenAiClient {
    pub fn new(config: &AppConfig) -> Result<Self> {
        Ok(Self {
            http: http_client(config)?,
            api_key: config.api_key.clone(),
            base_url: config.base_url.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }
}

#[async_trait]
impl ReplyModel for OpenAiClient {
    async fn generate(&self, image: &EncodedImage, prompt: &str) -> Result<String> {
        let request = OpenAIRequest {
            model: self.model.clone(),
            messages: vec![OpenAIMessage {
                role: "user".to_string(),
                content: vec![
                    OpenAIContentPart::Text {
                        text: prompt.to_string(),
                    },
                    OpenAIContentPart::ImageUrl {
                        image_url: OpenAIImageUrl {
                            url: image.data_uri(),
                        },
                    },
                ],
            }],
            stream: false,
            max_tokens: self.max_tokens,
            temperature: Some(self.temperature),
        };

        debug!(model = %self.model, media_type = image.media_type(), "calling chat completions");

        let url = format!("{}/chat/completions", self.base_url);
        let response = self
            .http
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(Error::from_transport)?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let body = response.bytes().await.map_err(Error::from_transport)?;
        let parsed: OpenAIResponse = serde_json::from_slice(&body)?;
        extract_openai_text(parsed)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

fn extract_openai_text(response: OpenAIResponse) -> Result<String> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| Error::model_call("No response generated from API"))?;

    match choice.message.content.as_deref().map(str::trim) {
        Some(text) if !text.is_empty() => Ok(text.to_string()),
        _ => Err(Error::model_call(format!(
            "Model returned no text (finish reason: {})",
            choice.finish_reason.as_deref().unwrap_or("unknown")
        ))),
    }
}
