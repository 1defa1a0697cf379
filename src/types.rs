//! Core types for AI Commenter
//!
//! Domain values passed through the pipeline, plus the request and response
//! shapes of the two provider APIs.

use serde::{Deserialize, Serialize};

/// An image as received from the UI, before validation.
#[derive(Debug, Clone, Default)]
pub struct UploadedImage {
    pub bytes: Vec<u8>,
    /// Media type declared by the browser; informational only
    pub declared_media_type: Option<String>,
    pub file_name: Option<String>,
}

impl UploadedImage {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
            declared_media_type: None,
            file_name: None,
        }
    }

    pub fn with_media_type(mut self, media_type: impl Into<String>) -> Self {
        self.declared_media_type = Some(media_type.into());
        self
    }

    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Base64 text of a validated image together with its detected media type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub(crate) data: String,
    pub(crate) media_type: &'static str,
}

impl EncodedImage {
    /// Standard-alphabet, padded base64
    pub fn data(&self) -> &str {
        &self.data
    }

    pub fn media_type(&self) -> &'static str {
        self.media_type
    }

    /// `data:<media>;base64,<data>` form used by OpenAI-style image parts
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.media_type, self.data)
    }
}

/// Text produced by the model for one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedReply {
    pub reply: String,
    /// The tone string that was embedded in the prompt
    pub tone: String,
}

// ============================================================================
// GEMINI WIRE FORMAT
// ============================================================================

/// Gemini `generateContent` request
#[derive(Debug, Clone, Serialize)]
pub struct GeminiRequest {
    pub contents: Vec<GeminiContent>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GeminiGenerationConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiContent {
    #[serde(default)]
    pub parts: Vec<GeminiPart>,
}

/// One part of a Gemini message; text and inline data are mutually exclusive
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiPart {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<GeminiInlineData>,
}

impl GeminiPart {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            inline_data: None,
        }
    }

    pub fn image(image: &EncodedImage) -> Self {
        Self {
            text: None,
            inline_data: Some(GeminiInlineData {
                mime_type: image.media_type().to_string(),
                data: image.data().to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiInlineData {
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct GeminiGenerationConfig {
    #[serde(rename = "maxOutputTokens", skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
    pub temperature: f32,
}

/// Gemini `generateContent` response
#[derive(Debug, Clone, Deserialize)]
pub struct GeminiResponse {
    #[serde(default)]
    pub candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeminiCandidate {
    pub content: Option<GeminiContent>,
    #[serde(rename = "finishReason")]
    pub finish_reason: Option<String>,
}

// ============================================================================
// OPENAI WIRE FORMAT
// ============================================================================

/// OpenAI API request (non-streaming)
#[derive(Debug, Clone, Serialize)]
pub struct OpenAIRequest {
    pub model: String,
    pub messages: Vec<OpenAIMessage>,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

/// OpenAI API message format
#[derive(Debug, Clone, Serialize)]
pub struct OpenAIMessage {
    pub role: String,
    pub content: Vec<OpenAIContentPart>,
}

/// Multimodal content part
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OpenAIContentPart {
    Text { text: String },
    ImageUrl { image_url: OpenAIImageUrl },
}

#[derive(Debug, Clone, Serialize)]
pub struct OpenAIImageUrl {
    pub url: String,
}

/// OpenAI API response
#[derive(Debug, Clone, Deserialize)]
pub struct OpenAIResponse {
    #[serde(default)]
    pub choices: Vec<OpenAIChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAIChoice {
    pub message: OpenAIResponseMessage,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAIResponseMessage {
    pub content: Option<String>,
}
