//! # AI Commenter
//!
//! Turn a screenshot of a conversation or a social media post into a reply
//! written in the tone you choose, using a multimodal language model.
//!
//! ## Overview
//!
//! The crate is a short, linear pipeline behind a small web UI:
//!
//! 1. **Encode**: validate the uploaded bytes as an image and base64 them
//! 2. **Prompt**: combine a fixed instruction template with the chosen tone
//! 3. **Generate**: send image and prompt to the model provider
//! 4. **Display**: return the reply text, or an error the page can show
//!
//! Supported providers:
//! - Google Gemini (`generateContent`)
//! - Any OpenAI-compatible chat completions server (OpenAI, LM Studio, Ollama, vLLM)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ai_commenter::{build_model, AppConfig, Commenter, Tone, ToneSelection, UploadedImage};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Reads GEMINI_API_KEY (or OPENAI_API_KEY with AI_COMMENTER_PROVIDER=openai)
//!     let config = AppConfig::from_env()?;
//!     let commenter = Commenter::new(build_model(&config)?);
//!
//!     let upload = UploadedImage::new(std::fs::read("chat.png")?);
//!     let reply = commenter
//!         .reply(Some(&upload), &ToneSelection::preset(Tone::Funny))
//!         .await?;
//!
//!     println!("[{}] {}", reply.tone, reply.reply);
//!     Ok(())
//! }
//! ```
//!
//! ## Testing Without a Provider
//!
//! The model sits behind the [`ReplyModel`] trait, so tests plug in a stub:
//!
//! ```rust
//! use ai_commenter::{EncodedImage, ReplyModel, Result};
//! use async_trait::async_trait;
//!
//! struct Canned;
//!
//! #[async_trait]
//! impl ReplyModel for Canned {
//!     async fn generate(&self, _image: &EncodedImage, _prompt: &str) -> Result<String> {
//!         Ok("Nice colors!".to_string())
//!     }
//! }
//! ```
//!
//! ## Architecture
//!
//! - **encoder**: image validation, media type detection, base64
//! - **prompt**: predefined tones, tone precedence, prompt template
//! - **client**: the `ReplyModel` trait and the Gemini / OpenAI clients
//! - **pipeline**: `Commenter`, the request handler tying the steps together
//! - **server**: axum router serving the page and the reply API
//! - **config**: environment-driven settings and provider defaults
//! - **error**: error type, classification and `Result` alias

// ============================================================================
// MODULE DECLARATIONS
// ============================================================================

/// Model clients behind the single-capability `ReplyModel` trait.
mod client;

/// Settings resolved from the environment, with a builder for programmatic use.
mod config;

/// Image validation and base64 encoding.
mod encoder;

/// Error types and conversions.
mod error;

/// The stateless request handler.
mod pipeline;

/// Tones and prompt construction.
mod prompt;

/// Domain values and provider wire formats.
mod types;

/// Web UI shell.
pub mod server;

// ============================================================================
// PUBLIC EXPORTS
// ============================================================================

// --- Model Clients ---

pub use client::{GeminiClient, OpenAiClient, ReplyModel, build_model};

// --- Configuration ---

pub use config::{AppConfig, AppConfigBuilder, Provider};

// --- Encoding ---

pub use encoder::{
    MAX_DECODE_ALLOC, MAX_IMAGE_DIMENSION, SUPPORTED_MEDIA_TYPES, encode_image, encode_upload,
};

// --- Error Handling ---

pub use error::{Error, ErrorKind, Result};

// --- Pipeline ---

pub use pipeline::Commenter;

// --- Prompting ---

pub use prompt::{DEFAULT_TONE, Tone, ToneSelection, build_prompt};

// --- Core Types ---

pub use types::{EncodedImage, GeneratedReply, UploadedImage};
