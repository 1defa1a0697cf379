//! Configuration for AI Commenter
//!
//! Settings come from the process environment (optionally seeded from a `.env`
//! file by the binary). [`AppConfig::from_lookup`] takes the lookup as a
//! closure so the resolution rules can be exercised without touching the real
//! environment.

use crate::{Error, Result};
use std::env;

/// Environment variable selecting the provider
pub const ENV_PROVIDER: &str = "AI_COMMENTER_PROVIDER";
/// Environment variable overriding the model id
pub const ENV_MODEL: &str = "AI_COMMENTER_MODEL";
/// Environment variable overriding the endpoint
pub const ENV_BASE_URL: &str = "AI_COMMENTER_BASE_URL";
/// Environment variable for the request timeout in seconds
pub const ENV_TIMEOUT_SECS: &str = "AI_COMMENTER_TIMEOUT_SECS";
/// Environment variable for the request body limit in bytes
pub const ENV_MAX_UPLOAD_BYTES: &str = "AI_COMMENTER_MAX_UPLOAD_BYTES";

const DEFAULT_TIMEOUT_SECS: u64 = 60;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;
const DEFAULT_MAX_TOKENS: u32 = 512;
const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Supported model providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Provider {
    /// Google Gemini `generateContent` API
    #[default]
    Gemini,
    /// Any server speaking the OpenAI chat completions API
    OpenAi,
}

impl Provider {
    /// Get the default base URL for this provider
    pub fn default_url(&self) -> &'static str {
        match self {
            Provider::Gemini => "https://generativelanguage.googleapis.com/v1beta",
            Provider::OpenAi => "https://api.openai.com/v1",
        }
    }

    /// Vision-capable model used when none is configured
    pub fn default_model(&self) -> &'static str {
        match self {
            Provider::Gemini => "gemini-2.0-flash",
            Provider::OpenAi => "gpt-4o-mini",
        }
    }

    /// Environment variable holding the credential for this provider
    pub fn api_key_env(&self) -> &'static str {
        match self {
            Provider::Gemini => "GEMINI_API_KEY",
            Provider::OpenAi => "OPENAI_API_KEY",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Gemini => "gemini",
            Provider::OpenAi => "openai",
        }
    }

    /// Parse a provider from a string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "gemini" | "google" => Some(Provider::Gemini),
            "openai" | "open-ai" | "open_ai" | "openai-compatible" => Some(Provider::OpenAi),
            _ => None,
        }
    }
}

/// Resolved application settings
#[derive(Clone)]
pub struct AppConfig {
    /// Which API the model client talks to
    pub provider: Provider,

    /// Credential for the provider
    pub api_key: String,

    /// Model name (e.g., "gemini-2.0-flash")
    pub model: String,

    /// Provider endpoint, without a trailing slash
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout: u64,

    /// Maximum tokens to generate (None uses provider default)
    pub max_tokens: Option<u32>,

    /// Sampling temperature (0.0 to 2.0)
    pub temperature: f32,

    /// Limit on the whole `/api/reply` request body, in bytes. The multipart
    /// envelope and the tone fields count against it, so the largest image
    /// accepted is slightly smaller.
    pub max_upload_bytes: usize,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("provider", &self.provider)
            .field("api_key", &"***")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .finish()
    }
}

impl AppConfig {
    /// Create a new builder for AppConfig
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    /// Resolve configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Resolve configuration through an arbitrary variable lookup.
    ///
    /// Priority for each setting:
    /// 1. the `AI_COMMENTER_*` variable (or the provider's key variable)
    /// 2. the provider default
    ///
    /// Blank values count as unset.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when the provider name is unknown, the API key
    /// is missing, or a numeric setting does not parse.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let provider = match get(ENV_PROVIDER) {
            Some(name) => Provider::from_str(&name).ok_or_else(|| {
                Error::config(format!(
                    "{} must be 'gemini' or 'openai', got '{}'",
                    ENV_PROVIDER, name
                ))
            })?,
            None => Provider::default(),
        };

        let api_key = get(provider.api_key_env()).ok_or_else(|| {
            Error::config(format!(
                "{} not found in environment variables",
                provider.api_key_env()
            ))
        })?;

        let mut builder = AppConfig::builder()
            .provider(provider)
            .api_key(api_key.trim());

        if let Some(model) = get(ENV_MODEL) {
            builder = builder.model(model.trim());
        }
        if let Some(url) = get(ENV_BASE_URL) {
            builder = builder.base_url(url.trim());
        }
        if let Some(raw) = get(ENV_TIMEOUT_SECS) {
            builder = builder.timeout(parse_number(ENV_TIMEOUT_SECS, &raw)?);
        }
        if let Some(raw) = get(ENV_MAX_UPLOAD_BYTES) {
            builder = builder.max_upload_bytes(parse_number(ENV_MAX_UPLOAD_BYTES, &raw)?);
        }

        builder.build()
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| Error::config(format!("{} must be a positive integer, got '{}'", key, raw)))
}

/// Builder for AppConfig
#[derive(Default)]
pub struct AppConfigBuilder {
    provider: Option<Provider>,
    api_key: Option<String>,
    model: Option<String>,
    base_url: Option<String>,
    timeout: Option<u64>,
    max_tokens: Option<u32>,
    temperature: Option<f32>,
    max_upload_bytes: Option<usize>,
}

impl std::fmt::Debug for AppConfigBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfigBuilder")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl AppConfigBuilder {
    pub fn provider(mut self, provider: Provider) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn timeout(mut self, timeout: u64) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn max_tokens(mut self, tokens: u32) -> Self {
        self.max_tokens = Some(tokens);
        self
    }

    pub fn temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }

    pub fn max_upload_bytes(mut self, bytes: usize) -> Self {
        self.max_upload_bytes = Some(bytes);
        self
    }

    pub fn build(self) -> Result<AppConfig> {
        let api_key = self
            .api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| Error::config("api_key is required"))?;

        let provider = self.provider.unwrap_or_default();

        let timeout = self.timeout.unwrap_or(DEFAULT_TIMEOUT_SECS);
        if timeout == 0 {
            return Err(Error::config("timeout must be at least one second"));
        }

        let max_upload_bytes = self.max_upload_bytes.unwrap_or(DEFAULT_MAX_UPLOAD_BYTES);
        if max_upload_bytes == 0 {
            return Err(Error::config("max_upload_bytes must be greater than zero"));
        }

        let temperature = self.temperature.unwrap_or(DEFAULT_TEMPERATURE);
        if !(0.0..=2.0).contains(&temperature) {
            return Err(Error::config("temperature must be between 0.0 and 2.0"));
        }

        let base_url = self
            .base_url
            .unwrap_or_else(|| provider.default_url().to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(AppConfig {
            provider,
            api_key,
            model: self
                .model
                .unwrap_or_else(|| provider.default_model().to_string()),
            base_url,
            timeout,
            max_tokens: self.max_tokens.or(Some(DEFAULT_MAX_TOKENS)),
            temperature,
            max_upload_bytes,
        })
    }
}
