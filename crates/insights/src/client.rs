//! HTTP client for the Gemini `generateContent` endpoint.
//!
//! [`GeminiClient`] performs exactly one attempt per call; retrying is the
//! caller's business (see [`crate::retry`]). Each attempt is bounded by the
//! configured per-attempt timeout.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use workboard_core::analysis::{is_retryable, RetryPolicy};

/// Default public endpoint base.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default model identifier.
pub const DEFAULT_MODEL: &str = "gemini-2.5-pro";

/// Header carrying the API key.
const API_KEY_HEADER: &str = "x-goog-api-key";

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Gemini settings loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeminiConfig {
    /// API credential. `None` disables the external call entirely.
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    /// Upper bound on a single HTTP attempt.
    pub attempt_timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            attempt_timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
        }
    }
}

impl GeminiConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                       | Default                                            |
    /// |-------------------------------|----------------------------------------------------|
    /// | `GEMINI_API_KEY`              | unset (AI summaries disabled)                      |
    /// | `GEMINI_MODEL`                | `gemini-2.5-pro`                                   |
    /// | `GEMINI_BASE_URL`             | `https://generativelanguage.googleapis.com/v1beta` |
    /// | `GEMINI_MAX_ATTEMPTS`         | `3`                                                |
    /// | `GEMINI_BACKOFF_BASE_MS`      | `500`                                              |
    /// | `GEMINI_ATTEMPT_TIMEOUT_SECS` | `30`                                               |
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    ///
    /// Panics on unparsable numbers so misconfiguration fails at startup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let api_key = lookup("GEMINI_API_KEY")
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());

        let model = lookup("GEMINI_MODEL")
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(defaults.model);

        let base_url = lookup("GEMINI_BASE_URL")
            .filter(|u| !u.trim().is_empty())
            .unwrap_or(defaults.base_url);

        let max_attempts: u32 = lookup("GEMINI_MAX_ATTEMPTS")
            .map(|v| v.parse().expect("GEMINI_MAX_ATTEMPTS must be a valid u32"))
            .unwrap_or(defaults.retry.max_attempts)
            .max(1);

        let backoff_base = lookup("GEMINI_BACKOFF_BASE_MS")
            .map(|v| {
                Duration::from_millis(v.parse().expect("GEMINI_BACKOFF_BASE_MS must be a valid u64"))
            })
            .unwrap_or(defaults.retry.backoff_base);

        let attempt_timeout = lookup("GEMINI_ATTEMPT_TIMEOUT_SECS")
            .map(|v| {
                Duration::from_secs(
                    v.parse()
                        .expect("GEMINI_ATTEMPT_TIMEOUT_SECS must be a valid u64"),
                )
            })
            .unwrap_or(defaults.attempt_timeout);

        Self {
            api_key,
            model,
            base_url,
            attempt_timeout,
            retry: RetryPolicy {
                max_attempts,
                backoff_base,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Why a single generation attempt failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AttemptError {
    /// No response was received (connection, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Transport(String),

    /// The API answered with a non-2xx status.
    #[error("Gemini API returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// A 2xx response whose body could not be decoded.
    #[error("Invalid Gemini response body: {0}")]
    Decode(String),
}

impl AttemptError {
    /// Whether another attempt may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            AttemptError::Transport(msg) => is_retryable(None, msg),
            AttemptError::Status { status, message } => is_retryable(Some(*status), message),
            AttemptError::Decode(msg) => workboard_core::analysis::mentions_overload(msg),
        }
    }

    /// The human-readable reason, without the variant prefix.
    pub fn message(&self) -> &str {
        match self {
            AttemptError::Transport(msg)
            | AttemptError::Status { message: msg, .. }
            | AttemptError::Decode(msg) => msg,
        }
    }
}

// ---------------------------------------------------------------------------
// Generator seam
// ---------------------------------------------------------------------------

/// A text-generation backend. One call is one attempt.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate text for `prompt`. `Ok(None)` means the call succeeded but
    /// carried no text.
    async fn generate(&self, prompt: &str) -> Result<Option<String>, AttemptError>;

    /// Model identifier reported alongside generated summaries.
    fn model(&self) -> &str;
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateContentResponse {
    /// `candidates[0].content.parts[0].text`, if present and non-empty.
    fn into_first_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .next()?
            .text
            .filter(|t| !t.is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Prefer the API's `error.message`, then the raw body, then the status
/// reason phrase.
fn error_message(status: reqwest::StatusCode, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ApiErrorBody>(body) {
        return parsed.error.message;
    }
    let trimmed = body.trim();
    if !trimmed.is_empty() {
        return trimmed.to_string();
    }
    status
        .canonical_reason()
        .unwrap_or("Unknown status")
        .to_string()
}

// ---------------------------------------------------------------------------
// GeminiClient
// ---------------------------------------------------------------------------

/// Calls `POST {base_url}/models/{model}:generateContent`.
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    /// Create a client with the per-attempt timeout from `config`.
    pub fn new(config: &GeminiConfig, api_key: String) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(config.attempt_timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<Option<String>, AttemptError> {
        let body = serde_json::json!({
            "contents": [
                { "parts": [{ "text": prompt }] }
            ]
        });

        let response = self
            .client
            .post(self.endpoint())
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AttemptError::Transport(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| AttemptError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(AttemptError::Status {
                status: status.as_u16(),
                message: error_message(status, &text),
            });
        }

        let payload: GenerateContentResponse =
            serde_json::from_str(&text).map_err(|e| AttemptError::Decode(e.to_string()))?;
        Ok(payload.into_first_text())
    }

    fn model(&self) -> &str {
        &self.model
    }
}
