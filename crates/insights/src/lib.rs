//! Executive summaries of the active project set.
//!
//! [`SummaryGenerator`] prefers a generated summary from the Gemini API and
//! degrades to the locally computed basic summary whenever the credential is
//! missing or the call keeps failing after [`retry_with_backoff`] gives up.

pub mod client;
pub mod generator;
pub mod retry;

pub use client::{AttemptError, GeminiClient, GeminiConfig, TextGenerator};
pub use generator::SummaryGenerator;
pub use retry::{retry_with_backoff, GenerationError};
