//! The summary generator: AI first, basic summary as the fallback.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use workboard_core::analysis::{build_prompt, AnalysisReport, ProjectDigest, RetryPolicy};

use crate::client::{GeminiClient, GeminiConfig, TextGenerator};
use crate::retry::retry_with_backoff;

/// Produces an [`AnalysisReport`] for a set of projects.
///
/// Holds no per-request state; share it behind an `Arc`.
pub struct SummaryGenerator {
    backend: Option<Arc<dyn TextGenerator>>,
    policy: RetryPolicy,
}

impl SummaryGenerator {
    /// A generator over an explicit backend. `None` always yields basic
    /// summaries.
    pub fn new(backend: Option<Arc<dyn TextGenerator>>, policy: RetryPolicy) -> Self {
        Self { backend, policy }
    }

    /// Build a Gemini-backed generator, or a basic-only one when no API key
    /// is configured.
    pub fn from_config(config: &GeminiConfig) -> Result<Self, reqwest::Error> {
        let backend = match &config.api_key {
            Some(key) => {
                let client = GeminiClient::new(config, key.clone())?;
                Some(Arc::new(client) as Arc<dyn TextGenerator>)
            }
            None => None,
        };
        Ok(Self::new(backend, config.retry))
    }

    /// Whether an external backend is configured.
    pub fn ai_enabled(&self) -> bool {
        self.backend.is_some()
    }

    /// Summarize `projects`.
    ///
    /// Never fails: an empty set short-circuits without calling out, a
    /// missing backend yields the basic summary, and an exhausted or
    /// cancelled external call degrades to the basic summary with the last
    /// error attached.
    pub async fn generate(
        &self,
        projects: &[ProjectDigest],
        cancel: &CancellationToken,
    ) -> AnalysisReport {
        if projects.is_empty() {
            return AnalysisReport::empty();
        }

        let Some(backend) = self.backend.as_deref() else {
            tracing::debug!(project_count = projects.len(), "No Gemini API key, using basic summary");
            return AnalysisReport::basic(projects);
        };

        let prompt = build_prompt(projects);
        let prompt = prompt.as_str();

        match retry_with_backoff(&self.policy, cancel, |_| backend.generate(prompt)).await {
            Ok(text) => {
                tracing::info!(
                    project_count = projects.len(),
                    model = backend.model(),
                    "Generated AI summary",
                );
                AnalysisReport::ai(projects.len(), text, backend.model())
            }
            Err(e) => {
                tracing::error!(error = %e, "AI summary failed, falling back to basic summary");
                AnalysisReport::fallback(projects, e.last_message())
            }
        }
    }
}
