//! Executive-summary building blocks.
//!
//! Produces the prompt sent to the text-generation service, the locally
//! computed basic summary used when that service is unavailable, and the
//! retry arithmetic for outbound calls.

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use serde::Serialize;

/// Returned when there are no active projects to analyze.
pub const EMPTY_SUMMARY: &str = "There are no projects to analyze.";

/// Substituted when a successful generation carries no text.
pub const NO_CONTENT_PLACEHOLDER: &str = "No AI content was received.";

/// Attached to basic summaries produced because no credential is configured.
pub const MISSING_KEY_NOTE: &str = "Set GEMINI_API_KEY to enable AI summaries (Gemini)";

/// Used when a generation failure carries no message of its own.
pub const UNKNOWN_ERROR: &str = "Unknown error while calling the Gemini API";

/// Number of project names listed in the "most recent" line.
const RECENT_SAMPLE: usize = 3;

static OVERLOAD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)overload").expect("valid regex"));

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// The project fields the summaries read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDigest {
    pub name: String,
    pub description: String,
    pub state: String,
    pub active: bool,
}

// ---------------------------------------------------------------------------
// Prompt
// ---------------------------------------------------------------------------

/// Build the generation prompt: a fixed instruction followed by one numbered
/// `Project {i} ({name}): {description}` line per project.
pub fn build_prompt(projects: &[ProjectDigest]) -> String {
    let descriptions = projects
        .iter()
        .enumerate()
        .map(|(i, p)| format!("Project {} ({}): {}", i + 1, p.name, p.description))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Analyze the following project descriptions and write an executive summary in English that covers:\n\
         1. Main themes\n\
         2. Common patterns\n\
         3. Focus areas\n\
         4. Brief recommendations\n\
         \n\
         Descriptions:\n\
         {descriptions}\n"
    )
}

// ---------------------------------------------------------------------------
// Basic summary
// ---------------------------------------------------------------------------

/// Figures behind the basic summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicSummary {
    pub total: usize,
    /// Distinct state labels in order of first appearance.
    pub states: Vec<String>,
    pub active: usize,
    pub inactive: usize,
    /// Names of the first projects in input order.
    pub recent: Vec<String>,
}

impl BasicSummary {
    pub fn compute(projects: &[ProjectDigest]) -> Self {
        let mut states: Vec<String> = Vec::new();
        for p in projects {
            if !states.iter().any(|s| *s == p.state) {
                states.push(p.state.clone());
            }
        }

        let active = projects.iter().filter(|p| p.active).count();

        Self {
            total: projects.len(),
            states,
            active,
            inactive: projects.len() - active,
            recent: projects
                .iter()
                .take(RECENT_SAMPLE)
                .map(|p| p.name.clone())
                .collect(),
        }
    }

    pub fn render(&self) -> String {
        format!(
            "Summary of {} projects:\n\
             - States: {}\n\
             - Active projects: {}\n\
             - Inactive projects: {}\n\
             - Most recent projects: {}",
            self.total,
            self.states.join(", "),
            self.active,
            self.inactive,
            self.recent.join(", "),
        )
    }
}

/// Compute and render the basic summary in one step.
pub fn basic_summary(projects: &[ProjectDigest]) -> String {
    BasicSummary::compute(projects).render()
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// How a summary was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AnalysisMethod {
    #[serde(rename = "ai")]
    Ai,
    #[serde(rename = "basic")]
    Basic,
    #[serde(rename = "basic-fallback")]
    BasicFallback,
}

/// Response payload of the analysis endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub summary: String,
    pub project_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<AnalysisMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AnalysisReport {
    /// The fixed result for an empty project set.
    pub fn empty() -> Self {
        Self {
            summary: EMPTY_SUMMARY.to_string(),
            project_count: 0,
            method: None,
            model: None,
            note: None,
            error: None,
        }
    }

    /// A basic summary produced because no credential is configured.
    pub fn basic(projects: &[ProjectDigest]) -> Self {
        Self {
            summary: basic_summary(projects),
            project_count: projects.len(),
            method: Some(AnalysisMethod::Basic),
            model: None,
            note: Some(MISSING_KEY_NOTE.to_string()),
            error: None,
        }
    }

    /// A basic summary produced after the external call failed.
    pub fn fallback(projects: &[ProjectDigest], error: impl Into<String>) -> Self {
        Self {
            summary: basic_summary(projects),
            project_count: projects.len(),
            method: Some(AnalysisMethod::BasicFallback),
            model: None,
            note: None,
            error: Some(error.into()),
        }
    }

    /// A generated summary. `text` of `None` is replaced with
    /// [`NO_CONTENT_PLACEHOLDER`].
    pub fn ai(project_count: usize, text: Option<String>, model: impl Into<String>) -> Self {
        Self {
            summary: text.unwrap_or_else(|| NO_CONTENT_PLACEHOLDER.to_string()),
            project_count,
            method: Some(AnalysisMethod::Ai),
            model: Some(model.into()),
            note: None,
            error: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Retry policy
// ---------------------------------------------------------------------------

/// Bounded retry with exponential backoff for outbound generation calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Never less than 1.
    pub max_attempts: u32,
    /// Delay after the first failed attempt; doubles after each further one.
    pub backoff_base: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_base: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    /// Delay to wait after `attempt` (1-based) failed.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        backoff_delay(attempt, self.backoff_base)
    }
}

/// `base × 2^(attempt − 1)`, saturating instead of overflowing.
pub fn backoff_delay(attempt: u32, base: Duration) -> Duration {
    let exponent = attempt.saturating_sub(1).min(31);
    base.saturating_mul(1u32 << exponent)
}

/// Whether a failed attempt is worth retrying.
///
/// `status` is `None` when no response was received at all (connection
/// refused, DNS failure, timeout). Server errors, rate limiting, and any
/// message mentioning an overload are retried.
pub fn is_retryable(status: Option<u16>, message: &str) -> bool {
    match status {
        None => true,
        Some(code) if code >= 500 || code == 429 => true,
        Some(_) => mentions_overload(message),
    }
}

/// Case-insensitive match on "overload" (overloaded, overloading, ...).
pub fn mentions_overload(message: &str) -> bool {
    OVERLOAD_RE.is_match(message)
}
