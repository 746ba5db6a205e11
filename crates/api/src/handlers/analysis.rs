//! Handler for the executive-summary endpoint.

use std::convert::Infallible;
use std::time::Duration;

use axum::extract::State;
use axum::Json;
use tokio_util::sync::CancellationToken;
use workboard_core::analysis::AnalysisReport;
use workboard_db::repositories::ProjectRepo;

use crate::error::AppResult;
use crate::state::AppState;

/// GET /api/analysis
///
/// Only a failing project query is an error. Generation problems degrade to
/// the basic summary inside the report.
pub async fn get_analysis(State(state): State<AppState>) -> AppResult<Json<AnalysisReport>> {
    let digests: Vec<_> = ProjectRepo::list_active(&state.pool)
        .await?
        .iter()
        .map(|p| p.digest())
        .collect();

    let cancel = CancellationToken::new();
    let deadline = Duration::from_secs(state.config.analysis_deadline_secs);

    // The deadline timer is polled by this request, not spawned.
    let report = tokio::select! {
        report = state.summaries.generate(&digests, &cancel) => report,
        never = cancel_after(&cancel, deadline) => match never {},
    };

    Ok(Json(report))
}

/// Cancel `cancel` once `deadline` elapses, then wait forever so the
/// generator can finish its fallback.
async fn cancel_after(cancel: &CancellationToken, deadline: Duration) -> Infallible {
    tokio::time::sleep(deadline).await;
    tracing::warn!(deadline_secs = deadline.as_secs(), "Analysis deadline reached, cancelling generation");
    cancel.cancel();
    std::future::pending().await
}
