//! Handler for the dashboard aggregates.

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use workboard_db::models::project::StateCount;
use workboard_db::repositories::ProjectRepo;

use crate::error::AppResult;
use crate::state::AppState;

/// Chart data for the dashboard.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphicsResponse {
    /// Every project row, active or not.
    pub total: i64,
    /// Active projects grouped by state label.
    pub by_state: Vec<StateCount>,
    pub by_status: StatusBreakdown,
}

#[derive(Debug, Serialize)]
pub struct StatusBreakdown {
    pub active: i64,
    pub inactive: i64,
}

/// GET /api/graphics
pub async fn get_graphics(State(state): State<AppState>) -> AppResult<Json<GraphicsResponse>> {
    let (by_state, status) = tokio::try_join!(
        ProjectRepo::count_by_state(&state.pool),
        ProjectRepo::count_by_status(&state.pool),
    )?;

    Ok(Json(GraphicsResponse {
        total: status.total,
        by_state,
        by_status: StatusBreakdown {
            active: status.active,
            inactive: status.inactive,
        },
    }))
}
