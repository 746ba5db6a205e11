pub mod analysis;
pub mod graphics;
pub mod health;
pub mod project;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// ```text
/// /projects            list, create
/// /projects/{id}       get, update (PATCH), soft delete
///
/// /graphics            dashboard aggregates
///
/// /analysis            executive summary of active projects
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/projects", project::router())
        .merge(graphics::router())
        .merge(analysis::router())
}
