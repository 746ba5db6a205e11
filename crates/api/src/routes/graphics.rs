use axum::routing::get;
use axum::Router;

use crate::handlers::graphics;
use crate::state::AppState;

/// `GET /graphics` -> dashboard aggregates.
pub fn router() -> Router<AppState> {
    Router::new().route("/graphics", get(graphics::get_graphics))
}
