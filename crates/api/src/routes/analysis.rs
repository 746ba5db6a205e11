use axum::routing::get;
use axum::Router;

use crate::handlers::analysis;
use crate::state::AppState;

/// `GET /analysis` -> executive summary.
pub fn router() -> Router<AppState> {
    Router::new().route("/analysis", get(analysis::get_analysis))
}
