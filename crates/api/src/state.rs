use std::sync::Arc;

use workboard_insights::SummaryGenerator;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: workboard_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Executive-summary generator for the analysis endpoint.
    pub summaries: Arc<SummaryGenerator>,
}
