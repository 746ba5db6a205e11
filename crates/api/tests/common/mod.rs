#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;
use workboard_api::config::ServerConfig;
use workboard_api::router::build_app_router;
use workboard_api::state::AppState;
use workboard_insights::{GeminiConfig, SummaryGenerator};

/// Build a test `ServerConfig` with safe defaults and no Gemini key.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        analysis_deadline_secs: 25,
        db_max_connections: 5,
        gemini: GeminiConfig::default(),
    }
}

/// Build the full application router over `pool`, with basic-only summaries.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with(pool, SummaryGenerator::from_config(&GeminiConfig::default()).unwrap())
}

/// Build the full application router with an explicit summary generator.
pub fn build_test_app_with(pool: PgPool, summaries: SummaryGenerator) -> Router {
    build_test_app_with_config(pool, summaries, test_config())
}

/// Build the full application router with an explicit generator and config.
pub fn build_test_app_with_config(
    pool: PgPool,
    summaries: SummaryGenerator,
    config: ServerConfig,
) -> Router {
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        summaries: Arc::new(summaries),
    };
    build_app_router(state, &config)
}

async fn send(app: Router, method: Method, uri: &str, body: Option<serde_json::Value>) -> Response {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, Method::GET, uri, None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send(app, Method::POST, uri, Some(body)).await
}

pub async fn patch_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send(app, Method::PATCH, uri, Some(body)).await
}

pub async fn delete(app: Router, uri: &str) -> Response {
    send(app, Method::DELETE, uri, None).await
}

/// Send a raw string body, for malformed-JSON cases.
pub async fn post_raw(app: Router, uri: &str, body: &'static str) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// A valid create payload for `name`.
pub fn project_json(name: &str) -> serde_json::Value {
    serde_json::json!({
        "name": name,
        "description": format!("{name} description"),
        "startDate": "2025-01-01",
        "endDate": "2025-12-31",
    })
}

/// Create a project through the API and return its id.
pub async fn create_project(pool: &PgPool, name: &str) -> String {
    let response = post_json(build_test_app(pool.clone()), "/api/projects", project_json(name)).await;
    let json = body_json(response).await;
    json["id"].as_str().unwrap().to_string()
}
