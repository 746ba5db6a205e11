//! Tests for `AppError` → HTTP response mapping.
//!
//! These call `IntoResponse` directly on `AppError` values; no server or
//! database is needed.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use http_body_util::BodyExt;
use workboard_api::error::AppError;
use workboard_core::error::CoreError;
use workboard_core::types::{parse_id, Date, DbId};

async fn error_to_response(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn not_found_names_entity_and_id() {
    let id = DbId::nil();
    let (status, json) = error_to_response(AppError::Core(CoreError::NotFound {
        entity: "Project",
        id,
    }))
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], format!("Project with id {id} not found"));
}

#[tokio::test]
async fn invalid_identifier_returns_400() {
    let err = parse_id("abc").unwrap_err();
    let (status, json) = error_to_response(AppError::Core(err)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "INVALID_ID");
}

#[tokio::test]
async fn date_range_returns_400() {
    let (status, json) = error_to_response(AppError::Core(CoreError::InvalidDateRange {
        start: Date::from_ymd_opt(2025, 6, 1).unwrap(),
        end: Date::from_ymd_opt(2025, 1, 1).unwrap(),
    }))
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "INVALID_DATE_RANGE");
    assert_eq!(json["error"], "End date 2025-01-01 is before start date 2025-06-01");
}

#[tokio::test]
async fn validation_returns_400() {
    let (status, json) =
        error_to_response(AppError::Core(CoreError::Validation("name: required".into()))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["error"], "name: required");
}

#[tokio::test]
async fn duplicate_name_returns_409() {
    let (status, json) =
        error_to_response(AppError::Core(CoreError::DuplicateName("taken".into()))).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "DUPLICATE_NAME");
}

#[tokio::test]
async fn conflict_returns_409() {
    let (status, json) =
        error_to_response(AppError::Core(CoreError::Conflict("modified".into()))).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "CONFLICT");
}

#[tokio::test]
async fn bad_request_returns_400() {
    let (status, json) = error_to_response(AppError::BadRequest("invalid body".into())).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "BAD_REQUEST");
    assert_eq!(json["error"], "invalid body");
}

#[tokio::test]
async fn row_not_found_returns_404() {
    let (status, json) = error_to_response(AppError::Database(sqlx::Error::RowNotFound)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
}

#[tokio::test]
async fn other_database_errors_are_sanitized() {
    let (status, json) = error_to_response(AppError::Database(sqlx::Error::PoolTimedOut)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "INTERNAL_ERROR");
    assert_eq!(json["error"], "An internal error occurred");
}
