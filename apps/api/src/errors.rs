use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::features::engineer::FeatureError;
use crate::scoring::ScoreError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// Feature vector and fitted artifacts disagree. Not recoverable per request.
    #[error("Scoring error: {0}")]
    Scoring(#[from] ScoreError),

    #[error("Feature error: {0}")]
    Feature(#[from] FeatureError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Scoring(e) => {
                tracing::error!("Scoring error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "SCORING_ERROR",
                    "Model artifacts do not match the live feature schema".to_string(),
                )
            }
            AppError::Feature(e) => {
                tracing::error!("Feature error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "FEATURE_ERROR",
                    "Failed to build features for this pair".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
