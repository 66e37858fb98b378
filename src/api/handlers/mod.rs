use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};

use crate::api::models::ErrorResponse;
use crate::config::settings::AppConfig;
use crate::services::recommendation::RecommendationService;

pub mod health;
pub mod recommendations;

/// Shared, read-only state of the serving process. It only exists once a model
/// has been loaded, so every request is scored.
pub struct AppState {
    pub recommendations: RecommendationService,
    pub config: AppConfig,
}

pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    let body = ErrorResponse {
        status: "error".to_string(),
        message: message.into(),
    };
    (status, Json(body)).into_response()
}

pub async fn not_found() -> Response {
    error_response(StatusCode::NOT_FOUND, "Endpoint not found")
}
