use axum::{extract::State, response::Json};
use std::sync::Arc;

use super::AppState;
use crate::api::models::HealthResponse;

pub async fn health(State(_state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        model_loaded: true,
        service: "Book Recommendations Service".to_string(),
    })
}
