use axum::{
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use log::error;
use std::sync::Arc;

use super::{AppState, error_response};
use crate::api::models::{PredictRequest, PredictResponse, RecommendationItem};
use crate::api::parsers::{parse_integer, round_rating};
use crate::errors::RecommenderError;
use crate::services::recommendation::{
    RecommendationError, RecommendationRequest, RecommendationResult,
};

pub async fn predict(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> Response {
    let body = match payload {
        Ok(Json(body)) => body,
        Err(JsonRejection::MissingJsonContentType(_)) => PredictRequest::default(),
        Err(rejection) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                format!("invalid request body: {}", rejection.body_text()),
            );
        }
    };

    let request = match build_request(&state, body) {
        Ok(request) => request,
        Err(message) => return error_response(StatusCode::BAD_REQUEST, message),
    };

    let service = state.recommendations.clone();
    let result =
        tokio::task::spawn_blocking(move || service.recommend_for_user(&request)).await;

    match result {
        Ok(Ok(result)) => Json(to_response(result)).into_response(),
        Ok(Err(e)) => recommendation_error_response(e),
        Err(e) => {
            error!("Recommendation task failed: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}

fn build_request(state: &AppState, body: PredictRequest) -> Result<RecommendationRequest, String> {
    let user_id = body.user_id.ok_or("user_id is required")?;
    let top_n = body
        .top_n
        .unwrap_or_else(|| state.config.serving.default_top_n.into());

    let (Some(user_id), Some(top_n)) = (parse_integer(&user_id), parse_integer(&top_n)) else {
        return Err("user_id and top_n must be integers".to_string());
    };

    let max_top_n = state.config.serving.max_top_n;
    if top_n < 1 || top_n > max_top_n as i64 {
        return Err(format!("top_n must be between 1 and {}", max_top_n));
    }

    Ok(RecommendationRequest {
        user_id,
        top_n: top_n as usize,
        exclude_borrowed: body.exclude_borrowed.unwrap_or(true),
    })
}

fn to_response(result: RecommendationResult) -> PredictResponse {
    PredictResponse {
        status: "success".to_string(),
        user_id: result.user_id,
        total_predictions: result.total_predictions,
        recommendations: result
            .recommendations
            .into_iter()
            .map(|r| RecommendationItem {
                book_id: r.book.book_id,
                title: r.book.title,
                author: r.book.author,
                category: r.book.category,
                predicted_rating: round_rating(r.prediction.estimated_rating),
            })
            .collect(),
    }
}

fn recommendation_error_response(e: RecommendationError) -> Response {
    match e {
        RecommendationError::UserNotFound(user_id) => {
            error_response(StatusCode::NOT_FOUND, format!("User {} not found", user_id))
        }
        RecommendationError::Core(RecommenderError::InvalidArgument(message)) => {
            error_response(StatusCode::BAD_REQUEST, message)
        }
        RecommendationError::Core(RecommenderError::UnknownUser(user_id)) => error_response(
            StatusCode::NOT_FOUND,
            format!("User {} has no rating history", user_id),
        ),
        other => {
            error!("Prediction request failed: {}", other);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, other.to_string())
        }
    }
}
