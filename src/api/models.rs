use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `POST /predict`. Fields stay loosely typed so malformed values
/// produce a validation message instead of a framework rejection.
#[derive(Debug, Default, Deserialize)]
pub struct PredictRequest {
    pub user_id: Option<Value>,
    pub top_n: Option<Value>,
    pub exclude_borrowed: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RecommendationItem {
    pub book_id: i64,
    pub title: String,
    pub author: Option<String>,
    pub category: Option<String>,
    pub predicted_rating: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PredictResponse {
    pub status: String,
    pub user_id: i64,
    pub total_predictions: usize,
    pub recommendations: Vec<RecommendationItem>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: String,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub model_loaded: bool,
    pub service: String,
}
