use thiserror::Error;

use crate::dataset::UserId;

pub type Result<T> = std::result::Result<T, RecommenderError>;

/// Failures raised by the dataset, training, evaluation and prediction core.
///
/// Cold-start lookups are not errors; they fall back to bias-only or
/// global-average estimates.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RecommenderError {
    #[error("dataset contains no ratings")]
    EmptyDataset,

    #[error("invalid hyperparameter: {0}")]
    InvalidHyperparameter(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("user {0} has no learned parameters")]
    UnknownUser(UserId),

    #[error("model unavailable: {0}")]
    ModelUnavailable(String),
}
