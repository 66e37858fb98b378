use serde::{Deserialize, Serialize};

use crate::dataset::RatingScale;
use crate::errors::{RecommenderError, Result};

/// Matrix factorization training parameters, stored alongside the fitted model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hyperparameters {
    /// Number of latent dimensions (k).
    pub factors: usize,
    pub epochs: usize,
    pub learning_rate: f64,
    pub regularization: f64,
    /// Standard deviation of the normal distribution factor vectors start from.
    pub init_std_dev: f64,
    pub random_seed: u64,
}

impl Default for Hyperparameters {
    fn default() -> Self {
        Self {
            factors: 150,
            epochs: 50,
            learning_rate: 0.007,
            regularization: 0.05,
            init_std_dev: 0.1,
            random_seed: 42,
        }
    }
}

impl Hyperparameters {
    pub fn validate(&self) -> Result<()> {
        if self.factors < 1 {
            return Err(invalid("factors must be at least 1"));
        }
        if self.epochs < 1 {
            return Err(invalid("epochs must be at least 1"));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(invalid(format!(
                "learning_rate must be positive, got {}",
                self.learning_rate
            )));
        }
        // Zero regularization is allowed; it just disables the penalty.
        if !(self.regularization.is_finite() && self.regularization >= 0.0) {
            return Err(invalid(format!(
                "regularization must be non-negative, got {}",
                self.regularization
            )));
        }
        if !(self.init_std_dev.is_finite() && self.init_std_dev > 0.0) {
            return Err(invalid(format!(
                "init_std_dev must be positive, got {}",
                self.init_std_dev
            )));
        }
        Ok(())
    }
}

fn invalid(message: impl Into<String>) -> RecommenderError {
    RecommenderError::InvalidHyperparameter(message.into())
}

#[derive(Debug, Clone)]
pub struct DatasetSettings {
    pub scale: RatingScale,
    pub test_fraction: f64,
    pub split_seed: u64,
    pub cv_folds: usize,
}

impl Default for DatasetSettings {
    fn default() -> Self {
        Self {
            scale: RatingScale::default(),
            test_fraction: 0.2,
            split_seed: 42,
            cv_folds: 5,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServingSettings {
    pub default_top_n: usize,
    pub max_top_n: usize,
    /// Reject users the model has no parameters for instead of falling back.
    pub strict_users: bool,
}

impl Default for ServingSettings {
    fn default() -> Self {
        Self {
            default_top_n: 10,
            max_top_n: 100,
            strict_users: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PathSettings {
    pub database_path: String,
    pub model_path: String,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            database_path: std::env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "library.db".to_string()),
            model_path: std::env::var("MODEL_PATH")
                .unwrap_or_else(|_| "data/factor_model.json".to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub training: Hyperparameters,
    pub dataset: DatasetSettings,
    pub serving: ServingSettings,
    pub paths: PathSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self {
            training: Hyperparameters::default(),
            dataset: DatasetSettings::default(),
            serving: ServingSettings::default(),
            paths: PathSettings::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_hyperparameters_are_valid() {
        assert!(Hyperparameters::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_hyperparameters_are_rejected() {
        let base = Hyperparameters::default();
        let cases = [
            Hyperparameters { factors: 0, ..base },
            Hyperparameters { epochs: 0, ..base },
            Hyperparameters { learning_rate: 0.0, ..base },
            Hyperparameters { learning_rate: -0.1, ..base },
            Hyperparameters { regularization: -0.01, ..base },
            Hyperparameters { init_std_dev: 0.0, ..base },
        ];

        for params in cases {
            assert!(matches!(
                params.validate(),
                Err(RecommenderError::InvalidHyperparameter(_))
            ));
        }
    }

    #[test]
    fn test_zero_regularization_is_allowed() {
        let params = Hyperparameters {
            regularization: 0.0,
            ..Hyperparameters::default()
        };
        assert!(params.validate().is_ok());
    }
}
