use ndarray::Array1;
use serde::Serialize;

use crate::dataset::RatingTriple;
use crate::errors::{RecommenderError, Result};
use crate::model::FactorModel;

const Z_95: f64 = 1.96;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BiasLevel {
    Low,      // |bias| < 0.1
    Moderate, // |bias| < 0.3
    High,
}

impl BiasLevel {
    pub fn from_bias(bias: f64) -> Self {
        let magnitude = bias.abs();
        if magnitude < 0.1 {
            BiasLevel::Low
        } else if magnitude < 0.3 {
            BiasLevel::Moderate
        } else {
            BiasLevel::High
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            BiasLevel::Low => "low",
            BiasLevel::Moderate => "moderate",
            BiasLevel::High => "high",
        }
    }
}

/// Rough reading of a test RMSE on a 1-5 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RmseAssessment {
    PossibleOverfit,
    TargetRange,
    NeedsTuning,
}

impl RmseAssessment {
    pub fn from_rmse(rmse: f64) -> Self {
        if rmse < 0.8 {
            RmseAssessment::PossibleOverfit
        } else if rmse <= 1.2 {
            RmseAssessment::TargetRange
        } else {
            RmseAssessment::NeedsTuning
        }
    }

    pub fn describe(&self) -> &str {
        match self {
            RmseAssessment::PossibleOverfit => "RMSE is very low, possible overfitting",
            RmseAssessment::TargetRange => "RMSE is in the target range (0.8-1.2)",
            RmseAssessment::NeedsTuning => "RMSE is high, model may need tuning",
        }
    }
}

/// Accuracy of a fitted model against held-out ratings.
///
/// Errors are signed as `predicted - actual` on unclipped estimates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationReport {
    pub count: usize,
    pub cold_start_count: usize,
    pub rmse: f64,
    pub mae: f64,
    pub accuracy_within_half: f64,
    pub accuracy_within_one: f64,
    pub bias: f64,
    pub bias_level: BiasLevel,
    pub error_std_dev: f64,
    /// Half-width of the normal-approximation 95% interval of the error.
    pub confidence_interval_95: f64,
    pub prediction_min: f64,
    pub prediction_max: f64,
    pub prediction_mean: f64,
    pub actual_mean: f64,
}

impl EvaluationReport {
    pub fn overpredicts(&self) -> bool {
        self.bias > 0.0
    }

    pub fn rmse_assessment(&self) -> RmseAssessment {
        RmseAssessment::from_rmse(self.rmse)
    }
}

/// Scores every rating, including cold-start pairs via the bias fallback.
pub fn evaluate<'a, I>(model: &FactorModel, ratings: I) -> Result<EvaluationReport>
where
    I: IntoIterator<Item = &'a RatingTriple>,
{
    let mut predicted = Vec::new();
    let mut actual = Vec::new();
    let mut cold_start_count = 0;

    for rating in ratings {
        let estimate = model.estimate(rating.user_id, rating.item_id);
        if estimate.is_cold_start() {
            cold_start_count += 1;
        }
        predicted.push(estimate.value);
        actual.push(rating.rating);
    }

    if predicted.is_empty() {
        return Err(RecommenderError::EmptyDataset);
    }

    let predicted = Array1::from(predicted);
    let actual = Array1::from(actual);
    let errors = &predicted - &actual;

    let bias = mean(&errors);
    let error_std_dev = errors.std(0.0);

    Ok(EvaluationReport {
        count: errors.len(),
        cold_start_count,
        rmse: mean(&errors.mapv(|e| e * e)).sqrt(),
        mae: mean(&errors.mapv(f64::abs)),
        accuracy_within_half: accuracy_within(&errors, 0.5),
        accuracy_within_one: accuracy_within(&errors, 1.0),
        bias,
        bias_level: BiasLevel::from_bias(bias),
        error_std_dev,
        confidence_interval_95: Z_95 * error_std_dev,
        prediction_min: predicted.fold(f64::INFINITY, |a, &b| a.min(b)),
        prediction_max: predicted.fold(f64::NEG_INFINITY, |a, &b| a.max(b)),
        prediction_mean: mean(&predicted),
        actual_mean: mean(&actual),
    })
}

/// Fraction of errors whose magnitude is at most `threshold`.
pub fn accuracy_within(errors: &Array1<f64>, threshold: f64) -> f64 {
    if errors.is_empty() {
        return 0.0;
    }
    let hits = errors.iter().filter(|e| e.abs() <= threshold).count();
    hits as f64 / errors.len() as f64
}

fn mean(values: &Array1<f64>) -> f64 {
    values.mean().unwrap_or(0.0)
}
