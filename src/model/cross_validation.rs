use log::info;
use ndarray::Array1;
use serde::Serialize;

use super::sgd::fit;
use crate::config::settings::Hyperparameters;
use crate::dataset::RatingDataset;
use crate::errors::Result;
use crate::evaluation::{EvaluationReport, evaluate};

/// Mean and population standard deviation of one metric across folds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricSummary {
    pub mean: f64,
    pub std_dev: f64,
}

impl MetricSummary {
    fn from_values(values: Vec<f64>) -> Self {
        let values = Array1::from(values);
        Self {
            mean: values.mean().unwrap_or(0.0),
            std_dev: values.std(0.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrossValidationReport {
    pub folds: Vec<EvaluationReport>,
    pub rmse: MetricSummary,
    pub mae: MetricSummary,
    pub accuracy_within_half: MetricSummary,
    pub accuracy_within_one: MetricSummary,
    pub bias: MetricSummary,
}

/// Fits and evaluates a fresh model on each of `k` disjoint test folds.
pub fn cross_validate(
    dataset: &RatingDataset,
    params: &Hyperparameters,
    k: usize,
    seed: u64,
) -> Result<CrossValidationReport> {
    params.validate()?;
    let folds = dataset.folds(k, seed)?;

    let mut reports = Vec::with_capacity(folds.len());
    for (idx, fold) in folds.iter().enumerate() {
        info!(
            "  Fold {}/{}: {} train, {} test ratings",
            idx + 1,
            k,
            fold.train.len(),
            fold.test.len()
        );
        let model = fit(&fold.train, params)?;
        let report = evaluate(&model, fold.test.ratings())?;
        info!("    → RMSE {:.4}, MAE {:.4}", report.rmse, report.mae);
        reports.push(report);
    }

    let summarize = |metric: fn(&EvaluationReport) -> f64| {
        MetricSummary::from_values(reports.iter().map(metric).collect())
    };

    Ok(CrossValidationReport {
        rmse: summarize(|r| r.rmse),
        mae: summarize(|r| r.mae),
        accuracy_within_half: summarize(|r| r.accuracy_within_half),
        accuracy_within_one: summarize(|r| r.accuracy_within_one),
        bias: summarize(|r| r.bias),
        folds: reports,
    })
}
