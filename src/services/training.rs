use anyhow::{Result, bail};
use log::{info, warn};
use std::path::PathBuf;

use crate::config::settings::AppConfig;
use crate::database;
use crate::dataset::RatingDataset;
use crate::evaluation::{BiasLevel, EvaluationReport, evaluate};
use crate::model::{self, CrossValidationReport, FactorModel};
use crate::store::ModelStore;

pub struct TrainingOutcome {
    pub model: FactorModel,
    pub evaluation: EvaluationReport,
    pub cross_validation: Option<CrossValidationReport>,
}

/// Reads ratings from the store, fits and evaluates a model, and saves it.
pub struct TrainingService {
    config: AppConfig,
}

impl TrainingService {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn run(&self, with_cross_validation: bool) -> Result<PathBuf> {
        info!("=== Starting Model Training ===\n");

        let dataset = self.load_dataset()?;
        let outcome = self.train(&dataset, with_cross_validation)?;

        let store = ModelStore::new(&self.config.paths.model_path);
        let path = store.save(&outcome.model)?;
        info!("  → Model saved to {}\n", path.display());

        info!("=== Training Complete ===");
        Ok(path)
    }

    pub fn run_cross_validation(&self, folds: usize) -> Result<CrossValidationReport> {
        info!("=== Starting Cross-Validation ===\n");

        let dataset = self.load_dataset()?;
        let report = self.cross_validate(&dataset, folds)?;

        info!("=== Cross-Validation Complete ===");
        Ok(report)
    }

    /// Split, fit, evaluate and optionally cross-validate; nothing is persisted.
    pub fn train(
        &self,
        dataset: &RatingDataset,
        with_cross_validation: bool,
    ) -> Result<TrainingOutcome> {
        let settings = &self.config.dataset;
        let (train, test) = dataset.split(settings.test_fraction, settings.split_seed)?;
        info!("  → Train set: {} ratings", train.len());
        info!("  → Test set: {} ratings\n", test.len());

        if test.is_empty() {
            bail!("Not enough ratings to hold out a test set ({} total)", dataset.len());
        }

        let model = model::fit(&train, &self.config.training)?;
        info!(
            "  → Fitted {} users and {} items\n",
            model.user_count(),
            model.item_count()
        );

        let evaluation = evaluate(&model, test.ratings())?;
        log_evaluation(&evaluation);
        log_sample_prediction(&model, &test);

        let cross_validation = if with_cross_validation {
            Some(self.cross_validate(dataset, settings.cv_folds)?)
        } else {
            None
        };

        Ok(TrainingOutcome {
            model,
            evaluation,
            cross_validation,
        })
    }

    fn cross_validate(&self, dataset: &RatingDataset, folds: usize) -> Result<CrossValidationReport> {
        info!("Running {}-fold cross-validation...", folds);
        let report = model::cross_validate(
            dataset,
            &self.config.training,
            folds,
            self.config.dataset.split_seed,
        )?;

        info!("Cross-Validation Results:");
        info!(
            "  - Mean RMSE: {:.4} (+/- {:.4})",
            report.rmse.mean, report.rmse.std_dev
        );
        info!(
            "  - Mean MAE: {:.4} (+/- {:.4})",
            report.mae.mean, report.mae.std_dev
        );
        info!(
            "  - Mean accuracy (within 0.5): {:.4} (+/- {:.4})",
            report.accuracy_within_half.mean, report.accuracy_within_half.std_dev
        );
        info!(
            "  - Mean bias: {:.4} (+/- {:.4})\n",
            report.bias.mean, report.bias.std_dev
        );
        Ok(report)
    }

    fn load_dataset(&self) -> Result<RatingDataset> {
        let pool = database::create_pool(&self.config.paths.database_path)?;
        let mut conn = database::get_connection(&pool)?;

        let triples = database::reviews::list_rating_triples(&mut conn)?;
        let dataset = RatingDataset::new(triples, self.config.dataset.scale)?;

        let summary = dataset.summary();
        info!("  → Loaded {} ratings", summary.ratings);
        info!("    - Unique users: {}", summary.users);
        info!("    - Unique books: {}", summary.items);
        for (rating, count) in &summary.distribution {
            info!("    - Rating {}: {}", rating, count);
        }

        Ok(dataset)
    }
}

fn log_evaluation(report: &EvaluationReport) {
    info!("Test Set Performance:");
    info!("  - RMSE: {:.4}", report.rmse);
    info!("  - MAE: {:.4}", report.mae);
    info!(
        "  - Accuracy (within 0.5 stars): {:.4} ({:.2}%)",
        report.accuracy_within_half,
        report.accuracy_within_half * 100.0
    );
    info!(
        "  - Accuracy (within 1.0 star): {:.4} ({:.2}%)",
        report.accuracy_within_one,
        report.accuracy_within_one * 100.0
    );
    info!("  - Error std dev: {:.4}", report.error_std_dev);
    info!("  - 95% interval: +/- {:.4}", report.confidence_interval_95);

    match report.bias_level {
        BiasLevel::High => warn!(
            "  - Mean error: {:.4} (high bias, model systematically {}predicts)",
            report.bias,
            if report.overpredicts() { "over" } else { "under" }
        ),
        level => info!("  - Mean error: {:.4} ({} bias)", report.bias, level.as_str()),
    }

    info!(
        "  - Predictions: min {:.2}, max {:.2}, mean {:.2} (actual mean {:.2})",
        report.prediction_min, report.prediction_max, report.prediction_mean, report.actual_mean
    );
    if report.cold_start_count > 0 {
        info!(
            "  - {} of {} test ratings scored via cold-start fallback",
            report.cold_start_count, report.count
        );
    }
    info!("  - {}\n", report.rmse_assessment().describe());
}

fn log_sample_prediction(model: &FactorModel, test: &RatingDataset) {
    if let Some(sample) = test.ratings().next() {
        let estimate = model.estimate(sample.user_id, sample.item_id);
        info!(
            "Sample: user {} + book {} → predicted {:.2}, actual {:.1}\n",
            sample.user_id, sample.item_id, estimate.value, sample.rating
        );
    }
}
