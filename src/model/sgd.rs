use std::collections::HashMap;

use log::{debug, info};
use ndarray::{Array1, Array2, Zip};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand_distr::{Distribution, Normal};

use super::types::FactorModel;
use crate::config::settings::Hyperparameters;
use crate::dataset::RatingDataset;
use crate::errors::{RecommenderError, Result};

/// A training rating with user and item replaced by dense indices.
struct IndexedRating {
    user: usize,
    item: usize,
    rating: f64,
}

/// Maps sparse ids to dense indices in order of first appearance.
struct IdIndex {
    ids: Vec<i64>,
    positions: HashMap<i64, usize>,
}

impl IdIndex {
    fn new() -> Self {
        Self {
            ids: Vec::new(),
            positions: HashMap::new(),
        }
    }

    fn register(&mut self, id: i64) -> usize {
        let next = self.ids.len();
        *self.positions.entry(id).or_insert_with(|| {
            self.ids.push(id);
            next
        })
    }

    fn len(&self) -> usize {
        self.ids.len()
    }
}

/// Fits a biased matrix factorization model with stochastic gradient descent.
///
/// The global bias is the training mean and stays fixed. Every epoch visits all
/// ratings once in a seeded shuffled order, so the result depends only on the
/// dataset and the hyperparameters.
pub fn fit(train: &RatingDataset, params: &Hyperparameters) -> Result<FactorModel> {
    params.validate()?;
    let global_bias = train.mean_rating().ok_or(RecommenderError::EmptyDataset)?;

    info!(
        "Fitting factor model on {} ratings (k={}, epochs={}, lr={}, reg={})",
        train.len(),
        params.factors,
        params.epochs,
        params.learning_rate,
        params.regularization
    );

    let (users, items, ratings) = index_ratings(train);
    info!("Found {} users and {} items", users.len(), items.len());

    let mut rng = StdRng::seed_from_u64(params.random_seed);
    let normal = Normal::new(0.0, params.init_std_dev)
        .map_err(|e| RecommenderError::InvalidHyperparameter(e.to_string()))?;

    let mut user_bias = Array1::<f64>::zeros(users.len());
    let mut item_bias = Array1::<f64>::zeros(items.len());
    let mut user_factors =
        Array2::from_shape_fn((users.len(), params.factors), |_| normal.sample(&mut rng));
    let mut item_factors =
        Array2::from_shape_fn((items.len(), params.factors), |_| normal.sample(&mut rng));

    let lr = params.learning_rate;
    let reg = params.regularization;
    let mut order: Vec<usize> = (0..ratings.len()).collect();

    for epoch in 0..params.epochs {
        order.shuffle(&mut rng);
        let mut squared_error = 0.0;

        for &idx in &order {
            let IndexedRating { user: u, item: i, rating } = ratings[idx];

            let dot = user_factors.row(u).dot(&item_factors.row(i));
            let err = rating - (global_bias + user_bias[u] + item_bias[i] + dot);
            squared_error += err * err;

            user_bias[u] += lr * (err - reg * user_bias[u]);
            item_bias[i] += lr * (err - reg * item_bias[i]);

            // Both vectors update from their pre-update values.
            Zip::from(user_factors.row_mut(u))
                .and(item_factors.row_mut(i))
                .for_each(|p, q| {
                    let (p_old, q_old) = (*p, *q);
                    *p += lr * (err * q_old - reg * p_old);
                    *q += lr * (err * p_old - reg * q_old);
                });
        }

        if !squared_error.is_finite()
            || !all_finite(&user_bias, &item_bias, &user_factors, &item_factors)
        {
            return Err(RecommenderError::InvalidHyperparameter(format!(
                "training diverged at epoch {} (learning_rate={}); lower the learning rate",
                epoch + 1,
                lr
            )));
        }

        debug!(
            "Epoch {}/{}: training RMSE {:.4}",
            epoch + 1,
            params.epochs,
            (squared_error / ratings.len() as f64).sqrt()
        );
    }

    info!("Finished {} epochs", params.epochs);

    Ok(FactorModel::new(
        global_bias,
        collect_biases(&users, &user_bias),
        collect_biases(&items, &item_bias),
        collect_factors(&users, &user_factors),
        collect_factors(&items, &item_factors),
        *params,
        train.scale(),
    ))
}

fn index_ratings(train: &RatingDataset) -> (IdIndex, IdIndex, Vec<IndexedRating>) {
    let mut users = IdIndex::new();
    let mut items = IdIndex::new();

    let ratings = train
        .ratings()
        .map(|r| IndexedRating {
            user: users.register(r.user_id),
            item: items.register(r.item_id),
            rating: r.rating,
        })
        .collect();

    (users, items, ratings)
}

fn all_finite(
    user_bias: &Array1<f64>,
    item_bias: &Array1<f64>,
    user_factors: &Array2<f64>,
    item_factors: &Array2<f64>,
) -> bool {
    user_bias.iter().all(|v| v.is_finite())
        && item_bias.iter().all(|v| v.is_finite())
        && user_factors.iter().all(|v| v.is_finite())
        && item_factors.iter().all(|v| v.is_finite())
}

fn collect_biases(index: &IdIndex, biases: &Array1<f64>) -> HashMap<i64, f64> {
    index
        .ids
        .iter()
        .enumerate()
        .map(|(idx, &id)| (id, biases[idx]))
        .collect()
}

fn collect_factors(index: &IdIndex, factors: &Array2<f64>) -> HashMap<i64, Array1<f64>> {
    index
        .ids
        .iter()
        .enumerate()
        .map(|(idx, &id)| (id, factors.row(idx).to_owned()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{RatingScale, RatingTriple};

    fn small_dataset() -> RatingDataset {
        let ratings = vec![
            RatingTriple::new(1, 10, 5.0),
            RatingTriple::new(1, 11, 3.0),
            RatingTriple::new(2, 10, 4.0),
        ];
        RatingDataset::new(ratings, RatingScale::default()).unwrap()
    }

    fn small_params() -> Hyperparameters {
        Hyperparameters {
            factors: 2,
            epochs: 100,
            random_seed: 7,
            ..Hyperparameters::default()
        }
    }

    #[test]
    fn test_fit_creates_entries_only_for_seen_ids() {
        let model = fit(&small_dataset(), &small_params()).unwrap();

        assert_eq!(model.user_count(), 2);
        assert_eq!(model.item_count(), 2);
        for user in [1, 2] {
            assert!(model.user_bias(user).is_some());
            assert_eq!(model.user_factors(user).map(|f| f.len()), Some(2));
        }
        for item in [10, 11] {
            assert!(model.item_bias(item).is_some());
            assert_eq!(model.item_factors(item).map(|f| f.len()), Some(2));
        }
        assert!(!model.knows_user(3));
        assert!(!model.knows_item(12));
    }

    #[test]
    fn test_global_bias_is_training_mean() {
        let model = fit(&small_dataset(), &small_params()).unwrap();
        assert!((model.global_bias() - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_fit_is_deterministic() {
        let first = fit(&small_dataset(), &small_params()).unwrap();
        let second = fit(&small_dataset(), &small_params()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_fit_ranks_higher_rated_item_first() {
        let model = fit(&small_dataset(), &small_params()).unwrap();
        assert!(model.estimate(1, 10).value > model.estimate(1, 11).value);
    }

    #[test]
    fn test_fit_rejects_invalid_hyperparameters() {
        let params = Hyperparameters {
            factors: 0,
            ..small_params()
        };
        let result = fit(&small_dataset(), &params);
        assert!(matches!(result, Err(RecommenderError::InvalidHyperparameter(_))));
    }

    #[test]
    fn test_fit_reports_divergence_instead_of_nan_model() {
        let ratings = vec![
            RatingTriple::new(1, 10, 5.0),
            RatingTriple::new(1, 11, 3.0),
            RatingTriple::new(2, 10, 4.0),
            RatingTriple::new(3, 12, 1.0),
        ];
        let dataset = RatingDataset::new(ratings, RatingScale::default()).unwrap();
        let params = Hyperparameters {
            learning_rate: 3.0,
            epochs: 200,
            ..small_params()
        };
        assert!(params.validate().is_ok());

        let result = fit(&dataset, &params);
        assert!(matches!(
            result,
            Err(RecommenderError::InvalidHyperparameter(ref msg)) if msg.contains("diverged")
        ));
    }

    #[test]
    fn test_fit_rejects_empty_training_subset() {
        let dataset = RatingDataset::new(vec![RatingTriple::new(1, 10, 4.0)], RatingScale::default())
            .unwrap();
        let (_, empty) = dataset.split(0.5, 1).unwrap();
        assert!(empty.is_empty());

        let result = fit(&empty, &small_params());
        assert_eq!(result.unwrap_err(), RecommenderError::EmptyDataset);
    }

    #[test]
    fn test_fit_reduces_training_error() {
        let dataset = small_dataset();
        let model = fit(&dataset, &small_params()).unwrap();

        let baseline: f64 = dataset.ratings().map(|r| (r.rating - 4.0).powi(2)).sum();
        let fitted: f64 = dataset
            .ratings()
            .map(|r| (r.rating - model.estimate(r.user_id, r.item_id).value).powi(2))
            .sum();
        assert!(fitted < baseline);
    }
}
