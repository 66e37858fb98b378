use std::collections::HashMap;

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::config::settings::Hyperparameters;
use crate::dataset::{ItemId, RatingScale, RatingValue, UserId};
use crate::errors::{RecommenderError, Result};

/// Learned biases and latent factors of a matrix factorization model.
///
/// Built once by [`crate::model::fit`] and read-only afterwards. Only users and
/// items seen during training have entries; absence marks a cold-start id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorModel {
    global_bias: RatingValue,
    user_bias: HashMap<UserId, f64>,
    item_bias: HashMap<ItemId, f64>,
    user_factors: HashMap<UserId, Array1<f64>>,
    item_factors: HashMap<ItemId, Array1<f64>>,
    hyperparameters: Hyperparameters,
    scale: RatingScale,
}

/// Unclipped estimate together with which side of the pair was known.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Estimate {
    pub value: RatingValue,
    pub user_known: bool,
    pub item_known: bool,
}

impl Estimate {
    pub fn is_cold_start(&self) -> bool {
        !(self.user_known && self.item_known)
    }
}

impl FactorModel {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        global_bias: RatingValue,
        user_bias: HashMap<UserId, f64>,
        item_bias: HashMap<ItemId, f64>,
        user_factors: HashMap<UserId, Array1<f64>>,
        item_factors: HashMap<ItemId, Array1<f64>>,
        hyperparameters: Hyperparameters,
        scale: RatingScale,
    ) -> Self {
        Self {
            global_bias,
            user_bias,
            item_bias,
            user_factors,
            item_factors,
            hyperparameters,
            scale,
        }
    }

    pub fn global_bias(&self) -> RatingValue {
        self.global_bias
    }

    pub fn hyperparameters(&self) -> &Hyperparameters {
        &self.hyperparameters
    }

    pub fn scale(&self) -> RatingScale {
        self.scale
    }

    pub fn user_bias(&self, user_id: UserId) -> Option<f64> {
        self.user_bias.get(&user_id).copied()
    }

    pub fn item_bias(&self, item_id: ItemId) -> Option<f64> {
        self.item_bias.get(&item_id).copied()
    }

    pub fn user_factors(&self, user_id: UserId) -> Option<&Array1<f64>> {
        self.user_factors.get(&user_id)
    }

    pub fn item_factors(&self, item_id: ItemId) -> Option<&Array1<f64>> {
        self.item_factors.get(&item_id)
    }

    pub fn knows_user(&self, user_id: UserId) -> bool {
        self.user_bias.contains_key(&user_id)
    }

    pub fn knows_item(&self, item_id: ItemId) -> bool {
        self.item_bias.contains_key(&item_id)
    }

    pub fn user_count(&self) -> usize {
        self.user_bias.len()
    }

    pub fn item_count(&self) -> usize {
        self.item_bias.len()
    }

    /// Raw estimate for a pair, falling back to bias-only or the global mean
    /// when one or both ids were never seen in training.
    pub fn estimate(&self, user_id: UserId, item_id: ItemId) -> Estimate {
        let user = self.user_bias.get(&user_id).zip(self.user_factors.get(&user_id));
        let item = self.item_bias.get(&item_id).zip(self.item_factors.get(&item_id));

        let value = match (user, item) {
            (Some((bu, pu)), Some((bi, qi))) => self.global_bias + bu + bi + pu.dot(qi),
            (Some((bu, _)), None) => self.global_bias + bu,
            (None, Some((bi, _))) => self.global_bias + bi,
            (None, None) => self.global_bias,
        };

        Estimate {
            value,
            user_known: user.is_some(),
            item_known: item.is_some(),
        }
    }

    /// Checks the one-bias-one-vector-of-length-k invariant, used after loading.
    pub fn validate(&self) -> Result<()> {
        let k = self.hyperparameters.factors;

        if k < 1 {
            return Err(RecommenderError::ModelUnavailable(
                "model has no latent factors".to_string(),
            ));
        }
        RatingScale::new(self.scale.min, self.scale.max)
            .map_err(|e| RecommenderError::ModelUnavailable(e.to_string()))?;

        if !self.global_bias.is_finite() {
            return Err(RecommenderError::ModelUnavailable(
                "global bias is not finite".to_string(),
            ));
        }

        check_entries("user", &self.user_bias, &self.user_factors, k)?;
        check_entries("item", &self.item_bias, &self.item_factors, k)
    }
}

fn check_entries(
    kind: &str,
    biases: &HashMap<i64, f64>,
    factors: &HashMap<i64, Array1<f64>>,
    k: usize,
) -> Result<()> {
    if biases.len() != factors.len() {
        return Err(RecommenderError::ModelUnavailable(format!(
            "{} {kind} biases but {} {kind} factor vectors",
            biases.len(),
            factors.len()
        )));
    }

    for (id, vector) in factors {
        if !biases.contains_key(id) {
            return Err(RecommenderError::ModelUnavailable(format!(
                "{kind} {id} has factors but no bias"
            )));
        }
        if vector.len() != k {
            return Err(RecommenderError::ModelUnavailable(format!(
                "{kind} {id} has {} factors, expected {k}",
                vector.len()
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn hand_built_model() -> FactorModel {
        let hyperparameters = Hyperparameters {
            factors: 2,
            ..Hyperparameters::default()
        };
        FactorModel::new(
            3.5,
            HashMap::from([(1, 0.5)]),
            HashMap::from([(10, -0.25)]),
            HashMap::from([(1, array![1.0, 2.0])]),
            HashMap::from([(10, array![0.5, 0.25])]),
            hyperparameters,
            RatingScale::default(),
        )
    }

    #[test]
    fn test_estimate_for_known_pair_uses_dot_product() {
        let model = hand_built_model();
        let estimate = model.estimate(1, 10);
        assert!((estimate.value - (3.5 + 0.5 - 0.25 + 1.0)).abs() < 1e-12);
        assert!(!estimate.is_cold_start());
    }

    #[test]
    fn test_estimate_falls_back_to_known_bias() {
        let model = hand_built_model();
        assert_eq!(model.estimate(1, 99).value, 4.0);
        assert_eq!(model.estimate(99, 10).value, 3.25);
        assert_eq!(model.estimate(99, 98).value, 3.5);
        assert!(model.estimate(99, 98).is_cold_start());
    }

    #[test]
    fn test_validate_detects_wrong_vector_length() {
        let mut model = hand_built_model();
        assert!(model.validate().is_ok());

        model.item_factors.insert(10, array![1.0]);
        assert!(matches!(
            model.validate(),
            Err(RecommenderError::ModelUnavailable(_))
        ));
    }

    #[test]
    fn test_validate_rejects_inverted_scale() {
        let mut model = hand_built_model();
        model.scale = RatingScale { min: 5.0, max: 1.0 };
        assert!(matches!(
            model.validate(),
            Err(RecommenderError::ModelUnavailable(_))
        ));
    }
}
