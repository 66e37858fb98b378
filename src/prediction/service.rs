use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;

use crate::dataset::{ItemId, RatingValue, UserId};
use crate::errors::{RecommenderError, Result};
use crate::model::FactorModel;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub user_id: UserId,
    pub item_id: ItemId,
    /// Estimate clipped to the rating scale.
    pub estimated_rating: RatingValue,
    /// Unclipped estimate; ranking uses this to keep relative order above the scale.
    pub raw_estimate: RatingValue,
    pub was_clipped: bool,
}

/// Scores and ranks items for users against one fitted, shared model.
#[derive(Debug, Clone)]
pub struct PredictionService {
    model: Arc<FactorModel>,
    strict: bool,
}

impl PredictionService {
    pub fn new(model: Arc<FactorModel>) -> Self {
        Self {
            model,
            strict: false,
        }
    }

    /// In strict mode `recommend` refuses users without learned parameters.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn model(&self) -> &FactorModel {
        &self.model
    }

    pub fn predict(&self, user_id: UserId, item_id: ItemId) -> Prediction {
        let raw = self.model.estimate(user_id, item_id).value;
        let (estimated_rating, was_clipped) = self.model.scale().clip(raw);

        Prediction {
            user_id,
            item_id,
            estimated_rating,
            raw_estimate: raw,
            was_clipped,
        }
    }

    /// Top `top_n` candidates outside `exclude`, best first, ties by ascending item id.
    pub fn recommend(
        &self,
        user_id: UserId,
        candidates: &[ItemId],
        exclude: &HashSet<ItemId>,
        top_n: usize,
    ) -> Result<Vec<Prediction>> {
        if top_n == 0 {
            return Err(RecommenderError::InvalidArgument(
                "top_n must be a positive integer".to_string(),
            ));
        }
        if self.strict && !self.model.knows_user(user_id) {
            return Err(RecommenderError::UnknownUser(user_id));
        }

        let mut seen = HashSet::new();
        let mut predictions: Vec<Prediction> = candidates
            .iter()
            .copied()
            .filter(|item_id| !exclude.contains(item_id) && seen.insert(*item_id))
            .map(|item_id| self.predict(user_id, item_id))
            .collect();

        predictions.sort_by(rank_order);
        predictions.truncate(top_n);
        Ok(predictions)
    }
}

fn rank_order(a: &Prediction, b: &Prediction) -> Ordering {
    b.raw_estimate
        .total_cmp(&a.raw_estimate)
        .then_with(|| a.item_id.cmp(&b.item_id))
}
