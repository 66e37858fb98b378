use std::collections::{BTreeMap, HashSet};

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use super::types::{ItemId, RatingScale, RatingTriple, UserId};
use crate::errors::{RecommenderError, Result};

/// Immutable, ordered collection of ratings on a fixed scale.
#[derive(Debug, Clone, PartialEq)]
pub struct RatingDataset {
    ratings: Vec<RatingTriple>,
    scale: RatingScale,
}

/// One cross-validation partition.
#[derive(Debug, Clone)]
pub struct Fold {
    pub train: RatingDataset,
    pub test: RatingDataset,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DatasetSummary {
    pub ratings: usize,
    pub users: usize,
    pub items: usize,
    /// Count of ratings per rounded rating value.
    pub distribution: BTreeMap<i64, usize>,
}

impl RatingDataset {
    pub fn new(ratings: Vec<RatingTriple>, scale: RatingScale) -> Result<Self> {
        if ratings.is_empty() {
            return Err(RecommenderError::EmptyDataset);
        }

        if let Some(bad) = ratings.iter().find(|r| !scale.contains(r.rating)) {
            return Err(RecommenderError::InvalidArgument(format!(
                "rating {} by user {} for item {} is outside [{}, {}]",
                bad.rating, bad.user_id, bad.item_id, scale.min, scale.max
            )));
        }

        Ok(Self { ratings, scale })
    }

    /// Subsets produced by splitting skip validation; the parent was already checked.
    fn from_parts(ratings: Vec<RatingTriple>, scale: RatingScale) -> Self {
        Self { ratings, scale }
    }

    /// Restartable iteration over the ratings in their original order.
    pub fn ratings(&self) -> std::slice::Iter<'_, RatingTriple> {
        self.ratings.iter()
    }

    pub fn scale(&self) -> RatingScale {
        self.scale
    }

    pub fn len(&self) -> usize {
        self.ratings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ratings.is_empty()
    }

    pub fn mean_rating(&self) -> Option<f64> {
        if self.ratings.is_empty() {
            return None;
        }
        let sum: f64 = self.ratings.iter().map(|r| r.rating).sum();
        Some(sum / self.ratings.len() as f64)
    }

    pub fn distinct_users(&self) -> HashSet<UserId> {
        self.ratings.iter().map(|r| r.user_id).collect()
    }

    pub fn distinct_items(&self) -> HashSet<ItemId> {
        self.ratings.iter().map(|r| r.item_id).collect()
    }

    pub fn summary(&self) -> DatasetSummary {
        let mut distribution = BTreeMap::new();
        for rating in &self.ratings {
            *distribution.entry(rating.rating.round() as i64).or_insert(0) += 1;
        }

        DatasetSummary {
            ratings: self.ratings.len(),
            users: self.distinct_users().len(),
            items: self.distinct_items().len(),
            distribution,
        }
    }

    /// Splits into `(train, test)`; the same seed always yields the same partition.
    ///
    /// The test subset receives `ceil(test_fraction * len)` ratings, capped so the
    /// training subset keeps at least one. Both subsets keep the original order.
    pub fn split(&self, test_fraction: f64, seed: u64) -> Result<(RatingDataset, RatingDataset)> {
        if !(test_fraction > 0.0 && test_fraction < 1.0) {
            return Err(RecommenderError::InvalidArgument(format!(
                "test fraction must lie in (0, 1), got {test_fraction}"
            )));
        }
        if self.ratings.is_empty() {
            return Err(RecommenderError::EmptyDataset);
        }

        let n = self.ratings.len();
        let test_count = ((test_fraction * n as f64).ceil() as usize).min(n - 1);

        let order = shuffled_indices(n, seed);
        let mut in_test = vec![false; n];
        for &idx in &order[..test_count] {
            in_test[idx] = true;
        }

        Ok(self.partition(&in_test))
    }

    /// Deals the shuffled ratings round-robin into `k` disjoint test folds.
    pub fn folds(&self, k: usize, seed: u64) -> Result<Vec<Fold>> {
        let n = self.ratings.len();
        if k < 2 || k > n {
            return Err(RecommenderError::InvalidArgument(format!(
                "number of folds must lie in [2, {n}], got {k}"
            )));
        }

        let order = shuffled_indices(n, seed);
        let mut fold_of = vec![0usize; n];
        for (position, &idx) in order.iter().enumerate() {
            fold_of[idx] = position % k;
        }

        let folds = (0..k)
            .map(|fold| {
                let in_test: Vec<bool> = fold_of.iter().map(|&f| f == fold).collect();
                let (train, test) = self.partition(&in_test);
                Fold { train, test }
            })
            .collect();

        Ok(folds)
    }

    fn partition(&self, in_test: &[bool]) -> (RatingDataset, RatingDataset) {
        let mut train = Vec::with_capacity(self.ratings.len());
        let mut test = Vec::new();

        for (rating, &is_test) in self.ratings.iter().zip(in_test) {
            if is_test {
                test.push(rating.clone());
            } else {
                train.push(rating.clone());
            }
        }

        (
            Self::from_parts(train, self.scale),
            Self::from_parts(test, self.scale),
        )
    }
}

fn shuffled_indices(n: usize, seed: u64) -> Vec<usize> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(&mut rng);
    indices
}
