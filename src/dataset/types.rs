use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::errors::{RecommenderError, Result};

pub type UserId = i64;
pub type ItemId = i64;
pub type RatingValue = f64;

/// One observed rating of an item by a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingTriple {
    pub user_id: UserId,
    pub item_id: ItemId,
    pub rating: RatingValue,
    pub timestamp: Option<NaiveDateTime>,
}

impl RatingTriple {
    pub fn new(user_id: UserId, item_id: ItemId, rating: RatingValue) -> Self {
        Self {
            user_id,
            item_id,
            rating,
            timestamp: None,
        }
    }
}

/// Closed interval every rating (and every presented prediction) lies in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingScale {
    pub min: RatingValue,
    pub max: RatingValue,
}

impl RatingScale {
    pub fn new(min: RatingValue, max: RatingValue) -> Result<Self> {
        if !min.is_finite() || !max.is_finite() || min >= max {
            return Err(RecommenderError::InvalidArgument(format!(
                "rating scale bounds must be finite with min < max, got [{min}, {max}]"
            )));
        }
        Ok(Self { min, max })
    }

    pub fn contains(&self, value: RatingValue) -> bool {
        value >= self.min && value <= self.max
    }

    /// Returns the value constrained to the scale and whether it was changed.
    pub fn clip(&self, value: RatingValue) -> (RatingValue, bool) {
        let clipped = value.clamp(self.min, self.max);
        (clipped, clipped != value)
    }
}

impl Default for RatingScale {
    fn default() -> Self {
        Self { min: 1.0, max: 5.0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_rejects_inverted_bounds() {
        assert!(RatingScale::new(5.0, 1.0).is_err());
        assert!(RatingScale::new(1.0, 1.0).is_err());
        assert!(RatingScale::new(f64::NAN, 5.0).is_err());
    }

    #[test]
    fn test_clip_reports_changes() {
        let scale = RatingScale::default();
        assert_eq!(scale.clip(3.2), (3.2, false));
        assert_eq!(scale.clip(5.7), (5.0, true));
        assert_eq!(scale.clip(-1.0), (1.0, true));
        assert_eq!(scale.clip(1.0), (1.0, false));
    }
}
