pub mod split;
pub mod types;

pub use split::{DatasetSummary, Fold, RatingDataset};
pub use types::{ItemId, RatingScale, RatingTriple, RatingValue, UserId};
