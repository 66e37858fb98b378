use std::collections::HashMap;

use log::debug;
use thiserror::Error;

use crate::config::settings::ServingSettings;
use crate::database::{self, Book, DbPool};
use crate::dataset::UserId;
use crate::errors::RecommenderError;
use crate::prediction::{Prediction, PredictionService};

#[derive(Debug, Clone, PartialEq)]
pub struct RecommendationRequest {
    pub user_id: UserId,
    pub top_n: usize,
    pub exclude_borrowed: bool,
}

#[derive(Debug, Clone)]
pub struct RecommendedBook {
    pub book: Book,
    pub prediction: Prediction,
}

#[derive(Debug, Clone)]
pub struct RecommendationResult {
    pub user_id: UserId,
    /// Number of catalog books that were scored before truncation.
    pub total_predictions: usize,
    pub recommendations: Vec<RecommendedBook>,
}

#[derive(Debug, Error)]
pub enum RecommendationError {
    #[error(transparent)]
    Core(#[from] RecommenderError),

    #[error("User {0} not found")]
    UserNotFound(UserId),

    #[error("Database error: {0:#}")]
    Store(anyhow::Error),
}

impl From<anyhow::Error> for RecommendationError {
    fn from(error: anyhow::Error) -> Self {
        RecommendationError::Store(error)
    }
}

/// Joins the rating store with the prediction service to answer one user's request.
#[derive(Clone)]
pub struct RecommendationService {
    pool: DbPool,
    predictor: PredictionService,
    settings: ServingSettings,
}

impl RecommendationService {
    pub fn new(pool: DbPool, predictor: PredictionService, settings: ServingSettings) -> Self {
        Self {
            pool,
            predictor,
            settings,
        }
    }

    pub fn recommend_for_user(
        &self,
        request: &RecommendationRequest,
    ) -> Result<RecommendationResult, RecommendationError> {
        self.validate(request)?;

        let mut conn = database::get_connection(&self.pool)?;
        if !database::users::user_exists(&mut conn, request.user_id)? {
            return Err(RecommendationError::UserNotFound(request.user_id));
        }

        let books = database::books::list_all(&mut conn)?;
        let excluded = if request.exclude_borrowed {
            database::borrows::interacted_book_ids(&mut conn, request.user_id)?
        } else {
            Default::default()
        };
        drop(conn);

        let candidates: Vec<i64> = books.iter().map(|b| b.book_id).collect();
        let total_predictions = candidates.iter().filter(|id| !excluded.contains(*id)).count();
        debug!(
            "User {}: {} candidates, {} excluded",
            request.user_id,
            candidates.len(),
            excluded.len()
        );

        let ranked =
            self.predictor
                .recommend(request.user_id, &candidates, &excluded, request.top_n)?;

        let mut catalog: HashMap<i64, Book> = books.into_iter().map(|b| (b.book_id, b)).collect();
        let recommendations = ranked
            .into_iter()
            .filter_map(|prediction| {
                catalog
                    .remove(&prediction.item_id)
                    .map(|book| RecommendedBook { book, prediction })
            })
            .collect();

        Ok(RecommendationResult {
            user_id: request.user_id,
            total_predictions,
            recommendations,
        })
    }

    fn validate(&self, request: &RecommendationRequest) -> Result<(), RecommenderError> {
        if request.top_n < 1 || request.top_n > self.settings.max_top_n {
            return Err(RecommenderError::InvalidArgument(format!(
                "top_n must be between 1 and {}",
                self.settings.max_top_n
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use super::*;
    use crate::config::settings::Hyperparameters;
    use crate::database::{books, borrows, reviews, setup, users};
    use crate::dataset::{RatingDataset, RatingScale, RatingTriple};
    use crate::model::fit;

    /// In-memory store with three users and four books, plus a model fitted on its reviews.
    pub(crate) fn seeded_service(strict: bool) -> RecommendationService {
        let pool = database::create_memory_pool().unwrap();
        let mut conn = database::get_connection(&pool).unwrap();
        setup::initialize_schema(&mut conn).unwrap();

        for user in 1..=3 {
            users::insert_user(&mut conn, user, &format!("reader{user}")).unwrap();
        }
        for (id, title) in [(10, "Emma"), (11, "Dune"), (12, "Ulysses"), (13, "Beloved")] {
            books::insert_book(&mut conn, id, title, Some("Author"), Some("fiction")).unwrap();
        }

        let observed = [(1, 10, 5.0), (1, 11, 3.0), (2, 10, 4.0), (2, 12, 2.0)];
        let mut triples = Vec::new();
        for (user, book, rating) in observed {
            reviews::insert_review(&mut conn, user, book, rating).unwrap();
            triples.push(RatingTriple::new(user, book, rating));
        }
        let copy = borrows::insert_inventory(&mut conn, 13).unwrap();
        borrows::insert_borrow(&mut conn, 1, copy).unwrap();
        drop(conn);

        let dataset = RatingDataset::new(triples, RatingScale::default()).unwrap();
        let params = Hyperparameters {
            factors: 2,
            epochs: 50,
            random_seed: 7,
            ..Hyperparameters::default()
        };
        let predictor =
            PredictionService::new(Arc::new(fit(&dataset, &params).unwrap())).with_strict(strict);

        RecommendationService::new(pool, predictor, ServingSettings::default())
    }

    fn request(user_id: UserId, top_n: usize, exclude_borrowed: bool) -> RecommendationRequest {
        RecommendationRequest {
            user_id,
            top_n,
            exclude_borrowed,
        }
    }

    #[test]
    fn test_excludes_reviewed_and_borrowed_books() {
        let service = seeded_service(false);
        let result = service.recommend_for_user(&request(1, 10, true)).unwrap();

        let ids: HashSet<i64> = result.recommendations.iter().map(|r| r.book.book_id).collect();
        assert_eq!(ids, HashSet::from([12]));
        assert_eq!(result.total_predictions, 1);
    }

    #[test]
    fn test_includes_everything_when_not_excluding() {
        let service = seeded_service(false);
        let result = service.recommend_for_user(&request(1, 2, false)).unwrap();

        assert_eq!(result.total_predictions, 4);
        assert_eq!(result.recommendations.len(), 2);
        assert!(!result.recommendations[0].book.title.is_empty());
    }

    #[test]
    fn test_unknown_user_is_not_found() {
        let service = seeded_service(false);
        let result = service.recommend_for_user(&request(42, 5, true));
        assert!(matches!(result, Err(RecommendationError::UserNotFound(42))));
    }

    #[test]
    fn test_user_without_ratings_gets_cold_start_recommendations() {
        let service = seeded_service(false);
        let result = service.recommend_for_user(&request(3, 10, true)).unwrap();
        assert_eq!(result.recommendations.len(), 4);
    }

    #[test]
    fn test_strict_mode_rejects_user_without_ratings() {
        let service = seeded_service(true);
        let result = service.recommend_for_user(&request(3, 10, true));
        assert!(matches!(
            result,
            Err(RecommendationError::Core(RecommenderError::UnknownUser(3)))
        ));
    }

    #[test]
    fn test_top_n_out_of_range_is_rejected() {
        let service = seeded_service(false);
        for top_n in [0, 101] {
            let result = service.recommend_for_user(&request(1, top_n, true));
            assert!(matches!(
                result,
                Err(RecommendationError::Core(RecommenderError::InvalidArgument(_)))
            ));
        }
    }
}
