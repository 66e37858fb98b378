pub mod api;
pub mod cli;
pub mod config;
pub mod database;
pub mod dataset;
pub mod errors;
pub mod evaluation;
pub mod model;
pub mod prediction;
pub mod services;
pub mod store;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use log::info;

use crate::cli::{Command, HyperparameterArgs};
use crate::config::settings::AppConfig;
use crate::services::recommendation::{RecommendationRequest, RecommendationService};
use crate::services::server::{ServerService, build_state, load_model};
use crate::services::training::TrainingService;

pub fn interpret() -> Command {
    let cli = Cli::parse();
    cli.command
}

pub fn handle_serve(port: u16, strict: bool) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let mut config = AppConfig::new();
        config.serving.strict_users = strict;
        let service = ServerService::new(port, config);
        service.run().await
    })
}

pub fn handle_init_db() -> Result<()> {
    let config = AppConfig::new();
    let pool = database::create_pool(&config.paths.database_path)?;
    let mut conn = database::get_connection(&pool)?;
    database::setup::initialize_schema(&mut conn)
}

pub fn handle_train(hyperparameters: &HyperparameterArgs, skip_cv: bool) -> Result<()> {
    let mut config = AppConfig::new();
    config.training = hyperparameters.apply(config.training);
    let service = TrainingService::new(config);
    service.run(!skip_cv).map(|_| ())
}

pub fn handle_cross_validate(hyperparameters: &HyperparameterArgs, folds: usize) -> Result<()> {
    let mut config = AppConfig::new();
    config.training = hyperparameters.apply(config.training);
    let service = TrainingService::new(config);
    service.run_cross_validation(folds).map(|_| ())
}

pub fn handle_recommend(user_id: i64, top_n: usize, include_borrowed: bool) -> Result<()> {
    let config = AppConfig::new();
    let model = load_model(&config.paths.model_path)?;
    let pool = database::create_pool(&config.paths.database_path)?;
    let state = build_state(model, pool, config);

    let request = RecommendationRequest {
        user_id,
        top_n,
        exclude_borrowed: !include_borrowed,
    };
    print_recommendations(&state.recommendations, &request)
}

fn print_recommendations(
    service: &RecommendationService,
    request: &RecommendationRequest,
) -> Result<()> {
    let result = service.recommend_for_user(request)?;
    info!(
        "Scored {} books for user {}",
        result.total_predictions, result.user_id
    );

    for (rank, item) in result.recommendations.iter().enumerate() {
        println!(
            "{:>3}. {:<40} {:<24} {:.2}{}",
            rank + 1,
            item.book.title,
            item.book.author.as_deref().unwrap_or("-"),
            item.prediction.estimated_rating,
            if item.prediction.was_clipped { " (clipped)" } else { "" }
        );
    }
    Ok(())
}
