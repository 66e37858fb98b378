use anyhow::{Context, Result};
use log::info;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use crate::api::handlers::AppState;
use crate::api::routes::create_router;
use crate::config::settings::AppConfig;
use crate::database;
use crate::errors::RecommenderError;
use crate::model::FactorModel;
use crate::prediction::PredictionService;
use crate::services::recommendation::RecommendationService;
use crate::store::ModelStore;

pub struct ServerService {
    port: u16,
    config: AppConfig,
}

impl ServerService {
    pub fn new(port: u16, config: AppConfig) -> Self {
        Self { port, config }
    }

    pub async fn run(&self) -> Result<()> {
        // No model, no server: requests are never answered unscored.
        let model = load_model(&self.config.paths.model_path)?;
        let pool = database::create_pool(&self.config.paths.database_path)?;

        let state = Arc::new(build_state(model, pool, self.config.clone()));
        let app = create_router(state).layer(ServiceBuilder::new().layer(CorsLayer::permissive()));

        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        info!("Server listening on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}

pub fn load_model(model_path: &str) -> Result<FactorModel> {
    ModelStore::new(model_path)
        .load()
        .map_err(|e| RecommenderError::ModelUnavailable(format!("{e:#}")))
        .context("Refusing to serve without a trained model; run `train` first")
}

pub fn build_state(model: FactorModel, pool: database::DbPool, config: AppConfig) -> AppState {
    let predictor = PredictionService::new(Arc::new(model)).with_strict(config.serving.strict_users);
    AppState {
        recommendations: RecommendationService::new(pool, predictor, config.serving.clone()),
        config,
    }
}
