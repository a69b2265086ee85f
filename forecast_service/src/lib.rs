//! # Forecast Service
//!
//! HTTP front end for the SARIMA accident forecast: point predictions from the
//! stored model and on-demand retraining.

use axum::routing::{get, post};
use axum::Router;
use sarima_forecast::{FileModelRegistry, ForecastConfig, ModelRegistry};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;

pub mod routes;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ForecastConfig>,
    pub registry: Arc<dyn ModelRegistry>,
    /// Held for the whole of a retrain so two never overlap
    pub retrain_lock: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(config: ForecastConfig, registry: Arc<dyn ModelRegistry>) -> Self {
        Self {
            config: Arc::new(config),
            registry,
            retrain_lock: Arc::new(Mutex::new(())),
        }
    }

    /// State backed by the file registry at `config.model_path`
    pub fn from_config(config: ForecastConfig) -> Self {
        let registry = Arc::new(FileModelRegistry::new(&config.model_path));
        Self::new(config, registry)
    }
}

/// Router with every endpoint and request tracing
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route("/predict", post(routes::predict))
        .route("/retrain", post(routes::retrain))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
