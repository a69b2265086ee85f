//! API route handlers

use crate::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use sarima_forecast::{pipeline, ForecastError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    pub year: i32,
    pub month: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PredictResponse {
    pub prediction: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RetrainResponse {
    pub message: String,
    pub order: String,
    pub aic: f64,
    pub evaluated: usize,
    pub failed: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Failure of a request, rendered as `{"error": ...}`
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Forecast(#[from] ForecastError),

    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Forecast(ForecastError::InvalidDate(_)) => StatusCode::BAD_REQUEST,
            ApiError::Forecast(ForecastError::ModelUnavailable(_)) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::warn!(error = %self, "request rejected");
        }

        let body = ErrorResponse {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Liveness probe
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "alive",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Predicted count for one month, truncated to an integer
pub async fn predict(
    State(state): State<AppState>,
    Json(req): Json<PredictRequest>,
) -> Result<Json<PredictResponse>, ApiError> {
    let PredictRequest { year, month } = req;
    let registry = state.registry.clone();
    let prediction =
        tokio::task::spawn_blocking(move || pipeline::predict_count(registry.as_ref(), year, month))
            .await??;

    tracing::debug!(year, month, prediction, "prediction served");
    Ok(Json(PredictResponse { prediction }))
}

/// Rerun the order search on the configured dataset and replace the stored model
pub async fn retrain(State(state): State<AppState>) -> Result<Json<RetrainResponse>, ApiError> {
    // The guard moves into the worker so a dropped request cannot release it early
    let guard = state.retrain_lock.clone().lock_owned().await;

    let config = state.config.clone();
    let registry = state.registry.clone();
    let report = tokio::task::spawn_blocking(move || {
        let _guard = guard;
        pipeline::retrain(config.as_ref(), registry.as_ref())
    })
    .await??;

    Ok(Json(RetrainResponse {
        message: "Model retrained successfully".to_string(),
        order: report.order.to_string(),
        aic: report.aic,
        evaluated: report.evaluated,
        failed: report.failed,
    }))
}
