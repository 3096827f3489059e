// src/api.rs
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::cors::CorsLayer;

use crate::datasets::{DatasetRecord, DatasetStore};
use crate::feed::transport::FeedTransport;
use crate::freshness::FreshnessEvaluator;
use crate::monitor::{check_datasets, DatasetStatus};

#[derive(Clone)]
pub struct AppState {
    pub datasets: Arc<dyn DatasetStore>,
    pub transport: Arc<dyn FeedTransport>,
    pub evaluator: FreshnessEvaluator,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/datasets", get(list_datasets))
        .route("/datasets/refresh", post(refresh_datasets))
        .route("/datasets/status", get(datasets_status))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

async fn list_datasets(State(state): State<AppState>) -> Json<Vec<DatasetRecord>> {
    Json(state.datasets.all())
}

async fn refresh_datasets(
    State(state): State<AppState>,
) -> (StatusCode, Json<serde_json::Value>) {
    match state.datasets.update().await {
        Ok(status) => (
            StatusCode::OK,
            Json(json!({ "status": status, "count": state.datasets.all().len() })),
        ),
        Err(e) => {
            tracing::warn!(target: "datasets", error = ?e, "datasets refresh failed");
            (
                StatusCode::BAD_GATEWAY,
                Json(json!({ "status": "ERROR", "error": format!("{e:#}") })),
            )
        }
    }
}

async fn datasets_status(State(state): State<AppState>) -> Json<Vec<DatasetStatus>> {
    let now = chrono::Utc::now().timestamp();
    let rows = check_datasets(
        state.datasets.as_ref(),
        state.transport.as_ref(),
        &state.evaluator,
        now,
    )
    .await;
    Json(rows)
}
