//! Health check handlers.

use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;
use std::sync::Arc;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub builders: usize,
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        builders: state.builders.len(),
    })
}

/// Ready once the corpus knows the root repository.
pub async fn ready(State(state): State<Arc<AppState>>) -> StatusCode {
    let config = state.try_work.config();
    let corpus = state.corpus.read().await;
    if corpus.project(&config.server, &config.go_project).is_some() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}
