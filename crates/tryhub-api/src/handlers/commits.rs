//! Commit ancestry handlers.

use axum::{Json, extract::State};
use serde::Deserialize;
use std::sync::Arc;
use tryhub_core::AncestorCheck;
use tryhub_core::corpus::GitHash;

use crate::error::{ApiError, api_error};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct HasAncestorRequest {
    pub commit: String,
    pub ancestor: String,
}

pub async fn has_ancestor(
    State(state): State<Arc<AppState>>,
    Json(req): Json<HasAncestorRequest>,
) -> Result<Json<AncestorCheck>, ApiError> {
    let commit = GitHash::parse("commit", &req.commit).map_err(api_error)?;
    let ancestor = GitHash::parse("ancestor", &req.ancestor).map_err(api_error)?;

    let corpus = state.corpus.read().await;
    Ok(Json(corpus.check_ancestor(&commit, &ancestor)))
}
