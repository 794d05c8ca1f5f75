//! Git ref lookups.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tryhub_core::Error;

use crate::error::{ApiError, api_error};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct GetRefParams {
    #[serde(rename = "ref")]
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct GetRefResponse {
    /// The ref's hash, empty when the ref does not exist.
    pub value: String,
}

pub async fn get_ref(
    State(state): State<Arc<AppState>>,
    Path((server, project)): Path<(String, String)>,
    Query(params): Query<GetRefParams>,
) -> Result<Json<GetRefResponse>, ApiError> {
    let corpus = state.corpus.read().await;
    let gp = corpus
        .project(&server, &project)
        .ok_or_else(|| api_error(Error::UnknownProject { server, project }))?;

    let value = gp
        .ref_hash(&params.name)
        .map(ToString::to_string)
        .unwrap_or_default();
    Ok(Json(GetRefResponse { value }))
}
