//! Change (CL) handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use std::sync::Arc;
use tryhub_core::Error;
use tryhub_core::corpus::TryBotStatus;

use crate::error::{ApiError, api_error};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct TryBotStatusParams {
    /// Report staging changes instead of regular ones.
    #[serde(default)]
    pub staging: bool,
}

pub async fn try_bot_status(
    State(state): State<Arc<AppState>>,
    Path((server, project, number)): Path<(String, String, i32)>,
    Query(params): Query<TryBotStatusParams>,
) -> Result<Json<TryBotStatus>, ApiError> {
    let corpus = state.corpus.read().await;
    let gp = corpus
        .project(&server, &project)
        .ok_or_else(|| api_error(Error::UnknownProject { server, project }))?;
    let cl = gp
        .cl(number)
        .ok_or_else(|| api_error(Error::UnknownChange(number)))?;

    Ok(Json(cl.try_bot_status(params.staging)))
}
