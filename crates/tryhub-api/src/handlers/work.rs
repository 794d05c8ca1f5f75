//! Pending try work and supported releases.

use axum::{Json, extract::State};
use serde::Serialize;
use std::sync::Arc;
use tryhub_core::{GoRelease, TryWorkItem};

use crate::error::{ApiError, api_error};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct FindTryWorkResponse {
    pub waiting: Vec<TryWorkItem>,
}

#[derive(Debug, Serialize)]
pub struct ListGoReleasesResponse {
    pub releases: Vec<GoRelease>,
}

pub async fn go_find_try_work(
    State(state): State<Arc<AppState>>,
) -> Result<Json<FindTryWorkResponse>, ApiError> {
    let waiting = state.try_work.get_try_work().await.map_err(api_error)?;
    Ok(Json(FindTryWorkResponse { waiting }))
}

pub async fn list_go_releases(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ListGoReleasesResponse>, ApiError> {
    let releases = state.try_work.list_go_releases().await.map_err(api_error)?;
    Ok(Json(ListGoReleasesResponse { releases }))
}
