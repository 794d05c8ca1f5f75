//! Builder eligibility handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tryhub_builders::Builder;
use tryhub_core::Error;

use crate::error::{ApiError, api_error};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ProjectParams {
    pub repo: String,
    #[serde(default = "default_branch")]
    pub branch: String,
    /// Go branch a subrepo is tested against; master when empty.
    #[serde(default)]
    pub go_branch: String,
}

fn default_branch() -> String {
    "master".to_string()
}

impl ProjectParams {
    fn validate(&self) -> Result<(), ApiError> {
        if self.repo.is_empty() {
            return Err(api_error(Error::InvalidQuery("repo is required".to_string())));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct BuilderSummary {
    pub name: String,
    pub host_type: String,
    pub goos: String,
    pub goarch: String,
    pub try_bot: bool,
    pub race: bool,
    pub long_test: bool,
    /// Host environment followed by the builder's overrides.
    pub env: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl From<Builder<'_>> for BuilderSummary {
    fn from(b: Builder<'_>) -> Self {
        Self {
            name: b.name().to_string(),
            host_type: b.profile.host_type.clone(),
            goos: b.goos().to_string(),
            goarch: b.goarch().to_string(),
            try_bot: b.profile.try_bot,
            race: b.profile.is_race(),
            long_test: b.profile.is_long_test(),
            env: b.env().into_iter().map(str::to_string).collect(),
            notes: b.profile.notes.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListBuildersResponse {
    pub builders: Vec<BuilderSummary>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct TryBotsResponse {
    pub builders: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct EligibilityResponse {
    pub builder: String,
    pub repo: String,
    pub branch: String,
    pub go_branch: String,
    pub post_submit: bool,
    pub try_bot: bool,
    pub dist_tests_timeout_secs: u64,
}

#[derive(Debug, Deserialize)]
pub struct DistTestParams {
    #[serde(default)]
    pub try_bot: bool,
}

#[derive(Debug, Serialize)]
pub struct DistTestResponse {
    pub builder: String,
    pub test: String,
    pub try_bot: bool,
    pub run: bool,
}

pub async fn list_builders(State(state): State<Arc<AppState>>) -> Json<ListBuildersResponse> {
    let builders: Vec<BuilderSummary> = state
        .builders
        .builders()
        .map(BuilderSummary::from)
        .collect();
    Json(ListBuildersResponse {
        total: builders.len(),
        builders,
    })
}

pub async fn get_builder(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<BuilderSummary>, ApiError> {
    let builder = state.builders.get(&name).map_err(api_error)?;
    Ok(Json(BuilderSummary::from(builder)))
}

pub async fn try_builders(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ProjectParams>,
) -> Result<Json<TryBotsResponse>, ApiError> {
    params.validate()?;
    let builders = state
        .builders
        .try_builders_for_project(&params.repo, &params.branch, &params.go_branch)
        .into_iter()
        .map(|b| b.name().to_string())
        .collect();
    Ok(Json(TryBotsResponse { builders }))
}

pub async fn eligibility(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Query(params): Query<ProjectParams>,
) -> Result<Json<EligibilityResponse>, ApiError> {
    params.validate()?;
    let builder = state.builders.get(&name).map_err(api_error)?;
    let (repo, branch, go_branch) = (&params.repo, &params.branch, &params.go_branch);

    Ok(Json(EligibilityResponse {
        builder: name.clone(),
        post_submit: builder.builds_repo_post_submit(repo, branch, go_branch),
        try_bot: builder.builds_repo_try_bot(repo, branch, go_branch),
        dist_tests_timeout_secs: builder.dist_tests_exec_timeout().as_secs(),
        repo: params.repo,
        branch: params.branch,
        go_branch: params.go_branch,
    }))
}

pub async fn dist_test(
    State(state): State<Arc<AppState>>,
    Path((name, test)): Path<(String, String)>,
    Query(params): Query<DistTestParams>,
) -> Result<Json<DistTestResponse>, ApiError> {
    let builder = state.builders.get(&name).map_err(api_error)?;
    let run = builder.should_run_dist_test(&test, params.try_bot);
    Ok(Json(DistTestResponse {
        builder: name,
        test,
        try_bot: params.try_bot,
        run,
    }))
}
