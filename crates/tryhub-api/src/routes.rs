//! API route definitions.

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::handlers::{builders, changes, commits, health, refs, work};
use crate::middleware::{cors_layer, request_id};
use crate::state::AppState;

/// Create the main API router.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .nest("/api/v1", api_routes())
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .layer(axum_middleware::from_fn(request_id))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
        .with_state(state)
}

fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/has-ancestor", post(commits::has_ancestor))
        .route("/refs/{server}/{project}", get(refs::get_ref))
        .route(
            "/changes/{server}/{project}/{number}/trybot-status",
            get(changes::try_bot_status),
        )
        .route("/try-work", get(work::go_find_try_work))
        .route("/releases", get(work::list_go_releases))
        .route("/trybots", get(builders::try_builders))
        .nest("/builders", builder_routes())
}

fn builder_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(builders::list_builders))
        .route("/{name}", get(builders::get_builder))
        .route("/{name}/eligibility", get(builders::eligibility))
        .route("/{name}/dist-tests/{test}", get(builders::dist_test))
}
