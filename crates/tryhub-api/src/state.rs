//! Application state shared across handlers.

use std::sync::Arc;
use tryhub_builders::BuilderRegistry;
use tryhub_cache::TryWorkCache;
use tryhub_core::corpus::Corpus;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub corpus: Arc<Corpus>,
    pub try_work: TryWorkCache,
    pub builders: Arc<BuilderRegistry>,
}

impl AppState {
    pub fn new(
        corpus: Arc<Corpus>,
        try_work: TryWorkCache,
        builders: Arc<BuilderRegistry>,
    ) -> Self {
        Self {
            corpus,
            try_work,
            builders,
        }
    }
}
