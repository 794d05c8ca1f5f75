//! Release resolution and the aggregated try-work cache for tryhub.

pub mod config;
pub mod releases;
pub mod try_work;

pub use config::CacheConfig;
pub use releases::supported_go_releases;
pub use try_work::TryWorkCache;
