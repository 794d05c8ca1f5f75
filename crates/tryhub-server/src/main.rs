//! tryhub server entrypoint.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tryhub_api::{AppState, create_router};
use tryhub_builders::BuilderRegistry;
use tryhub_cache::TryWorkCache;
use tryhub_core::corpus::{Corpus, CorpusData};
use tryhub_core::ports::SystemClock;
use tryhub_gerrit::{GerritClient, GerritConfig};

mod config;

use config::ServerConfig;

#[derive(Parser)]
#[command(name = "tryhub")]
#[command(author, version, about = "Try-bot work and eligibility server", long_about = None)]
struct Cli {
    /// YAML configuration file.
    #[arg(short, long, env = "TRYHUB_CONFIG")]
    config: Option<PathBuf>,
    /// Address to listen on.
    #[arg(long, env = "TRYHUB_LISTEN_ADDR")]
    listen_addr: Option<String>,
    /// Gerrit review server URL.
    #[arg(long, env = "TRYHUB_GERRIT_URL")]
    gerrit_url: Option<String>,
    /// Builder catalog YAML, replacing the compiled-in catalog.
    #[arg(long, env = "TRYHUB_BUILDERS_FILE")]
    builders_file: Option<PathBuf>,
    /// Corpus snapshot YAML to start from.
    #[arg(long, env = "TRYHUB_CORPUS_FILE")]
    corpus_file: Option<PathBuf>,
}

impl Cli {
    fn load_config(&self) -> anyhow::Result<ServerConfig> {
        let mut config = match &self.config {
            Some(path) => ServerConfig::from_file(path)
                .with_context(|| format!("loading config from {}", path.display()))?,
            None => ServerConfig::default(),
        };
        if let Some(addr) = &self.listen_addr {
            config.listen_addr = addr.clone();
        }
        if let Some(url) = &self.gerrit_url {
            config.gerrit_url = url.clone();
        }
        if let Some(path) = &self.builders_file {
            config.builders_file = Some(path.clone());
        }
        if let Some(path) = &self.corpus_file {
            config.corpus_file = Some(path.clone());
        }
        Ok(config)
    }
}

fn load_builders(config: &ServerConfig) -> anyhow::Result<BuilderRegistry> {
    let registry = match &config.builders_file {
        Some(path) => BuilderRegistry::from_yaml_file(path)
            .with_context(|| format!("loading builders from {}", path.display()))?,
        None => BuilderRegistry::builtin()?,
    };
    for host in registry.unused_hosts() {
        warn!(host, "Host profile is not used by any builder");
    }
    Ok(registry)
}

fn load_corpus(config: &ServerConfig) -> anyhow::Result<Corpus> {
    let Some(path) = &config.corpus_file else {
        warn!("No corpus snapshot configured; starting empty");
        return Ok(Corpus::default());
    };
    let data = CorpusData::from_yaml_file(path)
        .with_context(|| format!("loading corpus from {}", path.display()))?;
    info!(
        projects = data.projects().count(),
        path = %path.display(),
        "Loaded corpus snapshot"
    );
    Ok(Corpus::new(data))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tryhub=debug")),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.load_config()?;

    let builders = Arc::new(load_builders(&config)?);
    info!(builders = builders.len(), "Loaded builder catalog");

    let corpus = Arc::new(load_corpus(&config)?);
    let gerrit = GerritClient::new(GerritConfig::new(&config.gerrit_url))?;
    let try_work = TryWorkCache::new(
        corpus.clone(),
        Arc::new(gerrit),
        Arc::new(SystemClock),
        config.cache_config(),
    );

    let state = Arc::new(AppState::new(corpus, try_work, builders));
    let app = create_router(state);

    let listener = TcpListener::bind(&config.listen_addr)
        .await
        .with_context(|| format!("binding {}", config.listen_addr))?;
    info!(addr = %listener.local_addr()?, gerrit = %config.gerrit_url, "tryhub listening");

    axum::serve(listener, app).await?;
    Ok(())
}
