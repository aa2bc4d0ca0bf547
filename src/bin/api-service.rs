use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use meshlens::{config_path, load_config};
use meshlens_adapter_static::{Fixture, StaticBackend};
use meshlens_application::ServicesApi;
use meshlens_domain::MeshlensConfig;
use meshlens_ports::SystemClock;

#[derive(Debug, Parser)]
#[command(name = "api-service", about = "Read API for mesh services")]
struct Cli {
    /// Path to the YAML config file.
    #[arg(long, env = "MESHLENS_CONFIG_PATH")]
    config: Option<PathBuf>,

    /// Overrides `server.bind_addr`.
    #[arg(long)]
    bind: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let path = config_path(cli.config);
    let mut config = load_config(&path)?;
    if let Some(bind) = cli.bind {
        config.server.bind_addr = bind;
    }

    init_tracing(&config);
    info!(config = %path.display(), "configuration loaded");

    let mut runtime = tokio::runtime::Builder::new_multi_thread();
    runtime.enable_all();
    if let Some(threads) = config.server.worker_threads {
        runtime.worker_threads(threads);
    }
    let runtime = runtime.build().context("failed to build tokio runtime")?;
    runtime.block_on(run(config))
}

fn init_tracing(config: &MeshlensConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log.level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn run(config: MeshlensConfig) -> anyhow::Result<()> {
    let backend = match &config.fixtures.path {
        Some(path) => StaticBackend::load(path)?,
        None => {
            warn!("no fixtures configured, serving an empty mesh");
            StaticBackend::new(Fixture::default())
        }
    };
    let api = ServicesApi::new(Arc::new(backend.port_set()), Arc::new(SystemClock), &config);

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.server.bind_addr))?;
    meshlens_adapter_http::serve(listener, api).await?;
    Ok(())
}
