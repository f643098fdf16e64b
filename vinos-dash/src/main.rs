//! vinos-dash - wine-quality prediction dashboard
//!
//! Serves the upload page and the prediction API. Starts without a
//! database: the sample-data path is then disabled with a warning and
//! uploads keep working.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};
use vinos_common::config::{resolve_database_url, Settings};
use vinos_common::{ModelId, ModelRegistry};
use vinos_dash::{build_router, AppState, DatabaseSource};

#[derive(Debug, Parser)]
#[command(name = "vinos-dash", version, about = "Wine-quality prediction dashboard")]
struct Args {
    /// Settings file (TOML)
    #[arg(long, env = "VINOS_CONFIG")]
    config: Option<PathBuf>,

    /// Listen address, overrides the settings file
    #[arg(long)]
    bind: Option<String>,

    /// Model artifact directory, overrides the settings file
    #[arg(long)]
    models_dir: Option<PathBuf>,

    /// Secret store holding database_url, overrides the settings file
    #[arg(long)]
    secrets: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Starting vinos-dash v{}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();
    let mut settings = Settings::load(args.config.as_deref())?;
    if let Some(bind) = args.bind {
        settings.bind_addr = bind;
    }
    if let Some(dir) = args.models_dir {
        settings.models_dir = dir;
    }
    if let Some(secrets) = args.secrets {
        settings.secrets_file = secrets;
    }

    let registry = ModelRegistry::from_dir(&settings.models_dir);
    let available = registry.available();
    info!(
        "Models directory: {} ({} of {} artifacts present)",
        settings.models_dir.display(),
        available.len(),
        ModelId::ALL.len()
    );
    for id in ModelId::ALL.into_iter().filter(|id| !available.contains(id)) {
        warn!("Artifact for {} not found, predictions with it will fail", id);
    }

    let database = match resolve_database_url(&settings.secrets_file) {
        Ok(url) => {
            info!("✓ Sample data source configured");
            DatabaseSource::Configured(url)
        }
        Err(e) => {
            warn!("{} - sample data disabled", e);
            DatabaseSource::Unavailable(e.to_string())
        }
    };

    let state = AppState::new(registry, database, &settings);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&settings.bind_addr).await?;
    info!("vinos-dash listening on http://{}", settings.bind_addr);
    info!("Health check: http://{}/health", settings.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
