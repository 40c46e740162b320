//! Sagaforge API server entry point.

use std::sync::{Arc, Mutex};

use sagaforge_api::build_router;
use sagaforge_api::config::AppConfig;
use sagaforge_api::error::AppError;
use sagaforge_api::narrator_client::HttpNarrator;
use sagaforge_api::state::AppState;
use sagaforge_core::clock::{Clock, SystemClock};
use sagaforge_core::repository::SessionRepository;
use sagaforge_core::rng::{DeterministicRng, SystemRng};
use sagaforge_narrative::{Narrator, OutlineGenerator, ScriptedNarrator};
use sagaforge_store::{FileSessionRepository, InMemorySessionRepository};
use sagaforge_world::WorldCatalog;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Initialize tracing subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting Sagaforge API server");

    let config = AppConfig::from_env()?;

    let repository: Arc<dyn SessionRepository> = match &config.data_dir {
        Some(dir) => {
            tracing::info!(data_dir = %dir.display(), "using file session store");
            Arc::new(FileSessionRepository::open(dir).await?)
        }
        None => {
            tracing::warn!("SAGAFORGE_DATA_DIR not set; sessions are kept in memory only");
            Arc::new(InMemorySessionRepository::new())
        }
    };

    let mut worlds = WorldCatalog::builtin();
    if let Some(path) = &config.worlds_file {
        let yaml = tokio::fs::read_to_string(path).await?;
        worlds.extend(WorldCatalog::from_yaml_str(&yaml)?)?;
        tracing::info!(path = %path.display(), worlds = worlds.worlds().len(), "loaded world catalog");
    }

    let (narrator, outline_generator): (Arc<dyn Narrator>, Arc<dyn OutlineGenerator>) =
        match &config.narrator {
            Some(narrator_config) => {
                tracing::info!(
                    base_url = %narrator_config.base_url,
                    model = %narrator_config.model,
                    "using remote narrator"
                );
                let client = Arc::new(HttpNarrator::new(narrator_config, config.narrator_timeout)?);
                (client.clone(), client)
            }
            None => {
                tracing::warn!("NARRATOR_API_KEY not set; using the scripted narrator");
                (Arc::new(ScriptedNarrator), Arc::new(ScriptedNarrator))
            }
        };

    let clock: Arc<dyn Clock + Send + Sync> = Arc::new(SystemClock);
    let rng: Arc<Mutex<dyn DeterministicRng + Send>> = Arc::new(Mutex::new(SystemRng::new()));

    let app_state = AppState::new(
        clock,
        rng,
        repository,
        narrator,
        outline_generator,
        worlds,
        config.narrator_timeout,
    );
    let app = build_router(app_state);

    let addr = config.bind_addr()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
