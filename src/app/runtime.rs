//! Runtime initialization and setup

use crate::config::ServiceConfig;
use crate::device::InMemoryDeviceDirectory;
use crate::engine::{Engine, OutcomeSource, RandomOutcomes};
use crate::session::{LoggingObserver, SessionController};
use crate::storage::open_store;
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

/// Build a controller over the configured store with production randomness
pub async fn build_controller(config: &ServiceConfig) -> Result<Arc<SessionController>> {
    build_controller_with(config, Arc::new(RandomOutcomes)).await
}

/// Build a controller with an explicit outcome source
///
/// Sessions left running by a previous process get their drivers back.
pub async fn build_controller_with(
    config: &ServiceConfig,
    outcomes: Arc<dyn OutcomeSource>,
) -> Result<Arc<SessionController>> {
    let store = open_store(&config.storage)
        .await
        .context("Failed to open session store")?;

    let engine = Arc::new(Engine::new(store, outcomes, config.engine.clone()));
    let controller = Arc::new(SessionController::new(
        engine,
        Arc::new(InMemoryDeviceDirectory::new()),
    ));
    controller.add_observer(Arc::new(LoggingObserver)).await;

    let recovered = controller
        .recover_orphans()
        .await
        .context("Failed to recover running sessions")?;
    info!(
        "Controller ready ({} backend, delay scale {}, {} recovered)",
        config.storage.backend, config.engine.delay_scale, recovered
    );

    Ok(controller)
}
