//! Conclave engine binary.
//!
//! Wires configuration, the user directory, the selected storage backend,
//! and the conference service together, restores the stored schedule,
//! seeds an empty store from configuration, and logs a summary of the
//! resulting schedule.
//!
//! # Startup Sequence
//!
//! 1. Load and validate configuration from `conclave-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Build the user directory from the configured users
//! 4. Connect the storage backend (memory or Dragonfly)
//! 5. Replay stored rooms, events, and registrations
//! 6. Seed rooms and events from config if the store was empty
//! 7. Log the schedule summary

mod dragonfly_gateway;
mod error;
mod seed;
mod tracing_listener;

use std::path::Path;
use std::sync::Arc;

use conclave_core::config::StorageBackend;
use conclave_core::{Conference, ConferenceConfig, MemoryGateway, ScheduleGateway};
use conclave_db::DragonflyPool;
use conclave_directory::UserDirectory;
use conclave_types::RoomFilter;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::dragonfly_gateway::DragonflyGateway;
use crate::error::EngineError;
use crate::tracing_listener::TracingListener;

/// Application entry point for the engine.
///
/// # Errors
///
/// Returns an error if configuration, the directory, or the storage
/// backend cannot be initialized.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration. Logging depends on it, so errors surface
    //    through the return value.
    let config = load_config()?;

    // 2. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .init();

    info!(
        conference = %config.conference.name,
        backend = ?config.storage.backend,
        day_start_hour = config.conference.day_start_hour,
        day_end_hour = config.conference.day_end_hour,
        "conclave-engine starting"
    );

    // 3. Build the user directory.
    let directory = Arc::new(build_directory(&config)?);
    info!(users = directory.len(), "User directory loaded");

    // 4-7. Connect storage and run startup.
    match config.storage.backend {
        StorageBackend::Memory => start(MemoryGateway::new(), &config, directory).await?,
        StorageBackend::Dragonfly => {
            info!(url = %config.storage.dragonfly_url, "Connecting to Dragonfly");
            let pool =
                DragonflyPool::connect(&config.storage.dragonfly_url, &config.storage.key_prefix)
                    .await
                    .map_err(EngineError::from)?;
            start(DragonflyGateway::new(pool), &config, directory).await?;
        }
    }

    info!("conclave-engine startup complete");
    Ok(())
}

/// Load `conclave-config.yaml` from the working directory, or defaults.
fn load_config() -> Result<ConferenceConfig, EngineError> {
    let config = ConferenceConfig::load_or_default(Path::new("conclave-config.yaml"))?;
    config.validate()?;
    Ok(config)
}

fn build_directory(config: &ConferenceConfig) -> Result<UserDirectory, EngineError> {
    let mut directory = UserDirectory::new();
    for user in &config.users {
        directory.insert(user.clone())?;
    }
    Ok(directory)
}

/// Replay, seed if empty, and log the resulting schedule.
async fn start<G: ScheduleGateway>(
    gateway: G,
    config: &ConferenceConfig,
    directory: Arc<UserDirectory>,
) -> Result<(), EngineError> {
    // 5. Replay stored state. The listener is installed afterwards so
    //    replay never announces anything.
    let (conference, report) = Conference::open(gateway, directory).await?;
    let conference = conference.with_listener(Arc::new(TracingListener));

    // 6. Seed a fresh store.
    if report.rooms_restored == 0 && report.events_restored == 0 {
        info!("Store is empty, seeding from config");
        seed::seed(&conference, config).await;
    }

    // 7. Summary.
    for (number, summary) in conference.rooms(RoomFilter::All).await {
        info!(room = %number, %summary, "room");
    }
    for (id, summary) in conference.available_events(None).await {
        info!(event_id = %id, %summary, "event");
    }
    for (id, reason) in conference.stranded_events().await {
        warn!(event_id = %id, %reason, "event no longer fits its room");
    }
    Ok(())
}
