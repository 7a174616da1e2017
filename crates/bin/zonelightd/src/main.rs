//! # zonelightd: zonelight daemon
//!
//! Composition root that wires all adapters together and starts the server.
//!
//! ## Responsibilities
//! - Load configuration (config file, env vars) and initialise logging
//! - Open the `SQLite` pool and run migrations
//! - Simulate every light referenced by a zone
//! - Start one coordinator per configured zone, restoring its saved state
//! - Feed light changes back to the zones and log fired device triggers
//! - Serve the HTTP API until SIGINT/SIGTERM, then stop every zone
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer. No domain logic belongs here.

mod config;

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tracing_subscriber::EnvFilter;

use zonelight_adapter_http_axum::state::AppState;
use zonelight_adapter_storage_sqlite_sqlx::{
    Config as DatabaseConfig, SqliteNamedSnapshotStore, SqliteZoneStateStore,
};
use zonelight_adapter_virtual::VirtualLights;
use zonelight_app::event_bus::InProcessEventBus;
use zonelight_app::ports::ZoneStateStore;
use zonelight_app::services::zone_coordinator::ZonePorts;
use zonelight_app::services::zone_registry::ZoneRegistry;
use zonelight_app::trigger_dispatcher::TriggerDispatcher;
use zonelight_domain::config::ZoneConfig;
use zonelight_domain::error::ZonelightError;
use zonelight_domain::event::{SCENE_EVENT_TYPE, SceneEvent};
use zonelight_domain::light::LightId;
use zonelight_domain::trigger::DeviceTrigger;

use crate::config::Config;

type Registry =
    ZoneRegistry<VirtualLights, SqliteNamedSnapshotStore, InProcessEventBus, SqliteZoneStateStore>;

const EVENT_BUS_CAPACITY: usize = 256;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .init();

    // Database
    let db = DatabaseConfig {
        database_url: config.database_url().to_string(),
    }
    .build()
    .await?;
    let pool = db.pool().clone();
    let snapshots = Arc::new(SqliteNamedSnapshotStore::new(pool.clone()));
    let states = Arc::new(SqliteZoneStateStore::new(pool));

    // Lights and events
    let lights = Arc::new(VirtualLights::new(config.light_ids()));
    let bus = Arc::new(InProcessEventBus::new(EVENT_BUS_CAPACITY));
    let dispatcher = TriggerDispatcher::spawn(bus.subscribe());

    // Zones
    prune_orphaned_states(&states, &config.zones).await?;
    let ports = ZonePorts::new(Arc::clone(&lights), snapshots, Arc::clone(&bus));
    let registry: Arc<Registry> = Arc::new(ZoneRegistry::new(
        ports,
        Arc::clone(&states),
        config.debounce(),
    ));
    registry.reconcile(config.zones.clone()).await?;
    tracing::info!(zones = config.zones.len(), lights = lights.ids().len(), "zones started");

    for coordinator in registry.list().await {
        for trigger in registry.triggers(coordinator.id()).await? {
            let events = dispatcher.attach(trigger.clone());
            tokio::spawn(log_trigger(trigger, events));
        }
    }
    let feeder = tokio::spawn(feed_light_changes(
        lights.subscribe(),
        Arc::clone(&registry),
    ));

    // HTTP
    let app = zonelight_adapter_http_axum::router::build(AppState::new(Arc::clone(&registry)));
    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "zonelightd listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    feeder.abort();
    registry.shutdown().await;
    drop(dispatcher);
    tracing::info!("zonelightd stopped");
    Ok(())
}

/// Delete the saved state of zones that are no longer configured.
async fn prune_orphaned_states(
    states: &SqliteZoneStateStore,
    zones: &[ZoneConfig],
) -> Result<(), ZonelightError> {
    let configured: HashSet<_> = zones.iter().map(ZoneConfig::id).collect();
    for id in states.zone_ids().await? {
        if !configured.contains(&id) {
            tracing::info!(zone_id = %id, "deleting state of unconfigured zone");
            states.delete(id).await?;
        }
    }
    Ok(())
}

async fn feed_light_changes(mut changes: broadcast::Receiver<LightId>, registry: Arc<Registry>) {
    loop {
        match changes.recv().await {
            Ok(light) => registry.light_changed(&light).await,
            Err(broadcast::error::RecvError::Lagged(missed)) => {
                tracing::warn!(missed, "light change feed lagged behind");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

async fn log_trigger(trigger: DeviceTrigger, mut events: mpsc::UnboundedReceiver<SceneEvent>) {
    while let Some(event) = events.recv().await {
        tracing::info!(
            event_type = SCENE_EVENT_TYPE,
            trigger = %trigger.label(),
            zone_id = %event.zone_id,
            event_id = %event.id,
            "device trigger fired"
        );
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
