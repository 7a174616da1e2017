//! Zone registry: creates, tracks and tears down zone coordinators.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::{RwLock, oneshot, watch};
use tokio::task::JoinHandle;

use zonelight_domain::config::{ZoneConfig, ensure_unique_names};
use zonelight_domain::error::{NotFoundError, ValidationError, ZonelightError};
use zonelight_domain::id::ZoneId;
use zonelight_domain::trigger::DeviceTrigger;
use zonelight_domain::zone::{ListKind, Zone, ZoneState};

use crate::debounce::DebounceConfig;
use crate::ports::{EventPublisher, LightControl, NamedSnapshotStore, ZoneStateStore};
use crate::services::zone_coordinator::{ZoneCoordinator, ZonePorts};

struct Entry {
    config: ZoneConfig,
    coordinator: Arc<ZoneCoordinator>,
    persister: Persister,
}

/// Saves every change of a zone to the [`ZoneStateStore`].
struct Persister {
    stop: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl Persister {
    fn spawn<S>(id: ZoneId, mut changes: watch::Receiver<Zone>, store: Arc<S>) -> Self
    where
        S: ZoneStateStore + Send + Sync + 'static,
    {
        let (stop, mut stopped) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            loop {
                let stopping = tokio::select! {
                    biased;
                    changed = changes.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        false
                    }
                    _ = &mut stopped => true,
                };
                if stopping && !changes.has_changed().unwrap_or(false) {
                    break;
                }
                let state = changes.borrow_and_update().state();
                if let Err(err) = store.save(id, state).await {
                    tracing::warn!(zone_id = %id, error = %err, "failed to save zone state");
                }
                if stopping {
                    break;
                }
            }
        });
        Self { stop, task }
    }

    /// Save the last pending change, then stop.
    async fn finish(self) {
        let _ = self.stop.send(());
        if let Err(err) = self.task.await {
            tracing::warn!(error = %err, "zone persister failed");
        }
    }
}

/// Maps zone ids to running coordinators.
pub struct ZoneRegistry<L, N, P, S> {
    ports: ZonePorts<L, N, P>,
    store: Arc<S>,
    debounce: DebounceConfig,
    zones: RwLock<BTreeMap<ZoneId, Entry>>,
}

impl<L, N, P, S> ZoneRegistry<L, N, P, S>
where
    L: LightControl + Send + Sync + 'static,
    N: NamedSnapshotStore + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
    S: ZoneStateStore + Send + Sync + 'static,
{
    pub fn new(ports: ZonePorts<L, N, P>, store: Arc<S>, debounce: DebounceConfig) -> Self {
        Self {
            ports,
            store,
            debounce,
            zones: RwLock::new(BTreeMap::new()),
        }
    }

    /// Validate `config`, start its zone and seed it from the last saved state.
    ///
    /// # Errors
    ///
    /// Returns [`ZonelightError::Validation`] if the config is invalid or a
    /// zone with the same name exists, or a storage error from the
    /// [`ZoneStateStore`].
    pub async fn create(&self, config: ZoneConfig) -> Result<Arc<ZoneCoordinator>, ZonelightError> {
        let config = config.normalized()?;
        let id = config.id();
        if self.zones.read().await.contains_key(&id) {
            return Err(duplicate(&config));
        }
        let stored = self.store.load(id).await?;

        let coordinator = Arc::new(ZoneCoordinator::spawn(
            Zone::new(&config),
            self.ports.clone(),
            self.debounce,
        ));
        if let Some(state) = stored {
            seed(&coordinator, state);
        }
        let persister = Persister::spawn(id, coordinator.subscribe(), Arc::clone(&self.store));

        let mut zones = self.zones.write().await;
        if zones.contains_key(&id) {
            drop(zones);
            persister.finish().await;
            coordinator.shutdown().await;
            return Err(duplicate(&config));
        }
        tracing::info!(zone = %config.name, zone_id = %id, lights = config.lights.len(), "zone created");
        zones.insert(
            id,
            Entry {
                config,
                coordinator: Arc::clone(&coordinator),
                persister,
            },
        );
        Ok(coordinator)
    }

    /// Shut a zone down and forget it. Its saved state is kept.
    ///
    /// # Errors
    ///
    /// Returns [`ZonelightError::NotFound`] if no zone has this id.
    pub async fn destroy(&self, id: ZoneId) -> Result<(), ZonelightError> {
        let entry = self
            .zones
            .write()
            .await
            .remove(&id)
            .ok_or_else(|| not_found(id))?;
        entry.coordinator.shutdown().await;
        entry.persister.finish().await;
        tracing::info!(zone = %entry.config.name, zone_id = %id, "zone destroyed");
        Ok(())
    }

    /// Bring the running zones in line with `configs`.
    ///
    /// Zones no longer configured are destroyed and their saved state is
    /// deleted. Zones whose configuration changed are recreated. New zones
    /// are created.
    ///
    /// # Errors
    ///
    /// Returns [`ZonelightError::Validation`] when a config is invalid or two
    /// zones share a name. Nothing is changed in that case. Storage errors
    /// are propagated as they happen.
    pub async fn reconcile(&self, configs: Vec<ZoneConfig>) -> Result<(), ZonelightError> {
        let configs = configs
            .into_iter()
            .map(ZoneConfig::normalized)
            .collect::<Result<Vec<_>, _>>()?;
        ensure_unique_names(&configs)?;
        let mut wanted: BTreeMap<ZoneId, ZoneConfig> =
            configs.into_iter().map(|config| (config.id(), config)).collect();

        let running: Vec<(ZoneId, ZoneConfig)> = self
            .zones
            .read()
            .await
            .iter()
            .map(|(id, entry)| (*id, entry.config.clone()))
            .collect();

        for (id, current) in running {
            let Some(config) = wanted.get(&id) else {
                self.destroy(id).await?;
                self.store.delete(id).await?;
                tracing::info!(zone = %current.name, "zone removed from configuration");
                continue;
            };
            if *config == current {
                wanted.remove(&id);
            } else {
                self.destroy(id).await?;
            }
        }

        for config in wanted.into_values() {
            self.create(config).await?;
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`ZonelightError::NotFound`] if no zone has this id.
    pub async fn get(&self, id: ZoneId) -> Result<Arc<ZoneCoordinator>, ZonelightError> {
        self.zones
            .read()
            .await
            .get(&id)
            .map(|entry| Arc::clone(&entry.coordinator))
            .ok_or_else(|| not_found(id))
    }

    /// All running zones, ordered by id.
    pub async fn list(&self) -> Vec<Arc<ZoneCoordinator>> {
        self.zones
            .read()
            .await
            .values()
            .map(|entry| Arc::clone(&entry.coordinator))
            .collect()
    }

    /// # Errors
    ///
    /// Returns [`ZonelightError::NotFound`] if no zone has this id.
    pub async fn config(&self, id: ZoneId) -> Result<ZoneConfig, ZonelightError> {
        self.zones
            .read()
            .await
            .get(&id)
            .map(|entry| entry.config.clone())
            .ok_or_else(|| not_found(id))
    }

    /// Device triggers offered by a zone.
    ///
    /// # Errors
    ///
    /// Returns [`ZonelightError::NotFound`] if no zone has this id.
    pub async fn triggers(&self, id: ZoneId) -> Result<Vec<DeviceTrigger>, ZonelightError> {
        let config = self.config(id).await?;
        Ok(DeviceTrigger::for_zone(&config))
    }

    /// Tell every zone containing `light` that it changed.
    pub async fn light_changed(&self, light: &str) {
        for entry in self.zones.read().await.values() {
            if entry.config.lights.iter().any(|id| id == light) {
                entry.coordinator.lights_changed();
            }
        }
    }

    /// Destroy every zone, keeping their saved state.
    pub async fn shutdown(&self) {
        let entries = std::mem::take(&mut *self.zones.write().await);
        for (_, entry) in entries {
            entry.coordinator.shutdown().await;
            entry.persister.finish().await;
        }
        tracing::info!("all zones stopped");
    }
}

/// Apply a saved state: selections, previous values, snapshots, then power.
fn seed(coordinator: &ZoneCoordinator, state: ZoneState) {
    let lists = [
        (ListKind::Scene, &state.scene),
        (ListKind::Controller, &state.controller),
    ];
    for (list, selection) in lists {
        if let Some(current) = &selection.current {
            coordinator.select(list, current);
        }
    }
    for (list, selection) in lists {
        if let Some(previous) = &selection.previous {
            coordinator.set_previous(list, previous);
        }
    }
    for (scene, snapshot) in state.snapshots {
        coordinator.set_snapshot(&scene, snapshot);
    }
    if state.powered {
        coordinator.set_power(true);
    }
    tracing::debug!(zone = %coordinator.name(), "zone state restored");
}

fn not_found(id: ZoneId) -> ZonelightError {
    NotFoundError {
        entity: "Zone",
        id: id.to_string(),
    }
    .into()
}

fn duplicate(config: &ZoneConfig) -> ZonelightError {
    ValidationError::DuplicateZoneName {
        name: config.name.clone(),
    }
    .into()
}
