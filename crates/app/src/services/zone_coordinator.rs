//! Zone coordinator: runs one zone and carries out its side effects.
//!
//! Public operations are synchronous: they update the zone under its lock and
//! queue the requested effects. A background worker drains the queue in
//! order, awaiting each effect before starting the next one.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;

use zonelight_domain::config::DeactivatePolicy;
use zonelight_domain::effect_list::{effect_list, parse_effect};
use zonelight_domain::event::SceneEvent;
use zonelight_domain::id::ZoneId;
use zonelight_domain::light::{Attributes, FORWARDED_ATTRIBUTES, LightId, filter_attributes};
use zonelight_domain::snapshot::SceneSnapshot;
use zonelight_domain::zone::{Effect, ListKind, Outcome, Zone};

use crate::debounce::{DebounceConfig, Debouncer};
use crate::ports::{EventPublisher, LightControl, NamedSnapshotStore};

/// The ports a zone worker talks to.
///
/// `Clone` is implemented manually so the port types themselves do not need
/// to be `Clone`.
pub struct ZonePorts<L, N, P> {
    pub lights: Arc<L>,
    pub snapshots: Arc<N>,
    pub events: Arc<P>,
}

impl<L, N, P> ZonePorts<L, N, P> {
    pub fn new(lights: Arc<L>, snapshots: Arc<N>, events: Arc<P>) -> Self {
        Self {
            lights,
            snapshots,
            events,
        }
    }
}

impl<L, N, P> Clone for ZonePorts<L, N, P> {
    fn clone(&self) -> Self {
        Self {
            lights: Arc::clone(&self.lights),
            snapshots: Arc::clone(&self.snapshots),
            events: Arc::clone(&self.events),
        }
    }
}

enum Job {
    Effect(Effect),
    /// Debounced snapshot capture of `scene`, dropped once `generation` is stale.
    Capture { scene: String, generation: usize },
    /// Forward a manual `turn_on` to the member lights.
    Forward(Attributes),
    TurnOffAll,
    /// Make the zone power follow its lights while in Manual.
    FollowLights,
    Apply(SceneSnapshot),
    Flush(oneshot::Sender<()>),
    Stop,
}

struct Shared {
    zone: Mutex<Zone>,
    changes: watch::Sender<Zone>,
    jobs: mpsc::UnboundedSender<Job>,
    debouncer: Debouncer,
    /// Bumped whenever a pending capture is cancelled.
    capture_generation: AtomicUsize,
    scene_restored: AtomicBool,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Zone> {
        self.zone.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn enqueue(&self, job: Job) {
        if self.jobs.send(job).is_err() {
            tracing::debug!("zone worker stopped, dropping job");
        }
    }

    /// Run a transition and queue its effects while the zone is still locked.
    fn apply(&self, transition: impl FnOnce(&mut Zone) -> Outcome) -> bool {
        let mut zone = self.lock();
        let outcome = transition(&mut zone);
        let changed = outcome.changed;
        for effect in self.settle(&zone, outcome) {
            self.enqueue(Job::Effect(effect));
        }
        changed
    }

    /// Run a transition from the worker, returning the effects to execute inline.
    fn apply_inline(&self, transition: impl FnOnce(&mut Zone) -> Outcome) -> Vec<Effect> {
        let mut zone = self.lock();
        let outcome = transition(&mut zone);
        self.settle(&zone, outcome)
    }

    fn settle(&self, zone: &Zone, outcome: Outcome) -> Vec<Effect> {
        let mut effects = Vec::with_capacity(outcome.effects.len());
        for effect in outcome.effects {
            match effect {
                Effect::CancelPendingSave => self.cancel_pending_save(),
                Effect::PersistExternal { scene } if !zone.is_powered() => {
                    tracing::debug!(zone = %zone.name(), scene = %scene, "zone is off, not persisting scene");
                }
                effect => effects.push(effect),
            }
        }
        if outcome.changed {
            self.changes.send_replace(zone.clone());
        }
        effects
    }

    fn cancel_pending_save(&self) {
        self.debouncer.cancel();
        self.capture_generation.fetch_add(1, Ordering::AcqRel);
    }

    /// Queue a capture of the scene that is current when the debounce fires.
    fn queue_capture(&self) {
        let zone = self.lock();
        let Some(scene) = zone.capture_target() else {
            tracing::debug!(zone = %zone.name(), "nothing to capture");
            return;
        };
        let generation = self.capture_generation.load(Ordering::Acquire);
        self.enqueue(Job::Capture {
            scene: scene.to_string(),
            generation,
        });
    }

    fn is_capture_current(&self, zone: &Zone, scene: &str, generation: usize) -> bool {
        zone.capture_target() == Some(scene)
            && self.capture_generation.load(Ordering::Acquire) == generation
    }
}

/// Owns one [`Zone`] and its background worker.
pub struct ZoneCoordinator {
    id: ZoneId,
    name: String,
    shared: Arc<Shared>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl ZoneCoordinator {
    /// Start a coordinator for `zone`. Must be called within a tokio runtime.
    pub fn spawn<L, N, P>(zone: Zone, ports: ZonePorts<L, N, P>, debounce: DebounceConfig) -> Self
    where
        L: LightControl + Send + Sync + 'static,
        N: NamedSnapshotStore + Send + Sync + 'static,
        P: EventPublisher + Send + Sync + 'static,
    {
        let (jobs, queue) = mpsc::unbounded_channel();
        let id = zone.id();
        let name = zone.name().to_string();
        let (changes, _) = watch::channel(zone.clone());
        let shared = Arc::new_cyclic(|weak: &Weak<Shared>| {
            let weak = weak.clone();
            let debouncer = Debouncer::new(debounce, move || {
                if let Some(shared) = weak.upgrade() {
                    shared.queue_capture();
                }
            });
            Shared {
                zone: Mutex::new(zone),
                changes,
                jobs,
                debouncer,
                capture_generation: AtomicUsize::new(0),
                scene_restored: AtomicBool::new(false),
            }
        });
        let worker = Worker {
            name: name.clone(),
            shared: Arc::clone(&shared),
            ports,
        };
        let handle = tokio::spawn(worker.run(queue));
        tracing::debug!(zone = %name, "zone started");

        Self {
            id,
            name,
            shared,
            worker: Mutex::new(Some(handle)),
        }
    }

    #[must_use]
    pub fn id(&self) -> ZoneId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Copy of the current zone.
    #[must_use]
    pub fn zone(&self) -> Zone {
        self.shared.lock().clone()
    }

    /// Observe the zone. The receiver sees the latest value after every change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Zone> {
        self.shared.changes.subscribe()
    }

    pub fn set_power(&self, on: bool) {
        self.shared.apply(|zone| zone.set_power(on));
    }

    /// Select `value` in `list`. Returns whether the selection changed.
    pub fn select(&self, list: ListKind, value: &str) -> bool {
        self.shared.apply(|zone| zone.select(list, value))
    }

    pub fn set_previous(&self, list: ListKind, value: &str) -> bool {
        self.shared.apply(|zone| zone.set_previous(list, value))
    }

    pub fn rollback(&self, list: ListKind) -> bool {
        self.shared.apply(|zone| zone.rollback(list))
    }

    #[must_use]
    pub fn snapshot(&self, scene: &str) -> Option<SceneSnapshot> {
        self.shared.lock().snapshot(scene).cloned()
    }

    /// Replace the snapshot of a simple scene.
    pub fn set_snapshot(&self, scene: &str, snapshot: SceneSnapshot) -> bool {
        self.shared.apply(|zone| {
            if !zone.is_simple_scene(scene) {
                tracing::warn!(zone = %zone.name(), scene = %scene, "refusing snapshot for non-simple scene");
            }
            zone.set_snapshot(scene, snapshot)
        })
    }

    /// Schedule a debounced capture of the current scene.
    pub fn request_snapshot_save(&self) {
        if !self.shared.lock().is_powered() {
            return;
        }
        self.shared.debouncer.call();
    }

    /// Save button.
    pub fn save(&self) {
        self.request_snapshot_save();
    }

    /// Whether a snapshot capture is waiting for its debounce timer.
    #[must_use]
    pub fn is_save_pending(&self) -> bool {
        self.shared.debouncer.is_pending()
    }

    /// Switch the zone light on, optionally picking a scene or controller
    /// through an effect name. In Manual the command goes to the lights.
    pub fn turn_on(&self, effect: Option<&str>, attributes: Attributes) {
        let selection = effect.and_then(parse_effect);
        let mut zone = self.shared.lock();
        let mut outcome = zone.set_power(true);
        if let Some((list, value)) = selection {
            let selected = zone.select(list, &value);
            outcome.effects.extend(selected.effects);
        }
        let manual = zone.is_manual();
        for effect in self.shared.settle(&zone, outcome) {
            self.shared.enqueue(Job::Effect(effect));
        }
        if manual {
            self.shared.enqueue(Job::Forward(attributes));
        }
    }

    /// Switch the zone and all of its lights off.
    pub fn turn_off(&self) {
        self.shared.apply(|zone| zone.set_power(false));
        self.shared.enqueue(Job::TurnOffAll);
    }

    /// Notify the zone that one of its lights changed.
    pub fn lights_changed(&self) {
        if self.shared.lock().is_manual() {
            self.shared.enqueue(Job::FollowLights);
        } else {
            self.request_snapshot_save();
        }
    }

    /// Apply the saved snapshot of `scene`, then select it.
    ///
    /// Returns `false` without doing anything when no snapshot is saved.
    pub fn activate_scene(&self, scene: &str) -> bool {
        let Some(snapshot) = self.snapshot(scene) else {
            tracing::debug!(zone = %self.name, scene = %scene, "no snapshot to activate");
            return false;
        };
        self.shared.enqueue(Job::Apply(snapshot));
        self.select(ListKind::Scene, scene);
        true
    }

    /// Effect names offered by the zone light.
    #[must_use]
    pub fn effect_list(&self) -> Vec<String> {
        effect_list(&self.shared.lock())
    }

    /// Wait until every job queued so far has run.
    pub async fn flush(&self) {
        let (done, wait) = oneshot::channel();
        self.shared.enqueue(Job::Flush(done));
        let _ = wait.await;
    }

    /// Stop the debouncer, drain the queue and stop the worker.
    pub async fn shutdown(&self) {
        self.shared.debouncer.shutdown();
        let handle = self
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let Some(handle) = handle else {
            return;
        };
        self.shared.enqueue(Job::Stop);
        if let Err(err) = handle.await {
            tracing::warn!(zone = %self.name, error = %err, "zone worker failed");
        }
        tracing::debug!(zone = %self.name, "zone stopped");
    }
}

impl Drop for ZoneCoordinator {
    fn drop(&mut self) {
        self.shared.debouncer.shutdown();
        let handle = self
            .worker
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if handle.is_some() {
            self.shared.enqueue(Job::Stop);
        }
    }
}

struct Worker<L, N, P> {
    name: String,
    shared: Arc<Shared>,
    ports: ZonePorts<L, N, P>,
}

impl<L, N, P> Worker<L, N, P>
where
    L: LightControl + Send + Sync + 'static,
    N: NamedSnapshotStore + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
{
    async fn run(self, mut queue: mpsc::UnboundedReceiver<Job>) {
        while let Some(job) = queue.recv().await {
            match job {
                Job::Stop => break,
                Job::Flush(done) => {
                    let _ = done.send(());
                }
                Job::Effect(effect) => self.execute(effect).await,
                Job::Capture { scene, generation } => self.capture(&scene, generation).await,
                Job::Forward(attributes) => self.forward(attributes).await,
                Job::TurnOffAll => {
                    let lights = self.lights();
                    if let Err(err) = self.ports.lights.turn_off(lights).await {
                        tracing::warn!(zone = %self.name, error = %err, "failed to turn lights off");
                    }
                }
                Job::FollowLights => self.follow_lights().await,
                Job::Apply(snapshot) => {
                    if self.apply_snapshot(&snapshot).await {
                        self.shared.scene_restored.store(true, Ordering::Release);
                    }
                }
            }
        }
    }

    fn lights(&self) -> Vec<LightId> {
        self.shared.lock().lights().to_vec()
    }

    async fn execute(&self, effect: Effect) {
        match effect {
            Effect::PublishEvent { action, scene } => {
                let event = SceneEvent::new(self.shared.lock().id(), action, scene);
                if let Err(err) = self.ports.events.publish(event).await {
                    tracing::warn!(zone = %self.name, error = %err, "failed to publish scene event");
                }
            }
            Effect::Restore { scene } => self.restore(&scene).await,
            Effect::PersistExternal { scene } => self.persist_external(&scene).await,
            Effect::CancelPendingSave => self.shared.cancel_pending_save(),
        }
    }

    async fn restore(&self, scene: &str) {
        let (recorded, name, policy) = {
            let zone = self.shared.lock();
            (
                zone.snapshot(scene).cloned(),
                zone.external_snapshot_name(scene),
                zone.deactivate_policy(),
            )
        };

        let mut source = recorded;
        if policy == DeactivatePolicy::PersistExternal {
            match self.ports.snapshots.load(&name).await {
                Ok(Some(external)) => source = Some(external),
                Ok(None) => {}
                Err(err) => {
                    tracing::warn!(zone = %self.name, snapshot = %name, error = %err, "failed to load named snapshot");
                }
            }
        }

        let Some(snapshot) = source else {
            tracing::debug!(zone = %self.name, scene = %scene, "no snapshot recorded, skipping restore");
            return;
        };
        tracing::debug!(zone = %self.name, scene = %scene, "restoring scene");
        if self.apply_snapshot(&snapshot).await {
            self.shared.scene_restored.store(true, Ordering::Release);
        }
    }

    /// Returns whether every light was restored.
    async fn apply_snapshot(&self, snapshot: &SceneSnapshot) -> bool {
        let mut restored = true;
        for (light, state) in snapshot.iter() {
            let result = if state.is_on() {
                self.ports
                    .lights
                    .turn_on(vec![light.clone()], state.restorable_attributes())
                    .await
            } else {
                self.ports.lights.turn_off(vec![light.clone()]).await
            };
            if let Err(err) = result {
                tracing::warn!(zone = %self.name, light = %light, error = %err, "failed to restore light");
                restored = false;
            }
        }
        restored
    }

    async fn persist_external(&self, scene: &str) {
        if !self.shared.scene_restored.load(Ordering::Acquire) {
            tracing::debug!(zone = %self.name, scene = %scene, "no scene restored yet, not persisting");
            return;
        }
        let (name, lights) = {
            let zone = self.shared.lock();
            (zone.external_snapshot_name(scene), zone.lights().to_vec())
        };
        let snapshot = self.read_lights(&lights).await;
        match self.ports.snapshots.save(&name, snapshot).await {
            Ok(()) => tracing::debug!(zone = %self.name, snapshot = %name, "named snapshot saved"),
            Err(err) => {
                tracing::warn!(zone = %self.name, snapshot = %name, error = %err, "failed to save named snapshot");
            }
        }
    }

    async fn capture(&self, scene: &str, generation: usize) {
        let lights = {
            let zone = self.shared.lock();
            if !self.shared.is_capture_current(&zone, scene, generation) {
                tracing::debug!(zone = %self.name, scene = %scene, "capture superseded, dropping");
                return;
            }
            zone.lights().to_vec()
        };
        let snapshot = self.read_lights(&lights).await;
        let mut stored = false;
        self.shared.apply_inline(|zone| {
            if !self.shared.is_capture_current(zone, scene, generation) {
                return Outcome::default();
            }
            let outcome = zone.store_capture(scene, snapshot);
            stored = outcome.changed;
            outcome
        });
        if stored {
            tracing::debug!(zone = %self.name, scene = %scene, "scene captured");
        }
    }

    async fn read_lights(&self, lights: &[LightId]) -> SceneSnapshot {
        let mut snapshot = SceneSnapshot::new();
        for light in lights {
            match self.ports.lights.get_state(light).await {
                Ok(Some(state)) => snapshot.insert(light.clone(), state),
                Ok(None) => tracing::debug!(zone = %self.name, light = %light, "light unknown, skipping"),
                Err(err) => {
                    tracing::warn!(zone = %self.name, light = %light, error = %err, "failed to read light");
                }
            }
        }
        snapshot
    }

    async fn on_lights(&self, lights: &[LightId]) -> Vec<LightId> {
        let mut on = Vec::new();
        for light in lights {
            if let Ok(Some(state)) = self.ports.lights.get_state(light).await
                && state.is_on()
            {
                on.push(light.clone());
            }
        }
        on
    }

    async fn forward(&self, attributes: Attributes) {
        let lights = self.lights();
        let on = self.on_lights(&lights).await;
        let targets = if on.is_empty() { lights } else { on };
        let attributes = filter_attributes(&attributes, FORWARDED_ATTRIBUTES);
        tracing::debug!(zone = %self.name, lights = ?targets, "forwarding turn_on");
        if let Err(err) = self.ports.lights.turn_on(targets, attributes).await {
            tracing::warn!(zone = %self.name, error = %err, "failed to forward turn_on");
        }
    }

    async fn follow_lights(&self) {
        let lights = self.lights();
        let any_on = !self.on_lights(&lights).await.is_empty();
        let effects = self.shared.apply_inline(|zone| {
            if zone.is_manual() && zone.is_powered() != any_on {
                zone.set_power(any_on)
            } else {
                Outcome::default()
            }
        });
        for effect in effects {
            self.execute(effect).await;
        }
    }
}
