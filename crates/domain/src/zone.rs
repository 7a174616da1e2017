//! Zone: the per-zone state machine.
//!
//! A [`Zone`] tracks power, the scene and controller selections and the
//! snapshots captured for simple scenes. Its operations never perform IO:
//! each returns an [`Outcome`] listing the side effects the caller has to
//! carry out, in order.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::MANUAL;
use crate::config::{DeactivatePolicy, ZoneConfig};
use crate::event::SceneAction;
use crate::id::ZoneId;
use crate::light::LightId;
use crate::snapshot::SceneSnapshot;

/// Which of the two selection lists an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListKind {
    Scene,
    Controller,
}

impl std::fmt::Display for ListKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Scene => f.write_str("scene"),
            Self::Controller => f.write_str("controller"),
        }
    }
}

/// An ordered list of options with a current and a previous choice.
///
/// `current` and `previous` are always members of `options` or unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Selection {
    options: Vec<String>,
    current: Option<String>,
    previous: Option<String>,
}

impl Selection {
    fn new(values: impl IntoIterator<Item = String>) -> Self {
        let mut options = vec![MANUAL.to_string()];
        options.extend(values);
        Self {
            options,
            current: None,
            previous: None,
        }
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    #[must_use]
    pub fn previous(&self) -> Option<&str> {
        self.previous.as_deref()
    }

    #[must_use]
    pub fn contains(&self, value: &str) -> bool {
        self.options.iter().any(|option| option == value)
    }

    /// Make `value` current. Returns the replaced value, or `None` when the
    /// selection did not change.
    fn select(&mut self, value: &str) -> Option<Option<String>> {
        if !self.contains(value) || self.current() == Some(value) {
            return None;
        }
        let replaced = self.current.replace(value.to_string());
        self.previous.clone_from(&replaced);
        Some(replaced)
    }

    fn set_previous(&mut self, value: &str) -> bool {
        if !self.contains(value) {
            return false;
        }
        self.previous = Some(value.to_string());
        true
    }
}

/// A side effect requested by a zone transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Announce an event scene transition on the bus.
    PublishEvent { action: SceneAction, scene: String },
    /// Re-apply the saved snapshot of a simple scene to the lights.
    Restore { scene: String },
    /// Save the live lights as the named external snapshot of a scene.
    PersistExternal { scene: String },
    /// Drop any debounced snapshot capture that has not run yet.
    CancelPendingSave,
}

/// Result of a zone operation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[must_use]
pub struct Outcome {
    /// Whether observers should be notified.
    pub changed: bool,
    /// Side effects to perform, in order.
    pub effects: Vec<Effect>,
}

impl Outcome {
    fn unchanged() -> Self {
        Self::default()
    }

    fn changed(effects: Vec<Effect>) -> Self {
        Self {
            changed: true,
            effects,
        }
    }
}

/// The persisted part of a zone, used to restore it after a restart.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ZoneState {
    pub powered: bool,
    pub scene: SelectionState,
    pub controller: SelectionState,
    #[serde(default)]
    pub snapshots: BTreeMap<String, SceneSnapshot>,
}

/// Current and previous value of one selection list.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SelectionState {
    pub current: Option<String>,
    pub previous: Option<String>,
}

/// One lighting zone.
#[derive(Debug, Clone, Serialize)]
pub struct Zone {
    id: ZoneId,
    name: String,
    lights: Vec<LightId>,
    #[serde(skip)]
    simple_scenes: Vec<String>,
    #[serde(skip)]
    event_scenes: Vec<String>,
    #[serde(skip)]
    on_deactivate: DeactivatePolicy,
    powered: bool,
    scene: Selection,
    controller: Selection,
    snapshots: BTreeMap<String, SceneSnapshot>,
}

impl Zone {
    /// Build an unpowered zone with nothing selected and no snapshots.
    ///
    /// The scene list is `Manual`, then the simple scenes, then the event
    /// scenes. The config is expected to be normalized.
    #[must_use]
    pub fn new(config: &ZoneConfig) -> Self {
        let scenes = config
            .scenes
            .iter()
            .chain(config.event_scenes.iter())
            .cloned();
        Self {
            id: config.id(),
            name: config.name.clone(),
            lights: config.lights.clone(),
            simple_scenes: config.scenes.clone(),
            event_scenes: config.event_scenes.clone(),
            on_deactivate: config.on_deactivate,
            powered: false,
            scene: Selection::new(scenes),
            controller: Selection::new(config.controllers.iter().cloned()),
            snapshots: BTreeMap::new(),
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

    #[must_use]
    pub fn lights(&self) -> &[LightId] {
        &self.lights
    }

    #[must_use]
    pub fn is_powered(&self) -> bool {
        self.powered
    }

    #[must_use]
    pub fn selection(&self, list: ListKind) -> &Selection {
        match list {
            ListKind::Scene => &self.scene,
            ListKind::Controller => &self.controller,
        }
    }

    fn selection_mut(&mut self, list: ListKind) -> &mut Selection {
        match list {
            ListKind::Scene => &mut self.scene,
            ListKind::Controller => &mut self.controller,
        }
    }

    /// Whether the zone currently follows its lights directly.
    #[must_use]
    pub fn is_manual(&self) -> bool {
        self.scene.current() == Some(MANUAL)
    }

    #[must_use]
    pub fn simple_scenes(&self) -> &[String] {
        &self.simple_scenes
    }

    /// A scene is simple when it is a real, configured, snapshot-driven scene.
    #[must_use]
    pub fn is_simple_scene(&self, scene: &str) -> bool {
        !scene.is_empty() && scene != MANUAL && self.simple_scenes.iter().any(|s| s == scene)
    }

    #[must_use]
    pub fn is_event_scene(&self, scene: &str) -> bool {
        self.event_scenes.iter().any(|s| s == scene)
    }

    /// Switch the zone on or off.
    ///
    /// The current scene is activated or deactivated even when the power
    /// state does not change.
    pub fn set_power(&mut self, on: bool) -> Outcome {
        self.powered = on;
        let action = if on {
            SceneAction::Activate
        } else {
            SceneAction::Deactivate
        };
        let effects = self
            .scene
            .current()
            .and_then(|scene| self.scene_action(action, scene))
            .into_iter()
            .collect();
        Outcome::changed(effects)
    }

    /// Make `value` the current entry of `list`.
    ///
    /// Unknown values and the already-current value are ignored. Changing
    /// the scene of a powered zone cancels the pending capture, then
    /// deactivates the old scene before activating the new one.
    pub fn select(&mut self, list: ListKind, value: &str) -> Outcome {
        let Some(replaced) = self.selection_mut(list).select(value) else {
            return Outcome::unchanged();
        };

        let mut effects = Vec::new();
        if list == ListKind::Scene && self.powered {
            effects.push(Effect::CancelPendingSave);
            if let Some(old) = replaced {
                effects.extend(self.scene_action(SceneAction::Deactivate, &old));
            }
            effects.extend(self.scene_action(SceneAction::Activate, value));
        }
        Outcome::changed(effects)
    }

    /// Seed the previous entry of `list` without touching the current one.
    pub fn set_previous(&mut self, list: ListKind, value: &str) -> Outcome {
        if self.selection_mut(list).set_previous(value) {
            Outcome::changed(Vec::new())
        } else {
            Outcome::unchanged()
        }
    }

    /// Re-select the previous entry of `list`.
    pub fn rollback(&mut self, list: ListKind) -> Outcome {
        match self.selection(list).previous.clone() {
            Some(previous) => self.select(list, &previous),
            None => Outcome::unchanged(),
        }
    }

    /// Effect of activating or deactivating `scene`, if any.
    #[must_use]
    pub fn scene_action(&self, action: SceneAction, scene: &str) -> Option<Effect> {
        if scene.is_empty() || scene == MANUAL {
            return None;
        }
        if self.is_event_scene(scene) {
            return Some(Effect::PublishEvent {
                action,
                scene: scene.to_string(),
            });
        }
        match (action, self.on_deactivate) {
            (SceneAction::Activate, _) => Some(Effect::Restore {
                scene: scene.to_string(),
            }),
            (SceneAction::Deactivate, DeactivatePolicy::PersistExternal) => {
                Some(Effect::PersistExternal {
                    scene: scene.to_string(),
                })
            }
            (SceneAction::Deactivate, DeactivatePolicy::None) => None,
        }
    }

    #[must_use]
    pub fn deactivate_policy(&self) -> DeactivatePolicy {
        self.on_deactivate
    }

    /// Scene a snapshot capture would be stored under right now.
    ///
    /// `None` while unpowered or when the current scene is not simple.
    #[must_use]
    pub fn capture_target(&self) -> Option<&str> {
        if !self.powered {
            return None;
        }
        self.scene
            .current()
            .filter(|scene| self.is_simple_scene(scene))
    }

    #[must_use]
    pub fn snapshot(&self, scene: &str) -> Option<&SceneSnapshot> {
        self.snapshots.get(scene)
    }

    /// Store a freshly captured snapshot. Non-simple scenes are refused.
    pub fn store_capture(&mut self, scene: &str, snapshot: SceneSnapshot) -> Outcome {
        if !self.is_simple_scene(scene) {
            return Outcome::unchanged();
        }
        self.snapshots.insert(scene.to_string(), snapshot);
        Outcome::changed(Vec::new())
    }

    /// Overwrite the snapshot of `scene`, restoring it right away when the
    /// zone is powered and `scene` is current. Non-simple scenes are refused.
    pub fn set_snapshot(&mut self, scene: &str, snapshot: SceneSnapshot) -> Outcome {
        let mut outcome = self.store_capture(scene, snapshot);
        if outcome.changed && self.powered && self.scene.current() == Some(scene) {
            outcome.effects.push(Effect::Restore {
                scene: scene.to_string(),
            });
        }
        outcome
    }

    /// Name of the external snapshot holding `scene` for this zone.
    #[must_use]
    pub fn external_snapshot_name(&self, scene: &str) -> String {
        format!("zone_lighting_{}_{}", slugify(&self.name), slugify(scene))
    }

    /// The part of the zone worth persisting across restarts.
    #[must_use]
    pub fn state(&self) -> ZoneState {
        ZoneState {
            powered: self.powered,
            scene: SelectionState {
                current: self.scene.current.clone(),
                previous: self.scene.previous.clone(),
            },
            controller: SelectionState {
                current: self.controller.current.clone(),
                previous: self.controller.previous.clone(),
            },
            snapshots: self.snapshots.clone(),
        }
    }
}

/// Lowercase, underscore-separated form of a name (`Living Room` → `living_room`).
#[must_use]
pub fn slugify(value: &str) -> String {
    slug::slugify(value).replace('-', "_")
}
