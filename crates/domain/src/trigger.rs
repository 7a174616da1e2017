//! Device triggers: the event patterns automations can attach to.

use serde::{Deserialize, Serialize};

use crate::config::ZoneConfig;
use crate::event::{SceneAction, SceneEvent};
use crate::id::ZoneId;

/// Fires when a zone activates or deactivates one of its event scenes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceTrigger {
    pub zone_id: ZoneId,
    pub action: SceneAction,
    pub scene: String,
}

impl DeviceTrigger {
    /// Every trigger a zone offers: activated and deactivated for each
    /// event scene, in configuration order.
    #[must_use]
    pub fn for_zone(config: &ZoneConfig) -> Vec<Self> {
        let zone_id = config.id();
        config
            .event_scenes
            .iter()
            .filter(|scene| !scene.is_empty())
            .flat_map(|scene| {
                [SceneAction::Activate, SceneAction::Deactivate].map(|action| Self {
                    zone_id,
                    action,
                    scene: scene.clone(),
                })
            })
            .collect()
    }

    /// Check whether this trigger matches a given event.
    #[must_use]
    pub fn matches_event(&self, event: &SceneEvent) -> bool {
        self.zone_id == event.zone_id && self.action == event.action && self.scene == event.scene
    }

    /// Human-readable label, e.g. `Scene Party activated`.
    #[must_use]
    pub fn label(&self) -> String {
        match self.action {
            SceneAction::Activate => format!("Scene {} activated", self.scene),
            SceneAction::Deactivate => format!("Scene {} deactivated", self.scene),
        }
    }
}

impl std::fmt::Display for DeviceTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({}, {})", self.action, self.zone_id, self.scene)
    }
}
