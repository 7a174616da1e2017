//! Scene events: emitted when an event scene is activated or deactivated.
//!
//! Event scenes have no built-in behaviour; automations attach to these
//! events through [`DeviceTrigger`](crate::trigger::DeviceTrigger)s.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::{EventId, ZoneId};

/// Event type name carried on the bus.
pub const SCENE_EVENT_TYPE: &str = "zone_lighting_event";

/// Direction of a scene transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SceneAction {
    #[serde(rename = "activate_scene")]
    Activate,
    #[serde(rename = "deactivate_scene")]
    Deactivate,
}

impl SceneAction {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Activate => "activate_scene",
            Self::Deactivate => "deactivate_scene",
        }
    }
}

impl std::fmt::Display for SceneAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An event scene was activated or deactivated in a zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneEvent {
    pub id: EventId,
    /// Zone that emitted the event.
    pub zone_id: ZoneId,
    pub action: SceneAction,
    pub scene: String,
    pub timestamp: DateTime<Utc>,
}

impl SceneEvent {
    /// Create an event stamped with a fresh id and the current time.
    #[must_use]
    pub fn new(zone_id: ZoneId, action: SceneAction, scene: impl Into<String>) -> Self {
        Self {
            id: EventId::new(),
            zone_id,
            action,
            scene: scene.into(),
            timestamp: Utc::now(),
        }
    }
}
