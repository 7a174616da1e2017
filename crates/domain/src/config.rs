//! Zone configuration: the lights, scenes and controllers of one zone.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::MANUAL;
use crate::error::{ValidationError, ZonelightError};
use crate::id::ZoneId;
use crate::light::LightId;

/// What a simple scene does when it is deactivated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeactivatePolicy {
    /// Nothing beyond the debounced in-memory capture.
    #[default]
    None,
    /// Also save a named external snapshot of the live lights.
    PersistExternal,
}

/// Configuration of one lighting zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneConfig {
    pub name: String,
    pub lights: Vec<LightId>,
    /// Simple scenes, restored from snapshots.
    #[serde(default)]
    pub scenes: Vec<String>,
    /// Scenes handled by automations through scene events.
    #[serde(default)]
    pub event_scenes: Vec<String>,
    #[serde(default)]
    pub controllers: Vec<String>,
    #[serde(default)]
    pub on_deactivate: DeactivatePolicy,
}

impl ZoneConfig {
    #[must_use]
    pub fn builder() -> ZoneConfigBuilder {
        ZoneConfigBuilder::default()
    }

    /// Stable identifier derived from the zone name.
    #[must_use]
    pub fn id(&self) -> ZoneId {
        ZoneId::from_name(&self.name)
    }

    /// Drop blank entries and duplicates (first occurrence wins), then
    /// check the invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ZonelightError::Validation`] when an invariant fails.
    pub fn normalized(mut self) -> Result<Self, ZonelightError> {
        self.name = self.name.trim().to_string();
        self.lights = clean_list(self.lights);
        self.scenes = clean_list(self.scenes);
        self.event_scenes = clean_list(self.event_scenes);
        self.controllers = clean_list(self.controllers);
        self.validate()?;
        Ok(self)
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ZonelightError::Validation`] when:
    /// - `name` is empty ([`ValidationError::EmptyName`])
    /// - `lights` is empty ([`ValidationError::NoLights`])
    /// - a scene or controller is named `Manual` ([`ValidationError::Reserved`])
    /// - a scene is both simple and event ([`ValidationError::OverlappingScene`])
    pub fn validate(&self) -> Result<(), ZonelightError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        if self.lights.iter().all(|light| light.trim().is_empty()) {
            return Err(ValidationError::NoLights {
                zone: self.name.clone(),
            }
            .into());
        }
        for (kind, values) in [
            ("scene", &self.scenes),
            ("scene", &self.event_scenes),
            ("controller", &self.controllers),
        ] {
            if let Some(value) = values.iter().find(|v| v.as_str() == MANUAL) {
                return Err(ValidationError::Reserved {
                    kind,
                    value: value.clone(),
                }
                .into());
            }
        }
        if let Some(scene) = self
            .scenes
            .iter()
            .find(|scene| !scene.is_empty() && self.event_scenes.contains(scene))
        {
            return Err(ValidationError::OverlappingScene {
                scene: scene.clone(),
            }
            .into());
        }
        Ok(())
    }
}

/// Check that no two zones share a name (compared by derived id).
///
/// # Errors
///
/// Returns [`ValidationError::DuplicateZoneName`] for the first repeated name.
pub fn ensure_unique_names(configs: &[ZoneConfig]) -> Result<(), ZonelightError> {
    let mut seen = HashSet::new();
    for config in configs {
        if !seen.insert(config.id()) {
            return Err(ValidationError::DuplicateZoneName {
                name: config.name.clone(),
            }
            .into());
        }
    }
    Ok(())
}

fn clean_list(values: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .into_iter()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .filter(|value| seen.insert(value.clone()))
        .collect()
}

/// Step-by-step builder for [`ZoneConfig`].
#[derive(Debug, Default)]
pub struct ZoneConfigBuilder {
    name: Option<String>,
    lights: Vec<LightId>,
    scenes: Vec<String>,
    event_scenes: Vec<String>,
    controllers: Vec<String>,
    on_deactivate: DeactivatePolicy,
}

impl ZoneConfigBuilder {
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn light(mut self, light: impl Into<LightId>) -> Self {
        self.lights.push(light.into());
        self
    }

    #[must_use]
    pub fn scene(mut self, scene: impl Into<String>) -> Self {
        self.scenes.push(scene.into());
        self
    }

    #[must_use]
    pub fn event_scene(mut self, scene: impl Into<String>) -> Self {
        self.event_scenes.push(scene.into());
        self
    }

    #[must_use]
    pub fn controller(mut self, controller: impl Into<String>) -> Self {
        self.controllers.push(controller.into());
        self
    }

    #[must_use]
    pub fn on_deactivate(mut self, policy: DeactivatePolicy) -> Self {
        self.on_deactivate = policy;
        self
    }

    /// Consume the builder, normalize, and return a [`ZoneConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`ZonelightError::Validation`] if an invariant fails.
    pub fn build(self) -> Result<ZoneConfig, ZonelightError> {
        ZoneConfig {
            name: self.name.unwrap_or_default(),
            lights: self.lights,
            scenes: self.scenes,
            event_scenes: self.event_scenes,
            controllers: self.controllers,
            on_deactivate: self.on_deactivate,
        }
        .normalized()
    }
}
