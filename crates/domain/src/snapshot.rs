//! Scene snapshot: the captured state of every light in a zone.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::light::{LightId, LightState};

/// Per-light states captured at one point in time, keyed by light id.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SceneSnapshot(BTreeMap<LightId, LightState>);

impl SceneSnapshot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the state of one light, replacing any earlier capture.
    pub fn insert(&mut self, light: impl Into<LightId>, state: LightState) {
        self.0.insert(light.into(), state);
    }

    #[must_use]
    pub fn get(&self, light: &str) -> Option<&LightState> {
        self.0.get(light)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&LightId, &LightState)> {
        self.0.iter()
    }
}

impl FromIterator<(LightId, LightState)> for SceneSnapshot {
    fn from_iter<T: IntoIterator<Item = (LightId, LightState)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
