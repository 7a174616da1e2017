//! Light state: what a light reports and what a snapshot captures.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Light identifier as known to the light-control service (e.g. `light.desk`).
pub type LightId = String;

/// Attribute map attached to a light state or a `turn_on` call.
pub type Attributes = BTreeMap<String, AttributeValue>;

/// Attributes forwarded from a zone `turn_on` to its member lights.
pub const FORWARDED_ATTRIBUTES: &[&str] = &[
    "brightness",
    "color_temp_kelvin",
    "flash",
    "hs_color",
    "rgb_color",
    "rgbw_color",
    "rgbww_color",
    "transition",
    "white",
    "xy_color",
];

/// Attributes re-applied when a snapshot is restored.
pub const RESTORED_ATTRIBUTES: &[&str] = &[
    "brightness",
    "color_temp_kelvin",
    "effect",
    "hs_color",
    "rgb_color",
    "rgbw_color",
    "rgbww_color",
    "white",
    "xy_color",
];

/// Discrete power state of a light.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerState {
    On,
    Off,
    #[default]
    Unknown,
    Unavailable,
}

impl std::fmt::Display for PowerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::On => f.write_str("on"),
            Self::Off => f.write_str("off"),
            Self::Unknown => f.write_str("unknown"),
            Self::Unavailable => f.write_str("unavailable"),
        }
    }
}

/// A single typed attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Json(serde_json::Value),
}

/// Live or captured state of one light.
///
/// Serializes with the attributes flattened next to `state`, e.g.
/// `{"state": "on", "brightness": 128}`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LightState {
    pub state: PowerState,
    #[serde(flatten)]
    pub attributes: Attributes,
}

impl LightState {
    /// A light that is on with the given attributes.
    #[must_use]
    pub fn on(attributes: Attributes) -> Self {
        Self {
            state: PowerState::On,
            attributes,
        }
    }

    /// A light that is off.
    #[must_use]
    pub fn off() -> Self {
        Self {
            state: PowerState::Off,
            attributes: Attributes::new(),
        }
    }

    #[must_use]
    pub fn is_on(&self) -> bool {
        self.state == PowerState::On
    }

    /// The subset of attributes worth re-applying on restore.
    #[must_use]
    pub fn restorable_attributes(&self) -> Attributes {
        filter_attributes(&self.attributes, RESTORED_ATTRIBUTES)
    }
}

/// Keep only the attributes whose key is in `allowed`.
#[must_use]
pub fn filter_attributes(attributes: &Attributes, allowed: &[&str]) -> Attributes {
    attributes
        .iter()
        .filter(|(key, _)| allowed.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}
