//! Virtual light: holds a power state and the attributes last applied.

use std::sync::{Mutex, PoisonError};

use zonelight_domain::light::{Attributes, LightId, LightState, PowerState};

/// A simulated light.
pub struct VirtualLight {
    id: LightId,
    state: Mutex<LightState>,
}

impl VirtualLight {
    /// A light that starts off.
    #[must_use]
    pub fn new(id: impl Into<LightId>) -> Self {
        Self {
            id: id.into(),
            state: Mutex::new(LightState::off()),
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn state(&self) -> LightState {
        self.lock().clone()
    }

    #[must_use]
    pub fn is_available(&self) -> bool {
        self.lock().state != PowerState::Unavailable
    }

    /// Switch on, merging `attributes` into the current ones.
    /// Returns whether anything changed.
    pub fn turn_on(&self, attributes: Attributes) -> bool {
        let mut state = self.lock();
        let before = state.clone();
        state.state = PowerState::On;
        state.attributes.extend(attributes);
        *state != before
    }

    /// Switch off, keeping the attributes for the next `turn_on`.
    pub fn turn_off(&self) -> bool {
        let mut state = self.lock();
        let changed = state.state != PowerState::Off;
        state.state = PowerState::Off;
        changed
    }

    /// Mark the light as unreachable, or bring it back switched off.
    pub fn set_available(&self, available: bool) {
        let mut state = self.lock();
        state.state = if available {
            PowerState::Off
        } else {
            PowerState::Unavailable
        };
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, LightState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zonelight_domain::light::AttributeValue;

    fn brightness(value: i64) -> Attributes {
        let mut attributes = Attributes::new();
        attributes.insert("brightness".to_string(), AttributeValue::Int(value));
        attributes
    }

    #[test]
    fn should_default_to_off() {
        let light = VirtualLight::new("light.desk");
        assert_eq!(light.state(), LightState::off());
        assert!(light.is_available());
    }

    #[test]
    fn should_merge_attributes_on_turn_on() {
        let light = VirtualLight::new("light.desk");
        assert!(light.turn_on(brightness(10)));
        let mut color = Attributes::new();
        color.insert("color_temp_kelvin".to_string(), AttributeValue::Int(2700));
        assert!(light.turn_on(color));

        let state = light.state();
        assert!(state.is_on());
        assert_eq!(state.attributes.len(), 2);
    }

    #[test]
    fn should_report_no_change_for_identical_turn_on() {
        let light = VirtualLight::new("light.desk");
        light.turn_on(brightness(10));
        assert!(!light.turn_on(brightness(10)));
    }

    #[test]
    fn should_keep_attributes_when_turned_off() {
        let light = VirtualLight::new("light.desk");
        light.turn_on(brightness(10));
        assert!(light.turn_off());
        assert!(!light.turn_off());
        assert_eq!(light.state().attributes, brightness(10));
    }

    #[test]
    fn should_become_unavailable() {
        let light = VirtualLight::new("light.desk");
        light.set_available(false);
        assert!(!light.is_available());
        assert_eq!(light.state().state, PowerState::Unavailable);
    }
}
