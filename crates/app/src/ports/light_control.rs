//! Light control port: switch member lights and read their live state.

use std::future::Future;

use zonelight_domain::error::ZonelightError;
use zonelight_domain::light::{Attributes, LightId, LightState};

/// The service owning the physical (or virtual) lights.
pub trait LightControl {
    /// Turn the given lights on, applying `attributes` to each.
    fn turn_on(
        &self,
        lights: Vec<LightId>,
        attributes: Attributes,
    ) -> impl Future<Output = Result<(), ZonelightError>> + Send;

    /// Turn the given lights off.
    fn turn_off(
        &self,
        lights: Vec<LightId>,
    ) -> impl Future<Output = Result<(), ZonelightError>> + Send;

    /// Current state of one light, `None` when the light is unknown.
    fn get_state(
        &self,
        light: &str,
    ) -> impl Future<Output = Result<Option<LightState>, ZonelightError>> + Send;
}

impl<T: LightControl + Send + Sync> LightControl for std::sync::Arc<T> {
    fn turn_on(
        &self,
        lights: Vec<LightId>,
        attributes: Attributes,
    ) -> impl Future<Output = Result<(), ZonelightError>> + Send {
        (**self).turn_on(lights, attributes)
    }

    fn turn_off(
        &self,
        lights: Vec<LightId>,
    ) -> impl Future<Output = Result<(), ZonelightError>> + Send {
        (**self).turn_off(lights)
    }

    fn get_state(
        &self,
        light: &str,
    ) -> impl Future<Output = Result<Option<LightState>, ZonelightError>> + Send {
        (**self).get_state(light)
    }
}
