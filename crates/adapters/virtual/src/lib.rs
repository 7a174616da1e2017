//! # zonelight-adapter-virtual
//!
//! Simulated lights implementing the [`LightControl`] port, used by the
//! daemon when no real light service is attached and by tests.
//!
//! Every state change is announced on a broadcast channel carrying the id of
//! the light that changed, so the daemon can feed it back to the zones.
//!
//! ## Dependency rule
//!
//! Depends on `zonelight-app` (port traits) and `zonelight-domain` only.

mod error;
mod light;

use std::collections::BTreeMap;
use std::future::Future;

use tokio::sync::broadcast;

use zonelight_app::ports::LightControl;
use zonelight_domain::error::ZonelightError;
use zonelight_domain::light::{Attributes, LightId, LightState};

pub use error::LightError;
pub use light::VirtualLight;

const CHANGE_CAPACITY: usize = 256;

/// A fixed set of virtual lights.
pub struct VirtualLights {
    lights: BTreeMap<LightId, VirtualLight>,
    changes: broadcast::Sender<LightId>,
}

impl VirtualLights {
    /// Create one light, switched off, per id.
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<LightId>,
    {
        let lights = ids
            .into_iter()
            .map(|id| {
                let light = VirtualLight::new(id);
                (light.id().to_string(), light)
            })
            .collect();
        let (changes, _) = broadcast::channel(CHANGE_CAPACITY);
        Self { lights, changes }
    }

    /// Ids of the lights that change from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<LightId> {
        self.changes.subscribe()
    }

    #[must_use]
    pub fn ids(&self) -> Vec<LightId> {
        self.lights.keys().cloned().collect()
    }

    /// # Errors
    ///
    /// Returns [`LightError::UnknownLight`] for an id that is not simulated.
    pub fn set_available(&self, id: &str, available: bool) -> Result<(), LightError> {
        self.light(id)?.set_available(available);
        self.announce(id);
        Ok(())
    }

    fn light(&self, id: &str) -> Result<&VirtualLight, LightError> {
        self.lights
            .get(id)
            .ok_or_else(|| LightError::UnknownLight { id: id.to_string() })
    }

    fn available(&self, id: &str) -> Result<&VirtualLight, LightError> {
        let light = self.light(id)?;
        if !light.is_available() {
            return Err(LightError::Unavailable { id: id.to_string() });
        }
        Ok(light)
    }

    fn announce(&self, id: &str) {
        tracing::debug!(light = %id, "light changed");
        // no receivers is fine
        let _ = self.changes.send(id.to_string());
    }

    fn switch(
        &self,
        ids: &[LightId],
        apply: impl Fn(&VirtualLight) -> bool,
    ) -> Result<(), LightError> {
        let targets = ids
            .iter()
            .map(|id| self.available(id))
            .collect::<Result<Vec<_>, _>>()?;
        for light in targets {
            if apply(light) {
                self.announce(light.id());
            }
        }
        Ok(())
    }
}

impl LightControl for VirtualLights {
    fn turn_on(
        &self,
        lights: Vec<LightId>,
        attributes: Attributes,
    ) -> impl Future<Output = Result<(), ZonelightError>> + Send {
        let result = self
            .switch(&lights, |light| light.turn_on(attributes.clone()))
            .map_err(ZonelightError::from);
        async { result }
    }

    fn turn_off(
        &self,
        lights: Vec<LightId>,
    ) -> impl Future<Output = Result<(), ZonelightError>> + Send {
        let result = self
            .switch(&lights, VirtualLight::turn_off)
            .map_err(ZonelightError::from);
        async { result }
    }

    fn get_state(
        &self,
        light: &str,
    ) -> impl Future<Output = Result<Option<LightState>, ZonelightError>> + Send {
        let state = self.lights.get(light).map(VirtualLight::state);
        async { Ok(state) }
    }
}
