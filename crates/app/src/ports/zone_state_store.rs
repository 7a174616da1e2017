//! Zone state port: restore-on-restart persistence.

use std::future::Future;

use zonelight_domain::error::ZonelightError;
use zonelight_domain::id::ZoneId;
use zonelight_domain::zone::ZoneState;

/// Keeps the last known state of every zone.
pub trait ZoneStateStore {
    /// Load the last saved state of a zone.
    fn load(
        &self,
        zone: ZoneId,
    ) -> impl Future<Output = Result<Option<ZoneState>, ZonelightError>> + Send;

    /// Create or replace the saved state of a zone.
    fn save(
        &self,
        zone: ZoneId,
        state: ZoneState,
    ) -> impl Future<Output = Result<(), ZonelightError>> + Send;

    /// Forget a zone. Deleting an unknown zone succeeds.
    fn delete(&self, zone: ZoneId) -> impl Future<Output = Result<(), ZonelightError>> + Send;
}

impl<T: ZoneStateStore + Send + Sync> ZoneStateStore for std::sync::Arc<T> {
    fn load(
        &self,
        zone: ZoneId,
    ) -> impl Future<Output = Result<Option<ZoneState>, ZonelightError>> + Send {
        (**self).load(zone)
    }

    fn save(
        &self,
        zone: ZoneId,
        state: ZoneState,
    ) -> impl Future<Output = Result<(), ZonelightError>> + Send {
        (**self).save(zone, state)
    }

    fn delete(&self, zone: ZoneId) -> impl Future<Output = Result<(), ZonelightError>> + Send {
        (**self).delete(zone)
    }
}
