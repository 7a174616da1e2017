//! Named snapshot port: snapshots kept outside the zone, addressed by name.

use std::future::Future;

use zonelight_domain::error::ZonelightError;
use zonelight_domain::snapshot::SceneSnapshot;

/// Stores scene snapshots under an external name such as
/// `zone_lighting_living_room_relax`.
pub trait NamedSnapshotStore {
    /// Create or replace the snapshot stored under `name`.
    fn save(
        &self,
        name: &str,
        snapshot: SceneSnapshot,
    ) -> impl Future<Output = Result<(), ZonelightError>> + Send;

    /// Load the snapshot stored under `name`, if any.
    fn load(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Option<SceneSnapshot>, ZonelightError>> + Send;
}

impl<T: NamedSnapshotStore + Send + Sync> NamedSnapshotStore for std::sync::Arc<T> {
    fn save(
        &self,
        name: &str,
        snapshot: SceneSnapshot,
    ) -> impl Future<Output = Result<(), ZonelightError>> + Send {
        (**self).save(name, snapshot)
    }

    fn load(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Option<SceneSnapshot>, ZonelightError>> + Send {
        (**self).load(name)
    }
}
