//! Port definitions: traits that adapters implement.
//!
//! Ports are the boundaries between the application core and the outside world.
//! They are defined here (in `app`) so that both the use-case layer and the
//! adapter layer can depend on them without creating circular dependencies.

pub mod event_bus;
pub mod light_control;
pub mod snapshot_store;
pub mod zone_state_store;

pub use event_bus::EventPublisher;
pub use light_control::LightControl;
pub use snapshot_store::NamedSnapshotStore;
pub use zone_state_store::ZoneStateStore;
