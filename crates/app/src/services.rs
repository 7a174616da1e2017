//! Application services: use-case implementations.
//!
//! Services receive port implementations through generic parameters
//! (constructor injection), keeping this layer decoupled from concrete adapters.

pub mod zone_coordinator;
pub mod zone_registry;
