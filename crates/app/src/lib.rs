//! # zonelight-app
//!
//! Application layer: use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `LightControl`: switch lights and read their state
//!   - `NamedSnapshotStore`: externally named scene snapshots
//!   - `EventPublisher`: publish scene events
//!   - `ZoneStateStore`: restore-on-restart persistence
//! - Define **driving/inbound** use-cases:
//!   - `ZoneCoordinator`: one zone, its worker queue and debounced captures
//!   - `ZoneRegistry`: zone lifecycle and configuration reconciliation
//! - Provide **in-process infrastructure** (event bus, trigger dispatcher,
//!   debouncer) that doesn't need IO
//!
//! ## Dependency rule
//! Depends on `zonelight-domain` only (plus `tokio` for channels, timers and tasks).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod debounce;
pub mod event_bus;
pub mod ports;
pub mod services;
pub mod trigger_dispatcher;

#[cfg(test)]
mod testing;
