//! # zonelight-domain
//!
//! Pure domain model for the zonelight zone controller.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions
//! - Define **light states** and **snapshots** (captured per-light attributes)
//! - Define **zone configuration** and its validation rules
//! - Define the **zone state machine** (power, scene and controller
//!   selection, per-scene snapshots) and the side effects it requests
//! - Define **scene events** and the **device triggers** matching them
//! - Format and parse the zone light's effect list
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;

pub mod config;
pub mod effect_list;
pub mod event;
pub mod light;
pub mod snapshot;
pub mod trigger;
pub mod zone;

/// Reserved list entry meaning "no managed scene or controller is active".
pub const MANUAL: &str = "Manual";
