//! # zonelight-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve a JSON API over the running zones (`/api/zones`, …): the zone
//!   light, its scene and controller selects, the save button, scene
//!   activation and the device triggers
//! - Map HTTP requests into [`ZoneRegistry`](zonelight_app::services::zone_registry::ZoneRegistry)
//!   and coordinator calls (driving adapter)
//!
//! ## Dependency rule
//! Depends on `zonelight-app` and `zonelight-domain`. Never leaks axum types
//! into the domain.

pub mod api;
pub mod error;
pub mod router;
pub mod state;
