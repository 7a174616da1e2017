//! JSON API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod scenes;
#[allow(clippy::missing_errors_doc)]
pub mod zones;

use std::str::FromStr;

use axum::Router;
use axum::routing::{get, post, put};

use zonelight_app::ports::{EventPublisher, LightControl, NamedSnapshotStore, ZoneStateStore};
use zonelight_domain::id::ZoneId;

use crate::state::AppState;

/// Build the `/api` sub-router.
pub fn routes<L, N, P, S>() -> Router<AppState<L, N, P, S>>
where
    L: LightControl + Send + Sync + 'static,
    N: NamedSnapshotStore + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
    S: ZoneStateStore + Send + Sync + 'static,
{
    Router::new()
        // Zones
        .route("/zones", get(zones::list::<L, N, P, S>))
        .route("/zones/{id}", get(zones::get::<L, N, P, S>))
        .route("/zones/{id}/effects", get(zones::effects::<L, N, P, S>))
        .route("/zones/{id}/triggers", get(zones::triggers::<L, N, P, S>))
        // Zone light
        .route("/zones/{id}/turn_on", post(zones::turn_on::<L, N, P, S>))
        .route("/zones/{id}/turn_off", post(zones::turn_off::<L, N, P, S>))
        // Selects
        .route("/zones/{id}/scene", put(zones::select_scene::<L, N, P, S>))
        .route(
            "/zones/{id}/scene/rollback",
            post(zones::rollback_scene::<L, N, P, S>),
        )
        .route(
            "/zones/{id}/controller",
            put(zones::select_controller::<L, N, P, S>),
        )
        .route(
            "/zones/{id}/controller/rollback",
            post(zones::rollback_controller::<L, N, P, S>),
        )
        // Save button
        .route("/zones/{id}/save", post(zones::save::<L, N, P, S>))
        // Scenes
        .route(
            "/zones/{id}/scenes/{scene}/activate",
            post(scenes::activate::<L, N, P, S>),
        )
        .route(
            "/zones/{id}/scenes/{scene}/snapshot",
            get(scenes::get_snapshot::<L, N, P, S>).put(scenes::set_snapshot::<L, N, P, S>),
        )
}

/// Accept either the zone's UUID or its name, e.g. `living_room`.
fn zone_id(raw: &str) -> ZoneId {
    ZoneId::from_str(raw).unwrap_or_else(|_| ZoneId::from_name(raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_resolve_zone_id_from_uuid_or_name() {
        let id = ZoneId::from_name("Living Room");
        assert_eq!(zone_id(&id.to_string()), id);
        assert_eq!(zone_id("living_room"), id);
        assert_eq!(zone_id("Living Room"), id);
    }
}
