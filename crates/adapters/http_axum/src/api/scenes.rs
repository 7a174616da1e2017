//! JSON handlers for scene activation and per-scene snapshots.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};

use zonelight_app::ports::{EventPublisher, LightControl, NamedSnapshotStore, ZoneStateStore};
use zonelight_domain::error::{NotFoundError, ValidationError, ZonelightError};
use zonelight_domain::snapshot::SceneSnapshot;

use super::zone_id;
use super::zones::{ZoneResponse, ZoneView};
use crate::error::ApiError;
use crate::state::AppState;

pub enum SnapshotResponse {
    Ok(Json<SceneSnapshot>),
}

impl IntoResponse for SnapshotResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

fn missing_snapshot(scene: &str) -> ApiError {
    ApiError::from(ZonelightError::from(NotFoundError {
        entity: "Snapshot",
        id: scene.to_string(),
    }))
}

/// `POST /api/zones/{id}/scenes/{scene}/activate`
///
/// Applies the saved snapshot to the lights, then selects the scene.
pub async fn activate<L, N, P, S>(
    State(state): State<AppState<L, N, P, S>>,
    Path((id, scene)): Path<(String, String)>,
) -> Result<ZoneResponse, ApiError>
where
    L: LightControl + Send + Sync + 'static,
    N: NamedSnapshotStore + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
    S: ZoneStateStore + Send + Sync + 'static,
{
    let coordinator = state.registry.get(zone_id(&id)).await?;
    if !coordinator.activate_scene(&scene) {
        return Err(missing_snapshot(&scene));
    }
    Ok(ZoneResponse::Ok(Json(ZoneView::from(coordinator.zone()))))
}

/// `GET /api/zones/{id}/scenes/{scene}/snapshot`
pub async fn get_snapshot<L, N, P, S>(
    State(state): State<AppState<L, N, P, S>>,
    Path((id, scene)): Path<(String, String)>,
) -> Result<SnapshotResponse, ApiError>
where
    L: LightControl + Send + Sync + 'static,
    N: NamedSnapshotStore + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
    S: ZoneStateStore + Send + Sync + 'static,
{
    let coordinator = state.registry.get(zone_id(&id)).await?;
    let snapshot = coordinator
        .snapshot(&scene)
        .ok_or_else(|| missing_snapshot(&scene))?;
    Ok(SnapshotResponse::Ok(Json(snapshot)))
}

/// `PUT /api/zones/{id}/scenes/{scene}/snapshot`
///
/// Only simple scenes hold snapshots. Replacing the snapshot of the current
/// scene of a powered zone restores it right away.
pub async fn set_snapshot<L, N, P, S>(
    State(state): State<AppState<L, N, P, S>>,
    Path((id, scene)): Path<(String, String)>,
    body: Result<Json<SceneSnapshot>, JsonRejection>,
) -> Result<ZoneResponse, ApiError>
where
    L: LightControl + Send + Sync + 'static,
    N: NamedSnapshotStore + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
    S: ZoneStateStore + Send + Sync + 'static,
{
    let Json(snapshot) = body?;
    let coordinator = state.registry.get(zone_id(&id)).await?;
    if !coordinator.zone().is_simple_scene(&scene) {
        return Err(ZonelightError::from(ValidationError::NotSimpleScene { scene }).into());
    }
    coordinator.set_snapshot(&scene, snapshot);
    Ok(ZoneResponse::Ok(Json(coordinator.zone().into())))
}
