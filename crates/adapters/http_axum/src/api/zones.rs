//! JSON handlers for zones: the zone light, its selects and the save button.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use zonelight_app::ports::{EventPublisher, LightControl, NamedSnapshotStore, ZoneStateStore};
use zonelight_domain::effect_list::effect_list;
use zonelight_domain::light::Attributes;
use zonelight_domain::trigger::DeviceTrigger;
use zonelight_domain::zone::{ListKind, Zone};

use super::zone_id;
use crate::error::ApiError;
use crate::state::AppState;

/// A zone as returned by the API.
#[derive(Serialize)]
pub struct ZoneView {
    #[serde(flatten)]
    pub zone: Zone,
    pub effect_list: Vec<String>,
}

impl From<Zone> for ZoneView {
    fn from(zone: Zone) -> Self {
        let effect_list = effect_list(&zone);
        Self { zone, effect_list }
    }
}

#[derive(Serialize)]
pub struct TriggerView {
    #[serde(flatten)]
    pub trigger: DeviceTrigger,
    pub label: String,
}

/// Request body for turning the zone light on.
///
/// Any key besides `effect` is a light attribute, e.g.
/// `{"effect": "Scene: Relax", "brightness": 120}`.
#[derive(Deserialize)]
pub struct TurnOnRequest {
    #[serde(default)]
    pub effect: Option<String>,
    #[serde(flatten)]
    pub attributes: Attributes,
}

/// Request body for the scene and controller selects.
#[derive(Deserialize)]
pub struct SelectRequest {
    pub value: String,
}

#[derive(Serialize)]
pub struct SaveView {
    pub pending: bool,
}

pub enum ListResponse {
    Ok(Json<Vec<ZoneView>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Response of every endpoint answering with the resulting zone.
pub enum ZoneResponse {
    Ok(Json<ZoneView>),
}

impl IntoResponse for ZoneResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

pub enum EffectsResponse {
    Ok(Json<Vec<String>>),
}

impl IntoResponse for EffectsResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

pub enum TriggersResponse {
    Ok(Json<Vec<TriggerView>>),
}

impl IntoResponse for TriggersResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

pub enum SaveResponse {
    Accepted(Json<SaveView>),
}

impl IntoResponse for SaveResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Accepted(json) => (StatusCode::ACCEPTED, json).into_response(),
        }
    }
}

/// `GET /api/zones`
pub async fn list<L, N, P, S>(State(state): State<AppState<L, N, P, S>>) -> ListResponse
where
    L: LightControl + Send + Sync + 'static,
    N: NamedSnapshotStore + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
    S: ZoneStateStore + Send + Sync + 'static,
{
    let zones = state
        .registry
        .list()
        .await
        .iter()
        .map(|coordinator| ZoneView::from(coordinator.zone()))
        .collect();
    ListResponse::Ok(Json(zones))
}

/// `GET /api/zones/{id}`
pub async fn get<L, N, P, S>(
    State(state): State<AppState<L, N, P, S>>,
    Path(id): Path<String>,
) -> Result<ZoneResponse, ApiError>
where
    L: LightControl + Send + Sync + 'static,
    N: NamedSnapshotStore + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
    S: ZoneStateStore + Send + Sync + 'static,
{
    let coordinator = state.registry.get(zone_id(&id)).await?;
    Ok(ZoneResponse::Ok(Json(coordinator.zone().into())))
}

/// `GET /api/zones/{id}/effects`
pub async fn effects<L, N, P, S>(
    State(state): State<AppState<L, N, P, S>>,
    Path(id): Path<String>,
) -> Result<EffectsResponse, ApiError>
where
    L: LightControl + Send + Sync + 'static,
    N: NamedSnapshotStore + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
    S: ZoneStateStore + Send + Sync + 'static,
{
    let coordinator = state.registry.get(zone_id(&id)).await?;
    Ok(EffectsResponse::Ok(Json(coordinator.effect_list())))
}

/// `GET /api/zones/{id}/triggers`
pub async fn triggers<L, N, P, S>(
    State(state): State<AppState<L, N, P, S>>,
    Path(id): Path<String>,
) -> Result<TriggersResponse, ApiError>
where
    L: LightControl + Send + Sync + 'static,
    N: NamedSnapshotStore + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
    S: ZoneStateStore + Send + Sync + 'static,
{
    let triggers = state
        .registry
        .triggers(zone_id(&id))
        .await?
        .into_iter()
        .map(|trigger| TriggerView {
            label: trigger.label(),
            trigger,
        })
        .collect();
    Ok(TriggersResponse::Ok(Json(triggers)))
}

/// `POST /api/zones/{id}/turn_on`
pub async fn turn_on<L, N, P, S>(
    State(state): State<AppState<L, N, P, S>>,
    Path(id): Path<String>,
    body: Result<Json<TurnOnRequest>, JsonRejection>,
) -> Result<ZoneResponse, ApiError>
where
    L: LightControl + Send + Sync + 'static,
    N: NamedSnapshotStore + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
    S: ZoneStateStore + Send + Sync + 'static,
{
    let Json(req) = body?;
    let coordinator = state.registry.get(zone_id(&id)).await?;
    coordinator.turn_on(req.effect.as_deref(), req.attributes);
    Ok(ZoneResponse::Ok(Json(coordinator.zone().into())))
}

/// `POST /api/zones/{id}/turn_off`
pub async fn turn_off<L, N, P, S>(
    State(state): State<AppState<L, N, P, S>>,
    Path(id): Path<String>,
) -> Result<ZoneResponse, ApiError>
where
    L: LightControl + Send + Sync + 'static,
    N: NamedSnapshotStore + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
    S: ZoneStateStore + Send + Sync + 'static,
{
    let coordinator = state.registry.get(zone_id(&id)).await?;
    coordinator.turn_off();
    Ok(ZoneResponse::Ok(Json(coordinator.zone().into())))
}

/// `PUT /api/zones/{id}/scene`
///
/// Unknown values leave the zone unchanged.
pub async fn select_scene<L, N, P, S>(
    state: State<AppState<L, N, P, S>>,
    id: Path<String>,
    body: Result<Json<SelectRequest>, JsonRejection>,
) -> Result<ZoneResponse, ApiError>
where
    L: LightControl + Send + Sync + 'static,
    N: NamedSnapshotStore + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
    S: ZoneStateStore + Send + Sync + 'static,
{
    select(state, id, ListKind::Scene, body).await
}

/// `PUT /api/zones/{id}/controller`
pub async fn select_controller<L, N, P, S>(
    state: State<AppState<L, N, P, S>>,
    id: Path<String>,
    body: Result<Json<SelectRequest>, JsonRejection>,
) -> Result<ZoneResponse, ApiError>
where
    L: LightControl + Send + Sync + 'static,
    N: NamedSnapshotStore + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
    S: ZoneStateStore + Send + Sync + 'static,
{
    select(state, id, ListKind::Controller, body).await
}

/// `POST /api/zones/{id}/scene/rollback`
pub async fn rollback_scene<L, N, P, S>(
    state: State<AppState<L, N, P, S>>,
    id: Path<String>,
) -> Result<ZoneResponse, ApiError>
where
    L: LightControl + Send + Sync + 'static,
    N: NamedSnapshotStore + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
    S: ZoneStateStore + Send + Sync + 'static,
{
    rollback(state, id, ListKind::Scene).await
}

/// `POST /api/zones/{id}/controller/rollback`
pub async fn rollback_controller<L, N, P, S>(
    state: State<AppState<L, N, P, S>>,
    id: Path<String>,
) -> Result<ZoneResponse, ApiError>
where
    L: LightControl + Send + Sync + 'static,
    N: NamedSnapshotStore + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
    S: ZoneStateStore + Send + Sync + 'static,
{
    rollback(state, id, ListKind::Controller).await
}

/// `POST /api/zones/{id}/save`
///
/// Schedules a debounced capture of the current scene. Nothing is scheduled
/// while the zone is off, which `pending` reflects.
pub async fn save<L, N, P, S>(
    State(state): State<AppState<L, N, P, S>>,
    Path(id): Path<String>,
) -> Result<SaveResponse, ApiError>
where
    L: LightControl + Send + Sync + 'static,
    N: NamedSnapshotStore + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
    S: ZoneStateStore + Send + Sync + 'static,
{
    let coordinator = state.registry.get(zone_id(&id)).await?;
    coordinator.save();
    Ok(SaveResponse::Accepted(Json(SaveView {
        pending: coordinator.is_save_pending(),
    })))
}

async fn select<L, N, P, S>(
    State(state): State<AppState<L, N, P, S>>,
    Path(id): Path<String>,
    list: ListKind,
    body: Result<Json<SelectRequest>, JsonRejection>,
) -> Result<ZoneResponse, ApiError>
where
    L: LightControl + Send + Sync + 'static,
    N: NamedSnapshotStore + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
    S: ZoneStateStore + Send + Sync + 'static,
{
    let Json(req) = body?;
    let coordinator = state.registry.get(zone_id(&id)).await?;
    if !coordinator.select(list, &req.value) {
        tracing::debug!(zone = %coordinator.name(), list = %list, value = %req.value, "selection unchanged");
    }
    Ok(ZoneResponse::Ok(Json(coordinator.zone().into())))
}

async fn rollback<L, N, P, S>(
    State(state): State<AppState<L, N, P, S>>,
    Path(id): Path<String>,
    list: ListKind,
) -> Result<ZoneResponse, ApiError>
where
    L: LightControl + Send + Sync + 'static,
    N: NamedSnapshotStore + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
    S: ZoneStateStore + Send + Sync + 'static,
{
    let coordinator = state.registry.get(zone_id(&id)).await?;
    coordinator.rollback(list);
    Ok(ZoneResponse::Ok(Json(coordinator.zone().into())))
}
