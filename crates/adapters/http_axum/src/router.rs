//! Axum router assembly.

use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use zonelight_app::ports::{EventPublisher, LightControl, NamedSnapshotStore, ZoneStateStore};

use crate::state::AppState;

/// Build the top-level axum [`Router`].
///
/// Nests the API under `/api` and traces every request through a
/// [`TraceLayer`].
pub fn build<L, N, P, S>(state: AppState<L, N, P, S>) -> Router
where
    L: LightControl + Send + Sync + 'static,
    N: NamedSnapshotStore + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
    S: ZoneStateStore + Send + Sync + 'static,
{
    Router::new()
        .route("/health", get(health_check))
        .nest("/api", crate::api::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;
    use zonelight_app::debounce::DebounceConfig;
    use zonelight_app::services::zone_coordinator::ZonePorts;
    use zonelight_app::services::zone_registry::ZoneRegistry;
    use zonelight_domain::config::ZoneConfig;
    use zonelight_domain::error::ZonelightError;
    use zonelight_domain::event::SceneEvent;
    use zonelight_domain::id::ZoneId;
    use zonelight_domain::light::{Attributes, LightId, LightState};
    use zonelight_domain::snapshot::SceneSnapshot;
    use zonelight_domain::zone::ZoneState;

    struct StubLights;
    struct StubSnapshots;
    struct StubPublisher;
    struct StubStates;

    impl LightControl for StubLights {
        async fn turn_on(
            &self,
            _lights: Vec<LightId>,
            _attributes: Attributes,
        ) -> Result<(), ZonelightError> {
            Ok(())
        }
        async fn turn_off(&self, _lights: Vec<LightId>) -> Result<(), ZonelightError> {
            Ok(())
        }
        async fn get_state(&self, _light: &str) -> Result<Option<LightState>, ZonelightError> {
            Ok(None)
        }
    }

    impl NamedSnapshotStore for StubSnapshots {
        async fn save(&self, _name: &str, _snapshot: SceneSnapshot) -> Result<(), ZonelightError> {
            Ok(())
        }
        async fn load(&self, _name: &str) -> Result<Option<SceneSnapshot>, ZonelightError> {
            Ok(None)
        }
    }

    impl EventPublisher for StubPublisher {
        async fn publish(&self, _event: SceneEvent) -> Result<(), ZonelightError> {
            Ok(())
        }
    }

    impl ZoneStateStore for StubStates {
        async fn load(&self, _zone: ZoneId) -> Result<Option<ZoneState>, ZonelightError> {
            Ok(None)
        }
        async fn save(&self, _zone: ZoneId, _state: ZoneState) -> Result<(), ZonelightError> {
            Ok(())
        }
        async fn delete(&self, _zone: ZoneId) -> Result<(), ZonelightError> {
            Ok(())
        }
    }

    async fn test_app() -> Router {
        let ports = ZonePorts::new(
            Arc::new(StubLights),
            Arc::new(StubSnapshots),
            Arc::new(StubPublisher),
        );
        let registry = ZoneRegistry::new(ports, Arc::new(StubStates), DebounceConfig::default());
        let config = ZoneConfig::builder()
            .name("Living Room")
            .light("light.sofa")
            .light("light.desk")
            .scene("Relax")
            .event_scene("Party")
            .controller("Remote")
            .build()
            .unwrap();
        registry.create(config).await.unwrap();
        build(AppState::new(Arc::new(registry)))
    }

    async fn send(app: Router, method: &str, uri: &str, body: Option<&str>) -> axum::response::Response {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        app.oneshot(request).await.unwrap()
    }

    async fn json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn should_return_ok_when_health_check_called() {
        let response = send(test_app().await, "GET", "/health", None).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn should_list_configured_zones() {
        let response = send(test_app().await, "GET", "/api/zones", None).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = json(response).await;
        let zones = body.as_array().unwrap();
        assert_eq!(zones.len(), 1);
        assert_eq!(zones[0]["name"], "Living Room");
        assert_eq!(zones[0]["powered"], false);
        assert_eq!(
            zones[0]["scene"]["options"],
            serde_json::json!(["Manual", "Relax", "Party"])
        );
    }

    #[tokio::test]
    async fn should_return_not_found_for_unknown_zone() {
        let response = send(test_app().await, "GET", "/api/zones/attic", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn should_resolve_zone_by_slugged_name() {
        let response = send(test_app().await, "GET", "/api/zones/living_room", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json(response).await["name"], "Living Room");
    }

    #[tokio::test]
    async fn should_select_scene_from_turn_on_effect() {
        let response = send(
            test_app().await,
            "POST",
            "/api/zones/living_room/turn_on",
            Some(r#"{"effect": "Scene: Relax", "brightness": 120}"#),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = json(response).await;
        assert_eq!(body["powered"], true);
        assert_eq!(body["scene"]["current"], "Relax");
        assert!(
            body["effect_list"]
                .as_array()
                .unwrap()
                .contains(&serde_json::json!("Scene: Relax ✅"))
        );
    }

    #[tokio::test]
    async fn should_reject_malformed_body() {
        let response = send(
            test_app().await,
            "POST",
            "/api/zones/living_room/turn_on",
            Some("not json"),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn should_ignore_unknown_selection() {
        let app = test_app().await;
        let response = send(
            app.clone(),
            "PUT",
            "/api/zones/living_room/controller",
            Some(r#"{"value": "Remote"}"#),
        )
        .await;
        assert_eq!(json(response).await["controller"]["current"], "Remote");

        let response = send(
            app,
            "PUT",
            "/api/zones/living_room/controller",
            Some(r#"{"value": "Nope"}"#),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json(response).await["controller"]["current"], "Remote");
    }

    #[tokio::test]
    async fn should_roll_back_scene() {
        let app = test_app().await;
        for scene in ["Relax", "Party"] {
            let body = format!(r#"{{"value": "{scene}"}}"#);
            send(app.clone(), "PUT", "/api/zones/living_room/scene", Some(&body)).await;
        }

        let response = send(app, "POST", "/api/zones/living_room/scene/rollback", None).await;
        let body = json(response).await;
        assert_eq!(body["scene"]["current"], "Relax");
        assert_eq!(body["scene"]["previous"], "Party");
    }

    #[tokio::test]
    async fn should_list_event_scene_triggers() {
        let response = send(test_app().await, "GET", "/api/zones/living_room/triggers", None).await;
        let body = json(response).await;
        let labels: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|trigger| trigger["label"].as_str().unwrap())
            .collect();
        assert_eq!(labels, ["Scene Party activated", "Scene Party deactivated"]);
    }

    #[tokio::test]
    async fn should_not_activate_scene_without_snapshot() {
        let response = send(
            test_app().await,
            "POST",
            "/api/zones/living_room/scenes/Relax/activate",
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn should_store_snapshot_then_activate_scene() {
        let app = test_app().await;
        let response = send(
            app.clone(),
            "PUT",
            "/api/zones/living_room/scenes/Relax/snapshot",
            Some(r#"{"light.sofa": {"state": "on", "brightness": 40}}"#),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = send(
            app.clone(),
            "GET",
            "/api/zones/living_room/scenes/Relax/snapshot",
            None,
        )
        .await;
        assert_eq!(json(response).await["light.sofa"]["brightness"], 40);

        let response = send(
            app,
            "POST",
            "/api/zones/living_room/scenes/Relax/activate",
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json(response).await["scene"]["current"], "Relax");
    }

    #[tokio::test]
    async fn should_refuse_snapshot_for_event_scene() {
        let response = send(
            test_app().await,
            "PUT",
            "/api/zones/living_room/scenes/Party/snapshot",
            Some(r#"{"light.sofa": {"state": "off"}}"#),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn should_not_schedule_save_while_off() {
        let response = send(test_app().await, "POST", "/api/zones/living_room/save", None).await;
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert_eq!(json(response).await["pending"], false);
    }
}
