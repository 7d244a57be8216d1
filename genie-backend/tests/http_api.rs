//! Integration tests for the backend HTTP interface.
//!
//! These tests start a real server on a free port and talk to it with
//! `reqwest`, decoding replies with the shared wire types.

use genie_api::wire::*;
use genie_api::{Device, DeviceId, DeviceKind, DeviceUpdate};
use genie_backend::{BackendConfig, BackendServer};
use serde_json::json;

async fn start() -> (BackendServer, reqwest::Client) {
    let server = BackendServer::start(BackendConfig::ephemeral())
        .await
        .expect("Failed to start backend");
    (server, reqwest::Client::new())
}

#[tokio::test]
async fn test_devices_snapshot() {
    let (server, client) = start().await;

    let reply: DevicesResponse = client
        .get(format!("{}/devices", server.api_url()))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(reply.devices.len(), 8);
    assert_eq!(
        reply.devices.values().filter(|d| d.kind() == DeviceKind::Light).count(),
        3
    );
    server.shutdown().await;
}

#[tokio::test]
async fn test_update_device() {
    let (server, client) = start().await;
    let url = format!("{}/device/update", server.api_url());

    let reply: DeviceStateResponse = client
        .post(&url)
        .json(&DeviceUpdateRequest {
            device_id: DeviceId::from("light_kitchen"),
            updates: DeviceUpdate::new().on(true).brightness(55),
        })
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(matches!(
        reply.state,
        Device::Light(ref light) if light.on && light.brightness == 55 && light.name == "Kitchen Light"
    ));

    // Unknown device
    let response = client
        .post(&url)
        .json(&json!({"device_id": "fridge", "updates": {"on": true}}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
    let error: ErrorResponse = response.json().await.unwrap();
    assert_eq!(error.detail, "Device fridge not found");

    // Out of range
    let response = client
        .post(&url)
        .json(&json!({"device_id": "ac_main", "updates": {"temperature": 35}}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    server.shutdown().await;
}

#[tokio::test]
async fn test_scene_and_unknown_scene() {
    let (server, client) = start().await;
    let url = format!("{}/device/scene", server.api_url());

    let reply: SceneResponse = client
        .post(&url)
        .json(&SceneRequest {
            scene_name: "Movie Mode".to_string(),
        })
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(reply.devices.len(), 8);
    assert!(matches!(
        reply.devices.get(&DeviceId::from("light_living_room")),
        Some(Device::Light(light)) if light.brightness == 20 && light.color == "#4B0082"
    ));

    let response = client
        .post(&url)
        .json(&json!({"scene_name": "Party"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
    let error: ErrorResponse = response.json().await.unwrap();
    assert_eq!(error.detail, "Unknown scene: Party");

    server.shutdown().await;
}

#[tokio::test]
async fn test_moods() {
    let (server, client) = start().await;
    let api = server.api_url();

    let moods: MoodsResponse = client
        .get(format!("{}/moods", api))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(moods.moods.len(), 6);
    assert_eq!(moods.current_mood, "Relax");

    let set: MoodSetResponse = client
        .post(format!("{}/mood/set", api))
        .json(&MoodRequest {
            mood_name: "Sleep".to_string(),
        })
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(set.theme_vars.get("accentColor"), Some("#483D8B"));
    assert!(matches!(
        set.device_states.get(&DeviceId::from("ac_main")),
        Some(Device::Ac(ac)) if ac.temperature == 20
    ));

    let current: CurrentMoodResponse = client
        .get(format!("{}/mood/current", api))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(current.current_mood.as_deref(), Some("Sleep"));
    assert_eq!(current.theme_vars, set.theme_vars);

    let response = client
        .post(format!("{}/mood/set", api))
        .json(&json!({"mood_name": "Party"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
    let error: ErrorResponse = response.json().await.unwrap();
    assert!(error.detail.starts_with("Unknown mood 'Party'. Available moods: Relax"));

    let response = client
        .get(format!("{}/mood/preview/Party", api))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);

    server.shutdown().await;
}

#[tokio::test]
async fn test_talk() {
    let (server, client) = start().await;
    let url = format!("{}/talk", server.api_url());

    let reply: TalkResponse = client
        .post(&url)
        .json(&TalkRequest {
            message: "Turn on all lights".to_string(),
        })
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let changes = reply.device_changes.expect("device changes");
    let ids: Vec<&str> = changes.devices_updated.keys().map(DeviceId::as_str).collect();
    assert_eq!(ids, vec!["light_bedroom", "light_kitchen", "light_living_room"]);
    assert!(reply.response.contains("turned on kitchen light"));

    let response = client
        .post(&url)
        .json(&json!({"message": "   "}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    server.shutdown().await;
}

#[tokio::test]
async fn test_health_at_root() {
    let (server, client) = start().await;

    let health: HealthResponse = client
        .get(format!("{}/health", server.base_url()))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health.status, "healthy");

    let response = client
        .get(format!("{}/nowhere", server.api_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);

    server.shutdown().await;
}
