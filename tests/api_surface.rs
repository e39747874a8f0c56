//! HTTP surface tests over an in-memory coordinator with provider fakes.
//!
//! Spins the real router on an ephemeral port and drives it with reqwest,
//! the same way the UI shell does.

use std::sync::Arc;

use salao24h_engine::api::{AppState, router};
use salao24h_engine::bus::{create_bus, SharedBus};
use salao24h_engine::coordinator::SessionCoordinator;
use salao24h_engine::models::{Collections, Principal};
use salao24h_engine::providers::SubscriptionStatus;

mod common;

use common::{staff_user, unit, MockAuthProvider, MockDataProvider};

async fn spawn_app(
    auth: Arc<MockAuthProvider>,
) -> (String, Arc<SessionCoordinator>, Arc<MockDataProvider>, SharedBus) {
    let bus = create_bus();
    let data = MockDataProvider::new();
    let coordinator = Arc::new(SessionCoordinator::new(auth, data.clone(), bus.clone()));

    let app = router(AppState::new(coordinator.clone(), bus.clone()));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}"), coordinator, data, bus)
}

#[tokio::test]
async fn status_reports_service_and_screen() {
    let (base, _, _, _) = spawn_app(MockAuthProvider::anonymous()).await;

    let body: serde_json::Value = reqwest::get(format!("{base}/status"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["service"], "salao24h-engine");
    assert_eq!(body["screen"], "home");
    assert_eq!(body["subscription_blocked"], false);
}

#[tokio::test]
async fn navigate_and_back_roundtrip() {
    let (base, _, _, _) = spawn_app(MockAuthProvider::anonymous()).await;
    let client = reqwest::Client::new();

    let snapshot: serde_json::Value = client
        .post(format!("{base}/session/navigate"))
        .json(&serde_json::json!({"screen": "login"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(snapshot["screen"], "login");
    assert_eq!(snapshot["history"][0], "home");

    let snapshot: serde_json::Value = client
        .post(format!("{base}/session/back"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(snapshot["screen"], "home");
    assert_eq!(snapshot["history"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn login_maps_auth_errors_to_401() {
    let auth = MockAuthProvider::with_principal(
        "carla@salao.test",
        "segredo",
        Principal::Staff(staff_user("Carla")),
    );
    let (base, _, _, _) = spawn_app(auth).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{base}/auth/login"))
        .json(&serde_json::json!({"email": "carla@salao.test", "password": "errada"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);

    let response = client
        .post(format!("{base}/auth/login"))
        .json(&serde_json::json!({"email": "carla@salao.test", "password": "segredo"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let snapshot: serde_json::Value = response.json().await.unwrap();
    assert_eq!(snapshot["screen"], "dashboard");
}

#[tokio::test]
async fn unknown_unit_bucket_is_404() {
    let (base, coordinator, _, _) = spawn_app(MockAuthProvider::anonymous()).await;
    coordinator
        .apply_collections(Collections {
            units: vec![unit(1, "Matriz")],
            ..Default::default()
        })
        .await;

    let ok = reqwest::get(format!("{base}/units/Matriz")).await.unwrap();
    assert_eq!(ok.status(), 200);

    let missing = reqwest::get(format!("{base}/units/Inexistente")).await.unwrap();
    assert_eq!(missing.status(), 404);
}

#[tokio::test]
async fn blocked_subscription_rejects_mutations_until_cleared() {
    let (base, coordinator, _, _) = spawn_app(MockAuthProvider::anonymous()).await;
    let client = reqwest::Client::new();
    let appointment = serde_json::json!({
        "client_name": "Ana",
        "professional_name": "Bia",
        "service_name": "Corte",
        "date": "2025-07-01",
        "time": "10:00",
        "unit": "Matriz"
    });

    coordinator
        .update_subscription(SubscriptionStatus::Blocked {
            reason: Some("card expired".to_string()),
        })
        .await;

    let blocked = client
        .post(format!("{base}/appointments"))
        .json(&appointment)
        .send()
        .await
        .unwrap();
    assert_eq!(blocked.status(), 402);

    // Navigation stays available while blocked
    let nav = client
        .post(format!("{base}/session/navigate"))
        .json(&serde_json::json!({"screen": "update_payment_method"}))
        .send()
        .await
        .unwrap();
    assert_eq!(nav.status(), 200);

    coordinator.update_subscription(SubscriptionStatus::Active).await;

    let allowed = client
        .post(format!("{base}/appointments"))
        .json(&appointment)
        .send()
        .await
        .unwrap();
    assert_eq!(allowed.status(), 200);
    let body: serde_json::Value = allowed.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["client_name"], "Ana");
}

#[tokio::test]
async fn units_overview_reports_selected_unit() {
    let (base, coordinator, data, _) = spawn_app(MockAuthProvider::anonymous()).await;
    coordinator
        .apply_collections(Collections {
            units: vec![unit(5, "Matriz"), unit(6, "Filial")],
            ..Default::default()
        })
        .await;

    let body: serde_json::Value = reqwest::get(format!("{base}/units"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["selected_unit"], "Matriz");
    assert_eq!(body["units"].as_array().unwrap().len(), 2);
    assert_eq!(data.selected_unit_calls().await, vec![5]);
}
