//! Per-unit reconciliation properties.
//!
//! Ownership filtering per the policy table (catalog items with no unit
//! belong everywhere, attendance records with no unit belong nowhere),
//! selected-unit repair with exactly one provider propagation, and
//! idempotent rebuilds.

use std::sync::Arc;

use salao24h_engine::bus::{create_bus, AppEvent};
use salao24h_engine::coordinator::SessionCoordinator;
use salao24h_engine::models::{Client, Collections, Professional, Service};
use salao24h_engine::units::{UnitAggregator, LOADING_PLACEHOLDER};

mod common;

use common::{appointment, expect_event, unit, MockAuthProvider, MockDataProvider};

fn client_preferring(id: i64, name: &str, preferred: Option<&str>) -> Client {
    Client {
        id,
        name: name.to_string(),
        email: None,
        phone: None,
        preferred_unit: preferred.map(str::to_string),
    }
}

fn service(id: i64, name: &str, unit_id: Option<i64>) -> Service {
    Service {
        id,
        name: name.to_string(),
        price: 50.0,
        duration_minutes: Some(30),
        unit_id,
    }
}

#[test]
fn clients_are_bucketed_by_preferred_unit_name() {
    let mut agg = UnitAggregator::new();
    let collections = Collections {
        units: vec![unit(1, "A"), unit(2, "B")],
        clients: vec![
            client_preferring(1, "Ana", Some("A")),
            client_preferring(2, "Bruno", Some("B")),
            client_preferring(3, "Sem Unidade", None),
        ],
        ..Default::default()
    };

    agg.reconcile(&collections);

    let a = agg.bucket("A").unwrap();
    let b = agg.bucket("B").unwrap();
    assert!(a.clients.iter().any(|c| c.name == "Ana"));
    assert!(!b.clients.iter().any(|c| c.name == "Ana"));
    assert!(b.clients.iter().any(|c| c.name == "Bruno"));

    // Attendance-style: no ownership field means the record belongs nowhere
    assert!(!a.clients.iter().any(|c| c.name == "Sem Unidade"));
    assert!(!b.clients.iter().any(|c| c.name == "Sem Unidade"));
}

#[test]
fn unowned_services_appear_in_every_bucket() {
    let mut agg = UnitAggregator::new();
    let collections = Collections {
        units: vec![unit(1, "A"), unit(2, "B")],
        services: vec![
            service(1, "Corte", None),
            service(2, "Coloração", Some(2)),
        ],
        ..Default::default()
    };

    agg.reconcile(&collections);

    // Catalog-style: no unit id means the service is visible everywhere
    for name in ["A", "B"] {
        let bucket = agg.bucket(name).unwrap();
        assert!(
            bucket.services.iter().any(|s| s.name == "Corte"),
            "Corte missing from {name}"
        );
    }
    assert!(!agg.bucket("A").unwrap().services.iter().any(|s| s.name == "Coloração"));
    assert!(agg.bucket("B").unwrap().services.iter().any(|s| s.name == "Coloração"));
}

#[test]
fn professionals_match_by_unit_name_or_id() {
    let mut agg = UnitAggregator::new();
    let collections = Collections {
        units: vec![unit(1, "A"), unit(2, "B")],
        professionals: vec![
            Professional {
                id: 1,
                name: "Por Nome".to_string(),
                specialty: None,
                unit_name: Some("A".to_string()),
                unit_id: None,
            },
            Professional {
                id: 2,
                name: "Por Id".to_string(),
                specialty: None,
                unit_name: None,
                unit_id: Some(2),
            },
        ],
        ..Default::default()
    };

    agg.reconcile(&collections);

    assert!(agg.bucket("A").unwrap().professionals.iter().any(|p| p.name == "Por Nome"));
    assert!(agg.bucket("B").unwrap().professionals.iter().any(|p| p.name == "Por Id"));
    assert!(!agg.bucket("B").unwrap().professionals.iter().any(|p| p.name == "Por Nome"));
}

#[test]
fn ownerless_appointments_belong_to_no_unit() {
    let mut agg = UnitAggregator::new();
    let collections = Collections {
        units: vec![unit(1, "A")],
        appointments: vec![appointment(1, Some("A")), appointment(2, None)],
        ..Default::default()
    };

    agg.reconcile(&collections);

    let bucket = agg.bucket("A").unwrap();
    assert_eq!(bucket.appointments.len(), 1);
    assert_eq!(bucket.appointments[0].id, 1);
}

#[test]
fn reconciliation_is_idempotent() {
    let mut agg = UnitAggregator::new();
    let collections = Collections {
        units: vec![unit(1, "A"), unit(2, "B")],
        clients: vec![client_preferring(1, "Ana", Some("A"))],
        services: vec![service(1, "Corte", None)],
        appointments: vec![appointment(1, Some("B"))],
        ..Default::default()
    };

    agg.reconcile(&collections);
    let first: Vec<_> = ["A", "B"]
        .iter()
        .map(|n| agg.bucket(n).unwrap().clone())
        .collect();

    agg.reconcile(&collections);
    let second: Vec<_> = ["A", "B"]
        .iter()
        .map(|n| agg.bucket(n).unwrap().clone())
        .collect();

    assert_eq!(first, second);
}

#[test]
fn stale_selected_unit_is_repaired_to_first_unit() {
    let mut agg = UnitAggregator::new();
    agg.reconcile(&Collections {
        units: vec![unit(1, "A"), unit(2, "B")],
        ..Default::default()
    });
    assert_eq!(agg.selected_unit(), "A");

    // "A" disappears: the pointer must move to the new first unit
    let change = agg.reconcile(&Collections {
        units: vec![unit(2, "B")],
        ..Default::default()
    });
    assert_eq!(agg.selected_unit(), "B");
    assert_eq!(change.unwrap().unit_id, 2);
}

#[tokio::test]
async fn placeholder_resolves_to_first_unit_with_single_provider_call() {
    let bus = create_bus();
    let mut rx = bus.subscribe();
    let auth = MockAuthProvider::anonymous();
    let data = MockDataProvider::new();
    let coordinator = Arc::new(SessionCoordinator::new(auth, data.clone(), bus));

    // Nothing loaded yet: placeholder pointer
    coordinator.apply_collections(Collections::default()).await;
    assert_eq!(coordinator.selected_unit().await, LOADING_PLACEHOLDER);

    // Units arrive
    let collections = Collections {
        units: vec![unit(5, "Matriz")],
        ..Default::default()
    };
    coordinator.apply_collections(collections.clone()).await;

    assert_eq!(coordinator.selected_unit().await, "Matriz");
    assert_eq!(data.selected_unit_calls().await, vec![5]);

    let event = expect_event(
        &mut rx,
        |e| matches!(e, AppEvent::SelectedUnitChanged { unit_id: 5, .. }),
        500,
    )
    .await;
    assert!(event.is_some());

    // A second refresh with the same units must not call the selector again
    coordinator.apply_collections(collections).await;
    assert_eq!(data.selected_unit_calls().await, vec![5]);
}

#[tokio::test]
async fn bucket_lookup_through_coordinator() {
    let auth = MockAuthProvider::anonymous();
    let data = MockDataProvider::new();
    let coordinator = Arc::new(SessionCoordinator::new(auth, data, create_bus()));

    coordinator
        .apply_collections(Collections {
            units: vec![unit(1, "Matriz"), unit(2, "Filial")],
            clients: vec![client_preferring(1, "Ana", Some("Filial"))],
            ..Default::default()
        })
        .await;

    assert_eq!(
        coordinator.unit_names().await,
        vec!["Filial".to_string(), "Matriz".to_string()]
    );
    let bucket = coordinator.bucket("Filial").await.unwrap();
    assert_eq!(bucket.clients.len(), 1);
    assert!(coordinator.bucket("Inexistente").await.is_none());
}
