//! Shared test utilities: in-memory provider fakes and bus helpers.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::{broadcast, Mutex, RwLock};
use tokio::time::timeout;

use salao24h_engine::bus::{create_bus, AppEvent, SharedBus};
use salao24h_engine::error::{AuthError, MutationError, ProviderError};
use salao24h_engine::models::{
    Appointment, AppointmentStatus, Client, ClientAccount, Collections, NewAppointment, PlanTier,
    Principal, Role, StaffUser, Unit,
};
use salao24h_engine::providers::{AuthProvider, DataProvider, SubscriptionStatus};

// =============================================================================
// Bus helpers
// =============================================================================

pub fn test_bus() -> (SharedBus, broadcast::Receiver<AppEvent>) {
    let bus = create_bus();
    let rx = bus.subscribe();
    (bus, rx)
}

/// Wait for a specific event type with timeout
pub async fn expect_event<F>(
    rx: &mut broadcast::Receiver<AppEvent>,
    predicate: F,
    timeout_ms: u64,
) -> Option<AppEvent>
where
    F: Fn(&AppEvent) -> bool,
{
    let deadline = Duration::from_millis(timeout_ms);
    match timeout(deadline, async {
        loop {
            match rx.recv().await {
                Ok(event) if predicate(&event) => return Some(event),
                Ok(_) => continue,
                Err(_) => return None,
            }
        }
    })
    .await
    {
        Ok(event) => event,
        Err(_) => None,
    }
}

// =============================================================================
// Fixture builders
// =============================================================================

pub fn staff_user(name: &str) -> StaffUser {
    StaffUser {
        name: name.to_string(),
        email: format!("{}@salao.test", name.to_lowercase()),
        avatar_url: None,
        role: Role::Admin,
        plan: PlanTier::Profissional,
        unit_name: None,
    }
}

pub fn client_account(id: i64, name: &str) -> ClientAccount {
    ClientAccount {
        id,
        name: name.to_string(),
        email: format!("{}@cliente.test", name.to_lowercase()),
        phone: None,
        preferred_unit: None,
    }
}

pub fn unit(id: i64, name: &str) -> Unit {
    Unit {
        id,
        name: name.to_string(),
        address: None,
        phone: None,
    }
}

pub fn appointment(id: i64, unit_name: Option<&str>) -> Appointment {
    Appointment {
        id,
        client_id: None,
        client_name: "Ana".to_string(),
        professional_name: "Bia".to_string(),
        service_name: "Corte".to_string(),
        date: NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
        time: "10:00".to_string(),
        status: AppointmentStatus::Scheduled,
        unit_name: unit_name.map(str::to_string),
    }
}

// =============================================================================
// Auth provider fake
// =============================================================================

pub struct MockAuthProvider {
    email: String,
    password: String,
    principal: Option<Principal>,
    restored: Option<Principal>,
    /// When true, every call fails as if the backend were down.
    pub unreachable: bool,
}

impl MockAuthProvider {
    pub fn with_principal(email: &str, password: &str, principal: Principal) -> Arc<Self> {
        Arc::new(Self {
            email: email.to_string(),
            password: password.to_string(),
            principal: Some(principal),
            restored: None,
            unreachable: false,
        })
    }

    pub fn anonymous() -> Arc<Self> {
        Arc::new(Self {
            email: String::new(),
            password: String::new(),
            principal: None,
            restored: None,
            unreachable: false,
        })
    }

    pub fn unreachable() -> Arc<Self> {
        Arc::new(Self {
            email: String::new(),
            password: String::new(),
            principal: None,
            restored: None,
            unreachable: true,
        })
    }

    pub fn with_restored(principal: Principal) -> Arc<Self> {
        Arc::new(Self {
            email: String::new(),
            password: String::new(),
            principal: None,
            restored: Some(principal),
            unreachable: false,
        })
    }
}

#[async_trait]
impl AuthProvider for MockAuthProvider {
    async fn login(
        &self,
        email: &str,
        password: &str,
        _remember: bool,
    ) -> Result<Principal, AuthError> {
        if self.unreachable {
            return Err(AuthError::Provider(ProviderError::Timeout));
        }
        match &self.principal {
            Some(principal) if email == self.email && password == self.password => {
                Ok(principal.clone())
            }
            _ => Err(AuthError::InvalidCredentials),
        }
    }

    async fn logout(&self) -> Result<(), ProviderError> {
        if self.unreachable {
            return Err(ProviderError::Transport("connection refused".to_string()));
        }
        Ok(())
    }

    async fn restore_session(&self) -> Result<Option<Principal>, ProviderError> {
        if self.unreachable {
            return Err(ProviderError::Timeout);
        }
        Ok(self.restored.clone())
    }
}

// =============================================================================
// Data provider fake
// =============================================================================

#[derive(Default)]
pub struct MockDataProvider {
    pub collections: RwLock<Collections>,
    pub selected_unit_calls: Mutex<Vec<i64>>,
    pub subscription: RwLock<Option<SubscriptionStatus>>,
}

impl MockDataProvider {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub async fn selected_unit_calls(&self) -> Vec<i64> {
        self.selected_unit_calls.lock().await.clone()
    }
}

#[async_trait]
impl DataProvider for MockDataProvider {
    async fn fetch_collections(&self) -> Result<Collections, ProviderError> {
        Ok(self.collections.read().await.clone())
    }

    async fn set_selected_unit_id(&self, unit_id: i64) -> Result<(), ProviderError> {
        self.selected_unit_calls.lock().await.push(unit_id);
        Ok(())
    }

    async fn create_appointment(
        &self,
        appointment: NewAppointment,
    ) -> Result<Appointment, MutationError> {
        Ok(Appointment {
            id: 1,
            client_id: appointment.client_id,
            client_name: appointment.client_name,
            professional_name: appointment.professional_name,
            service_name: appointment.service_name,
            date: appointment.date,
            time: appointment.time,
            status: AppointmentStatus::Scheduled,
            unit_name: appointment.unit_name,
        })
    }

    async fn save_client(&self, client: Client) -> Result<Client, MutationError> {
        Ok(client)
    }

    async fn delete_client(&self, _client_id: i64) -> Result<(), MutationError> {
        Ok(())
    }

    async fn toggle_promotion(
        &self,
        _promotion_id: i64,
        _active: bool,
    ) -> Result<(), MutationError> {
        Ok(())
    }

    async fn subscription_status(&self) -> Result<SubscriptionStatus, ProviderError> {
        Ok(self
            .subscription
            .read()
            .await
            .clone()
            .unwrap_or(SubscriptionStatus::Active))
    }
}
