//! Provider contracts for the external Salão24h backend.
//!
//! The engine consumes two collaborators: the auth provider (principal
//! lifecycle) and the data provider (entity collections and mutators). The
//! traits keep the coordinator testable against in-memory fakes; the HTTP
//! implementations live in [`http`], the background refresh loop in
//! [`sync`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{AuthError, MutationError, ProviderError};
use crate::models::{Appointment, Client, Collections, NewAppointment, Principal};

pub mod http;
pub mod sync;

pub use http::{build_client, HttpAuthProvider, HttpDataProvider};
pub use sync::{RetryConfig, SyncTask};

/// Subscription standing as reported by the backend account-status check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Active,
    Blocked {
        #[serde(default)]
        reason: Option<String>,
    },
}

/// Principal lifecycle against the backend.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Authenticate with credentials. Invalid credentials surface as
    /// [`AuthError::InvalidCredentials`] and are never fatal.
    async fn login(
        &self,
        email: &str,
        password: &str,
        remember: bool,
    ) -> Result<Principal, AuthError>;

    /// Tear down the backend session.
    async fn logout(&self) -> Result<(), ProviderError>;

    /// Resolve a remembered session, if the backend still honors one.
    async fn restore_session(&self) -> Result<Option<Principal>, ProviderError>;
}

/// Entity collections and mutators.
#[async_trait]
pub trait DataProvider: Send + Sync {
    /// Fetch every collection scoped to the active unit.
    async fn fetch_collections(&self) -> Result<Collections, ProviderError>;

    /// Tell the backend which unit subsequent fetches should filter by.
    async fn set_selected_unit_id(&self, unit_id: i64) -> Result<(), ProviderError>;

    async fn create_appointment(
        &self,
        appointment: NewAppointment,
    ) -> Result<Appointment, MutationError>;

    async fn save_client(&self, client: Client) -> Result<Client, MutationError>;

    async fn delete_client(&self, client_id: i64) -> Result<(), MutationError>;

    async fn toggle_promotion(&self, promotion_id: i64, active: bool)
        -> Result<(), MutationError>;

    /// Account standing; drives the subscription-blocked overlay.
    async fn subscription_status(&self) -> Result<SubscriptionStatus, ProviderError>;
}
