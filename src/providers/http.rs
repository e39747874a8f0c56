//! HTTP implementations of the provider contracts.
//!
//! Thin reqwest clients over the Salão24h REST backend. Every request runs
//! with a bounded timeout from config; a request that never resolves must
//! not leave the engine in a loading state forever. The auth and data
//! providers share one `reqwest::Client` so the session cookie from login
//! scopes the data requests.

use async_trait::async_trait;
use reqwest::{Client as HttpClient, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;
use url::Url;

use crate::error::{AuthError, MutationError, ProviderError};
use crate::models::{
    Appointment, Client, Collections, NewAppointment, PlanTier, Principal, Role, StaffUser,
};
use crate::models::principal::ClientAccount;
use crate::providers::{AuthProvider, DataProvider, SubscriptionStatus};

/// Principal payload as the backend ships it. Staff accounts carry a role
/// string; client accounts carry an id and no role.
#[derive(Debug, Clone, Deserialize)]
struct RawPrincipal {
    #[serde(default)]
    id: Option<i64>,
    name: String,
    email: String,
    #[serde(default, rename = "avatarUrl")]
    avatar_url: Option<String>,
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    plan: Option<String>,
    #[serde(default)]
    phone: Option<String>,
    #[serde(default, rename = "preferredUnit")]
    preferred_unit: Option<String>,
    #[serde(default, rename = "unit")]
    unit_name: Option<String>,
}

/// Normalize a raw principal at the boundary. The role table is the only
/// place raw role strings are interpreted.
fn classify(raw: RawPrincipal) -> Result<Principal, AuthError> {
    if let Some(role_raw) = raw.role {
        let role = Role::from_raw(&role_raw).ok_or(AuthError::UnknownRole(role_raw))?;
        let plan = raw
            .plan
            .as_deref()
            .and_then(PlanTier::from_raw)
            .unwrap_or(PlanTier::Individual);
        Ok(Principal::Staff(StaffUser {
            name: raw.name,
            email: raw.email,
            avatar_url: raw.avatar_url,
            role,
            plan,
            unit_name: raw.unit_name,
        }))
    } else {
        let id = raw.id.ok_or_else(|| {
            AuthError::Provider(ProviderError::Decode(
                "client principal without id".to_string(),
            ))
        })?;
        Ok(Principal::Client(ClientAccount {
            id,
            name: raw.name,
            email: raw.email,
            phone: raw.phone,
            preferred_unit: raw.preferred_unit,
        }))
    }
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
    remember: bool,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    success: bool,
    #[serde(default)]
    user: Option<RawPrincipal>,
}

/// Generic mutation envelope: `{success, data?, message?}`.
///
/// `data` needs an explicit default fn: a bare `#[serde(default)]` would put
/// a `T: Default` bound on the derived impl, and the entity types are not
/// `Default`.
#[derive(Debug, Deserialize)]
struct ApiResult<T> {
    success: bool,
    #[serde(default = "Option::default")]
    data: Option<T>,
    #[serde(default)]
    message: Option<String>,
}

impl<T> ApiResult<T> {
    fn into_data(self, entity: &'static str) -> Result<T, MutationError> {
        if self.success {
            self.data.ok_or_else(|| {
                MutationError::Provider(ProviderError::Decode(format!(
                    "{entity}: success without data"
                )))
            })
        } else {
            Err(MutationError::Rejected {
                entity,
                message: self.message.unwrap_or_else(|| "unknown error".to_string()),
            })
        }
    }
}

/// Map non-2xx responses to a typed provider error.
async fn ensure_ok(response: Response) -> Result<Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(ProviderError::Backend {
        status: status.as_u16(),
        message,
    })
}

/// Build the shared backend client. Both providers must be constructed from
/// the same client (clones share it): the session cookie set by login has to
/// accompany every collection fetch and mutation.
pub fn build_client(timeout: Duration) -> Result<HttpClient, ProviderError> {
    HttpClient::builder()
        .timeout(timeout)
        .cookie_store(true)
        .build()
        .map_err(ProviderError::from)
}

/// Auth provider over the backend's session endpoints.
pub struct HttpAuthProvider {
    client: HttpClient,
    base: Url,
}

impl HttpAuthProvider {
    pub fn new(client: HttpClient, base: Url) -> Self {
        Self { client, base }
    }

    fn endpoint(&self, path: &str) -> Url {
        let mut url = self.base.clone();
        url.set_path(path);
        url
    }
}

#[async_trait]
impl AuthProvider for HttpAuthProvider {
    async fn login(
        &self,
        email: &str,
        password: &str,
        remember: bool,
    ) -> Result<Principal, AuthError> {
        let response = self
            .client
            .post(self.endpoint("/auth/login"))
            .json(&LoginRequest {
                email,
                password,
                remember,
            })
            .send()
            .await
            .map_err(ProviderError::from)?;

        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(AuthError::InvalidCredentials);
        }
        let response = ensure_ok(response).await?;
        let body: LoginResponse = response.json().await.map_err(ProviderError::from)?;

        if !body.success {
            return Err(AuthError::InvalidCredentials);
        }
        let raw = body.user.ok_or_else(|| {
            AuthError::Provider(ProviderError::Decode(
                "login success without user payload".to_string(),
            ))
        })?;
        classify(raw)
    }

    async fn logout(&self) -> Result<(), ProviderError> {
        let response = self
            .client
            .post(self.endpoint("/auth/logout"))
            .send()
            .await?;
        ensure_ok(response).await?;
        Ok(())
    }

    async fn restore_session(&self) -> Result<Option<Principal>, ProviderError> {
        let response = self.client.get(self.endpoint("/auth/session")).send().await?;
        if response.status() == StatusCode::NO_CONTENT
            || response.status() == StatusCode::UNAUTHORIZED
        {
            return Ok(None);
        }
        let response = ensure_ok(response).await?;
        let raw: RawPrincipal = response.json().await?;
        match classify(raw) {
            Ok(principal) => Ok(Some(principal)),
            // A stored session with an unusable role is not an error worth
            // failing startup over; treat as anonymous.
            Err(AuthError::UnknownRole(role)) => {
                debug!(role, "stored session has unknown role, treating as anonymous");
                Ok(None)
            }
            Err(AuthError::Provider(e)) => Err(e),
            Err(AuthError::InvalidCredentials) => Ok(None),
        }
    }
}

/// Data provider over the backend's collection and mutation endpoints.
///
/// The active-unit selector is provider-local state: it scopes the next
/// `fetch_collections` call rather than issuing a request of its own.
pub struct HttpDataProvider {
    client: HttpClient,
    base: Url,
    active_unit: RwLock<Option<i64>>,
}

impl HttpDataProvider {
    pub fn new(client: HttpClient, base: Url) -> Self {
        Self {
            client,
            base,
            active_unit: RwLock::new(None),
        }
    }

    fn endpoint(&self, path: &str) -> Url {
        let mut url = self.base.clone();
        url.set_path(path);
        url
    }
}

#[async_trait]
impl DataProvider for HttpDataProvider {
    async fn fetch_collections(&self) -> Result<Collections, ProviderError> {
        let mut url = self.endpoint("/data/collections");
        if let Some(unit_id) = *self.active_unit.read().await {
            url.query_pairs_mut()
                .append_pair("unit_id", &unit_id.to_string());
        }
        let response = ensure_ok(self.client.get(url).send().await?).await?;
        Ok(response.json().await?)
    }

    async fn set_selected_unit_id(&self, unit_id: i64) -> Result<(), ProviderError> {
        *self.active_unit.write().await = Some(unit_id);
        debug!(unit_id, "active unit selector updated");
        Ok(())
    }

    async fn create_appointment(
        &self,
        appointment: NewAppointment,
    ) -> Result<Appointment, MutationError> {
        let response = self
            .client
            .post(self.endpoint("/appointments"))
            .json(&appointment)
            .send()
            .await
            .map_err(ProviderError::from)?;
        let response = ensure_ok(response).await?;
        let body: ApiResult<Appointment> =
            response.json().await.map_err(ProviderError::from)?;
        body.into_data("appointment")
    }

    async fn save_client(&self, client: Client) -> Result<Client, MutationError> {
        let response = self
            .client
            .post(self.endpoint("/clients"))
            .json(&client)
            .send()
            .await
            .map_err(ProviderError::from)?;
        let response = ensure_ok(response).await?;
        let body: ApiResult<Client> = response.json().await.map_err(ProviderError::from)?;
        body.into_data("client")
    }

    async fn delete_client(&self, client_id: i64) -> Result<(), MutationError> {
        let response = self
            .client
            .delete(self.endpoint(&format!("/clients/{client_id}")))
            .send()
            .await
            .map_err(ProviderError::from)?;
        ensure_ok(response).await?;
        Ok(())
    }

    async fn toggle_promotion(
        &self,
        promotion_id: i64,
        active: bool,
    ) -> Result<(), MutationError> {
        let response = self
            .client
            .post(self.endpoint(&format!("/promotions/{promotion_id}/toggle")))
            .json(&serde_json::json!({ "active": active }))
            .send()
            .await
            .map_err(ProviderError::from)?;
        ensure_ok(response).await?;
        Ok(())
    }

    async fn subscription_status(&self) -> Result<SubscriptionStatus, ProviderError> {
        let response = self
            .client
            .get(self.endpoint("/account/subscription"))
            .send()
            .await?;
        let response = ensure_ok(response).await?;
        Ok(response.json().await?)
    }
}
