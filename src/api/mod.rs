//! HTTP API handlers
//!
//! The UI shell drives the engine through this surface: session snapshot,
//! navigation, auth, unit buckets, guarded mutations, and an SSE stream of
//! bus events for realtime updates.

use crate::bus::SharedBus;
use crate::coordinator::SessionCoordinator;
use crate::error::{AuthError, MutationError, ProviderError};
use crate::models::{Client, NewAppointment};
use crate::session::{NavParams, SessionSnapshot};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse,
    },
    routing::{delete, get, post},
    Json, Router,
};
use futures::stream::Stream;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<SessionCoordinator>,
    pub bus: SharedBus,
}

impl AppState {
    pub fn new(coordinator: Arc<SessionCoordinator>, bus: SharedBus) -> Self {
        Self { coordinator, bus }
    }
}

/// Build the full route table over the shared state.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/status", get(status_handler))
        .route("/session", get(session_handler))
        .route("/session/navigate", post(navigate_handler))
        .route("/session/back", post(back_handler))
        .route("/auth/login", post(login_handler))
        .route("/auth/logout", post(logout_handler))
        .route("/units", get(units_handler))
        .route("/units/{name}", get(unit_bucket_handler))
        .route("/appointments", post(create_appointment_handler))
        .route("/clients", post(save_client_handler))
        .route("/clients/{id}", delete(delete_client_handler))
        .route("/promotions/{id}/toggle", post(toggle_promotion_handler))
        .route("/events", get(events_handler))
        .with_state(state)
}

/// Error response
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

fn provider_status(e: &ProviderError) -> StatusCode {
    match e {
        ProviderError::Timeout => StatusCode::GATEWAY_TIMEOUT,
        _ => StatusCode::BAD_GATEWAY,
    }
}

fn auth_error_response(e: AuthError) -> (StatusCode, Json<ErrorResponse>) {
    let status = match &e {
        AuthError::InvalidCredentials | AuthError::UnknownRole(_) => StatusCode::UNAUTHORIZED,
        AuthError::Provider(p) => provider_status(p),
    };
    (status, Json(ErrorResponse { error: e.to_string() }))
}

fn mutation_error_response(e: MutationError) -> (StatusCode, Json<ErrorResponse>) {
    let status = match &e {
        MutationError::SubscriptionBlocked => StatusCode::PAYMENT_REQUIRED,
        MutationError::Rejected { .. } => StatusCode::BAD_REQUEST,
        MutationError::Provider(p) => provider_status(p),
    };
    (status, Json(ErrorResponse { error: e.to_string() }))
}

/// General status response
#[derive(Serialize)]
pub struct StatusResponse {
    pub service: &'static str,
    pub version: &'static str,
    pub screen: String,
    pub selected_unit: String,
    pub subscription_blocked: bool,
    pub bus_subscribers: usize,
}

/// GET /status - Service health check
pub async fn status_handler(State(state): State<AppState>) -> Json<StatusResponse> {
    let snapshot = state.coordinator.snapshot().await;
    Json(StatusResponse {
        service: "salao24h-engine",
        version: env!("S24_VERSION"),
        screen: snapshot.screen.to_string(),
        selected_unit: state.coordinator.selected_unit().await,
        subscription_blocked: state.coordinator.is_subscription_blocked().await,
        bus_subscribers: state.bus.subscriber_count(),
    })
}

// =============================================================================
// Session handlers
// =============================================================================

/// GET /session - Current session snapshot
pub async fn session_handler(State(state): State<AppState>) -> Json<SessionSnapshot> {
    Json(state.coordinator.snapshot().await)
}

/// Navigation request body
#[derive(Deserialize)]
pub struct NavigateRequest {
    pub screen: String,
    #[serde(default)]
    pub params: Option<NavParams>,
}

/// POST /session/navigate - Navigate to a screen by raw name
pub async fn navigate_handler(
    State(state): State<AppState>,
    Json(req): Json<NavigateRequest>,
) -> Json<SessionSnapshot> {
    Json(state.coordinator.navigate_raw(&req.screen, req.params).await)
}

/// POST /session/back - Pop the navigation history
pub async fn back_handler(State(state): State<AppState>) -> Json<SessionSnapshot> {
    Json(state.coordinator.go_back().await)
}

// =============================================================================
// Auth handlers
// =============================================================================

/// Login request body
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub remember: bool,
}

/// POST /auth/login - Authenticate against the backend
pub async fn login_handler(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> impl IntoResponse {
    match state
        .coordinator
        .login(&req.email, &req.password, req.remember)
        .await
    {
        Ok(snapshot) => (StatusCode::OK, Json(snapshot)).into_response(),
        Err(e) => auth_error_response(e).into_response(),
    }
}

/// POST /auth/logout - Tear down the session
pub async fn logout_handler(State(state): State<AppState>) -> Json<SessionSnapshot> {
    Json(state.coordinator.logout().await)
}

// =============================================================================
// Unit handlers
// =============================================================================

/// Units overview response
#[derive(Serialize)]
pub struct UnitsResponse {
    pub selected_unit: String,
    pub units: Vec<String>,
}

/// GET /units - Unit names and the unit in focus
pub async fn units_handler(State(state): State<AppState>) -> Json<UnitsResponse> {
    Json(UnitsResponse {
        selected_unit: state.coordinator.selected_unit().await,
        units: state.coordinator.unit_names().await,
    })
}

/// GET /units/{name} - Per-unit bucket
pub async fn unit_bucket_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> impl IntoResponse {
    match state.coordinator.bucket(&name).await {
        Some(bucket) => (StatusCode::OK, Json(bucket)).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Unit not found: {}", name),
            }),
        )
            .into_response(),
    }
}

// =============================================================================
// Mutation handlers
// =============================================================================

/// POST /appointments - Create an appointment (booking flow)
pub async fn create_appointment_handler(
    State(state): State<AppState>,
    Json(req): Json<NewAppointment>,
) -> impl IntoResponse {
    match state.coordinator.create_appointment(req).await {
        Ok(appointment) => (
            StatusCode::OK,
            Json(serde_json::json!({"success": true, "data": appointment})),
        )
            .into_response(),
        Err(e) => mutation_error_response(e).into_response(),
    }
}

/// POST /clients - Save a client record
pub async fn save_client_handler(
    State(state): State<AppState>,
    Json(req): Json<Client>,
) -> impl IntoResponse {
    match state.coordinator.save_client(req).await {
        Ok(client) => (
            StatusCode::OK,
            Json(serde_json::json!({"success": true, "data": client})),
        )
            .into_response(),
        Err(e) => mutation_error_response(e).into_response(),
    }
}

/// DELETE /clients/{id} - Delete a client record
pub async fn delete_client_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    match state.coordinator.delete_client(id).await {
        Ok(()) => (StatusCode::OK, Json(serde_json::json!({"success": true}))).into_response(),
        Err(e) => mutation_error_response(e).into_response(),
    }
}

/// Promotion toggle request body
#[derive(Deserialize)]
pub struct ToggleRequest {
    pub active: bool,
}

/// POST /promotions/{id}/toggle - Enable or disable a promotion
pub async fn toggle_promotion_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<ToggleRequest>,
) -> impl IntoResponse {
    match state.coordinator.toggle_promotion(id, req.active).await {
        Ok(()) => (StatusCode::OK, Json(serde_json::json!({"success": true}))).into_response(),
        Err(e) => mutation_error_response(e).into_response(),
    }
}

// =============================================================================
// SSE
// =============================================================================

/// GET /events - Server-Sent Events stream of bus events
pub async fn events_handler(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.bus.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(|result| {
        match result {
            Ok(event) => {
                // Serialize event to JSON
                match serde_json::to_string(&event) {
                    Ok(json) => Some(Ok(Event::default().data(json))),
                    Err(_) => None,
                }
            }
            Err(_) => None, // Skip lagged messages
        }
    });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    )
}
