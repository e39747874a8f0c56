//! SessionCoordinator - single writer over session and unit state.
//!
//! API handlers and background tasks never touch `SessionState` or
//! `UnitAggregator` directly; every mutation goes through the coordinator,
//! which applies the transition, performs the provider side effects, and
//! publishes the resulting events on the bus.

use std::sync::Arc;

use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::bus::{AppEvent, SharedBus};
use crate::error::{AuthError, MutationError};
use crate::models::{Appointment, Client, Collections, NewAppointment, Principal};
use crate::providers::{AuthProvider, DataProvider, SubscriptionStatus};
use crate::session::{NavParams, NavTarget, SessionSnapshot, SessionState};
use crate::units::{UnitAggregator, UnitBucket};

pub struct SessionCoordinator {
    session: RwLock<SessionState>,
    units: RwLock<UnitAggregator>,
    subscription: RwLock<SubscriptionStatus>,
    auth: Arc<dyn AuthProvider>,
    data: Arc<dyn DataProvider>,
    bus: SharedBus,
}

impl SessionCoordinator {
    pub fn new(auth: Arc<dyn AuthProvider>, data: Arc<dyn DataProvider>, bus: SharedBus) -> Self {
        Self {
            session: RwLock::new(SessionState::new()),
            units: RwLock::new(UnitAggregator::new()),
            subscription: RwLock::new(SubscriptionStatus::Active),
            auth,
            data,
            bus,
        }
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    pub async fn snapshot(&self) -> SessionSnapshot {
        self.session.read().await.snapshot()
    }

    /// Navigate to a target. Same-screen requests are no-ops and publish
    /// nothing.
    pub async fn navigate(&self, target: NavTarget, params: Option<NavParams>) -> SessionSnapshot {
        let mut session = self.session.write().await;
        if session.navigate(target, params).changed() {
            self.bus.publish(AppEvent::ScreenChanged {
                screen: session.screen(),
                reset_scroll: true,
            });
            debug!(screen = %session.screen(), "navigated");
        }
        session.snapshot()
    }

    /// Navigate from a raw screen name (UI shell input). Unrecognized names
    /// fail closed to home inside [`NavTarget::from_raw`].
    pub async fn navigate_raw(&self, raw: &str, params: Option<NavParams>) -> SessionSnapshot {
        self.navigate(NavTarget::from_raw(raw), params).await
    }

    pub async fn go_back(&self) -> SessionSnapshot {
        let mut session = self.session.write().await;
        if session.go_back().changed() {
            self.bus.publish(AppEvent::ScreenChanged {
                screen: session.screen(),
                reset_scroll: true,
            });
        }
        session.snapshot()
    }

    // =========================================================================
    // Principal lifecycle
    // =========================================================================

    /// Authenticate and land on the role's home screen.
    ///
    /// Auth failures are returned to the caller for inline display; the
    /// session stays on the screen it was on.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        remember: bool,
    ) -> Result<SessionSnapshot, AuthError> {
        self.set_auth_loading(true).await;

        let principal = match self.auth.login(email, password, remember).await {
            Ok(principal) => principal,
            Err(e) => {
                self.set_auth_loading(false).await;
                return Err(e);
            }
        };

        let mut session = self.session.write().await;
        let screen = session.on_login_success(principal.clone());
        info!(name = principal.name(), %screen, "login succeeded");

        self.bus.publish(AppEvent::AuthLoadingChanged { loading: false });
        self.bus.publish(AppEvent::PrincipalChanged {
            principal: Some(principal),
        });
        self.bus.publish(AppEvent::ScreenChanged {
            screen,
            reset_scroll: true,
        });
        Ok(session.snapshot())
    }

    /// Resolve any remembered backend session at startup, then run the
    /// redirect rules once loading has settled.
    pub async fn restore_session(&self) {
        let restored = match self.auth.restore_session().await {
            Ok(principal) => principal,
            Err(e) => {
                warn!("session restore failed: {}", e);
                None
            }
        };

        let mut session = self.session.write().await;
        session.set_principal(restored.clone());
        session.set_auth_loading(false);
        let outcome = session.sync_principal();

        self.bus.publish(AppEvent::AuthLoadingChanged { loading: false });
        self.bus.publish(AppEvent::PrincipalChanged {
            principal: restored,
        });
        if outcome.changed() {
            self.bus.publish(AppEvent::ScreenChanged {
                screen: session.screen(),
                reset_scroll: true,
            });
        }
    }

    /// Replace the principal (e.g. an auth-context push from the backend)
    /// and apply the redirect rules.
    pub async fn set_principal(&self, principal: Option<Principal>) -> SessionSnapshot {
        let mut session = self.session.write().await;
        session.set_principal(principal.clone());
        let outcome = session.sync_principal();

        self.bus.publish(AppEvent::PrincipalChanged { principal });
        if outcome.changed() {
            self.bus.publish(AppEvent::ScreenChanged {
                screen: session.screen(),
                reset_scroll: true,
            });
        }
        session.snapshot()
    }

    /// Clear the principal and return home. The backend teardown call is
    /// best-effort: a dead backend must not trap the user in the app.
    pub async fn logout(&self) -> SessionSnapshot {
        if let Err(e) = self.auth.logout().await {
            warn!("backend logout failed: {}", e);
        }

        let mut session = self.session.write().await;
        let outcome = session.on_logout();

        self.bus.publish(AppEvent::PrincipalChanged { principal: None });
        self.bus.publish(AppEvent::LoggedOut);
        if outcome.changed() {
            self.bus.publish(AppEvent::ScreenChanged {
                screen: session.screen(),
                reset_scroll: true,
            });
        }
        session.snapshot()
    }

    async fn set_auth_loading(&self, loading: bool) {
        self.session.write().await.set_auth_loading(loading);
        self.bus.publish(AppEvent::AuthLoadingChanged { loading });
    }

    // =========================================================================
    // Unit reconciliation
    // =========================================================================

    /// Feed freshly fetched collections into the aggregator and propagate a
    /// selected-unit repair to the data provider's active-unit selector.
    pub async fn apply_collections(&self, collections: Collections) {
        let change = {
            let mut units = self.units.write().await;
            let change = units.reconcile(&collections);
            self.bus.publish(AppEvent::UnitsReconciled {
                unit_count: units.buckets().len(),
                selected_unit: units.selected_unit().to_string(),
            });
            change
        };

        if let Some(change) = change {
            if let Err(e) = self.data.set_selected_unit_id(change.unit_id).await {
                warn!(unit_id = change.unit_id, "failed to propagate selected unit: {}", e);
            }
            self.bus.publish(AppEvent::SelectedUnitChanged {
                unit_id: change.unit_id,
                unit_name: change.unit_name,
            });
        }
    }

    pub async fn selected_unit(&self) -> String {
        self.units.read().await.selected_unit().to_string()
    }

    pub async fn unit_names(&self) -> Vec<String> {
        let units = self.units.read().await;
        let mut names: Vec<String> = units.buckets().keys().cloned().collect();
        names.sort();
        names
    }

    pub async fn bucket(&self, unit_name: &str) -> Option<UnitBucket> {
        self.units.read().await.bucket(unit_name).cloned()
    }

    // =========================================================================
    // Subscription overlay
    // =========================================================================

    /// Record the latest account standing; publishes only on transitions.
    pub async fn update_subscription(&self, status: SubscriptionStatus) {
        let mut current = self.subscription.write().await;
        if *current == status {
            return;
        }
        match &status {
            SubscriptionStatus::Blocked { reason } => {
                warn!(?reason, "subscription blocked");
                self.bus.publish(AppEvent::SubscriptionBlocked {
                    reason: reason.clone(),
                });
            }
            SubscriptionStatus::Active => {
                info!("subscription active again");
                self.bus.publish(AppEvent::SubscriptionActive);
            }
        }
        *current = status;
    }

    pub async fn is_subscription_blocked(&self) -> bool {
        matches!(
            &*self.subscription.read().await,
            SubscriptionStatus::Blocked { .. }
        )
    }

    async fn ensure_not_blocked(&self) -> Result<(), MutationError> {
        if self.is_subscription_blocked().await {
            Err(MutationError::SubscriptionBlocked)
        } else {
            Ok(())
        }
    }

    // =========================================================================
    // Guarded mutations
    // =========================================================================

    pub async fn create_appointment(
        &self,
        appointment: NewAppointment,
    ) -> Result<Appointment, MutationError> {
        self.ensure_not_blocked().await?;
        self.data.create_appointment(appointment).await
    }

    pub async fn save_client(&self, client: Client) -> Result<Client, MutationError> {
        self.ensure_not_blocked().await?;
        self.data.save_client(client).await
    }

    pub async fn delete_client(&self, client_id: i64) -> Result<(), MutationError> {
        self.ensure_not_blocked().await?;
        self.data.delete_client(client_id).await
    }

    pub async fn toggle_promotion(
        &self,
        promotion_id: i64,
        active: bool,
    ) -> Result<(), MutationError> {
        self.ensure_not_blocked().await?;
        self.data.toggle_promotion(promotion_id, active).await
    }

    // =========================================================================
    // Event loop
    // =========================================================================

    /// Watch the bus for externally raised subscription events (any
    /// component may force the overlay by publishing) until shutdown.
    pub async fn run(self: Arc<Self>, shutdown: CancellationToken) {
        let mut rx = self.bus.subscribe();
        info!("SessionCoordinator started");

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("coordinator: cancelled via token");
                    break;
                }
                event = rx.recv() => {
                    match event {
                        Ok(AppEvent::SubscriptionBlocked { reason }) => {
                            // Set directly; re-publishing here would loop.
                            *self.subscription.write().await =
                                SubscriptionStatus::Blocked { reason };
                        }
                        Ok(AppEvent::SubscriptionActive) => {
                            *self.subscription.write().await = SubscriptionStatus::Active;
                        }
                        Ok(AppEvent::ShuttingDown { .. }) => {
                            info!("coordinator: received ShuttingDown event");
                            break;
                        }
                        Ok(_) => {}
                        Err(_) => break,
                    }
                }
            }
        }

        info!("SessionCoordinator stopped");
    }
}
