//! Event bus for inter-component communication
//!
//! Uses tokio::sync::broadcast for pub/sub pattern.
//! Events are typed and can carry payloads; the same stream feeds the SSE
//! endpoint, so every variant must serialize cleanly.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::models::Principal;
use crate::session::Screen;

/// Event types that can be published on the bus
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum AppEvent {
    // Navigation events
    ScreenChanged { screen: Screen, reset_scroll: bool },

    // Principal events
    PrincipalChanged { principal: Option<Principal> },
    AuthLoadingChanged { loading: bool },
    LoggedOut,

    // Data-sync events
    CollectionsRefreshed { units: usize, appointments: usize },
    SelectedUnitChanged { unit_id: i64, unit_name: String },
    UnitsReconciled { unit_count: usize, selected_unit: String },
    BackendUnreachable { error: String },

    // Subscription lifecycle (global overlay state)
    SubscriptionBlocked { reason: Option<String> },
    SubscriptionActive,

    // Shutdown coordination
    ShuttingDown { reason: String },
}

/// Event bus handle for publishing and subscribing
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<AppEvent>,
}

impl EventBus {
    /// Create a new event bus with specified capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Create with default capacity (256 events)
    pub fn default() -> Self {
        Self::new(256)
    }

    /// Publish an event to all subscribers
    pub fn publish(&self, event: AppEvent) {
        // Ignore send errors (no subscribers)
        let _ = self.sender.send(event);
    }

    /// Subscribe to all events
    pub fn subscribe(&self) -> broadcast::Receiver<AppEvent> {
        self.sender.subscribe()
    }

    /// Get the number of current subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// Shared event bus wrapped in Arc for thread-safe sharing
pub type SharedBus = Arc<EventBus>;

/// Create a new shared event bus
pub fn create_bus() -> SharedBus {
    Arc::new(EventBus::default())
}
