//! Salão24h engine
//!
//! Session and data-sync engine for the Salão24h salon-management client.
//!
//! This library provides:
//! - The navigation/session state machine (screens, history, typed params,
//!   principal-based redirects)
//! - Per-unit reconciliation of the tenant's entity collections
//! - Providers for the external REST backend, with bounded timeouts and
//!   retrying background sync
//! - A local HTTP + Server-Sent Events surface for the UI shell

pub mod api;
pub mod bus;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod models;
pub mod providers;
pub mod session;
pub mod units;
