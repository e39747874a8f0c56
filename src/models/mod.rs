//! Entity types shared across the engine.
//!
//! These mirror the payloads of the Salão24h REST backend. Ownership fields
//! (`preferredUnit`, `unit`, `unit_id`) drive the per-unit reconciliation in
//! [`crate::units`]; everything else is carried through untouched for the UI.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub mod principal;

pub use principal::{ClientAccount, PlanTier, Principal, Role, StaffUser};

/// A physical business location of a multi-unit tenant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Unit {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

/// An end-customer of the salon.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Client {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    /// Unit the client usually visits, by unit name. Absent means the client
    /// has not been assigned to any location yet.
    #[serde(default, rename = "preferredUnit")]
    pub preferred_unit: Option<String>,
}

/// A staff member who performs services.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Professional {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub specialty: Option<String>,
    /// Unit assignment by name (legacy records) and/or by id (current records).
    #[serde(default, rename = "unit")]
    pub unit_name: Option<String>,
    #[serde(default)]
    pub unit_id: Option<i64>,
}

/// A bookable service from the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Service {
    pub id: i64,
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub duration_minutes: Option<u32>,
    /// Absent means the service is offered at every unit.
    #[serde(default)]
    pub unit_id: Option<i64>,
}

/// A bundle of services sold as one purchase.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Package {
    pub id: i64,
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub service_ids: Vec<i64>,
    /// Absent means the package is sold at every unit.
    #[serde(default)]
    pub unit_id: Option<i64>,
}

/// A recurring plan the salon sells to its clients (distinct from the SaaS
/// subscription tiers in [`PlanTier`]).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SalonPlan {
    pub id: i64,
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub unit_id: Option<i64>,
}

/// A retail product kept in stock at a unit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub stock: i64,
    #[serde(default, rename = "unit")]
    pub unit_name: Option<String>,
}

/// A marketing promotion. Promotions are tenant-wide and are not bucketed
/// per unit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Promotion {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub discount_percent: Option<f64>,
    #[serde(default)]
    pub active: bool,
}

/// A financial entry (sale, payment, refund) booked against a unit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub id: i64,
    pub amount: f64,
    #[serde(default)]
    pub description: Option<String>,
    pub date: DateTime<Utc>,
    #[serde(default, rename = "unit")]
    pub unit_name: Option<String>,
}

/// Appointment lifecycle state as reported by the backend.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Scheduled,
    Confirmed,
    Completed,
    Cancelled,
    #[default]
    Unknown,
}

impl From<&str> for AppointmentStatus {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "scheduled" | "agendado" => Self::Scheduled,
            "confirmed" | "confirmado" => Self::Confirmed,
            "completed" | "concluido" | "concluído" => Self::Completed,
            "cancelled" | "canceled" | "cancelado" => Self::Cancelled,
            _ => Self::Unknown,
        }
    }
}

/// A booked appointment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Appointment {
    pub id: i64,
    #[serde(default)]
    pub client_id: Option<i64>,
    pub client_name: String,
    pub professional_name: String,
    pub service_name: String,
    pub date: NaiveDate,
    pub time: String,
    #[serde(default)]
    pub status: AppointmentStatus,
    #[serde(default, rename = "unit")]
    pub unit_name: Option<String>,
}

/// Payload for creating a new appointment through the booking flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAppointment {
    #[serde(default)]
    pub client_id: Option<i64>,
    pub client_name: String,
    pub professional_name: String,
    pub service_name: String,
    pub date: NaiveDate,
    pub time: String,
    #[serde(default, rename = "unit")]
    pub unit_name: Option<String>,
}

/// The flat entity collections as fetched from the backend, before any
/// per-unit projection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Collections {
    #[serde(default)]
    pub units: Vec<Unit>,
    #[serde(default)]
    pub clients: Vec<Client>,
    #[serde(default)]
    pub professionals: Vec<Professional>,
    #[serde(default)]
    pub services: Vec<Service>,
    #[serde(default)]
    pub packages: Vec<Package>,
    #[serde(default, rename = "salonPlans")]
    pub salon_plans: Vec<SalonPlan>,
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub promotions: Vec<Promotion>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub appointments: Vec<Appointment>,
}
