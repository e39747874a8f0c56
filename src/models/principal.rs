//! Authenticated principal types.
//!
//! The backend reports staff roles as free-form strings in several casings
//! and languages ("admin", "Administrador", "gerente", ...). All of that is
//! normalized once at the boundary via [`Role::from_raw`]; past that point
//! the engine only ever sees the enum.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Normalized staff role.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Manager,
    Receptionist,
    Professional,
}

impl Role {
    /// Canonical mapping from raw backend role strings.
    ///
    /// Returns `None` for unrecognized strings; callers must treat that as
    /// an unauthorized principal rather than guessing a role.
    pub fn from_raw(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "admin" | "administrador" | "administradora" => Some(Self::Admin),
            "manager" | "gerente" => Some(Self::Manager),
            "receptionist" | "recepcionista" => Some(Self::Receptionist),
            "professional" | "profissional" => Some(Self::Professional),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
            Self::Manager => write!(f, "manager"),
            Self::Receptionist => write!(f, "receptionist"),
            Self::Professional => write!(f, "professional"),
        }
    }
}

/// SaaS subscription tier of the tenant.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PlanTier {
    Individual,
    Profissional,
    Empresa,
}

impl PlanTier {
    /// Default upsell target for the "upgrade to a business plan"
    /// pseudo-navigation. Kept in one place so call sites never duplicate
    /// the plan literal.
    pub const DEFAULT_UPSELL: PlanTier = PlanTier::Empresa;

    pub fn from_raw(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "individual" => Some(Self::Individual),
            "profissional" | "professional" => Some(Self::Profissional),
            "empresa" | "business" => Some(Self::Empresa),
            _ => None,
        }
    }
}

impl fmt::Display for PlanTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Individual => write!(f, "Individual"),
            Self::Profissional => write!(f, "Profissional"),
            Self::Empresa => write!(f, "Empresa"),
        }
    }
}

/// An authenticated staff member of the tenant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StaffUser {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    pub role: Role,
    pub plan: PlanTier,
    /// Unit the staff member is attached to, if any.
    #[serde(default)]
    pub unit_name: Option<String>,
}

/// An authenticated end-client using the booking app.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClientAccount {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default, rename = "preferredUnit")]
    pub preferred_unit: Option<String>,
}

/// The currently authenticated actor. At most one variant is active at a
/// time; both slots empty means anonymous.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Principal {
    Staff(StaffUser),
    Client(ClientAccount),
}

impl Principal {
    pub fn is_staff(&self) -> bool {
        matches!(self, Principal::Staff(_))
    }

    pub fn is_client(&self) -> bool {
        matches!(self, Principal::Client(_))
    }

    /// Display name for logging and the session snapshot.
    pub fn name(&self) -> &str {
        match self {
            Principal::Staff(u) => &u.name,
            Principal::Client(c) => &c.name,
        }
    }
}
