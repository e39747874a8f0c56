//! Per-entity-type unit-scope policy.
//!
//! The ownership rule is asymmetric and easy to miss when written inline:
//! catalog entities (services, packages, salon plans) with no unit set are
//! visible at *every* unit, while attendance entities (clients, products,
//! transactions, appointments) with no unit set belong to *no* unit. This
//! module is the one place that rule lives.

/// How a missing ownership field is interpreted for an entity type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitScope {
    /// Catalog-style: unowned records belong to every unit. Supports tenants
    /// that have not finished multi-location setup.
    Catalog,
    /// Attendance-style: unowned records belong to no unit.
    Attendance,
}

impl UnitScope {
    pub fn includes_unowned(self) -> bool {
        matches!(self, UnitScope::Catalog)
    }
}

/// Entity types that participate in per-unit bucketing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Clients,
    Professionals,
    Services,
    Packages,
    SalonPlans,
    Products,
    Transactions,
    Appointments,
}

/// The policy table. Promotions are tenant-wide and deliberately absent.
pub fn scope_for(kind: EntityKind) -> UnitScope {
    match kind {
        EntityKind::Services | EntityKind::Packages | EntityKind::SalonPlans => UnitScope::Catalog,
        EntityKind::Clients
        | EntityKind::Professionals
        | EntityKind::Products
        | EntityKind::Transactions
        | EntityKind::Appointments => UnitScope::Attendance,
    }
}

/// Visibility test for entities owned by unit id.
pub fn visible_by_id(kind: EntityKind, owner: Option<i64>, unit_id: i64) -> bool {
    match owner {
        Some(id) => id == unit_id,
        None => scope_for(kind).includes_unowned(),
    }
}

/// Visibility test for entities owned by unit name.
pub fn visible_by_name(kind: EntityKind, owner: Option<&str>, unit_name: &str) -> bool {
    match owner {
        Some(name) => name == unit_name,
        None => scope_for(kind).includes_unowned(),
    }
}
