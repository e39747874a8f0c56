//! UnitAggregator - per-unit projection of the flat entity collections.
//!
//! Multi-unit tenants see every collection filtered to the location in
//! focus. The aggregator rebuilds the full bucket map on every relevant
//! input change (no incremental patching) and keeps the selected-unit
//! pointer valid; reconciliation is a pure function of its latest inputs
//! and is safe to rerun on every change.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tracing::{debug, info};

use crate::models::{
    Appointment, Client, Collections, Package, Product, Professional, SalonPlan, Service,
    Transaction, Unit,
};

pub mod policy;

use policy::{visible_by_id, visible_by_name, EntityKind};

/// Selected-unit name shown before the unit list has ever loaded.
pub const LOADING_PLACEHOLDER: &str = "Carregando...";

/// Unit-scoped view of the global collections, kept for dashboard
/// consumption.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct UnitBucket {
    pub clients: Vec<Client>,
    pub professionals: Vec<Professional>,
    pub services: Vec<Service>,
    pub packages: Vec<Package>,
    pub salon_plans: Vec<SalonPlan>,
    pub products: Vec<Product>,
    pub transactions: Vec<Transaction>,
    pub appointments: Vec<Appointment>,
    pub unit_details: Option<Unit>,
}

/// Reported when reconciliation had to repair the selected-unit pointer.
/// The coordinator propagates this to the data provider's active-unit
/// selector, which scopes subsequent backend fetches.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedUnitChange {
    pub unit_id: i64,
    pub unit_name: String,
}

/// Maintains the unit-name → bucket map and the selected-unit pointer.
#[derive(Debug, Clone, Default)]
pub struct UnitAggregator {
    buckets: HashMap<String, UnitBucket>,
    selected_unit: Option<String>,
}

impl UnitAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// The unit currently in focus, or the loading placeholder before any
    /// unit has been selected.
    pub fn selected_unit(&self) -> &str {
        self.selected_unit.as_deref().unwrap_or(LOADING_PLACEHOLDER)
    }

    pub fn bucket(&self, unit_name: &str) -> Option<&UnitBucket> {
        self.buckets.get(unit_name)
    }

    pub fn buckets(&self) -> &HashMap<String, UnitBucket> {
        &self.buckets
    }

    /// Rebuild the per-unit buckets from the latest collections.
    ///
    /// Existing bucket entries for still-present units are reused as the
    /// starting shape before their list fields are overwritten, so local
    /// state keyed on the bucket object is not clobbered by unrelated
    /// refreshes. Returns the selected-unit repair, if one was needed.
    pub fn reconcile(&mut self, collections: &Collections) -> Option<SelectedUnitChange> {
        if collections.units.is_empty() {
            if self.selected_unit.is_none() {
                // Single-location / no-backend-yet bootstrap.
                self.selected_unit = Some(LOADING_PLACEHOLDER.to_string());
                debug!("no units loaded, selected unit set to placeholder");
            }
            return None;
        }

        let names: HashSet<&str> = collections.units.iter().map(|u| u.name.as_str()).collect();

        let change = match &self.selected_unit {
            Some(name) if names.contains(name.as_str()) => None,
            _ => {
                // Pointer unset or stale (includes the placeholder): reset
                // to the first unit in list order.
                let first = &collections.units[0];
                self.selected_unit = Some(first.name.clone());
                info!(unit = %first.name, id = first.id, "selected unit repaired");
                Some(SelectedUnitChange {
                    unit_id: first.id,
                    unit_name: first.name.clone(),
                })
            }
        };

        let mut rebuilt = HashMap::with_capacity(collections.units.len());
        for unit in &collections.units {
            // Reuse the previous entry for this unit name as the base;
            // buckets of removed units are dropped.
            let mut bucket = self.buckets.remove(&unit.name).unwrap_or_default();
            Self::fill_bucket(&mut bucket, unit, collections);
            rebuilt.insert(unit.name.clone(), bucket);
        }
        self.buckets = rebuilt;

        debug!(units = self.buckets.len(), "per-unit buckets rebuilt");
        change
    }

    fn fill_bucket(bucket: &mut UnitBucket, unit: &Unit, collections: &Collections) {
        let name = unit.name.as_str();
        let id = unit.id;

        bucket.clients = collections
            .clients
            .iter()
            .filter(|c| visible_by_name(EntityKind::Clients, c.preferred_unit.as_deref(), name))
            .cloned()
            .collect();

        // Professionals match by unit name (legacy records) or unit id.
        bucket.professionals = collections
            .professionals
            .iter()
            .filter(|p| {
                visible_by_name(EntityKind::Professionals, p.unit_name.as_deref(), name)
                    || p.unit_id == Some(id)
            })
            .cloned()
            .collect();

        bucket.services = collections
            .services
            .iter()
            .filter(|s| visible_by_id(EntityKind::Services, s.unit_id, id))
            .cloned()
            .collect();

        bucket.packages = collections
            .packages
            .iter()
            .filter(|p| visible_by_id(EntityKind::Packages, p.unit_id, id))
            .cloned()
            .collect();

        bucket.salon_plans = collections
            .salon_plans
            .iter()
            .filter(|p| visible_by_id(EntityKind::SalonPlans, p.unit_id, id))
            .cloned()
            .collect();

        bucket.products = collections
            .products
            .iter()
            .filter(|p| visible_by_name(EntityKind::Products, p.unit_name.as_deref(), name))
            .cloned()
            .collect();

        bucket.transactions = collections
            .transactions
            .iter()
            .filter(|t| visible_by_name(EntityKind::Transactions, t.unit_name.as_deref(), name))
            .cloned()
            .collect();

        bucket.appointments = collections
            .appointments
            .iter()
            .filter(|a| visible_by_name(EntityKind::Appointments, a.unit_name.as_deref(), name))
            .cloned()
            .collect();

        bucket.unit_details = Some(unit.clone());
    }
}
