//! # Storage Traits
//!
//! Storage abstraction for the domain layer. Repositories implementing
//! these traits can back the services with any persistence mechanism;
//! the crate ships a file-based implementation under `csv/`.

use anyhow::Result;

use crate::domain::models::billing_cycle::BillingCycle;
use crate::domain::models::expense::Expense;
use crate::domain::models::property::{Property, Unit};
use crate::domain::models::service_rule::ServiceRule;
use crate::domain::models::tenancy::Tenancy;
use crate::domain::models::tenant::Tenant;

/// A domain constraint enforced at commit time, under the connection's
/// write lock. Raised when a check-then-act race slipped past the
/// service-level validation; callers map it to the same user-facing
/// conflict as the primary check.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct StorageConflict(pub String);

/// Trait defining the interface for property and unit storage operations.
pub trait PropertyStorage: Send + Sync {
    /// Store a new property (creates its storage scope)
    fn store_property(&self, property: &Property) -> Result<()>;

    /// Retrieve a specific property by ID
    fn get_property(&self, property_id: &str) -> Result<Option<Property>>;

    /// List all properties
    fn list_properties(&self) -> Result<Vec<Property>>;

    /// Delete a property and everything it owns (units, tenants,
    /// tenancies, cycles, rules, expenses).
    /// Returns true if the property was found and deleted
    fn delete_property(&self, property_id: &str) -> Result<bool>;

    /// Store a new unit on a property
    fn store_unit(&self, unit: &Unit) -> Result<()>;

    /// Update an existing unit
    fn update_unit(&self, unit: &Unit) -> Result<()>;

    /// Retrieve a specific unit of a property
    fn get_unit(&self, property_id: &str, unit_id: &str) -> Result<Option<Unit>>;

    /// List a property's units ordered by name
    fn list_units(&self, property_id: &str) -> Result<Vec<Unit>>;

    /// Delete a unit. Returns true if the unit was found and deleted
    fn delete_unit(&self, property_id: &str, unit_id: &str) -> Result<bool>;

    /// Locate a unit by ID alone, returning it with its owning property
    fn find_unit(&self, unit_id: &str) -> Result<Option<(Property, Unit)>>;
}

/// Trait defining the interface for tenant storage operations.
pub trait TenantStorage: Send + Sync {
    fn store_tenant(&self, tenant: &Tenant) -> Result<()>;

    fn get_tenant(&self, property_id: &str, tenant_id: &str) -> Result<Option<Tenant>>;

    /// List a property's tenants ordered by name
    fn list_tenants(&self, property_id: &str) -> Result<Vec<Tenant>>;

    fn update_tenant(&self, tenant: &Tenant) -> Result<()>;
}

/// Trait defining the interface for tenancy storage operations.
pub trait TenancyStorage: Send + Sync {
    /// Append a tenancy. Re-validates the interval-exclusion constraint
    /// for the unit under the write lock; a violation is returned as
    /// [`StorageConflict`].
    fn store_tenancy(&self, property_id: &str, tenancy: &Tenancy) -> Result<()>;

    /// Update an existing tenancy in place
    fn update_tenancy(&self, property_id: &str, tenancy: &Tenancy) -> Result<()>;

    /// All tenancies recorded for a property
    fn list_tenancies(&self, property_id: &str) -> Result<Vec<Tenancy>>;

    /// All tenancies for one unit of a property
    fn list_tenancies_for_unit(&self, property_id: &str, unit_id: &str) -> Result<Vec<Tenancy>>;

    /// Locate a tenancy by ID alone, returning it with its property scope
    fn find_tenancy(&self, tenancy_id: &str) -> Result<Option<(String, Tenancy)>>;
}

/// Trait defining the interface for billing cycle storage operations.
pub trait BillingCycleStorage: Send + Sync {
    /// Append a cycle. Re-checks `(property, month, year)` uniqueness
    /// under the write lock; a duplicate is returned as
    /// [`StorageConflict`].
    fn store_cycle(&self, cycle: &BillingCycle) -> Result<()>;

    fn get_cycle_for_period(
        &self,
        property_id: &str,
        month: u32,
        year: i32,
    ) -> Result<Option<BillingCycle>>;

    /// List a property's cycles, most recent period first
    fn list_cycles(&self, property_id: &str) -> Result<Vec<BillingCycle>>;

    /// Locate a cycle by ID alone
    fn find_cycle(&self, cycle_id: &str) -> Result<Option<BillingCycle>>;

    fn update_cycle(&self, cycle: &BillingCycle) -> Result<()>;
}

/// Trait defining the interface for service rule storage operations.
pub trait ServiceRuleStorage: Send + Sync {
    /// Atomically replace the property's whole rule set. Readers never
    /// observe an intermediate state; on failure the prior set survives.
    fn replace_rules(&self, property_id: &str, rules: &[ServiceRule]) -> Result<()>;

    /// The property's current rule set (possibly empty)
    fn list_rules(&self, property_id: &str) -> Result<Vec<ServiceRule>>;
}

/// Trait defining the interface for expense storage operations.
pub trait ExpenseStorage: Send + Sync {
    fn store_expense(&self, property_id: &str, expense: &Expense) -> Result<()>;

    /// Expenses of one cycle, most recent first
    fn list_expenses_for_cycle(
        &self,
        property_id: &str,
        cycle_id: &str,
    ) -> Result<Vec<Expense>>;
}
