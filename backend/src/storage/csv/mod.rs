//! # File Storage Module
//!
//! File-based storage implementation: YAML documents for whole-set data
//! (property record, units, tenants, service rules) and CSV files for
//! row-oriented history (tenancies, billing cycles, expenses), one
//! directory per property.

pub mod billing_cycle_repository;
pub mod connection;
pub mod expense_repository;
pub mod property_repository;
pub mod service_rule_repository;
pub mod tenancy_repository;
pub mod tenant_repository;

#[cfg(test)]
pub mod test_utils;

pub use billing_cycle_repository::BillingCycleRepository;
pub use connection::CsvConnection;
pub use expense_repository::ExpenseRepository;
pub use property_repository::PropertyRepository;
pub use service_rule_repository::ServiceRuleRepository;
pub use tenancy_repository::TenancyRepository;
pub use tenant_repository::TenantRepository;
