//! # Domain Module
//!
//! Business logic for the rental tracker: the billing-cycle lifecycle,
//! the per-service allocation-rule configuration, the proration math and
//! the tenancy-interval rules. It operates independently of any transport
//! layer or storage mechanism.
//!
//! ## Module Organization
//!
//! - **property_service**: property, unit and tenant management
//! - **tenancy_service**: occupancy intervals and their lifecycle
//! - **tenancy_validation**: pure interval-overlap rules
//! - **billing_cycle_service**: monthly accounting periods
//! - **service_rule_service**: atomic rule-set configuration
//! - **expense_service**: gated expense recording
//! - **proration**: pure share-computation math

pub mod billing_cycle_service;
pub mod commands;
pub mod errors;
pub mod expense_service;
pub mod models;
pub mod property_service;
pub mod proration;
pub mod service_rule_service;
pub mod tenancy_service;
pub mod tenancy_validation;

pub use billing_cycle_service::BillingCycleService;
pub use errors::{DomainError, DomainResult};
pub use expense_service::ExpenseService;
pub use property_service::PropertyService;
pub use service_rule_service::ServiceRuleService;
pub use tenancy_service::TenancyService;
