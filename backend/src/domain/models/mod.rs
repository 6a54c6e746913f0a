pub mod billing_cycle;
pub mod expense;
pub mod property;
pub mod service_rule;
pub mod tenancy;
pub mod tenant;
