//! Domain-level command types.
//!
//! These structs are the inputs services accept. A transport layer (REST
//! or otherwise) is responsible for parsing wire payloads, including enum
//! and date strings, into these typed commands before calling in.

pub mod property {
    /// Input for creating a new property.
    #[derive(Debug, Clone)]
    pub struct CreatePropertyCommand {
        pub owner_id: String,
        pub name: String,
        pub address: String,
    }

    /// Input for adding a unit to a property.
    #[derive(Debug, Clone)]
    pub struct AddUnitCommand {
        pub property_id: String,
        pub name: String,
    }

    /// Input for creating a tenant on a property's register.
    #[derive(Debug, Clone)]
    pub struct AddTenantCommand {
        pub property_id: String,
        pub name: String,
        pub email: String,
        pub occupant_count: u32,
    }

    /// Input for updating a tenant's details.
    #[derive(Debug, Clone)]
    pub struct UpdateTenantCommand {
        pub property_id: String,
        pub tenant_id: String,
        pub name: String,
        pub email: String,
        pub occupant_count: u32,
    }
}

pub mod tenancy {
    use chrono::NaiveDate;

    /// Input for starting a tenancy on a unit.
    #[derive(Debug, Clone)]
    pub struct CreateTenancyCommand {
        pub unit_id: String,
        pub tenant_id: String,
        pub start_date: NaiveDate,
        pub end_date: Option<NaiveDate>,
    }

    /// Input for ending an active tenancy.
    #[derive(Debug, Clone)]
    pub struct EndTenancyCommand {
        pub tenancy_id: String,
        pub end_date: NaiveDate,
    }
}

pub mod billing_cycle {
    use crate::domain::models::billing_cycle::CycleStatus;

    /// Input for opening a billing cycle.
    #[derive(Debug, Clone)]
    pub struct CreateBillingCycleCommand {
        pub property_id: String,
        pub month: u32,
        pub year: i32,
    }

    /// Administrative status change. Transition triggers live outside the
    /// core; the closed enum is the only guard.
    #[derive(Debug, Clone)]
    pub struct UpdateCycleStatusCommand {
        pub cycle_id: String,
        pub status: CycleStatus,
    }
}

pub mod service_rules {
    use crate::domain::models::service_rule::{RuleType, ServiceType};

    /// One entry of a service-rule configuration.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ServiceRuleEntry {
        pub service_type: ServiceType,
        pub rule_type: RuleType,
    }

    /// Input for atomically replacing a property's rule configuration.
    #[derive(Debug, Clone)]
    pub struct ReplaceServiceRulesCommand {
        pub property_id: String,
        pub entries: Vec<ServiceRuleEntry>,
    }
}

pub mod expense {
    use crate::domain::models::service_rule::ServiceType;

    /// Input for recording an expense against a billing cycle.
    #[derive(Debug, Clone)]
    pub struct CreateExpenseCommand {
        pub cycle_id: String,
        pub service_type: ServiceType,
        pub amount: f64,
        pub description: String,
    }
}
