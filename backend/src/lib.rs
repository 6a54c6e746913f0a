//! # Rental Tracker Backend
//!
//! Cost-allocation and occupancy engine for rental properties: billing
//! cycles, per-service allocation rules, proration math and tenancy
//! intervals. The crate is transport-agnostic; a request layer maps its
//! own payloads onto the command types in [`domain::commands`] and calls
//! the services on [`Backend`].

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;

pub mod domain;
pub mod storage;

pub use domain::errors::{DomainError, DomainResult};
pub use storage::csv::CsvConnection;

/// Main backend struct that orchestrates all services over one storage
/// connection.
pub struct Backend {
    pub property_service: domain::PropertyService,
    pub tenancy_service: domain::TenancyService,
    pub billing_cycle_service: domain::BillingCycleService,
    pub service_rule_service: domain::ServiceRuleService,
    pub expense_service: domain::ExpenseService,
}

impl Backend {
    /// Create a backend rooted at `data_dir`, creating the directory if
    /// needed.
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Result<Self> {
        let csv_conn = Arc::new(CsvConnection::new(data_dir)?);

        Ok(Backend {
            property_service: domain::PropertyService::new(csv_conn.clone()),
            tenancy_service: domain::TenancyService::new(csv_conn.clone()),
            billing_cycle_service: domain::BillingCycleService::new(csv_conn.clone()),
            service_rule_service: domain::ServiceRuleService::new(csv_conn.clone()),
            expense_service: domain::ExpenseService::new(csv_conn),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::commands::billing_cycle::CreateBillingCycleCommand;
    use crate::domain::commands::expense::CreateExpenseCommand;
    use crate::domain::commands::property::{
        AddTenantCommand, AddUnitCommand, CreatePropertyCommand,
    };
    use crate::domain::commands::service_rules::{ReplaceServiceRulesCommand, ServiceRuleEntry};
    use crate::domain::commands::tenancy::CreateTenancyCommand;
    use crate::domain::models::service_rule::{RuleType, ServiceType};
    use crate::domain::proration::compute_shares;
    use chrono::{Datelike, Local, NaiveDate};
    use tempfile::TempDir;

    const OWNER: &str = "user-1";

    #[test]
    fn test_full_expense_flow() {
        let dir = TempDir::new().unwrap();
        let backend = Backend::new(dir.path()).unwrap();

        let property = backend
            .property_service
            .create_property(CreatePropertyCommand {
                owner_id: OWNER.to_string(),
                name: "Edificio Central".to_string(),
                address: "Calle Principal 123".to_string(),
            })
            .unwrap();

        // Two occupied units: 1 and 2 occupants.
        for (unit_name, occupants) in [("101", 1u32), ("102", 2u32)] {
            let unit = backend
                .property_service
                .add_unit(
                    OWNER,
                    AddUnitCommand {
                        property_id: property.id.clone(),
                        name: unit_name.to_string(),
                    },
                )
                .unwrap();
            let tenant = backend
                .property_service
                .add_tenant(
                    OWNER,
                    AddTenantCommand {
                        property_id: property.id.clone(),
                        name: format!("Tenant {}", unit_name),
                        email: format!("tenant{}@example.com", unit_name),
                        occupant_count: occupants,
                    },
                )
                .unwrap();
            backend
                .tenancy_service
                .create_tenancy(
                    OWNER,
                    CreateTenancyCommand {
                        unit_id: unit.id,
                        tenant_id: tenant.id,
                        start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                        end_date: None,
                    },
                )
                .unwrap();
        }

        backend
            .service_rule_service
            .replace_all(
                OWNER,
                ReplaceServiceRulesCommand {
                    property_id: property.id.clone(),
                    entries: vec![ServiceRuleEntry {
                        service_type: ServiceType::Water,
                        rule_type: RuleType::OccupantProration,
                    }],
                },
            )
            .unwrap();

        let today = Local::now().date_naive();
        let cycle = backend
            .billing_cycle_service
            .create_cycle(
                OWNER,
                CreateBillingCycleCommand {
                    property_id: property.id.clone(),
                    month: today.month(),
                    year: today.year(),
                },
            )
            .unwrap();

        let expense = backend
            .expense_service
            .create_expense(
                OWNER,
                CreateExpenseCommand {
                    cycle_id: cycle.id.clone(),
                    service_type: ServiceType::Water,
                    amount: 90.0,
                    description: "recibo de agua".to_string(),
                },
            )
            .unwrap();
        assert_eq!(expense.billing_cycle_id, cycle.id);

        // Current occupancy feeds the proration math.
        let participants = backend
            .tenancy_service
            .share_participants(OWNER, &property.id)
            .unwrap();
        let shares =
            compute_shares(expense.amount, RuleType::OccupantProration, &participants).unwrap();
        let mut sorted = shares.clone();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(sorted, vec![30.0, 60.0]);
    }
}
