//! Expense recording.
//!
//! Whether an expense may be recorded is decided by two ordered checks:
//! the parent cycle must be open, and the property must have a rule
//! configured for the expense's service type. When the configured rule is
//! occupant proration the occupancy precondition is re-checked here,
//! because occupancy can change after the rules were configured.

use chrono::Utc;
use log::{info, warn};
use std::sync::Arc;

use crate::domain::billing_cycle_service::BillingCycleService;
use crate::domain::commands::expense::CreateExpenseCommand;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::billing_cycle::BillingCycle;
use crate::domain::models::expense::Expense;
use crate::domain::models::service_rule::{RuleType, ServiceRule, ServiceType};
use crate::domain::property_service::PropertyService;
use crate::domain::tenancy_service::TenancyService;
use crate::storage::csv::{CsvConnection, ExpenseRepository, ServiceRuleRepository};
use crate::storage::traits::{ExpenseStorage, ServiceRuleStorage};

#[derive(Clone)]
pub struct ExpenseService {
    expense_repository: ExpenseRepository,
    rule_repository: ServiceRuleRepository,
    cycle_service: BillingCycleService,
    property_service: PropertyService,
    tenancy_service: TenancyService,
}

impl ExpenseService {
    pub fn new(csv_conn: Arc<CsvConnection>) -> Self {
        Self {
            expense_repository: ExpenseRepository::new((*csv_conn).clone()),
            rule_repository: ServiceRuleRepository::new((*csv_conn).clone()),
            cycle_service: BillingCycleService::new(csv_conn.clone()),
            property_service: PropertyService::new(csv_conn.clone()),
            tenancy_service: TenancyService::new(csv_conn),
        }
    }

    /// The gate in front of expense recording. Checks run in order; each
    /// failure is its own conflict so callers can tell them apart.
    pub fn can_record_expense(
        cycle: &BillingCycle,
        rules: &[ServiceRule],
        service_type: ServiceType,
    ) -> DomainResult<()> {
        if !BillingCycleService::is_open_for_expenses(cycle) {
            return Err(DomainError::conflict(format!(
                "billing cycle {} is not open for new expenses",
                cycle.period_label()
            )));
        }
        if !rules
            .iter()
            .any(|rule| rule.service_type == service_type)
        {
            return Err(DomainError::conflict(format!(
                "no rule configured for service '{}' on this property",
                service_type.as_str()
            )));
        }
        Ok(())
    }

    pub fn create_expense(
        &self,
        owner_id: &str,
        command: CreateExpenseCommand,
    ) -> DomainResult<Expense> {
        if !(command.amount > 0.0) {
            return Err(DomainError::validation(
                "amount",
                "amount must be greater than zero",
            ));
        }

        let cycle = self.cycle_service.get_cycle(owner_id, &command.cycle_id)?;
        let rules = self.rule_repository.list_rules(&cycle.property_id)?;

        Self::can_record_expense(&cycle, &rules, command.service_type)?;

        // Occupancy may have changed since the rule was configured, so
        // the occupant-proration precondition is checked again against
        // current state.
        let configured_rule = rules
            .iter()
            .find(|rule| rule.service_type == command.service_type);
        if let Some(rule) = configured_rule {
            if rule.rule_type == RuleType::OccupantProration {
                let units = self
                    .property_service
                    .list_units(owner_id, &cycle.property_id)?;
                if let Some(unit_name) = self
                    .tenancy_service
                    .first_unit_without_occupants(&cycle.property_id, &units)?
                {
                    warn!(
                        "Rejected expense on cycle {}: unit '{}' lost its occupancy",
                        cycle.id, unit_name
                    );
                    return Err(DomainError::conflict(format!(
                        "occupant proration requires every unit to have an assigned tenancy with occupants; unit '{}' has none",
                        unit_name
                    )));
                }
            }
        }

        let expense = Expense {
            id: Expense::generate_id(),
            billing_cycle_id: cycle.id.clone(),
            service_type: command.service_type,
            amount: command.amount,
            description: command.description,
            created_at: Utc::now().to_rfc3339(),
        };

        self.expense_repository
            .store_expense(&cycle.property_id, &expense)?;

        info!(
            "Recorded expense {} of {:.2} for '{}' on cycle {}",
            expense.id,
            expense.amount,
            expense.service_type.as_str(),
            cycle.id
        );
        Ok(expense)
    }

    /// Expenses of a cycle, most recent first.
    pub fn list_expenses(&self, owner_id: &str, cycle_id: &str) -> DomainResult<Vec<Expense>> {
        let cycle = self.cycle_service.get_cycle(owner_id, cycle_id)?;
        Ok(self
            .expense_repository
            .list_expenses_for_cycle(&cycle.property_id, &cycle.id)?)
    }
}
