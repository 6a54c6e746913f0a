//! Billing cycle lifecycle.
//!
//! A cycle is the monthly accounting period gating expense entry. Cycles
//! are created directly into `Open`; what moves them to `InReview` or
//! `Closed` is an administrative action outside the core, so
//! `update_status` applies the change without a transition matrix.

use chrono::{Datelike, Local, Utc};
use log::{info, warn};
use std::sync::Arc;

use crate::domain::commands::billing_cycle::{
    CreateBillingCycleCommand, UpdateCycleStatusCommand,
};
use crate::domain::errors::{map_storage_error, DomainError, DomainResult};
use crate::domain::models::billing_cycle::{
    BillingCycle, CycleStatus, MAX_CYCLE_YEAR, MIN_CYCLE_YEAR,
};
use crate::domain::property_service::PropertyService;
use crate::storage::csv::{BillingCycleRepository, CsvConnection};
use crate::storage::traits::BillingCycleStorage;

#[derive(Clone)]
pub struct BillingCycleService {
    cycle_repository: BillingCycleRepository,
    property_service: PropertyService,
}

impl BillingCycleService {
    pub fn new(csv_conn: Arc<CsvConnection>) -> Self {
        Self {
            cycle_repository: BillingCycleRepository::new((*csv_conn).clone()),
            property_service: PropertyService::new(csv_conn),
        }
    }

    pub fn create_cycle(
        &self,
        owner_id: &str,
        command: CreateBillingCycleCommand,
    ) -> DomainResult<BillingCycle> {
        if !(1..=12).contains(&command.month) {
            return Err(DomainError::validation(
                "month",
                "month must be between 1 and 12",
            ));
        }
        if !(MIN_CYCLE_YEAR..=MAX_CYCLE_YEAR).contains(&command.year) {
            return Err(DomainError::validation(
                "year",
                format!(
                    "year must be between {} and {}",
                    MIN_CYCLE_YEAR, MAX_CYCLE_YEAR
                ),
            ));
        }

        // Only (year, month) is compared, so a cycle for the running
        // month is always allowed regardless of the day.
        let today = Local::now().date_naive();
        if command.year > today.year()
            || (command.year == today.year() && command.month > today.month())
        {
            return Err(DomainError::validation(
                "month",
                "a billing cycle cannot be created for a future month",
            ));
        }

        let property = self
            .property_service
            .get_property(owner_id, &command.property_id)?;

        if self
            .cycle_repository
            .get_cycle_for_period(&property.id, command.month, command.year)?
            .is_some()
        {
            warn!(
                "Rejected duplicate billing cycle {}/{} on property {}",
                command.month, command.year, property.id
            );
            return Err(DomainError::conflict(format!(
                "a billing cycle for {}/{} already exists for this property",
                command.month, command.year
            )));
        }

        let cycle = BillingCycle {
            id: BillingCycle::generate_id(),
            property_id: property.id.clone(),
            month: command.month,
            year: command.year,
            status: CycleStatus::Open,
            created_at: Utc::now().to_rfc3339(),
        };

        self.cycle_repository
            .store_cycle(&cycle)
            .map_err(map_storage_error)?;

        info!(
            "Created billing cycle {} ({}) on property {}",
            cycle.id,
            cycle.period_label(),
            property.id
        );
        Ok(cycle)
    }

    /// A property's cycles, most recent period first.
    pub fn list_cycles(&self, owner_id: &str, property_id: &str) -> DomainResult<Vec<BillingCycle>> {
        let property = self.property_service.get_property(owner_id, property_id)?;
        Ok(self.cycle_repository.list_cycles(&property.id)?)
    }

    /// Resolve a cycle for `owner_id`. A cycle on someone else's property
    /// is indistinguishable from a missing one.
    pub fn get_cycle(&self, owner_id: &str, cycle_id: &str) -> DomainResult<BillingCycle> {
        let cycle = self
            .cycle_repository
            .find_cycle(cycle_id)?
            .ok_or_else(|| DomainError::not_found("billing cycle"))?;

        self.property_service
            .get_property(owner_id, &cycle.property_id)
            .map_err(|_| DomainError::not_found("billing cycle"))?;

        Ok(cycle)
    }

    pub fn update_status(
        &self,
        owner_id: &str,
        command: UpdateCycleStatusCommand,
    ) -> DomainResult<BillingCycle> {
        let mut cycle = self.get_cycle(owner_id, &command.cycle_id)?;
        cycle.status = command.status;
        self.cycle_repository.update_cycle(&cycle)?;
        info!(
            "Billing cycle {} is now {}",
            cycle.id,
            cycle.status.as_str()
        );
        Ok(cycle)
    }

    pub fn is_open_for_expenses(cycle: &BillingCycle) -> bool {
        cycle.is_open()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::commands::property::CreatePropertyCommand;
    use tempfile::TempDir;

    const OWNER: &str = "user-1";

    struct Fixture {
        cycle_service: BillingCycleService,
        property_id: String,
        _dir: TempDir,
    }

    fn setup_test() -> Fixture {
        let temp_dir = TempDir::new().unwrap();
        let conn = Arc::new(CsvConnection::new(temp_dir.path()).unwrap());
        let property_service = PropertyService::new(conn.clone());
        let cycle_service = BillingCycleService::new(conn);

        let property = property_service
            .create_property(CreatePropertyCommand {
                owner_id: OWNER.to_string(),
                name: "Edificio Central".to_string(),
                address: "Calle Principal 123".to_string(),
            })
            .unwrap();

        Fixture {
            cycle_service,
            property_id: property.id,
            _dir: temp_dir,
        }
    }

    /// The most recent past month that stays inside the allowed year
    /// range, so creation never trips the future-month rule.
    fn past_period() -> (u32, i32) {
        let today = Local::now().date_naive();
        if today.month() > 1 {
            (today.month() - 1, today.year())
        } else {
            (12, today.year() - 1)
        }
    }

    fn next_period() -> (u32, i32) {
        let today = Local::now().date_naive();
        if today.month() < 12 {
            (today.month() + 1, today.year())
        } else {
            (1, today.year() + 1)
        }
    }

    #[test]
    fn test_create_cycle_opens_it() {
        let fixture = setup_test();
        let (month, year) = past_period();

        let cycle = fixture
            .cycle_service
            .create_cycle(
                OWNER,
                CreateBillingCycleCommand {
                    property_id: fixture.property_id.clone(),
                    month,
                    year,
                },
            )
            .unwrap();

        assert_eq!(cycle.status, CycleStatus::Open);
        assert!(BillingCycleService::is_open_for_expenses(&cycle));
    }

    #[test]
    fn test_duplicate_cycle_conflicts() {
        let fixture = setup_test();
        let (month, year) = past_period();
        let command = CreateBillingCycleCommand {
            property_id: fixture.property_id.clone(),
            month,
            year,
        };

        fixture.cycle_service.create_cycle(OWNER, command.clone()).unwrap();
        let err = fixture.cycle_service.create_cycle(OWNER, command).unwrap_err();
        assert!(err.is_conflict());
    }

    #[test]
    fn test_future_cycle_rejected() {
        let fixture = setup_test();
        let (month, year) = next_period();

        let err = fixture
            .cycle_service
            .create_cycle(
                OWNER,
                CreateBillingCycleCommand {
                    property_id: fixture.property_id.clone(),
                    month,
                    year,
                },
            )
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_current_month_allowed() {
        let fixture = setup_test();
        let today = Local::now().date_naive();

        let cycle = fixture
            .cycle_service
            .create_cycle(
                OWNER,
                CreateBillingCycleCommand {
                    property_id: fixture.property_id.clone(),
                    month: today.month(),
                    year: today.year(),
                },
            )
            .unwrap();
        assert_eq!(cycle.month, today.month());
    }

    #[test]
    fn test_month_and_year_ranges() {
        let fixture = setup_test();

        let err = fixture
            .cycle_service
            .create_cycle(
                OWNER,
                CreateBillingCycleCommand {
                    property_id: fixture.property_id.clone(),
                    month: 13,
                    year: 2024,
                },
            )
            .unwrap_err();
        assert!(err.is_validation());

        let err = fixture
            .cycle_service
            .create_cycle(
                OWNER,
                CreateBillingCycleCommand {
                    property_id: fixture.property_id.clone(),
                    month: 6,
                    year: 2050,
                },
            )
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_list_cycles_most_recent_first() {
        let fixture = setup_test();

        for (month, year) in [(6, 2023), (7, 2023), (5, 2023)] {
            fixture
                .cycle_service
                .create_cycle(
                    OWNER,
                    CreateBillingCycleCommand {
                        property_id: fixture.property_id.clone(),
                        month,
                        year,
                    },
                )
                .unwrap();
        }

        let cycles = fixture
            .cycle_service
            .list_cycles(OWNER, &fixture.property_id)
            .unwrap();
        let periods: Vec<(i32, u32)> = cycles.iter().map(|c| (c.year, c.month)).collect();
        assert_eq!(periods, vec![(2023, 7), (2023, 6), (2023, 5)]);
    }

    #[test]
    fn test_update_status() {
        let fixture = setup_test();
        let (month, year) = past_period();
        let cycle = fixture
            .cycle_service
            .create_cycle(
                OWNER,
                CreateBillingCycleCommand {
                    property_id: fixture.property_id.clone(),
                    month,
                    year,
                },
            )
            .unwrap();

        let updated = fixture
            .cycle_service
            .update_status(
                OWNER,
                UpdateCycleStatusCommand {
                    cycle_id: cycle.id.clone(),
                    status: CycleStatus::Closed,
                },
            )
            .unwrap();
        assert_eq!(updated.status, CycleStatus::Closed);
        assert!(!BillingCycleService::is_open_for_expenses(&updated));
    }

    #[test]
    fn test_cycle_hidden_from_other_owner() {
        let fixture = setup_test();
        let (month, year) = past_period();
        let cycle = fixture
            .cycle_service
            .create_cycle(
                OWNER,
                CreateBillingCycleCommand {
                    property_id: fixture.property_id.clone(),
                    month,
                    year,
                },
            )
            .unwrap();

        let err = fixture
            .cycle_service
            .get_cycle("someone-else", &cycle.id)
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
