//! Service rule configuration.
//!
//! The configuration of a property is replaced as one unit: every check
//! runs before anything is discarded, and the storage write itself is a
//! single atomic document swap, so a failing batch leaves the previous
//! configuration fully intact.

use chrono::Utc;
use log::{info, warn};
use std::collections::HashSet;
use std::sync::Arc;

use crate::domain::commands::service_rules::ReplaceServiceRulesCommand;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::service_rule::{RuleType, ServiceRule};
use crate::domain::property_service::PropertyService;
use crate::domain::tenancy_service::TenancyService;
use crate::storage::csv::{CsvConnection, ServiceRuleRepository};
use crate::storage::traits::ServiceRuleStorage;

#[derive(Clone)]
pub struct ServiceRuleService {
    rule_repository: ServiceRuleRepository,
    property_service: PropertyService,
    tenancy_service: TenancyService,
}

impl ServiceRuleService {
    pub fn new(csv_conn: Arc<CsvConnection>) -> Self {
        Self {
            rule_repository: ServiceRuleRepository::new((*csv_conn).clone()),
            property_service: PropertyService::new(csv_conn.clone()),
            tenancy_service: TenancyService::new(csv_conn),
        }
    }

    /// Atomically replace the property's whole rule configuration.
    pub fn replace_all(
        &self,
        owner_id: &str,
        command: ReplaceServiceRulesCommand,
    ) -> DomainResult<Vec<ServiceRule>> {
        if command.entries.is_empty() {
            return Err(DomainError::validation(
                "service_rules",
                "at least one service rule is required",
            ));
        }

        let mut seen = HashSet::new();
        for entry in &command.entries {
            if !seen.insert(entry.service_type) {
                return Err(DomainError::validation(
                    "service_rules",
                    format!(
                        "duplicate service type '{}' in configuration",
                        entry.service_type.as_str()
                    ),
                ));
            }
        }

        let property = self
            .property_service
            .get_property(owner_id, &command.property_id)?;

        let wants_occupant_proration = command
            .entries
            .iter()
            .any(|entry| entry.rule_type == RuleType::OccupantProration);
        if wants_occupant_proration {
            let units = self.property_service.list_units(owner_id, &property.id)?;
            if units.is_empty() {
                warn!(
                    "Rejected occupant proration on property {} with no units",
                    property.id
                );
                return Err(DomainError::validation(
                    "service_rules",
                    "occupant proration requires the property to have units",
                ));
            }
            if let Some(unit_name) = self
                .tenancy_service
                .first_unit_without_occupants(&property.id, &units)?
            {
                warn!(
                    "Rejected occupant proration on property {}: unit '{}' unoccupied",
                    property.id, unit_name
                );
                return Err(DomainError::validation(
                    "service_rules",
                    format!(
                        "occupant proration requires every unit to have an assigned tenancy with occupants; unit '{}' has none",
                        unit_name
                    ),
                ));
            }
        }

        let now = Utc::now().to_rfc3339();
        let rules: Vec<ServiceRule> = command
            .entries
            .iter()
            .map(|entry| ServiceRule {
                id: ServiceRule::generate_id(),
                property_id: property.id.clone(),
                service_type: entry.service_type,
                rule_type: entry.rule_type,
                created_at: now.clone(),
            })
            .collect();

        self.rule_repository.replace_rules(&property.id, &rules)?;
        info!(
            "Configured {} service rules on property {}",
            rules.len(),
            property.id
        );
        Ok(rules)
    }

    /// The property's current configuration, possibly empty.
    pub fn get_all(&self, owner_id: &str, property_id: &str) -> DomainResult<Vec<ServiceRule>> {
        let property = self.property_service.get_property(owner_id, property_id)?;
        Ok(self.rule_repository.list_rules(&property.id)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::commands::property::{
        AddTenantCommand, AddUnitCommand, CreatePropertyCommand,
    };
    use crate::domain::commands::service_rules::ServiceRuleEntry;
    use crate::domain::commands::tenancy::CreateTenancyCommand;
    use crate::domain::models::service_rule::ServiceType;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    const OWNER: &str = "user-1";

    struct Fixture {
        rule_service: ServiceRuleService,
        property_service: PropertyService,
        tenancy_service: TenancyService,
        property_id: String,
        _dir: TempDir,
    }

    fn setup_test() -> Fixture {
        let temp_dir = TempDir::new().unwrap();
        let conn = Arc::new(CsvConnection::new(temp_dir.path()).unwrap());
        let property_service = PropertyService::new(conn.clone());
        let tenancy_service = TenancyService::new(conn.clone());
        let rule_service = ServiceRuleService::new(conn);

        let property = property_service
            .create_property(CreatePropertyCommand {
                owner_id: OWNER.to_string(),
                name: "Edificio Central".to_string(),
                address: "Calle Principal 123".to_string(),
            })
            .unwrap();

        Fixture {
            rule_service,
            property_service,
            tenancy_service,
            property_id: property.id,
            _dir: temp_dir,
        }
    }

    fn entry(service_type: ServiceType, rule_type: RuleType) -> ServiceRuleEntry {
        ServiceRuleEntry {
            service_type,
            rule_type,
        }
    }

    fn replace(
        fixture: &Fixture,
        entries: Vec<ServiceRuleEntry>,
    ) -> DomainResult<Vec<ServiceRule>> {
        fixture.rule_service.replace_all(
            OWNER,
            ReplaceServiceRulesCommand {
                property_id: fixture.property_id.clone(),
                entries,
            },
        )
    }

    /// Add a unit with an assigned active tenancy of `occupants` people.
    fn add_occupied_unit(fixture: &Fixture, name: &str, occupants: u32) {
        let unit = fixture
            .property_service
            .add_unit(
                OWNER,
                AddUnitCommand {
                    property_id: fixture.property_id.clone(),
                    name: name.to_string(),
                },
            )
            .unwrap();
        let tenant = fixture
            .property_service
            .add_tenant(
                OWNER,
                AddTenantCommand {
                    property_id: fixture.property_id.clone(),
                    name: format!("Tenant {}", name),
                    email: format!("tenant-{}@example.com", name),
                    occupant_count: occupants,
                },
            )
            .unwrap();
        fixture
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

    #[test]
    fn test_replace_all_swaps_configuration() {
        let fixture = setup_test();

        replace(
            &fixture,
            vec![entry(ServiceType::Water, RuleType::EqualDivision)],
        )
        .unwrap();

        let rules = replace(
            &fixture,
            vec![
                entry(ServiceType::Electricity, RuleType::EqualDivision),
                entry(ServiceType::Gas, RuleType::FixedFee),
            ],
        )
        .unwrap();
        assert_eq!(rules.len(), 2);

        // The earlier water rule is gone.
        let stored = fixture
            .rule_service
            .get_all(OWNER, &fixture.property_id)
            .unwrap();
        assert_eq!(stored.len(), 2);
        assert!(stored
            .iter()
            .all(|rule| rule.service_type != ServiceType::Water));
    }

    #[test]
    fn test_empty_batch_rejected() {
        let fixture = setup_test();
        let err = replace(&fixture, vec![]).unwrap_err();
        match &err {
            DomainError::Validation { field, .. } => assert_eq!(field, "service_rules"),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_service_types_rejected_whole_batch() {
        let fixture = setup_test();

        replace(
            &fixture,
            vec![entry(ServiceType::Water, RuleType::EqualDivision)],
        )
        .unwrap();

        let err = replace(
            &fixture,
            vec![
                entry(ServiceType::Electricity, RuleType::EqualDivision),
                entry(ServiceType::Electricity, RuleType::FixedFee),
            ],
        )
        .unwrap_err();
        assert!(err.is_validation());

        // Prior configuration untouched.
        let stored = fixture
            .rule_service
            .get_all(OWNER, &fixture.property_id)
            .unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].service_type, ServiceType::Water);
    }

    #[test]
    fn test_occupant_proration_requires_full_occupancy() {
        let fixture = setup_test();
        add_occupied_unit(&fixture, "101", 2);
        // A vacant unit blocks the whole batch.
        fixture
            .property_service
            .add_unit(
                OWNER,
                AddUnitCommand {
                    property_id: fixture.property_id.clone(),
                    name: "102".to_string(),
                },
            )
            .unwrap();

        let err = replace(
            &fixture,
            vec![entry(ServiceType::Water, RuleType::OccupantProration)],
        )
        .unwrap_err();
        match &err {
            DomainError::Validation { message, .. } => assert!(message.contains("102")),
            other => panic!("expected validation error, got {:?}", other),
        }

        // Nothing was persisted.
        assert!(fixture
            .rule_service
            .get_all(OWNER, &fixture.property_id)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_occupant_proration_with_all_units_occupied() {
        let fixture = setup_test();
        add_occupied_unit(&fixture, "101", 2);
        add_occupied_unit(&fixture, "102", 1);

        let rules = replace(
            &fixture,
            vec![entry(ServiceType::Water, RuleType::OccupantProration)],
        )
        .unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].rule_type, RuleType::OccupantProration);
    }

    #[test]
    fn test_occupant_proration_without_units_rejected() {
        let fixture = setup_test();
        let err = replace(
            &fixture,
            vec![entry(ServiceType::Water, RuleType::OccupantProration)],
        )
        .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_get_all_empty_configuration() {
        let fixture = setup_test();
        assert!(fixture
            .rule_service
            .get_all(OWNER, &fixture.property_id)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_rules_hidden_from_other_owner() {
        let fixture = setup_test();
        let err = fixture
            .rule_service
            .get_all("someone-else", &fixture.property_id)
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
