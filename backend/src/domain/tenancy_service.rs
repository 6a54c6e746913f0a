//! Tenancy lifecycle: starting, ending and querying occupancy intervals.
//!
//! The overlap rules live in [`crate::domain::tenancy_validation`]; this
//! service runs them against persisted state before any write, and the
//! tenancy repository re-checks the exclusion under its write lock so a
//! check-then-act race still cannot produce two conflicting rows.

use chrono::{Local, NaiveDate, Utc};
use log::{info, warn};
use std::sync::Arc;

use crate::domain::commands::tenancy::{CreateTenancyCommand, EndTenancyCommand};
use crate::domain::errors::{map_storage_error, DomainError, DomainResult};
use crate::domain::models::property::{Property, Unit};
use crate::domain::models::tenancy::Tenancy;
use crate::domain::proration::ShareParticipant;
use crate::domain::tenancy_validation::{
    find_overlaps, validate_dates, validate_end_against_later_tenancies,
};
use crate::storage::csv::{CsvConnection, PropertyRepository, TenancyRepository, TenantRepository};
use crate::storage::traits::{PropertyStorage, TenancyStorage, TenantStorage};

#[derive(Clone)]
pub struct TenancyService {
    property_repository: PropertyRepository,
    tenant_repository: TenantRepository,
    tenancy_repository: TenancyRepository,
}

impl TenancyService {
    pub fn new(csv_conn: Arc<CsvConnection>) -> Self {
        Self {
            property_repository: PropertyRepository::new((*csv_conn).clone()),
            tenant_repository: TenantRepository::new((*csv_conn).clone()),
            tenancy_repository: TenancyRepository::new((*csv_conn).clone()),
        }
    }

    fn authorized_unit(&self, owner_id: &str, unit_id: &str) -> DomainResult<(Property, Unit)> {
        match self.property_repository.find_unit(unit_id)? {
            Some((property, unit)) if property.owner_id == owner_id => Ok((property, unit)),
            _ => Err(DomainError::not_found("unit")),
        }
    }

    pub fn create_tenancy(
        &self,
        owner_id: &str,
        command: CreateTenancyCommand,
    ) -> DomainResult<Tenancy> {
        let (property, unit) = self.authorized_unit(owner_id, &command.unit_id)?;

        let tenant = self
            .tenant_repository
            .get_tenant(&property.id, &command.tenant_id)?
            .ok_or_else(|| DomainError::not_found("tenant"))?;

        validate_dates(command.start_date, command.end_date)?;

        let existing = self
            .tenancy_repository
            .list_tenancies_for_unit(&property.id, &unit.id)?;
        let conflicts = find_overlaps(&existing, command.start_date, command.end_date, None);
        if let Some(conflict) = conflicts.first() {
            let occupant = self
                .tenant_repository
                .get_tenant(&property.id, &conflict.tenant_id)?
                .map(|t| t.name)
                .unwrap_or_else(|| conflict.tenant_id.clone());
            warn!(
                "Rejected overlapping tenancy on unit {} ({}: {})",
                unit.id,
                occupant,
                conflict.interval_label()
            );
            return Err(DomainError::conflict(format!(
                "the tenancy overlaps an existing tenancy ({}: {})",
                occupant,
                conflict.interval_label()
            )));
        }

        let tenancy = Tenancy {
            id: Tenancy::generate_id(),
            unit_id: unit.id.clone(),
            tenant_id: tenant.id.clone(),
            start_date: command.start_date,
            end_date: command.end_date,
            created_at: Utc::now().to_rfc3339(),
        };

        self.tenancy_repository
            .store_tenancy(&property.id, &tenancy)
            .map_err(map_storage_error)?;

        info!(
            "Created tenancy {} for tenant {} on unit {} ({})",
            tenancy.id,
            tenant.name,
            unit.name,
            tenancy.interval_label()
        );
        Ok(tenancy)
    }

    /// Close an active tenancy at `end_date`. Fails if a later tenancy on
    /// the same unit already starts on or before that date.
    pub fn end_tenancy(&self, owner_id: &str, command: EndTenancyCommand) -> DomainResult<Tenancy> {
        let (property_id, mut tenancy) = self
            .tenancy_repository
            .find_tenancy(&command.tenancy_id)?
            .ok_or_else(|| DomainError::not_found("tenancy"))?;

        match self.property_repository.get_property(&property_id)? {
            Some(property) if property.owner_id == owner_id => {}
            _ => return Err(DomainError::not_found("tenancy")),
        }

        validate_dates(tenancy.start_date, Some(command.end_date))?;

        let others = self
            .tenancy_repository
            .list_tenancies_for_unit(&property_id, &tenancy.unit_id)?;
        validate_end_against_later_tenancies(&tenancy, command.end_date, &others)?;

        tenancy.end_date = Some(command.end_date);
        self.tenancy_repository
            .update_tenancy(&property_id, &tenancy)?;

        info!(
            "Ended tenancy {} on {}",
            tenancy.id,
            command.end_date
        );
        Ok(tenancy)
    }

    /// The unit's open-ended tenancy, if any.
    pub fn get_active_tenancy(
        &self,
        owner_id: &str,
        unit_id: &str,
    ) -> DomainResult<Option<Tenancy>> {
        let (property, unit) = self.authorized_unit(owner_id, unit_id)?;
        let tenancies = self
            .tenancy_repository
            .list_tenancies_for_unit(&property.id, &unit.id)?;
        Ok(tenancies.into_iter().find(|tenancy| tenancy.is_active()))
    }

    /// The tenancy covering `date` (today when omitted), whether still
    /// active or already closed.
    pub fn get_current_tenancy(
        &self,
        owner_id: &str,
        unit_id: &str,
        date: Option<NaiveDate>,
    ) -> DomainResult<Option<Tenancy>> {
        let (property, unit) = self.authorized_unit(owner_id, unit_id)?;
        let date = date.unwrap_or_else(|| Local::now().date_naive());
        let tenancies = self
            .tenancy_repository
            .list_tenancies_for_unit(&property.id, &unit.id)?;
        Ok(tenancies.into_iter().find(|tenancy| tenancy.covers(date)))
    }

    /// Full occupancy history of a unit, most recent start first.
    pub fn tenancy_history(&self, owner_id: &str, unit_id: &str) -> DomainResult<Vec<Tenancy>> {
        let (property, unit) = self.authorized_unit(owner_id, unit_id)?;
        let mut tenancies = self
            .tenancy_repository
            .list_tenancies_for_unit(&property.id, &unit.id)?;
        tenancies.sort_by(|a, b| b.start_date.cmp(&a.start_date));
        Ok(tenancies)
    }

    /// First unit in `units` that has no active tenancy whose tenant
    /// brings at least one occupant. `None` means every unit qualifies
    /// for occupant proration.
    pub(crate) fn first_unit_without_occupants(
        &self,
        property_id: &str,
        units: &[Unit],
    ) -> DomainResult<Option<String>> {
        for unit in units {
            let tenancies = self
                .tenancy_repository
                .list_tenancies_for_unit(property_id, &unit.id)?;
            let active = tenancies.into_iter().find(|tenancy| tenancy.is_active());

            let occupied = match active {
                Some(tenancy) => self
                    .tenant_repository
                    .get_tenant(property_id, &tenancy.tenant_id)?
                    .map(|tenant| tenant.occupant_count > 0)
                    .unwrap_or(false),
                None => false,
            };

            if !occupied {
                return Ok(Some(unit.name.clone()));
            }
        }
        Ok(None)
    }

    /// Current occupancy of a property's units as proration input: one
    /// participant per unit, vacant units counting zero occupants.
    pub fn share_participants(
        &self,
        owner_id: &str,
        property_id: &str,
    ) -> DomainResult<Vec<ShareParticipant>> {
        match self.property_repository.get_property(property_id)? {
            Some(property) if property.owner_id == owner_id => {}
            _ => return Err(DomainError::not_found("property")),
        }

        let units = self.property_repository.list_units(property_id)?;
        let mut participants = Vec::with_capacity(units.len());
        for unit in units {
            let tenancies = self
                .tenancy_repository
                .list_tenancies_for_unit(property_id, &unit.id)?;
            let occupant_count = match tenancies.into_iter().find(|t| t.is_active()) {
                Some(tenancy) => self
                    .tenant_repository
                    .get_tenant(property_id, &tenancy.tenant_id)?
                    .map(|tenant| tenant.occupant_count)
                    .unwrap_or(0),
                None => 0,
            };
            participants.push(ShareParticipant {
                unit_id: unit.id,
                occupant_count,
            });
        }
        Ok(participants)
    }
}
