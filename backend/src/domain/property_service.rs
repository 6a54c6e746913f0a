//! Property, unit and tenant management.
//!
//! Thin CRUD around the engine's aggregates. Every operation takes the
//! calling owner id and resolves the property through it; a property that
//! exists but belongs to someone else is reported exactly like a missing
//! one.

use chrono::Utc;
use log::{info, warn};
use std::sync::Arc;

use crate::domain::commands::property::{
    AddTenantCommand, AddUnitCommand, CreatePropertyCommand, UpdateTenantCommand,
};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::property::{Property, Unit};
use crate::domain::models::tenant::Tenant;
use crate::storage::csv::{CsvConnection, PropertyRepository, TenancyRepository, TenantRepository};
use crate::storage::traits::{PropertyStorage, TenancyStorage, TenantStorage};

#[derive(Clone)]
pub struct PropertyService {
    property_repository: PropertyRepository,
    tenant_repository: TenantRepository,
    tenancy_repository: TenancyRepository,
}

impl PropertyService {
    pub fn new(csv_conn: Arc<CsvConnection>) -> Self {
        Self {
            property_repository: PropertyRepository::new((*csv_conn).clone()),
            tenant_repository: TenantRepository::new((*csv_conn).clone()),
            tenancy_repository: TenancyRepository::new((*csv_conn).clone()),
        }
    }

    pub fn create_property(&self, command: CreatePropertyCommand) -> DomainResult<Property> {
        let name = command.name.trim().to_string();
        if name.is_empty() {
            return Err(DomainError::validation("name", "name cannot be empty"));
        }
        if command.address.trim().is_empty() {
            return Err(DomainError::validation("address", "address cannot be empty"));
        }

        let now = Utc::now().to_rfc3339();
        let property = Property {
            id: Property::generate_id(),
            name,
            address: command.address.trim().to_string(),
            owner_id: command.owner_id,
            created_at: now.clone(),
            updated_at: now,
        };

        self.property_repository.store_property(&property)?;
        info!("Created property {} ({})", property.id, property.name);
        Ok(property)
    }

    /// Resolve a property for `owner_id`. Missing and not-owned are the
    /// same answer.
    pub fn get_property(&self, owner_id: &str, property_id: &str) -> DomainResult<Property> {
        match self.property_repository.get_property(property_id)? {
            Some(property) if property.owner_id == owner_id => Ok(property),
            _ => Err(DomainError::not_found("property")),
        }
    }

    pub fn list_properties(&self, owner_id: &str) -> DomainResult<Vec<Property>> {
        let properties = self.property_repository.list_properties()?;
        Ok(properties
            .into_iter()
            .filter(|property| property.owner_id == owner_id)
            .collect())
    }

    /// Delete a property and everything it owns.
    pub fn delete_property(&self, owner_id: &str, property_id: &str) -> DomainResult<()> {
        let property = self.get_property(owner_id, property_id)?;
        self.property_repository.delete_property(&property.id)?;
        Ok(())
    }

    pub fn add_unit(&self, owner_id: &str, command: AddUnitCommand) -> DomainResult<Unit> {
        let property = self.get_property(owner_id, &command.property_id)?;

        let name = command.name.trim().to_string();
        if name.is_empty() {
            return Err(DomainError::validation("name", "name cannot be empty"));
        }

        let existing = self.property_repository.list_units(&property.id)?;
        if existing.iter().any(|unit| unit.name == name) {
            warn!("Rejected duplicate unit name '{}' on property {}", name, property.id);
            return Err(DomainError::conflict(format!(
                "a unit named '{}' already exists on this property",
                name
            )));
        }

        let unit = Unit {
            id: Unit::generate_id(),
            property_id: property.id.clone(),
            name,
        };
        self.property_repository.store_unit(&unit)?;
        info!("Added unit {} ({}) to property {}", unit.id, unit.name, property.id);
        Ok(unit)
    }

    pub fn rename_unit(
        &self,
        owner_id: &str,
        property_id: &str,
        unit_id: &str,
        new_name: &str,
    ) -> DomainResult<Unit> {
        let property = self.get_property(owner_id, property_id)?;

        let name = new_name.trim().to_string();
        if name.is_empty() {
            return Err(DomainError::validation("name", "name cannot be empty"));
        }

        let mut unit = self
            .property_repository
            .get_unit(&property.id, unit_id)?
            .ok_or_else(|| DomainError::not_found("unit"))?;

        let existing = self.property_repository.list_units(&property.id)?;
        if existing
            .iter()
            .any(|other| other.id != unit.id && other.name == name)
        {
            return Err(DomainError::conflict(format!(
                "a unit named '{}' already exists on this property",
                name
            )));
        }

        unit.name = name;
        self.property_repository.update_unit(&unit)?;
        Ok(unit)
    }

    /// A unit with an active tenancy cannot be removed.
    pub fn delete_unit(&self, owner_id: &str, property_id: &str, unit_id: &str) -> DomainResult<()> {
        let property = self.get_property(owner_id, property_id)?;

        if self
            .property_repository
            .get_unit(&property.id, unit_id)?
            .is_none()
        {
            return Err(DomainError::not_found("unit"));
        }

        let tenancies = self
            .tenancy_repository
            .list_tenancies_for_unit(&property.id, unit_id)?;
        if tenancies.iter().any(|tenancy| tenancy.is_active()) {
            return Err(DomainError::conflict(
                "cannot delete a unit with an active tenancy",
            ));
        }

        self.property_repository.delete_unit(&property.id, unit_id)?;
        info!("Deleted unit {} from property {}", unit_id, property.id);
        Ok(())
    }

    pub fn list_units(&self, owner_id: &str, property_id: &str) -> DomainResult<Vec<Unit>> {
        let property = self.get_property(owner_id, property_id)?;
        Ok(self.property_repository.list_units(&property.id)?)
    }

    pub fn add_tenant(&self, owner_id: &str, command: AddTenantCommand) -> DomainResult<Tenant> {
        let property = self.get_property(owner_id, &command.property_id)?;
        validate_tenant_fields(&command.name, &command.email, command.occupant_count)?;

        let email = command.email.trim().to_string();
        let existing = self.tenant_repository.list_tenants(&property.id)?;
        if existing.iter().any(|tenant| tenant.email == email) {
            return Err(DomainError::conflict(format!(
                "a tenant with email '{}' already exists on this property",
                email
            )));
        }

        let now = Utc::now().to_rfc3339();
        let tenant = Tenant {
            id: Tenant::generate_id(),
            property_id: property.id.clone(),
            name: command.name.trim().to_string(),
            email,
            occupant_count: command.occupant_count,
            created_at: now.clone(),
            updated_at: now,
        };
        self.tenant_repository.store_tenant(&tenant)?;
        info!("Added tenant {} ({}) to property {}", tenant.id, tenant.name, property.id);
        Ok(tenant)
    }

    pub fn update_tenant(&self, owner_id: &str, command: UpdateTenantCommand) -> DomainResult<Tenant> {
        let property = self.get_property(owner_id, &command.property_id)?;
        validate_tenant_fields(&command.name, &command.email, command.occupant_count)?;

        let mut tenant = self
            .tenant_repository
            .get_tenant(&property.id, &command.tenant_id)?
            .ok_or_else(|| DomainError::not_found("tenant"))?;

        tenant.name = command.name.trim().to_string();
        tenant.email = command.email.trim().to_string();
        tenant.occupant_count = command.occupant_count;
        tenant.updated_at = Utc::now().to_rfc3339();
        self.tenant_repository.update_tenant(&tenant)?;
        Ok(tenant)
    }

    pub fn list_tenants(&self, owner_id: &str, property_id: &str) -> DomainResult<Vec<Tenant>> {
        let property = self.get_property(owner_id, property_id)?;
        Ok(self.tenant_repository.list_tenants(&property.id)?)
    }
}

fn validate_tenant_fields(name: &str, email: &str, occupant_count: u32) -> DomainResult<()> {
    if name.trim().is_empty() {
        return Err(DomainError::validation("name", "name cannot be empty"));
    }
    if email.trim().is_empty() || !email.contains('@') {
        return Err(DomainError::validation("email", "a valid email is required"));
    }
    if occupant_count < 1 {
        return Err(DomainError::validation(
            "occupant_count",
            "occupant count must be at least 1",
        ));
    }
    Ok(())
}
