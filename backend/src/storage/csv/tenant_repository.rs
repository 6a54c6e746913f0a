//! File-based tenant repository: the property's tenant register as a
//! whole-document YAML list.

use anyhow::{Context, Result};
use log::debug;
use std::fs;

use super::connection::CsvConnection;
use crate::domain::models::tenant::Tenant;
use crate::storage::traits::TenantStorage;

const TENANTS_FILE: &str = "tenants.yaml";

#[derive(Clone)]
pub struct TenantRepository {
    connection: CsvConnection,
}

impl TenantRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    fn read_tenants(&self, property_id: &str) -> Result<Vec<Tenant>> {
        let path = self.connection.property_file(property_id, TENANTS_FILE);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&path)?;
        let tenants: Vec<Tenant> =
            serde_yaml::from_str(&content).context("failed to parse tenants.yaml")?;
        Ok(tenants)
    }

    fn write_tenants(&self, property_id: &str, tenants: &[Tenant]) -> Result<()> {
        self.connection.ensure_property_directory(property_id)?;
        let path = self.connection.property_file(property_id, TENANTS_FILE);
        let content = serde_yaml::to_string(tenants)?;
        self.connection.write_atomic(&path, &content)
    }
}

impl TenantStorage for TenantRepository {
    fn store_tenant(&self, tenant: &Tenant) -> Result<()> {
        let _guard = self.connection.write_lock();
        let mut tenants = self.read_tenants(&tenant.property_id)?;
        tenants.push(tenant.clone());
        self.write_tenants(&tenant.property_id, &tenants)?;
        debug!("Stored tenant {} on property {}", tenant.id, tenant.property_id);
        Ok(())
    }

    fn get_tenant(&self, property_id: &str, tenant_id: &str) -> Result<Option<Tenant>> {
        let tenants = self.read_tenants(property_id)?;
        Ok(tenants.into_iter().find(|tenant| tenant.id == tenant_id))
    }

    fn list_tenants(&self, property_id: &str) -> Result<Vec<Tenant>> {
        let mut tenants = self.read_tenants(property_id)?;
        tenants.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tenants)
    }

    fn update_tenant(&self, tenant: &Tenant) -> Result<()> {
        let _guard = self.connection.write_lock();
        let mut tenants = self.read_tenants(&tenant.property_id)?;
        match tenants.iter_mut().find(|existing| existing.id == tenant.id) {
            Some(existing) => *existing = tenant.clone(),
            None => anyhow::bail!(
                "tenant {} does not exist on property {}",
                tenant.id,
                tenant.property_id
            ),
        }
        self.write_tenants(&tenant.property_id, &tenants)
    }
}
