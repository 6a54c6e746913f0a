//! File-based property and unit repository.
//!
//! The property record itself lives in `property.yaml`, its units as a
//! whole-document list in `units.yaml`. Deleting a property removes its
//! directory, which is what gives the cascade its semantics.

use anyhow::{Context, Result};
use log::{debug, info};
use std::fs;

use super::connection::CsvConnection;
use crate::domain::models::property::{Property, Unit};
use crate::storage::traits::PropertyStorage;

const PROPERTY_FILE: &str = "property.yaml";
const UNITS_FILE: &str = "units.yaml";

#[derive(Clone)]
pub struct PropertyRepository {
    connection: CsvConnection,
}

impl PropertyRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    fn read_units(&self, property_id: &str) -> Result<Vec<Unit>> {
        let path = self.connection.property_file(property_id, UNITS_FILE);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&path)?;
        let units: Vec<Unit> =
            serde_yaml::from_str(&content).context("failed to parse units.yaml")?;
        Ok(units)
    }

    fn write_units(&self, property_id: &str, units: &[Unit]) -> Result<()> {
        self.connection.ensure_property_directory(property_id)?;
        let path = self.connection.property_file(property_id, UNITS_FILE);
        let content = serde_yaml::to_string(units)?;
        self.connection.write_atomic(&path, &content)
    }
}

impl PropertyStorage for PropertyRepository {
    fn store_property(&self, property: &Property) -> Result<()> {
        self.connection.ensure_property_directory(&property.id)?;
        let path = self.connection.property_file(&property.id, PROPERTY_FILE);
        let content = serde_yaml::to_string(property)?;
        self.connection.write_atomic(&path, &content)?;
        info!("Stored property {} ({})", property.id, property.name);
        Ok(())
    }

    fn get_property(&self, property_id: &str) -> Result<Option<Property>> {
        let path = self.connection.property_file(property_id, PROPERTY_FILE);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)?;
        let property: Property =
            serde_yaml::from_str(&content).context("failed to parse property.yaml")?;
        Ok(Some(property))
    }

    fn list_properties(&self) -> Result<Vec<Property>> {
        let mut properties = Vec::new();
        for property_id in self.connection.list_property_directories()? {
            if let Some(property) = self.get_property(&property_id)? {
                properties.push(property);
            }
        }
        properties.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(properties)
    }

    fn delete_property(&self, property_id: &str) -> Result<bool> {
        let dir = self.connection.property_directory(property_id);
        if !dir.exists() {
            return Ok(false);
        }
        let _guard = self.connection.write_lock();
        fs::remove_dir_all(&dir)?;
        info!("Deleted property {} and all owned records", property_id);
        Ok(true)
    }

    fn store_unit(&self, unit: &Unit) -> Result<()> {
        let _guard = self.connection.write_lock();
        let mut units = self.read_units(&unit.property_id)?;
        units.push(unit.clone());
        self.write_units(&unit.property_id, &units)?;
        debug!("Stored unit {} on property {}", unit.id, unit.property_id);
        Ok(())
    }

    fn update_unit(&self, unit: &Unit) -> Result<()> {
        let _guard = self.connection.write_lock();
        let mut units = self.read_units(&unit.property_id)?;
        match units.iter_mut().find(|existing| existing.id == unit.id) {
            Some(existing) => *existing = unit.clone(),
            None => anyhow::bail!("unit {} does not exist on property {}", unit.id, unit.property_id),
        }
        self.write_units(&unit.property_id, &units)
    }

    fn get_unit(&self, property_id: &str, unit_id: &str) -> Result<Option<Unit>> {
        let units = self.read_units(property_id)?;
        Ok(units.into_iter().find(|unit| unit.id == unit_id))
    }

    fn list_units(&self, property_id: &str) -> Result<Vec<Unit>> {
        let mut units = self.read_units(property_id)?;
        units.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(units)
    }

    fn delete_unit(&self, property_id: &str, unit_id: &str) -> Result<bool> {
        let _guard = self.connection.write_lock();
        let mut units = self.read_units(property_id)?;
        let before = units.len();
        units.retain(|unit| unit.id != unit_id);
        if units.len() == before {
            return Ok(false);
        }
        self.write_units(property_id, &units)?;
        Ok(true)
    }

    fn find_unit(&self, unit_id: &str) -> Result<Option<(Property, Unit)>> {
        for property_id in self.connection.list_property_directories()? {
            if let Some(unit) = self.get_unit(&property_id, unit_id)? {
                if let Some(property) = self.get_property(&property_id)? {
                    return Ok(Some((property, unit)));
                }
            }
        }
        Ok(None)
    }
}
