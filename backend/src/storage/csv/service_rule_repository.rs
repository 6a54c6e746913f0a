//! File-based service rule repository.
//!
//! The whole rule set of a property is one YAML document
//! (`service_rules.yaml`). Replacing it is a single atomic rename, which
//! is what makes `replace_rules` a transactional unit of work: concurrent
//! readers see either the old set or the new one, and a failed write
//! leaves the old file untouched.

use anyhow::{Context, Result};
use log::info;
use std::fs;

use super::connection::CsvConnection;
use crate::domain::models::service_rule::ServiceRule;
use crate::storage::traits::ServiceRuleStorage;

const RULES_FILE: &str = "service_rules.yaml";

#[derive(Clone)]
pub struct ServiceRuleRepository {
    connection: CsvConnection,
}

impl ServiceRuleRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }
}

impl ServiceRuleStorage for ServiceRuleRepository {
    fn replace_rules(&self, property_id: &str, rules: &[ServiceRule]) -> Result<()> {
        let _guard = self.connection.write_lock();
        self.connection.ensure_property_directory(property_id)?;
        let path = self.connection.property_file(property_id, RULES_FILE);
        let content = serde_yaml::to_string(rules)?;
        self.connection.write_atomic(&path, &content)?;
        info!(
            "Replaced service rule configuration for property {} ({} rules)",
            property_id,
            rules.len()
        );
        Ok(())
    }

    fn list_rules(&self, property_id: &str) -> Result<Vec<ServiceRule>> {
        let path = self.connection.property_file(property_id, RULES_FILE);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&path)?;
        let rules: Vec<ServiceRule> =
            serde_yaml::from_str(&content).context("failed to parse service_rules.yaml")?;
        Ok(rules)
    }
}
