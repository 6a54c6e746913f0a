//! Test infrastructure for the file-based repositories.
//!
//! RAII cleanup: the temporary directory lives as long as the
//! environment, so files are removed even when a test panics.

use anyhow::Result;
use tempfile::TempDir;

use super::billing_cycle_repository::BillingCycleRepository;
use super::connection::CsvConnection;
use super::expense_repository::ExpenseRepository;
use super::property_repository::PropertyRepository;
use super::service_rule_repository::ServiceRuleRepository;
use super::tenancy_repository::TenancyRepository;
use super::tenant_repository::TenantRepository;

/// A connection rooted in a temporary directory that is deleted when the
/// environment is dropped.
pub struct TestEnvironment {
    pub connection: CsvConnection,
    pub base_path: std::path::PathBuf,
    _temp_dir: TempDir,
}

impl TestEnvironment {
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let connection = CsvConnection::new(temp_dir.path())?;
        Ok(Self {
            connection,
            base_path: temp_dir.path().to_path_buf(),
            _temp_dir: temp_dir,
        })
    }
}

/// Repository instances over a fresh test environment.
pub struct TestHelper {
    pub env: TestEnvironment,
    pub property_repo: PropertyRepository,
    pub tenant_repo: TenantRepository,
    pub tenancy_repo: TenancyRepository,
    pub cycle_repo: BillingCycleRepository,
    pub rule_repo: ServiceRuleRepository,
    pub expense_repo: ExpenseRepository,
}

impl TestHelper {
    pub fn new() -> Result<Self> {
        let env = TestEnvironment::new()?;
        let property_repo = PropertyRepository::new(env.connection.clone());
        let tenant_repo = TenantRepository::new(env.connection.clone());
        let tenancy_repo = TenancyRepository::new(env.connection.clone());
        let cycle_repo = BillingCycleRepository::new(env.connection.clone());
        let rule_repo = ServiceRuleRepository::new(env.connection.clone());
        let expense_repo = ExpenseRepository::new(env.connection.clone());

        Ok(Self {
            env,
            property_repo,
            tenant_repo,
            tenancy_repo,
            cycle_repo,
            rule_repo,
            expense_repo,
        })
    }
}
