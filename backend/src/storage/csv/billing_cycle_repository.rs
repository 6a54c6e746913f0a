//! File-based billing cycle repository (`billing_cycles.csv`, one file
//! per property). The `(property, month, year)` uniqueness is re-checked
//! at append time under the write lock as the backstop for concurrent
//! creates.

use anyhow::{Context, Result};
use csv::{Reader, Writer};
use log::debug;
use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter};

use super::connection::CsvConnection;
use crate::domain::models::billing_cycle::{BillingCycle, CycleStatus};
use crate::storage::traits::{BillingCycleStorage, StorageConflict};

const CYCLES_FILE: &str = "billing_cycles.csv";
const HEADER: [&str; 6] = ["id", "property_id", "month", "year", "status", "created_at"];

#[derive(Clone)]
pub struct BillingCycleRepository {
    connection: CsvConnection,
}

impl BillingCycleRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    fn read_cycles(&self, property_id: &str) -> Result<Vec<BillingCycle>> {
        let path = self.connection.property_file(property_id, CYCLES_FILE);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&path)?;
        let mut csv_reader = Reader::from_reader(BufReader::new(file));

        let mut cycles = Vec::new();
        for result in csv_reader.records() {
            let record = result?;

            let month: u32 = record
                .get(2)
                .unwrap_or("")
                .parse()
                .context("invalid month in billing_cycles.csv")?;
            let year: i32 = record
                .get(3)
                .unwrap_or("")
                .parse()
                .context("invalid year in billing_cycles.csv")?;
            let status = CycleStatus::parse(record.get(4).unwrap_or(""))
                .map_err(|e| anyhow::anyhow!(e))?;

            cycles.push(BillingCycle {
                id: record.get(0).unwrap_or("").to_string(),
                property_id: record.get(1).unwrap_or("").to_string(),
                month,
                year,
                status,
                created_at: record.get(5).unwrap_or("").to_string(),
            });
        }

        Ok(cycles)
    }

    fn write_cycles(&self, property_id: &str, cycles: &[BillingCycle]) -> Result<()> {
        self.connection.ensure_property_directory(property_id)?;
        let path = self.connection.property_file(property_id, CYCLES_FILE);

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)?;
        let mut csv_writer = Writer::from_writer(BufWriter::new(file));

        csv_writer.write_record(HEADER)?;
        for cycle in cycles {
            let month = cycle.month.to_string();
            let year = cycle.year.to_string();
            csv_writer.write_record([
                cycle.id.as_str(),
                cycle.property_id.as_str(),
                month.as_str(),
                year.as_str(),
                cycle.status.as_str(),
                cycle.created_at.as_str(),
            ])?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}

impl BillingCycleStorage for BillingCycleRepository {
    fn store_cycle(&self, cycle: &BillingCycle) -> Result<()> {
        let _guard = self.connection.write_lock();
        let mut cycles = self.read_cycles(&cycle.property_id)?;

        if cycles
            .iter()
            .any(|existing| existing.month == cycle.month && existing.year == cycle.year)
        {
            return Err(StorageConflict(format!(
                "a billing cycle for {} already exists on property {}",
                cycle.period_label(),
                cycle.property_id
            ))
            .into());
        }

        cycles.push(cycle.clone());
        self.write_cycles(&cycle.property_id, &cycles)?;
        debug!("Stored billing cycle {} ({})", cycle.id, cycle.period_label());
        Ok(())
    }

    fn get_cycle_for_period(
        &self,
        property_id: &str,
        month: u32,
        year: i32,
    ) -> Result<Option<BillingCycle>> {
        let cycles = self.read_cycles(property_id)?;
        Ok(cycles
            .into_iter()
            .find(|cycle| cycle.month == month && cycle.year == year))
    }

    fn list_cycles(&self, property_id: &str) -> Result<Vec<BillingCycle>> {
        let mut cycles = self.read_cycles(property_id)?;
        cycles.sort_by(|a, b| (b.year, b.month).cmp(&(a.year, a.month)));
        Ok(cycles)
    }

    fn find_cycle(&self, cycle_id: &str) -> Result<Option<BillingCycle>> {
        for property_id in self.connection.list_property_directories()? {
            let cycles = self.read_cycles(&property_id)?;
            if let Some(cycle) = cycles.into_iter().find(|c| c.id == cycle_id) {
                return Ok(Some(cycle));
            }
        }
        Ok(None)
    }

    fn update_cycle(&self, cycle: &BillingCycle) -> Result<()> {
        let _guard = self.connection.write_lock();
        let mut cycles = self.read_cycles(&cycle.property_id)?;
        match cycles.iter_mut().find(|existing| existing.id == cycle.id) {
            Some(existing) => *existing = cycle.clone(),
            None => anyhow::bail!(
                "billing cycle {} does not exist on property {}",
                cycle.id,
                cycle.property_id
            ),
        }
        self.write_cycles(&cycle.property_id, &cycles)
    }
}
