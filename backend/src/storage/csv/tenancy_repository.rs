//! File-based tenancy repository.
//!
//! Tenancies are row-oriented (`tenancies.csv`, one file per property).
//! `store_tenancy` is the commit-time backstop for the overlap rule: the
//! service runs the user-facing validation first, but two concurrent
//! requests can both pass it, so the exclusion is re-checked here under
//! the connection's write lock before the row is appended.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use csv::{Reader, Writer};
use log::debug;
use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter};

use super::connection::CsvConnection;
use crate::domain::models::tenancy::Tenancy;
use crate::domain::tenancy_validation::find_overlaps;
use crate::storage::traits::{StorageConflict, TenancyStorage};

const TENANCIES_FILE: &str = "tenancies.csv";
const HEADER: [&str; 6] = [
    "id",
    "unit_id",
    "tenant_id",
    "start_date",
    "end_date",
    "created_at",
];

#[derive(Clone)]
pub struct TenancyRepository {
    connection: CsvConnection,
}

impl TenancyRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    fn read_tenancies(&self, property_id: &str) -> Result<Vec<Tenancy>> {
        let path = self.connection.property_file(property_id, TENANCIES_FILE);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&path)?;
        let mut csv_reader = Reader::from_reader(BufReader::new(file));

        let mut tenancies = Vec::new();
        for result in csv_reader.records() {
            let record = result?;

            let start_date = parse_date(record.get(3).unwrap_or(""))
                .context("invalid start_date in tenancies.csv")?;
            let end_field = record.get(4).unwrap_or("");
            let end_date = if end_field.is_empty() {
                None
            } else {
                Some(parse_date(end_field).context("invalid end_date in tenancies.csv")?)
            };

            tenancies.push(Tenancy {
                id: record.get(0).unwrap_or("").to_string(),
                unit_id: record.get(1).unwrap_or("").to_string(),
                tenant_id: record.get(2).unwrap_or("").to_string(),
                start_date,
                end_date,
                created_at: record.get(5).unwrap_or("").to_string(),
            });
        }

        Ok(tenancies)
    }

    fn write_tenancies(&self, property_id: &str, tenancies: &[Tenancy]) -> Result<()> {
        self.connection.ensure_property_directory(property_id)?;
        let path = self.connection.property_file(property_id, TENANCIES_FILE);

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)?;
        let mut csv_writer = Writer::from_writer(BufWriter::new(file));

        csv_writer.write_record(HEADER)?;
        for tenancy in tenancies {
            let start_date = tenancy.start_date.to_string();
            let end_date = tenancy
                .end_date
                .map(|d| d.to_string())
                .unwrap_or_default();
            csv_writer.write_record([
                tenancy.id.as_str(),
                tenancy.unit_id.as_str(),
                tenancy.tenant_id.as_str(),
                start_date.as_str(),
                end_date.as_str(),
                tenancy.created_at.as_str(),
            ])?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| anyhow::anyhow!("{}: {}", s, e))
}

impl TenancyStorage for TenancyRepository {
    fn store_tenancy(&self, property_id: &str, tenancy: &Tenancy) -> Result<()> {
        let _guard = self.connection.write_lock();
        let mut tenancies = self.read_tenancies(property_id)?;

        let unit_rows: Vec<Tenancy> = tenancies
            .iter()
            .filter(|existing| existing.unit_id == tenancy.unit_id)
            .cloned()
            .collect();
        let conflicts = find_overlaps(&unit_rows, tenancy.start_date, tenancy.end_date, None);
        if let Some(conflict) = conflicts.first() {
            return Err(StorageConflict(format!(
                "unit {} already has a tenancy covering {}",
                tenancy.unit_id,
                conflict.interval_label()
            ))
            .into());
        }

        tenancies.push(tenancy.clone());
        self.write_tenancies(property_id, &tenancies)?;
        debug!("Stored tenancy {} for unit {}", tenancy.id, tenancy.unit_id);
        Ok(())
    }

    fn update_tenancy(&self, property_id: &str, tenancy: &Tenancy) -> Result<()> {
        let _guard = self.connection.write_lock();
        let mut tenancies = self.read_tenancies(property_id)?;
        match tenancies.iter_mut().find(|existing| existing.id == tenancy.id) {
            Some(existing) => *existing = tenancy.clone(),
            None => anyhow::bail!("tenancy {} does not exist on property {}", tenancy.id, property_id),
        }
        self.write_tenancies(property_id, &tenancies)
    }

    fn list_tenancies(&self, property_id: &str) -> Result<Vec<Tenancy>> {
        self.read_tenancies(property_id)
    }

    fn list_tenancies_for_unit(&self, property_id: &str, unit_id: &str) -> Result<Vec<Tenancy>> {
        let tenancies = self.read_tenancies(property_id)?;
        Ok(tenancies
            .into_iter()
            .filter(|tenancy| tenancy.unit_id == unit_id)
            .collect())
    }

    fn find_tenancy(&self, tenancy_id: &str) -> Result<Option<(String, Tenancy)>> {
        for property_id in self.connection.list_property_directories()? {
            let tenancies = self.read_tenancies(&property_id)?;
            if let Some(tenancy) = tenancies.into_iter().find(|t| t.id == tenancy_id) {
                return Ok(Some((property_id, tenancy)));
            }
        }
        Ok(None)
    }
}
