//! File-based expense repository (`expenses.csv`, one file per property,
//! rows keyed to their billing cycle).

use anyhow::{Context, Result};
use csv::{Reader, Writer};
use log::debug;
use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter};

use super::connection::CsvConnection;
use crate::domain::models::expense::Expense;
use crate::domain::models::service_rule::ServiceType;
use crate::storage::traits::ExpenseStorage;

const EXPENSES_FILE: &str = "expenses.csv";
const HEADER: [&str; 6] = [
    "id",
    "billing_cycle_id",
    "service_type",
    "amount",
    "description",
    "created_at",
];

#[derive(Clone)]
pub struct ExpenseRepository {
    connection: CsvConnection,
}

impl ExpenseRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    fn read_expenses(&self, property_id: &str) -> Result<Vec<Expense>> {
        let path = self.connection.property_file(property_id, EXPENSES_FILE);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&path)?;
        let mut csv_reader = Reader::from_reader(BufReader::new(file));

        let mut expenses = Vec::new();
        for result in csv_reader.records() {
            let record = result?;

            let service_type = ServiceType::parse(record.get(2).unwrap_or(""))
                .map_err(|e| anyhow::anyhow!(e))?;
            let amount: f64 = record
                .get(3)
                .unwrap_or("")
                .parse()
                .context("invalid amount in expenses.csv")?;

            expenses.push(Expense {
                id: record.get(0).unwrap_or("").to_string(),
                billing_cycle_id: record.get(1).unwrap_or("").to_string(),
                service_type,
                amount,
                description: record.get(4).unwrap_or("").to_string(),
                created_at: record.get(5).unwrap_or("").to_string(),
            });
        }

        Ok(expenses)
    }

    fn write_expenses(&self, property_id: &str, expenses: &[Expense]) -> Result<()> {
        self.connection.ensure_property_directory(property_id)?;
        let path = self.connection.property_file(property_id, EXPENSES_FILE);

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)?;
        let mut csv_writer = Writer::from_writer(BufWriter::new(file));

        csv_writer.write_record(HEADER)?;
        for expense in expenses {
            let amount = expense.amount.to_string();
            csv_writer.write_record([
                expense.id.as_str(),
                expense.billing_cycle_id.as_str(),
                expense.service_type.as_str(),
                amount.as_str(),
                expense.description.as_str(),
                expense.created_at.as_str(),
            ])?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}

impl ExpenseStorage for ExpenseRepository {
    fn store_expense(&self, property_id: &str, expense: &Expense) -> Result<()> {
        let _guard = self.connection.write_lock();
        let mut expenses = self.read_expenses(property_id)?;
        expenses.push(expense.clone());
        self.write_expenses(property_id, &expenses)?;
        debug!(
            "Stored expense {} against cycle {}",
            expense.id, expense.billing_cycle_id
        );
        Ok(())
    }

    fn list_expenses_for_cycle(
        &self,
        property_id: &str,
        cycle_id: &str,
    ) -> Result<Vec<Expense>> {
        let mut expenses: Vec<Expense> = self
            .read_expenses(property_id)?
            .into_iter()
            .filter(|expense| expense.billing_cycle_id == cycle_id)
            .collect();
        // RFC3339 timestamps with a fixed offset sort lexicographically.
        expenses.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(expenses)
    }
}
