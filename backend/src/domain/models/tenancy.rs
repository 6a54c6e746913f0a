//! Domain model for a tenancy: a dated occupancy interval linking a tenant
//! to a unit. `end_date == None` means the tenancy is still active.
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tenancy {
    pub id: String,
    pub unit_id: String,
    pub tenant_id: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub created_at: String,
}

impl Tenancy {
    pub fn generate_id() -> String {
        format!("tcy-{}", Uuid::new_v4())
    }

    pub fn is_active(&self) -> bool {
        self.end_date.is_none()
    }

    /// Human-readable interval, used in conflict messages.
    pub fn interval_label(&self) -> String {
        match self.end_date {
            Some(end) => format!("{} - {}", self.start_date, end),
            None => format!("{} - active", self.start_date),
        }
    }

    /// Whether the interval covers `date`.
    pub fn covers(&self, date: NaiveDate) -> bool {
        if self.start_date > date {
            return false;
        }
        match self.end_date {
            Some(end) => end >= date,
            None => true,
        }
    }
}
