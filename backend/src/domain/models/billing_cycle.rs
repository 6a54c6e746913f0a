//! Domain model for a billing cycle: the monthly accounting period that
//! gates expense entry for a property.
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const MIN_CYCLE_YEAR: i32 = 2020;
pub const MAX_CYCLE_YEAR: i32 = 2030;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CycleStatus {
    Open,
    InReview,
    Closed,
}

impl CycleStatus {
    /// Storage representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            CycleStatus::Open => "open",
            CycleStatus::InReview => "in_review",
            CycleStatus::Closed => "closed",
        }
    }

    pub fn parse(s: &str) -> Result<Self, String> {
        match s {
            "open" => Ok(CycleStatus::Open),
            "in_review" => Ok(CycleStatus::InReview),
            "closed" => Ok(CycleStatus::Closed),
            _ => Err(format!("Invalid cycle status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillingCycle {
    pub id: String,
    pub property_id: String,
    pub month: u32,
    pub year: i32,
    pub status: CycleStatus,
    pub created_at: String,
}

impl BillingCycle {
    pub fn generate_id() -> String {
        format!("cycle-{}", Uuid::new_v4())
    }

    pub fn is_open(&self) -> bool {
        self.status == CycleStatus::Open
    }

    /// "7/2024" style label for log and error messages.
    pub fn period_label(&self) -> String {
        format!("{}/{}", self.month, self.year)
    }
}
