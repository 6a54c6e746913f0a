use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::service_rule::ServiceType;

/// A shared expense recorded against a billing cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: String,
    pub billing_cycle_id: String,
    pub service_type: ServiceType,
    pub amount: f64,
    pub description: String,
    pub created_at: String,
}

impl Expense {
    pub fn generate_id() -> String {
        format!("exp-{}", Uuid::new_v4())
    }
}
