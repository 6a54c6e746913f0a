use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A person renting (or able to rent) a unit. `occupant_count` is the
/// number of people living with them and drives occupant proration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tenant {
    pub id: String,
    pub property_id: String,
    pub name: String,
    pub email: String,
    pub occupant_count: u32,
    pub created_at: String,
    pub updated_at: String,
}

impl Tenant {
    pub fn generate_id() -> String {
        format!("tenant-{}", Uuid::new_v4())
    }
}
