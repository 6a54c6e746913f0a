//! Domain models for a property and its units.
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub id: String,
    pub name: String,
    pub address: String,
    /// External user that owns the property. Every property-scoped lookup
    /// is filtered by this id; a mismatch is reported as "not found".
    pub owner_id: String,
    pub created_at: String,
    pub updated_at: String,
}

impl Property {
    pub fn generate_id() -> String {
        format!("prop-{}", Uuid::new_v4())
    }
}

/// A rentable unit inside a property. Unit names are unique within their
/// property, not globally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub id: String,
    pub property_id: String,
    pub name: String,
}

impl Unit {
    pub fn generate_id() -> String {
        format!("unit-{}", Uuid::new_v4())
    }
}
