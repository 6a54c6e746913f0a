//! Domain model for service rules: the chosen cost-allocation method for
//! one utility/service type on a property.
//!
//! Both vocabularies are closed enums. Unknown strings coming from storage
//! or a transport layer fail at `parse` time instead of floating through
//! the system as raw text.
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServiceType {
    Electricity,
    Water,
    Arbitrios,
    Motor,
    Maintenance,
    Gas,
}

impl ServiceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceType::Electricity => "electricity",
            ServiceType::Water => "water",
            ServiceType::Arbitrios => "arbitrios",
            ServiceType::Motor => "motor",
            ServiceType::Maintenance => "maintenance",
            ServiceType::Gas => "gas",
        }
    }

    pub fn parse(s: &str) -> Result<Self, String> {
        match s {
            "electricity" => Ok(ServiceType::Electricity),
            "water" => Ok(ServiceType::Water),
            "arbitrios" => Ok(ServiceType::Arbitrios),
            "motor" => Ok(ServiceType::Motor),
            "maintenance" => Ok(ServiceType::Maintenance),
            "gas" => Ok(ServiceType::Gas),
            _ => Err(format!("Invalid service type: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RuleType {
    EqualDivision,
    OccupantProration,
    ProportionalArea,
    ConsumptionAdjustment,
    FixedFee,
}

impl RuleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleType::EqualDivision => "equal_division",
            RuleType::OccupantProration => "occupant_proration",
            RuleType::ProportionalArea => "proportional_area",
            RuleType::ConsumptionAdjustment => "consumption_adjustment",
            RuleType::FixedFee => "fixed_fee",
        }
    }

    pub fn parse(s: &str) -> Result<Self, String> {
        match s {
            "equal_division" => Ok(RuleType::EqualDivision),
            "occupant_proration" => Ok(RuleType::OccupantProration),
            "proportional_area" => Ok(RuleType::ProportionalArea),
            "consumption_adjustment" => Ok(RuleType::ConsumptionAdjustment),
            "fixed_fee" => Ok(RuleType::FixedFee),
            _ => Err(format!("Invalid rule type: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceRule {
    pub id: String,
    pub property_id: String,
    pub service_type: ServiceType,
    pub rule_type: RuleType,
    pub created_at: String,
}

impl ServiceRule {
    pub fn generate_id() -> String {
        format!("rule-{}", Uuid::new_v4())
    }
}
