//! Proration math: splitting a total cost among units by a configured
//! allocation method.
//!
//! Shares are rounded to two decimals, half away from zero (the
//! conventional cent, not banker's rounding). The sum of rounded shares
//! may drift from the total by a cent or two; that drift is accepted and
//! not redistributed. Callers needing exact reconciliation must adjust
//! the largest share themselves.

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::service_rule::RuleType;

/// One unit participating in a share computation.
#[derive(Debug, Clone, PartialEq)]
pub struct ShareParticipant {
    pub unit_id: String,
    pub occupant_count: u32,
}

fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Per-unit share under equal division. A non-positive unit count yields
/// zero rather than a division error; callers should not reach that case.
pub fn calculate_equal_division(total_amount: f64, unit_count: usize) -> f64 {
    if unit_count == 0 {
        return 0.0;
    }
    round_to_cents(total_amount / unit_count as f64)
}

/// Shares weighted by occupants per unit, one entry per input count.
/// Zero total occupants yields all-zero shares.
pub fn calculate_occupant_proration(total_amount: f64, occupant_counts: &[u32]) -> Vec<f64> {
    let total_occupants: u32 = occupant_counts.iter().sum();

    if total_occupants == 0 {
        return vec![0.0; occupant_counts.len()];
    }

    occupant_counts
        .iter()
        .map(|count| {
            round_to_cents(total_amount * f64::from(*count) / f64::from(total_occupants))
        })
        .collect()
}

/// Dispatch over the configured rule type, returning one share per
/// participant in input order.
///
/// Only `EqualDivision` and `OccupantProration` have a defined share
/// formula; the remaining rule types are valid configuration vocabulary
/// but cannot be computed here.
pub fn compute_shares(
    total_amount: f64,
    rule_type: RuleType,
    participants: &[ShareParticipant],
) -> DomainResult<Vec<f64>> {
    match rule_type {
        RuleType::EqualDivision => {
            let share = calculate_equal_division(total_amount, participants.len());
            Ok(vec![share; participants.len()])
        }
        RuleType::OccupantProration => {
            let counts: Vec<u32> = participants.iter().map(|p| p.occupant_count).collect();
            Ok(calculate_occupant_proration(total_amount, &counts))
        }
        other => Err(DomainError::validation(
            "rule_type",
            format!(
                "shares cannot be computed for rule type '{}'",
                other.as_str()
            ),
        )),
    }
}
