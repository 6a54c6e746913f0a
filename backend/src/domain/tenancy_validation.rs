//! Interval validation for tenancies.
//!
//! A unit may hold many tenancies over time but never two that overlap,
//! and at most one open-ended (active) one. The overlap rule cannot be
//! expressed as a plain uniqueness constraint, so it lives here as pure
//! functions over date intervals; services run them before any mutation.

use chrono::NaiveDate;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::tenancy::Tenancy;

/// Reject intervals that end before they start.
pub fn validate_dates(start_date: NaiveDate, end_date: Option<NaiveDate>) -> DomainResult<()> {
    if let Some(end) = end_date {
        if end < start_date {
            return Err(DomainError::validation(
                "end_date",
                "end date cannot be earlier than the start date",
            ));
        }
    }
    Ok(())
}

/// Whether two intervals overlap. A `None` end means the interval is
/// open-ended (an active tenancy).
pub fn periods_overlap(
    start1: NaiveDate,
    end1: Option<NaiveDate>,
    start2: NaiveDate,
    end2: Option<NaiveDate>,
) -> bool {
    let end1 = match end1 {
        Some(end) => end,
        // First interval is open-ended: it overlaps anything that has not
        // ended before it starts, and always overlaps another open one.
        None => {
            return match end2 {
                Some(end2) => end2 >= start1,
                None => true,
            }
        }
    };

    match end2 {
        Some(end2) => start1 <= end2 && end1 >= start2,
        None => end1 >= start2,
    }
}

/// All tenancies in `existing` that conflict with the given interval.
/// `exclude_tenancy_id` lets an edit skip the record being edited.
pub fn find_overlaps<'a>(
    existing: &'a [Tenancy],
    start_date: NaiveDate,
    end_date: Option<NaiveDate>,
    exclude_tenancy_id: Option<&str>,
) -> Vec<&'a Tenancy> {
    existing
        .iter()
        .filter(|tenancy| exclude_tenancy_id != Some(tenancy.id.as_str()))
        .filter(|tenancy| {
            periods_overlap(
                start_date,
                end_date,
                tenancy.start_date,
                tenancy.end_date,
            )
        })
        .collect()
}

/// Ending a tenancy at `end_date` must not swallow a tenancy that already
/// began after it: if any other tenancy on the unit starts after this
/// tenancy's own start and on or before `end_date`, the close is refused.
pub fn validate_end_against_later_tenancies(
    tenancy: &Tenancy,
    end_date: NaiveDate,
    others: &[Tenancy],
) -> DomainResult<()> {
    for other in others {
        if other.id == tenancy.id {
            continue;
        }
        if other.unit_id == tenancy.unit_id
            && other.start_date > tenancy.start_date
            && other.start_date <= end_date
        {
            return Err(DomainError::conflict(format!(
                "cannot end the tenancy on {} because a later tenancy starts on {}",
                end_date, other.start_date
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn tenancy(id: &str, unit: &str, start: NaiveDate, end: Option<NaiveDate>) -> Tenancy {
        Tenancy {
            id: id.to_string(),
            unit_id: unit.to_string(),
            tenant_id: format!("tenant-for-{}", id),
            start_date: start,
            end_date: end,
            created_at: "2024-01-01T00:00:00+00:00".to_string(),
        }
    }

    #[test]
    fn test_validate_dates() {
        assert!(validate_dates(date(2024, 1, 1), None).is_ok());
        assert!(validate_dates(date(2024, 1, 1), Some(date(2024, 1, 1))).is_ok());
        assert!(validate_dates(date(2024, 1, 1), Some(date(2024, 6, 30))).is_ok());

        let err = validate_dates(date(2024, 6, 30), Some(date(2024, 1, 1))).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_periods_overlap_both_open() {
        assert!(periods_overlap(date(2024, 1, 1), None, date(2024, 6, 1), None));
        assert!(periods_overlap(date(2024, 6, 1), None, date(2024, 1, 1), None));
    }

    #[test]
    fn test_periods_overlap_one_open() {
        // Open interval starting after the closed one ended: no overlap.
        assert!(!periods_overlap(
            date(2024, 7, 1),
            None,
            date(2024, 1, 1),
            Some(date(2024, 6, 30)),
        ));
        // Closed interval still running when the open one starts.
        assert!(periods_overlap(
            date(2024, 6, 1),
            None,
            date(2024, 1, 1),
            Some(date(2024, 6, 30)),
        ));
        // Symmetric case with the open interval second.
        assert!(periods_overlap(
            date(2024, 1, 1),
            Some(date(2024, 6, 30)),
            date(2024, 6, 1),
            None,
        ));
        assert!(!periods_overlap(
            date(2024, 1, 1),
            Some(date(2024, 6, 30)),
            date(2024, 7, 1),
            None,
        ));
    }

    #[test]
    fn test_periods_overlap_both_closed() {
        assert!(periods_overlap(
            date(2024, 1, 1),
            Some(date(2024, 3, 31)),
            date(2024, 3, 1),
            Some(date(2024, 5, 31)),
        ));
        assert!(!periods_overlap(
            date(2024, 1, 1),
            Some(date(2024, 2, 29)),
            date(2024, 3, 1),
            Some(date(2024, 5, 31)),
        ));
        // Single-day touch counts as overlap.
        assert!(periods_overlap(
            date(2024, 1, 1),
            Some(date(2024, 3, 1)),
            date(2024, 3, 1),
            Some(date(2024, 5, 31)),
        ));
    }

    #[test]
    fn test_find_overlaps_week_intervals() {
        let day0 = date(2024, 3, 1);
        let existing = vec![tenancy(
            "t1",
            "unit-a",
            day0,
            Some(day0 + chrono::Duration::days(7)),
        )];

        // Starting three days in conflicts.
        let conflicts = find_overlaps(
            &existing,
            day0 + chrono::Duration::days(3),
            None,
            None,
        );
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].id, "t1");

        // Starting the day after it ends is fine.
        let conflicts = find_overlaps(
            &existing,
            day0 + chrono::Duration::days(8),
            None,
            None,
        );
        assert!(conflicts.is_empty());
    }

    #[test]
    fn test_find_overlaps_excludes_edited_tenancy() {
        let existing = vec![
            tenancy("t1", "unit-a", date(2024, 1, 1), Some(date(2024, 6, 30))),
            tenancy("t2", "unit-a", date(2024, 8, 1), None),
        ];

        // Re-validating t1's own interval must not report t1 itself.
        let conflicts = find_overlaps(
            &existing,
            date(2024, 1, 1),
            Some(date(2024, 6, 30)),
            Some("t1"),
        );
        assert!(conflicts.is_empty());
    }

    #[test]
    fn test_validate_end_against_later_tenancies() {
        let current = tenancy("t1", "unit-a", date(2024, 1, 1), None);
        let later = tenancy("t2", "unit-a", date(2024, 5, 1), None);
        let others = vec![later];

        // Ending before the later tenancy begins is allowed.
        assert!(
            validate_end_against_later_tenancies(&current, date(2024, 4, 30), &others).is_ok()
        );

        // Ending on or after its start date is a conflict.
        let err = validate_end_against_later_tenancies(&current, date(2024, 5, 1), &others)
            .unwrap_err();
        assert!(err.is_conflict());
        let err = validate_end_against_later_tenancies(&current, date(2024, 6, 15), &others)
            .unwrap_err();
        assert!(err.is_conflict());
    }
}
