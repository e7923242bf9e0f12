//! Monthly target domain entity

use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone, Utc};
use uuid::Uuid;

use crate::domain::{DomainError, DomainResult};

/// Number of entries the lot aims for in a calendar month
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthlyTarget {
    id: Uuid,
    year: i32,
    month: u32,
    target_entries: i32,
}

impl MonthlyTarget {
    pub fn new(id: Uuid, year: i32, month: u32, target_entries: i32) -> DomainResult<Self> {
        if id.is_nil() {
            return Err(DomainError::InvalidInput("Id must not be empty".to_string()));
        }
        validate_year(year)?;
        validate_month(month)?;
        validate_target(target_entries)?;

        Ok(Self {
            id,
            year,
            month,
            target_entries,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn target_entries(&self) -> i32 {
        self.target_entries
    }

    pub fn update_target(&mut self, target_entries: i32) -> DomainResult<()> {
        validate_target(target_entries)?;
        self.target_entries = target_entries;
        Ok(())
    }
}

pub fn validate_year(year: i32) -> DomainResult<()> {
    // Upper bound keeps month arithmetic inside chrono's range.
    if !(1..=9999).contains(&year) {
        return Err(DomainError::InvalidInput(format!(
            "Year must be between 1 and 9999, got {}",
            year
        )));
    }
    Ok(())
}

pub fn validate_month(month: u32) -> DomainResult<()> {
    if !(1..=12).contains(&month) {
        return Err(DomainError::InvalidInput(format!(
            "Month must be between 1 and 12, got {}",
            month
        )));
    }
    Ok(())
}

fn validate_target(target_entries: i32) -> DomainResult<()> {
    if target_entries < 0 {
        return Err(DomainError::InvalidInput(
            "Target entries cannot be negative".to_string(),
        ));
    }
    Ok(())
}

/// UTC bounds `[start, end)` of a calendar month.
pub fn month_bounds(
    year: i32,
    month: u32,
) -> DomainResult<(DateTime<FixedOffset>, DateTime<FixedOffset>)> {
    validate_year(year)?;
    validate_month(month)?;
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    Ok((utc_midnight(year, month)?, utc_midnight(next_year, next_month)?))
}

/// UTC bounds `[start, end)` of a calendar year.
pub fn year_bounds(year: i32) -> DomainResult<(DateTime<FixedOffset>, DateTime<FixedOffset>)> {
    validate_year(year)?;
    Ok((utc_midnight(year, 1)?, utc_midnight(year + 1, 1)?))
}

fn utc_midnight(year: i32, month: u32) -> DomainResult<DateTime<FixedOffset>> {
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive).fixed_offset())
        .ok_or_else(|| DomainError::InvalidInput(format!("Invalid month {}-{:02}", year, month)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_validates_fields() {
        let target = MonthlyTarget::new(Uuid::new_v4(), 2024, 5, 120).unwrap();
        assert_eq!((target.year(), target.month(), target.target_entries()), (2024, 5, 120));

        assert!(MonthlyTarget::new(Uuid::nil(), 2024, 5, 1).is_err());
        assert!(MonthlyTarget::new(Uuid::new_v4(), 0, 5, 1).is_err());
        assert!(MonthlyTarget::new(Uuid::new_v4(), 2024, 0, 1).is_err());
        assert!(MonthlyTarget::new(Uuid::new_v4(), 2024, 13, 1).is_err());
        assert!(matches!(
            MonthlyTarget::new(Uuid::new_v4(), 2024, 5, -1),
            Err(DomainError::InvalidInput(_))
        ));
    }

    #[test]
    fn zero_target_is_allowed() {
        assert!(MonthlyTarget::new(Uuid::new_v4(), 2024, 5, 0).is_ok());
    }

    #[test]
    fn update_target_rejects_negative() {
        let mut target = MonthlyTarget::new(Uuid::new_v4(), 2024, 5, 10).unwrap();
        target.update_target(40).unwrap();
        assert_eq!(target.target_entries(), 40);

        assert!(target.update_target(-3).is_err());
        assert_eq!(target.target_entries(), 40);
    }

    #[test]
    fn month_bounds_roll_over_december() {
        let (start, end) = month_bounds(2024, 12).unwrap();
        assert_eq!(start.to_rfc3339(), "2024-12-01T00:00:00+00:00");
        assert_eq!(end.to_rfc3339(), "2025-01-01T00:00:00+00:00");

        let (start, end) = year_bounds(2024).unwrap();
        assert_eq!(start.to_rfc3339(), "2024-01-01T00:00:00+00:00");
        assert_eq!(end.to_rfc3339(), "2025-01-01T00:00:00+00:00");

        assert!(month_bounds(2024, 13).is_err());
        assert!(year_bounds(10_000).is_err());
    }
}
