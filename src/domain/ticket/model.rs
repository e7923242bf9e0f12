//! Parking ticket domain entity

use chrono::{DateTime, Duration, FixedOffset};
use rust_decimal::Decimal;
use uuid::Uuid;

use super::plate::validate_plate;
use crate::domain::DomainResult;
use crate::shared::errors::DomainError;

/// Ticket lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketStatus {
    /// Vehicle is inside the lot
    Active,
    /// Vehicle left and the fee was settled
    Closed,
}

impl TicketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Closed => "Closed",
        }
    }
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One parking-lot visit, from entry to exit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParkingTicket {
    id: Uuid,
    plate: String,
    entry_at: DateTime<FixedOffset>,
    exit_at: Option<DateTime<FixedOffset>>,
    total_amount: Option<Decimal>,
    version: i32,
}

impl ParkingTicket {
    /// Open a new ticket. The plate is normalized and validated.
    pub fn new(id: Uuid, plate: &str, entry_at: DateTime<FixedOffset>) -> DomainResult<Self> {
        if id.is_nil() {
            return Err(DomainError::InvalidInput("Id must not be empty".to_string()));
        }

        Ok(Self {
            id,
            plate: validate_plate(plate)?,
            entry_at,
            exit_at: None,
            total_amount: None,
            version: 0,
        })
    }

    /// Rebuild a ticket read back from storage.
    ///
    /// `exit_at` and `total_amount` must be both present or both absent.
    pub fn restore(
        id: Uuid,
        plate: String,
        entry_at: DateTime<FixedOffset>,
        exit_at: Option<DateTime<FixedOffset>>,
        total_amount: Option<Decimal>,
        version: i32,
    ) -> DomainResult<Self> {
        if exit_at.is_some() != total_amount.is_some() {
            return Err(DomainError::StoreUnavailable(format!(
                "Ticket {} has inconsistent exit/amount columns",
                id
            )));
        }

        Ok(Self {
            id,
            plate,
            entry_at,
            exit_at,
            total_amount,
            version,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn plate(&self) -> &str {
        &self.plate
    }

    pub fn entry_at(&self) -> DateTime<FixedOffset> {
        self.entry_at
    }

    pub fn exit_at(&self) -> Option<DateTime<FixedOffset>> {
        self.exit_at
    }

    pub fn total_amount(&self) -> Option<Decimal> {
        self.total_amount
    }

    pub fn version(&self) -> i32 {
        self.version
    }

    pub fn is_active(&self) -> bool {
        self.exit_at.is_none()
    }

    pub fn status(&self) -> TicketStatus {
        if self.is_active() {
            TicketStatus::Active
        } else {
            TicketStatus::Closed
        }
    }

    pub fn duration(&self) -> Option<Duration> {
        self.exit_at.map(|exit| exit - self.entry_at)
    }

    /// Record the exit and the amount owed in one step.
    pub fn close(&mut self, exit_at: DateTime<FixedOffset>, total_amount: Decimal) -> DomainResult<()> {
        if !self.is_active() {
            return Err(DomainError::Conflict(format!(
                "Ticket {} is already closed",
                self.id
            )));
        }

        if exit_at < self.entry_at {
            return Err(DomainError::InvalidInput(
                "Exit date cannot be earlier than entry date".to_string(),
            ));
        }

        if total_amount < Decimal::ZERO {
            return Err(DomainError::InvalidInput(
                "Total amount must be non-negative".to_string(),
            ));
        }

        self.exit_at = Some(exit_at);
        self.total_amount = Some(total_amount);
        Ok(())
    }

    /// Called by stores after a successful write.
    pub(crate) fn bump_version(&mut self) {
        self.version += 1;
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(s).unwrap()
    }

    fn sample_ticket() -> ParkingTicket {
        ParkingTicket::new(Uuid::new_v4(), " abc1d23 ", at("2024-03-10T08:00:00-03:00")).unwrap()
    }

    #[test]
    fn new_ticket_is_active() {
        let ticket = sample_ticket();
        assert!(ticket.is_active());
        assert_eq!(ticket.status(), TicketStatus::Active);
        assert_eq!(ticket.plate(), "ABC1D23");
        assert!(ticket.exit_at().is_none());
        assert!(ticket.total_amount().is_none());
        assert!(ticket.duration().is_none());
        assert_eq!(ticket.version(), 0);
    }

    #[test]
    fn nil_id_is_rejected() {
        let result = ParkingTicket::new(Uuid::nil(), "ABC", at("2024-03-10T08:00:00Z"));
        assert!(matches!(result, Err(DomainError::InvalidInput(_))));
    }

    #[test]
    fn blank_plate_is_rejected() {
        let result = ParkingTicket::new(Uuid::new_v4(), "   ", at("2024-03-10T08:00:00Z"));
        assert!(matches!(result, Err(DomainError::InvalidInput(_))));
    }

    #[test]
    fn close_sets_exit_and_amount() {
        let mut ticket = sample_ticket();
        let amount: Decimal = "12.00".parse().unwrap();
        ticket.close(at("2024-03-10T08:45:00-03:00"), amount).unwrap();

        assert!(!ticket.is_active());
        assert_eq!(ticket.status(), TicketStatus::Closed);
        assert_eq!(ticket.total_amount(), Some(amount));
        assert_eq!(ticket.duration(), Some(Duration::minutes(45)));
    }

    #[test]
    fn close_keeps_offset_and_subsecond_precision() {
        let mut ticket = sample_ticket();
        let exit = at("2024-03-10T12:00:00.123456789+01:00");
        ticket.close(exit, Decimal::ZERO).unwrap();
        assert_eq!(ticket.exit_at(), Some(exit));
        assert_eq!(ticket.exit_at().unwrap().offset().local_minus_utc(), 3600);
    }

    #[test]
    fn close_twice_is_a_conflict() {
        let mut ticket = sample_ticket();
        ticket.close(at("2024-03-10T09:00:00-03:00"), Decimal::ONE).unwrap();
        let second = ticket.close(at("2024-03-10T10:00:00-03:00"), Decimal::TWO);
        assert!(matches!(second, Err(DomainError::Conflict(_))));
        assert_eq!(ticket.total_amount(), Some(Decimal::ONE));
    }

    #[test]
    fn close_before_entry_is_rejected() {
        let mut ticket = sample_ticket();
        let result = ticket.close(at("2024-03-10T07:59:59-03:00"), Decimal::ZERO);
        assert!(matches!(result, Err(DomainError::InvalidInput(_))));
        assert!(ticket.is_active());
    }

    #[test]
    fn close_with_negative_amount_is_rejected() {
        let mut ticket = sample_ticket();
        let result = ticket.close(at("2024-03-10T09:00:00-03:00"), "-1".parse().unwrap());
        assert!(matches!(result, Err(DomainError::InvalidInput(_))));
        assert!(ticket.exit_at().is_none());
    }

    #[test]
    fn restore_rejects_half_closed_rows() {
        let result = ParkingTicket::restore(
            Uuid::new_v4(),
            "ABC".into(),
            at("2024-03-10T08:00:00Z"),
            Some(at("2024-03-10T09:00:00Z")),
            None,
            1,
        );
        assert!(result.is_err());
    }

    #[test]
    fn status_display() {
        assert_eq!(TicketStatus::Active.to_string(), "Active");
        assert_eq!(TicketStatus::Closed.to_string(), "Closed");
    }
}
