//! Ticket repository interface

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use uuid::Uuid;

use super::model::ParkingTicket;
use crate::domain::filter::TicketFilter;
use crate::domain::DomainResult;

/// Storage for parking tickets.
///
/// Implementations must reject a second active ticket for the same plate in
/// `add` with `DomainError::Conflict`, and must apply `update` only when the
/// stored version equals `ticket.version()` (otherwise `Conflict`).
#[async_trait]
pub trait TicketRepository: Send + Sync {
    async fn add(&self, ticket: ParkingTicket) -> DomainResult<()>;
    async fn get_by_id(&self, id: Uuid) -> DomainResult<Option<ParkingTicket>>;
    /// `plate` is expected already normalized.
    async fn get_active_by_plate(&self, plate: &str) -> DomainResult<Option<ParkingTicket>>;
    /// Most recent entry first.
    async fn get_all(&self) -> DomainResult<Vec<ParkingTicket>>;
    /// Tickets with `from <= entry_at < to`.
    async fn get_by_period(
        &self,
        from: DateTime<FixedOffset>,
        to: DateTime<FixedOffset>,
    ) -> DomainResult<Vec<ParkingTicket>>;
    /// `filter` is expected already normalized. Most recent entry first.
    async fn filter(&self, filter: &TicketFilter) -> DomainResult<Vec<ParkingTicket>>;
    /// Returns the ticket with its bumped version.
    async fn update(&self, ticket: ParkingTicket) -> DomainResult<ParkingTicket>;
}
