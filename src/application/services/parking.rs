//! Parking session lifecycle service

use std::future::Future;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, FixedOffset, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::store_call::bounded;
use crate::application::dto::{CompleteParking, StartParking};
use crate::domain::ticket::{normalize_plate, validate_plate};
use crate::domain::{
    DomainError, DomainResult, FeeCalculator, ParkingTicket, TicketFilter, TicketRepository,
};

/// Opens and closes parking sessions.
///
/// A ticket moves Active → Closed exactly once. Completing a closed ticket
/// returns it unchanged.
pub struct ParkingService {
    repository: Arc<dyn TicketRepository>,
    calculator: FeeCalculator,
    store_timeout: Option<StdDuration>,
}

impl ParkingService {
    pub fn new(repository: Arc<dyn TicketRepository>, calculator: FeeCalculator) -> Self {
        Self {
            repository,
            calculator,
            store_timeout: None,
        }
    }

    /// Bound every store call. An elapsed timeout surfaces as `StoreUnavailable`.
    pub fn with_store_timeout(mut self, timeout: StdDuration) -> Self {
        self.store_timeout = Some(timeout);
        self
    }

    pub fn calculator(&self) -> &FeeCalculator {
        &self.calculator
    }

    async fn store<T, F>(&self, operation: &'static str, call: F) -> DomainResult<T>
    where
        F: Future<Output = DomainResult<T>>,
    {
        bounded(self.store_timeout, operation, call).await
    }

    pub async fn start(&self, command: StartParking) -> DomainResult<ParkingTicket> {
        let plate = validate_plate(&command.plate)?;

        if let Some(existing) = self
            .store("get_active_by_plate", self.repository.get_active_by_plate(&plate))
            .await?
        {
            metrics::counter!("parking_session_conflicts_total").increment(1);
            warn!(plate = %plate, ticket_id = %existing.id(), "Active ticket already exists");
            return Err(DomainError::Conflict(format!(
                "There is already an active ticket for plate {}",
                plate
            )));
        }

        let entry_at = command.entry_at.unwrap_or_else(now);
        let ticket = ParkingTicket::new(Uuid::new_v4(), &plate, entry_at)?;

        match self.store("add", self.repository.add(ticket.clone())).await {
            Ok(()) => {}
            Err(DomainError::Conflict(msg)) => {
                // Lost a race with a concurrent start for the same plate.
                metrics::counter!("parking_session_conflicts_total").increment(1);
                warn!(plate = %plate, "Concurrent start rejected by store");
                return Err(DomainError::Conflict(msg));
            }
            Err(e) => return Err(e),
        }

        metrics::counter!("parking_sessions_started_total").increment(1);
        info!(
            ticket_id = %ticket.id(),
            plate = %ticket.plate(),
            entry_at = %ticket.entry_at(),
            "Parking session started"
        );

        Ok(ticket)
    }

    pub async fn complete(&self, command: CompleteParking) -> DomainResult<ParkingTicket> {
        let mut ticket = self
            .store("get_by_id", self.repository.get_by_id(command.ticket_id))
            .await?
            .ok_or_else(|| DomainError::ticket_not_found(command.ticket_id))?;

        if !ticket.is_active() {
            debug!(ticket_id = %ticket.id(), "Ticket already closed, returning as is");
            return Ok(ticket);
        }

        let exit_at = command.exit_at.unwrap_or_else(now);
        if exit_at < ticket.entry_at() {
            return Err(DomainError::InvalidInput(
                "The exit date cannot be before the entry date".to_string(),
            ));
        }

        let duration = exit_at - ticket.entry_at();
        let total = self.calculator.calculate_fee(duration);
        ticket.close(exit_at, total)?;

        let closed = match self.store("update", self.repository.update(ticket)).await {
            Ok(closed) => closed,
            Err(DomainError::Conflict(msg)) => {
                // Another writer got there first. If it closed the ticket, that
                // result stands.
                let current = self
                    .store("get_by_id", self.repository.get_by_id(command.ticket_id))
                    .await?;
                return match current {
                    Some(current) if !current.is_active() => {
                        debug!(ticket_id = %current.id(), "Ticket closed concurrently");
                        Ok(current)
                    }
                    _ => Err(DomainError::Conflict(msg)),
                };
            }
            Err(e) => return Err(e),
        };

        metrics::counter!("parking_sessions_completed_total").increment(1);
        metrics::histogram!("parking_fee_amount").record(total.to_f64().unwrap_or_default());
        info!(
            ticket_id = %closed.id(),
            plate = %closed.plate(),
            duration_minutes = duration.num_minutes(),
            total_amount = %total,
            "Parking session completed"
        );

        Ok(closed)
    }

    /// Blank plates yield `None`.
    pub async fn get_active_by_plate(&self, plate: &str) -> DomainResult<Option<ParkingTicket>> {
        let Some(plate) = normalize_plate(plate) else {
            return Ok(None);
        };
        self.store("get_active_by_plate", self.repository.get_active_by_plate(&plate))
            .await
    }

    pub async fn get_by_id(&self, id: Uuid) -> DomainResult<Option<ParkingTicket>> {
        self.store("get_by_id", self.repository.get_by_id(id)).await
    }

    pub async fn list_all(&self) -> DomainResult<Vec<ParkingTicket>> {
        self.store("get_all", self.repository.get_all()).await
    }

    /// Tickets whose entry falls in `[from, to)`.
    pub async fn list_by_period(
        &self,
        from: DateTime<FixedOffset>,
        to: DateTime<FixedOffset>,
    ) -> DomainResult<Vec<ParkingTicket>> {
        if to < from {
            return Err(DomainError::InvalidInput(
                "The end date must be greater than or equal to the start date".to_string(),
            ));
        }
        self.store("get_by_period", self.repository.get_by_period(from, to))
            .await
    }

    pub async fn filter(&self, filter: TicketFilter) -> DomainResult<Vec<ParkingTicket>> {
        let filter = filter.normalized();
        filter.validate()?;
        self.store("filter", self.repository.filter(&filter)).await
    }

    /// Amount owed so far: the settled amount for a closed ticket, the accrued
    /// fee at `at` (default now) for an active one.
    pub async fn quote(
        &self,
        ticket_id: Uuid,
        at: Option<DateTime<FixedOffset>>,
    ) -> DomainResult<Decimal> {
        let ticket = self
            .get_by_id(ticket_id)
            .await?
            .ok_or_else(|| DomainError::ticket_not_found(ticket_id))?;

        Ok(match ticket.total_amount() {
            Some(total) => total,
            None => self
                .calculator
                .quote(ticket.entry_at(), at.unwrap_or_else(now)),
        })
    }
}

fn now() -> DateTime<FixedOffset> {
    Utc::now().fixed_offset()
}
