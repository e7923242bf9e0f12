//! Vehicle inspection service

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, FixedOffset, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use super::store_call::bounded;
use crate::application::dto::{CreateInspection, UpdateInspection};
use crate::domain::{
    DomainError, DomainResult, InspectionRepository, TicketRepository, VehicleInspection,
};

/// Records the condition of the vehicle behind a ticket, once per ticket.
pub struct InspectionService {
    inspections: Arc<dyn InspectionRepository>,
    tickets: Arc<dyn TicketRepository>,
    store_timeout: Option<StdDuration>,
}

impl InspectionService {
    pub fn new(
        inspections: Arc<dyn InspectionRepository>,
        tickets: Arc<dyn TicketRepository>,
    ) -> Self {
        Self {
            inspections,
            tickets,
            store_timeout: None,
        }
    }

    /// Bound every store call. An elapsed timeout surfaces as `StoreUnavailable`.
    pub fn with_store_timeout(mut self, timeout: StdDuration) -> Self {
        self.store_timeout = Some(timeout);
        self
    }

    pub async fn create(&self, command: CreateInspection) -> DomainResult<VehicleInspection> {
        if command.ticket_id.is_nil() {
            return Err(DomainError::InvalidInput(
                "Ticket id must not be empty".to_string(),
            ));
        }

        bounded(
            self.store_timeout,
            "get_ticket",
            self.tickets.get_by_id(command.ticket_id),
        )
        .await?
        .ok_or_else(|| DomainError::ticket_not_found(command.ticket_id))?;

        if bounded(
            self.store_timeout,
            "get_inspection_by_ticket",
            self.inspections.get_by_ticket_id(command.ticket_id),
        )
        .await?
        .is_some()
        {
            warn!(ticket_id = %command.ticket_id, "Inspection already recorded");
            return Err(DomainError::Conflict(format!(
                "Ticket {} already has an inspection",
                command.ticket_id
            )));
        }

        let inspection = VehicleInspection::new(
            Uuid::new_v4(),
            command.ticket_id,
            command.checklist,
            command.inspected_at.unwrap_or_else(now),
        )?;
        bounded(
            self.store_timeout,
            "add_inspection",
            self.inspections.add(inspection.clone()),
        )
        .await?;

        metrics::counter!("parking_inspections_recorded_total").increment(1);
        info!(
            inspection_id = %inspection.id(),
            ticket_id = %inspection.ticket_id(),
            all_clear = inspection.checklist().is_all_clear(),
            "Vehicle inspection recorded"
        );

        Ok(inspection)
    }

    /// Nil ids yield `None`.
    pub async fn get_by_id(&self, id: Uuid) -> DomainResult<Option<VehicleInspection>> {
        if id.is_nil() {
            return Ok(None);
        }
        bounded(self.store_timeout, "get_inspection", self.inspections.get_by_id(id)).await
    }

    /// Nil ids yield `None`.
    pub async fn get_by_ticket_id(&self, ticket_id: Uuid) -> DomainResult<Option<VehicleInspection>> {
        if ticket_id.is_nil() {
            return Ok(None);
        }
        bounded(
            self.store_timeout,
            "get_inspection_by_ticket",
            self.inspections.get_by_ticket_id(ticket_id),
        )
        .await
    }

    pub async fn update(&self, command: UpdateInspection) -> DomainResult<VehicleInspection> {
        if command.inspection_id.is_nil() {
            return Err(DomainError::InvalidInput(
                "Inspection id must not be empty".to_string(),
            ));
        }

        let mut inspection = bounded(
            self.store_timeout,
            "get_inspection",
            self.inspections.get_by_id(command.inspection_id),
        )
        .await?
        .ok_or_else(|| DomainError::inspection_not_found(command.inspection_id))?;

        inspection.update_checklist(command.checklist, command.inspected_at.unwrap_or_else(now))?;
        bounded(
            self.store_timeout,
            "update_inspection",
            self.inspections.update(inspection.clone()),
        )
        .await?;

        info!(
            inspection_id = %inspection.id(),
            all_clear = inspection.checklist().is_all_clear(),
            "Vehicle inspection updated"
        );

        Ok(inspection)
    }
}

fn now() -> DateTime<FixedOffset> {
    Utc::now().fixed_offset()
}
