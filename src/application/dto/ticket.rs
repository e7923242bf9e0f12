//! Ticket DTOs

use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::ParkingTicket;

/// Parking ticket as returned to callers
#[derive(Debug, Clone, Serialize)]
pub struct TicketDto {
    pub id: Uuid,
    pub plate: String,
    pub status: String,
    pub entry_at: DateTime<FixedOffset>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_at: Option<DateTime<FixedOffset>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_amount: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<f64>,
}

impl TicketDto {
    pub fn from_domain(ticket: &ParkingTicket) -> Self {
        Self {
            id: ticket.id(),
            plate: ticket.plate().to_string(),
            status: ticket.status().to_string(),
            entry_at: ticket.entry_at(),
            exit_at: ticket.exit_at(),
            total_amount: ticket.total_amount(),
            duration_minutes: ticket
                .duration()
                .map(|d| d.num_milliseconds() as f64 / 60_000.0),
        }
    }
}
