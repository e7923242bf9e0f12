//! Command DTOs

use chrono::{DateTime, FixedOffset};
use serde::Deserialize;
use uuid::Uuid;

/// Open a parking session for a vehicle.
#[derive(Debug, Clone, Deserialize)]
pub struct StartParking {
    pub plate: String,
    /// Defaults to the current time.
    #[serde(default)]
    pub entry_at: Option<DateTime<FixedOffset>>,
}

impl StartParking {
    pub fn new(plate: impl Into<String>) -> Self {
        Self {
            plate: plate.into(),
            entry_at: None,
        }
    }

    pub fn at(mut self, entry_at: DateTime<FixedOffset>) -> Self {
        self.entry_at = Some(entry_at);
        self
    }
}

/// Close a parking session and settle its fee.
#[derive(Debug, Clone, Deserialize)]
pub struct CompleteParking {
    pub ticket_id: Uuid,
    /// Defaults to the current time.
    #[serde(default)]
    pub exit_at: Option<DateTime<FixedOffset>>,
}

impl CompleteParking {
    pub fn new(ticket_id: Uuid) -> Self {
        Self {
            ticket_id,
            exit_at: None,
        }
    }

    pub fn at(mut self, exit_at: DateTime<FixedOffset>) -> Self {
        self.exit_at = Some(exit_at);
        self
    }
}
