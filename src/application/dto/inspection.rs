//! Vehicle inspection DTOs

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{InspectionChecklist, VehicleInspection};

/// Record the checklist for a ticket's vehicle.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateInspection {
    pub ticket_id: Uuid,
    #[serde(flatten)]
    pub checklist: InspectionChecklist,
    /// Defaults to the current time.
    #[serde(default)]
    pub inspected_at: Option<DateTime<FixedOffset>>,
}

/// Replace the checklist of an existing inspection.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateInspection {
    pub inspection_id: Uuid,
    #[serde(flatten)]
    pub checklist: InspectionChecklist,
    /// Defaults to the current time.
    #[serde(default)]
    pub inspected_at: Option<DateTime<FixedOffset>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InspectionDto {
    pub id: Uuid,
    pub ticket_id: Uuid,
    pub inspected_at: DateTime<FixedOffset>,
    pub all_clear: bool,
    #[serde(flatten)]
    pub checklist: InspectionChecklist,
}

impl InspectionDto {
    pub fn from_domain(inspection: &VehicleInspection) -> Self {
        Self {
            id: inspection.id(),
            ticket_id: inspection.ticket_id(),
            inspected_at: inspection.inspected_at(),
            all_clear: inspection.checklist().is_all_clear(),
            checklist: inspection.checklist().clone(),
        }
    }
}
