//! Vehicle inspection domain entity

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{DomainError, DomainResult};

/// Condition checklist filled in when a vehicle is handed over.
///
/// Each `no_*` flag approves an item. A rejected item needs a photo; an
/// approved one carries none.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InspectionChecklist {
    pub no_scratches: bool,
    pub scratches_photo_url: Option<String>,
    pub no_missing_items: bool,
    pub missing_items_photo_url: Option<String>,
    pub no_lost_keys: bool,
    pub lost_keys_photo_url: Option<String>,
    pub no_harsh_impacts: bool,
    pub harsh_impacts_photo_url: Option<String>,
}

impl InspectionChecklist {
    /// Every item approved, no photos.
    pub fn all_clear() -> Self {
        Self {
            no_scratches: true,
            no_missing_items: true,
            no_lost_keys: true,
            no_harsh_impacts: true,
            ..Self::default()
        }
    }

    pub fn is_all_clear(&self) -> bool {
        self.no_scratches && self.no_missing_items && self.no_lost_keys && self.no_harsh_impacts
    }

    /// Trim photo URLs, drop those of approved items, and require one for
    /// every rejected item.
    pub fn normalized(self) -> DomainResult<Self> {
        Ok(Self {
            scratches_photo_url: item_photo(
                self.no_scratches,
                self.scratches_photo_url,
                "scratches_photo_url",
            )?,
            missing_items_photo_url: item_photo(
                self.no_missing_items,
                self.missing_items_photo_url,
                "missing_items_photo_url",
            )?,
            lost_keys_photo_url: item_photo(
                self.no_lost_keys,
                self.lost_keys_photo_url,
                "lost_keys_photo_url",
            )?,
            harsh_impacts_photo_url: item_photo(
                self.no_harsh_impacts,
                self.harsh_impacts_photo_url,
                "harsh_impacts_photo_url",
            )?,
            ..self
        })
    }
}

fn item_photo(
    approved: bool,
    photo_url: Option<String>,
    field: &str,
) -> DomainResult<Option<String>> {
    if approved {
        return Ok(None);
    }

    match photo_url.as_deref().map(str::trim) {
        Some(url) if !url.is_empty() => Ok(Some(url.to_string())),
        _ => Err(DomainError::InvalidInput(format!(
            "{}: a photo must be provided when the checklist item is not approved",
            field
        ))),
    }
}

/// Inspection of the vehicle attached to a parking ticket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VehicleInspection {
    id: Uuid,
    ticket_id: Uuid,
    inspected_at: DateTime<FixedOffset>,
    checklist: InspectionChecklist,
}

impl VehicleInspection {
    pub fn new(
        id: Uuid,
        ticket_id: Uuid,
        checklist: InspectionChecklist,
        inspected_at: DateTime<FixedOffset>,
    ) -> DomainResult<Self> {
        if id.is_nil() {
            return Err(DomainError::InvalidInput("Id must not be empty".to_string()));
        }
        if ticket_id.is_nil() {
            return Err(DomainError::InvalidInput(
                "Ticket id must not be empty".to_string(),
            ));
        }

        Ok(Self {
            id,
            ticket_id,
            inspected_at,
            checklist: checklist.normalized()?,
        })
    }

    /// Rebuild from storage without re-validating photos.
    pub fn restore(
        id: Uuid,
        ticket_id: Uuid,
        inspected_at: DateTime<FixedOffset>,
        checklist: InspectionChecklist,
    ) -> Self {
        Self {
            id,
            ticket_id,
            inspected_at,
            checklist,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn ticket_id(&self) -> Uuid {
        self.ticket_id
    }

    pub fn inspected_at(&self) -> DateTime<FixedOffset> {
        self.inspected_at
    }

    pub fn checklist(&self) -> &InspectionChecklist {
        &self.checklist
    }

    /// Replace the checklist. Nothing changes when it is invalid.
    pub fn update_checklist(
        &mut self,
        checklist: InspectionChecklist,
        inspected_at: DateTime<FixedOffset>,
    ) -> DomainResult<()> {
        self.checklist = checklist.normalized()?;
        self.inspected_at = inspected_at;
        Ok(())
    }
}
