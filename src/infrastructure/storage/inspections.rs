//! In-memory vehicle inspection storage

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use uuid::Uuid;

use crate::domain::{DomainError, DomainResult, InspectionRepository, VehicleInspection};

/// `by_ticket` maps a ticket to its inspection and is claimed through the
/// entry API, so a ticket never ends up with two inspections.
pub struct InMemoryInspectionRepository {
    inspections: DashMap<Uuid, VehicleInspection>,
    by_ticket: DashMap<Uuid, Uuid>,
}

impl InMemoryInspectionRepository {
    pub fn new() -> Self {
        Self {
            inspections: DashMap::new(),
            by_ticket: DashMap::new(),
        }
    }
}

impl Default for InMemoryInspectionRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InspectionRepository for InMemoryInspectionRepository {
    async fn get_by_id(&self, id: Uuid) -> DomainResult<Option<VehicleInspection>> {
        Ok(self.inspections.get(&id).map(|i| i.clone()))
    }

    async fn get_by_ticket_id(&self, ticket_id: Uuid) -> DomainResult<Option<VehicleInspection>> {
        let Some(id) = self.by_ticket.get(&ticket_id).map(|id| *id) else {
            return Ok(None);
        };
        Ok(self.inspections.get(&id).map(|i| i.clone()))
    }

    async fn add(&self, inspection: VehicleInspection) -> DomainResult<()> {
        if self.inspections.contains_key(&inspection.id()) {
            return Err(DomainError::Conflict(format!(
                "Inspection {} already exists",
                inspection.id()
            )));
        }

        match self.by_ticket.entry(inspection.ticket_id()) {
            Entry::Occupied(_) => Err(DomainError::Conflict(format!(
                "Ticket {} already has an inspection",
                inspection.ticket_id()
            ))),
            Entry::Vacant(slot) => {
                let id = inspection.id();
                self.inspections.insert(id, inspection);
                slot.insert(id);
                Ok(())
            }
        }
    }

    async fn update(&self, inspection: VehicleInspection) -> DomainResult<()> {
        let mut slot = self
            .inspections
            .get_mut(&inspection.id())
            .ok_or_else(|| DomainError::inspection_not_found(inspection.id()))?;

        if slot.ticket_id() != inspection.ticket_id() {
            return Err(DomainError::InvalidInput(
                "The ticket of an inspection cannot change".to_string(),
            ));
        }

        *slot = inspection;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::InspectionChecklist;
    use chrono::DateTime;

    fn inspection(ticket_id: Uuid) -> VehicleInspection {
        VehicleInspection::new(
            Uuid::new_v4(),
            ticket_id,
            InspectionChecklist::all_clear(),
            DateTime::parse_from_rfc3339("2024-05-01T08:00:00Z").unwrap(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn add_and_fetch_by_both_keys() {
        let repo = InMemoryInspectionRepository::new();
        let ticket_id = Uuid::new_v4();
        let saved = inspection(ticket_id);
        repo.add(saved.clone()).await.unwrap();

        assert_eq!(repo.get_by_id(saved.id()).await.unwrap(), Some(saved.clone()));
        assert_eq!(repo.get_by_ticket_id(ticket_id).await.unwrap(), Some(saved));
        assert_eq!(repo.get_by_ticket_id(Uuid::new_v4()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn second_inspection_for_ticket_conflicts() {
        let repo = InMemoryInspectionRepository::new();
        let ticket_id = Uuid::new_v4();
        repo.add(inspection(ticket_id)).await.unwrap();

        let result = repo.add(inspection(ticket_id)).await;
        assert!(matches!(result, Err(DomainError::Conflict(_))));
    }

    #[tokio::test]
    async fn update_replaces_checklist() {
        let repo = InMemoryInspectionRepository::new();
        let mut saved = inspection(Uuid::new_v4());
        repo.add(saved.clone()).await.unwrap();

        let damaged = InspectionChecklist {
            no_scratches: false,
            scratches_photo_url: Some("https://photos.example/door.jpg".into()),
            ..InspectionChecklist::all_clear()
        };
        saved
            .update_checklist(damaged, saved.inspected_at())
            .unwrap();
        repo.update(saved.clone()).await.unwrap();

        let stored = repo.get_by_id(saved.id()).await.unwrap().unwrap();
        assert!(!stored.checklist().no_scratches);

        let unknown = repo.update(inspection(Uuid::new_v4())).await;
        assert!(matches!(unknown, Err(DomainError::NotFound { .. })));
    }
}
