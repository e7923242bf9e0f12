//! In-memory ticket storage

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use uuid::Uuid;

use crate::domain::filter::{sort_newest_first, TicketFilter};
use crate::domain::{DomainError, DomainResult, ParkingTicket, TicketRepository};

/// In-memory storage for development and testing
///
/// `active_plates` indexes the active ticket of each plate and is written
/// through the entry API, so two concurrent `add` calls for one plate cannot
/// both succeed.
pub struct InMemoryTicketRepository {
    tickets: DashMap<Uuid, ParkingTicket>,
    active_plates: DashMap<String, Uuid>,
}

impl InMemoryTicketRepository {
    pub fn new() -> Self {
        Self {
            tickets: DashMap::new(),
            active_plates: DashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.tickets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickets.is_empty()
    }

    fn snapshot(&self) -> Vec<ParkingTicket> {
        self.tickets.iter().map(|t| t.value().clone()).collect()
    }
}

impl Default for InMemoryTicketRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TicketRepository for InMemoryTicketRepository {
    async fn add(&self, ticket: ParkingTicket) -> DomainResult<()> {
        if self.tickets.contains_key(&ticket.id()) {
            return Err(DomainError::Conflict(format!(
                "Ticket {} already exists",
                ticket.id()
            )));
        }

        if !ticket.is_active() {
            self.tickets.insert(ticket.id(), ticket);
            return Ok(());
        }

        match self.active_plates.entry(ticket.plate().to_string()) {
            Entry::Occupied(mut slot) => {
                // `update` closes the ticket before it drops the index entry,
                // so the owner may already be closed.
                let owner_active = self
                    .tickets
                    .get(slot.get())
                    .map_or(false, |owner| owner.is_active());
                if owner_active {
                    return Err(DomainError::Conflict(format!(
                        "There is already an active ticket for plate {}",
                        ticket.plate()
                    )));
                }

                let id = ticket.id();
                self.tickets.insert(id, ticket);
                slot.insert(id);
                Ok(())
            }
            Entry::Vacant(slot) => {
                let id = ticket.id();
                self.tickets.insert(id, ticket);
                slot.insert(id);
                Ok(())
            }
        }
    }

    async fn get_by_id(&self, id: Uuid) -> DomainResult<Option<ParkingTicket>> {
        Ok(self.tickets.get(&id).map(|t| t.clone()))
    }

    async fn get_active_by_plate(&self, plate: &str) -> DomainResult<Option<ParkingTicket>> {
        let Some(id) = self.active_plates.get(plate).map(|id| *id) else {
            return Ok(None);
        };

        Ok(self
            .tickets
            .get(&id)
            .filter(|t| t.is_active())
            .map(|t| t.clone()))
    }

    async fn get_all(&self) -> DomainResult<Vec<ParkingTicket>> {
        let mut tickets = self.snapshot();
        sort_newest_first(&mut tickets);
        Ok(tickets)
    }

    async fn get_by_period(
        &self,
        from: DateTime<FixedOffset>,
        to: DateTime<FixedOffset>,
    ) -> DomainResult<Vec<ParkingTicket>> {
        if to < from {
            return Err(DomainError::InvalidInput(
                "The end date must be greater than or equal to the start date".to_string(),
            ));
        }

        let mut tickets: Vec<ParkingTicket> = self
            .tickets
            .iter()
            .filter(|t| t.entry_at() >= from && t.entry_at() < to)
            .map(|t| t.clone())
            .collect();
        sort_newest_first(&mut tickets);
        Ok(tickets)
    }

    async fn filter(&self, filter: &TicketFilter) -> DomainResult<Vec<ParkingTicket>> {
        Ok(filter.apply(self.snapshot()))
    }

    async fn update(&self, ticket: ParkingTicket) -> DomainResult<ParkingTicket> {
        let stored = {
            let mut slot = self
                .tickets
                .get_mut(&ticket.id())
                .ok_or_else(|| DomainError::ticket_not_found(ticket.id()))?;

            if slot.version() != ticket.version() {
                return Err(DomainError::Conflict(format!(
                    "Ticket {} was modified concurrently (expected version {}, found {})",
                    ticket.id(),
                    ticket.version(),
                    slot.version()
                )));
            }

            let mut next = ticket;
            next.bump_version();
            *slot = next.clone();
            next
        };

        // The ticket guard is released before touching the plate index;
        // `add` takes the locks in the opposite order.
        if !stored.is_active() {
            self.active_plates
                .remove_if(stored.plate(), |_, owner| *owner == stored.id());
        }

        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn at(s: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(s).unwrap()
    }

    fn ticket(plate: &str, entry: &str) -> ParkingTicket {
        ParkingTicket::new(Uuid::new_v4(), plate, at(entry)).unwrap()
    }

    #[tokio::test]
    async fn add_and_fetch() {
        let repo = InMemoryTicketRepository::new();
        let t = ticket("ABC123", "2024-01-01T08:00:00Z");
        repo.add(t.clone()).await.unwrap();

        assert_eq!(repo.get_by_id(t.id()).await.unwrap(), Some(t.clone()));
        assert_eq!(repo.get_active_by_plate("ABC123").await.unwrap(), Some(t));
        assert_eq!(repo.get_active_by_plate("OTHER").await.unwrap(), None);
        assert_eq!(repo.len(), 1);
    }

    #[tokio::test]
    async fn second_active_ticket_for_plate_is_a_conflict() {
        let repo = InMemoryTicketRepository::new();
        repo.add(ticket("ABC123", "2024-01-01T08:00:00Z")).await.unwrap();

        let result = repo.add(ticket("ABC123", "2024-01-01T09:00:00Z")).await;
        assert!(matches!(result, Err(DomainError::Conflict(_))));
        assert_eq!(repo.len(), 1);
    }

    #[tokio::test]
    async fn closing_frees_the_plate() {
        let repo = InMemoryTicketRepository::new();
        let mut t = ticket("ABC123", "2024-01-01T08:00:00Z");
        repo.add(t.clone()).await.unwrap();

        t.close(at("2024-01-01T09:00:00Z"), Decimal::ONE).unwrap();
        let stored = repo.update(t).await.unwrap();
        assert_eq!(stored.version(), 1);
        assert_eq!(repo.get_active_by_plate("ABC123").await.unwrap(), None);

        repo.add(ticket("ABC123", "2024-01-01T10:00:00Z")).await.unwrap();
        assert!(repo.get_active_by_plate("ABC123").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn plate_index_left_by_a_closed_ticket_does_not_block_add() {
        let repo = InMemoryTicketRepository::new();
        let mut first = ticket("ABC123", "2024-01-01T08:00:00Z");
        repo.add(first.clone()).await.unwrap();

        // Closed in the ticket map while the index still points at it, as
        // between the two steps of `update`.
        first.close(at("2024-01-01T09:00:00Z"), Decimal::ONE).unwrap();
        repo.tickets.insert(first.id(), first.clone());
        assert_eq!(
            repo.active_plates.get("ABC123").map(|id| *id),
            Some(first.id())
        );

        let second = ticket("ABC123", "2024-01-01T10:00:00Z");
        repo.add(second.clone()).await.unwrap();
        assert_eq!(
            repo.get_active_by_plate("ABC123").await.unwrap(),
            Some(second.clone())
        );

        // The late index cleanup of the first ticket must leave the new owner.
        repo.active_plates
            .remove_if("ABC123", |_, owner| *owner == first.id());
        assert_eq!(
            repo.active_plates.get("ABC123").map(|id| *id),
            Some(second.id())
        );

        // A live owner still conflicts.
        let third = repo.add(ticket("ABC123", "2024-01-01T11:00:00Z")).await;
        assert!(matches!(third, Err(DomainError::Conflict(_))));
    }

    #[tokio::test]
    async fn stale_update_is_rejected() {
        let repo = InMemoryTicketRepository::new();
        let t = ticket("ABC123", "2024-01-01T08:00:00Z");
        repo.add(t.clone()).await.unwrap();

        let mut first = t.clone();
        first.close(at("2024-01-01T09:00:00Z"), Decimal::ONE).unwrap();
        repo.update(first).await.unwrap();

        let mut second = t.clone();
        second.close(at("2024-01-01T10:00:00Z"), Decimal::TWO).unwrap();
        let result = repo.update(second).await;
        assert!(matches!(result, Err(DomainError::Conflict(_))));

        let stored = repo.get_by_id(t.id()).await.unwrap().unwrap();
        assert_eq!(stored.total_amount(), Some(Decimal::ONE));
        assert_eq!(stored.version(), 1);
    }

    #[tokio::test]
    async fn update_of_unknown_ticket_is_not_found() {
        let repo = InMemoryTicketRepository::new();
        let result = repo.update(ticket("ABC123", "2024-01-01T08:00:00Z")).await;
        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn listing_is_newest_first() {
        let repo = InMemoryTicketRepository::new();
        repo.add(ticket("A1", "2024-01-01T08:00:00Z")).await.unwrap();
        repo.add(ticket("A3", "2024-01-03T08:00:00Z")).await.unwrap();
        repo.add(ticket("A2", "2024-01-02T08:00:00Z")).await.unwrap();

        let plates: Vec<String> = repo
            .get_all()
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.plate().to_string())
            .collect();
        assert_eq!(plates, vec!["A3", "A2", "A1"]);
    }

    #[tokio::test]
    async fn period_is_half_open() {
        let repo = InMemoryTicketRepository::new();
        repo.add(ticket("A1", "2024-01-01T00:00:00Z")).await.unwrap();
        repo.add(ticket("A2", "2024-01-31T23:59:59Z")).await.unwrap();
        repo.add(ticket("A3", "2024-02-01T00:00:00Z")).await.unwrap();

        let january = repo
            .get_by_period(at("2024-01-01T00:00:00Z"), at("2024-02-01T00:00:00Z"))
            .await
            .unwrap();
        assert_eq!(january.len(), 2);

        let inverted = repo
            .get_by_period(at("2024-02-01T00:00:00Z"), at("2024-01-01T00:00:00Z"))
            .await;
        assert!(matches!(inverted, Err(DomainError::InvalidInput(_))));
    }
}
