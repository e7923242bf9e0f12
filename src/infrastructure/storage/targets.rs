//! In-memory monthly target storage

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use uuid::Uuid;

use crate::domain::{DomainResult, MonthlyTarget, MonthlyTargetRepository};

pub struct InMemoryMonthlyTargetRepository {
    targets: DashMap<(i32, u32), MonthlyTarget>,
}

impl InMemoryMonthlyTargetRepository {
    pub fn new() -> Self {
        Self {
            targets: DashMap::new(),
        }
    }
}

impl Default for InMemoryMonthlyTargetRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MonthlyTargetRepository for InMemoryMonthlyTargetRepository {
    async fn get(&self, year: i32, month: u32) -> DomainResult<Option<MonthlyTarget>> {
        Ok(self.targets.get(&(year, month)).map(|t| t.clone()))
    }

    async fn upsert(&self, year: i32, month: u32, target_entries: i32) -> DomainResult<MonthlyTarget> {
        match self.targets.entry((year, month)) {
            Entry::Occupied(mut slot) => {
                slot.get_mut().update_target(target_entries)?;
                Ok(slot.get().clone())
            }
            Entry::Vacant(slot) => {
                let target = MonthlyTarget::new(Uuid::new_v4(), year, month, target_entries)?;
                slot.insert(target.clone());
                Ok(target)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DomainError;

    #[tokio::test]
    async fn upsert_creates_then_updates_in_place() {
        let repo = InMemoryMonthlyTargetRepository::new();
        assert_eq!(repo.get(2024, 5).await.unwrap(), None);

        let created = repo.upsert(2024, 5, 100).await.unwrap();
        let updated = repo.upsert(2024, 5, 150).await.unwrap();

        assert_eq!(created.id(), updated.id());
        assert_eq!(updated.target_entries(), 150);
        assert_eq!(repo.get(2024, 5).await.unwrap(), Some(updated));
        assert_eq!(repo.get(2024, 6).await.unwrap(), None);
    }

    #[tokio::test]
    async fn invalid_upsert_stores_nothing() {
        let repo = InMemoryMonthlyTargetRepository::new();
        assert!(matches!(
            repo.upsert(2024, 13, 10).await,
            Err(DomainError::InvalidInput(_))
        ));
        assert_eq!(repo.get(2024, 13).await.unwrap(), None);

        repo.upsert(2024, 5, 10).await.unwrap();
        assert!(repo.upsert(2024, 5, -1).await.is_err());
        assert_eq!(repo.get(2024, 5).await.unwrap().unwrap().target_entries(), 10);
    }
}
