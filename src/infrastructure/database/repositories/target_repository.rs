//! SeaORM implementation of MonthlyTargetRepository

use async_trait::async_trait;
use log::debug;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::domain::{DomainError, DomainResult, MonthlyTarget, MonthlyTargetRepository};
use crate::infrastructure::database::entities::monthly_target;

pub struct SeaOrmMonthlyTargetRepository {
    db: DatabaseConnection,
}

impl SeaOrmMonthlyTargetRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn model_to_domain(m: monthly_target::Model) -> DomainResult<MonthlyTarget> {
    let month = u32::try_from(m.month).map_err(|_| {
        DomainError::StoreUnavailable(format!("Target {} has a malformed month {}", m.id, m.month))
    })?;
    MonthlyTarget::new(m.id, m.year, month, m.target_entries)
}

fn db_err(e: DbErr) -> DomainError {
    DomainError::StoreUnavailable(format!("Database error: {}", e))
}

#[async_trait]
impl MonthlyTargetRepository for SeaOrmMonthlyTargetRepository {
    async fn get(&self, year: i32, month: u32) -> DomainResult<Option<MonthlyTarget>> {
        monthly_target::Entity::find()
            .filter(monthly_target::Column::Year.eq(year))
            .filter(monthly_target::Column::Month.eq(month as i32))
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(model_to_domain)
            .transpose()
    }

    async fn upsert(&self, year: i32, month: u32, target_entries: i32) -> DomainResult<MonthlyTarget> {
        // Validates before touching the store; the id only sticks on insert.
        let candidate = MonthlyTarget::new(Uuid::new_v4(), year, month, target_entries)?;
        debug!("Upserting target {}-{:02} = {}", year, month, target_entries);

        let model = monthly_target::ActiveModel {
            id: Set(candidate.id()),
            year: Set(year),
            month: Set(month as i32),
            target_entries: Set(target_entries),
        };
        monthly_target::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([monthly_target::Column::Year, monthly_target::Column::Month])
                    .update_column(monthly_target::Column::TargetEntries)
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(db_err)?;

        self.get(year, month).await?.ok_or_else(|| {
            DomainError::StoreUnavailable(format!("Target {}-{:02} vanished after upsert", year, month))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::database::migrator::Migrator;
    use crate::infrastructure::database::{init_database, DatabaseConfig};
    use sea_orm_migration::MigratorTrait;

    async fn repo() -> SeaOrmMonthlyTargetRepository {
        let db = init_database(&DatabaseConfig::in_memory()).await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        SeaOrmMonthlyTargetRepository::new(db)
    }

    #[tokio::test]
    async fn upsert_keeps_one_row_per_month() {
        let repo = repo().await;
        assert_eq!(repo.get(2024, 5).await.unwrap(), None);

        let created = repo.upsert(2024, 5, 100).await.unwrap();
        let updated = repo.upsert(2024, 5, 250).await.unwrap();
        assert_eq!(created.id(), updated.id());
        assert_eq!(updated.target_entries(), 250);

        let other = repo.upsert(2024, 6, 10).await.unwrap();
        assert_ne!(other.id(), created.id());
        assert_eq!(repo.get(2024, 5).await.unwrap(), Some(updated));
        assert_eq!(
            monthly_target::Entity::find().all(&repo.db).await.unwrap().len(),
            2
        );
    }

    #[tokio::test]
    async fn invalid_values_never_reach_the_table() {
        let repo = repo().await;
        assert!(matches!(
            repo.upsert(2024, 0, 10).await,
            Err(DomainError::InvalidInput(_))
        ));
        assert!(matches!(
            repo.upsert(2024, 5, -10).await,
            Err(DomainError::InvalidInput(_))
        ));
        assert!(monthly_target::Entity::find().all(&repo.db).await.unwrap().is_empty());
    }
}
