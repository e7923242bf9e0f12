//! SeaORM implementation of InspectionRepository

use async_trait::async_trait;
use log::debug;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
    SqlErr,
};
use uuid::Uuid;

use crate::domain::{
    DomainError, DomainResult, InspectionChecklist, InspectionRepository, VehicleInspection,
};
use crate::infrastructure::database::entities::vehicle_inspection;

pub struct SeaOrmInspectionRepository {
    db: DatabaseConnection,
}

impl SeaOrmInspectionRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn model_to_domain(m: vehicle_inspection::Model) -> VehicleInspection {
    VehicleInspection::restore(
        m.id,
        m.ticket_id,
        m.inspected_at,
        InspectionChecklist {
            no_scratches: m.no_scratches,
            scratches_photo_url: m.scratches_photo_url,
            no_missing_items: m.no_missing_items,
            missing_items_photo_url: m.missing_items_photo_url,
            no_lost_keys: m.no_lost_keys,
            lost_keys_photo_url: m.lost_keys_photo_url,
            no_harsh_impacts: m.no_harsh_impacts,
            harsh_impacts_photo_url: m.harsh_impacts_photo_url,
        },
    )
}

fn domain_to_active(inspection: &VehicleInspection) -> vehicle_inspection::ActiveModel {
    let c = inspection.checklist().clone();
    vehicle_inspection::ActiveModel {
        id: Set(inspection.id()),
        ticket_id: Set(inspection.ticket_id()),
        inspected_at: Set(inspection.inspected_at()),
        no_scratches: Set(c.no_scratches),
        scratches_photo_url: Set(c.scratches_photo_url),
        no_missing_items: Set(c.no_missing_items),
        missing_items_photo_url: Set(c.missing_items_photo_url),
        no_lost_keys: Set(c.no_lost_keys),
        lost_keys_photo_url: Set(c.lost_keys_photo_url),
        no_harsh_impacts: Set(c.no_harsh_impacts),
        harsh_impacts_photo_url: Set(c.harsh_impacts_photo_url),
    }
}

fn db_err(e: DbErr) -> DomainError {
    DomainError::StoreUnavailable(format!("Database error: {}", e))
}

fn insert_err(e: DbErr, inspection: &VehicleInspection) -> DomainError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => DomainError::Conflict(format!(
            "Ticket {} already has an inspection",
            inspection.ticket_id()
        )),
        Some(SqlErr::ForeignKeyConstraintViolation(_)) => {
            DomainError::ticket_not_found(inspection.ticket_id())
        }
        _ => db_err(e),
    }
}

// ── InspectionRepository impl ───────────────────────────────────

#[async_trait]
impl InspectionRepository for SeaOrmInspectionRepository {
    async fn get_by_id(&self, id: Uuid) -> DomainResult<Option<VehicleInspection>> {
        Ok(vehicle_inspection::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(model_to_domain))
    }

    async fn get_by_ticket_id(&self, ticket_id: Uuid) -> DomainResult<Option<VehicleInspection>> {
        Ok(vehicle_inspection::Entity::find()
            .filter(vehicle_inspection::Column::TicketId.eq(ticket_id))
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(model_to_domain))
    }

    async fn add(&self, inspection: VehicleInspection) -> DomainResult<()> {
        debug!(
            "Saving inspection {} for ticket {}",
            inspection.id(),
            inspection.ticket_id()
        );
        vehicle_inspection::Entity::insert(domain_to_active(&inspection))
            .exec_without_returning(&self.db)
            .await
            .map_err(|e| insert_err(e, &inspection))?;
        Ok(())
    }

    async fn update(&self, inspection: VehicleInspection) -> DomainResult<()> {
        debug!("Updating inspection {}", inspection.id());

        let existing = vehicle_inspection::Entity::find_by_id(inspection.id())
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::inspection_not_found(inspection.id()))?;

        if existing.ticket_id != inspection.ticket_id() {
            return Err(DomainError::InvalidInput(
                "The ticket of an inspection cannot change".to_string(),
            ));
        }

        domain_to_active(&inspection)
            .update(&self.db)
            .await
            .map_err(db_err)?;
        Ok(())
    }
}
