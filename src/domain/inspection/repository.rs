//! Vehicle inspection repository interface

use async_trait::async_trait;
use uuid::Uuid;

use super::model::VehicleInspection;
use crate::domain::DomainResult;

#[async_trait]
pub trait InspectionRepository: Send + Sync {
    async fn get_by_id(&self, id: Uuid) -> DomainResult<Option<VehicleInspection>>;

    /// A ticket has at most one inspection
    async fn get_by_ticket_id(&self, ticket_id: Uuid) -> DomainResult<Option<VehicleInspection>>;

    /// Save a new inspection. `Conflict` if the id or the ticket already has one.
    async fn add(&self, inspection: VehicleInspection) -> DomainResult<()>;

    /// Replace a stored inspection. `NotFound` if it does not exist.
    async fn update(&self, inspection: VehicleInspection) -> DomainResult<()>;
}
