//! Vehicle inspection entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "vehicle_inspections")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// One inspection per ticket
    #[sea_orm(unique)]
    pub ticket_id: Uuid,

    pub inspected_at: DateTimeWithTimeZone,

    pub no_scratches: bool,
    #[sea_orm(nullable)]
    pub scratches_photo_url: Option<String>,

    pub no_missing_items: bool,
    #[sea_orm(nullable)]
    pub missing_items_photo_url: Option<String>,

    pub no_lost_keys: bool,
    #[sea_orm(nullable)]
    pub lost_keys_photo_url: Option<String>,

    pub no_harsh_impacts: bool,
    #[sea_orm(nullable)]
    pub harsh_impacts_photo_url: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::parking_ticket::Entity",
        from = "Column::TicketId",
        to = "super::parking_ticket::Column::Id"
    )]
    ParkingTicket,
}

impl Related<super::parking_ticket::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ParkingTicket.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
