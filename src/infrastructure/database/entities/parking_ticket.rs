//! Parking ticket entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "parking_tickets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Normalized plate (trimmed, uppercase)
    pub plate: String,

    /// Entry time with the caller's offset
    pub entry_at: DateTimeWithTimeZone,

    /// `entry_at` as nanoseconds since the Unix epoch, used for ordering and ranges
    pub entry_at_nanos: i64,

    #[sea_orm(nullable)]
    pub exit_at: Option<DateTimeWithTimeZone>,

    /// Exact decimal text, e.g. "45.00"
    #[sea_orm(nullable)]
    pub total_amount: Option<String>,

    /// Incremented on every successful update
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn is_active(&self) -> bool {
        self.exit_at.is_none()
    }
}
