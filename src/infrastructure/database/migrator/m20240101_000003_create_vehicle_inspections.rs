//! Create vehicle_inspections table
//!
//! One condition checklist per parking ticket.

use sea_orm_migration::prelude::*;

use super::m20240101_000001_create_parking_tickets::ParkingTickets;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(VehicleInspections::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(VehicleInspections::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(VehicleInspections::TicketId)
                            .uuid()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(VehicleInspections::InspectedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(VehicleInspections::NoScratches)
                            .boolean()
                            .not_null(),
                    )
                    .col(ColumnDef::new(VehicleInspections::ScratchesPhotoUrl).string())
                    .col(
                        ColumnDef::new(VehicleInspections::NoMissingItems)
                            .boolean()
                            .not_null(),
                    )
                    .col(ColumnDef::new(VehicleInspections::MissingItemsPhotoUrl).string())
                    .col(
                        ColumnDef::new(VehicleInspections::NoLostKeys)
                            .boolean()
                            .not_null(),
                    )
                    .col(ColumnDef::new(VehicleInspections::LostKeysPhotoUrl).string())
                    .col(
                        ColumnDef::new(VehicleInspections::NoHarshImpacts)
                            .boolean()
                            .not_null(),
                    )
                    .col(ColumnDef::new(VehicleInspections::HarshImpactsPhotoUrl).string())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_vehicle_inspections_ticket")
                            .from(VehicleInspections::Table, VehicleInspections::TicketId)
                            .to(ParkingTickets::Table, ParkingTickets::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(VehicleInspections::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum VehicleInspections {
    Table,
    Id,
    TicketId,
    InspectedAt,
    NoScratches,
    ScratchesPhotoUrl,
    NoMissingItems,
    MissingItemsPhotoUrl,
    NoLostKeys,
    LostKeysPhotoUrl,
    NoHarshImpacts,
    HarshImpactsPhotoUrl,
}
