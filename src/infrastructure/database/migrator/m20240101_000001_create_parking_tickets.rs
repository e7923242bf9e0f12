//! Create parking_tickets table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ParkingTickets::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ParkingTickets::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ParkingTickets::Plate).string().not_null())
                    .col(
                        ColumnDef::new(ParkingTickets::EntryAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ParkingTickets::EntryAtNanos)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ParkingTickets::ExitAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(ParkingTickets::TotalAmount).string())
                    .col(
                        ColumnDef::new(ParkingTickets::Version)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .to_owned(),
            )
            .await?;

        // Listing and period queries
        manager
            .create_index(
                Index::create()
                    .name("idx_parking_tickets_entry_at_nanos")
                    .table(ParkingTickets::Table)
                    .col(ParkingTickets::EntryAtNanos)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_parking_tickets_plate")
                    .table(ParkingTickets::Table)
                    .col(ParkingTickets::Plate)
                    .to_owned(),
            )
            .await?;

        // At most one active ticket per plate. sea-query has no partial index
        // builder, so this one is raw SQL.
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE UNIQUE INDEX IF NOT EXISTS ux_parking_tickets_active_plate \
                 ON parking_tickets (plate) WHERE exit_at IS NULL",
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ParkingTickets::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum ParkingTickets {
    Table,
    Id,
    Plate,
    EntryAt,
    EntryAtNanos,
    ExitAt,
    TotalAmount,
    Version,
}
