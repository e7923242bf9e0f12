//! Create monthly_targets table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MonthlyTargets::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MonthlyTargets::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(MonthlyTargets::Year).integer().not_null())
                    .col(ColumnDef::new(MonthlyTargets::Month).integer().not_null())
                    .col(
                        ColumnDef::new(MonthlyTargets::TargetEntries)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .to_owned(),
            )
            .await?;

        // Upserts conflict on this index.
        manager
            .create_index(
                Index::create()
                    .name("ux_monthly_targets_year_month")
                    .table(MonthlyTargets::Table)
                    .col(MonthlyTargets::Year)
                    .col(MonthlyTargets::Month)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MonthlyTargets::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum MonthlyTargets {
    Table,
    Id,
    Year,
    Month,
    TargetEntries,
}
