use sea_orm_migration::prelude::*;

use crate::m20250301_000001_create_users_table::Users;
use crate::m20250301_000002_create_materials_table::Materials;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PriceHistory::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PriceHistory::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PriceHistory::MaterialId).uuid().not_null())
                    .col(ColumnDef::new(PriceHistory::OldPrice).decimal_len(10, 2))
                    .col(
                        ColumnDef::new(PriceHistory::NewPrice)
                            .decimal_len(10, 2)
                            .not_null(),
                    )
                    .col(ColumnDef::new(PriceHistory::ChangePercent).decimal_len(12, 6))
                    .col(ColumnDef::new(PriceHistory::SubmittedBy).uuid().not_null())
                    .col(
                        ColumnDef::new(PriceHistory::SubmittedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(PriceHistory::ApprovedBy).uuid())
                    .col(ColumnDef::new(PriceHistory::ApprovedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(PriceHistory::Status)
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(PriceHistory::Notes).text())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_price_history_material")
                            .from(PriceHistory::Table, PriceHistory::MaterialId)
                            .to(Materials::Table, Materials::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_price_history_submitted_by")
                            .from(PriceHistory::Table, PriceHistory::SubmittedBy)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_price_history_material_submitted")
                    .table(PriceHistory::Table)
                    .col(PriceHistory::MaterialId)
                    .col(PriceHistory::SubmittedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PriceHistory::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum PriceHistory {
    Table,
    Id,
    MaterialId,
    OldPrice,
    NewPrice,
    ChangePercent,
    SubmittedBy,
    SubmittedAt,
    ApprovedBy,
    ApprovedAt,
    Status,
    Notes,
}
