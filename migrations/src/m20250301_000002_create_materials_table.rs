use sea_orm_migration::prelude::*;

use crate::m20250301_000001_create_users_table::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Materials::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Materials::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Materials::Name).string_len(255).not_null())
                    .col(ColumnDef::new(Materials::Location).string_len(16).not_null())
                    .col(
                        ColumnDef::new(Materials::Manufacturer)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Materials::ProductCategory)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Materials::Distributor)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Materials::TickerSymbol)
                            .string_len(8)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Materials::CurrentPrice)
                            .decimal_len(10, 2)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Materials::PreviousPrice).decimal_len(10, 2))
                    .col(
                        ColumnDef::new(Materials::LastUpdated)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Materials::UpdatedBy).uuid())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_materials_updated_by")
                            .from(Materials::Table, Materials::UpdatedBy)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_materials_name")
                    .table(Materials::Table)
                    .col(Materials::Name)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Materials::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Materials {
    Table,
    Id,
    Name,
    Location,
    Manufacturer,
    ProductCategory,
    Distributor,
    TickerSymbol,
    CurrentPrice,
    PreviousPrice,
    LastUpdated,
    UpdatedBy,
}
