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
                    .table(PriceChangeRequests::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PriceChangeRequests::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PriceChangeRequests::MaterialName)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PriceChangeRequests::Distributor)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PriceChangeRequests::RequestedPrice)
                            .decimal_len(10, 2)
                            .not_null(),
                    )
                    .col(ColumnDef::new(PriceChangeRequests::CurrentPrice).decimal_len(10, 2))
                    .col(
                        ColumnDef::new(PriceChangeRequests::SubmittedBy)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PriceChangeRequests::SubmittedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PriceChangeRequests::Status)
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(PriceChangeRequests::ReviewedBy).uuid())
                    .col(
                        ColumnDef::new(PriceChangeRequests::ReviewedAt)
                            .timestamp_with_time_zone(),
                    )
                    .col(ColumnDef::new(PriceChangeRequests::Notes).text())
                    .col(ColumnDef::new(PriceChangeRequests::SlackMessageTs).string_len(64))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_price_change_requests_submitted_by")
                            .from(
                                PriceChangeRequests::Table,
                                PriceChangeRequests::SubmittedBy,
                            )
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_price_change_requests_status")
                    .table(PriceChangeRequests::Table)
                    .col(PriceChangeRequests::Status)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PriceChangeRequests::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum PriceChangeRequests {
    Table,
    Id,
    MaterialName,
    Distributor,
    RequestedPrice,
    CurrentPrice,
    SubmittedBy,
    SubmittedAt,
    Status,
    ReviewedBy,
    ReviewedAt,
    Notes,
    SlackMessageTs,
}
