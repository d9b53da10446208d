//! Create reservations table
//!
//! Every reservation carries a unique UUID token next to its integer id.

use sea_orm_migration::prelude::*;

use super::m20240101_000002_create_listings::Listings;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Reservations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Reservations::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Reservations::Token)
                            .uuid()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Reservations::ListingId).integer().not_null())
                    .col(ColumnDef::new(Reservations::Checkin).date().not_null())
                    .col(ColumnDef::new(Reservations::Checkout).date().not_null())
                    .col(
                        ColumnDef::new(Reservations::TotalPrice)
                            .decimal_len(10, 2)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Reservations::Comment)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(Reservations::GuestCount).integer().not_null())
                    .col(
                        ColumnDef::new(Reservations::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Reservations::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_reservations_listing")
                            .from(Reservations::Table, Reservations::ListingId)
                            .to(Listings::Table, Listings::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_reservations_listing")
                    .table(Reservations::Table)
                    .col(Reservations::ListingId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Reservations::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Reservations {
    Table,
    Id,
    Token,
    ListingId,
    Checkin,
    Checkout,
    TotalPrice,
    Comment,
    GuestCount,
    CreatedAt,
    UpdatedAt,
}
