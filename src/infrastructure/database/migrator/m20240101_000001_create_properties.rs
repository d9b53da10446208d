//! Create properties table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Properties::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Properties::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Properties::GuestLimit).integer().not_null())
                    .col(ColumnDef::new(Properties::Bathrooms).integer().not_null())
                    .col(
                        ColumnDef::new(Properties::PetsAllowed)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Properties::CleaningFee)
                            .decimal_len(10, 2)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Properties::ActivationDate).date().not_null())
                    .col(
                        ColumnDef::new(Properties::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Properties::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Properties::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Properties {
    Table,
    Id,
    GuestLimit,
    Bathrooms,
    PetsAllowed,
    CleaningFee,
    ActivationDate,
    CreatedAt,
    UpdatedAt,
}
