//! Reservation entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reservations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Public reservation code (UUID v4), never updated
    #[sea_orm(unique)]
    pub token: Uuid,

    pub listing_id: i32,

    pub checkin: Date,
    pub checkout: Date,

    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub total_price: Decimal,

    #[sea_orm(column_type = "Text")]
    pub comment: String,

    pub guest_count: i32,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::listing::Entity",
        from = "Column::ListingId",
        to = "super::listing::Column::Id",
        on_delete = "Cascade"
    )]
    Listing,
}

impl Related<super::listing::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Listing.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
