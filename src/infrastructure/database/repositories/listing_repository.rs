//! SeaORM implementation of the listing store

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    NotSet, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tracing::debug;

use crate::domain::listing::{Listing, ListingPatch, NewListing};
use crate::domain::{DomainError, DomainResult, EntityStore};
use crate::infrastructure::database::entities::{listing, property, reservation};

pub struct SeaOrmListingRepository {
    db: DatabaseConnection,
}

impl SeaOrmListingRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn model_to_domain(m: listing::Model) -> Listing {
    Listing {
        id: m.id,
        property_id: m.property_id,
        platform: m.platform,
        platform_fee: m.platform_fee,
        created_at: m.created_at,
        updated_at: m.updated_at,
    }
}

async fn ensure_property_exists<C: ConnectionTrait>(conn: &C, property_id: i32) -> DomainResult<()> {
    if property::Entity::find_by_id(property_id).one(conn).await?.is_none() {
        return Err(DomainError::Constraint(format!(
            "Property with id={} does not exist",
            property_id
        )));
    }
    Ok(())
}

/// Delete the given listings together with their reservations.
/// Returns the total number of rows removed.
pub(super) async fn delete_listings_cascade<C: ConnectionTrait>(
    conn: &C,
    listing_ids: &[i32],
) -> Result<u64, DbErr> {
    if listing_ids.is_empty() {
        return Ok(0);
    }

    let reservations = reservation::Entity::delete_many()
        .filter(reservation::Column::ListingId.is_in(listing_ids.iter().copied()))
        .exec(conn)
        .await?;
    let listings = listing::Entity::delete_many()
        .filter(listing::Column::Id.is_in(listing_ids.iter().copied()))
        .exec(conn)
        .await?;

    Ok(reservations.rows_affected + listings.rows_affected)
}

// ── EntityStore impl ────────────────────────────────────────────

#[async_trait]
impl EntityStore for SeaOrmListingRepository {
    type Record = Listing;
    type New = NewListing;
    type Patch = ListingPatch;

    async fn create(&self, new: NewListing) -> DomainResult<Listing> {
        let txn = self.db.begin().await?;
        ensure_property_exists(&txn, new.property_id).await?;

        let now = Utc::now();
        let model = listing::ActiveModel {
            id: NotSet,
            property_id: Set(new.property_id),
            platform: Set(new.platform),
            platform_fee: Set(new.platform_fee),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let saved = model.insert(&txn).await?;
        txn.commit().await?;

        debug!("Saved listing {} for property {}", saved.id, saved.property_id);
        Ok(model_to_domain(saved))
    }

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Listing>> {
        let model = listing::Entity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(model_to_domain))
    }

    async fn filter_by_ids(&self, ids: &[i32]) -> DomainResult<Vec<Listing>> {
        let models = listing::Entity::find()
            .filter(listing::Column::Id.is_in(ids.iter().copied()))
            .order_by_asc(listing::Column::Id)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }

    async fn get_all(&self) -> DomainResult<Vec<Listing>> {
        let models = listing::Entity::find()
            .order_by_asc(listing::Column::Id)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }

    async fn update_fields(&self, id: i32, patch: ListingPatch) -> DomainResult<Listing> {
        debug!("Updating listing: {}", id);
        let txn = self.db.begin().await?;

        let existing = listing::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(DomainError::NotFound {
                entity: "Listing",
                id: id.into(),
            })?;

        let mut active: listing::ActiveModel = existing.into();
        if let Some(v) = patch.property_id {
            ensure_property_exists(&txn, v).await?;
            active.property_id = Set(v);
        }
        if let Some(v) = patch.platform {
            active.platform = Set(v);
        }
        if let Some(v) = patch.platform_fee {
            active.platform_fee = Set(v);
        }
        active.updated_at = Set(Utc::now());

        let updated = active.update(&txn).await?;
        txn.commit().await?;
        Ok(model_to_domain(updated))
    }

    async fn delete_by_id(&self, id: i32) -> DomainResult<u64> {
        debug!("Deleting listing: {}", id);
        let txn = self.db.begin().await?;

        if listing::Entity::find_by_id(id).one(&txn).await?.is_none() {
            return Err(DomainError::NotFound {
                entity: "Listing",
                id: id.into(),
            });
        }

        let deleted = delete_listings_cascade(&txn, &[id]).await?;
        txn.commit().await?;
        Ok(deleted)
    }
}
