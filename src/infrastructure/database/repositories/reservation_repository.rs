//! SeaORM implementation of the reservation store

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, NotSet,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tracing::debug;
use uuid::Uuid;

use crate::domain::reservation::{NewReservation, Reservation, ReservationPatch};
use crate::domain::{DomainError, DomainResult, EntityStore};
use crate::infrastructure::database::entities::{listing, reservation};

pub struct SeaOrmReservationRepository {
    db: DatabaseConnection,
}

impl SeaOrmReservationRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn model_to_domain(m: reservation::Model) -> Reservation {
    Reservation {
        id: m.id,
        token: m.token,
        listing_id: m.listing_id,
        checkin: m.checkin,
        checkout: m.checkout,
        total_price: m.total_price,
        comment: m.comment,
        guest_count: m.guest_count,
        created_at: m.created_at,
        updated_at: m.updated_at,
    }
}

fn not_found(id: i32) -> DomainError {
    DomainError::NotFound {
        entity: "Reservation",
        id: id.into(),
    }
}

async fn ensure_listing_exists<C: ConnectionTrait>(conn: &C, listing_id: i32) -> DomainResult<()> {
    if listing::Entity::find_by_id(listing_id).one(conn).await?.is_none() {
        return Err(DomainError::Constraint(format!(
            "Listing with id={} does not exist",
            listing_id
        )));
    }
    Ok(())
}

// ── EntityStore impl ────────────────────────────────────────────

#[async_trait]
impl EntityStore for SeaOrmReservationRepository {
    type Record = Reservation;
    type New = NewReservation;
    type Patch = ReservationPatch;

    async fn create(&self, new: NewReservation) -> DomainResult<Reservation> {
        new.ensure_valid()?;

        let txn = self.db.begin().await?;
        ensure_listing_exists(&txn, new.listing_id).await?;

        let now = Utc::now();
        let model = reservation::ActiveModel {
            id: NotSet,
            token: Set(Uuid::new_v4()),
            listing_id: Set(new.listing_id),
            checkin: Set(new.checkin),
            checkout: Set(new.checkout),
            total_price: Set(new.total_price),
            comment: Set(new.comment),
            guest_count: Set(new.guest_count),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let saved = model.insert(&txn).await?;
        txn.commit().await?;

        debug!("Saved reservation {} ({})", saved.id, saved.token);
        Ok(model_to_domain(saved))
    }

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Reservation>> {
        let model = reservation::Entity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(model_to_domain))
    }

    async fn filter_by_ids(&self, ids: &[i32]) -> DomainResult<Vec<Reservation>> {
        let models = reservation::Entity::find()
            .filter(reservation::Column::Id.is_in(ids.iter().copied()))
            .order_by_asc(reservation::Column::Id)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }

    async fn get_all(&self) -> DomainResult<Vec<Reservation>> {
        let models = reservation::Entity::find()
            .order_by_asc(reservation::Column::Id)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }

    async fn update_fields(&self, id: i32, patch: ReservationPatch) -> DomainResult<Reservation> {
        debug!("Updating reservation: {}", id);
        let txn = self.db.begin().await?;

        let existing = reservation::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| not_found(id))?;

        let current = model_to_domain(existing.clone());
        let next = patch.merged(&current, Utc::now())?;
        if next.listing_id != current.listing_id {
            ensure_listing_exists(&txn, next.listing_id).await?;
        }

        let mut active: reservation::ActiveModel = existing.into();
        active.listing_id = Set(next.listing_id);
        active.checkin = Set(next.checkin);
        active.checkout = Set(next.checkout);
        active.total_price = Set(next.total_price);
        active.comment = Set(next.comment);
        active.guest_count = Set(next.guest_count);
        active.updated_at = Set(next.updated_at);

        let updated = active.update(&txn).await?;
        txn.commit().await?;
        Ok(model_to_domain(updated))
    }

    async fn delete_by_id(&self, id: i32) -> DomainResult<u64> {
        debug!("Deleting reservation: {}", id);
        let result = reservation::Entity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(not_found(id));
        }
        Ok(result.rows_affected)
    }
}
