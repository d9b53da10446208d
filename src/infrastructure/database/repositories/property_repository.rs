//! SeaORM implementation of the property store

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, NotSet, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use tracing::debug;

use super::listing_repository::delete_listings_cascade;
use crate::domain::property::{NewProperty, Property, PropertyPatch};
use crate::domain::{DomainError, DomainResult, EntityStore};
use crate::infrastructure::database::entities::{listing, property};

pub struct SeaOrmPropertyRepository {
    db: DatabaseConnection,
}

impl SeaOrmPropertyRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn model_to_domain(m: property::Model) -> Property {
    Property {
        id: m.id,
        guest_limit: m.guest_limit,
        bathrooms: m.bathrooms,
        pets_allowed: m.pets_allowed,
        cleaning_fee: m.cleaning_fee,
        activation_date: m.activation_date,
        created_at: m.created_at,
        updated_at: m.updated_at,
    }
}

fn not_found(id: i32) -> DomainError {
    DomainError::NotFound {
        entity: "Property",
        id: id.into(),
    }
}

// ── EntityStore impl ────────────────────────────────────────────

#[async_trait]
impl EntityStore for SeaOrmPropertyRepository {
    type Record = Property;
    type New = NewProperty;
    type Patch = PropertyPatch;

    async fn create(&self, new: NewProperty) -> DomainResult<Property> {
        let now = Utc::now();
        let model = property::ActiveModel {
            id: NotSet,
            guest_limit: Set(new.guest_limit),
            bathrooms: Set(new.bathrooms),
            pets_allowed: Set(new.pets_allowed),
            cleaning_fee: Set(new.cleaning_fee),
            activation_date: Set(new.activation_date),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let saved = model.insert(&self.db).await?;
        debug!("Saved property: {}", saved.id);
        Ok(model_to_domain(saved))
    }

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Property>> {
        let model = property::Entity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(model_to_domain))
    }

    async fn filter_by_ids(&self, ids: &[i32]) -> DomainResult<Vec<Property>> {
        let models = property::Entity::find()
            .filter(property::Column::Id.is_in(ids.iter().copied()))
            .order_by_asc(property::Column::Id)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }

    async fn get_all(&self) -> DomainResult<Vec<Property>> {
        let models = property::Entity::find()
            .order_by_asc(property::Column::Id)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }

    async fn update_fields(&self, id: i32, patch: PropertyPatch) -> DomainResult<Property> {
        debug!("Updating property: {}", id);
        let txn = self.db.begin().await?;

        let existing = property::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| not_found(id))?;

        let mut active: property::ActiveModel = existing.into();
        if let Some(v) = patch.guest_limit {
            active.guest_limit = Set(v);
        }
        if let Some(v) = patch.bathrooms {
            active.bathrooms = Set(v);
        }
        if let Some(v) = patch.pets_allowed {
            active.pets_allowed = Set(v);
        }
        if let Some(v) = patch.cleaning_fee {
            active.cleaning_fee = Set(v);
        }
        if let Some(v) = patch.activation_date {
            active.activation_date = Set(v);
        }
        active.updated_at = Set(Utc::now());

        let updated = active.update(&txn).await?;
        txn.commit().await?;
        Ok(model_to_domain(updated))
    }

    async fn delete_by_id(&self, id: i32) -> DomainResult<u64> {
        debug!("Deleting property: {}", id);
        let txn = self.db.begin().await?;

        if property::Entity::find_by_id(id).one(&txn).await?.is_none() {
            return Err(not_found(id));
        }

        let listing_ids: Vec<i32> = listing::Entity::find()
            .filter(listing::Column::PropertyId.eq(id))
            .all(&txn)
            .await?
            .into_iter()
            .map(|l| l.id)
            .collect();
        let cascaded = delete_listings_cascade(&txn, &listing_ids).await?;

        let deleted = property::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;
        Ok(cascaded + deleted.rows_affected)
    }
}
