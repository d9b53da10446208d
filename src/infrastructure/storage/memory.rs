//! In-memory storage implementation

use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;

use crate::domain::{
    DomainError, DomainResult, EntityStore, Listing, ListingPatch, ListingRepository, NewListing,
    NewProperty, NewReservation, Property, PropertyPatch, PropertyRepository, RepositoryProvider,
    Reservation, ReservationPatch, ReservationRepository,
};

/// Rows shared by the three stores so foreign keys and cascades can be
/// checked across aggregates.
struct Tables {
    properties: DashMap<i32, Property>,
    listings: DashMap<i32, Listing>,
    reservations: DashMap<i32, Reservation>,
    property_counter: AtomicI32,
    listing_counter: AtomicI32,
    reservation_counter: AtomicI32,
    /// Serializes writers; readers never take it.
    writer: Mutex<()>,
}

impl Tables {
    fn new() -> Self {
        Self {
            properties: DashMap::new(),
            listings: DashMap::new(),
            reservations: DashMap::new(),
            property_counter: AtomicI32::new(1),
            listing_counter: AtomicI32::new(1),
            reservation_counter: AtomicI32::new(1),
            writer: Mutex::new(()),
        }
    }

    fn write(&self) -> DomainResult<MutexGuard<'_, ()>> {
        self.writer
            .lock()
            .map_err(|_| DomainError::Database("storage lock poisoned".to_string()))
    }

    fn ensure_property(&self, id: i32) -> DomainResult<()> {
        if self.properties.contains_key(&id) {
            Ok(())
        } else {
            Err(DomainError::Constraint(format!(
                "Property with id={} does not exist",
                id
            )))
        }
    }

    fn ensure_listing(&self, id: i32) -> DomainResult<()> {
        if self.listings.contains_key(&id) {
            Ok(())
        } else {
            Err(DomainError::Constraint(format!(
                "Listing with id={} does not exist",
                id
            )))
        }
    }

    /// Remove the listings and every reservation referencing them.
    fn remove_listings(&self, listing_ids: &[i32]) -> u64 {
        let reservation_ids: Vec<i32> = self
            .reservations
            .iter()
            .filter(|r| listing_ids.contains(&r.listing_id))
            .map(|r| r.id)
            .collect();

        let mut removed = 0;
        for id in reservation_ids {
            if self.reservations.remove(&id).is_some() {
                removed += 1;
            }
        }
        for id in listing_ids {
            if self.listings.remove(id).is_some() {
                removed += 1;
            }
        }
        removed
    }
}

fn sorted_rows<T: Clone>(map: &DashMap<i32, T>, keep: impl Fn(i32) -> bool) -> Vec<T> {
    let mut rows: Vec<(i32, T)> = map
        .iter()
        .filter(|e| keep(*e.key()))
        .map(|e| (*e.key(), e.value().clone()))
        .collect();
    rows.sort_by_key(|(id, _)| *id);
    rows.into_iter().map(|(_, row)| row).collect()
}

fn not_found(entity: &'static str, id: i32) -> DomainError {
    DomainError::NotFound {
        entity,
        id: id.into(),
    }
}

struct InMemoryPropertyStore(Arc<Tables>);
struct InMemoryListingStore(Arc<Tables>);
struct InMemoryReservationStore(Arc<Tables>);

/// In-memory storage for development and testing.
///
/// Mirrors the database semantics: sequential ids, foreign key checks,
/// cascading deletes and check-in/check-out ordering.
pub struct InMemoryStorage {
    properties: InMemoryPropertyStore,
    listings: InMemoryListingStore,
    reservations: InMemoryReservationStore,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        let tables = Arc::new(Tables::new());
        Self {
            properties: InMemoryPropertyStore(Arc::clone(&tables)),
            listings: InMemoryListingStore(Arc::clone(&tables)),
            reservations: InMemoryReservationStore(tables),
        }
    }
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl RepositoryProvider for InMemoryStorage {
    fn properties(&self) -> &PropertyRepository {
        &self.properties
    }

    fn listings(&self) -> &ListingRepository {
        &self.listings
    }

    fn reservations(&self) -> &ReservationRepository {
        &self.reservations
    }
}

#[async_trait]
impl EntityStore for InMemoryPropertyStore {
    type Record = Property;
    type New = NewProperty;
    type Patch = PropertyPatch;

    async fn create(&self, new: NewProperty) -> DomainResult<Property> {
        let _guard = self.0.write()?;
        let id = self.0.property_counter.fetch_add(1, Ordering::SeqCst);
        let property = Property::from_new(id, new, Utc::now());
        self.0.properties.insert(id, property.clone());
        Ok(property)
    }

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Property>> {
        Ok(self.0.properties.get(&id).map(|p| p.clone()))
    }

    async fn filter_by_ids(&self, ids: &[i32]) -> DomainResult<Vec<Property>> {
        Ok(sorted_rows(&self.0.properties, |id| ids.contains(&id)))
    }

    async fn get_all(&self) -> DomainResult<Vec<Property>> {
        Ok(sorted_rows(&self.0.properties, |_| true))
    }

    async fn update_fields(&self, id: i32, patch: PropertyPatch) -> DomainResult<Property> {
        let _guard = self.0.write()?;
        let mut property = self
            .0
            .properties
            .get_mut(&id)
            .ok_or_else(|| not_found("Property", id))?;
        patch.apply_to(&mut property, Utc::now());
        Ok(property.clone())
    }

    async fn delete_by_id(&self, id: i32) -> DomainResult<u64> {
        let _guard = self.0.write()?;
        if !self.0.properties.contains_key(&id) {
            return Err(not_found("Property", id));
        }

        let listing_ids: Vec<i32> = self
            .0
            .listings
            .iter()
            .filter(|l| l.property_id == id)
            .map(|l| l.id)
            .collect();
        let cascaded = self.0.remove_listings(&listing_ids);
        self.0.properties.remove(&id);
        Ok(cascaded + 1)
    }
}

#[async_trait]
impl EntityStore for InMemoryListingStore {
    type Record = Listing;
    type New = NewListing;
    type Patch = ListingPatch;

    async fn create(&self, new: NewListing) -> DomainResult<Listing> {
        let _guard = self.0.write()?;
        self.0.ensure_property(new.property_id)?;
        let id = self.0.listing_counter.fetch_add(1, Ordering::SeqCst);
        let listing = Listing::from_new(id, new, Utc::now());
        self.0.listings.insert(id, listing.clone());
        Ok(listing)
    }

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Listing>> {
        Ok(self.0.listings.get(&id).map(|l| l.clone()))
    }

    async fn filter_by_ids(&self, ids: &[i32]) -> DomainResult<Vec<Listing>> {
        Ok(sorted_rows(&self.0.listings, |id| ids.contains(&id)))
    }

    async fn get_all(&self) -> DomainResult<Vec<Listing>> {
        Ok(sorted_rows(&self.0.listings, |_| true))
    }

    async fn update_fields(&self, id: i32, patch: ListingPatch) -> DomainResult<Listing> {
        let _guard = self.0.write()?;
        if let Some(property_id) = patch.property_id {
            self.0.ensure_property(property_id)?;
        }
        let mut listing = self
            .0
            .listings
            .get_mut(&id)
            .ok_or_else(|| not_found("Listing", id))?;
        patch.apply_to(&mut listing, Utc::now());
        Ok(listing.clone())
    }

    async fn delete_by_id(&self, id: i32) -> DomainResult<u64> {
        let _guard = self.0.write()?;
        if !self.0.listings.contains_key(&id) {
            return Err(not_found("Listing", id));
        }
        Ok(self.0.remove_listings(&[id]))
    }
}

#[async_trait]
impl EntityStore for InMemoryReservationStore {
    type Record = Reservation;
    type New = NewReservation;
    type Patch = ReservationPatch;

    async fn create(&self, new: NewReservation) -> DomainResult<Reservation> {
        new.ensure_valid()?;
        let _guard = self.0.write()?;
        self.0.ensure_listing(new.listing_id)?;
        let id = self.0.reservation_counter.fetch_add(1, Ordering::SeqCst);
        let reservation = Reservation::from_new(id, new, Utc::now());
        self.0.reservations.insert(id, reservation.clone());
        Ok(reservation)
    }

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Reservation>> {
        Ok(self.0.reservations.get(&id).map(|r| r.clone()))
    }

    async fn filter_by_ids(&self, ids: &[i32]) -> DomainResult<Vec<Reservation>> {
        Ok(sorted_rows(&self.0.reservations, |id| ids.contains(&id)))
    }

    async fn get_all(&self) -> DomainResult<Vec<Reservation>> {
        Ok(sorted_rows(&self.0.reservations, |_| true))
    }

    async fn update_fields(&self, id: i32, patch: ReservationPatch) -> DomainResult<Reservation> {
        let _guard = self.0.write()?;
        if let Some(listing_id) = patch.listing_id {
            self.0.ensure_listing(listing_id)?;
        }
        let mut current = self
            .0
            .reservations
            .get_mut(&id)
            .ok_or_else(|| not_found("Reservation", id))?;
        let next = patch.merged(&current, Utc::now())?;
        *current = next.clone();
        Ok(next)
    }

    async fn delete_by_id(&self, id: i32) -> DomainResult<u64> {
        let _guard = self.0.write()?;
        self.0
            .reservations
            .remove(&id)
            .map(|_| 1)
            .ok_or_else(|| not_found("Reservation", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    async fn seeded() -> (InMemoryStorage, Property, Listing, Reservation) {
        let storage = InMemoryStorage::new();
        let property = storage
            .properties()
            .create(NewProperty {
                guest_limit: 4,
                bathrooms: 1,
                pets_allowed: false,
                cleaning_fee: Decimal::new(5000, 2),
                activation_date: date("2022-01-10"),
            })
            .await
            .unwrap();
        let listing = storage
            .listings()
            .create(NewListing {
                property_id: property.id,
                platform: "airbnb".into(),
                platform_fee: Decimal::new(1250, 2),
            })
            .await
            .unwrap();
        let reservation = storage
            .reservations()
            .create(NewReservation {
                listing_id: listing.id,
                checkin: date("2024-04-20"),
                checkout: date("2024-04-23"),
                total_price: Decimal::new(30000, 2),
                comment: String::new(),
                guest_count: 2,
            })
            .await
            .unwrap();
        (storage, property, listing, reservation)
    }

    #[tokio::test]
    async fn ids_are_sequential_per_table() {
        let (storage, property, listing, reservation) = seeded().await;
        assert_eq!((property.id, listing.id, reservation.id), (1, 1, 1));

        let second = storage
            .listings()
            .create(NewListing {
                property_id: property.id,
                platform: "booking".into(),
                platform_fee: Decimal::ZERO,
            })
            .await
            .unwrap();
        assert_eq!(second.id, 2);
    }

    #[tokio::test]
    async fn filter_skips_unknown_ids_and_orders_by_id() {
        let (storage, property, _, _) = seeded().await;
        storage
            .listings()
            .create(NewListing {
                property_id: property.id,
                platform: "vrbo".into(),
                platform_fee: Decimal::ONE,
            })
            .await
            .unwrap();

        let rows = storage.listings().filter_by_ids(&[2, 99, 1]).await.unwrap();
        let ids: Vec<i32> = rows.iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[tokio::test]
    async fn reservation_requires_existing_listing() {
        let storage = InMemoryStorage::new();
        let err = storage
            .reservations()
            .create(NewReservation {
                listing_id: 3,
                checkin: date("2024-04-20"),
                checkout: date("2024-04-21"),
                total_price: Decimal::ONE,
                comment: String::new(),
                guest_count: 1,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Constraint(_)));
    }

    #[tokio::test]
    async fn listing_update_checks_new_property() {
        let (storage, _, listing, _) = seeded().await;
        let err = storage
            .listings()
            .update_fields(
                listing.id,
                ListingPatch {
                    property_id: Some(50),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Constraint(_)));

        let unchanged = storage.listings().find_by_id(listing.id).await.unwrap().unwrap();
        assert_eq!(unchanged.property_id, listing.property_id);
    }

    #[tokio::test]
    async fn deleting_property_removes_dependents() {
        let (storage, property, _, _) = seeded().await;
        assert_eq!(storage.properties().delete_by_id(property.id).await.unwrap(), 3);
        assert!(storage.listings().get_all().await.unwrap().is_empty());
        assert!(storage.reservations().get_all().await.unwrap().is_empty());
        assert!(matches!(
            storage.properties().delete_by_id(property.id).await,
            Err(DomainError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn deleting_listing_keeps_its_property() {
        let (storage, property, listing, _) = seeded().await;
        assert_eq!(storage.listings().delete_by_id(listing.id).await.unwrap(), 2);
        assert!(storage.properties().find_by_id(property.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn inverted_reservation_update_leaves_row_untouched() {
        let (storage, _, _, reservation) = seeded().await;
        let err = storage
            .reservations()
            .update_fields(
                reservation.id,
                ReservationPatch {
                    checkin: Some(date("2024-05-01")),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err, DomainError::DateOrdering);

        let stored = storage
            .reservations()
            .find_by_id(reservation.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored, reservation);
    }
}
