//! SeaORM implementation of RepositoryProvider

use sea_orm::DatabaseConnection;

use crate::domain::listing::ListingRepository;
use crate::domain::property::PropertyRepository;
use crate::domain::repositories::RepositoryProvider;
use crate::domain::reservation::ReservationRepository;

use super::listing_repository::SeaOrmListingRepository;
use super::property_repository::SeaOrmPropertyRepository;
use super::reservation_repository::SeaOrmReservationRepository;

/// Unified repository provider backed by SeaORM.
///
/// Holds one connection pool and exposes per-aggregate repository accessors.
///
/// ```ignore
/// let repos = SeaOrmRepositoryProvider::new(db.clone());
/// let property = repos.properties().find_by_id(1).await?;
/// ```
pub struct SeaOrmRepositoryProvider {
    properties: SeaOrmPropertyRepository,
    listings: SeaOrmListingRepository,
    reservations: SeaOrmReservationRepository,
}

impl SeaOrmRepositoryProvider {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            properties: SeaOrmPropertyRepository::new(db.clone()),
            listings: SeaOrmListingRepository::new(db.clone()),
            reservations: SeaOrmReservationRepository::new(db),
        }
    }
}

impl RepositoryProvider for SeaOrmRepositoryProvider {
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
