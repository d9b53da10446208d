//! Repository traits for the domain layer
//!
//! Contains:
//! - `EntityStore` — the capability set every aggregate store offers
//! - `RepositoryProvider` — unified access to the per-aggregate stores

use async_trait::async_trait;

use super::listing::ListingRepository;
use super::property::PropertyRepository;
use super::reservation::ReservationRepository;
use crate::shared::errors::DomainResult;

/// Create / filter / update / delete capability of one aggregate store.
///
/// Every mutation runs in a single transaction. Concurrent updates of the
/// same row are left to the database (last writer wins).
#[async_trait]
pub trait EntityStore: Send + Sync {
    type Record: Send;
    type New: Send;
    type Patch: Send;

    /// Insert a new row. Fails with `Constraint` when a required foreign
    /// key does not resolve.
    async fn create(&self, new: Self::New) -> DomainResult<Self::Record>;

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Self::Record>>;

    /// Rows whose id is in `ids`, ordered by id. Unknown ids are skipped.
    async fn filter_by_ids(&self, ids: &[i32]) -> DomainResult<Vec<Self::Record>>;

    async fn get_all(&self) -> DomainResult<Vec<Self::Record>>;

    /// Apply every field of `patch` or none of them, refresh the
    /// modification timestamp and return the stored row.
    async fn update_fields(&self, id: i32, patch: Self::Patch) -> DomainResult<Self::Record>;

    /// Delete the row and its dependents. Returns the number of rows removed.
    async fn delete_by_id(&self, id: i32) -> DomainResult<u64>;
}

/// Provides access to all domain repositories.
///
/// ```ignore
/// async fn handle(repos: &dyn RepositoryProvider) {
///     let property = repos.properties().find_by_id(1).await?;
///     let listings = repos.listings().filter_by_ids(&[1, 2]).await?;
/// }
/// ```
pub trait RepositoryProvider: Send + Sync {
    fn properties(&self) -> &PropertyRepository;
    fn listings(&self) -> &ListingRepository;
    fn reservations(&self) -> &ReservationRepository;
}
