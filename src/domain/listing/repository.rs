//! Listing repository interface

use super::model::{Listing, ListingPatch, NewListing};
use crate::domain::repositories::EntityStore;

/// `create` and `update_fields` fail with `Constraint` when the referenced
/// property does not exist. Deleting a listing deletes its reservations.
pub type ListingRepository =
    dyn EntityStore<Record = Listing, New = NewListing, Patch = ListingPatch>;
