//! Domain layer
//!
//! Aggregates (`property`, `listing`, `reservation`) and the storage
//! capability they share.

pub mod listing;
pub mod property;
pub mod repositories;
pub mod reservation;

pub use listing::{Listing, ListingPatch, ListingRepository, NewListing};
pub use property::{NewProperty, Property, PropertyPatch, PropertyRepository};
pub use repositories::{EntityStore, RepositoryProvider};
pub use reservation::{NewReservation, Reservation, ReservationPatch, ReservationRepository};

pub use crate::shared::errors::{DomainError, DomainResult};
