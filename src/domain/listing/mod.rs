//! Listing aggregate
//!
//! A property's presence on a rental platform.

pub mod model;
pub mod repository;

pub use model::{Listing, ListingPatch, NewListing};
pub use repository::ListingRepository;
