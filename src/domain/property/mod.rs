//! Property aggregate
//!
//! A rentable unit with its capacity, amenities and cleaning fee.

pub mod model;
pub mod repository;

pub use model::{NewProperty, Property, PropertyPatch};
pub use repository::PropertyRepository;
