//! Database entities module

pub mod listing;
pub mod property;
pub mod reservation;

pub use listing::Entity as Listing;
pub use property::Entity as Property;
pub use reservation::Entity as Reservation;
