pub mod health;
pub mod listings;
pub mod properties;
pub mod request_id;
pub mod reservations;
