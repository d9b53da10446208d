//! Reservation aggregate
//!
//! A booked stay against a listing for a date range.

pub mod model;
pub mod repository;

pub use model::{ensure_stay_order, NewReservation, Reservation, ReservationPatch};
pub use repository::ReservationRepository;
