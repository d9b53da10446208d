//! Reservation repository interface

use super::model::{NewReservation, Reservation, ReservationPatch};
use crate::domain::repositories::EntityStore;

/// `create` and `update_fields` reject stays whose checkout precedes the
/// checkin with `DateOrdering`, and unknown listings with `Constraint`.
pub type ReservationRepository =
    dyn EntityStore<Record = Reservation, New = NewReservation, Patch = ReservationPatch>;
