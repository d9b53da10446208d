//! Reservation domain entity

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::shared::errors::{DomainError, DomainResult};
use crate::shared::validations::checkin_after_checkout;

#[derive(Debug, Clone, PartialEq)]
pub struct Reservation {
    pub id: i32,
    /// Public reservation code, assigned once at creation
    pub token: Uuid,
    pub listing_id: i32,
    pub checkin: NaiveDate,
    pub checkout: NaiveDate,
    pub total_price: Decimal,
    /// Free text, may be empty
    pub comment: String,
    pub guest_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewReservation {
    pub listing_id: i32,
    pub checkin: NaiveDate,
    pub checkout: NaiveDate,
    pub total_price: Decimal,
    pub comment: String,
    pub guest_count: i32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReservationPatch {
    pub listing_id: Option<i32>,
    pub checkin: Option<NaiveDate>,
    pub checkout: Option<NaiveDate>,
    pub total_price: Option<Decimal>,
    pub comment: Option<String>,
    pub guest_count: Option<i32>,
}

/// Reject a stay whose checkout date precedes its checkin date.
pub fn ensure_stay_order(checkin: NaiveDate, checkout: NaiveDate) -> DomainResult<()> {
    if checkin_after_checkout(checkin, checkout) {
        return Err(DomainError::DateOrdering);
    }
    Ok(())
}

impl NewReservation {
    pub fn ensure_valid(&self) -> DomainResult<()> {
        ensure_stay_order(self.checkin, self.checkout)
    }
}

impl Reservation {
    /// Build a stored reservation with a fresh token.
    pub fn from_new(id: i32, new: NewReservation, now: DateTime<Utc>) -> Self {
        Self {
            id,
            token: Uuid::new_v4(),
            listing_id: new.listing_id,
            checkin: new.checkin,
            checkout: new.checkout,
            total_price: new.total_price,
            comment: new.comment,
            guest_count: new.guest_count,
            created_at: now,
            updated_at: now,
        }
    }
}

impl ReservationPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Apply onto a copy of `current`, then check the resulting stay.
    /// `current` is untouched when the merged row is invalid.
    pub fn merged(&self, current: &Reservation, now: DateTime<Utc>) -> DomainResult<Reservation> {
        let mut next = current.clone();
        if let Some(v) = self.listing_id {
            next.listing_id = v;
        }
        if let Some(v) = self.checkin {
            next.checkin = v;
        }
        if let Some(v) = self.checkout {
            next.checkout = v;
        }
        if let Some(v) = self.total_price {
            next.total_price = v;
        }
        if let Some(v) = &self.comment {
            next.comment = v.clone();
        }
        if let Some(v) = self.guest_count {
            next.guest_count = v;
        }
        ensure_stay_order(next.checkin, next.checkout)?;
        next.updated_at = now;
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn new_reservation(checkin: NaiveDate, checkout: NaiveDate) -> NewReservation {
        NewReservation {
            listing_id: 1,
            checkin,
            checkout,
            total_price: Decimal::new(2599, 2),
            comment: "note".into(),
            guest_count: 1,
        }
    }

    #[test]
    fn checkout_before_checkin_is_rejected() {
        let r = new_reservation(date(2024, 4, 20), date(2024, 4, 19));
        assert_eq!(r.ensure_valid(), Err(DomainError::DateOrdering));
    }

    #[test]
    fn same_day_stay_is_accepted() {
        let r = new_reservation(date(2024, 4, 20), date(2024, 4, 20));
        assert!(r.ensure_valid().is_ok());
    }

    #[test]
    fn every_reservation_gets_its_own_token() {
        let now = Utc::now();
        let a = Reservation::from_new(1, new_reservation(date(2024, 4, 20), date(2024, 4, 23)), now);
        let b = Reservation::from_new(2, new_reservation(date(2024, 4, 20), date(2024, 4, 23)), now);
        assert_ne!(a.token, b.token);
    }

    #[test]
    fn merge_checks_against_current_dates() {
        let now = Utc::now();
        let current =
            Reservation::from_new(1, new_reservation(date(2024, 4, 20), date(2024, 4, 23)), now);

        let bad = ReservationPatch {
            checkout: Some(date(2024, 4, 18)),
            ..Default::default()
        };
        assert_eq!(bad.merged(&current, now), Err(DomainError::DateOrdering));

        let good = ReservationPatch {
            checkin: Some(date(2024, 4, 21)),
            comment: Some(String::new()),
            ..Default::default()
        };
        let next = good.merged(&current, now).unwrap();
        assert_eq!(next.checkin, date(2024, 4, 21));
        assert_eq!(next.comment, "");
        assert_eq!(next.token, current.token);
    }
}
