//! Property domain entity

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub id: i32,
    /// Maximum number of guests
    pub guest_limit: i32,
    pub bathrooms: i32,
    pub pets_allowed: bool,
    pub cleaning_fee: Decimal,
    pub activation_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewProperty {
    pub guest_limit: i32,
    pub bathrooms: i32,
    pub pets_allowed: bool,
    pub cleaning_fee: Decimal,
    pub activation_date: NaiveDate,
}

/// Field-by-field change set. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyPatch {
    pub guest_limit: Option<i32>,
    pub bathrooms: Option<i32>,
    pub pets_allowed: Option<bool>,
    pub cleaning_fee: Option<Decimal>,
    pub activation_date: Option<NaiveDate>,
}

impl Property {
    pub fn from_new(id: i32, new: NewProperty, now: DateTime<Utc>) -> Self {
        Self {
            id,
            guest_limit: new.guest_limit,
            bathrooms: new.bathrooms,
            pets_allowed: new.pets_allowed,
            cleaning_fee: new.cleaning_fee,
            activation_date: new.activation_date,
            created_at: now,
            updated_at: now,
        }
    }
}

impl PropertyPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Copy every set field onto `property` and stamp `updated_at`.
    pub fn apply_to(&self, property: &mut Property, now: DateTime<Utc>) {
        if let Some(v) = self.guest_limit {
            property.guest_limit = v;
        }
        if let Some(v) = self.bathrooms {
            property.bathrooms = v;
        }
        if let Some(v) = self.pets_allowed {
            property.pets_allowed = v;
        }
        if let Some(v) = self.cleaning_fee {
            property.cleaning_fee = v;
        }
        if let Some(v) = self.activation_date {
            property.activation_date = v;
        }
        property.updated_at = now;
    }
}
