//! Listing domain entity

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

#[derive(Debug, Clone, PartialEq)]
pub struct Listing {
    pub id: i32,
    /// Owning property
    pub property_id: i32,
    /// Platform name (e.g. "airbnb")
    pub platform: String,
    pub platform_fee: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewListing {
    pub property_id: i32,
    pub platform: String,
    pub platform_fee: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingPatch {
    pub property_id: Option<i32>,
    pub platform: Option<String>,
    pub platform_fee: Option<Decimal>,
}

impl Listing {
    pub fn from_new(id: i32, new: NewListing, now: DateTime<Utc>) -> Self {
        Self {
            id,
            property_id: new.property_id,
            platform: new.platform,
            platform_fee: new.platform_fee,
            created_at: now,
            updated_at: now,
        }
    }
}

impl ListingPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn apply_to(&self, listing: &mut Listing, now: DateTime<Utc>) {
        if let Some(v) = self.property_id {
            listing.property_id = v;
        }
        if let Some(v) = &self.platform {
            listing.platform = v.clone();
        }
        if let Some(v) = self.platform_fee {
            listing.platform_fee = v;
        }
        listing.updated_at = now;
    }
}
