//! Property repository interface

use super::model::{NewProperty, Property, PropertyPatch};
use crate::domain::repositories::EntityStore;

/// Deleting a property also deletes its listings and their reservations.
pub type PropertyRepository =
    dyn EntityStore<Record = Property, New = NewProperty, Patch = PropertyPatch>;
