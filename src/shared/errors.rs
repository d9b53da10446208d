use std::collections::BTreeMap;

use thiserror::Error;

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DomainError {
    #[error("The following required fields were not provided: {}", quoted(.0))]
    MissingFields(Vec<String>),

    #[error("Invalid field types: {}", joined(.0))]
    TypeMismatch(BTreeMap<String, String>),

    #[error(
        "Record not updated! The following fields do not exist on {entity}: {}. Allowed fields: {}",
        quoted(.fields),
        quoted(.allowed)
    )]
    DisallowedFields {
        entity: &'static str,
        fields: Vec<String>,
        allowed: Vec<String>,
    },

    #[error("The check-out date cannot be earlier than the check-in date")]
    DateOrdering,

    #[error("Field '{field}' is not a valid date (expected YYYY-MM-DD): {value}")]
    InvalidDate { field: String, value: String },

    #[error("{0}")]
    InvalidValue(String),

    #[error("There are no {collection} records saved")]
    NoRecords { collection: &'static str },

    #[error("There are no {collection} records with the given id(s)")]
    NoMatchingRecords { collection: &'static str },

    #[error("{entity} with id={id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("{0}")]
    Constraint(String),

    #[error("Invalid id: {0}")]
    MalformedId(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl DomainError {
    /// Internal faults, as opposed to anything the caller can fix.
    pub fn is_internal(&self) -> bool {
        matches!(self, DomainError::Database(_))
    }
}

impl From<sea_orm::DbErr> for DomainError {
    fn from(e: sea_orm::DbErr) -> Self {
        match e.sql_err() {
            Some(sea_orm::SqlErr::ForeignKeyConstraintViolation(msg)) => {
                DomainError::Constraint(format!("Foreign key violation: {}", msg))
            }
            Some(sea_orm::SqlErr::UniqueConstraintViolation(msg)) => {
                DomainError::Constraint(format!("Unique constraint violation: {}", msg))
            }
            _ => DomainError::Database(e.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for DomainError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| {
                    let msg = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string());
                    format!("{}: {}", field, msg)
                })
            })
            .collect();
        messages.sort();

        if messages.is_empty() {
            DomainError::InvalidValue("Validation failed".to_string())
        } else {
            DomainError::InvalidValue(messages.join("; "))
        }
    }
}

fn joined(mismatches: &BTreeMap<String, String>) -> String {
    mismatches.values().cloned().collect::<Vec<_>>().join("; ")
}

fn quoted(names: &[String]) -> String {
    names
        .iter()
        .map(|n| format!("'{}'", n))
        .collect::<Vec<_>>()
        .join(", ")
}
