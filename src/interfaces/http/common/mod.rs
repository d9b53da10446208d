//! Response envelopes, error mapping and shared request plumbing

pub mod json_object;
pub mod pipeline;

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::{IntoParams, ToSchema};

use crate::domain::RepositoryProvider;
use crate::shared::errors::DomainError;

pub use json_object::JsonObject;

/// State shared by the resource handlers
#[derive(Clone)]
pub struct AppState {
    pub repos: Arc<dyn RepositoryProvider>,
}

/// `?id=1` or `?id=1,2,3`; absent or empty means every record.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct IdFilter {
    /// Single id or comma separated list of ids
    pub id: Option<String>,
}

/// Error payload: `{"error": "..."}` or `{"error": ["...", "..."]}`
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum ErrorDetail {
    Message(String),
    /// One entry per offending field
    List(Vec<String>),
}

/// Body of a delete request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct IdRequest {
    #[schema(example = 1)]
    pub id: i32,
}

/// Acknowledgement of a successful create
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
    /// Id of the created record
    pub id: i32,
}

/// Result of a delete
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeletionResponse {
    pub id: i32,
    /// Rows removed, cascaded dependents included
    pub deleted_count: u64,
}

/// An HTTP error response built from a [`DomainError`].
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: ErrorDetail,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            detail: ErrorDetail::Message(message.into()),
        }
    }

    /// Alter reports a missing target as a client error rather than 404.
    pub fn for_alter(err: DomainError) -> Self {
        match err {
            DomainError::NotFound { .. } => Self::bad_request(err.to_string()),
            other => other.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn detail(&self) -> &ErrorDetail {
        &self.detail
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        let status = match &err {
            e if e.is_internal() => StatusCode::INTERNAL_SERVER_ERROR,
            DomainError::NoRecords { .. }
            | DomainError::NoMatchingRecords { .. }
            | DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
            _ => StatusCode::BAD_REQUEST,
        };

        let detail = match err {
            DomainError::TypeMismatch(mismatches) => {
                ErrorDetail::List(mismatches.into_values().collect())
            }
            DomainError::Database(message) => {
                error!(error = %message, "Internal error while handling request");
                ErrorDetail::Message("Internal server error".to_string())
            }
            other => ErrorDetail::Message(other.to_string()),
        };

        Self { status, detail }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorResponse { error: self.detail })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn type_mismatches_become_a_list() {
        let mut mismatches = BTreeMap::new();
        mismatches.insert("a".to_string(), "Field 'a' is wrong".to_string());
        mismatches.insert("b".to_string(), "Field 'b' is wrong".to_string());

        let err = ApiError::from(DomainError::TypeMismatch(mismatches));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            err.detail(),
            &ErrorDetail::List(vec![
                "Field 'a' is wrong".to_string(),
                "Field 'b' is wrong".to_string()
            ])
        );
    }

    #[test]
    fn not_found_is_404_except_on_alter() {
        let missing = DomainError::NotFound {
            entity: "Property",
            id: 3,
        };
        assert_eq!(ApiError::from(missing.clone()).status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::for_alter(missing).status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::for_alter(DomainError::DateOrdering).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn database_faults_are_not_echoed() {
        let err = ApiError::from(DomainError::Database("disk I/O error".into()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            err.detail(),
            &ErrorDetail::Message("Internal server error".into())
        );
    }

    #[test]
    fn error_detail_serializes_untagged() {
        let body = ErrorResponse {
            error: ErrorDetail::Message("nope".into()),
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({ "error": "nope" })
        );
    }
}
