//! JSON object extractor for Axum
//!
//! `JsonObject` works like `axum::Json<Map<String, Value>>`: the body must be
//! a JSON object. Field presence and types are checked afterwards by the
//! request pipeline, so the raw map is kept as-is.

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::Json;
use serde_json::{Map, Value};

use super::ApiError;

pub struct JsonObject(pub Map<String, Value>);

impl<S> FromRequest<S> for JsonObject
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|rejection: JsonRejection| {
                ApiError::bad_request(format!("Invalid JSON: {}", rejection.body_text()))
            })?;

        match value {
            Value::Object(map) => Ok(JsonObject(map)),
            _ => Err(ApiError::bad_request("Request body must be a JSON object")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::routing::post;
    use axum::Router;
    use tower::ServiceExt;

    async fn handler(JsonObject(body): JsonObject) -> String {
        body.len().to_string()
    }

    async fn send(body: &'static str) -> StatusCode {
        let app = Router::new().route("/test", post(handler));
        let req = Request::builder()
            .method("POST")
            .uri("/test")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap();
        app.oneshot(req).await.unwrap().status()
    }

    #[tokio::test]
    async fn object_body_is_accepted() {
        assert_eq!(send(r#"{"id": 1}"#).await, StatusCode::OK);
    }

    #[tokio::test]
    async fn invalid_json_returns_400() {
        assert_eq!(send("not json").await, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn non_object_json_returns_400() {
        assert_eq!(send("[1, 2]").await, StatusCode::BAD_REQUEST);
    }
}
