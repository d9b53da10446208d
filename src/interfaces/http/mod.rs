//! HTTP REST API interfaces
//!
//! - `common`: response envelopes, error mapping, request pipeline
//! - `modules`: per-resource DTOs and handlers, health, request id
//! - `router`: API router with OpenAPI documentation

pub mod common;
pub mod modules;
pub mod router;

pub use router::{create_api_router, ApiDoc, OPENAPI_PATH};
