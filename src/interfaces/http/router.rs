//! API Router with OpenAPI documentation

use std::sync::Arc;
use std::time::Instant;

use axum::{
    middleware,
    routing::{delete, get, post},
    Json, Router,
};
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::domain::RepositoryProvider;
use crate::interfaces::http::common::{
    AppState, DeletionResponse, ErrorDetail, ErrorResponse, IdRequest, MessageResponse,
};
use crate::interfaces::http::modules::health::{
    self, ComponentHealth, HealthResponse, HealthState, HealthStatus,
};
use crate::interfaces::http::modules::listings::{
    self, AlterListingRequest, CreateListingRequest, ListingDto, ListingFieldsRequest,
};
use crate::interfaces::http::modules::properties::{
    self, AlterPropertyRequest, CreatePropertyRequest, PropertyDto, PropertyFieldsRequest,
};
use crate::interfaces::http::modules::request_id::request_id_middleware;
use crate::interfaces::http::modules::reservations::{
    self, CreateReservationRequest, ReservationDto,
};

/// Path of the generated OpenAPI document
pub const OPENAPI_PATH: &str = "/api-docs/openapi.json";

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        // Health
        health::handlers::health_check,
        // Properties
        properties::handlers::include_property,
        properties::handlers::get_properties,
        properties::handlers::delete_property,
        properties::handlers::alter_property,
        // Listings
        listings::handlers::include_listing,
        listings::handlers::get_listings,
        listings::handlers::alter_listing,
        // Reservations
        reservations::handlers::include_reservation,
        reservations::handlers::get_reservations,
        reservations::handlers::delete_reservation,
    ),
    components(
        schemas(
            // Common
            ErrorResponse,
            ErrorDetail,
            MessageResponse,
            DeletionResponse,
            IdRequest,
            // Health
            HealthResponse,
            ComponentHealth,
            HealthStatus,
            // Properties
            PropertyDto,
            CreatePropertyRequest,
            PropertyFieldsRequest,
            AlterPropertyRequest,
            // Listings
            ListingDto,
            CreateListingRequest,
            ListingFieldsRequest,
            AlterListingRequest,
            // Reservations
            ReservationDto,
            CreateReservationRequest,
        )
    ),
    tags(
        (name = "Health", description = "Server health check endpoints"),
        (name = "Properties", description = "Rentable units (imóveis)"),
        (name = "Listings", description = "A property published on a rental platform (anúncios)"),
        (name = "Reservations", description = "Booked stays against a listing (reservas)"),
    ),
    info(
        title = "Rental Service API",
        version = "1.0.0",
        description = "REST API for properties, listings and reservations",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Create the API router with all routes
pub fn create_api_router(repos: Arc<dyn RepositoryProvider>, db: DatabaseConnection) -> Router {
    let state = AppState { repos };

    let property_routes = Router::new()
        .route("/include_imovel", post(properties::include_property))
        .route("/get_imoveis", get(properties::get_properties))
        .route("/del_imovel", delete(properties::delete_property))
        .route("/alter_imovel", post(properties::alter_property))
        .with_state(state.clone());

    let listing_routes = Router::new()
        .route("/include_anuncio", post(listings::include_listing))
        .route("/get_anuncios", get(listings::get_listings))
        .route("/alter_anuncio", post(listings::alter_listing))
        .with_state(state.clone());

    let reservation_routes = Router::new()
        .route("/include_reserva", post(reservations::include_reservation))
        .route("/get_reservas", get(reservations::get_reservations))
        .route("/del_reserva", delete(reservations::delete_reservation))
        .with_state(state);

    let health_routes = Router::new()
        .route("/health", get(health::health_check))
        .with_state(HealthState {
            db,
            started_at: Arc::new(Instant::now()),
        });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(OPENAPI_PATH, get(openapi_json))
        .merge(health_routes)
        .nest("/api/imoveis", property_routes)
        .nest("/api/anuncios", listing_routes)
        .nest("/api/reservas", reservation_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(request_id_middleware))
}
