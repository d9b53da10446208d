//! Reservation REST API handlers

use axum::{
    extract::{Query, State},
    Json,
};
use tracing::info;

use super::dto::{CreateReservationRequest, ReservationDto, RESERVATION_FIELDS};
use crate::domain::{NewReservation, RepositoryProvider, Reservation, ReservationPatch};
use crate::interfaces::http::common::pipeline::{self, Resource, StoreOf};
use crate::interfaces::http::common::{
    ApiError, AppState, DeletionResponse, ErrorResponse, IdFilter, IdRequest, JsonObject,
    MessageResponse,
};
use crate::shared::errors::DomainResult;
use crate::shared::validations::FieldSpec;

pub struct ReservationResource;

impl Resource for ReservationResource {
    type Record = Reservation;
    type New = NewReservation;
    type Patch = ReservationPatch;
    type CreateRequest = CreateReservationRequest;

    const ENTITY: &'static str = "Reservation";
    const COLLECTION: &'static str = "reservation";
    const FIELDS: &'static [FieldSpec] = RESERVATION_FIELDS;

    fn store(repos: &dyn RepositoryProvider) -> StoreOf<'_, Self> {
        repos.reservations()
    }

    fn into_new(request: CreateReservationRequest) -> DomainResult<NewReservation> {
        request.into_new()
    }

    fn record_id(record: &Reservation) -> i32 {
        record.id
    }
}

#[utoipa::path(
    post,
    path = "/api/reservas/include_reserva",
    tag = "Reservations",
    request_body = CreateReservationRequest,
    responses(
        (status = 200, description = "Reservation created", body = MessageResponse),
        (status = 400, description = "Invalid fields, inverted stay or unknown listing", body = ErrorResponse)
    )
)]
pub async fn include_reservation(
    State(state): State<AppState>,
    JsonObject(body): JsonObject,
) -> Result<Json<MessageResponse>, ApiError> {
    let reservation = pipeline::add::<ReservationResource>(state.repos.as_ref(), body).await?;
    info!(
        reservation_id = reservation.id,
        listing_id = reservation.listing_id,
        token = %reservation.token,
        "Reservation created"
    );
    Ok(Json(pipeline::created::<ReservationResource>(&reservation)))
}

#[utoipa::path(
    get,
    path = "/api/reservas/get_reservas",
    tag = "Reservations",
    params(IdFilter),
    responses(
        (status = 200, description = "Matching reservations", body = Vec<ReservationDto>),
        (status = 400, description = "Malformed id", body = ErrorResponse),
        (status = 404, description = "No matching reservations", body = ErrorResponse)
    )
)]
pub async fn get_reservations(
    State(state): State<AppState>,
    Query(filter): Query<IdFilter>,
) -> Result<Json<Vec<ReservationDto>>, ApiError> {
    let reservations =
        pipeline::get::<ReservationResource>(state.repos.as_ref(), filter.id.as_deref()).await?;
    Ok(Json(reservations.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    delete,
    path = "/api/reservas/del_reserva",
    tag = "Reservations",
    request_body = IdRequest,
    responses(
        (status = 200, description = "Reservation deleted", body = DeletionResponse),
        (status = 400, description = "Missing or malformed id", body = ErrorResponse),
        (status = 404, description = "Reservation not found", body = ErrorResponse)
    )
)]
pub async fn delete_reservation(
    State(state): State<AppState>,
    JsonObject(body): JsonObject,
) -> Result<Json<DeletionResponse>, ApiError> {
    let (id, deleted_count) =
        pipeline::delete::<ReservationResource>(state.repos.as_ref(), body).await?;
    info!(reservation_id = id, "Reservation deleted");
    Ok(Json(DeletionResponse { id, deleted_count }))
}
