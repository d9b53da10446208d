//! Listing REST API handlers

use axum::{
    extract::{Query, State},
    Json,
};
use tracing::info;

use super::dto::{
    AlterListingRequest, CreateListingRequest, ListingDto, ListingFieldsRequest, LISTING_FIELDS,
};
use crate::domain::{Listing, ListingPatch, NewListing, RepositoryProvider};
use crate::interfaces::http::common::pipeline::{self, Alterable, Resource, StoreOf};
use crate::interfaces::http::common::{
    ApiError, AppState, ErrorResponse, IdFilter, JsonObject, MessageResponse,
};
use crate::shared::errors::DomainResult;
use crate::shared::validations::FieldSpec;

pub struct ListingResource;

impl Resource for ListingResource {
    type Record = Listing;
    type New = NewListing;
    type Patch = ListingPatch;
    type CreateRequest = CreateListingRequest;

    const ENTITY: &'static str = "Listing";
    const COLLECTION: &'static str = "listing";
    const FIELDS: &'static [FieldSpec] = LISTING_FIELDS;

    fn store(repos: &dyn RepositoryProvider) -> StoreOf<'_, Self> {
        repos.listings()
    }

    fn into_new(request: CreateListingRequest) -> DomainResult<NewListing> {
        Ok(request.into())
    }

    fn record_id(record: &Listing) -> i32 {
        record.id
    }
}

impl Alterable for ListingResource {
    type PatchRequest = ListingFieldsRequest;

    const ALTERABLE: &'static [FieldSpec] = LISTING_FIELDS;

    fn into_patch(request: ListingFieldsRequest) -> DomainResult<ListingPatch> {
        Ok(request.into())
    }

    fn is_noop(patch: &ListingPatch) -> bool {
        patch.is_empty()
    }
}

#[utoipa::path(
    post,
    path = "/api/anuncios/include_anuncio",
    tag = "Listings",
    request_body = CreateListingRequest,
    responses(
        (status = 200, description = "Listing created", body = MessageResponse),
        (status = 400, description = "Invalid fields or unknown property", body = ErrorResponse)
    )
)]
pub async fn include_listing(
    State(state): State<AppState>,
    JsonObject(body): JsonObject,
) -> Result<Json<MessageResponse>, ApiError> {
    let listing = pipeline::add::<ListingResource>(state.repos.as_ref(), body).await?;
    info!(
        listing_id = listing.id,
        property_id = listing.property_id,
        "Listing created"
    );
    Ok(Json(pipeline::created::<ListingResource>(&listing)))
}

#[utoipa::path(
    get,
    path = "/api/anuncios/get_anuncios",
    tag = "Listings",
    params(IdFilter),
    responses(
        (status = 200, description = "Matching listings", body = Vec<ListingDto>),
        (status = 400, description = "Malformed id", body = ErrorResponse),
        (status = 404, description = "No matching listings", body = ErrorResponse)
    )
)]
pub async fn get_listings(
    State(state): State<AppState>,
    Query(filter): Query<IdFilter>,
) -> Result<Json<Vec<ListingDto>>, ApiError> {
    let listings =
        pipeline::get::<ListingResource>(state.repos.as_ref(), filter.id.as_deref()).await?;
    Ok(Json(listings.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/api/anuncios/alter_anuncio",
    tag = "Listings",
    request_body = AlterListingRequest,
    responses(
        (status = 200, description = "Updated listing", body = Vec<ListingDto>),
        (status = 400, description = "Unknown id, disallowed or invalid fields", body = ErrorResponse)
    )
)]
pub async fn alter_listing(
    State(state): State<AppState>,
    JsonObject(body): JsonObject,
) -> Result<Json<Vec<ListingDto>>, ApiError> {
    let listing = pipeline::alter::<ListingResource>(state.repos.as_ref(), body)
        .await
        .map_err(ApiError::for_alter)?;
    info!(listing_id = listing.id, "Listing updated");
    Ok(Json(vec![listing.into()]))
}
