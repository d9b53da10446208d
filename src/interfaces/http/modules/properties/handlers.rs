//! Property REST API handlers

use axum::{
    extract::{Query, State},
    Json,
};
use tracing::info;

use super::dto::{
    AlterPropertyRequest, CreatePropertyRequest, PropertyDto, PropertyFieldsRequest,
    PROPERTY_FIELDS,
};
use crate::domain::{NewProperty, Property, PropertyPatch, RepositoryProvider};
use crate::interfaces::http::common::pipeline::{self, Alterable, Resource, StoreOf};
use crate::interfaces::http::common::{
    ApiError, AppState, DeletionResponse, ErrorResponse, IdFilter, IdRequest, JsonObject,
    MessageResponse,
};
use crate::shared::errors::DomainResult;
use crate::shared::validations::FieldSpec;

pub struct PropertyResource;

impl Resource for PropertyResource {
    type Record = Property;
    type New = NewProperty;
    type Patch = PropertyPatch;
    type CreateRequest = CreatePropertyRequest;

    const ENTITY: &'static str = "Property";
    const COLLECTION: &'static str = "property";
    const FIELDS: &'static [FieldSpec] = PROPERTY_FIELDS;

    fn store(repos: &dyn RepositoryProvider) -> StoreOf<'_, Self> {
        repos.properties()
    }

    fn into_new(request: CreatePropertyRequest) -> DomainResult<NewProperty> {
        Ok(request.into())
    }

    fn record_id(record: &Property) -> i32 {
        record.id
    }
}

impl Alterable for PropertyResource {
    type PatchRequest = PropertyFieldsRequest;

    const ALTERABLE: &'static [FieldSpec] = PROPERTY_FIELDS;

    fn into_patch(request: PropertyFieldsRequest) -> DomainResult<PropertyPatch> {
        Ok(request.into())
    }

    fn is_noop(patch: &PropertyPatch) -> bool {
        patch.is_empty()
    }
}

#[utoipa::path(
    post,
    path = "/api/imoveis/include_imovel",
    tag = "Properties",
    request_body = CreatePropertyRequest,
    responses(
        (status = 200, description = "Property created", body = MessageResponse),
        (status = 400, description = "Missing, mistyped or invalid fields", body = ErrorResponse)
    )
)]
pub async fn include_property(
    State(state): State<AppState>,
    JsonObject(body): JsonObject,
) -> Result<Json<MessageResponse>, ApiError> {
    let property = pipeline::add::<PropertyResource>(state.repos.as_ref(), body).await?;
    info!(property_id = property.id, "Property created");
    Ok(Json(pipeline::created::<PropertyResource>(&property)))
}

#[utoipa::path(
    get,
    path = "/api/imoveis/get_imoveis",
    tag = "Properties",
    params(IdFilter),
    responses(
        (status = 200, description = "Matching properties", body = Vec<PropertyDto>),
        (status = 400, description = "Malformed id", body = ErrorResponse),
        (status = 404, description = "No matching properties", body = ErrorResponse)
    )
)]
pub async fn get_properties(
    State(state): State<AppState>,
    Query(filter): Query<IdFilter>,
) -> Result<Json<Vec<PropertyDto>>, ApiError> {
    let properties =
        pipeline::get::<PropertyResource>(state.repos.as_ref(), filter.id.as_deref()).await?;
    Ok(Json(properties.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    delete,
    path = "/api/imoveis/del_imovel",
    tag = "Properties",
    request_body = IdRequest,
    responses(
        (status = 200, description = "Property and its listings deleted", body = DeletionResponse),
        (status = 400, description = "Missing or malformed id", body = ErrorResponse),
        (status = 404, description = "Property not found", body = ErrorResponse)
    )
)]
pub async fn delete_property(
    State(state): State<AppState>,
    JsonObject(body): JsonObject,
) -> Result<Json<DeletionResponse>, ApiError> {
    let (id, deleted_count) =
        pipeline::delete::<PropertyResource>(state.repos.as_ref(), body).await?;
    info!(property_id = id, deleted_count, "Property deleted");
    Ok(Json(DeletionResponse { id, deleted_count }))
}

#[utoipa::path(
    post,
    path = "/api/imoveis/alter_imovel",
    tag = "Properties",
    request_body = AlterPropertyRequest,
    responses(
        (status = 200, description = "Updated property", body = Vec<PropertyDto>),
        (status = 400, description = "Unknown id, disallowed or invalid fields", body = ErrorResponse)
    )
)]
pub async fn alter_property(
    State(state): State<AppState>,
    JsonObject(body): JsonObject,
) -> Result<Json<Vec<PropertyDto>>, ApiError> {
    let property = pipeline::alter::<PropertyResource>(state.repos.as_ref(), body)
        .await
        .map_err(ApiError::for_alter)?;
    info!(property_id = property.id, "Property updated");
    Ok(Json(vec![property.into()]))
}
