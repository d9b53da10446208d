//! Listing DTOs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::{Listing, ListingPatch, NewListing};
use crate::shared::validations::{money, FieldSpec, FieldType};

/// Fields of an add body; also the alter allow-list.
pub const LISTING_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("cod_imovel", FieldType::Int),
    FieldSpec::new("plataforma", FieldType::Text),
    FieldSpec::new("taxa_plataforma", FieldType::Decimal),
];

/// Anúncio
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ListingDto {
    pub id: i32,
    /// Id of the listed property
    pub cod_imovel: i32,
    pub plataforma: String,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub taxa_plataforma: Decimal,
    pub data_criacao: DateTime<Utc>,
    pub data_atualizacao: DateTime<Utc>,
}

impl From<Listing> for ListingDto {
    fn from(l: Listing) -> Self {
        Self {
            id: l.id,
            cod_imovel: l.property_id,
            plataforma: l.platform,
            taxa_plataforma: l.platform_fee,
            data_criacao: l.created_at,
            data_atualizacao: l.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateListingRequest {
    #[schema(example = 1)]
    pub cod_imovel: i32,
    #[validate(length(min = 1, max = 100, message = "must be 1 to 100 characters"))]
    #[schema(example = "airbnb")]
    pub plataforma: String,
    #[serde(with = "rust_decimal::serde::float")]
    #[validate(custom(function = "money"))]
    #[schema(value_type = f64, example = 99.99)]
    pub taxa_plataforma: Decimal,
}

impl From<CreateListingRequest> for NewListing {
    fn from(req: CreateListingRequest) -> Self {
        Self {
            property_id: req.cod_imovel,
            platform: req.plataforma,
            platform_fee: req.taxa_plataforma,
        }
    }
}

/// Members of `fields` in an alter body
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct ListingFieldsRequest {
    pub cod_imovel: Option<i32>,
    #[validate(length(min = 1, max = 100, message = "must be 1 to 100 characters"))]
    pub plataforma: Option<String>,
    #[serde(with = "rust_decimal::serde::float_option")]
    #[validate(custom(function = "money"))]
    #[schema(value_type = Option<f64>)]
    pub taxa_plataforma: Option<Decimal>,
}

impl From<ListingFieldsRequest> for ListingPatch {
    fn from(req: ListingFieldsRequest) -> Self {
        Self {
            property_id: req.cod_imovel,
            platform: req.plataforma,
            platform_fee: req.taxa_plataforma,
        }
    }
}

/// Alter body: `{"id": 1, "fields": {...}}`
#[derive(Debug, Deserialize, ToSchema)]
pub struct AlterListingRequest {
    pub id: i32,
    pub fields: ListingFieldsRequest,
}
