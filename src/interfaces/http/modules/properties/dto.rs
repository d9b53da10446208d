//! Property DTOs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::{NewProperty, Property, PropertyPatch};
use crate::shared::validations::{non_negative_money, FieldSpec, FieldType};

/// Fields of an add body; also the alter allow-list.
pub const PROPERTY_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("limite_hospedes", FieldType::Int),
    FieldSpec::new("quantidade_banheiros", FieldType::Int),
    FieldSpec::new("aceita_animais", FieldType::Bool),
    FieldSpec::new("valor_limpeza", FieldType::Decimal),
    FieldSpec::new("data_ativacao", FieldType::Date),
];

/// Imóvel
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PropertyDto {
    pub id: i32,
    pub limite_hospedes: i32,
    pub quantidade_banheiros: i32,
    pub aceita_animais: bool,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub valor_limpeza: Decimal,
    pub data_ativacao: NaiveDate,
    pub data_criacao: DateTime<Utc>,
    pub data_atualizacao: DateTime<Utc>,
}

impl From<Property> for PropertyDto {
    fn from(p: Property) -> Self {
        Self {
            id: p.id,
            limite_hospedes: p.guest_limit,
            quantidade_banheiros: p.bathrooms,
            aceita_animais: p.pets_allowed,
            valor_limpeza: p.cleaning_fee,
            data_ativacao: p.activation_date,
            data_criacao: p.created_at,
            data_atualizacao: p.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreatePropertyRequest {
    #[validate(range(min = 0, message = "must not be negative"))]
    #[schema(example = 6)]
    pub limite_hospedes: i32,
    #[validate(range(min = 0, message = "must not be negative"))]
    #[schema(example = 2)]
    pub quantidade_banheiros: i32,
    pub aceita_animais: bool,
    #[serde(with = "rust_decimal::serde::float")]
    #[validate(custom(function = "non_negative_money"))]
    #[schema(value_type = f64, example = 10.05)]
    pub valor_limpeza: Decimal,
    #[schema(value_type = String, example = "2020-12-21")]
    pub data_ativacao: NaiveDate,
}

impl From<CreatePropertyRequest> for NewProperty {
    fn from(req: CreatePropertyRequest) -> Self {
        Self {
            guest_limit: req.limite_hospedes,
            bathrooms: req.quantidade_banheiros,
            pets_allowed: req.aceita_animais,
            cleaning_fee: req.valor_limpeza,
            activation_date: req.data_ativacao,
        }
    }
}

/// Members of `fields` in an alter body
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct PropertyFieldsRequest {
    #[validate(range(min = 0, message = "must not be negative"))]
    pub limite_hospedes: Option<i32>,
    #[validate(range(min = 0, message = "must not be negative"))]
    pub quantidade_banheiros: Option<i32>,
    pub aceita_animais: Option<bool>,
    #[serde(with = "rust_decimal::serde::float_option")]
    #[validate(custom(function = "non_negative_money"))]
    #[schema(value_type = Option<f64>)]
    pub valor_limpeza: Option<Decimal>,
    #[schema(value_type = Option<String>)]
    pub data_ativacao: Option<NaiveDate>,
}

impl From<PropertyFieldsRequest> for PropertyPatch {
    fn from(req: PropertyFieldsRequest) -> Self {
        Self {
            guest_limit: req.limite_hospedes,
            bathrooms: req.quantidade_banheiros,
            pets_allowed: req.aceita_animais,
            cleaning_fee: req.valor_limpeza,
            activation_date: req.data_ativacao,
        }
    }
}

/// Alter body: `{"id": 1, "fields": {...}}`
#[derive(Debug, Deserialize, ToSchema)]
pub struct AlterPropertyRequest {
    pub id: i32,
    pub fields: PropertyFieldsRequest,
}

