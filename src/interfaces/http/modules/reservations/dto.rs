//! Reservation DTOs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::domain::reservation::ensure_stay_order;
use crate::domain::{NewReservation, Reservation};
use crate::shared::errors::DomainResult;
use crate::shared::validations::{money, FieldSpec, FieldType};

pub const RESERVATION_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("cod_anuncio", FieldType::Int),
    FieldSpec::new("data_checkin", FieldType::Date),
    FieldSpec::new("data_checkout", FieldType::Date),
    FieldSpec::new("preco_total", FieldType::Decimal),
    FieldSpec::new("comentario", FieldType::Text),
    FieldSpec::new("numero_hospedes", FieldType::Int),
];

/// Reserva
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReservationDto {
    pub id: i32,
    /// Reservation token, assigned once at creation
    pub cod_reserva: Uuid,
    /// Id of the booked listing
    pub cod_anuncio: i32,
    pub data_checkin: NaiveDate,
    pub data_checkout: NaiveDate,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub preco_total: Decimal,
    pub comentario: String,
    pub numero_hospedes: i32,
    pub data_criacao: DateTime<Utc>,
    pub data_atualizacao: DateTime<Utc>,
}

impl From<Reservation> for ReservationDto {
    fn from(r: Reservation) -> Self {
        Self {
            id: r.id,
            cod_reserva: r.token,
            cod_anuncio: r.listing_id,
            data_checkin: r.checkin,
            data_checkout: r.checkout,
            preco_total: r.total_price,
            comentario: r.comment,
            numero_hospedes: r.guest_count,
            data_criacao: r.created_at,
            data_atualizacao: r.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateReservationRequest {
    #[schema(example = 1)]
    pub cod_anuncio: i32,
    #[schema(value_type = String, example = "2024-04-20")]
    pub data_checkin: NaiveDate,
    #[schema(value_type = String, example = "2024-04-23")]
    pub data_checkout: NaiveDate,
    #[serde(with = "rust_decimal::serde::float")]
    #[validate(custom(function = "money"))]
    #[schema(value_type = f64, example = 25.99)]
    pub preco_total: Decimal,
    /// May be empty
    #[schema(example = "note")]
    pub comentario: String,
    #[schema(example = 1)]
    pub numero_hospedes: i32,
}

impl CreateReservationRequest {
    pub fn into_new(self) -> DomainResult<NewReservation> {
        ensure_stay_order(self.data_checkin, self.data_checkout)?;
        Ok(NewReservation {
            listing_id: self.cod_anuncio,
            checkin: self.data_checkin,
            checkout: self.data_checkout,
            total_price: self.preco_total,
            comment: self.comentario,
            guest_count: self.numero_hospedes,
        })
    }
}
