//! Request pipeline shared by every resource
//!
//! Each operation rejects early, in a fixed order: field presence, JSON
//! value types, date format, typed-schema rules, entity rules, then the
//! store call. A request either fails before anything is written or is
//! persisted as a whole.

use std::collections::{BTreeMap, BTreeSet};

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use validator::Validate;

use super::MessageResponse;
use crate::domain::{EntityStore, RepositoryProvider};
use crate::shared::errors::{DomainError, DomainResult};
use crate::shared::validations::{
    body_id, disallowed_fields, field_names, invalid_dates, json_type_name, out_of_range_numbers,
    parse_id_filter, required_fields_missing, type_mismatches, FieldSpec,
};

/// Store accessor for a resource.
pub type StoreOf<'a, R> = &'a dyn EntityStore<
    Record = <R as Resource>::Record,
    New = <R as Resource>::New,
    Patch = <R as Resource>::Patch,
>;

/// A resource exposed through add / get / delete.
pub trait Resource: Sized + 'static {
    type Record: Send;
    type New: Send;
    type Patch: Send;
    /// Typed schema of the add body
    type CreateRequest: DeserializeOwned + Validate + Send;

    /// Name used in messages, e.g. `Property`
    const ENTITY: &'static str;
    /// Plural used in "no records" messages
    const COLLECTION: &'static str;
    /// Every field of the add body, all required
    const FIELDS: &'static [FieldSpec];

    fn store(repos: &dyn RepositoryProvider) -> StoreOf<'_, Self>;

    fn into_new(request: Self::CreateRequest) -> DomainResult<Self::New>;

    fn record_id(record: &Self::Record) -> i32;
}

/// A resource whose rows can be patched field by field.
pub trait Alterable: Resource {
    type PatchRequest: DeserializeOwned + Validate + Send;

    /// Fields an alter request may touch
    const ALTERABLE: &'static [FieldSpec];

    fn into_patch(request: Self::PatchRequest) -> DomainResult<Self::Patch>;

    fn is_noop(patch: &Self::Patch) -> bool;
}

pub async fn add<R: Resource>(
    repos: &dyn RepositoryProvider,
    body: Map<String, Value>,
) -> DomainResult<R::Record> {
    ensure_required(R::FIELDS, &body)?;

    let request: R::CreateRequest = decode(R::FIELDS, body)?;
    let new = R::into_new(request)?;
    R::store(repos).create(new).await
}

/// Rows matching the optional `id` filter. An empty result is an error whose
/// message depends on whether a filter was given.
pub async fn get<R: Resource>(
    repos: &dyn RepositoryProvider,
    id_param: Option<&str>,
) -> DomainResult<Vec<R::Record>> {
    let store = R::store(repos);
    match parse_id_filter(id_param)? {
        Some(ids) => {
            let rows = if ids.is_empty() {
                Vec::new()
            } else {
                store.filter_by_ids(&ids).await?
            };
            if rows.is_empty() {
                return Err(DomainError::NoMatchingRecords {
                    collection: R::COLLECTION,
                });
            }
            Ok(rows)
        }
        None => {
            let rows = store.get_all().await?;
            if rows.is_empty() {
                return Err(DomainError::NoRecords {
                    collection: R::COLLECTION,
                });
            }
            Ok(rows)
        }
    }
}

/// Patch the row named by `id` with the members of `fields`.
///
/// Every field is checked before anything is written. An empty `fields`
/// object writes nothing and returns the current row.
pub async fn alter<R: Alterable>(
    repos: &dyn RepositoryProvider,
    mut body: Map<String, Value>,
) -> DomainResult<R::Record> {
    let id = key_id::<R>(&body)?;
    let store = R::store(repos);

    let current = store.find_by_id(id).await?.ok_or(DomainError::NotFound {
        entity: R::ENTITY,
        id: id.into(),
    })?;

    let fields = match body.remove("fields") {
        Some(Value::Object(fields)) => fields,
        Some(other) => {
            let mut mismatch = BTreeMap::new();
            mismatch.insert(
                "fields".to_string(),
                format!("Field 'fields' must be of type object, got {}", json_type_name(&other)),
            );
            return Err(DomainError::TypeMismatch(mismatch));
        }
        None => return Err(DomainError::MissingFields(vec!["fields".to_string()])),
    };

    ensure_allowed(R::ENTITY, R::ALTERABLE, &fields)?;
    let request: R::PatchRequest = decode(R::ALTERABLE, fields)?;
    let patch = R::into_patch(request)?;
    if R::is_noop(&patch) {
        return Ok(current);
    }
    store.update_fields(id, patch).await
}

/// Delete the row named by `id`. Returns the id and the number of rows
/// removed, cascaded dependents included.
pub async fn delete<R: Resource>(
    repos: &dyn RepositoryProvider,
    body: Map<String, Value>,
) -> DomainResult<(i32, u64)> {
    let id = key_id::<R>(&body)?;
    let deleted = R::store(repos).delete_by_id(id).await?;
    Ok((id, deleted))
}

/// Acknowledgement returned by a successful add.
pub fn created<R: Resource>(record: &R::Record) -> MessageResponse {
    MessageResponse {
        message: format!("{} created successfully!", R::ENTITY),
        id: R::record_id(record),
    }
}

/// Body `id` narrowed to the key type. No row can carry an id outside it.
fn key_id<R: Resource>(body: &Map<String, Value>) -> DomainResult<i32> {
    let id = body_id(body)?;
    i32::try_from(id).map_err(|_| DomainError::NotFound {
        entity: R::ENTITY,
        id,
    })
}

fn ensure_required(schema: &[FieldSpec], body: &Map<String, Value>) -> DomainResult<()> {
    let required: BTreeSet<&str> = field_names(schema).into_iter().collect();
    let supplied: BTreeSet<&str> = body.keys().map(String::as_str).collect();

    let missing = required_fields_missing(&required, &supplied);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(DomainError::MissingFields(
            missing.into_iter().map(str::to_string).collect(),
        ))
    }
}

/// Any field outside the allow-list rejects the whole patch.
fn ensure_allowed(
    entity: &'static str,
    schema: &[FieldSpec],
    fields: &Map<String, Value>,
) -> DomainResult<()> {
    let allowed: BTreeSet<&str> = field_names(schema).into_iter().collect();
    let offenders = disallowed_fields(&allowed, fields.keys().map(String::as_str));
    if offenders.is_empty() {
        return Ok(());
    }
    Err(DomainError::DisallowedFields {
        entity,
        fields: offenders.into_iter().map(str::to_string).collect(),
        allowed: field_names(schema).into_iter().map(str::to_string).collect(),
    })
}

/// Type-check `values` against `schema`, then decode and validate them
/// into the typed request.
fn decode<T>(schema: &[FieldSpec], values: Map<String, Value>) -> DomainResult<T>
where
    T: DeserializeOwned + Validate,
{
    let mismatches = type_mismatches(schema, &values);
    if !mismatches.is_empty() {
        return Err(DomainError::TypeMismatch(mismatches));
    }
    invalid_dates(schema, &values)?;
    out_of_range_numbers(schema, &values)?;

    let request: T = serde_json::from_value(Value::Object(values))
        .map_err(|e| DomainError::InvalidValue(format!("Invalid request body: {e}")))?;
    request.validate()?;
    Ok(request)
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use serde_json::json;

    use super::*;
    use crate::domain::{NewProperty, Property};
    use crate::infrastructure::InMemoryStorage;
    use crate::interfaces::http::modules::listings::ListingResource;
    use crate::interfaces::http::modules::properties::PropertyResource;
    use crate::interfaces::http::modules::reservations::ReservationResource;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected a JSON object"),
        }
    }

    fn property() -> Map<String, Value> {
        object(json!({
            "limite_hospedes": 6,
            "quantidade_banheiros": 2,
            "aceita_animais": true,
            "valor_limpeza": 10.05,
            "data_ativacao": "2020-12-21"
        }))
    }

    async fn seeded() -> (InMemoryStorage, i32) {
        let repos = InMemoryStorage::new();
        let property = add::<PropertyResource>(&repos, property()).await.unwrap();
        let listing = add::<ListingResource>(
            &repos,
            object(json!({ "cod_imovel": property.id, "plataforma": "airbnb", "taxa_plataforma": 99.99 })),
        )
        .await
        .unwrap();
        (repos, listing.id)
    }

    #[tokio::test]
    async fn missing_fields_are_reported_as_a_set() {
        let repos = InMemoryStorage::new();
        let mut body = property();
        body.remove("aceita_animais");
        body.remove("data_ativacao");

        let err = add::<PropertyResource>(&repos, body).await.unwrap_err();
        let DomainError::MissingFields(fields) = err else {
            panic!("expected MissingFields, got {err:?}");
        };
        let fields: BTreeSet<String> = fields.into_iter().collect();
        let expected: BTreeSet<String> = ["aceita_animais", "data_ativacao"]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(fields, expected);
    }

    #[tokio::test]
    async fn booleans_never_stand_in_for_integers() {
        let repos = InMemoryStorage::new();
        let mut body = property();
        body.insert("quantidade_banheiros".into(), json!(false));

        let err = add::<PropertyResource>(&repos, body).await.unwrap_err();
        assert!(matches!(err, DomainError::TypeMismatch(m) if m.contains_key("quantidade_banheiros")));
        assert!(repos.properties().get_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn decimals_accept_json_integers() {
        let repos = InMemoryStorage::new();
        let mut body = property();
        body.insert("valor_limpeza".into(), json!(25));

        let created = add::<PropertyResource>(&repos, body).await.unwrap();
        assert_eq!(created.cleaning_fee, Decimal::from(25));
    }

    #[tokio::test]
    async fn range_and_scale_rules_are_client_errors() {
        let repos = InMemoryStorage::new();

        let mut body = property();
        body.insert("limite_hospedes".into(), json!(-1));
        let err = add::<PropertyResource>(&repos, body).await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidValue(ref m) if m.contains("limite_hospedes")));

        let mut body = property();
        body.insert("valor_limpeza".into(), json!(10.005));
        let err = add::<PropertyResource>(&repos, body).await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidValue(ref m) if m.contains("valor_limpeza")));
    }

    #[tokio::test]
    async fn integers_past_32_bits_name_their_field() {
        let repos = InMemoryStorage::new();
        let mut body = property();
        body.insert("limite_hospedes".into(), json!(3_000_000_000_i64));

        let err = add::<PropertyResource>(&repos, body).await.unwrap_err();
        assert_eq!(
            err,
            DomainError::InvalidValue(
                "limite_hospedes: must be between -2147483648 and 2147483647".into()
            )
        );
    }

    #[tokio::test]
    async fn reservation_accepts_zero_guests() {
        let (repos, listing_id) = seeded().await;
        let body = object(json!({
            "cod_anuncio": listing_id,
            "data_checkin": "2024-04-19",
            "data_checkout": "2024-04-20",
            "preco_total": 25.99,
            "comentario": "",
            "numero_hospedes": 0
        }));

        let created = add::<ReservationResource>(&repos, body).await.unwrap();
        assert_eq!(created.guest_count, 0);
    }

    #[tokio::test]
    async fn ids_past_the_key_range_are_not_found() {
        let (repos, _) = seeded().await;
        assert_eq!(
            get::<PropertyResource>(&repos, Some("99999999999")).await.unwrap_err(),
            DomainError::NoMatchingRecords {
                collection: "property"
            }
        );
        assert_eq!(
            delete::<PropertyResource>(&repos, object(json!({ "id": 99_999_999_999_i64 })))
                .await
                .unwrap_err(),
            DomainError::NotFound {
                entity: "Property",
                id: 99_999_999_999
            }
        );
    }

    #[tokio::test]
    async fn malformed_dates_are_client_errors() {
        let repos = InMemoryStorage::new();
        let mut body = property();
        body.insert("data_ativacao".into(), json!("2020-13-01"));

        let err = add::<PropertyResource>(&repos, body).await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidDate { ref field, .. } if field == "data_ativacao"));
    }

    #[tokio::test]
    async fn inverted_stay_is_rejected_before_the_store() {
        let (repos, listing_id) = seeded().await;
        let body = object(json!({
            "cod_anuncio": listing_id,
            "data_checkin": "2024-04-20",
            "data_checkout": "2024-04-19",
            "preco_total": 25.99,
            "comentario": "note",
            "numero_hospedes": 1
        }));

        let err = add::<ReservationResource>(&repos, body).await.unwrap_err();
        assert_eq!(err, DomainError::DateOrdering);
        assert!(repos.reservations().get_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn get_distinguishes_empty_table_from_unmatched_filter() {
        let repos = InMemoryStorage::new();
        assert_eq!(
            get::<ListingResource>(&repos, None).await.unwrap_err(),
            DomainError::NoRecords {
                collection: "listing"
            }
        );

        let (repos, listing_id) = seeded().await;
        assert_eq!(
            get::<ListingResource>(&repos, Some("999999")).await.unwrap_err(),
            DomainError::NoMatchingRecords {
                collection: "listing"
            }
        );

        let filter = format!("{listing_id},999999");
        let rows = get::<ListingResource>(&repos, Some(filter.as_str())).await.unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn alter_is_all_or_nothing() {
        let (repos, listing_id) = seeded().await;
        let body = object(json!({
            "id": listing_id,
            "fields": { "plataforma": "vrbo", "taxa_plataforma": "free" }
        }));

        let err = alter::<ListingResource>(&repos, body).await.unwrap_err();
        assert!(matches!(err, DomainError::TypeMismatch(_)));

        let stored = repos.listings().find_by_id(listing_id).await.unwrap().unwrap();
        assert_eq!(stored.platform, "airbnb");
    }

    #[tokio::test]
    async fn alter_reports_disallowed_fields_and_allowed_set() {
        let (repos, listing_id) = seeded().await;
        let body = object(json!({ "id": listing_id, "fields": { "campo_inexistente": "x" } }));

        let err = alter::<ListingResource>(&repos, body).await.unwrap_err();
        assert_eq!(
            err,
            DomainError::DisallowedFields {
                entity: "Listing",
                fields: vec!["campo_inexistente".into()],
                allowed: vec![
                    "cod_imovel".into(),
                    "plataforma".into(),
                    "taxa_plataforma".into()
                ],
            }
        );
    }

    #[tokio::test]
    async fn alter_with_no_fields_returns_current_row() {
        let (repos, listing_id) = seeded().await;
        let before = repos.listings().find_by_id(listing_id).await.unwrap().unwrap();

        let body = object(json!({ "id": listing_id, "fields": {} }));
        let after = alter::<ListingResource>(&repos, body).await.unwrap();
        assert_eq!(after, before);
    }

    #[tokio::test]
    async fn alter_requires_a_fields_object() {
        let (repos, listing_id) = seeded().await;

        let err = alter::<ListingResource>(&repos, object(json!({ "id": listing_id })))
            .await
            .unwrap_err();
        assert_eq!(err, DomainError::MissingFields(vec!["fields".into()]));

        let err = alter::<ListingResource>(&repos, object(json!({ "id": listing_id, "fields": [1] })))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::TypeMismatch(_)));
    }

    #[tokio::test]
    async fn alter_of_unknown_id_is_not_found() {
        let repos = InMemoryStorage::new();
        let body = object(json!({ "id": 3, "fields": { "limite_hospedes": 1 } }));
        let err = alter::<PropertyResource>(&repos, body).await.unwrap_err();
        assert_eq!(
            err,
            DomainError::NotFound {
                entity: "Property",
                id: 3
            }
        );
    }

    #[tokio::test]
    async fn delete_counts_cascaded_rows() {
        let (repos, listing_id) = seeded().await;
        let listing = repos.listings().find_by_id(listing_id).await.unwrap().unwrap();

        let (id, deleted) = delete::<PropertyResource>(&repos, object(json!({ "id": listing.property_id })))
            .await
            .unwrap();
        assert_eq!((id, deleted), (listing.property_id, 2));
    }

    #[test]
    fn created_ack_names_the_entity() {
        let property = Property::from_new(
            4,
            NewProperty {
                guest_limit: 1,
                bathrooms: 1,
                pets_allowed: false,
                cleaning_fee: Decimal::ZERO,
                activation_date: chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            },
            chrono::Utc::now(),
        );
        let ack = created::<PropertyResource>(&property);
        assert_eq!(ack.id, 4);
        assert_eq!(ack.message, "Property created successfully!");
    }
}
