//! Request field validation
//!
//! Stateless checks run on a raw JSON object before it is decoded into a
//! typed request schema: required fields, allow-lists, value types, date
//! format and check-in/check-out ordering.

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use validator::ValidationError;

use crate::shared::errors::{DomainError, DomainResult};

/// Wire format of every calendar date field.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Money columns are `DECIMAL(10, 2)`.
const MONEY_SCALE: u32 = 2;
const MONEY_INTEGER_DIGITS: u32 = 8;
const MONEY_BOUND: f64 = 1e8;
const MONEY_RANGE_MESSAGE: &str = "must be less than 100000000";

/// JSON type a request field must carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// Whole number. Booleans are never accepted.
    Int,
    Bool,
    /// Any JSON number (integers included), stored as a decimal.
    Decimal,
    Text,
    /// A string in `YYYY-MM-DD` form. Only the JSON type is checked here,
    /// see [`invalid_dates`] for the format.
    Date,
}

impl FieldType {
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            FieldType::Int => value.is_i64() || value.is_u64(),
            FieldType::Bool => value.is_boolean(),
            FieldType::Decimal => value.is_number(),
            FieldType::Text | FieldType::Date => value.is_string(),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Int => write!(f, "integer"),
            FieldType::Bool => write!(f, "boolean"),
            FieldType::Decimal => write!(f, "number"),
            FieldType::Text => write!(f, "string"),
            FieldType::Date => write!(f, "date string (YYYY-MM-DD)"),
        }
    }
}

/// A named request field and its expected type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldType,
}

impl FieldSpec {
    pub const fn new(name: &'static str, kind: FieldType) -> Self {
        Self { name, kind }
    }
}

/// Field names of a schema, in declaration order.
pub fn field_names(schema: &[FieldSpec]) -> Vec<&'static str> {
    schema.iter().map(|f| f.name).collect()
}

/// Required fields absent from `supplied`. Empty means all are present.
pub fn required_fields_missing<'a>(
    required: &BTreeSet<&'a str>,
    supplied: &BTreeSet<&str>,
) -> BTreeSet<&'a str> {
    required
        .iter()
        .filter(|name| !supplied.contains(*name))
        .copied()
        .collect()
}

/// Supplied fields that are not on the allow-list, in supplied order.
pub fn disallowed_fields<'a, I>(allowed: &BTreeSet<&str>, supplied: I) -> Vec<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    supplied
        .into_iter()
        .filter(|name| !allowed.contains(name))
        .collect()
}

/// One message per field present in both `expected` and `values` whose
/// JSON type does not match. Empty means every present value is well-typed.
pub fn type_mismatches(expected: &[FieldSpec], values: &Map<String, Value>) -> BTreeMap<String, String> {
    expected
        .iter()
        .filter_map(|field| {
            let value = values.get(field.name)?;
            if field.kind.accepts(value) {
                None
            } else {
                Some((
                    field.name.to_string(),
                    format!(
                        "Field '{}' must be of type {}, got {}",
                        field.name,
                        field.kind,
                        json_type_name(value)
                    ),
                ))
            }
        })
        .collect()
}

/// First date field whose string value is not a valid `YYYY-MM-DD` date.
pub fn invalid_dates(expected: &[FieldSpec], values: &Map<String, Value>) -> DomainResult<()> {
    for field in expected.iter().filter(|s| s.kind == FieldType::Date) {
        if let Some(Value::String(raw)) = values.get(field.name) {
            parse_date(raw).map_err(|_| DomainError::InvalidDate {
                field: field.name.to_string(),
                value: raw.clone(),
            })?;
        }
    }
    Ok(())
}

/// First numeric field whose value cannot be held by its column: integers
/// are 32-bit, decimals must stay below the money bound.
pub fn out_of_range_numbers(
    expected: &[FieldSpec],
    values: &Map<String, Value>,
) -> DomainResult<()> {
    for field in expected {
        let Some(value) = values.get(field.name) else {
            continue;
        };
        let message = match field.kind {
            FieldType::Int if value.as_i64().and_then(|n| i32::try_from(n).ok()).is_none() => {
                format!("must be between {} and {}", i32::MIN, i32::MAX)
            }
            FieldType::Decimal if value.as_f64().map_or(true, |n| n.abs() >= MONEY_BOUND) => {
                MONEY_RANGE_MESSAGE.to_string()
            }
            _ => continue,
        };
        return Err(DomainError::InvalidValue(format!("{}: {}", field.name, message)));
    }
    Ok(())
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
}

/// True when the stay is inverted, i.e. checkout falls before checkin.
/// Same-day checkout is valid.
pub fn checkin_after_checkout(checkin: NaiveDate, checkout: NaiveDate) -> bool {
    checkout < checkin
}

/// Parse the `id` query parameter of a get request.
///
/// `None` or an empty value means "no filter". Otherwise a single id or a
/// comma separated list of ids, optionally ending in one comma. Ids that
/// parse but lie outside the key range are dropped, so they match nothing.
pub fn parse_id_filter(param: Option<&str>) -> DomainResult<Option<Vec<i32>>> {
    let Some(raw) = param.map(str::trim).filter(|p| !p.is_empty()) else {
        return Ok(None);
    };
    let raw = raw.strip_suffix(',').unwrap_or(raw);

    let mut ids = Vec::new();
    for part in raw.split(',').map(str::trim) {
        let id = part
            .parse::<i64>()
            .map_err(|_| DomainError::MalformedId(part.to_string()))?;
        if let Ok(id) = i32::try_from(id) {
            ids.push(id);
        }
    }
    Ok(Some(ids))
}

/// Read the `id` member of a request body. Any JSON integer in the `i64`
/// range is well formed; narrowing to a key is up to the caller.
pub fn body_id(body: &Map<String, Value>) -> DomainResult<i64> {
    let value = body
        .get("id")
        .ok_or_else(|| DomainError::MissingFields(vec!["id".to_string()]))?;

    value
        .as_i64()
        .ok_or_else(|| DomainError::MalformedId(value.to_string()))
}

/// `validator` hook for amounts that must fit a `DECIMAL(10, 2)` column.
pub fn money(value: &Decimal) -> Result<(), ValidationError> {
    if value.normalize().scale() > MONEY_SCALE {
        return Err(validation_error(
            "money_scale",
            "must have at most 2 decimal places",
        ));
    }
    if value.abs().trunc() >= Decimal::from(10_i64.pow(MONEY_INTEGER_DIGITS)) {
        return Err(validation_error(
            "money_range",
            MONEY_RANGE_MESSAGE,
        ));
    }
    Ok(())
}

/// Same as [`money`], and the amount cannot be negative.
pub fn non_negative_money(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(validation_error("money_negative", "must not be negative"));
    }
    money(value)
}

fn validation_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

/// JSON type of `value` as named in mismatch messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SCHEMA: &[FieldSpec] = &[
        FieldSpec::new("limite_hospedes", FieldType::Int),
        FieldSpec::new("aceita_animais", FieldType::Bool),
        FieldSpec::new("valor_limpeza", FieldType::Decimal),
        FieldSpec::new("plataforma", FieldType::Text),
        FieldSpec::new("data_ativacao", FieldType::Date),
    ];

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected a JSON object"),
        }
    }

    #[test]
    fn missing_is_set_difference() {
        let required: BTreeSet<&str> = ["a", "b", "c"].into_iter().collect();
        let supplied: BTreeSet<&str> = ["b", "z"].into_iter().collect();
        let expected: BTreeSet<&str> = ["a", "c"].into_iter().collect();
        assert_eq!(required_fields_missing(&required, &supplied), expected);
    }

    #[test]
    fn nothing_missing_when_all_supplied() {
        let required: BTreeSet<&str> = ["a"].into_iter().collect();
        let supplied: BTreeSet<&str> = ["a", "extra"].into_iter().collect();
        assert!(required_fields_missing(&required, &supplied).is_empty());
    }

    #[test]
    fn disallowed_keeps_supplied_order() {
        let allowed: BTreeSet<&str> = ["plataforma"].into_iter().collect();
        let offenders = disallowed_fields(&allowed, ["zeta", "plataforma", "alpha"]);
        assert_eq!(offenders, vec!["zeta", "alpha"]);
    }

    #[test]
    fn well_typed_values_produce_no_mismatch() {
        let values = object(json!({
            "limite_hospedes": 6,
            "aceita_animais": true,
            "valor_limpeza": 10.05,
            "plataforma": "airbnb",
            "data_ativacao": "2020-12-21",
            "not_in_schema": [1, 2]
        }));
        assert!(type_mismatches(SCHEMA, &values).is_empty());
    }

    #[test]
    fn bool_and_int_are_distinct() {
        let values = object(json!({ "limite_hospedes": true, "aceita_animais": 1 }));
        let mismatches = type_mismatches(SCHEMA, &values);
        assert_eq!(mismatches.len(), 2);
        assert_eq!(
            mismatches["limite_hospedes"],
            "Field 'limite_hospedes' must be of type integer, got boolean"
        );
        assert_eq!(
            mismatches["aceita_animais"],
            "Field 'aceita_animais' must be of type boolean, got integer"
        );
    }

    #[test]
    fn int_field_rejects_floats_and_strings() {
        let values = object(json!({ "limite_hospedes": "4" }));
        assert!(type_mismatches(SCHEMA, &values).contains_key("limite_hospedes"));

        let values = object(json!({ "limite_hospedes": 4.5 }));
        assert!(type_mismatches(SCHEMA, &values).contains_key("limite_hospedes"));
    }

    #[test]
    fn decimal_field_accepts_integers_but_not_strings() {
        let values = object(json!({ "valor_limpeza": 25 }));
        assert!(type_mismatches(SCHEMA, &values).is_empty());

        let values = object(json!({ "valor_limpeza": "99.99" }));
        let mismatches = type_mismatches(SCHEMA, &values);
        assert_eq!(
            mismatches["valor_limpeza"],
            "Field 'valor_limpeza' must be of type number, got string"
        );
    }

    #[test]
    fn null_is_a_mismatch() {
        let values = object(json!({ "plataforma": null }));
        assert!(type_mismatches(SCHEMA, &values).contains_key("plataforma"));
    }

    #[test]
    fn malformed_date_is_reported_with_field() {
        let values = object(json!({ "data_ativacao": "21/12/2020" }));
        let err = invalid_dates(SCHEMA, &values).unwrap_err();
        assert_eq!(
            err,
            DomainError::InvalidDate {
                field: "data_ativacao".into(),
                value: "21/12/2020".into()
            }
        );
    }

    #[test]
    fn impossible_calendar_date_is_rejected() {
        assert!(parse_date("2024-02-30").is_err());
        assert!(parse_date("2024-02-29").is_ok());
    }

    #[test]
    fn checkout_before_checkin_is_invalid() {
        let checkin = parse_date("2024-04-20").unwrap();
        assert!(checkin_after_checkout(checkin, parse_date("2024-04-19").unwrap()));
        assert!(!checkin_after_checkout(checkin, parse_date("2024-04-20").unwrap()));
        assert!(!checkin_after_checkout(checkin, parse_date("2024-04-23").unwrap()));
    }

    #[test]
    fn id_filter_variants() {
        assert_eq!(parse_id_filter(None).unwrap(), None);
        assert_eq!(parse_id_filter(Some("")).unwrap(), None);
        assert_eq!(parse_id_filter(Some("7")).unwrap(), Some(vec![7]));
        assert_eq!(parse_id_filter(Some("1, 2,3")).unwrap(), Some(vec![1, 2, 3]));
    }

    #[test]
    fn non_numeric_id_filter_is_malformed() {
        assert_eq!(
            parse_id_filter(Some("1,abc")).unwrap_err(),
            DomainError::MalformedId("abc".into())
        );
        assert!(parse_id_filter(Some("1,,2")).is_err());
        assert!(parse_id_filter(Some(",")).is_err());
    }

    #[test]
    fn id_filter_allows_one_trailing_comma() {
        assert_eq!(parse_id_filter(Some("1,")).unwrap(), Some(vec![1]));
        assert_eq!(parse_id_filter(Some("1, 2 ,")).unwrap(), Some(vec![1, 2]));
    }

    #[test]
    fn out_of_range_ids_match_nothing() {
        assert_eq!(parse_id_filter(Some("99999999999")).unwrap(), Some(vec![]));
        assert_eq!(
            parse_id_filter(Some("4,99999999999")).unwrap(),
            Some(vec![4])
        );
    }

    #[test]
    fn numbers_past_their_column_are_invalid_values() {
        let schema = [
            FieldSpec::new("count", FieldType::Int),
            FieldSpec::new("fee", FieldType::Decimal),
        ];
        assert!(out_of_range_numbers(&schema, &object(json!({ "count": 5, "fee": 9.5 }))).is_ok());
        assert_eq!(
            out_of_range_numbers(&schema, &object(json!({ "count": 3_000_000_000_i64 }))).unwrap_err(),
            DomainError::InvalidValue("count: must be between -2147483648 and 2147483647".into())
        );
        assert_eq!(
            out_of_range_numbers(&schema, &object(json!({ "fee": 1e30 }))).unwrap_err(),
            DomainError::InvalidValue("fee: must be less than 100000000".into())
        );
    }

    #[test]
    fn money_allows_two_decimal_places() {
        assert!(money(&Decimal::new(1005, 2)).is_ok());
        assert!(money(&Decimal::new(10050, 3)).is_ok());
        assert!(money(&Decimal::new(10051, 3)).is_err());
    }

    #[test]
    fn money_rejects_amounts_past_eight_integer_digits() {
        assert!(money(&Decimal::new(9_999_999_999, 2)).is_ok());
        let err = money(&Decimal::from(100_000_000)).unwrap_err();
        assert_eq!(err.code, "money_range");
    }

    #[test]
    fn cleaning_fee_cannot_be_negative() {
        assert!(non_negative_money(&Decimal::ZERO).is_ok());
        let err = non_negative_money(&Decimal::new(-1, 2)).unwrap_err();
        assert_eq!(err.message.as_deref(), Some("must not be negative"));
    }

    #[test]
    fn body_id_requires_an_integer() {
        assert_eq!(body_id(&object(json!({ "id": 3 }))).unwrap(), 3);
        assert_eq!(
            body_id(&object(json!({ "id": 99_999_999_999_i64 }))).unwrap(),
            99_999_999_999
        );
        assert_eq!(
            body_id(&object(json!({ "ids": 3 }))).unwrap_err(),
            DomainError::MissingFields(vec!["id".into()])
        );
        assert!(matches!(
            body_id(&object(json!({ "id": "3" }))).unwrap_err(),
            DomainError::MalformedId(_)
        ));
        assert!(matches!(
            body_id(&object(json!({ "id": true }))).unwrap_err(),
            DomainError::MalformedId(_)
        ));
    }
}
