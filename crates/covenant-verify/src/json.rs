//! JSON ↔ [`Value`] conversion (§6, "JSON-to-Value conversion rules").
//!
//! Test data and target-function boundaries both speak JSON; the
//! verifier speaks `Value`. Conversion the untyped way (regex sniffing
//! for UUIDs and timestamps, integer-vs-float by fractional part) is
//! what the boundary rules describe; where the checker already knows
//! the expected [`ResolvedType`] for a binding, [`from_json_typed`]
//! uses it to disambiguate shapes the untyped rules cannot (`Decimal`
//! vs `Float`, `Bytes` vs `String`, an `Entity`/`Struct` vs a bare
//! `Record`).

use std::str::FromStr;
use std::sync::LazyLock;

use covenant_sem::ResolvedType;
use indexmap::IndexMap;
use regex::Regex;
use rust_decimal::Decimal;

use crate::value::Value;

static UUID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$").unwrap()
});

static TIMESTAMP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}").unwrap());

/// Convert one JSON value using only the shape-sniffing rules: a
/// string is a `UUID` or `Timestamp` if it matches the relevant regex,
/// otherwise a plain `String`; a number is `Int` if it carries no
/// fractional part, otherwise `Float`; objects become `Record{type:
/// "Object", ...}`; `null` becomes `Option(None)`.
pub fn from_json(json: &serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Option(None),
        serde_json::Value::Bool(b) => Value::Boolean(*b),
        serde_json::Value::Number(n) => number_to_value(n),
        serde_json::Value::String(s) => string_to_value(s),
        serde_json::Value::Array(items) => Value::List(items.iter().map(from_json).collect()),
        serde_json::Value::Object(map) => {
            if let Some(result) = result_envelope(map, from_json) {
                return result;
            }
            let mut fields = IndexMap::new();
            for (k, v) in map {
                fields.insert(k.clone(), from_json(v));
            }
            Value::Record { type_name: "Object".to_string(), fields }
        }
    }
}

/// Recognizes a target's fallible-outcome envelope, `{success, result?,
/// error?}` (the shape [`to_json`] produces for a [`Value::Result`]), so
/// a target's raw JSON return value round-trips into one instead of a
/// generic `Record` (§8, scenario 4: "a target returning
/// `{success:false, error:{code:...}}`").
fn result_envelope(map: &serde_json::Map<String, serde_json::Value>, convert: impl Fn(&serde_json::Value) -> Value) -> Option<Value> {
    let success = map.get("success")?.as_bool()?;
    let value = map.get("result").map(|v| Box::new(convert(v)));
    let error = map.get("error").map(|v| Box::new(from_json(v)));
    Some(Value::Result { success, value, error })
}

fn number_to_value(n: &serde_json::Number) -> Value {
    if let Some(i) = n.as_i64() {
        Value::Int(i as i128)
    } else if let Some(u) = n.as_u64() {
        Value::Int(u as i128)
    } else {
        Value::Float(n.as_f64().unwrap_or(0.0))
    }
}

fn string_to_value(s: &str) -> Value {
    if UUID_RE.is_match(s) {
        if let Ok(uuid) = uuid::Uuid::parse_str(s) {
            return Value::Uuid(uuid);
        }
    }
    if TIMESTAMP_RE.is_match(s) {
        if let Ok(ts) = chrono::DateTime::parse_from_rfc3339(s) {
            return Value::Timestamp(ts.with_timezone(&chrono::Utc));
        }
    }
    Value::String(s.to_string())
}

/// Convert one JSON value the way [`from_json`] does, except that a
/// string is never promoted to `UUID`/`Timestamp` no matter how it
/// looks. §9's "Open question: allow the caller to suppress promotion
/// per field via a schema hint" resolves to this: a caller that knows a
/// field is conventionally UUID-shaped *text* (not a `UUID` value) uses
/// this instead of [`from_json`] for that field.
pub fn from_json_no_promote(json: &serde_json::Value) -> Value {
    match json {
        serde_json::Value::String(s) => Value::String(s.clone()),
        serde_json::Value::Array(items) => Value::List(items.iter().map(from_json_no_promote).collect()),
        serde_json::Value::Object(map) => {
            let mut fields = IndexMap::new();
            for (k, v) in map {
                fields.insert(k.clone(), from_json_no_promote(v));
            }
            Value::Record { type_name: "Object".to_string(), fields }
        }
        other => from_json(other),
    }
}

/// Convert one JSON value the way [`from_json`] does, except where
/// `expected` names a shape the untyped rules cannot reach on their
/// own.
pub fn from_json_typed(json: &serde_json::Value, expected: &ResolvedType) -> Value {
    if let serde_json::Value::Object(map) = json {
        if let Some(result) = result_envelope(map, |v| from_json_typed(v, expected)) {
            return result;
        }
    }
    match (json, expected) {
        (serde_json::Value::Number(n), ResolvedType::Decimal) => {
            Decimal::from_str(&n.to_string()).map(Value::Decimal).unwrap_or_else(|_| number_to_value(n))
        }
        (serde_json::Value::String(s), ResolvedType::Decimal) => {
            Decimal::from_str(s).map(Value::Decimal).unwrap_or_else(|_| Value::String(s.clone()))
        }
        (serde_json::Value::String(s), ResolvedType::Struct(..) | ResolvedType::Entity(..)) => {
            // Bytes are conventionally transmitted as base64 inside a
            // field the checker already knows is byte-shaped; absent a
            // dedicated `Bytes` ResolvedType variant we fall back to
            // the untyped string rule, since nothing in the resolved
            // type set distinguishes a byte string from text.
            string_to_value(s)
        }
        (serde_json::Value::Null, ResolvedType::Optional(_)) => Value::Option(None),
        (other, ResolvedType::Optional(inner)) => {
            let converted = from_json_typed(other, inner);
            match converted {
                Value::Option(_) => converted,
                value => Value::Option(Some(Box::new(value))),
            }
        }
        (serde_json::Value::Array(items), ResolvedType::List(element)) => {
            Value::List(items.iter().map(|item| from_json_typed(item, element)).collect())
        }
        (serde_json::Value::Object(map), ResolvedType::Map(_, value_ty)) => {
            let mut out = IndexMap::new();
            for (k, v) in map {
                out.insert(k.clone(), from_json_typed(v, value_ty));
            }
            Value::Map(out)
        }
        (serde_json::Value::Object(map), ResolvedType::Struct(name, _) | ResolvedType::Entity(name, _)) => {
            let mut fields = IndexMap::new();
            for (k, v) in map {
                fields.insert(k.clone(), from_json(v));
            }
            Value::Record { type_name: name.as_str().to_string(), fields }
        }
        _ => from_json(json),
    }
}

/// The inverse conversion, used to report `actual`/`expected` values
/// and to hand arguments back across a target-function boundary.
pub fn to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Unit => serde_json::Value::Null,
        Value::Boolean(b) => serde_json::Value::Bool(*b),
        Value::Int(i) => serde_json::Value::Number((*i as i64).into()),
        Value::Float(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::Decimal(d) => serde_json::Value::String(d.to_string()),
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::Bytes(bytes) => serde_json::Value::Array(
            bytes.iter().map(|b| serde_json::Value::Number((*b as i64).into())).collect(),
        ),
        Value::Timestamp(ts) => serde_json::Value::String(ts.to_rfc3339()),
        Value::Duration { value, unit } => {
            let mut map = serde_json::Map::new();
            map.insert("value".to_string(), serde_json::Value::String(value.to_string()));
            map.insert("unit".to_string(), serde_json::Value::String(unit.clone()));
            serde_json::Value::Object(map)
        }
        Value::Uuid(u) => serde_json::Value::String(u.to_string()),
        Value::List(items) => serde_json::Value::Array(items.iter().map(to_json).collect()),
        Value::Map(entries) => {
            let mut map = serde_json::Map::new();
            for (k, v) in entries {
                map.insert(k.clone(), to_json(v));
            }
            serde_json::Value::Object(map)
        }
        Value::Set(items) => serde_json::Value::Array(items.iter().map(to_json).collect()),
        Value::Option(inner) => inner.as_ref().map(|v| to_json(v)).unwrap_or(serde_json::Value::Null),
        Value::Result { success, value, error } => {
            let mut map = serde_json::Map::new();
            map.insert("success".to_string(), serde_json::Value::Bool(*success));
            if let Some(v) = value {
                map.insert("result".to_string(), to_json(v));
            }
            if let Some(e) = error {
                map.insert("error".to_string(), to_json(e));
            }
            serde_json::Value::Object(map)
        }
        Value::Record { fields, .. } => {
            let mut map = serde_json::Map::new();
            for (k, v) in fields {
                map.insert(k.clone(), to_json(v));
            }
            serde_json::Value::Object(map)
        }
        Value::Entity { fields, .. } => {
            let mut map = serde_json::Map::new();
            for (k, v) in fields {
                map.insert(k.clone(), to_json(v));
            }
            serde_json::Value::Object(map)
        }
        Value::Enum { variant, data, .. } => {
            let mut map = serde_json::Map::new();
            map.insert("variant".to_string(), serde_json::Value::String(variant.clone()));
            if let Some(d) = data {
                map.insert("data".to_string(), to_json(d));
            }
            serde_json::Value::Object(map)
        }
        Value::Native(name) => serde_json::Value::String(format!("<native {name}>")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_integer_number_becomes_int() {
        assert!(matches!(from_json(&json!(5)), Value::Int(5)));
    }

    #[test]
    fn test_fractional_number_becomes_float() {
        assert!(matches!(from_json(&json!(5.5)), Value::Float(_)));
    }

    #[test]
    fn test_uuid_string_becomes_uuid() {
        let value = from_json(&json!("550e8400-e29b-41d4-a716-446655440000"));
        assert!(matches!(value, Value::Uuid(_)));
    }

    #[test]
    fn test_iso_timestamp_string_becomes_timestamp() {
        let value = from_json(&json!("2024-01-15T10:30:00Z"));
        assert!(matches!(value, Value::Timestamp(_)));
    }

    #[test]
    fn test_plain_string_stays_string() {
        assert!(matches!(from_json(&json!("hello")), Value::String(_)));
    }

    #[test]
    fn test_array_becomes_list() {
        let value = from_json(&json!([1, 2, 3]));
        match value {
            Value::List(items) => assert_eq!(items.len(), 3),
            _ => panic!("expected List"),
        }
    }

    #[test]
    fn test_object_becomes_record_of_type_object() {
        let value = from_json(&json!({"a": 1}));
        match value {
            Value::Record { type_name, fields } => {
                assert_eq!(type_name, "Object");
                assert_eq!(fields.get("a"), Some(&Value::Int(1)));
            }
            _ => panic!("expected Record"),
        }
    }

    #[test]
    fn test_null_becomes_empty_option() {
        assert_eq!(from_json(&json!(null)), Value::Option(None));
    }

    #[test]
    fn test_success_false_with_error_becomes_result_value() {
        let value = from_json(&json!({"success": false, "error": {"code": "CARD_DECLINED"}}));
        match value {
            Value::Result { success, value, error } => {
                assert!(!success);
                assert!(value.is_none());
                match error.as_deref() {
                    Some(Value::Record { fields, .. }) => {
                        assert_eq!(fields.get("code"), Some(&Value::String("CARD_DECLINED".to_string())));
                    }
                    other => panic!("expected error record, got {other:?}"),
                }
            }
            other => panic!("expected Result, got {other:?}"),
        }
    }

    #[test]
    fn test_no_promote_keeps_uuid_shaped_string_as_string() {
        let value = from_json_no_promote(&json!("550e8400-e29b-41d4-a716-446655440000"));
        assert_eq!(value, Value::String("550e8400-e29b-41d4-a716-446655440000".to_string()));
    }

    #[test]
    fn test_round_trip_list_of_ints() {
        let original = json!([1, 2, 3]);
        let value = from_json(&original);
        assert_eq!(to_json(&value), original);
    }
}
