//! The runtime value model.
//!
//! A [`covenant_sem::ResolvedType`] names what *kind* of thing an
//! expression produces; a [`Value`] is one concrete instance of that
//! kind, produced by the evaluator and carried through `Bindings`. Kept
//! as one flat tagged union with exhaustive matching rather than a
//! trait-object hierarchy, matching the shape `ResolvedType` already
//! takes in `covenant-sem`.
//!
//! `Int` is represented as `i128` rather than a true arbitrary-precision
//! integer: the domain language has no literal or operation that
//! requires more range than that, and pulling in a bignum crate for
//! values that never occur would be dead weight.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use rust_decimal::Decimal;
use uuid::Uuid;

/// One runtime value.
#[derive(Debug, Clone)]
pub enum Value {
    Unit,
    Boolean(bool),
    Int(i128),
    Float(f64),
    Decimal(Decimal),
    String(String),
    Bytes(Vec<u8>),
    Timestamp(DateTime<Utc>),
    Duration { value: Decimal, unit: String },
    Uuid(Uuid),
    List(Vec<Value>),
    /// String-keyed, insertion-ordered.
    Map(IndexMap<String, Value>),
    /// Insertion-ordered; equality ignores order, membership is
    /// structural.
    Set(Vec<Value>),
    Option(Option<Box<Value>>),
    Result {
        success: bool,
        value: Option<Box<Value>>,
        error: Option<Box<Value>>,
    },
    Record {
        type_name: String,
        fields: IndexMap<String, Value>,
    },
    Entity {
        type_name: String,
        id: Box<Value>,
        fields: IndexMap<String, Value>,
        version: i64,
    },
    Enum {
        type_name: String,
        variant: String,
        data: Option<Box<Value>>,
    },
    /// An opaque callable, a built-in (`now`, `uuid`, `random`, ...) or
    /// a target function handle. Never compared for equality beyond
    /// name identity.
    Native(String),
}

impl Value {
    /// A short name for this value's shape, used in diagnostic and
    /// runtime-error messages (`expected=boolean, actual=<tag>`).
    pub fn type_tag(&self) -> &'static str {
        match self {
            Value::Unit => "unit",
            Value::Boolean(_) => "boolean",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Decimal(_) => "decimal",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::Timestamp(_) => "timestamp",
            Value::Duration { .. } => "duration",
            Value::Uuid(_) => "uuid",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Set(_) => "set",
            Value::Option(_) => "option",
            Value::Result { .. } => "result",
            Value::Record { .. } => "record",
            Value::Entity { .. } => "entity",
            Value::Enum { .. } => "enum",
            Value::Native(_) => "native",
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn is_truthy_option(&self) -> bool {
        !matches!(self, Value::Option(None))
    }

    /// Structural, recursive equality. `Unit` equals only `Unit`; `Set`
    /// and `Map` equality ignores insertion order; `Native` values are
    /// equal only by name, never by capability.
    pub fn equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Unit, Value::Unit) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Decimal(a), Value::Decimal(b)) => a == b,
            // Cross-numeric equality mirrors `ResolvedType::is_comparable_for_equality`.
            (Value::Int(a), Value::Decimal(b)) | (Value::Decimal(b), Value::Int(a)) => {
                Decimal::from(*a) == *b
            }
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            (Value::Timestamp(a), Value::Timestamp(b)) => a == b,
            (Value::Duration { value: v1, unit: u1 }, Value::Duration { value: v2, unit: u2 }) => {
                v1 == v2 && u1 == u2
            }
            (Value::Uuid(a), Value::Uuid(b)) => a == b,
            (Value::List(a), Value::List(b)) => {
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.equals(y))
            }
            (Value::Map(a), Value::Map(b)) => {
                a.len() == b.len()
                    && a.iter().all(|(k, v)| b.get(k).is_some_and(|other_v| v.equals(other_v)))
            }
            (Value::Set(a), Value::Set(b)) => {
                a.len() == b.len()
                    && a.iter().all(|x| b.iter().any(|y| x.equals(y)))
            }
            (Value::Option(a), Value::Option(b)) => match (a, b) {
                (None, None) => true,
                (Some(x), Some(y)) => x.equals(y),
                _ => false,
            },
            (
                Value::Result { success: s1, value: v1, error: e1 },
                Value::Result { success: s2, value: v2, error: e2 },
            ) => {
                s1 == s2
                    && option_box_equals(v1, v2)
                    && option_box_equals(e1, e2)
            }
            (
                Value::Record { type_name: t1, fields: f1 },
                Value::Record { type_name: t2, fields: f2 },
            ) => t1 == t2 && fields_equal(f1, f2),
            (
                Value::Entity { type_name: t1, id: id1, fields: f1, version: v1 },
                Value::Entity { type_name: t2, id: id2, fields: f2, version: v2 },
            ) => t1 == t2 && id1.equals(id2) && v1 == v2 && fields_equal(f1, f2),
            (
                Value::Enum { type_name: t1, variant: var1, data: d1 },
                Value::Enum { type_name: t2, variant: var2, data: d2 },
            ) => t1 == t2 && var1 == var2 && option_box_equals(d1, d2),
            (Value::Native(a), Value::Native(b)) => a == b,
            _ => false,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        self.equals(other)
    }
}

fn option_box_equals(a: &Option<Box<Value>>, b: &Option<Box<Value>>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(x), Some(y)) => x.equals(y),
        _ => false,
    }
}

fn fields_equal(a: &IndexMap<String, Value>, b: &IndexMap<String, Value>) -> bool {
    a.len() == b.len() && a.iter().all(|(k, v)| b.get(k).is_some_and(|other_v| v.equals(other_v)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_equals_only_unit() {
        assert!(Value::Unit.equals(&Value::Unit));
        assert!(!Value::Unit.equals(&Value::Boolean(false)));
    }

    #[test]
    fn test_clone_equals_original_for_every_shape() {
        let values = vec![
            Value::Unit,
            Value::Boolean(true),
            Value::Int(42),
            Value::Float(1.5),
            Value::String("hi".into()),
            Value::List(vec![Value::Int(1), Value::Int(2)]),
            Value::Option(Some(Box::new(Value::Int(3)))),
            Value::Option(None),
            Value::Set(vec![Value::Int(1), Value::Int(2)]),
        ];
        for v in values {
            assert!(v.clone().equals(&v));
        }
    }

    #[test]
    fn test_map_equality_ignores_insertion_order() {
        let mut a = IndexMap::new();
        a.insert("x".to_string(), Value::Int(1));
        a.insert("y".to_string(), Value::Int(2));
        let mut b = IndexMap::new();
        b.insert("y".to_string(), Value::Int(2));
        b.insert("x".to_string(), Value::Int(1));
        assert!(Value::Map(a).equals(&Value::Map(b)));
    }

    #[test]
    fn test_set_equality_ignores_insertion_order() {
        let a = Value::Set(vec![Value::Int(1), Value::Int(2)]);
        let b = Value::Set(vec![Value::Int(2), Value::Int(1)]);
        assert!(a.equals(&b));
    }

    #[test]
    fn test_int_and_decimal_cross_equality() {
        let a = Value::Int(5);
        let b = Value::Decimal(Decimal::from(5));
        assert!(a.equals(&b));
    }
}
