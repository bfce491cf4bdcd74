//! The resolved type system.
//!
//! A [`TypeNode`] from `covenant-ast` names a type the way the AST spells
//! it: a primitive name, a reference by qualified name, a structural shape.
//! A [`ResolvedType`] is what the type resolver turns that into: primitives
//! collapsed to a fixed set, references followed to the declaration they
//! name, structural shapes built from already-resolved components. Every
//! later phase (expression inference, contract verification) works only in
//! terms of `ResolvedType`.

use covenant_util::{DefId, Symbol};
use std::fmt;

/// A fully resolved type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedType {
    String,
    Int,
    Decimal,
    Boolean,
    Timestamp,
    Uuid,
    Duration,
    /// A named entity, referring back to its declaration.
    Entity(Symbol, DefId),
    /// A named enum, referring back to its declaration.
    Enum(Symbol, DefId),
    /// A named struct-shaped value type.
    Struct(Symbol, DefId),
    /// A named union (tagged sum) type.
    Union(Symbol, DefId),
    List(Box<ResolvedType>),
    Map(Box<ResolvedType>, Box<ResolvedType>),
    Optional(Box<ResolvedType>),
    /// A behavior's callable shape, referring back to its declaration.
    Function {
        params: Vec<ResolvedType>,
        returns: Box<ResolvedType>,
    },
    /// A named behavior, referring back to its declaration.
    Behavior(Symbol, DefId),
    /// The type of a statement or action that yields no usable value.
    Void,
    /// Not yet known: a declaration's placeholder before its body is
    /// resolved, or an identifier/type that failed to resolve but should
    /// not itself be treated as a resolver defect (e.g. `null`'s type
    /// before it is constrained by context).
    Unknown,
    /// Placeholder standing in for a type that failed to resolve, so that
    /// later checks do not cascade a single undefined-type error into many.
    Error,
}

impl ResolvedType {
    /// Whether this type stands in for a resolution that is missing or
    /// already failed, and so should not itself trigger a second
    /// diagnostic wherever it appears.
    pub fn is_absorbing(&self) -> bool {
        matches!(self, ResolvedType::Error | ResolvedType::Unknown)
    }

    /// Whether a value of `self` may be used wherever `target` is expected.
    ///
    /// Assignability is structural for `List`/`Map`/`Optional`, nominal for
    /// entities/enums/structs/unions/behaviors (identified by [`DefId`], not
    /// name), and widens `Int` to `Decimal`. `Error`/`Unknown` are
    /// assignable to and from everything so a single undefined-name or
    /// not-yet-resolved diagnostic does not cascade.
    pub fn is_assignable_to(&self, target: &ResolvedType) -> bool {
        if self.is_absorbing() || target.is_absorbing() {
            return true;
        }
        match (self, target) {
            (ResolvedType::Int, ResolvedType::Decimal) => true,
            (ResolvedType::Optional(inner), ResolvedType::Optional(target_inner)) => {
                inner.is_assignable_to(target_inner)
            }
            // A bare value is assignable to an optional of its type.
            (other, ResolvedType::Optional(target_inner)) => other.is_assignable_to(target_inner),
            (ResolvedType::List(elem), ResolvedType::List(target_elem)) => {
                elem.is_assignable_to(target_elem)
            }
            (ResolvedType::Map(k1, v1), ResolvedType::Map(k2, v2)) => {
                k1.is_assignable_to(k2) && v1.is_assignable_to(v2)
            }
            (ResolvedType::Entity(_, d1), ResolvedType::Entity(_, d2)) => d1 == d2,
            (ResolvedType::Enum(_, d1), ResolvedType::Enum(_, d2)) => d1 == d2,
            (ResolvedType::Struct(_, d1), ResolvedType::Struct(_, d2)) => d1 == d2,
            (ResolvedType::Union(_, d1), ResolvedType::Union(_, d2)) => d1 == d2,
            (ResolvedType::Behavior(_, d1), ResolvedType::Behavior(_, d2)) => d1 == d2,
            (ResolvedType::Function { params: p1, returns: r1 }, ResolvedType::Function { params: p2, returns: r2 }) => {
                p1.len() == p2.len() && p1.iter().zip(p2).all(|(a, b)| a.is_assignable_to(b)) && r1.is_assignable_to(r2)
            }
            (a, b) => a == b,
        }
    }

    /// Whether this type participates in arithmetic (`+`, `-`, `*`, `/`).
    pub fn is_numeric(&self) -> bool {
        matches!(self, ResolvedType::Int | ResolvedType::Decimal)
    }

    /// The wider of two numeric types, used to settle the result type of
    /// an arithmetic expression mixing `Int` and `Decimal` operands.
    pub fn widen_numeric(&self, other: &ResolvedType) -> Option<ResolvedType> {
        match (self, other) {
            (ResolvedType::Int, ResolvedType::Int) => Some(ResolvedType::Int),
            (ResolvedType::Decimal, ResolvedType::Decimal)
            | (ResolvedType::Int, ResolvedType::Decimal)
            | (ResolvedType::Decimal, ResolvedType::Int) => Some(ResolvedType::Decimal),
            _ => None,
        }
    }

    /// Whether equality (`==`, `!=`) is defined between two values of
    /// these types.
    pub fn is_comparable_for_equality(&self, other: &ResolvedType) -> bool {
        if self.is_absorbing() || other.is_absorbing() {
            return true;
        }
        self.is_numeric() && other.is_numeric() || self == other
    }

    /// Whether this is the element type a `List` quantifier/membership
    /// operation requires, i.e. whether `self` is a `List`.
    pub fn list_element(&self) -> Option<&ResolvedType> {
        match self {
            ResolvedType::List(elem) => Some(elem),
            _ => None,
        }
    }
}

impl fmt::Display for ResolvedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolvedType::String => write!(f, "String"),
            ResolvedType::Int => write!(f, "Int"),
            ResolvedType::Decimal => write!(f, "Decimal"),
            ResolvedType::Boolean => write!(f, "Boolean"),
            ResolvedType::Timestamp => write!(f, "Timestamp"),
            ResolvedType::Uuid => write!(f, "UUID"),
            ResolvedType::Duration => write!(f, "Duration"),
            ResolvedType::Entity(name, _) => write!(f, "{}", name.as_str()),
            ResolvedType::Enum(name, _) => write!(f, "{}", name.as_str()),
            ResolvedType::Struct(name, _) => write!(f, "{}", name.as_str()),
            ResolvedType::Union(name, _) => write!(f, "{}", name.as_str()),
            ResolvedType::List(elem) => write!(f, "List<{}>", elem),
            ResolvedType::Map(k, v) => write!(f, "Map<{}, {}>", k, v),
            ResolvedType::Optional(inner) => write!(f, "Optional<{}>", inner),
            ResolvedType::Function { params, returns } => {
                write!(f, "(")?;
                for (i, param) in params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", param)?;
                }
                write!(f, ") -> {}", returns)
            }
            ResolvedType::Behavior(name, _) => write!(f, "{}", name.as_str()),
            ResolvedType::Void => write!(f, "Void"),
            ResolvedType::Unknown => write!(f, "Unknown"),
            ResolvedType::Error => write!(f, "<error>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // === Assignability ===

    #[test]
    fn test_int_assignable_to_decimal() {
        assert!(ResolvedType::Int.is_assignable_to(&ResolvedType::Decimal));
        assert!(!ResolvedType::Decimal.is_assignable_to(&ResolvedType::Int));
    }

    #[test]
    fn test_bare_value_assignable_to_optional() {
        let opt_string = ResolvedType::Optional(Box::new(ResolvedType::String));
        assert!(ResolvedType::String.is_assignable_to(&opt_string));
    }

    #[test]
    fn test_error_assignable_to_anything() {
        assert!(ResolvedType::Error.is_assignable_to(&ResolvedType::Boolean));
        assert!(ResolvedType::Uuid.is_assignable_to(&ResolvedType::Error));
    }

    #[test]
    fn test_entities_assignable_only_by_shared_def_id() {
        let order_a = ResolvedType::Entity(Symbol::intern("Order"), DefId(1));
        let order_b = ResolvedType::Entity(Symbol::intern("Order"), DefId(1));
        let invoice = ResolvedType::Entity(Symbol::intern("Invoice"), DefId(2));
        assert!(order_a.is_assignable_to(&order_b));
        assert!(!order_a.is_assignable_to(&invoice));
    }

    #[test]
    fn test_list_assignability_is_structural_over_elements() {
        let ints = ResolvedType::List(Box::new(ResolvedType::Int));
        let decimals = ResolvedType::List(Box::new(ResolvedType::Decimal));
        assert!(ints.is_assignable_to(&decimals));
        assert!(!decimals.is_assignable_to(&ints));
    }

    #[test]
    fn test_unknown_assignable_to_anything_and_back() {
        assert!(ResolvedType::Unknown.is_assignable_to(&ResolvedType::Boolean));
        assert!(ResolvedType::Uuid.is_assignable_to(&ResolvedType::Unknown));
        assert!(ResolvedType::Unknown.is_comparable_for_equality(&ResolvedType::String));
    }

    #[test]
    fn test_behaviors_assignable_only_by_shared_def_id() {
        let refund_a = ResolvedType::Behavior(Symbol::intern("Refund"), DefId(3));
        let refund_b = ResolvedType::Behavior(Symbol::intern("Refund"), DefId(3));
        let capture = ResolvedType::Behavior(Symbol::intern("Capture"), DefId(4));
        assert!(refund_a.is_assignable_to(&refund_b));
        assert!(!refund_a.is_assignable_to(&capture));
    }

    #[test]
    fn test_function_assignability_is_structural_over_params_and_return() {
        let narrower = ResolvedType::Function { params: vec![ResolvedType::Int], returns: Box::new(ResolvedType::Int) };
        let wider = ResolvedType::Function { params: vec![ResolvedType::Decimal], returns: Box::new(ResolvedType::Decimal) };
        assert!(narrower.is_assignable_to(&wider));
        assert!(!wider.is_assignable_to(&narrower));
    }

    // === Numeric widening ===

    #[test]
    fn test_widen_numeric_prefers_decimal() {
        assert_eq!(
            ResolvedType::Int.widen_numeric(&ResolvedType::Decimal),
            Some(ResolvedType::Decimal)
        );
        assert_eq!(
            ResolvedType::Int.widen_numeric(&ResolvedType::Int),
            Some(ResolvedType::Int)
        );
    }

    #[test]
    fn test_widen_numeric_rejects_non_numeric() {
        assert_eq!(ResolvedType::Int.widen_numeric(&ResolvedType::String), None);
    }

    // === Display ===

    #[test]
    fn test_display_nested_generic_types() {
        let ty = ResolvedType::Map(Box::new(ResolvedType::String), Box::new(ResolvedType::List(Box::new(ResolvedType::Int))));
        assert_eq!(ty.to_string(), "Map<String, List<Int>>");
    }

    // === Property: assignability is reflexive over primitives ===

    #[derive(Clone, Debug)]
    struct Primitive(ResolvedType);

    impl quickcheck::Arbitrary for Primitive {
        fn arbitrary(g: &mut quickcheck::Gen) -> Self {
            let options = [
                ResolvedType::String,
                ResolvedType::Int,
                ResolvedType::Decimal,
                ResolvedType::Boolean,
                ResolvedType::Timestamp,
                ResolvedType::Uuid,
                ResolvedType::Duration,
            ];
            Primitive(g.choose(&options).unwrap().clone())
        }
    }

    #[quickcheck_macros::quickcheck]
    fn prop_every_primitive_is_assignable_to_itself(p: Primitive) -> bool {
        p.0.is_assignable_to(&p.0)
    }

    #[quickcheck_macros::quickcheck]
    fn prop_wrapping_in_list_preserves_reflexivity(p: Primitive) -> bool {
        let list = ResolvedType::List(Box::new(p.0));
        list.is_assignable_to(&list)
    }
}
