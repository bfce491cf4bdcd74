//! Diagnostic codes for categorizing checker and verifier diagnostics.
//!
//! Unlike a general-purpose compiler, this checker only ever raises a fixed,
//! closed set of diagnoses. [`DiagnosticCode`] is a plain enum rather than an
//! open `{prefix}{number}` scheme so callers can match exhaustively instead
//! of string-comparing codes.
//!
//! # Examples
//!
//! ```
//! use covenant_util::diagnostic::DiagnosticCode;
//!
//! let code = DiagnosticCode::TypeMismatch;
//! assert_eq!(code.as_str(), "TYPE_MISMATCH");
//! ```

/// A stable, closed code identifying the kind of diagnostic raised.
///
/// # Examples
///
/// ```
/// use covenant_util::diagnostic::DiagnosticCode;
///
/// assert_eq!(DiagnosticCode::UndefinedType.as_str(), "UNDEFINED_TYPE");
/// assert_eq!(DiagnosticCode::DuplicateField.as_str(), "DUPLICATE_FIELD");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DiagnosticCode {
    /// A type name referenced in a field, parameter, or annotation does not
    /// resolve to any declared or built-in type.
    UndefinedType,
    /// An expression's inferred type is not assignable to the position that
    /// requires it.
    TypeMismatch,
    /// An identifier does not resolve in the current scope.
    UndefinedVariable,
    /// `old(...)` was used outside a postcondition, where no snapshot
    /// environment exists.
    OldOutsidePostcondition,
    /// `result` was used outside a postcondition, where no return value is
    /// bound.
    ResultOutsidePostcondition,
    /// A type, entity, or behavior refers to itself through a cycle with no
    /// base case.
    CircularReference,
    /// Two fields of the same entity or value type share a name.
    DuplicateField,
    /// A top-level declaration (type, entity, or behavior) reuses a name
    /// already bound in its scope.
    DuplicateDeclaration,
    /// A behavior transitions an entity into a state its lifecycle does not
    /// declare, or is invoked from a state it does not permit.
    InvalidLifecycleState,
    /// A scenario's `input` does not satisfy the shape implied by the
    /// behavior's parameter types.
    InputInvalidField,
}

impl DiagnosticCode {
    /// Returns the stable string form of this code, as it appears in
    /// serialized diagnostics and reports.
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            DiagnosticCode::UndefinedType => "UNDEFINED_TYPE",
            DiagnosticCode::TypeMismatch => "TYPE_MISMATCH",
            DiagnosticCode::UndefinedVariable => "UNDEFINED_VARIABLE",
            DiagnosticCode::OldOutsidePostcondition => "OLD_OUTSIDE_POSTCONDITION",
            DiagnosticCode::ResultOutsidePostcondition => "RESULT_OUTSIDE_POSTCONDITION",
            DiagnosticCode::CircularReference => "CIRCULAR_REFERENCE",
            DiagnosticCode::DuplicateField => "DUPLICATE_FIELD",
            DiagnosticCode::DuplicateDeclaration => "DUPLICATE_DECLARATION",
            DiagnosticCode::InvalidLifecycleState => "INVALID_LIFECYCLE_STATE",
            DiagnosticCode::InputInvalidField => "INPUT_INVALID_FIELD",
        }
    }
}

impl std::fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_str() {
        assert_eq!(DiagnosticCode::UndefinedType.as_str(), "UNDEFINED_TYPE");
        assert_eq!(DiagnosticCode::TypeMismatch.as_str(), "TYPE_MISMATCH");
        assert_eq!(
            DiagnosticCode::OldOutsidePostcondition.as_str(),
            "OLD_OUTSIDE_POSTCONDITION"
        );
        assert_eq!(
            DiagnosticCode::ResultOutsidePostcondition.as_str(),
            "RESULT_OUTSIDE_POSTCONDITION"
        );
        assert_eq!(DiagnosticCode::CircularReference.as_str(), "CIRCULAR_REFERENCE");
        assert_eq!(DiagnosticCode::DuplicateField.as_str(), "DUPLICATE_FIELD");
        assert_eq!(
            DiagnosticCode::DuplicateDeclaration.as_str(),
            "DUPLICATE_DECLARATION"
        );
        assert_eq!(
            DiagnosticCode::InvalidLifecycleState.as_str(),
            "INVALID_LIFECYCLE_STATE"
        );
        assert_eq!(DiagnosticCode::InputInvalidField.as_str(), "INPUT_INVALID_FIELD");
        assert_eq!(DiagnosticCode::UndefinedVariable.as_str(), "UNDEFINED_VARIABLE");
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", DiagnosticCode::TypeMismatch), "TYPE_MISMATCH");
    }

    #[test]
    fn test_equality_and_ord() {
        assert_eq!(DiagnosticCode::TypeMismatch, DiagnosticCode::TypeMismatch);
        assert_ne!(DiagnosticCode::TypeMismatch, DiagnosticCode::UndefinedType);
        assert!(DiagnosticCode::UndefinedType < DiagnosticCode::TypeMismatch);
    }
}
