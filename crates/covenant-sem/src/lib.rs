//! covenant-sem - Semantic Core: Symbol Table, Type Resolver, Domain Checker
//!
//! ============================================================================
//! SEMANTIC ANALYSIS THEORY
//! ============================================================================
//!
//! Semantic analysis is the phase where we check the "meaning" of a domain
//! specification, not just its syntax. The parser (outside this crate)
//! already guarantees the input is a well-formed `Domain`; this crate
//! answers questions the grammar cannot:
//!
//! - Does every name this declaration uses actually exist?
//! - Does every expression's type match the position it sits in?
//! - Can `old`/`result` appear here, or are we outside a postcondition?
//! - Does this lifecycle actually reach every state it declares?
//!
//! ============================================================================
//! SCOPING
//! ============================================================================
//!
//! LEXICAL SCOPING:
//! A name resolves to the nearest enclosing declaration of that name in
//! the *source* structure, not the order behaviors happen to run in.
//!
//! ```text
//! entity Order {                  // scope: domain
//!     total: Decimal               // scope: Order
//!     invariant total >= 0         // sees `total` (Order)
//! }
//! behavior Refund {
//!     input amount: Decimal        // scope: Refund
//!     postcondition result <= amount
//! }
//! ```
//!
//! SHADOWING:
//! An inner scope may declare the same name as an outer scope; lookup
//! finds the innermost one. Redeclaring a name *within the same* scope is
//! not shadowing — it is a `DUPLICATE_DECLARATION` or `DUPLICATE_FIELD`.
//!
//! RESOLUTION ALGORITHM:
//! ```text
//! lookup(name, scope):
//!     for s in scope.chain_to_root():
//!         if s.binds(name):
//!             return s.binding(name)
//!     return None
//! ```
//!
//! SCOPE ARENA:
//! Scopes live in a flat arena (`IndexVec<ScopeId, Scope>`), each holding
//! a parent link, rather than an owned tree of boxed children:
//!
//! ```text
//! Scope {
//!     bindings: HashMap<Symbol, SymbolRecord>,
//!     parent: Option<ScopeId>,
//!     span: Span,
//! }
//! ```
//!
//! ============================================================================
//! TYPE SYSTEM
//! ============================================================================
//!
//! TYPE HIERARCHY:
//!
//! Primitive types: `String`, `Int`, `Decimal`, `Boolean`, `Timestamp`,
//! `UUID`, `Duration`.
//!
//! Composite types: `List<T>`, `Map<K, V>`, `Optional<T>`.
//!
//! Declared types: entities, enums, structs, unions — each identified by
//! a [`covenant_util::DefId`], not by name.
//!
//! TYPE EQUALITY:
//!
//! Structural for composites: `List<Int>` and `List<Int>` are the same
//! type regardless of which declaration produced them.
//!
//! Nominal for declared types: two entities named `Order` in different
//! domains (or, hypothetically, redeclared) are never the same type;
//! identity is the `DefId`, not the spelling.
//!
//! ASSIGNABILITY:
//!
//! There is no subtyping in the general sense, but three specific
//! widenings are legal wherever a type is expected:
//!
//! - `Int` is assignable to `Decimal` (never the reverse).
//! - A bare value of `T` is assignable to `Optional<T>`.
//! - `List`/`Map`/`Optional` are assignable structurally over their
//!   element/key/value types, recursively.
//!
//! ```text
//! is_assignable_to(Int, Decimal)                    = true
//! is_assignable_to(String, Optional<String>)        = true
//! is_assignable_to(List<Int>, List<Decimal>)        = true
//! is_assignable_to(List<Decimal>, List<Int>)        = false
//! ```
//!
//! ============================================================================
//! WHY THERE IS NO UNIFICATION
//! ============================================================================
//!
//! A general-purpose language infers the type of `let x = 5` by assigning
//! `x` a fresh type variable and solving constraints via unification
//! (Hindley-Milner). Nothing in this language is declared without an
//! explicit type: every entity field, behavior input, and `type` body
//! names its type directly. The expression inferencer ([`infer`]) is
//! therefore a straightforward bottom-up computation, not a constraint
//! solver — there are no type variables to introduce or substitute.
//!
//! ============================================================================
//! ERROR REPORTING
//! ============================================================================
//!
//! A good diagnostic:
//! 1. Explains what went wrong.
//! 2. Shows where, with file/line/column.
//! 3. Suggests a fix when one is knowable (the bounded edit-distance
//!    "did you mean" search for undefined names).
//! 4. Avoids cascading: a failed lookup produces [`types::ResolvedType::Error`],
//!    which is assignable to and from everything, so one undefined name
//!    does not also report every expression that used it as mismatched.
//!
//! ```text
//! error[UNDEFINED_VARIABLE]: undefined name `amoutn`
//!   --> refund.covenant:12:21
//!    |
//! 12 |     postcondition result <= amoutn
//!    |                             ^^^^^^
//!    |
//! help: did you mean `amount`?
//! ```

pub mod analysis;
#[cfg(test)]
mod edge_cases;
pub mod infer;
pub mod resolve;
pub mod scope;
pub mod types;

pub use analysis::{check, check_with_config, CheckerConfig, DomainChecker, TypeCheckResult};
pub use infer::{FieldInfo, Inferencer};
pub use resolve::TypeResolver;
pub use scope::{DuplicateInCurrentScope, Scope, ScopeId, SymbolKind, SymbolRecord, SymbolTable};
pub use types::ResolvedType;
