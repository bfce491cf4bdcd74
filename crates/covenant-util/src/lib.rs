//! Foundation types shared by every crate in the workspace: interned
//! symbols, source locations, typed index vectors, definition ids, and
//! the diagnostic machinery used by the checker and verifier.

pub mod def_id;
pub mod diagnostic;
pub mod error;
pub mod index_vec;
pub mod span;
pub mod symbol;

pub use def_id::{DefId, DefIdGenerator};
pub use diagnostic::{
    ColorConfig, Diagnostic, DiagnosticBuilder, DiagnosticCode, Handler, LabelStyle, Level, SourceSnippet,
};
pub use index_vec::{Idx, IndexVec};
pub use span::{FileId, SourceFile, SourceLocation, SourceMap, Span};
pub use symbol::Symbol;

pub use rustc_hash::{FxHashMap, FxHashSet};
