//! Diagnostic module - error, warning, info, and hint reporting infrastructure.
//!
//! This module provides types for creating, formatting, and reporting
//! checker and verifier diagnostics, matching the data model's
//! `Diagnostic(severity, code, message, location, source,
//! related_information, notes?, help?)` shape.
//!
//! # Examples
//!
//! ## Using the simple API (deprecated but still supported)
//!
//! ```
//! use covenant_util::diagnostic::{Handler, DiagnosticCode, Span};
//!
//! let handler = Handler::new();
//! handler.error(DiagnosticCode::UndefinedType, "undefined type `Orde`", Span::DUMMY);
//!
//! if handler.has_errors() {
//!     eprintln!("checking failed");
//! }
//! ```
//!
//! ## Using the fluent builder API (recommended)
//!
//! ```
//! use covenant_util::diagnostic::{DiagnosticBuilder, DiagnosticCode, Span};
//!
//! let diag = DiagnosticBuilder::error(DiagnosticCode::UndefinedType, "undefined type `Orde`")
//!     .location(Span::DUMMY)
//!     .help("did you mean `Order`?")
//!     .build();
//! ```

mod builder;
mod codes;
mod level;

pub use builder::{DiagnosticBuilder, SourceSnippet};
pub use codes::DiagnosticCode;
pub use level::{ColorConfig, LabelStyle, Level};

use crate::span::SourceMap;
use crate::Span;
use std::cell::RefCell;

/// A diagnostic message with severity, code, and location.
///
/// # Examples
///
/// ```
/// use covenant_util::diagnostic::{Diagnostic, DiagnosticCode, Level, Span};
///
/// let diag = Diagnostic::error(DiagnosticCode::TypeMismatch, "type mismatch", Span::DUMMY);
/// assert_eq!(diag.severity, Level::Error);
/// ```
#[derive(Clone, Debug)]
pub struct Diagnostic {
    /// Diagnostic severity
    pub severity: Level,
    /// The closed diagnostic code identifying what kind of problem this is
    pub code: DiagnosticCode,
    /// Main diagnostic message
    pub message: String,
    /// Source location the diagnostic is anchored to
    pub location: Span,
    /// Name of the component that raised this diagnostic (e.g.
    /// `"type-resolver"`, `"domain-checker"`, `"contract-verifier"`)
    pub source: String,
    /// Additional locations relevant to the diagnostic, such as an earlier
    /// conflicting declaration
    pub related_information: Vec<(String, Span)>,
    /// Additional notes for context
    pub notes: Vec<String>,
    /// A single suggested fix, if one applies
    pub help: Option<String>,
    /// Source code snippets for display
    pub snippets: Vec<SourceSnippet>,
}

impl Diagnostic {
    /// Create a new diagnostic
    pub fn new(severity: Level, code: DiagnosticCode, message: impl Into<String>, location: Span) -> Self {
        Self {
            severity,
            code,
            message: message.into(),
            location,
            source: String::new(),
            related_information: Vec::new(),
            notes: Vec::new(),
            help: None,
            snippets: Vec::new(),
        }
    }

    /// Create an error diagnostic
    pub fn error(code: DiagnosticCode, message: impl Into<String>, location: Span) -> Self {
        Self::new(Level::Error, code, message, location)
    }

    /// Create a warning diagnostic
    pub fn warning(code: DiagnosticCode, message: impl Into<String>, location: Span) -> Self {
        Self::new(Level::Warning, code, message, location)
    }

    /// Set the component name that raised this diagnostic
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// Attach a related location
    pub fn with_related(mut self, message: impl Into<String>, location: Span) -> Self {
        self.related_information.push((message.into(), location));
        self
    }

    /// Add a note to the diagnostic
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Set the help suggestion
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Add a source snippet
    pub fn with_snippet(mut self, snippet: SourceSnippet) -> Self {
        self.snippets.push(snippet);
        self
    }

    /// Render this diagnostic as a human-readable, rustc-style block using
    /// the given source map to look up line text.
    ///
    /// # Examples
    ///
    /// ```
    /// use covenant_util::diagnostic::{Diagnostic, DiagnosticCode, Span};
    /// use covenant_util::span::SourceMap;
    ///
    /// let mut map = SourceMap::new();
    /// let file = map.add_file("order.cov", "entity Order {}\n");
    /// let span = Span::with_file(7, 12, file, 1, 8, 1, 13);
    /// let diag = Diagnostic::error(DiagnosticCode::UndefinedType, "undefined type", span);
    /// let rendered = diag.render(&map);
    /// assert!(rendered.contains("error[UNDEFINED_TYPE]"));
    /// ```
    pub fn render(&self, source_map: &SourceMap) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "{}[{}]: {}\n",
            self.severity,
            self.code.as_str(),
            self.message
        ));

        if let Some(file) = source_map.get(self.location.file_id) {
            out.push_str(&format!(
                "  --> {}:{}:{}\n",
                file.name(),
                self.location.line,
                self.location.column
            ));
            if let Some(line_text) = file.line_at(self.location.line as usize) {
                let snippet = SourceSnippet::new(
                    line_text,
                    self.location.line as usize,
                    self.location.column as usize,
                    self.location.end_column as usize,
                    None::<String>,
                );
                out.push_str(&snippet.format());
                out.push('\n');
            }
        }

        for (message, location) in &self.related_information {
            out.push_str(&format!(
                "  note: {} ({}:{})\n",
                message, location.line, location.column
            ));
        }
        for note in &self.notes {
            out.push_str(&format!("  = note: {}\n", note));
        }
        if let Some(help) = &self.help {
            out.push_str(&format!("  = help: {}\n", help));
        }

        out
    }
}

/// Handler for collecting and reporting diagnostics
///
/// The `Handler` collects diagnostics and provides methods for querying
/// their counts. It can be configured to panic on errors for testing.
///
/// # Examples
///
/// ```
/// use covenant_util::diagnostic::{Handler, DiagnosticCode, Span};
///
/// let handler = Handler::new();
/// handler.error(DiagnosticCode::TypeMismatch, "type mismatch", Span::DUMMY);
///
/// if handler.has_errors() {
///     eprintln!("checking failed with {} errors", handler.error_count());
/// }
/// ```
pub struct Handler {
    /// Collected diagnostics
    diagnostics: RefCell<Vec<Diagnostic>>,
    /// Whether to panic on errors (for testing)
    panic_on_error: RefCell<bool>,
}

impl Handler {
    /// Create a new handler
    pub fn new() -> Self {
        Self {
            diagnostics: RefCell::new(Vec::new()),
            panic_on_error: RefCell::new(false),
        }
    }

    /// Create a handler that panics on errors (for testing)
    pub fn new_panicking() -> Self {
        Self {
            diagnostics: RefCell::new(Vec::new()),
            panic_on_error: RefCell::new(true),
        }
    }

    /// Report an error.
    ///
    /// This is the legacy API. For more control, use [`DiagnosticBuilder`].
    #[deprecated(since = "0.2.0", note = "Use `DiagnosticBuilder::error()` for more control")]
    pub fn error(&self, code: DiagnosticCode, message: impl Into<String>, location: Span) {
        let diag = Diagnostic::error(code, message, location);
        self.emit(diag);
    }

    /// Report a warning.
    ///
    /// This is the legacy API. For more control, use [`DiagnosticBuilder`].
    #[deprecated(since = "0.2.0", note = "Use `DiagnosticBuilder::warning()` for more control")]
    pub fn warning(&self, code: DiagnosticCode, message: impl Into<String>, location: Span) {
        let diag = Diagnostic::warning(code, message, location);
        self.emit(diag);
    }

    /// Emit a diagnostic
    fn emit(&self, diagnostic: Diagnostic) {
        if *self.panic_on_error.borrow() && diagnostic.severity == Level::Error {
            panic!("diagnostic error: {}", diagnostic.message);
        }
        self.diagnostics.borrow_mut().push(diagnostic);
    }

    /// Emit a pre-built diagnostic
    pub fn emit_diagnostic(&self, diagnostic: Diagnostic) {
        self.emit(diagnostic);
    }

    /// Create a diagnostic builder for an error
    pub fn build_error(&self, location: Span, code: DiagnosticCode, message: impl Into<String>) -> DiagnosticBuilder {
        DiagnosticBuilder::error(code, message).location(location)
    }

    /// Create a diagnostic builder for a warning
    pub fn build_warning(&self, location: Span, code: DiagnosticCode, message: impl Into<String>) -> DiagnosticBuilder {
        DiagnosticBuilder::warning(code, message).location(location)
    }

    /// Check if any errors have been reported
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .borrow()
            .iter()
            .any(|d| d.severity == Level::Error)
    }

    /// Get the number of errors
    pub fn error_count(&self) -> usize {
        self.diagnostics
            .borrow()
            .iter()
            .filter(|d| d.severity == Level::Error)
            .count()
    }

    /// Get the number of warnings
    pub fn warning_count(&self) -> usize {
        self.diagnostics
            .borrow()
            .iter()
            .filter(|d| d.severity == Level::Warning)
            .count()
    }

    /// Get all diagnostics
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.borrow().clone()
    }

    /// Clear all diagnostics
    pub fn clear(&self) {
        self.diagnostics.borrow_mut().clear();
    }
}

impl Default for Handler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::Span;

    #[test]
    fn test_diagnostic_new() {
        let diag = Diagnostic::new(Level::Error, DiagnosticCode::TypeMismatch, "test", Span::DUMMY);
        assert_eq!(diag.severity, Level::Error);
        assert_eq!(diag.message, "test");
    }

    #[test]
    fn test_diagnostic_error() {
        let diag = Diagnostic::error(DiagnosticCode::UndefinedType, "error message", Span::DUMMY);
        assert_eq!(diag.severity, Level::Error);
    }

    #[test]
    fn test_diagnostic_warning() {
        let diag = Diagnostic::warning(DiagnosticCode::DuplicateField, "warning message", Span::DUMMY);
        assert_eq!(diag.severity, Level::Warning);
    }

    #[test]
    fn test_diagnostic_with_source_and_related() {
        let earlier = Span::point(1, 1);
        let diag = Diagnostic::error(DiagnosticCode::DuplicateDeclaration, "duplicate type `Order`", Span::DUMMY)
            .with_source("domain-checker")
            .with_related("first declared here", earlier);

        assert_eq!(diag.source, "domain-checker");
        assert_eq!(diag.related_information.len(), 1);
    }

    #[test]
    fn test_diagnostic_with_note() {
        let diag = Diagnostic::error(DiagnosticCode::TypeMismatch, "test", Span::DUMMY)
            .with_note("note 1")
            .with_note("note 2");
        assert_eq!(diag.notes, vec!["note 1", "note 2"]);
    }

    #[test]
    fn test_diagnostic_with_help() {
        let diag = Diagnostic::error(DiagnosticCode::UndefinedType, "undefined type", Span::DUMMY)
            .with_help("did you mean `Order`?");
        assert_eq!(diag.help, Some("did you mean `Order`?".to_string()));
    }

    #[test]
    fn test_handler_new() {
        let handler = Handler::new();
        assert!(!handler.has_errors());
        assert_eq!(handler.error_count(), 0);
        assert_eq!(handler.warning_count(), 0);
    }

    #[test]
    #[allow(deprecated)]
    fn test_handler_error() {
        let handler = Handler::new();
        handler.error(DiagnosticCode::TypeMismatch, "test error", Span::DUMMY);
        assert!(handler.has_errors());
        assert_eq!(handler.error_count(), 1);
    }

    #[test]
    #[allow(deprecated)]
    fn test_handler_warning() {
        let handler = Handler::new();
        handler.warning(DiagnosticCode::DuplicateField, "test warning", Span::DUMMY);
        assert!(!handler.has_errors());
        assert_eq!(handler.warning_count(), 1);
    }

    #[test]
    fn test_handler_emit_diagnostic() {
        let handler = Handler::new();
        let diag = Diagnostic::error(DiagnosticCode::TypeMismatch, "test", Span::DUMMY);
        handler.emit_diagnostic(diag);
        assert!(handler.has_errors());
    }

    #[test]
    fn test_handler_clear() {
        let handler = Handler::new();
        handler.emit_diagnostic(Diagnostic::error(DiagnosticCode::TypeMismatch, "test", Span::DUMMY));
        handler.clear();
        assert!(!handler.has_errors());
        assert_eq!(handler.error_count(), 0);
    }

    #[test]
    fn test_handler_diagnostics() {
        let handler = Handler::new();
        handler.emit_diagnostic(Diagnostic::error(DiagnosticCode::TypeMismatch, "test1", Span::DUMMY));
        handler.emit_diagnostic(Diagnostic::warning(DiagnosticCode::DuplicateField, "test2", Span::DUMMY));

        let diags = handler.diagnostics();
        assert_eq!(diags.len(), 2);
    }

    #[test]
    fn test_handler_panicking() {
        let handler = Handler::new_panicking();
        let result = std::panic::catch_unwind(|| {
            handler.emit_diagnostic(Diagnostic::error(DiagnosticCode::TypeMismatch, "test", Span::DUMMY));
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_handler_build_error() {
        let handler = Handler::new();
        handler
            .build_error(Span::DUMMY, DiagnosticCode::UndefinedType, "test error")
            .emit(&handler);

        assert!(handler.has_errors());
        assert_eq!(handler.error_count(), 1);

        let diags = handler.diagnostics();
        assert_eq!(diags[0].code, DiagnosticCode::UndefinedType);
    }

    #[test]
    fn test_handler_build_warning() {
        let handler = Handler::new();
        handler
            .build_warning(Span::DUMMY, DiagnosticCode::DuplicateField, "test warning")
            .emit(&handler);

        assert!(!handler.has_errors());
        assert_eq!(handler.warning_count(), 1);

        let diags = handler.diagnostics();
        assert_eq!(diags[0].code, DiagnosticCode::DuplicateField);
    }

    #[test]
    fn test_handler_build_with_note_and_help() {
        let handler = Handler::new();
        handler
            .build_error(Span::DUMMY, DiagnosticCode::TypeMismatch, "type mismatch")
            .with_note("expected `Decimal`")
            .with_help("convert the value with `Decimal(...)`")
            .emit(&handler);

        let diags = handler.diagnostics();
        assert_eq!(diags[0].notes, vec!["expected `Decimal`"]);
        assert_eq!(diags[0].help, Some("convert the value with `Decimal(...)`".to_string()));
    }

    #[test]
    fn test_diagnostic_render_includes_code_and_message() {
        let mut map = SourceMap::new();
        let file = map.add_file("order.cov", "entity Order {}\n");
        let span = Span::with_file(7, 12, file, 1, 8, 1, 13);
        let diag = Diagnostic::error(DiagnosticCode::UndefinedType, "undefined type `Orde`", span);
        let rendered = diag.render(&map);
        assert!(rendered.contains("error[UNDEFINED_TYPE]"));
        assert!(rendered.contains("undefined type"));
        assert!(rendered.contains("order.cov"));
    }
}
