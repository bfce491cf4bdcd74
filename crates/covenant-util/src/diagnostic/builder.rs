//! Diagnostic builder for fluent diagnostic construction.
//!
//! This module provides the [`DiagnosticBuilder`] type for constructing
//! diagnostics with a fluent API, including source code snippets.

use super::{Diagnostic, DiagnosticCode, Level, Span};

/// A source code snippet for display in diagnostics
///
/// Contains the source line(s) affected by the diagnostic, with optional
/// highlighting of the specific range.
///
/// # Examples
///
/// ```
/// use covenant_util::diagnostic::SourceSnippet;
///
/// let snippet = SourceSnippet::new(
///     "entity Order { total: Decimal }",
///     5,
///     1,
///     12,
///     Some("expected a type name"),
/// );
/// ```
#[derive(Clone, Debug)]
pub struct SourceSnippet {
    /// The source line content
    pub line: String,
    /// Line number (1-based)
    pub line_number: usize,
    /// Column where the issue starts (1-based)
    pub start_column: usize,
    /// Column where the issue ends (1-based)
    pub end_column: usize,
    /// Optional label to display under the highlighted range
    pub label: Option<String>,
}

impl SourceSnippet {
    /// Create a new source snippet
    pub fn new(
        line: impl Into<String>,
        line_number: usize,
        start_column: usize,
        end_column: usize,
        label: Option<impl Into<String>>,
    ) -> Self {
        Self {
            line: line.into(),
            line_number,
            start_column,
            end_column,
            label: label.map(Into::into),
        }
    }

    /// Create a snippet without highlighting (point span)
    pub fn point(line: impl Into<String>, line_number: usize, column: usize) -> Self {
        Self {
            line: line.into(),
            line_number,
            start_column: column,
            end_column: column,
            label: None,
        }
    }

    /// Set the label for this snippet
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Format the snippet for display, a source line with a caret (^)
    /// pointing to the relevant range.
    pub fn format(&self) -> String {
        let line_num_width = self.line_number.to_string().len().max(3);
        let mut result = String::new();

        result.push_str(&format!(
            "{:>width$} | {}\n",
            self.line_number,
            self.line,
            width = line_num_width
        ));

        result.push_str(&format!("{:>width$} | ", "", width = line_num_width));

        let underline_start = self.start_column.saturating_sub(1);
        let underline_len = (self.end_column - self.start_column).max(1);

        for _ in 0..underline_start {
            result.push(' ');
        }
        for _ in 0..underline_len {
            result.push('^');
        }

        if let Some(ref label) = self.label {
            result.push_str(&format!(" {}", label));
        }

        result
    }
}

/// Builder for constructing diagnostics with a fluent API
///
/// Every diagnostic the checker or verifier raises carries one of the
/// closed [`DiagnosticCode`] variants, so the code is required up front
/// rather than defaulted.
///
/// # Examples
///
/// ```
/// use covenant_util::diagnostic::{DiagnosticBuilder, DiagnosticCode, Span};
///
/// let diag = DiagnosticBuilder::error(DiagnosticCode::TypeMismatch, "expected Decimal, found String")
///     .location(Span::DUMMY)
///     .source("type-resolver")
///     .help("convert the value with `Decimal(...)`")
///     .build();
/// ```
pub struct DiagnosticBuilder {
    severity: Level,
    code: DiagnosticCode,
    message: String,
    location: Span,
    source: String,
    related_information: Vec<(String, Span)>,
    notes: Vec<String>,
    help: Option<String>,
    snippets: Vec<SourceSnippet>,
}

impl DiagnosticBuilder {
    /// Create a new diagnostic builder
    pub fn new(severity: Level, code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            severity,
            code,
            message: message.into(),
            location: Span::DUMMY,
            source: String::new(),
            related_information: Vec::new(),
            notes: Vec::new(),
            help: None,
            snippets: Vec::new(),
        }
    }

    /// Create an error-severity builder
    pub fn error(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self::new(Level::Error, code, message)
    }

    /// Create a warning-severity builder
    pub fn warning(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self::new(Level::Warning, code, message)
    }

    /// Create an info-severity builder
    pub fn info(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self::new(Level::Info, code, message)
    }

    /// Set the source location
    pub fn location(mut self, location: Span) -> Self {
        self.location = location;
        self
    }

    /// Set the name of the component that raised this diagnostic (e.g.
    /// `"type-resolver"`, `"domain-checker"`, `"contract-verifier"`).
    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// Attach a related location, such as the earlier declaration a
    /// duplicate conflicts with.
    pub fn related(mut self, message: impl Into<String>, location: Span) -> Self {
        self.related_information.push((message.into(), location));
        self
    }

    /// Add a note providing additional context.
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Add a note (alias for [`DiagnosticBuilder::note`]).
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Set the help suggestion. A later call overwrites an earlier one,
    /// matching the single optional `help` field of the data model.
    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Set the help suggestion (alias for [`DiagnosticBuilder::help`]).
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Add a source code snippet for rendering.
    pub fn snippet(mut self, snippet: SourceSnippet) -> Self {
        self.snippets.push(snippet);
        self
    }

    /// Build the diagnostic
    pub fn build(self) -> Diagnostic {
        Diagnostic {
            severity: self.severity,
            code: self.code,
            message: self.message,
            location: self.location,
            source: self.source,
            related_information: self.related_information,
            notes: self.notes,
            help: self.help,
            snippets: self.snippets,
        }
    }

    /// Build and emit the diagnostic to the given handler
    pub fn emit(self, handler: &super::Handler) {
        handler.emit_diagnostic(self.build());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_snippet_new() {
        let snippet = SourceSnippet::new("entity Order {}", 1, 5, 6, Some("variable"));
        assert_eq!(snippet.line, "entity Order {}");
        assert_eq!(snippet.line_number, 1);
        assert_eq!(snippet.start_column, 5);
        assert_eq!(snippet.end_column, 6);
        assert_eq!(snippet.label, Some("variable".to_string()));
    }

    #[test]
    fn test_source_snippet_point() {
        let snippet = SourceSnippet::point("entity Order {}", 1, 5);
        assert_eq!(snippet.start_column, 5);
        assert_eq!(snippet.end_column, 5);
        assert_eq!(snippet.label, None);
    }

    #[test]
    fn test_source_snippet_with_label() {
        let snippet = SourceSnippet::new("entity Order {}", 1, 5, 6, None::<String>).with_label("test");
        assert_eq!(snippet.label, Some("test".to_string()));
    }

    #[test]
    fn test_source_snippet_format() {
        let snippet = SourceSnippet::new("entity Order {}", 1, 5, 6, Some("here"));
        let formatted = snippet.format();
        assert!(formatted.contains("entity Order {}"));
        assert!(formatted.contains("^"));
        assert!(formatted.contains("here"));
    }

    #[test]
    fn test_builder_error() {
        let diag = DiagnosticBuilder::error(DiagnosticCode::UndefinedType, "test error")
            .location(Span::DUMMY)
            .build();

        assert_eq!(diag.severity, Level::Error);
        assert_eq!(diag.code, DiagnosticCode::UndefinedType);
        assert_eq!(diag.message, "test error");
    }

    #[test]
    fn test_builder_warning() {
        let diag = DiagnosticBuilder::warning(DiagnosticCode::DuplicateField, "test warning")
            .location(Span::DUMMY)
            .build();

        assert_eq!(diag.severity, Level::Warning);
    }

    #[test]
    fn test_builder_source_and_related() {
        let earlier = Span::point(1, 1);
        let diag = DiagnosticBuilder::error(DiagnosticCode::DuplicateDeclaration, "duplicate type `Order`")
            .source("domain-checker")
            .related("first declared here", earlier)
            .build();

        assert_eq!(diag.source, "domain-checker");
        assert_eq!(diag.related_information.len(), 1);
        assert_eq!(diag.related_information[0].0, "first declared here");
    }

    #[test]
    fn test_builder_notes_and_help() {
        let diag = DiagnosticBuilder::error(DiagnosticCode::TypeMismatch, "test")
            .note("note 1")
            .note("note 2")
            .help("help 1")
            .help("help 2")
            .location(Span::DUMMY)
            .build();

        assert_eq!(diag.notes, vec!["note 1", "note 2"]);
        assert_eq!(diag.help, Some("help 2".to_string()));
    }

    #[test]
    fn test_builder_snippet() {
        let snippet = SourceSnippet::point("test", 1, 1);
        let diag = DiagnosticBuilder::error(DiagnosticCode::TypeMismatch, "test")
            .snippet(snippet.clone())
            .location(Span::DUMMY)
            .build();

        assert_eq!(diag.snippets.len(), 1);
        assert_eq!(diag.snippets[0].line, "test");
    }

    #[test]
    fn test_builder_fluent() {
        let snippet = SourceSnippet::new("entity Order {", 1, 1, 3, Some("here"));

        let diag = DiagnosticBuilder::error(DiagnosticCode::UndefinedType, "undefined type `Orde`")
            .location(Span::new(0, 2, 1, 1, 1, 3))
            .note("did you mean `Order`?")
            .help("check the type name for typos")
            .snippet(snippet)
            .build();

        assert_eq!(diag.severity, Level::Error);
        assert_eq!(diag.code, DiagnosticCode::UndefinedType);
        assert_eq!(diag.notes.len(), 1);
        assert!(diag.help.is_some());
        assert_eq!(diag.snippets.len(), 1);
    }

    #[test]
    fn test_builder_with_note_and_help() {
        let diag = DiagnosticBuilder::error(DiagnosticCode::TypeMismatch, "test")
            .with_note("note 1")
            .with_help("help 1")
            .location(Span::DUMMY)
            .build();

        assert_eq!(diag.notes, vec!["note 1"]);
        assert_eq!(diag.help, Some("help 1".to_string()));
    }

    #[test]
    fn test_builder_emit() {
        use super::super::Handler;

        let handler = Handler::new();
        DiagnosticBuilder::error(DiagnosticCode::TypeMismatch, "test error")
            .location(Span::DUMMY)
            .emit(&handler);

        assert!(handler.has_errors());
        assert_eq!(handler.error_count(), 1);
    }
}
