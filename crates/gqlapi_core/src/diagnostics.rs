//! Diagnostic reporting for gqlapi.

use crate::span::Span;
use miette::{LabeledSpan, NamedSource, SourceCode};
use std::fmt;

/// Diagnostic severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticSeverity {
    /// An error that prevents generation.
    Error,
    /// A warning that doesn't prevent generation.
    Warning,
}

impl From<DiagnosticSeverity> for miette::Severity {
    fn from(severity: DiagnosticSeverity) -> Self {
        match severity {
            DiagnosticSeverity::Error => miette::Severity::Error,
            DiagnosticSeverity::Warning => miette::Severity::Warning,
        }
    }
}

/// A label attached to a diagnostic.
#[derive(Debug, Clone)]
pub struct Label {
    /// The span this label points to.
    pub span: Span,
    /// The label message.
    pub message: String,
}

impl Label {
    /// Creates a new label.
    pub fn new(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
        }
    }
}

/// A diagnostic message.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Severity level.
    pub severity: DiagnosticSeverity,
    /// Error code.
    pub code: String,
    /// Short title.
    pub title: String,
    /// Detailed message.
    pub message: Option<String>,
    /// Labels pointing to source locations.
    pub labels: Vec<Label>,
}

impl Diagnostic {
    /// Creates a new error diagnostic.
    pub fn error(code: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            severity: DiagnosticSeverity::Error,
            code: code.into(),
            title: title.into(),
            message: None,
            labels: Vec::new(),
        }
    }

    /// Creates a new warning diagnostic.
    pub fn warning(code: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            severity: DiagnosticSeverity::Warning,
            code: code.into(),
            title: title.into(),
            message: None,
            labels: Vec::new(),
        }
    }

    /// Adds a message to the diagnostic.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Adds a label to the diagnostic.
    #[must_use]
    pub fn with_label(mut self, label: Label) -> Self {
        self.labels.push(label);
        self
    }

    /// Adds a primary label at a span.
    #[must_use]
    pub fn with_span(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::new(span, message));
        self
    }

    /// Returns the primary span, if any.
    pub fn primary_span(&self) -> Option<Span> {
        self.labels.first().map(|l| l.span)
    }

    /// Attaches source text so the diagnostic can be rendered with snippets.
    pub fn with_source(self, name: impl AsRef<str>, source: impl Into<String>) -> SourceDiagnostic {
        SourceDiagnostic {
            source_code: NamedSource::new(name, source.into()),
            diagnostic: self,
        }
    }
}

/// A diagnostic bound to the source it was reported against.
///
/// Implements [`miette::Diagnostic`] so callers can wrap it in a
/// [`miette::Report`] and get labelled snippets.
#[derive(Debug, thiserror::Error)]
#[error("{}", .diagnostic.title)]
pub struct SourceDiagnostic {
    source_code: NamedSource<String>,
    diagnostic: Diagnostic,
}

impl SourceDiagnostic {
    /// Returns the wrapped diagnostic.
    #[must_use]
    pub fn diagnostic(&self) -> &Diagnostic {
        &self.diagnostic
    }
}

impl miette::Diagnostic for SourceDiagnostic {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(&self.diagnostic.code))
    }

    fn severity(&self) -> Option<miette::Severity> {
        Some(self.diagnostic.severity.into())
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.diagnostic
            .message
            .as_ref()
            .map(|m| Box::new(m) as Box<dyn fmt::Display + 'a>)
    }

    fn source_code(&self) -> Option<&dyn SourceCode> {
        Some(&self.source_code)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        if self.diagnostic.labels.is_empty() {
            return None;
        }
        Some(Box::new(self.diagnostic.labels.iter().map(|label| {
            LabeledSpan::new_with_span(Some(label.message.clone()), label.span)
        })))
    }
}

/// A collection of diagnostics.
#[derive(Debug, Default)]
pub struct DiagnosticBag {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticBag {
    /// Creates a new empty diagnostic bag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a diagnostic.
    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Adds an error diagnostic.
    pub fn error(
        &mut self,
        code: impl Into<String>,
        title: impl Into<String>,
        span: Span,
        message: impl Into<String>,
    ) {
        self.add(Diagnostic::error(code, title).with_span(span, message));
    }

    /// Adds a warning diagnostic.
    pub fn warning(
        &mut self,
        code: impl Into<String>,
        title: impl Into<String>,
        span: Span,
        message: impl Into<String>,
    ) {
        self.add(Diagnostic::warning(code, title).with_span(span, message));
    }

    /// Returns true if there are any errors.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == DiagnosticSeverity::Error)
    }

    /// Returns the number of errors.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == DiagnosticSeverity::Error)
            .count()
    }

    /// Returns an iterator over all diagnostics.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    /// Returns an iterator over errors.
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == DiagnosticSeverity::Error)
    }

    /// Returns an iterator over warnings.
    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == DiagnosticSeverity::Warning)
    }

    /// Returns true if there are no diagnostics.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Returns the number of diagnostics.
    #[must_use]
    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }
}

impl IntoIterator for DiagnosticBag {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.diagnostics.into_iter()
    }
}

/// Common diagnostic codes.
pub mod codes {
    pub const UNEXPECTED_TOKEN: &str = "E0001";
    pub const UNEXPECTED_EOF: &str = "E0002";
    pub const INVALID_SYNTAX: &str = "E0003";
    pub const UNTERMINATED_STRING: &str = "E0004";
    pub const INVALID_CHARACTER: &str = "E0005";
    pub const EMPTY_SELECTION_SET: &str = "W0001";
}
