//! Closed diagnostic model for findings about analyzed source.
//!
//! A [`Diag`] addresses the source by 1-indexed line and column, matching the
//! lexer's bookkeeping, so an editor surface can highlight the exact character.
//! It also keeps the byte span so it can be rendered through miette.

use crate::ast::Span;
use miette::{Diagnostic, LabeledSpan, Report, Severity};
use std::fmt;

/// Severity level for a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagSeverity {
    /// A fatal error or a true syntax error.
    Error,
    /// A finding that never blocks a successful compilation.
    Warning,
}

impl fmt::Display for DiagSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagSeverity::Error => write!(f, "error"),
            DiagSeverity::Warning => write!(f, "warning"),
        }
    }
}

/// A structured diagnostic message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diag {
    /// The severity level of this diagnostic.
    pub severity: DiagSeverity,
    /// The main diagnostic message.
    pub message: String,
    /// Line of the addressed character, starting at 1.
    pub line: usize,
    /// Column of the addressed character, starting at 1.
    pub column: usize,
    /// Byte span of the addressed source range.
    pub span: Span,
    /// Optional context, such as the enclosing scope.
    pub context: Option<String>,
    /// Suggested actions, in display order.
    pub suggestions: Vec<String>,
    /// Optional diagnostic code (e.g., "W0001").
    pub code: Option<String>,
}

impl Diag {
    /// Creates a new diagnostic at line 1, column 1.
    pub fn new(severity: DiagSeverity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            line: 1,
            column: 1,
            span: 0..0,
            context: None,
            suggestions: Vec::new(),
            code: None,
        }
    }

    /// Creates a new error diagnostic.
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(DiagSeverity::Error, message)
    }

    /// Creates a new warning diagnostic.
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(DiagSeverity::Warning, message)
    }

    /// Creates the single diagnostic reported when the pipeline itself fails.
    pub fn fatal(detail: impl fmt::Display) -> Self {
        Self::error(format!("Fatal error: {detail}")).with_code("E9999")
    }

    /// Sets the addressed line and column.
    pub fn at(mut self, line: usize, column: usize) -> Self {
        self.line = line;
        self.column = column;
        self
    }

    /// Sets the byte span.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Sets the context text.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Appends a suggested action.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    /// Sets the diagnostic code.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Returns true for error-severity diagnostics.
    pub fn is_error(&self) -> bool {
        self.severity == DiagSeverity::Error
    }
}

impl fmt::Display for Diag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: {}: {}",
            self.line, self.column, self.severity, self.message
        )
    }
}

/// A wrapper around source text for diagnostic rendering.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// The source text content.
    content: String,
    /// Optional filename for display purposes.
    name: Option<String>,
}

impl SourceFile {
    /// Creates a new source file from the given content.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            name: None,
        }
    }

    /// Creates a new source file with a name.
    pub fn with_name(content: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            name: Some(name.into()),
        }
    }

    /// Returns the source content.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Returns the source file name, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Clamps a span to valid bounds within this source.
    pub fn clamp_span(&self, span: &Span) -> Span {
        let len = self.content.len();
        let start = span.start.min(len);
        let end = span.end.min(len).max(start);
        start..end
    }
}

/// Converts diagnostics to miette Reports with source context.
pub fn convert_diagnostics_to_reports(diagnostics: &[Diag], source: &SourceFile) -> Vec<Report> {
    diagnostics
        .iter()
        .map(|diag| convert_diag_to_report(diag, source))
        .collect()
}

/// Converts a single diagnostic to a miette Report.
///
/// The span is clamped to the source, the context becomes the label text and
/// each suggestion is attached as a related advice entry.
pub fn convert_diag_to_report(diag: &Diag, source: &SourceFile) -> Report {
    let report = Report::new(build_diagnostic(diag, source));

    if let Some(name) = source.name() {
        report.with_source_code(miette::NamedSource::new(name, source.content().to_string()))
    } else {
        report.with_source_code(source.content().to_string())
    }
}

fn build_diagnostic(diag: &Diag, source: &SourceFile) -> BuiltDiagnostic {
    let clamped = source.clamp_span(&diag.span);
    let label_text = diag.context.clone().unwrap_or_else(|| "here".to_string());
    let label = LabeledSpan::new_primary_with_span(
        Some(label_text),
        (clamped.start, clamped.end - clamped.start),
    );

    BuiltDiagnostic {
        message: diag.message.clone(),
        severity: match diag.severity {
            DiagSeverity::Error => Severity::Error,
            DiagSeverity::Warning => Severity::Warning,
        },
        code: diag.code.clone(),
        label,
        related: diag
            .suggestions
            .iter()
            .cloned()
            .map(SuggestionDiagnostic::new)
            .collect(),
    }
}

/// The final diagnostic type that implements miette's Diagnostic trait.
#[derive(Debug)]
struct BuiltDiagnostic {
    message: String,
    severity: Severity,
    code: Option<String>,
    label: LabeledSpan,
    related: Vec<SuggestionDiagnostic>,
}

#[derive(Debug)]
struct SuggestionDiagnostic {
    message: String,
}

impl SuggestionDiagnostic {
    fn new(message: String) -> Self {
        Self { message }
    }
}

impl fmt::Display for SuggestionDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl fmt::Display for BuiltDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for BuiltDiagnostic {}
impl std::error::Error for SuggestionDiagnostic {}

impl Diagnostic for BuiltDiagnostic {
    fn severity(&self) -> Option<Severity> {
        Some(self.severity)
    }

    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.code
            .as_ref()
            .map(|c| Box::new(c) as Box<dyn fmt::Display>)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        Some(Box::new(std::iter::once(self.label.clone())))
    }

    fn related<'a>(&'a self) -> Option<Box<dyn Iterator<Item = &'a dyn Diagnostic> + 'a>> {
        if self.related.is_empty() {
            None
        } else {
            Some(Box::new(
                self.related.iter().map(|diag| diag as &dyn Diagnostic),
            ))
        }
    }
}

impl Diagnostic for SuggestionDiagnostic {
    fn severity(&self) -> Option<Severity> {
        Some(Severity::Advice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_display() {
        assert_eq!(DiagSeverity::Error.to_string(), "error");
        assert_eq!(DiagSeverity::Warning.to_string(), "warning");
    }

    #[test]
    fn diag_builder_warning() {
        let diag = Diag::warning("Unused variable 'x'")
            .at(3, 9)
            .with_span(20..21)
            .with_context("in scope 'main'")
            .with_suggestion("remove it")
            .with_suggestion("use it")
            .with_code("W0001");

        assert_eq!(diag.severity, DiagSeverity::Warning);
        assert_eq!((diag.line, diag.column), (3, 9));
        assert_eq!(diag.span, 20..21);
        assert_eq!(diag.context.as_deref(), Some("in scope 'main'"));
        assert_eq!(diag.suggestions, vec!["remove it", "use it"]);
        assert!(!diag.is_error());
    }

    #[test]
    fn new_diag_defaults_to_top_left() {
        let diag = Diag::error("boom");
        assert_eq!((diag.line, diag.column), (1, 1));
        assert!(diag.suggestions.is_empty());
        assert!(diag.context.is_none());
    }

    #[test]
    fn fatal_diag_message_format() {
        let diag = Diag::fatal("stack exhausted");
        assert_eq!(diag.message, "Fatal error: stack exhausted");
        assert_eq!((diag.line, diag.column), (1, 1));
        assert!(diag.is_error());
        assert_eq!(diag.code.as_deref(), Some("E9999"));
    }

    #[test]
    fn diag_display_includes_position() {
        let diag = Diag::warning("odd").at(2, 4);
        assert_eq!(diag.to_string(), "2:4: warning: odd");
    }

    #[test]
    fn source_file_with_name() {
        let src = SourceFile::with_name("int x;", "demo.c");
        assert_eq!(src.content(), "int x;");
        assert_eq!(src.name(), Some("demo.c"));
    }

    #[test]
    fn source_file_clamp_span() {
        let src = SourceFile::new("hello");
        assert_eq!(src.clamp_span(&(0..10)), 0..5);
        let inverted = std::ops::Range { start: 3, end: 2 };
        assert_eq!(src.clamp_span(&inverted), 3..3);
        assert_eq!(src.clamp_span(&(10..20)), 5..5);
    }

    #[test]
    fn convert_warning_with_suggestions() {
        let source = SourceFile::with_name("int main() { int x; }", "demo.c");
        let diag = Diag::warning("Unused variable 'x'")
            .with_span(17..18)
            .with_context("declared here")
            .with_suggestion("first")
            .with_suggestion("second")
            .with_code("W0001");

        let report = convert_diag_to_report(&diag, &source);
        assert_eq!(report.to_string(), "Unused variable 'x'");

        let built = build_diagnostic(&diag, &source);
        assert_eq!(built.severity, Severity::Warning);
        assert_eq!(built.code.as_deref(), Some("W0001"));
        assert_eq!(built.label.label(), Some("declared here"));
        let related = built
            .related()
            .expect("expected related diagnostics")
            .collect::<Vec<_>>();
        assert_eq!(related.len(), 2);
        assert_eq!(related[0].to_string(), "first");
        assert_eq!(related[1].severity(), Some(Severity::Advice));
    }

    #[test]
    fn convert_with_invalid_span() {
        let source = SourceFile::new("short");
        let diag = Diag::error("error").with_span(0..100);

        let built = build_diagnostic(&diag, &source);
        assert_eq!(built.label.offset(), 0);
        assert_eq!(built.label.len(), 5);
    }

    #[test]
    fn convert_multiple_diagnostics() {
        let source = SourceFile::new("test source");
        let diags = vec![
            Diag::error("error 1").with_span(0..4),
            Diag::warning("warning 1").with_span(5..11),
        ];

        let reports = convert_diagnostics_to_reports(&diags, &source);
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].to_string(), "error 1");
        assert_eq!(reports[1].to_string(), "warning 1");
    }
}
