//! Diagnostic infrastructure for syntax errors and warnings
//!
//! The lexer and parser never fail: every problem they find is appended
//! to a [`Diagnostics`] collector with the span of the offending source,
//! and the collector is handed back together with the (possibly degraded)
//! tokens and tree.

use codespan_reporting::diagnostic::{Diagnostic as CsDiagnostic, Label, Severity as CsSeverity};
use codespan_reporting::files::SimpleFile;
use codespan_reporting::term;
use serde::Serialize;
use termcolor::WriteColor;
use thiserror::Error;

use crate::span::{LineIndex, Position, Span};

/// How bad a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

/// Everything the lexer and parser can complain about.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum DiagnosticKind {
    // Lexical errors
    #[error("unexpected character '{found}'")]
    UnexpectedCharacter { found: char },

    #[error("invalid escape sequence '{sequence}'")]
    InvalidEscape { sequence: String },

    #[error("unterminated string literal")]
    UnterminatedString,

    #[error("unterminated character literal")]
    UnterminatedCharacter,

    #[error("empty character literal")]
    EmptyCharacter,

    #[error("character literal must contain exactly one character")]
    MultiCharacter,

    #[error("invalid number literal '{text}'")]
    InvalidNumber { text: String },

    #[error("number literal '{text}' is out of range")]
    NumberOverflow { text: String },

    #[error("invalid bit rate '{bit_rate}' for postfix '{postfix}'")]
    InvalidBitRate { postfix: char, bit_rate: String },

    #[error("postfix '{postfix}' {reason}")]
    InvalidPostfix { postfix: char, reason: &'static str },

    #[error("inconsistent use of tabs and spaces in indentation")]
    InconsistentIndentation,

    #[error("unindent does not match any outer indentation level")]
    InvalidOutdent,

    #[error("unclosed '{{' in formatted string")]
    UnclosedInterpolation,

    #[error("single '}}' is not allowed in formatted string")]
    StrayInterpolationBrace,

    // Syntax errors
    #[error("expected {expected}, got {found}")]
    UnexpectedToken { expected: String, found: String },

    #[error("expected primary expression, got {found}")]
    ExpectedPrimary { found: String },

    #[error("expected end of statement, got {found}")]
    ExpectedStatementEnd { found: String },

    #[error("invalid assignment target")]
    InvalidAssignmentTarget,

    #[error("invalid operand for {operator}")]
    InvalidOperand { operator: String },

    #[error("unmatched {found}")]
    UnmatchedBracket { found: String },

    #[error("maximum nesting depth of {limit} exceeded")]
    MaxDepthExceeded { limit: usize },

    // Macro pattern errors
    #[error("unknown placeholder type '{name}'")]
    UnknownPlaceholderType { name: String },

    #[error("pattern literal {text} must lex to exactly one token")]
    InvalidPatternLiteral { text: String },

    #[error("expected pattern element, got {found}")]
    ExpectedPatternElement { found: String },

    // Warnings
    #[error("duplicate string prefix '{prefix}'")]
    DuplicatePrefix { prefix: char },

    #[error("double negation has no effect")]
    DoubleNegation,
}

impl DiagnosticKind {
    /// Default severity of this kind of diagnostic.
    pub fn severity(&self) -> Severity {
        match self {
            DiagnosticKind::DuplicatePrefix { .. } | DiagnosticKind::DoubleNegation => {
                Severity::Warning
            }
            _ => Severity::Error,
        }
    }

    /// Stable code used in rendered output (`E01xx` lexical, `E02xx`
    /// syntax, `E03xx` macro patterns, `W0xxx` warnings).
    pub fn code(&self) -> &'static str {
        use DiagnosticKind::*;

        match self {
            UnexpectedCharacter { .. } => "E0101",
            InvalidEscape { .. } => "E0102",
            UnterminatedString => "E0103",
            UnterminatedCharacter => "E0104",
            EmptyCharacter => "E0105",
            MultiCharacter => "E0106",
            InvalidNumber { .. } => "E0107",
            NumberOverflow { .. } => "E0108",
            InvalidBitRate { .. } => "E0109",
            InvalidPostfix { .. } => "E0110",
            InconsistentIndentation => "E0111",
            InvalidOutdent => "E0112",
            UnclosedInterpolation => "E0113",
            StrayInterpolationBrace => "E0114",
            UnexpectedToken { .. } => "E0201",
            ExpectedPrimary { .. } => "E0202",
            ExpectedStatementEnd { .. } => "E0203",
            InvalidAssignmentTarget => "E0204",
            InvalidOperand { .. } => "E0205",
            UnmatchedBracket { .. } => "E0206",
            MaxDepthExceeded { .. } => "E0207",
            UnknownPlaceholderType { .. } => "E0301",
            InvalidPatternLiteral { .. } => "E0302",
            ExpectedPatternElement { .. } => "E0303",
            DuplicatePrefix { .. } => "W0001",
            DoubleNegation => "W0002",
        }
    }
}

/// One recorded problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: DiagnosticKind,
    pub span: Span,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, span: Span) -> Self {
        Self {
            severity: kind.severity(),
            kind,
            span,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    pub fn message(&self) -> String {
        self.kind.to_string()
    }

    /// Convert to a codespan diagnostic over `text` (file id `()`).
    pub fn to_codespan(&self, index: &LineIndex, text: &str) -> CsDiagnostic<()> {
        let severity = match self.severity {
            Severity::Error => CsSeverity::Error,
            Severity::Warning => CsSeverity::Warning,
        };
        CsDiagnostic::new(severity)
            .with_message(self.message())
            .with_code(self.kind.code())
            .with_labels(vec![Label::primary((), index.range(text, self.span))])
    }
}

/// Ordered list of diagnostics for one source unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic with its kind's default severity.
    pub fn report(&mut self, kind: DiagnosticKind, span: Span) {
        self.items.push(Diagnostic::new(kind, span));
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.items.push(diagnostic);
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.items.extend(other.items);
    }

    /// Append diagnostics recorded against a fragment of text that starts
    /// at `origin` in this unit (e.g. an interpolated expression).
    pub fn extend_shifted(&mut self, other: Diagnostics, origin: Position) {
        self.items.extend(other.items.into_iter().map(|mut d| {
            d.span = d.span.shifted(origin);
            d
        }));
    }

    pub fn has_errors(&self) -> bool {
        self.items.iter().any(Diagnostic::is_error)
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter().filter(|d| d.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter().filter(|d| !d.is_error())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.items
    }

    /// Render every diagnostic against `text`, labelled with `name`.
    pub fn emit(
        &self,
        writer: &mut dyn WriteColor,
        name: &str,
        text: &str,
    ) -> Result<(), codespan_reporting::files::Error> {
        let file = SimpleFile::new(name, text);
        let index = LineIndex::new(text);
        let config = term::Config::default();
        for diagnostic in &self.items {
            term::emit(writer, &config, &file, &diagnostic.to_codespan(&index, text))?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// JSON representation of a diagnostic for tooling
#[derive(Debug, Serialize)]
pub struct JsonDiagnostic {
    /// Diagnostic code (e.g., "E0201")
    pub code: &'static str,
    pub severity: Severity,
    pub message: String,
    /// Start line (1-indexed)
    pub start_line: u32,
    /// Start column (1-indexed)
    pub start_column: u32,
    /// End line (1-indexed)
    pub end_line: u32,
    /// End column (1-indexed)
    pub end_column: u32,
}

impl From<&Diagnostic> for JsonDiagnostic {
    fn from(diag: &Diagnostic) -> Self {
        JsonDiagnostic {
            code: diag.kind.code(),
            severity: diag.severity,
            message: diag.message(),
            start_line: diag.span.start.line + 1,
            start_column: diag.span.start.column + 1,
            end_line: diag.span.end.line + 1,
            end_column: diag.span.end.column + 1,
        }
    }
}
