use crate::span::Span;
use crate::types::{Type, TypeQuery};
use serde::Serialize;
use std::io::{IsTerminal, Write};
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;

/// Failures that stop the checker itself, as opposed to problems it reports
/// about the program being checked.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("I/O error: {msg}")]
    Io { msg: String, path: PathBuf },

    #[error("Malformed tree: {msg}")]
    Tree { msg: String, path: PathBuf },

    #[error("Config error: {msg}")]
    Config { msg: String, path: PathBuf },

    #[error("Internal error: {msg}")]
    Internal { msg: String, span: Span },
}

impl CompileError {
    pub fn io(msg: impl Into<String>, path: PathBuf) -> Self {
        Self::Io { msg: msg.into(), path }
    }

    pub fn tree(msg: impl Into<String>, path: PathBuf) -> Self {
        Self::Tree { msg: msg.into(), path }
    }

    pub fn config(msg: impl Into<String>, path: PathBuf) -> Self {
        Self::Config { msg: msg.into(), path }
    }

    pub fn internal(msg: impl Into<String>, span: Span) -> Self {
        Self::Internal { msg: msg.into(), span }
    }

    /// The file the error is about, if any.
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            CompileError::Io { path, .. }
            | CompileError::Tree { path, .. }
            | CompileError::Config { path, .. } => Some(path),
            CompileError::Internal { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticKind {
    TypeError,
    MissingTry,
    ThrowWithoutThrowDefined,
    ThrowAtTopLevel,
}

impl DiagnosticKind {
    pub const ALL: [DiagnosticKind; 4] = [
        DiagnosticKind::TypeError,
        DiagnosticKind::MissingTry,
        DiagnosticKind::ThrowWithoutThrowDefined,
        DiagnosticKind::ThrowAtTopLevel,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            DiagnosticKind::TypeError => "type-error",
            DiagnosticKind::MissingTry => "missing-try",
            DiagnosticKind::ThrowWithoutThrowDefined => "throw-without-throw-defined",
            DiagnosticKind::ThrowAtTopLevel => "throw-at-top-level",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.code() == code)
    }

    /// What the user should do about a diagnostic of this kind.
    pub fn guidance(&self) -> &'static str {
        match self {
            DiagnosticKind::TypeError => {
                "The thrown value does not match the throw type declared by the enclosing \
                 block. Throw a value of the declared type, or change the declaration."
            }
            DiagnosticKind::MissingTry => {
                "The called method declares that it may throw. Wrap the call in a `try`, \
                 optionally with an `else` block to recover from the error."
            }
            DiagnosticKind::ThrowWithoutThrowDefined => {
                "An error escapes a block that does not declare a throw type. Declare one \
                 in the block's signature, or handle the error with `try ... else`."
            }
            DiagnosticKind::ThrowAtTopLevel => {
                "Code at the top-level of a module has no caller to pass errors on to. \
                 Handle the error with `try ... else`."
            }
        }
    }
}

impl std::fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// A problem found in the program being checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
    pub span: Span,
}

/// Where the throw pass reports what it finds.
pub trait DiagnosticSink {
    fn type_error(&mut self, expected: &Type, found: &Type, span: Span);

    fn missing_try_error(&mut self, throw_type: &Type, span: Span);

    fn throw_without_throw_defined_error(&mut self, throw_type: &Type, span: Span);

    fn throw_at_top_level_error(&mut self, throw_type: &Type, span: Span);
}

/// Append-only list of diagnostics, in the order they were reported.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: DiagnosticKind, message: String, span: Span) {
        debug!(code = kind.code(), %span, "{message}");
        self.entries.push(Diagnostic { kind, message, span });
    }

    pub fn append(&mut self, other: Diagnostics) {
        self.entries.extend(other.entries);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn kinds(&self) -> Vec<DiagnosticKind> {
        self.entries.iter().map(|d| d.kind).collect()
    }

}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl DiagnosticSink for Diagnostics {
    fn type_error(&mut self, expected: &Type, found: &Type, span: Span) {
        self.push(
            DiagnosticKind::TypeError,
            format!(
                "expected a value of type `{}`, found `{}`",
                expected.type_name(),
                found.type_name()
            ),
            span,
        );
    }

    fn missing_try_error(&mut self, throw_type: &Type, span: Span) {
        self.push(
            DiagnosticKind::MissingTry,
            format!(
                "this expression may throw a value of type `{}` and must be wrapped in a try",
                throw_type.type_name()
            ),
            span,
        );
    }

    fn throw_without_throw_defined_error(&mut self, throw_type: &Type, span: Span) {
        self.push(
            DiagnosticKind::ThrowWithoutThrowDefined,
            format!(
                "a value of type `{}` is thrown, but the enclosing block does not define a throw type",
                throw_type.type_name()
            ),
            span,
        );
    }

    fn throw_at_top_level_error(&mut self, throw_type: &Type, span: Span) {
        self.push(
            DiagnosticKind::ThrowAtTopLevel,
            format!(
                "a value of type `{}` can not be thrown at the top-level of a module",
                throw_type.type_name()
            ),
            span,
        );
    }
}

/// Write a diagnostic to `out`.
///
/// With source text and a real span the report is drawn by ariadne under a header
/// naming `origin`. Otherwise a plain two-line form is written.
pub fn write_diagnostic<W: Write>(
    out: &mut W,
    origin: &str,
    source: Option<&str>,
    diagnostic: &Diagnostic,
    color: bool,
) -> std::io::Result<()> {
    use ariadne::{Config, Label, Report, ReportKind, Source};

    match source {
        Some(text) if !diagnostic.span.is_dummy() => {
            Report::build(ReportKind::Error, origin, diagnostic.span.start)
                .with_config(Config::default().with_color(color))
                .with_code(diagnostic.kind.code())
                .with_message(diagnostic.kind.code().replace('-', " "))
                .with_label(Label::new((origin, diagnostic.span.range())).with_message(&diagnostic.message))
                .finish()
                .write((origin, Source::from(text)), out)
        }
        _ => {
            writeln!(out, "error[{}]: {}", diagnostic.kind.code(), diagnostic.message)?;
            if diagnostic.span.is_dummy() {
                writeln!(out, "  --> {origin}")
            } else {
                writeln!(out, "  --> {origin}@{}", diagnostic.span)
            }
        }
    }
}

/// Render a diagnostic to stderr, in colour only when stderr is a terminal.
pub fn render_diagnostic(origin: &str, source: Option<&str>, diagnostic: &Diagnostic) -> std::io::Result<()> {
    let stderr = std::io::stderr();
    let color = stderr.is_terminal();
    write_diagnostic(&mut stderr.lock(), origin, source, diagnostic, color)
}
