//! Hackeme error handling.
//!
//! One error type for the whole front end, rendered through miette. Errors
//! fall in two classes: syntax errors surfaced from the grammar engine, and
//! contract violations raised when a production arrives without a child the
//! grammar is supposed to guarantee.

use std::fmt;
use std::sync::Arc;

use miette::{Diagnostic, LabeledSpan, NamedSource, SourceSpan};
use thiserror::Error;

// ============================================================================
// SOURCE CONTEXT
// ============================================================================

/// Source name and content carried alongside errors for reporting.
#[derive(Debug, Clone)]
pub struct SourceContext {
    pub name: String,
    pub content: String,
}

impl SourceContext {
    pub fn from_source(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    pub fn to_named_source(&self) -> Arc<NamedSource<String>> {
        Arc::new(NamedSource::new(self.name.clone(), self.content.clone()))
    }

    /// Builds an error anchored at `span` in this source.
    pub fn report(&self, kind: ErrorKind, span: SourceSpan) -> HackemeError {
        let code = format!("hackeme::{}::{}", kind.category().phase(), kind.code_suffix());
        HackemeError {
            kind,
            source: self.to_named_source(),
            span,
            code,
            help: None,
        }
    }
}

// ============================================================================
// ERROR TYPE
// ============================================================================

/// What went wrong.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ErrorKind {
    /// Source text did not match the grammar.
    #[error("Syntax error: {message}")]
    Syntax { message: String },

    /// A terminal matched the grammar but carries an unusable value.
    #[error("Invalid {literal_type} literal '{value}'")]
    InvalidLiteral { literal_type: String, value: String },

    /// A production arrived without a child the grammar must tag.
    /// This is a grammar/engine mismatch, not a user error.
    #[error("Production '{production}' is missing its '{role}' child")]
    MissingRole { production: String, role: String },

    /// A production arrived with no children where exactly one is required.
    #[error("Production '{production}' reduced without a child")]
    EmptyProduction { production: String },
}

/// The category an error belongs to, used for diagnostic codes and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Syntax,
    Contract,
}

impl ErrorCategory {
    fn phase(self) -> &'static str {
        match self {
            ErrorCategory::Syntax => "parse",
            ErrorCategory::Contract => "canonicalize",
        }
    }
}

impl ErrorKind {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Syntax { .. } | Self::InvalidLiteral { .. } => ErrorCategory::Syntax,
            Self::MissingRole { .. } | Self::EmptyProduction { .. } => ErrorCategory::Contract,
        }
    }

    pub const fn code_suffix(&self) -> &'static str {
        match self {
            Self::Syntax { .. } => "syntax",
            Self::InvalidLiteral { .. } => "invalid_literal",
            Self::MissingRole { .. } => "missing_role",
            Self::EmptyProduction { .. } => "empty_production",
        }
    }
}

/// The single front-end error type.
#[derive(Debug)]
pub struct HackemeError {
    pub kind: ErrorKind,
    source: Arc<NamedSource<String>>,
    span: SourceSpan,
    code: String,
    help: Option<String>,
}

impl HackemeError {
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    fn primary_label(&self) -> String {
        match &self.kind {
            ErrorKind::Syntax { .. } => "does not match any production".into(),
            ErrorKind::InvalidLiteral { .. } => "invalid literal".into(),
            ErrorKind::MissingRole { .. } => "reduced here".into(),
            ErrorKind::EmptyProduction { .. } => "reduced here".into(),
        }
    }
}

impl fmt::Display for HackemeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

impl std::error::Error for HackemeError {}

impl Diagnostic for HackemeError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(&self.code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.help
            .as_ref()
            .map(|h| Box::new(h) as Box<dyn fmt::Display>)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let labels = vec![LabeledSpan::new_with_span(
            Some(self.primary_label()),
            self.span,
        )];
        Some(Box::new(labels.into_iter()))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&*self.source)
    }
}

// ============================================================================
// FORMATTING UTILITIES
// ============================================================================

/// Prints an error with full miette diagnostics, for CLI contexts.
pub fn print_error(error: HackemeError) {
    use miette::Report;
    let report = Report::new(error);
    eprintln!("{report:?}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_follow_phase_and_kind() {
        let ctx = SourceContext::from_source("test.hm", "(define x 1)");
        let err = ctx.report(
            ErrorKind::Syntax {
                message: "unexpected token".into(),
            },
            (0..1).into(),
        );
        assert_eq!(format!("{}", err.code().unwrap()), "hackeme::parse::syntax");

        let err = ctx.report(
            ErrorKind::MissingRole {
                production: "fundef".into(),
                role: "name".into(),
            },
            (0..1).into(),
        );
        assert_eq!(
            format!("{}", err.code().unwrap()),
            "hackeme::canonicalize::missing_role"
        );
        assert_eq!(err.kind.category(), ErrorCategory::Contract);
    }
}
