//! Query outcomes and diagnostic codes for symbol resolution.
//!
//! `W301` reports a reference that neither the batch nor the resolution
//! delegate could resolve, `W302` a type declared twice in one batch. `E301`
//! and `E302` report internal construction failures.

use jabi_diagnostics::{Category, Diagnostic, DiagnosticCode, Label};
use jabi_source::Span;

/// Construction re-entered a key it was already building.
pub const E301: DiagnosticCode = DiagnosticCode::new(Category::Error, 301);

/// Model input has an inconsistent shape.
pub const E302: DiagnosticCode = DiagnosticCode::new(Category::Error, 302);

/// Unresolvable symbol.
pub const W301: DiagnosticCode = DiagnosticCode::new(Category::Warning, 301);

/// Duplicate type declaration in one batch.
pub const W302: DiagnosticCode = DiagnosticCode::new(Category::Warning, 302);

/// Why a model query could not produce its answer.
///
/// Absence is never an error: an interface's missing superclass is
/// [`TypeMirror::None`](crate::TypeMirror::None), an anonymous body's missing
/// qualified name is [`QualifiedName::Anonymous`](crate::QualifiedName::Anonymous).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// Neither the batch nor the delegate knows the name.
    #[error("cannot find symbol `{name}`")]
    UnknownSymbol {
        /// The name as written or as canonically formed.
        name: String,
        /// Where it was referenced, when known.
        span: Option<Span>,
    },
    /// A constructor asked for the element it was constructing.
    #[error("cyclic construction of {key}")]
    CyclicConstruction {
        /// Description of the element key.
        key: String,
    },
    /// A syntax tree that disagrees with the index, a delegate answer for
    /// another name, or a type used with a session that did not make it.
    #[error("malformed model input: {message}")]
    MalformedTree {
        /// What was missing.
        message: String,
    },
}

impl ModelError {
    /// Creates an [`ModelError::UnknownSymbol`] without a location.
    pub fn unknown(name: impl Into<String>) -> Self {
        ModelError::UnknownSymbol {
            name: name.into(),
            span: None,
        }
    }

    /// Creates a [`ModelError::MalformedTree`].
    pub fn malformed(message: impl Into<String>) -> Self {
        ModelError::MalformedTree {
            message: message.into(),
        }
    }

    /// Returns `true` for [`ModelError::UnknownSymbol`].
    pub fn is_unknown_symbol(&self) -> bool {
        matches!(self, ModelError::UnknownSymbol { .. })
    }

    /// The reference location, if the error carries one.
    pub fn span(&self) -> Option<Span> {
        match self {
            ModelError::UnknownSymbol { span, .. } => *span,
            _ => None,
        }
    }

    /// Attaches `at` as the reference location unless one is already set.
    pub fn located(self, at: Span) -> Self {
        match self {
            ModelError::UnknownSymbol { name, span: None } => ModelError::UnknownSymbol {
                name,
                span: Some(at),
            },
            other => other,
        }
    }

    /// Converts the error into a diagnostic at `fallback` when it carries no
    /// location of its own.
    pub fn to_diagnostic(&self, fallback: Span) -> Diagnostic {
        let span = self.span().unwrap_or(fallback);
        match self {
            ModelError::UnknownSymbol { name, .. } => warn_unknown_symbol(name, span),
            ModelError::CyclicConstruction { .. } => {
                Diagnostic::error(E301, self.to_string(), span)
                    .with_note("an element's construction depends on itself")
            }
            ModelError::MalformedTree { .. } => Diagnostic::error(E302, self.to_string(), span),
        }
    }
}

/// Creates a warning for a reference nothing could resolve.
pub fn warn_unknown_symbol(name: &str, span: Span) -> Diagnostic {
    Diagnostic::warning(W301, format!("cannot find symbol `{name}`"), span)
        .with_note("the stub records the reference unresolved")
        .with_help("pass the dependency's symbol table with `--symbols`")
}

/// Creates a warning for a type declared more than once in the batch.
pub fn warn_duplicate_type(name: &str, span: Span, prev_span: Span) -> Diagnostic {
    Diagnostic::warning(W302, format!("duplicate type `{name}`"), span)
        .with_label(Label::secondary(prev_span, "first declared here"))
        .with_note("lookups by name resolve to the first declaration")
}

#[cfg(test)]
mod tests {
    use super::*;
    use jabi_diagnostics::Severity;

    #[test]
    fn codes_format() {
        assert_eq!(format!("{W301}"), "W301");
        assert_eq!(format!("{E302}"), "E302");
    }

    #[test]
    fn located_only_fills_missing_span() {
        let a = Span::new(jabi_source::FileId::from_raw(0), 1, 2);
        let b = Span::new(jabi_source::FileId::from_raw(0), 5, 9);
        let err = ModelError::unknown("Bar").located(a).located(b);
        assert_eq!(err.span(), Some(a));
        assert!(err.is_unknown_symbol());
        assert_eq!(err.to_string(), "cannot find symbol `Bar`");
    }

    #[test]
    fn unknown_symbol_is_a_warning() {
        let diag = ModelError::unknown("Bar").to_diagnostic(Span::DUMMY);
        assert_eq!(diag.severity, Severity::Warning);
        assert_eq!(diag.code, W301);
    }

    #[test]
    fn internal_failures_are_errors() {
        let diag = ModelError::malformed("no member 3").to_diagnostic(Span::DUMMY);
        assert_eq!(diag.severity, Severity::Error);
        assert_eq!(diag.code, E302);
        assert_eq!(diag.message, "malformed model input: no member 3");
        let diag = ModelError::CyclicConstruction {
            key: "type `A`".to_string(),
        }
        .to_diagnostic(Span::DUMMY);
        assert_eq!(diag.code, E301);
        assert_eq!(diag.notes.len(), 1);
    }

    #[test]
    fn duplicate_type_has_secondary_label() {
        let diag = warn_duplicate_type("a.Foo", Span::DUMMY, Span::DUMMY);
        assert_eq!(diag.code, W302);
        assert_eq!(diag.labels.len(), 1);
    }
}
