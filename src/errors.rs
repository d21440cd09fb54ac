//! Error types with rich diagnostics using miette
//!
//! Formula errors carry source spans so hosts can point at the offending
//! part of a user-typed term.

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use crate::element::ElementType;
use crate::registry::ElementId;

// ============================================================================
// Construction Errors
// ============================================================================

/// Errors that reject a `create` call. Nothing is registered when one of
/// these is returned.
#[derive(Error, Diagnostic, Debug)]
pub enum ConstructionError {
    #[error("unknown element type: {name}")]
    #[diagnostic(
        code(konstrukt::create::unknown_type),
        help("known types: point, line, segment, circle, arc, polygon, text, image, foreignobject, view")
    )]
    UnknownType { name: String },

    #[error("{kind} elements cannot be created directly")]
    #[diagnostic(code(konstrukt::create::not_constructible))]
    NotConstructible { kind: ElementType },

    #[error("{kind} expects {expected} parents, got {got}")]
    #[diagnostic(code(konstrukt::create::arity))]
    Arity {
        kind: ElementType,
        expected: &'static str,
        got: usize,
    },

    #[error("parent {index} of {kind} must be {expected}")]
    #[diagnostic(code(konstrukt::create::parent_type))]
    ParentType {
        kind: ElementType,
        index: usize,
        expected: &'static str,
    },

    #[error("no element with id or name `{reference}`")]
    #[diagnostic(code(konstrukt::create::unknown_reference))]
    UnknownReference { reference: String },

    #[error("name `{name}` is already used by another element")]
    #[diagnostic(code(konstrukt::create::name_taken))]
    NameTaken { name: String },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Term(#[from] TermError),
}

// ============================================================================
// Term Errors
// ============================================================================

/// Errors raised while turning a formula string into a term
#[derive(Error, Diagnostic, Debug)]
pub enum TermError {
    #[error("syntax error: {message}")]
    #[diagnostic(code(konstrukt::term::syntax))]
    Syntax {
        message: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("here")]
        span: SourceSpan,
    },

    #[error("unknown element `{name}`")]
    #[diagnostic(code(konstrukt::term::unknown_element))]
    UnknownElement {
        name: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("not found")]
        span: SourceSpan,
        #[help]
        help: Option<String>,
    },

    #[error("unknown function `{name}`")]
    #[diagnostic(code(konstrukt::term::unknown_function))]
    UnknownFunction {
        name: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("unknown function")]
        span: SourceSpan,
    },

    #[error("`{name}` takes {expected} arguments, got {got}")]
    #[diagnostic(code(konstrukt::term::arity))]
    Arity {
        name: String,
        expected: usize,
        got: usize,
        #[source_code]
        src: NamedSource<String>,
        #[label("called here")]
        span: SourceSpan,
    },

    #[error("`{function}` expects an element name here")]
    #[diagnostic(code(konstrukt::term::expected_element))]
    ExpectedElement {
        function: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("not an element")]
        span: SourceSpan,
    },

    #[error("element `{name}` used as a number")]
    #[diagnostic(
        code(konstrukt::term::bare_element),
        help("use an accessor such as X(A), Y(A) or Rad(c)")
    )]
    BareElement {
        name: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("element reference")]
        span: SourceSpan,
    },
}

impl TermError {
    pub(crate) fn source_named(source: &str) -> NamedSource<String> {
        NamedSource::new("<term>", source.to_string())
    }
}

// ============================================================================
// Update Errors
// ============================================================================

/// Per-element failures inside an update pass.
///
/// These never abort a pass: the failing element is marked not-real and
/// the error is recorded in the pass report.
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum UpdateError {
    #[error("parent {parent:?} no longer exists")]
    #[diagnostic(code(konstrukt::update::missing_parent))]
    MissingParent { parent: ElementId },

    #[error("parent {parent:?} is not {expected}")]
    #[diagnostic(code(konstrukt::update::parent_type))]
    ParentType {
        parent: ElementId,
        expected: &'static str,
    },

    #[error("element update panicked: {message}")]
    #[diagnostic(code(konstrukt::update::panicked))]
    Panicked { message: String },
}

impl UpdateError {
    pub(crate) fn panicked(payload: &(dyn std::any::Any + Send)) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic payload".to_string());
        UpdateError::Panicked { message }
    }
}
