//! Error types for scope construction and evaluation.
//!
//! # Structured Error Categories
//!
//! `ScopeErrorKind` provides typed categories so callers can match on the
//! failure mode instead of parsing strings. Factory functions (e.g.
//! `unresolved_name()`) are the public API; they populate both `kind` and
//! `message`.

use std::fmt;

use crate::value::Value;

/// Result of an evaluation-shaped operation.
pub type EvalResult = Result<Value, ScopeError>;

/// Typed error category.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScopeErrorKind {
    /// Binding name collides with an identifier the machinery reserves.
    ReservedName { name: String },
    /// Binding name collides with a name already visible in the chain
    /// (or duplicated within the same declaration block).
    NameCollision { name: String },
    /// `get`/`set` target a name absent from the entire chain.
    UnresolvedName { name: String },
    /// `set` targets a literal binding, which is fixed at construction.
    ImmutableBinding { name: String },
    /// Value has no embeddable literal form.
    NotEncodable { type_name: String },
    /// The expression host (or a callable body) failed; wraps its
    /// diagnostic text.
    Evaluation { detail: String },
}

impl fmt::Display for ScopeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReservedName { name } => {
                write!(f, "`{name}` is reserved by the evaluation machinery")
            }
            Self::NameCollision { name } => {
                write!(f, "`{name}` is already bound in this scope chain")
            }
            Self::UnresolvedName { name } => {
                write!(f, "`{name}` is not declared anywhere in the scope chain")
            }
            Self::ImmutableBinding { name } => {
                write!(f, "cannot assign to literal binding `{name}`")
            }
            Self::NotEncodable { type_name } => {
                write!(f, "{type_name} value has no literal form")
            }
            Self::Evaluation { detail } => write!(f, "evaluation failed: {detail}"),
        }
    }
}

/// Scope engine error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScopeError {
    /// Structured category for programmatic matching.
    pub kind: ScopeErrorKind,
    /// Human-readable message, equal to `kind.to_string()` for
    /// factory-created errors.
    pub message: String,
}

impl ScopeError {
    /// Create an error from a structured kind.
    ///
    /// The message is computed from the kind's `Display` impl. Used
    /// internally by the factory functions.
    fn from_kind(kind: ScopeErrorKind) -> Self {
        let message = kind.to_string();
        ScopeError { kind, message }
    }
}

impl fmt::Display for ScopeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ScopeError {}

// Factory functions

/// Binding name is in the reserved set.
pub fn reserved_name(name: impl Into<String>) -> ScopeError {
    ScopeError::from_kind(ScopeErrorKind::ReservedName { name: name.into() })
}

/// Binding name collides with an already-visible name.
pub fn name_collision(name: impl Into<String>) -> ScopeError {
    ScopeError::from_kind(ScopeErrorKind::NameCollision { name: name.into() })
}

/// `get`/`set` target was never declared in the chain.
pub fn unresolved_name(name: impl Into<String>) -> ScopeError {
    ScopeError::from_kind(ScopeErrorKind::UnresolvedName { name: name.into() })
}

/// `set` targeted a literal binding.
pub fn immutable_binding(name: impl Into<String>) -> ScopeError {
    ScopeError::from_kind(ScopeErrorKind::ImmutableBinding { name: name.into() })
}

/// Value cannot be converted to embeddable literal text.
pub fn not_encodable(type_name: impl Into<String>) -> ScopeError {
    ScopeError::from_kind(ScopeErrorKind::NotEncodable {
        type_name: type_name.into(),
    })
}

/// The underlying compile/execute primitive failed.
pub fn evaluation_failed(detail: impl Into<String>) -> ScopeError {
    ScopeError::from_kind(ScopeErrorKind::Evaluation {
        detail: detail.into(),
    })
}

/// Text evaluation was requested on a chain with no expression host.
pub fn no_host_installed() -> ScopeError {
    evaluation_failed("no expression host installed on this scope chain")
}

/// A helper callable received the wrong number of arguments.
pub fn wrong_arg_count(helper: &str, expected: usize, got: usize) -> ScopeError {
    let arg_word = if expected == 1 { "argument" } else { "arguments" };
    evaluation_failed(format!("{helper} expects {expected} {arg_word}, got {got}"))
}

/// A helper callable received an argument count outside its accepted
/// range.
pub fn wrong_arg_range(helper: &str, min: usize, max: usize, got: usize) -> ScopeError {
    evaluation_failed(format!("{helper} expects {min} or {max} arguments, got {got}"))
}

/// A helper callable received an argument of the wrong type.
pub fn wrong_arg_type(helper: &str, expected: &str, got: &str) -> ScopeError {
    evaluation_failed(format!("{helper} expects {expected}, got {got}"))
}
