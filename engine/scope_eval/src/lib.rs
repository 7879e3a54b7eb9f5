//! Scope Eval - hierarchical binding environments with host-delegated
//! expression evaluation.
//!
//! A chain of scopes, each holding named mutable bindings ("locals") and
//! named constant bindings ("literals"). Expressions evaluate with full
//! visibility into the ancestor chain, while writes mutate the cell that
//! was declared, regardless of the nesting depth they are issued from.
//!
//! # Architecture
//!
//! - `environment`: the scope chain with shared binding cells,
//!   construction validation, and `get`/`set`
//! - `eval`: `eval`/`run` with a caller-supplied [`Receiver`] context and
//!   the [`ExpressionHost`] seam for text expressions
//! - `encode`: the literal encoder turning values into embeddable source
//! - `accessor`: snapshots and the [`scope_accessors!`] typed wrapper
//! - `root`: the process-wide root scope with portability helpers
//!
//! The engine ships no expression parser: text evaluation is delegated
//! to whatever [`ExpressionHost`] the chain carries, and `get`/`set`
//! never need one.

mod accessor;
mod encode;
mod environment;
pub mod errors;
mod eval;
mod root;
mod value;

pub use encode::{literalize, normalize_callable_source};
pub use environment::{BindingKind, Bindings, Scope, SharedScope};
pub use errors::{EvalResult, ScopeError, ScopeErrorKind};
pub use eval::{CallFrame, Expr, ExpressionHost, HostEnv, HostError, Receiver, SharedHost};
pub use root::{create, root};
pub use value::{CallableValue, Heap, LiteralObject, ObjectValue, OpaqueValue, Value};

// Re-export the name types so callers rarely need scope_ir directly.
pub use scope_ir::{Name, SharedInterner, StringInterner, StringLookup, RESERVED_NAMES};

#[cfg(test)]
mod tests;
