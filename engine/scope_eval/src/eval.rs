//! Evaluator: expression execution against a scope chain with a
//! caller-supplied receiver context.
//!
//! Text expressions are delegated to the installed [`ExpressionHost`];
//! the engine supplies resolution and assignment through [`HostEnv`] and
//! specifies nothing about expression syntax. The receiver's call-scoped
//! locals and literals resolve ahead of the persistent chain for the
//! duration of one call and are never installed into any scope.

// Arc is the implementation of SharedHost.
#![expect(
    clippy::disallowed_types,
    reason = "Arc is the implementation of SharedHost"
)]

use std::sync::Arc;

use crate::encode::literalize;
use crate::environment::SharedScope;
use crate::errors::{evaluation_failed, no_host_installed, EvalResult, ScopeError};
use crate::value::{CallableValue, Value};

/// Diagnostic type produced by an expression host.
pub type HostError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The host's compile-and-execute primitive.
///
/// The engine hands the host raw source text plus a [`HostEnv`] frame
/// for name resolution; everything about expression syntax belongs to
/// the host.
pub trait ExpressionHost: Send + Sync {
    /// Compile and execute `source` against the given frame.
    fn execute(&self, source: &str, env: &HostEnv<'_>) -> Result<Value, HostError>;
}

/// Shared handle to an expression host, inherited down a scope chain.
pub type SharedHost = Arc<dyn ExpressionHost>;

/// Caller-supplied receiver context for one `eval`/`run` call.
///
/// Carries an optional implicit-receiver value plus call-scoped locals
/// and literals. Slots declared later shadow earlier ones, and literal
/// slots shadow local slots of the same name, mirroring sequential
/// declaration order.
#[derive(Default)]
pub struct Receiver {
    this: Option<Value>,
    locals: Vec<(String, Value)>,
    literals: Vec<(String, Value)>,
}

impl Receiver {
    /// Start an empty receiver context.
    pub fn new() -> Self {
        Receiver::default()
    }

    /// Bind the implicit receiver value.
    #[must_use]
    pub fn this(mut self, value: Value) -> Self {
        self.this = Some(value);
        self
    }

    /// Graft a call-scoped local.
    #[must_use]
    pub fn local(mut self, name: impl Into<String>, value: Value) -> Self {
        self.locals.push((name.into(), value));
        self
    }

    /// Graft a call-scoped literal; its value must be encodable, checked
    /// when the receiver is used.
    #[must_use]
    pub fn literal(mut self, name: impl Into<String>, value: Value) -> Self {
        self.literals.push((name.into(), value));
        self
    }

    /// The implicit receiver value, if bound.
    pub fn this_value(&self) -> Option<&Value> {
        self.this.as_ref()
    }

    /// Resolve a call-scoped slot. Literals win over locals; within each
    /// group the latest declaration wins.
    pub fn slot(&self, name: &str) -> Option<&Value> {
        self.literals
            .iter()
            .rev()
            .chain(self.locals.iter().rev())
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Encoding of literal slots happens before any execution, the same
    /// construction-before-evaluation rule scopes follow.
    fn check_literals(&self) -> Result<(), ScopeError> {
        for (_, value) in &self.literals {
            literalize(value)?;
        }
        Ok(())
    }
}

/// An expression to evaluate: raw text for the host, or a callable.
pub enum Expr {
    /// Source text, delegated to the installed host.
    Text(String),
    /// A callable; as an expression it denotes itself.
    Callable(CallableValue),
}

impl From<&str> for Expr {
    fn from(source: &str) -> Self {
        Expr::Text(source.to_owned())
    }
}

impl From<String> for Expr {
    fn from(source: String) -> Self {
        Expr::Text(source)
    }
}

impl From<CallableValue> for Expr {
    fn from(callable: CallableValue) -> Self {
        Expr::Callable(callable)
    }
}

/// The frame a callable body executes in: the scope chain it sees, the
/// receiver bound for this call, and positional arguments.
pub struct CallFrame<'a> {
    /// Scope chain visible to the body.
    pub scope: &'a SharedScope,
    /// Receiver context, if one is bound.
    pub receiver: Option<&'a Receiver>,
    /// Positional arguments.
    pub args: &'a [Value],
}

impl CallFrame<'_> {
    /// Resolve a name: receiver slots first, then the chain.
    pub fn resolve(&self, name: &str) -> EvalResult {
        if let Some(receiver) = self.receiver {
            if let Some(value) = receiver.slot(name) {
                return Ok(value.clone());
            }
        }
        self.scope.get(name)
    }
}

/// Resolution frame handed to an [`ExpressionHost`].
pub struct HostEnv<'a> {
    scope: &'a SharedScope,
    receiver: &'a Receiver,
}

impl HostEnv<'_> {
    /// Resolve a name: receiver grafts first, then the persistent chain.
    pub fn resolve(&self, name: &str) -> EvalResult {
        if let Some(value) = self.receiver.slot(name) {
            return Ok(value.clone());
        }
        self.scope.get(name)
    }

    /// Assign through the chain. Call-scoped grafts are read-only;
    /// writes to them are refused rather than silently discarded.
    pub fn assign(&self, name: &str, value: Value) -> Result<(), ScopeError> {
        if self.receiver.slot(name).is_some() {
            return Err(evaluation_failed(format!(
                "`{name}` is call-scoped and read-only"
            )));
        }
        self.scope.set(name, value)
    }

    /// The receiver bound for this call.
    pub fn receiver(&self) -> &Receiver {
        self.receiver
    }

    /// The scope the expression executes against.
    pub fn scope(&self) -> &SharedScope {
        self.scope
    }

    /// Invoke a callable within this frame.
    pub fn call(&self, callable: &CallableValue, args: &[Value]) -> EvalResult {
        callable.invoke(&CallFrame {
            scope: self.scope,
            receiver: Some(self.receiver),
            args,
        })
    }
}

impl SharedScope {
    /// Evaluate an expression with the receiver bound.
    ///
    /// A callable expression denotes itself. Text goes to the installed
    /// host; a host failure that is already a [`ScopeError`] propagates
    /// unchanged, any other diagnostic is wrapped as an evaluation
    /// failure. No host on the chain is itself an evaluation failure.
    pub fn eval(&self, receiver: &Receiver, expr: impl Into<Expr>) -> EvalResult {
        receiver.check_literals()?;
        match expr.into() {
            Expr::Callable(callable) => Ok(Value::Callable(callable)),
            Expr::Text(source) => {
                let host = self.host().ok_or_else(no_host_installed)?;
                tracing::trace!(source = source.as_str(), "eval text expression");
                let env = HostEnv {
                    scope: self,
                    receiver,
                };
                host.execute(&source, &env).map_err(|e| {
                    match e.downcast::<ScopeError>() {
                        Ok(scope_err) => *scope_err,
                        Err(other) => evaluation_failed(other.to_string()),
                    }
                })
            }
        }
    }

    /// Invoke a callable with the receiver bound and full chain
    /// visibility; sugar over the callable path of [`eval`](Self::eval).
    pub fn run(&self, receiver: &Receiver, callable: &CallableValue) -> EvalResult {
        receiver.check_literals()?;
        callable.invoke(&CallFrame {
            scope: self,
            receiver: Some(receiver),
            args: &[],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn receiver_slots_shadow_in_declaration_order() {
        let recv = Receiver::new()
            .local("x", Value::int(1))
            .local("x", Value::int(2))
            .literal("x", Value::string("three"));

        // Literal slots shadow locals; latest declaration wins per group.
        assert_eq!(recv.slot("x"), Some(&Value::string("three")));

        let recv = Receiver::new()
            .local("y", Value::int(1))
            .local("y", Value::int(2));
        assert_eq!(recv.slot("y"), Some(&Value::int(2)));
        assert_eq!(recv.slot("absent"), None);
    }

    #[test]
    fn receiver_literal_slots_must_be_encodable() {
        let recv = Receiver::new().literal("n", Value::int(1));
        assert!(recv.check_literals().is_err());

        let recv = Receiver::new().literal("s", Value::string("ok"));
        assert!(recv.check_literals().is_ok());
    }

    #[test]
    fn expr_conversions() {
        assert!(matches!(Expr::from("a + b"), Expr::Text(_)));
        assert!(matches!(
            Expr::from(CallableValue::new(vec![], |_| Ok(Value::Void))),
            Expr::Callable(_)
        ));
    }
}
