//! A deliberately tiny stand-in for a real expression compiler.
//!
//! Understands integer literals, bare identifiers, `name = <expr>`
//! assignment, and `<expr>()` zero-argument invocation. Callable source
//! text "compiles" through a table registered by the test, which is all
//! the round-trip properties need.

use rustc_hash::FxHashMap;

use crate::{CallableValue, ExpressionHost, HostEnv, HostError, Value};

pub struct ToyHost {
    compiled: FxHashMap<String, CallableValue>,
}

impl ToyHost {
    pub fn new() -> Self {
        ToyHost {
            compiled: FxHashMap::default(),
        }
    }

    /// Register a "compiled form" for a piece of callable source text.
    #[must_use]
    pub fn define(mut self, source: impl Into<String>, callable: CallableValue) -> Self {
        self.compiled.insert(source.into(), callable);
        self
    }

    fn eval_expr(&self, source: &str, env: &HostEnv<'_>) -> Result<Value, HostError> {
        let src = source.trim();

        if let Some((lhs, rhs)) = src.split_once('=') {
            let value = self.eval_expr(rhs, env)?;
            env.assign(lhs.trim(), value).map_err(box_err)?;
            return Ok(Value::Void);
        }
        if let Some(inner) = src.strip_suffix("()") {
            let value = self.eval_expr(inner, env)?;
            let Some(callable) = value.as_callable() else {
                return Err(format!("`{inner}` is not callable").into());
            };
            return env.call(callable, &[]).map_err(box_err);
        }
        if let Ok(n) = src.parse::<i64>() {
            return Ok(Value::int(n));
        }
        if let Some(callable) = self.compiled.get(src) {
            return Ok(Value::Callable(callable.clone()));
        }
        env.resolve(src).map_err(box_err)
    }
}

impl ExpressionHost for ToyHost {
    fn execute(&self, source: &str, env: &HostEnv<'_>) -> Result<Value, HostError> {
        self.eval_expr(source, env)
    }
}

fn box_err(err: crate::ScopeError) -> HostError {
    Box::new(err)
}
