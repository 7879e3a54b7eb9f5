//! Process-wide root scope.
//!
//! Created once on first use, never torn down; every other scope
//! descends from it. Pre-populated with portability helpers bound under
//! internal (`__`-prefixed) names, so they resolve everywhere but never
//! show up in exports.

use std::sync::OnceLock;

use rustc_hash::FxHashMap;
use scope_ir::SharedInterner;

use crate::environment::{Bindings, Scope, SharedScope};
use crate::errors::{wrong_arg_count, wrong_arg_range, wrong_arg_type, EvalResult, ScopeError};
use crate::eval::{CallFrame, Receiver};
use crate::value::{CallableValue, Value};

static ROOT: OnceLock<SharedScope> = OnceLock::new();

/// The process-wide root scope.
///
/// Initialization is guarded by `OnceLock`, so concurrent first access
/// builds it exactly once.
pub fn root() -> &'static SharedScope {
    ROOT.get_or_init(build_root)
}

/// Extend the root scope; sugar for `root().extend(bindings)`.
pub fn create(bindings: Bindings) -> Result<SharedScope, ScopeError> {
    root().extend(bindings)
}

fn build_root() -> SharedScope {
    tracing::debug!("initializing root scope");
    let interner = SharedInterner::new();
    let list = interner.intern("list");
    let item = interner.intern("item");
    let from = interner.intern("from");
    let to = interner.intern("to");
    let callable = interner.intern("callable");
    let this = interner.intern("this");
    let map = interner.intern("map");
    let key = interner.intern("key");
    let child = interner.intern("child");
    let parent = interner.intern("parent");

    let helpers: Vec<(&'static str, Value)> = vec![
        (
            "__slice",
            Value::Callable(CallableValue::new(vec![list, from, to], helper_slice)),
        ),
        (
            "__bind",
            Value::Callable(CallableValue::new(vec![callable, this], helper_bind)),
        ),
        (
            "__index_of",
            Value::Callable(CallableValue::new(vec![list, item], helper_index_of)),
        ),
        (
            "__has_prop",
            Value::Callable(CallableValue::new(vec![map, key], helper_has_prop)),
        ),
        (
            "__extends",
            Value::Callable(CallableValue::new(vec![child, parent], helper_extends)),
        ),
    ];

    Scope::bootstrap(interner, helpers)
}

fn expect_list<'a>(helper: &str, value: &'a Value) -> Result<&'a [Value], ScopeError> {
    value
        .as_list()
        .ok_or_else(|| wrong_arg_type(helper, "a list", value.type_name()))
}

fn expect_int(helper: &str, value: &Value) -> Result<i64, ScopeError> {
    value
        .as_int()
        .ok_or_else(|| wrong_arg_type(helper, "an int", value.type_name()))
}

/// Clamp a possibly-negative index into `0..=len`.
fn clamp_index(index: i64, len: usize) -> usize {
    let len_i = len as i64;
    let resolved = if index < 0 { len_i + index } else { index };
    usize::try_from(resolved.clamp(0, len_i)).unwrap_or(0)
}

/// `__slice(list, from[, to])`: sub-list copy; negative indices count
/// from the end, out-of-range indices clamp.
fn helper_slice(frame: &CallFrame<'_>) -> EvalResult {
    if !(2..=3).contains(&frame.args.len()) {
        return Err(wrong_arg_range("__slice", 2, 3, frame.args.len()));
    }
    let items = expect_list("__slice", &frame.args[0])?;
    let from = clamp_index(expect_int("__slice", &frame.args[1])?, items.len());
    let to = match frame.args.get(2) {
        Some(v) => clamp_index(expect_int("__slice", v)?, items.len()),
        None => items.len(),
    };
    let slice = if from < to { items[from..to].to_vec() } else { Vec::new() };
    Ok(Value::list(slice))
}

/// `__bind(callable, this)`: a callable permanently bound to a
/// receiver value; the bound receiver replaces whatever receiver the
/// call site supplies.
fn helper_bind(frame: &CallFrame<'_>) -> EvalResult {
    if frame.args.len() != 2 {
        return Err(wrong_arg_count("__bind", 2, frame.args.len()));
    }
    let inner = frame.args[0]
        .as_callable()
        .ok_or_else(|| wrong_arg_type("__bind", "a callable", frame.args[0].type_name()))?
        .clone();
    let bound_this = frame.args[1].clone();
    let params = inner.params.clone();
    let bound = CallableValue::new(params, move |call: &CallFrame<'_>| {
        let receiver = Receiver::new().this(bound_this.clone());
        inner.invoke(&CallFrame {
            scope: call.scope,
            receiver: Some(&receiver),
            args: call.args,
        })
    });
    Ok(Value::Callable(bound))
}

/// `__index_of(list, item)`: position of the first equal element, or
/// `-1` when absent.
fn helper_index_of(frame: &CallFrame<'_>) -> EvalResult {
    if frame.args.len() != 2 {
        return Err(wrong_arg_count("__index_of", 2, frame.args.len()));
    }
    let items = expect_list("__index_of", &frame.args[0])?;
    let target = &frame.args[1];
    let position = items
        .iter()
        .position(|item| item == target)
        .and_then(|i| i64::try_from(i).ok())
        .unwrap_or(-1);
    Ok(Value::int(position))
}

/// `__has_prop(map, key)`: own-entry check.
fn helper_has_prop(frame: &CallFrame<'_>) -> EvalResult {
    if frame.args.len() != 2 {
        return Err(wrong_arg_count("__has_prop", 2, frame.args.len()));
    }
    let entries = frame.args[0]
        .as_map()
        .ok_or_else(|| wrong_arg_type("__has_prop", "a map", frame.args[0].type_name()))?;
    let key = frame.args[1]
        .as_str()
        .ok_or_else(|| wrong_arg_type("__has_prop", "a str key", frame.args[1].type_name()))?;
    Ok(Value::Bool(entries.contains_key(key)))
}

/// `__extends(child, parent)`: inheritance merge, where every parent entry
/// the child does not define is copied in, child entries win.
fn helper_extends(frame: &CallFrame<'_>) -> EvalResult {
    if frame.args.len() != 2 {
        return Err(wrong_arg_count("__extends", 2, frame.args.len()));
    }
    let child = frame.args[0]
        .as_map()
        .ok_or_else(|| wrong_arg_type("__extends", "a map", frame.args[0].type_name()))?;
    let parent = frame.args[1]
        .as_map()
        .ok_or_else(|| wrong_arg_type("__extends", "a map", frame.args[1].type_name()))?;

    let mut merged: FxHashMap<String, Value> = parent.clone();
    for (k, v) in child {
        merged.insert(k.clone(), v.clone());
    }
    Ok(Value::map(merged))
}
