//! Runtime values held by scope bindings.
//!
//! Heap-allocated variants go through factory methods on `Value`; the
//! `Heap<T>` wrapper has a private constructor, so external code cannot
//! build heap values directly.
//!
//! # Thread Safety
//!
//! All shared variants use `Arc` internally, so values (and therefore
//! whole scope chains) are `Send + Sync` and the root scope can live in
//! process-wide static storage.

// Arc is the implementation of Heap and the shared value variants.
#![expect(
    clippy::disallowed_types,
    reason = "Arc is the implementation of Heap and the shared value variants"
)]

use std::any::Any;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use scope_ir::{Name, StringLookup};

use crate::errors::EvalResult;
use crate::eval::CallFrame;

/// Shared heap storage with factory-only construction.
#[repr(transparent)]
pub struct Heap<T>(Arc<T>);

impl<T> Heap<T> {
    /// Crate-internal constructor; external code goes through the
    /// factory methods on [`Value`].
    pub(crate) fn new(value: T) -> Self {
        Heap(Arc::new(value))
    }
}

impl<T> Clone for Heap<T> {
    fn clone(&self) -> Self {
        Heap(Arc::clone(&self.0))
    }
}

impl<T> Deref for Heap<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T: fmt::Debug> fmt::Debug for Heap<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl<T: PartialEq> PartialEq for Heap<T> {
    fn eq(&self, other: &Self) -> bool {
        *self.0 == *other.0
    }
}

/// The explicit literal-conversion capability.
///
/// A value type that should be usable as a literal binding (or as the
/// payload of `set_literal`) implements this to produce its own
/// embeddable source text. The text must be deterministic for a given
/// value; the encoder freezes it once at scope construction.
pub trait LiteralObject: fmt::Debug + Send + Sync {
    /// Render this value as embeddable source text.
    fn literal(&self) -> String;
}

/// A callable value: interned parameter names, an optional textual
/// source form, and a native body.
///
/// The source form is what the literal encoder embeds; callables built
/// purely from native code have none and are not encodable.
#[derive(Clone)]
pub struct CallableValue {
    /// Parameter names.
    pub params: Vec<Name>,
    /// Textual source of the callable, if it has one.
    source: Option<Arc<str>>,
    /// Native body.
    func: Arc<dyn Fn(&CallFrame<'_>) -> EvalResult + Send + Sync>,
}

impl CallableValue {
    /// Create a callable with no source form.
    pub fn new<F>(params: Vec<Name>, func: F) -> Self
    where
        F: Fn(&CallFrame<'_>) -> EvalResult + Send + Sync + 'static,
    {
        CallableValue {
            params,
            source: None,
            func: Arc::new(func),
        }
    }

    /// Create a callable carrying its own source text.
    pub fn with_source<F>(params: Vec<Name>, source: impl Into<String>, func: F) -> Self
    where
        F: Fn(&CallFrame<'_>) -> EvalResult + Send + Sync + 'static,
    {
        CallableValue {
            params,
            source: Some(Arc::from(source.into())),
            func: Arc::new(func),
        }
    }

    /// The callable's source text, if any.
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Render the parameter names through any name lookup, for
    /// diagnostics and host-side introspection.
    pub fn param_names<'a, L: StringLookup>(&self, lookup: &'a L) -> Vec<&'a str> {
        self.params.iter().map(|&p| lookup.lookup(p)).collect()
    }

    /// Invoke the native body with the given frame.
    pub fn invoke(&self, frame: &CallFrame<'_>) -> EvalResult {
        (self.func)(frame)
    }

    /// Identity comparison: two callables are equal when they share a body.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.func, &other.func)
    }
}

impl fmt::Debug for CallableValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallableValue")
            .field("params", &self.params)
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

/// A literal-capable trait object value.
#[derive(Clone, Debug)]
pub struct ObjectValue(Arc<dyn LiteralObject>);

impl ObjectValue {
    /// Render the object's literal text.
    pub fn literal(&self) -> String {
        self.0.literal()
    }

    fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// A live value passed around by reference only.
///
/// Opaque values are deliberately not encodable: they are the payloads
/// that must transit through `set`-by-reference instead of text.
#[derive(Clone)]
pub struct OpaqueValue {
    inner: Arc<dyn Any + Send + Sync>,
    label: &'static str,
}

impl OpaqueValue {
    /// Short label used in diagnostics.
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Downcast to the concrete payload type.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }

    fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for OpaqueValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OpaqueValue({})", self.label)
    }
}

/// Runtime value in the scope engine.
#[derive(Clone, Debug)]
pub enum Value {
    // Primitives (inline, no heap allocation)
    /// Void (unit) value.
    Void,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Floating-point value.
    Float(f64),

    // Heap types (factory-only construction)
    /// String value; for the literal encoder this is already source text.
    Str(Heap<String>),
    /// List of values.
    List(Heap<Vec<Value>>),
    /// Map from string keys to values.
    Map(Heap<FxHashMap<String, Value>>),

    /// Callable value.
    Callable(CallableValue),
    /// Value exposing the literal-conversion capability.
    Object(ObjectValue),
    /// Live value with no literal form, passed by reference only.
    Opaque(OpaqueValue),
}

impl Value {
    /// Create an integer value.
    #[inline]
    pub fn int(n: i64) -> Self {
        Value::Int(n)
    }

    /// Create a string value.
    #[inline]
    pub fn string(s: impl Into<String>) -> Self {
        Value::Str(Heap::new(s.into()))
    }

    /// Create a list value.
    #[inline]
    pub fn list(items: Vec<Value>) -> Self {
        Value::List(Heap::new(items))
    }

    /// Create a map value.
    #[inline]
    pub fn map(entries: FxHashMap<String, Value>) -> Self {
        Value::Map(Heap::new(entries))
    }

    /// Create a callable value.
    #[inline]
    pub fn callable(c: CallableValue) -> Self {
        Value::Callable(c)
    }

    /// Create a literal-capable object value.
    pub fn object(obj: impl LiteralObject + 'static) -> Self {
        Value::Object(ObjectValue(Arc::new(obj)))
    }

    /// Create an opaque value around a live payload.
    pub fn opaque<T: Any + Send + Sync>(label: &'static str, payload: T) -> Self {
        Value::Opaque(OpaqueValue {
            inner: Arc::new(payload),
            label,
        })
    }

    /// Human-readable type name for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Void => "void",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Callable(_) => "callable",
            Value::Object(_) => "object",
            Value::Opaque(v) => v.label(),
        }
    }

    /// Borrow the string content, if this is a `Str`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// The integer content, if this is an `Int`.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Borrow the list content, if this is a `List`.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    /// Borrow the map content, if this is a `Map`.
    pub fn as_map(&self) -> Option<&FxHashMap<String, Value>> {
        match self {
            Value::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Borrow the callable, if this is a `Callable`.
    pub fn as_callable(&self) -> Option<&CallableValue> {
        match self {
            Value::Callable(c) => Some(c),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Void, Value::Void) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            // Identity semantics for behavior-bearing values.
            (Value::Callable(a), Value::Callable(b)) => a.ptr_eq(b),
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            (Value::Opaque(a), Value::Opaque(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

/// Display renders values for diagnostics, not for re-embedding; the
/// literal encoder is the only source-text producer.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Void => write!(f, "void"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(x) => write!(f, "{x:?}"),
            Value::Str(s) => write!(f, "{}", s.as_str()),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Value::Map(entries) => write!(f, "map({} entries)", entries.len()),
            Value::Callable(c) => write!(f, "callable/{}", c.params.len()),
            Value::Object(_) => write!(f, "object"),
            Value::Opaque(v) => write!(f, "opaque({})", v.label()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn structural_equality_for_data() {
        assert_eq!(Value::int(3), Value::int(3));
        assert_eq!(Value::string("a"), Value::string("a"));
        assert_eq!(
            Value::list(vec![Value::int(1), Value::Bool(true)]),
            Value::list(vec![Value::int(1), Value::Bool(true)]),
        );
        assert_ne!(Value::int(3), Value::Float(3.0));
    }

    #[test]
    fn identity_equality_for_callables() {
        let c = CallableValue::new(vec![], |_| Ok(Value::Void));
        let a = Value::Callable(c.clone());
        let b = Value::Callable(c);
        assert_eq!(a, b);

        let other = Value::Callable(CallableValue::new(vec![], |_| Ok(Value::Void)));
        assert_ne!(a, other);
    }

    #[test]
    fn opaque_downcasts_to_payload() {
        let v = Value::opaque("ticket", 7_u32);
        let Value::Opaque(opaque) = &v else {
            panic!("expected opaque");
        };
        assert_eq!(opaque.downcast_ref::<u32>(), Some(&7));
        assert_eq!(opaque.downcast_ref::<i64>(), None);
        assert_eq!(v.type_name(), "ticket");
    }

    #[test]
    fn display_is_diagnostic_only() {
        assert_eq!(Value::Void.to_string(), "void");
        assert_eq!(Value::Float(1.0).to_string(), "1.0");
        assert_eq!(
            Value::list(vec![Value::int(1), Value::int(2)]).to_string(),
            "[1, 2]"
        );
    }

    #[test]
    fn param_names_render_through_a_lookup() {
        use scope_ir::SharedInterner;

        let interner = SharedInterner::new();
        let list = interner.intern("list");
        let item = interner.intern("item");
        let c = CallableValue::new(vec![list, item], |_| Ok(Value::Void));
        assert_eq!(c.param_names(&*interner), vec!["list", "item"]);
    }

    #[test]
    fn accessors_reject_other_variants() {
        assert_eq!(Value::int(1).as_str(), None);
        assert_eq!(Value::string("x").as_int(), None);
        assert!(Value::Void.as_callable().is_none());
    }
}
