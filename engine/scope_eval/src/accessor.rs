//! Accessor layer: attribute-style access without runtime property
//! injection.
//!
//! Live per-name accessors are replaced by the `get`/`set` pair plus two
//! static mechanisms: [`SharedScope::snapshot`], a one-time value copy
//! (the fallback for targets without live accessors; later `set`s are
//! *not* visible through a snapshot, only through `get`), and the
//! [`scope_accessors!`] macro, which generates a strongly-typed wrapper
//! struct at compile time.

use rustc_hash::FxHashMap;

use crate::environment::SharedScope;
use crate::value::Value;

impl SharedScope {
    /// One-time copy of every exported binding's current value.
    ///
    /// This is deliberately a snapshot, not a live view: mutating a
    /// binding afterwards does not change an already-taken snapshot.
    /// That divergence from live accessors is observable and kept.
    pub fn snapshot(&self) -> FxHashMap<String, Value> {
        let mut values = FxHashMap::default();
        for name in self.exports() {
            if let Ok(value) = self.get(name) {
                values.insert(name.to_owned(), value);
            }
        }
        values
    }
}

/// Generate a strongly-typed accessor struct over a [`SharedScope`].
///
/// Each `field => setter` pair produces a getter named after the binding
/// and a setter delegating to `set`, so bindings read and write with
/// ordinary method syntax:
///
/// ```ignore
/// scope_accessors! {
///     pub struct Counters {
///         total => set_total,
///         rate => set_rate,
///     }
/// }
///
/// let counters = Counters::new(scope);
/// counters.set_total(Value::int(10))?;
/// let total = counters.total()?;
/// ```
#[macro_export]
macro_rules! scope_accessors {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $($field:ident => $setter:ident),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            scope: $crate::SharedScope,
        }

        impl $name {
            /// Wrap a scope; bindings are resolved per call, so the
            /// wrapper stays live unlike a snapshot.
            $vis fn new(scope: $crate::SharedScope) -> Self {
                Self { scope }
            }

            /// The wrapped scope.
            $vis fn scope(&self) -> &$crate::SharedScope {
                &self.scope
            }

            $(
                $vis fn $field(&self) -> $crate::EvalResult {
                    self.scope.get(stringify!($field))
                }

                $vis fn $setter(&self, value: $crate::Value) -> Result<(), $crate::ScopeError> {
                    self.scope.set(stringify!($field), value)
                }
            )+
        }
    };
}
