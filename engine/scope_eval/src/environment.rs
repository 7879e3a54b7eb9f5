//! Scope chain with shared binding cells.
//!
//! Each scope owns one cell per binding it declares; descendants resolve
//! inherited names against the ancestor's cell by shared reference, so a
//! `set` issued anywhere in the chain mutates the declared cell and is
//! immediately visible to every scope that can see the name. The scope
//! itself is immutable after construction: only cell contents change.

// Arc is the implementation of SharedCell and SharedScope.
#![expect(
    clippy::disallowed_types,
    reason = "Arc is the implementation of SharedCell and SharedScope"
)]

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use scope_ir::{Name, SharedInterner};

use crate::encode::literalize;
use crate::errors::{
    immutable_binding, name_collision, reserved_name, unresolved_name, EvalResult, ScopeError,
};
use crate::eval::SharedHost;
use crate::value::Value;

/// Whether a binding's cell may be rewritten after construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BindingKind {
    /// Mutable binding; `set` rewrites the owning cell in place.
    Local,
    /// Constant binding; its source text is frozen at construction and
    /// the cell is never rewritten.
    Literal,
}

/// One binding cell, shared by every scope that can resolve its name.
pub(crate) struct SharedCell(Arc<RwLock<Value>>);

impl SharedCell {
    fn new(value: Value) -> Self {
        SharedCell(Arc::new(RwLock::new(value)))
    }

    /// Read the current value (cloned out under the cell lock).
    fn get(&self) -> Value {
        self.0.read().clone()
    }

    fn set(&self, value: Value) {
        *self.0.write() = value;
    }
}

impl Clone for SharedCell {
    fn clone(&self) -> Self {
        SharedCell(Arc::clone(&self.0))
    }
}

impl fmt::Debug for SharedCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SharedCell").field(&*self.0.read()).finish()
    }
}

/// A binding owned by one scope.
#[derive(Clone, Debug)]
struct Binding {
    cell: SharedCell,
    kind: BindingKind,
    /// Frozen literal source, produced once at construction.
    /// `None` for locals.
    source: Option<Box<str>>,
}

/// Declarations for a new scope, accumulated in order.
#[derive(Default)]
pub struct Bindings {
    locals: Vec<(String, Value)>,
    literals: Vec<(String, Value)>,
    host: Option<SharedHost>,
}

impl Bindings {
    /// Start an empty declaration block.
    pub fn new() -> Self {
        Bindings::default()
    }

    /// Declare a mutable binding.
    #[must_use]
    pub fn local(mut self, name: impl Into<String>, value: Value) -> Self {
        self.locals.push((name.into(), value));
        self
    }

    /// Declare a constant binding. Its value must be encodable; the
    /// encoder runs at `extend` time and freezes the source text.
    #[must_use]
    pub fn literal(mut self, name: impl Into<String>, value: Value) -> Self {
        self.literals.push((name.into(), value));
        self
    }

    /// Install an expression host for the new scope and its descendants,
    /// overriding whatever the parent chain carries.
    #[must_use]
    pub fn host(mut self, host: SharedHost) -> Self {
        self.host = Some(host);
        self
    }
}

/// One node in the binding-environment chain.
///
/// Built by [`SharedScope::extend`]; immutable once built. The root of
/// every chain is the process-wide singleton from [`crate::root`].
pub struct Scope {
    parent: Option<SharedScope>,
    bindings: FxHashMap<Name, Binding>,
    /// Every name visible from this scope, own names first, then the
    /// parent's full list.
    names: Vec<Name>,
    interner: SharedInterner,
    host: Option<SharedHost>,
}

/// Shared handle to a scope.
///
/// Scopes are shared between their creator and every descendant that
/// depends on them for name resolution, so the handle is the unit of
/// ownership; `Scope` itself is never passed around by value.
#[derive(Clone)]
pub struct SharedScope(Arc<Scope>);

impl SharedScope {
    /// Extend this scope with a new child scope.
    ///
    /// Validation runs to completion before any cell is allocated, so a
    /// failed `extend` installs nothing: reserved names are rejected,
    /// then any name duplicated in the block or already visible from the
    /// parent chain. Literal values are encoded here, once; a value with
    /// no literal form aborts construction.
    #[tracing::instrument(level = "debug", skip_all, fields(
        locals = bindings.locals.len(),
        literals = bindings.literals.len(),
    ))]
    pub fn extend(&self, bindings: Bindings) -> Result<SharedScope, ScopeError> {
        Scope::build(Some(self.clone()), self.0.interner.clone(), bindings)
    }

    /// Resolve a name anywhere in the chain and return its value.
    pub fn get(&self, name: &str) -> EvalResult {
        match self.find_binding(name) {
            Some(binding) => Ok(binding.cell.get()),
            None => Err(unresolved_name(name)),
        }
    }

    /// Assign to a binding anywhere in the chain, by reference.
    ///
    /// The value transits as-is; nothing is re-encoded, so live
    /// ([`Value::Opaque`]) values are safe to pass through. `set` never
    /// introduces bindings and never rewrites a literal.
    pub fn set(&self, name: &str, value: Value) -> Result<(), ScopeError> {
        let binding = self.find_binding(name).ok_or_else(|| unresolved_name(name))?;
        if binding.kind == BindingKind::Literal {
            return Err(immutable_binding(name));
        }
        tracing::trace!(name, "set binding");
        binding.cell.set(value);
        Ok(())
    }

    /// Assign with literal transit: the value is first run through the
    /// encoder, so only values with a deterministic source form pass.
    pub fn set_literal(&self, name: &str, value: Value) -> Result<(), ScopeError> {
        literalize(&value)?;
        self.set(name, value)
    }

    /// Batch assignment; pairs apply independently and in order, and the
    /// first failure stops the batch.
    pub fn set_many<S: AsRef<str>>(
        &self,
        pairs: impl IntoIterator<Item = (S, Value)>,
    ) -> Result<(), ScopeError> {
        for (name, value) in pairs {
            self.set(name.as_ref(), value)?;
        }
        Ok(())
    }

    /// Every name visible from this scope, own names first.
    pub fn names(&self) -> Vec<&'static str> {
        self.0
            .names
            .iter()
            .map(|&n| self.0.interner.lookup(n))
            .collect()
    }

    /// Visible names minus the internal ones (`_`-prefixed).
    pub fn exports(&self) -> Vec<&'static str> {
        self.names()
            .into_iter()
            .filter(|n| !n.starts_with('_'))
            .collect()
    }

    /// The frozen source text of a literal binding, if `name` resolves
    /// to one.
    pub fn literal_source(&self, name: &str) -> Option<&str> {
        self.find_binding(name).and_then(|b| b.source.as_deref())
    }

    /// The interner shared by this chain.
    pub fn interner(&self) -> &SharedInterner {
        &self.0.interner
    }

    pub(crate) fn host(&self) -> Option<&SharedHost> {
        self.0.host.as_ref()
    }

    /// Walk the chain looking for the scope that owns `name`.
    fn find_binding(&self, name: &str) -> Option<&Binding> {
        // A never-interned name was never bound anywhere.
        let name = self.0.interner.find(name)?;
        let mut scope: &Scope = &self.0;
        loop {
            if let Some(binding) = scope.bindings.get(&name) {
                return Some(binding);
            }
            scope = scope.parent.as_ref()?.0.as_ref();
        }
    }

    /// Identity comparison for scope handles.
    pub fn ptr_eq(&self, other: &SharedScope) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for SharedScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedScope")
            .field("own", &self.0.bindings.len())
            .field("visible", &self.0.names.len())
            .finish()
    }
}

impl Scope {
    /// Install the root scope's fixed bindings without validation.
    ///
    /// Only the root bootstrap uses this; the helper names are static,
    /// distinct, and outside the reserved set, so validation cannot fail
    /// and the singleton constructor stays infallible.
    pub(crate) fn bootstrap(
        interner: SharedInterner,
        locals: Vec<(&'static str, Value)>,
    ) -> SharedScope {
        let mut table = FxHashMap::default();
        let mut names = Vec::with_capacity(locals.len());
        for (text, value) in locals {
            let name = interner.intern(text);
            names.push(name);
            table.insert(
                name,
                Binding {
                    cell: SharedCell::new(value),
                    kind: BindingKind::Local,
                    source: None,
                },
            );
        }
        SharedScope(Arc::new(Scope {
            parent: None,
            bindings: table,
            names,
            interner,
            host: None,
        }))
    }

    /// Build a scope: validate everything, then allocate cells.
    pub(crate) fn build(
        parent: Option<SharedScope>,
        interner: SharedInterner,
        bindings: Bindings,
    ) -> Result<SharedScope, ScopeError> {
        let Bindings {
            locals,
            literals,
            host,
        } = bindings;

        // Intern own names in declaration order: locals, then literals.
        let local_names: Vec<Name> = locals.iter().map(|(n, _)| interner.intern(n)).collect();
        let literal_names: Vec<Name> = literals.iter().map(|(n, _)| interner.intern(n)).collect();
        let own_texts = || {
            local_names
                .iter()
                .copied()
                .zip(locals.iter().map(|(n, _)| n.as_str()))
                .chain(
                    literal_names
                        .iter()
                        .copied()
                        .zip(literals.iter().map(|(n, _)| n.as_str())),
                )
        };

        // Validation completes fully before any cell exists.
        for (name, text) in own_texts() {
            if interner.is_reserved(name) {
                return Err(reserved_name(text));
            }
        }
        let mut seen: Vec<Name> = Vec::with_capacity(local_names.len() + literal_names.len());
        for (name, text) in own_texts() {
            if seen.contains(&name) {
                return Err(name_collision(text));
            }
            seen.push(name);
        }
        if let Some(parent) = &parent {
            for (name, text) in own_texts() {
                if parent.0.names.contains(&name) {
                    return Err(name_collision(text));
                }
            }
        }

        // Literal encoding is part of construction; failure installs nothing.
        let mut encoded: Vec<Box<str>> = Vec::with_capacity(literals.len());
        for (_, value) in &literals {
            encoded.push(literalize(value)?.into_boxed_str());
        }

        let mut table = FxHashMap::default();
        for (name, (_, value)) in local_names.iter().copied().zip(locals) {
            table.insert(
                name,
                Binding {
                    cell: SharedCell::new(value),
                    kind: BindingKind::Local,
                    source: None,
                },
            );
        }
        for ((name, (_, value)), source) in
            literal_names.iter().copied().zip(literals).zip(encoded)
        {
            table.insert(
                name,
                Binding {
                    cell: SharedCell::new(value),
                    kind: BindingKind::Literal,
                    source: Some(source),
                },
            );
        }

        let mut names = seen;
        if let Some(parent) = &parent {
            names.extend_from_slice(&parent.0.names);
        }

        let host = host.or_else(|| parent.as_ref().and_then(|p| p.0.host.clone()));

        Ok(SharedScope(Arc::new(Scope {
            parent,
            bindings: table,
            names,
            interner,
            host,
        })))
    }
}

#[cfg(test)]
mod tests;
