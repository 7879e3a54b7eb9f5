//! String interner for binding names.
//!
//! Provides O(1) interning and lookup with thread-safe access behind a
//! single `RwLock`. Interned strings are leaked, so lookups can hand out
//! `'static` references.

// Arc is needed for SharedInterner - the interner is shared by every scope
// in a chain and must outlive all of them.
#![expect(
    clippy::disallowed_types,
    reason = "Arc required for SharedInterner thread-safety"
)]

use super::Name;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Identifiers the evaluation machinery claims for itself.
///
/// Pre-interned so reserved-name checks are a `Name` comparison, and so
/// no user binding can ever occupy these slots. `__expr` names the
/// expression slot a text host receives; `__recv` names the receiver
/// slot grafted onto a call frame.
pub const RESERVED_NAMES: &[&str] = &["__expr", "__recv"];

struct InternTable {
    /// Map from string content to index.
    map: FxHashMap<&'static str, u32>,
    /// Storage for string contents.
    strings: Vec<&'static str>,
}

impl InternTable {
    fn with_reserved() -> Self {
        let mut table = InternTable {
            map: FxHashMap::default(),
            strings: Vec::with_capacity(64),
        };
        // Empty string at index 0, then the reserved identifiers.
        // A handful of entries cannot overflow the index space.
        let _ = table.insert("");
        for reserved in RESERVED_NAMES {
            let _ = table.insert(reserved);
        }
        table
    }

    fn insert(&mut self, s: &str) -> Result<Name, InternError> {
        let idx = u32::try_from(self.strings.len()).map_err(|_| InternError::Overflow {
            count: self.strings.len(),
        })?;
        let leaked: &'static str = Box::leak(s.to_owned().into_boxed_str());
        self.strings.push(leaked);
        self.map.insert(leaked, idx);
        Ok(Name::from_raw(idx))
    }
}

/// Error when interning a string fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternError {
    /// Interner exceeded capacity (over 4 billion strings).
    Overflow { count: usize },
}

impl std::fmt::Display for InternError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InternError::Overflow { count } => write!(
                f,
                "interner exceeded capacity: {count} strings, max is {}",
                u32::MAX
            ),
        }
    }
}

impl std::error::Error for InternError {}

/// String interner for binding names.
///
/// # Thread Safety
/// Uses a `RwLock` for concurrent read/write access. Wrap in
/// [`SharedInterner`] for sharing across scopes and threads.
pub struct StringInterner {
    table: RwLock<InternTable>,
}

impl StringInterner {
    /// Create a new interner with the reserved identifiers pre-interned.
    pub fn new() -> Self {
        StringInterner {
            table: RwLock::new(InternTable::with_reserved()),
        }
    }

    /// Try to intern a string, returning its `Name` or an error on overflow.
    pub fn try_intern(&self, s: &str) -> Result<Name, InternError> {
        // Fast path: already interned.
        {
            let guard = self.table.read();
            if let Some(&idx) = guard.map.get(s) {
                return Ok(Name::from_raw(idx));
            }
        }

        let mut guard = self.table.write();
        // Double-check after acquiring the write lock.
        if let Some(&idx) = guard.map.get(s) {
            return Ok(Name::from_raw(idx));
        }
        guard.insert(s)
    }

    /// Intern a string, returning its `Name`.
    ///
    /// # Panics
    /// Panics if the interner exceeds capacity (over 4 billion strings).
    /// Use `try_intern` for fallible interning.
    #[inline]
    pub fn intern(&self, s: &str) -> Name {
        self.try_intern(s).unwrap_or_else(|e| panic!("{e}"))
    }

    /// Look up a string without interning it.
    ///
    /// Returns `None` when the string was never interned. `get`/`set` on a
    /// scope use this so probing undeclared names allocates nothing.
    pub fn find(&self, s: &str) -> Option<Name> {
        let guard = self.table.read();
        guard.map.get(s).copied().map(Name::from_raw)
    }

    /// Look up the string for a `Name`.
    ///
    /// The returned reference is `'static` because interned strings are
    /// leaked and never deallocated.
    pub fn lookup(&self, name: Name) -> &'static str {
        let guard = self.table.read();
        guard.strings[name.index()]
    }

    /// Check whether a `Name` is one of the reserved identifiers.
    pub fn is_reserved(&self, name: Name) -> bool {
        // Reserved names occupy the indices right after the empty string.
        let idx = name.index();
        (1..=RESERVED_NAMES.len()).contains(&idx)
    }

    /// Number of interned strings.
    pub fn len(&self) -> usize {
        self.table.read().strings.len()
    }

    /// Check if the interner holds only its pre-interned entries.
    pub fn is_empty(&self) -> bool {
        self.len() <= 1 + RESERVED_NAMES.len()
    }
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}

/// Trait for looking up interned binding names.
///
/// Exists to avoid tight coupling: callers can accept any `StringLookup`
/// implementor without depending on `StringInterner` directly.
pub trait StringLookup {
    /// Look up the string for an interned name.
    fn lookup(&self, name: Name) -> &str;
}

impl StringLookup for StringInterner {
    fn lookup(&self, name: Name) -> &str {
        StringInterner::lookup(self, name)
    }
}

/// Shared interner handle, cloned into every scope in a chain.
///
/// This newtype enforces that all interner sharing goes through it,
/// preventing accidental direct `Arc<StringInterner>` usage.
#[derive(Clone)]
pub struct SharedInterner(Arc<StringInterner>);

impl SharedInterner {
    /// Create a new shared interner.
    pub fn new() -> Self {
        SharedInterner(Arc::new(StringInterner::new()))
    }
}

impl Default for SharedInterner {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Deref for SharedInterner {
    type Target = StringInterner;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
