//! Interned binding-name identifier.

use std::fmt;

/// Interned binding name.
///
/// A plain index into the process interner. Binding environments hold
/// dozens of names, not millions, so a flat `u32` index is enough and
/// there is no shard encoding.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct Name(u32);

impl Name {
    /// Pre-interned empty string.
    pub const EMPTY: Name = Name(0);

    /// Create from a raw interner index.
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Name(raw)
    }

    /// Get the raw interner index.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Index into the interner's storage.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({})", self.0)
    }
}

impl Default for Name {
    fn default() -> Self {
        Self::EMPTY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_round_trip() {
        let name = Name::from_raw(17);
        assert_eq!(name.raw(), 17);
        assert_eq!(name.index(), 17);
    }

    #[test]
    fn empty_is_index_zero() {
        assert_eq!(Name::EMPTY.index(), 0);
        assert_eq!(Name::default(), Name::EMPTY);
    }

    #[test]
    fn usable_as_hash_key() {
        use std::collections::HashSet;
        let mut set = HashSet::new();
        set.insert(Name::from_raw(1));
        set.insert(Name::from_raw(1));
        set.insert(Name::from_raw(2));
        assert_eq!(set.len(), 2);
    }
}
