//! Scope IR - interned binding names for the scope engine.
//!
//! Every scope in a chain shares one [`SharedInterner`]; binding names are
//! compared and hashed as compact [`Name`] indices instead of strings.

mod interner;
mod name;

pub use interner::{
    InternError, SharedInterner, StringInterner, StringLookup, RESERVED_NAMES,
};
pub use name::Name;
