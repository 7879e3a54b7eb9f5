//! Literal encoder: converts runtime values into embeddable source text.
//!
//! Strings are already source and pass through verbatim. Callables embed
//! their own source with the parameter list normalized to the canonical
//! anonymous form. Any other value must carry the [`LiteralObject`]
//! capability; there is no structural fallback.

use crate::errors::{not_encodable, ScopeError};
use crate::value::Value;

/// Convert a value into embeddable source text.
///
/// The output is deterministic for a given value; scope construction
/// freezes it once per literal binding.
pub fn literalize(value: &Value) -> Result<String, ScopeError> {
    match value {
        Value::Str(s) => Ok(s.as_str().to_owned()),
        Value::Callable(c) => match c.source() {
            Some(src) => Ok(normalize_callable_source(src)),
            None => Err(not_encodable("sourceless callable")),
        },
        Value::Object(obj) => Ok(obj.literal()),
        other => Err(not_encodable(other.type_name())),
    }
}

/// Normalize callable source to an anonymous expression form.
///
/// A callable may declare a name for itself (`fn total(x)`); the name is
/// stripped so the encoded text is reusable wherever an anonymous
/// expression fits, and the whole body is wrapped in parens.
pub fn normalize_callable_source(source: &str) -> String {
    let trimmed = source.trim();
    let normalized = strip_declared_name(trimmed).unwrap_or_else(|| trimmed.to_owned());
    format!("({normalized})")
}

/// Rewrite `fn <name>(` to `fn (`, leaving already-anonymous sources
/// untouched. Returns `None` when the source does not start with a
/// named-callable header.
fn strip_declared_name(source: &str) -> Option<String> {
    let rest = source.strip_prefix("fn")?;
    let after_ws = rest.trim_start();
    if after_ws.len() == rest.len() {
        // No whitespace after `fn`: not a named header (e.g. `fn(`).
        return None;
    }
    let name_len = after_ws
        .char_indices()
        .take_while(|(_, c)| c.is_alphanumeric() || *c == '_')
        .map(|(i, c)| i + c.len_utf8())
        .last()?;
    let tail = &after_ws[name_len..];
    if !tail.trim_start().starts_with('(') {
        return None;
    }
    Some(format!("fn {}", tail.trim_start()))
}
