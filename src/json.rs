//! JSON encoding for handler results.
//!
//! Encoding is a structural walk over stored data: `#[derive(Serialize)]`
//! records emit their fields in declaration order, maps keep insertion order
//! (`serde_json` is built with `preserve_order`), sequences keep element order.
//! Fields of an embedded "base" record are emitted in place with
//! `#[serde(flatten)]`.
//!
//! Strings use the standard escapes (`\\`, `\"`, `\n`, `\r`, `\t`, `\b`, `\f`)
//! and `\u00xx` for the remaining control characters below 0x20. Non-finite
//! floats encode as `null`.
//!
//! Reference cycles (e.g. through `Rc`) recurse without bound.

use serde::Serialize;

/// Encode a value as compact JSON text.
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<String> {
    serde_json::to_string(value)
}
