//! Vendor extension capture.
//!
//! Fields whose names carry the reserved `x-` prefix are vendor extensions
//! and travel with the object that declared them; any other unrecognized
//! sibling of a `$ref` key is a foreign field, tracked by name only for
//! diagnostics. Classification is pure and order-independent.

use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// Vendor extension fields, keyed by their full `x-` name.
pub type Extensions = std::collections::BTreeMap<String, Value>;

/// Whether a field name follows the reserved vendor-extension convention.
pub fn is_extension_key(name: &str) -> bool {
    name.starts_with("x-")
}

/// Partition the sibling fields of a `$ref` key into vendor extensions
/// (values retained verbatim) and foreign field names (values discarded).
pub fn partition_fields<'a, I>(fields: I) -> (Extensions, BTreeSet<String>)
where
    I: IntoIterator<Item = (&'a String, &'a Value)>,
{
    let mut extensions = Extensions::new();
    let mut foreign = BTreeSet::new();
    for (name, value) in fields {
        if is_extension_key(name) {
            extensions.insert(name.clone(), value.clone());
        } else {
            foreign.insert(name.clone());
        }
    }
    (extensions, foreign)
}

/// Collect the vendor extensions of an inline object. Unrecognized plain
/// fields are not retained here; inline values have no foreign-field set.
pub fn collect_extensions(object: &Map<String, Value>) -> Extensions {
    object
        .iter()
        .filter(|(name, _)| is_extension_key(name))
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect()
}
