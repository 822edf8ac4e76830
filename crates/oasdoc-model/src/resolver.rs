//! Pointer resolution against a component index.
//!
//! The model never interprets pointer syntax: a pointer is an opaque,
//! non-empty lookup key handed to whatever [`Resolver`] the caller injects.
//! [`Components`] is the in-memory index used by document loaders and tests.

use serde_json::Value;
use std::collections::BTreeMap;

/// Turns a pointer string into the raw fragment it designates, if the
/// current document provides one. Remote fetching is a resolver concern and
/// out of scope here: implementations either have the fragment or do not.
pub trait Resolver {
    fn fragment(&self, pointer: &str) -> Option<Value>;
}

/// In-memory component index mapping pointer strings to raw fragments.
#[derive(Debug, Clone, Default)]
pub struct Components {
    fragments: BTreeMap<String, Value>,
}

impl Components {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, pointer: impl Into<String>, fragment: Value) {
        self.fragments.insert(pointer.into(), fragment);
    }

    /// Index every fragment under the document's `components` sections, so
    /// local `#/components/<section>/<name>` pointers resolve.
    pub fn from_document(document: &Value) -> Self {
        let mut components = Self::new();
        let Some(sections) = document.get("components").and_then(Value::as_object) else {
            return components;
        };
        for (section, entries) in sections {
            let Some(entries) = entries.as_object() else {
                continue;
            };
            for (name, fragment) in entries {
                components.insert(format!("#/components/{section}/{name}"), fragment.clone());
            }
        }
        components
    }

    pub fn pointers(&self) -> impl Iterator<Item = &String> {
        self.fragments.keys()
    }
}

impl Resolver for Components {
    fn fragment(&self, pointer: &str) -> Option<Value> {
        self.fragments.get(pointer).cloned()
    }
}
