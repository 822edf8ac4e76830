//! The generic reference container.
//!
//! A `$ref` object decodes into a [`Ref`] in the unresolved state, carrying
//! the pointer plus whatever vendor extensions sat beside the `$ref` key;
//! an object without `$ref` decodes into an inline container whose target is
//! available immediately. Resolution fills the target exactly once from an
//! injected [`Resolver`]; after that, validation and lookup are read-only.

use crate::error::{Error, Result};
use crate::extensions::{is_extension_key, partition_fields, Extensions};
use crate::node::json_type_name;
use crate::policy::ValidationPolicy;
use crate::resolver::Resolver;
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;
use std::collections::BTreeSet;

/// Capabilities a referenceable entity kind exposes to its container.
///
/// Kinds without an extensions concept of their own (Header) keep the
/// default `extensions` implementation.
pub trait Referenceable: Serialize + Sized {
    /// Kind name used in diagnostics.
    const KIND: &'static str;

    /// Decode an inline value or a resolved fragment from a raw node.
    fn from_value(node: &Value) -> Result<Self>;

    /// The kind's own vendor extensions, for kinds that carry them.
    fn extensions(&self) -> Option<&Extensions> {
        None
    }

    /// By-name lookup of a structural field the kind recognizes.
    fn lookup(&self, key: &str) -> Option<Value>;

    /// Structural validation of a decoded value. Containers reached through
    /// this value are validated under the same policy.
    fn validate(&self, policy: &ValidationPolicy) -> Result<()>;
}

/// Resolution state of a container's target.
#[derive(Debug, Clone, PartialEq)]
pub enum Target<T> {
    Unresolved,
    Resolved(Box<T>),
}

/// A reference to, or inline occurrence of, a reusable document fragment.
#[derive(Debug, Clone, PartialEq)]
pub struct Ref<T: Referenceable> {
    pointer: String,
    target: Target<T>,
    extensions: Extensions,
    foreign_fields: BTreeSet<String>,
}

impl<T: Referenceable> Ref<T> {
    /// An inline container: no pointer, target available immediately. The
    /// value's own extensions live on the target, not on the container.
    pub fn inline(value: T) -> Self {
        Self {
            pointer: String::new(),
            target: Target::Resolved(Box::new(value)),
            extensions: Extensions::new(),
            foreign_fields: BTreeSet::new(),
        }
    }

    /// An unresolved reference container for a pointer.
    pub fn reference(pointer: impl Into<String>) -> Self {
        Self {
            pointer: pointer.into(),
            target: Target::Unresolved,
            extensions: Extensions::new(),
            foreign_fields: BTreeSet::new(),
        }
    }

    /// Decode a raw object node. A `$ref` key makes this a reference
    /// container and its siblings are partitioned into extensions and
    /// foreign fields; otherwise the node decodes inline as `T`.
    pub fn from_value(node: &Value) -> Result<Self> {
        let object = node.as_object().ok_or_else(|| Error::Invalid {
            kind: T::KIND,
            message: format!("expected an object, got {}", json_type_name(node)),
        })?;
        match object.get("$ref") {
            None => Ok(Self::inline(T::from_value(node)?)),
            Some(Value::String(pointer)) if !pointer.is_empty() => {
                let siblings = object.iter().filter(|(name, _)| name.as_str() != "$ref");
                let (extensions, foreign_fields) = partition_fields(siblings);
                Ok(Self {
                    pointer: pointer.clone(),
                    target: Target::Unresolved,
                    extensions,
                    foreign_fields,
                })
            }
            Some(_) => Err(Error::Invalid {
                kind: T::KIND,
                message: "field \"$ref\" must be a non-empty string".to_string(),
            }),
        }
    }

    pub fn is_reference(&self) -> bool {
        !self.pointer.is_empty()
    }

    pub fn pointer(&self) -> &str {
        &self.pointer
    }

    pub fn target(&self) -> Option<&T> {
        match &self.target {
            Target::Resolved(target) => Some(target),
            Target::Unresolved => None,
        }
    }

    /// Extensions captured beside the `$ref` key. Empty for inline
    /// containers, whose extensions live on the target.
    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    /// Names of sibling fields that were neither `$ref` nor extensions.
    pub fn foreign_fields(&self) -> &BTreeSet<String> {
        &self.foreign_fields
    }

    /// Install a resolved target directly. Set-once: a present target is
    /// never replaced.
    pub fn set_target(&mut self, value: T) {
        if matches!(self.target, Target::Unresolved) {
            self.target = Target::Resolved(Box::new(value));
        }
    }

    /// Resolve the pointer against the injected resolver and decode the
    /// fragment as `T`. Idempotent: inline and already-resolved containers
    /// are left untouched.
    pub fn resolve(&mut self, resolver: &dyn Resolver) -> Result<()> {
        if self.pointer.is_empty() || matches!(self.target, Target::Resolved(_)) {
            return Ok(());
        }
        tracing::debug!(pointer = %self.pointer, kind = T::KIND, "resolving reference");
        let fragment = resolver
            .fragment(&self.pointer)
            .ok_or_else(|| Error::BrokenRef {
                pointer: self.pointer.clone(),
                reason: "no fragment at this pointer".to_string(),
            })?;
        let value = T::from_value(&fragment).map_err(|err| Error::BrokenRef {
            pointer: self.pointer.clone(),
            reason: err.to_string(),
        })?;
        self.target = Target::Resolved(Box::new(value));
        Ok(())
    }

    /// By-name lookup across the container and its target. A sibling
    /// extension always wins over the target's same-named extension.
    pub fn get(&self, key: &str) -> Result<Value> {
        if is_extension_key(key) {
            if let Some(value) = self.extensions.get(key) {
                return Ok(value.clone());
            }
        }
        if let Some(target) = self.target() {
            if let Some(value) = target.lookup(key) {
                return Ok(value);
            }
            if let Some(value) = target.extensions().and_then(|ext| ext.get(key)) {
                return Ok(value.clone());
            }
        }
        Err(Error::UnknownKey {
            key: key.to_string(),
        })
    }

    /// Validate the container under a sibling-field policy. Sibling
    /// violations are reported before resolution status is considered; a
    /// clean, resolved container delegates to the target's own checks.
    pub fn validate(&self, policy: &ValidationPolicy) -> Result<()> {
        let mut violations: BTreeSet<&str> = self
            .foreign_fields
            .iter()
            .map(String::as_str)
            .filter(|name| !policy.is_sibling_allowed(name))
            .collect();
        if policy.prohibits_extensions_with_ref() && self.is_reference() {
            violations.extend(self.extensions.keys().map(String::as_str));
        }
        if !violations.is_empty() {
            return Err(Error::ExtraSiblingFields {
                fields: violations.into_iter().map(str::to_string).collect(),
            });
        }
        match &self.target {
            Target::Resolved(target) => target.validate(policy),
            Target::Unresolved => Err(Error::UnresolvedRef {
                pointer: self.pointer.clone(),
            }),
        }
    }
}

impl<T: Referenceable> Serialize for Ref<T> {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if self.is_reference() {
            let mut map = serializer.serialize_map(Some(1 + self.extensions.len()))?;
            map.serialize_entry("$ref", &self.pointer)?;
            for (name, value) in &self.extensions {
                map.serialize_entry(name, value)?;
            }
            map.end()
        } else {
            match &self.target {
                Target::Resolved(target) => target.serialize(serializer),
                Target::Unresolved => serializer.serialize_map(Some(0))?.end(),
            }
        }
    }
}
