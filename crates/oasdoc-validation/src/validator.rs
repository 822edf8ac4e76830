//! Instance validation engine.
//!
//! Validates `serde_json::Value` instances against a [`Schema`], including
//! the combinator lists. Subschema containers that were never resolved are
//! resolved lazily through the injected [`Resolver`] without mutating the
//! document tree, so validation stays read-only.
//!
//! `oneOf` is the exacting case: every alternative is evaluated even after
//! a match is found, so that an ambiguous value is reported as a conflict
//! rather than silently accepted.

use crate::error::{
    InstancePath, SchemaPath, ValidationError, ValidationErrorKind, ValidationResult,
};
use oasdoc_model::{json_type_name, Referenceable, Resolver, Schema, SchemaRef, SchemaType};
use regex::Regex;
use serde_json::{Map, Value};
use std::borrow::Cow;

/// Validate an instance value against a schema.
pub fn validate_instance(
    value: &Value,
    schema: &Schema,
    resolver: &dyn Resolver,
) -> ValidationResult<()> {
    tracing::debug!(value_type = json_type_name(value), "validating instance");
    let mut context = ValidationContext::new(resolver);
    context.validate_value(value, schema)
}

/// Tracks the paths walked so far and the resolver used for lazy subschema
/// resolution.
pub struct ValidationContext<'a> {
    resolver: &'a dyn Resolver,
    instance_path: InstancePath,
    schema_path: SchemaPath,
}

impl<'a> ValidationContext<'a> {
    pub fn new(resolver: &'a dyn Resolver) -> Self {
        Self {
            resolver,
            instance_path: InstancePath::new(),
            schema_path: SchemaPath::new(),
        }
    }

    fn error(&self, kind: ValidationErrorKind) -> ValidationError {
        ValidationError {
            kind,
            instance_path: self.instance_path.clone(),
            schema_path: self.schema_path.clone(),
        }
    }

    fn mismatch(&self, message: impl Into<String>) -> ValidationError {
        self.error(ValidationErrorKind::Mismatch {
            message: message.into(),
        })
    }

    fn with_instance_key<F, R>(&mut self, key: &str, f: F) -> R
    where
        F: FnOnce(&mut Self) -> R,
    {
        self.instance_path.push_key(key);
        let result = f(self);
        self.instance_path.pop();
        result
    }

    fn with_instance_index<F, R>(&mut self, index: usize, f: F) -> R
    where
        F: FnOnce(&mut Self) -> R,
    {
        self.instance_path.push_index(index);
        let result = f(self);
        self.instance_path.pop();
        result
    }

    fn with_schema_path<F, R>(&mut self, segment: &str, f: F) -> R
    where
        F: FnOnce(&mut Self) -> R,
    {
        self.schema_path.push(segment);
        let result = f(self);
        self.schema_path.pop();
        result
    }

    /// Borrow a subschema's resolved target, or decode its fragment through
    /// the resolver. The container itself is never mutated.
    fn subschema<'s>(&self, subschema: &'s SchemaRef) -> ValidationResult<Cow<'s, Schema>> {
        if let Some(target) = subschema.target() {
            return Ok(Cow::Borrowed(target));
        }
        let pointer = subschema.pointer();
        let fragment = self.resolver.fragment(pointer).ok_or_else(|| {
            self.error(ValidationErrorKind::BrokenRef {
                pointer: pointer.to_string(),
                reason: "no fragment at this pointer".to_string(),
            })
        })?;
        let schema = Schema::from_value(&fragment).map_err(|err| {
            self.error(ValidationErrorKind::BrokenRef {
                pointer: pointer.to_string(),
                reason: err.to_string(),
            })
        })?;
        Ok(Cow::Owned(schema))
    }

    /// Whether the value satisfies the schema, evaluated in a probe context
    /// whose errors are discarded.
    fn probe(&self, value: &Value, schema: &Schema) -> bool {
        let mut probe = ValidationContext {
            resolver: self.resolver,
            instance_path: self.instance_path.clone(),
            schema_path: self.schema_path.clone(),
        };
        probe.validate_value(value, schema).is_ok()
    }

    pub fn validate_value(&mut self, value: &Value, schema: &Schema) -> ValidationResult<()> {
        if !schema.enum_values.is_empty() && !schema.enum_values.contains(value) {
            return Err(self.mismatch("value is not one of the allowed enum values"));
        }
        if let Some(expected) = schema.schema_type {
            if !type_matches(expected, value) {
                return Err(self.mismatch(format!(
                    "expected {}, got {}",
                    expected.as_str(),
                    json_type_name(value)
                )));
            }
        }
        match value {
            Value::String(s) => self.check_string(s, schema)?,
            Value::Number(_) => self.check_number(value, schema)?,
            Value::Array(items) => self.check_array(items, schema)?,
            Value::Object(entries) => self.check_object(entries, schema)?,
            _ => {}
        }
        if !schema.all_of.is_empty() {
            self.with_schema_path("allOf", |ctx| ctx.validate_all_of(value, &schema.all_of))?;
        }
        if !schema.any_of.is_empty() {
            self.with_schema_path("anyOf", |ctx| ctx.validate_any_of(value, &schema.any_of))?;
        }
        if !schema.one_of.is_empty() {
            self.with_schema_path("oneOf", |ctx| ctx.validate_one_of(value, &schema.one_of))?;
        }
        Ok(())
    }

    fn check_string(&mut self, s: &str, schema: &Schema) -> ValidationResult<()> {
        if let Some(min) = schema.min_length {
            if s.len() < min {
                return Err(self.mismatch(format!(
                    "string length {} is less than minimum {min}",
                    s.len()
                )));
            }
        }
        if let Some(max) = schema.max_length {
            if s.len() > max {
                return Err(self.mismatch(format!(
                    "string length {} is greater than maximum {max}",
                    s.len()
                )));
            }
        }
        if let Some(pattern) = &schema.pattern {
            let re = Regex::new(pattern)
                .map_err(|err| self.mismatch(format!("invalid pattern {pattern:?}: {err}")))?;
            if !re.is_match(s) {
                return Err(
                    self.mismatch(format!("string {s:?} does not match pattern {pattern:?}"))
                );
            }
        }
        Ok(())
    }

    fn check_number(&mut self, value: &Value, schema: &Schema) -> ValidationResult<()> {
        let Some(number) = value.as_f64() else {
            return Ok(());
        };
        if let Some(min) = schema.minimum {
            if number < min {
                return Err(self.mismatch(format!("number {number} is less than minimum {min}")));
            }
        }
        if let Some(max) = schema.maximum {
            if number > max {
                return Err(
                    self.mismatch(format!("number {number} is greater than maximum {max}"))
                );
            }
        }
        if let Some(min) = schema.exclusive_minimum {
            if number <= min {
                return Err(self.mismatch(format!("number {number} is not greater than {min}")));
            }
        }
        if let Some(max) = schema.exclusive_maximum {
            if number >= max {
                return Err(self.mismatch(format!("number {number} is not less than {max}")));
            }
        }
        Ok(())
    }

    fn check_array(&mut self, items: &[Value], schema: &Schema) -> ValidationResult<()> {
        let Some(item_schema) = &schema.items else {
            return Ok(());
        };
        let resolved = self.subschema(item_schema)?;
        for (index, item) in items.iter().enumerate() {
            self.with_instance_index(index, |ctx| ctx.validate_value(item, &resolved))?;
        }
        Ok(())
    }

    fn check_object(
        &mut self,
        entries: &Map<String, Value>,
        schema: &Schema,
    ) -> ValidationResult<()> {
        for name in &schema.required {
            if !entries.contains_key(name) {
                return Err(self.mismatch(format!("missing required property {name:?}")));
            }
        }
        for (name, property) in &schema.properties {
            let Some(child) = entries.get(name) else {
                continue;
            };
            let resolved = self.subschema(property)?;
            self.with_instance_key(name, |ctx| ctx.validate_value(child, &resolved))?;
        }
        Ok(())
    }

    /// Every alternative must accept the value; the first failure wins. A
    /// member that cannot be resolved is an outright failure, since every
    /// member must be checkable.
    fn validate_all_of(
        &mut self,
        value: &Value,
        alternatives: &[SchemaRef],
    ) -> ValidationResult<()> {
        for alternative in alternatives {
            let schema = self.subschema(alternative)?;
            self.validate_value(value, &schema)?;
        }
        Ok(())
    }

    /// At least one alternative must accept the value; multiple matches are
    /// fine. Unresolvable alternatives are non-matching unless none
    /// resolves.
    fn validate_any_of(
        &mut self,
        value: &Value,
        alternatives: &[SchemaRef],
    ) -> ValidationResult<()> {
        let mut broken = 0usize;
        let mut first_broken = None;
        for alternative in alternatives {
            match self.subschema(alternative) {
                Err(err) => {
                    if first_broken.is_none() {
                        first_broken = Some(err);
                    }
                    broken += 1;
                }
                Ok(schema) => {
                    if self.probe(value, &schema) {
                        return Ok(());
                    }
                }
            }
        }
        if broken == alternatives.len() {
            if let Some(err) = first_broken {
                return Err(err);
            }
        }
        Err(self.error(ValidationErrorKind::NoMatchingAlternative {
            combinator: "anyOf",
            tried: alternatives.len(),
        }))
    }

    /// Exactly one alternative must accept the value. All alternatives are
    /// evaluated, even after a match, so over-matching is diagnosed as a
    /// conflict.
    fn validate_one_of(
        &mut self,
        value: &Value,
        alternatives: &[SchemaRef],
    ) -> ValidationResult<()> {
        let mut matched = Vec::new();
        let mut broken = Vec::new();
        for (index, alternative) in alternatives.iter().enumerate() {
            let schema = match self.subschema(alternative) {
                Ok(schema) => schema,
                Err(err) => {
                    broken.push(err);
                    continue;
                }
            };
            if self.probe(value, &schema) {
                matched.push(index);
            }
        }
        if broken.len() == alternatives.len() {
            return Err(broken.swap_remove(0));
        }
        match matched.len() {
            1 => Ok(()),
            0 => Err(self.error(ValidationErrorKind::NoMatchingAlternative {
                combinator: "oneOf",
                tried: alternatives.len(),
            })),
            _ => Err(self.error(ValidationErrorKind::OneOfConflict { matched })),
        }
    }
}

fn type_matches(expected: SchemaType, value: &Value) -> bool {
    match expected {
        SchemaType::String => value.is_string(),
        SchemaType::Number => value.is_number(),
        SchemaType::Integer => value.is_i64() || value.is_u64(),
        SchemaType::Boolean => value.is_boolean(),
        SchemaType::Array => value.is_array(),
        SchemaType::Object => value.is_object(),
        SchemaType::Null => value.is_null(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oasdoc_model::Components;
    use serde_json::json;

    fn schema(node: Value) -> Schema {
        Schema::from_value(&node).unwrap()
    }

    #[test]
    fn type_tag_mismatch_is_reported() {
        let registry = Components::new();
        let s = schema(json!({"type": "boolean"}));

        assert!(validate_instance(&json!(true), &s, &registry).is_ok());
        let err = validate_instance(&json!("yes"), &s, &registry).unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::Mismatch {
            message: "expected boolean, got string".to_string()
        });
    }

    #[test]
    fn string_bounds_and_pattern() {
        let registry = Components::new();
        let s = schema(json!({
            "type": "string",
            "minLength": 3,
            "maxLength": 8,
            "pattern": "^[a-z]+$"
        }));

        assert!(validate_instance(&json!("hello"), &s, &registry).is_ok());
        assert!(validate_instance(&json!("hi"), &s, &registry).is_err());
        assert!(validate_instance(&json!("toolongvalue"), &s, &registry).is_err());
        assert!(validate_instance(&json!("UPPER"), &s, &registry).is_err());
    }

    #[test]
    fn numeric_bounds() {
        let registry = Components::new();
        let s = schema(json!({
            "type": "number",
            "minimum": 0,
            "exclusiveMaximum": 100
        }));

        assert!(validate_instance(&json!(0), &s, &registry).is_ok());
        assert!(validate_instance(&json!(99.5), &s, &registry).is_ok());
        assert!(validate_instance(&json!(-1), &s, &registry).is_err());
        assert!(validate_instance(&json!(100), &s, &registry).is_err());
    }

    #[test]
    fn integer_rejects_fractional_values() {
        let registry = Components::new();
        let s = schema(json!({"type": "integer"}));

        assert!(validate_instance(&json!(5), &s, &registry).is_ok());
        assert!(validate_instance(&json!(5.5), &s, &registry).is_err());
    }

    #[test]
    fn required_and_nested_properties() {
        let registry = Components::new();
        let s = schema(json!({
            "type": "object",
            "required": ["name"],
            "properties": {
                "name": {"type": "string"},
                "age": {"type": "integer", "minimum": 0}
            }
        }));

        assert!(validate_instance(&json!({"name": "kit"}), &s, &registry).is_ok());

        let err = validate_instance(&json!({"age": 3}), &s, &registry).unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::Mismatch {
            message: "missing required property \"name\"".to_string()
        });

        let err = validate_instance(&json!({"name": "kit", "age": -1}), &s, &registry)
            .unwrap_err();
        assert_eq!(err.instance_path.to_string(), "age");
    }

    #[test]
    fn array_items_recurse_with_index_paths() {
        let registry = Components::new();
        let s = schema(json!({
            "type": "array",
            "items": {"type": "string", "minLength": 2}
        }));

        assert!(validate_instance(&json!(["ab", "cd"]), &s, &registry).is_ok());
        let err = validate_instance(&json!(["ab", "x"]), &s, &registry).unwrap_err();
        assert_eq!(err.instance_path.to_string(), "[1]");
    }

    #[test]
    fn enum_membership() {
        let registry = Components::new();
        let s = schema(json!({"enum": ["red", "green", "blue"]}));

        assert!(validate_instance(&json!("green"), &s, &registry).is_ok());
        assert!(validate_instance(&json!("purple"), &s, &registry).is_err());
    }
}
