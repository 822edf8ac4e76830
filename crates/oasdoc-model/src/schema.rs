//! Schema objects and their combinator structure.
//!
//! A schema node carries the ordinary structural constraints (type tag,
//! string and numeric bounds, pattern, enum, required/properties/items) plus
//! up to three combinator lists, each a list of subschema containers.
//! Combinator lists, once present in a document, are non-empty; an empty
//! `Vec` here means the combinator is absent.

use crate::error::{Error, Result};
use crate::extensions::{collect_extensions, Extensions};
use crate::node;
use crate::policy::ValidationPolicy;
use crate::refs::{Ref, Referenceable};
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// A schema container: a `$ref` to a reusable schema or an inline schema.
pub type SchemaRef = Ref<Schema>;

/// The JSON type tag a schema may pin its instances to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
    Null,
}

impl SchemaType {
    pub fn as_str(self) -> &'static str {
        match self {
            SchemaType::String => "string",
            SchemaType::Number => "number",
            SchemaType::Integer => "integer",
            SchemaType::Boolean => "boolean",
            SchemaType::Array => "array",
            SchemaType::Object => "object",
            SchemaType::Null => "null",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "string" => Some(SchemaType::String),
            "number" => Some(SchemaType::Number),
            "integer" => Some(SchemaType::Integer),
            "boolean" => Some(SchemaType::Boolean),
            "array" => Some(SchemaType::Array),
            "object" => Some(SchemaType::Object),
            "null" => Some(SchemaType::Null),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<SchemaType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusive_minimum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusive_maximum: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    #[serde(rename = "enum", skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<Value>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, SchemaRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SchemaRef>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub one_of: Vec<SchemaRef>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub all_of: Vec<SchemaRef>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub any_of: Vec<SchemaRef>,
    #[serde(flatten)]
    pub extensions: Extensions,
}

impl Schema {
    /// Structural self-check: the pattern must compile and every subschema
    /// container reachable from this node must itself validate.
    pub fn check_structure(&self, policy: &ValidationPolicy) -> Result<()> {
        if let Some(pattern) = &self.pattern {
            Regex::new(pattern).map_err(|err| Error::Invalid {
                kind: Self::KIND,
                message: format!("invalid pattern {pattern:?}: {err}"),
            })?;
        }
        for subschema in self
            .one_of
            .iter()
            .chain(&self.all_of)
            .chain(&self.any_of)
            .chain(self.properties.values())
        {
            subschema.validate(policy)?;
        }
        if let Some(items) = &self.items {
            items.validate(policy)?;
        }
        Ok(())
    }
}

fn subschema_map(object: &Map<String, Value>, key: &str) -> Result<BTreeMap<String, SchemaRef>> {
    match object.get(key) {
        None => Ok(BTreeMap::new()),
        Some(Value::Object(entries)) => entries
            .iter()
            .map(|(name, node)| Ok((name.clone(), SchemaRef::from_value(node)?)))
            .collect(),
        Some(other) => Err(Error::Invalid {
            kind: Schema::KIND,
            message: format!(
                "field {key:?} must be an object, got {}",
                node::json_type_name(other)
            ),
        }),
    }
}

fn combinator_list(object: &Map<String, Value>, key: &str) -> Result<Vec<SchemaRef>> {
    match object.get(key) {
        None => Ok(Vec::new()),
        Some(Value::Array(items)) if !items.is_empty() => {
            items.iter().map(SchemaRef::from_value).collect()
        }
        Some(Value::Array(_)) => Err(Error::Invalid {
            kind: Schema::KIND,
            message: format!("field {key:?} must not be empty"),
        }),
        Some(other) => Err(Error::Invalid {
            kind: Schema::KIND,
            message: format!(
                "field {key:?} must be an array, got {}",
                node::json_type_name(other)
            ),
        }),
    }
}

impl Referenceable for Schema {
    const KIND: &'static str = "schema";

    fn from_value(node: &Value) -> Result<Self> {
        let object = node::object(Self::KIND, node)?;
        let schema_type = match node::str_field(Self::KIND, object, "type")? {
            Some(name) => Some(SchemaType::parse(&name).ok_or_else(|| Error::Invalid {
                kind: Self::KIND,
                message: format!("unknown type {name:?}"),
            })?),
            None => None,
        };
        let enum_values = match object.get("enum") {
            None => Vec::new(),
            Some(Value::Array(values)) => values.clone(),
            Some(other) => {
                return Err(Error::Invalid {
                    kind: Self::KIND,
                    message: format!(
                        "field \"enum\" must be an array, got {}",
                        node::json_type_name(other)
                    ),
                });
            }
        };
        Ok(Schema {
            schema_type,
            format: node::str_field(Self::KIND, object, "format")?,
            min_length: node::usize_field(Self::KIND, object, "minLength")?,
            max_length: node::usize_field(Self::KIND, object, "maxLength")?,
            pattern: node::str_field(Self::KIND, object, "pattern")?,
            minimum: node::f64_field(Self::KIND, object, "minimum")?,
            maximum: node::f64_field(Self::KIND, object, "maximum")?,
            exclusive_minimum: node::f64_field(Self::KIND, object, "exclusiveMinimum")?,
            exclusive_maximum: node::f64_field(Self::KIND, object, "exclusiveMaximum")?,
            required: node::string_array_field(Self::KIND, object, "required")?.unwrap_or_default(),
            enum_values,
            properties: subschema_map(object, "properties")?,
            items: object
                .get("items")
                .map(SchemaRef::from_value)
                .transpose()?
                .map(Box::new),
            one_of: combinator_list(object, "oneOf")?,
            all_of: combinator_list(object, "allOf")?,
            any_of: combinator_list(object, "anyOf")?,
            extensions: collect_extensions(object),
        })
    }

    fn extensions(&self) -> Option<&Extensions> {
        Some(&self.extensions)
    }

    fn lookup(&self, key: &str) -> Option<Value> {
        match key {
            "type" => self
                .schema_type
                .map(|ty| Value::String(ty.as_str().to_string())),
            "format" => self.format.as_ref().map(|s| Value::String(s.clone())),
            "pattern" => self.pattern.as_ref().map(|s| Value::String(s.clone())),
            "required" if !self.required.is_empty() => Some(Value::Array(
                self.required
                    .iter()
                    .map(|name| Value::String(name.clone()))
                    .collect(),
            )),
            _ => None,
        }
    }

    fn validate(&self, policy: &ValidationPolicy) -> Result<()> {
        self.check_structure(policy)
    }
}
