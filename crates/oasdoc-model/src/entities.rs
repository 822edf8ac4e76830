//! The referenceable entity kinds besides [`Schema`](crate::schema::Schema).
//!
//! Each kind decodes leniently from a raw object node (structural problems
//! surface in `validate`, not in decode, so resolving a fragment of the
//! wrong shape reports a broken reference rather than panicking), captures
//! its own `x-` extensions, and exposes a by-name lookup over the fields it
//! recognizes. Header is the odd one out: it has no extensions concept of
//! its own, so only container-level extensions exist for it.
//!
//! Media types and path-item fragments behind `content`/expression maps are
//! kept opaque; their validators are external collaborators.

use crate::error::{Error, Result};
use crate::extensions::{collect_extensions, is_extension_key, Extensions};
use crate::node;
use crate::policy::ValidationPolicy;
use crate::refs::{Ref, Referenceable};
use crate::schema::SchemaRef;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

pub type CallbackRef = Ref<Callback>;
pub type ExampleRef = Ref<Example>;
pub type HeaderRef = Ref<Header>;
pub type LinkRef = Ref<Link>;
pub type ParameterRef = Ref<Parameter>;
pub type RequestBodyRef = Ref<RequestBody>;
pub type ResponseRef = Ref<Response>;
pub type SecuritySchemeRef = Ref<SecurityScheme>;

fn string_value(value: &Option<String>) -> Option<Value> {
    value.as_ref().map(|s| Value::String(s.clone()))
}

/// A map of runtime expressions to path-item fragments.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Callback {
    #[serde(flatten)]
    pub expressions: BTreeMap<String, Value>,
    #[serde(flatten)]
    pub extensions: Extensions,
}

impl Referenceable for Callback {
    const KIND: &'static str = "callback";

    fn from_value(node: &Value) -> Result<Self> {
        let object = node::object(Self::KIND, node)?;
        let mut callback = Callback::default();
        for (name, value) in object {
            if is_extension_key(name) {
                callback.extensions.insert(name.clone(), value.clone());
            } else {
                callback.expressions.insert(name.clone(), value.clone());
            }
        }
        Ok(callback)
    }

    fn extensions(&self) -> Option<&Extensions> {
        Some(&self.extensions)
    }

    fn lookup(&self, key: &str) -> Option<Value> {
        self.expressions.get(key).cloned()
    }

    fn validate(&self, _policy: &ValidationPolicy) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Example {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_value: Option<String>,
    #[serde(flatten)]
    pub extensions: Extensions,
}

impl Referenceable for Example {
    const KIND: &'static str = "example";

    fn from_value(node: &Value) -> Result<Self> {
        let object = node::object(Self::KIND, node)?;
        Ok(Example {
            summary: node::str_field(Self::KIND, object, "summary")?,
            description: node::str_field(Self::KIND, object, "description")?,
            value: object.get("value").cloned(),
            external_value: node::str_field(Self::KIND, object, "externalValue")?,
            extensions: collect_extensions(object),
        })
    }

    fn extensions(&self) -> Option<&Extensions> {
        Some(&self.extensions)
    }

    fn lookup(&self, key: &str) -> Option<Value> {
        match key {
            "summary" => string_value(&self.summary),
            "description" => string_value(&self.description),
            "value" => self.value.clone(),
            "externalValue" => string_value(&self.external_value),
            _ => None,
        }
    }

    fn validate(&self, _policy: &ValidationPolicy) -> Result<()> {
        if self.value.is_some() && self.external_value.is_some() {
            return Err(Error::Invalid {
                kind: Self::KIND,
                message: "fields \"value\" and \"externalValue\" are mutually exclusive"
                    .to_string(),
            });
        }
        Ok(())
    }
}

/// Header has no extensions concept of its own; only the container-level
/// extensions exist for header references.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Header {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub deprecated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaRef>,
}

impl Referenceable for Header {
    const KIND: &'static str = "header";

    fn from_value(node: &Value) -> Result<Self> {
        let object = node::object(Self::KIND, node)?;
        Ok(Header {
            description: node::str_field(Self::KIND, object, "description")?,
            required: node::bool_field(Self::KIND, object, "required")?.unwrap_or(false),
            deprecated: node::bool_field(Self::KIND, object, "deprecated")?.unwrap_or(false),
            schema: object.get("schema").map(SchemaRef::from_value).transpose()?,
        })
    }

    fn lookup(&self, key: &str) -> Option<Value> {
        match key {
            "description" => string_value(&self.description),
            "required" => Some(Value::Bool(self.required)),
            "deprecated" => Some(Value::Bool(self.deprecated)),
            _ => None,
        }
    }

    fn validate(&self, policy: &ValidationPolicy) -> Result<()> {
        if let Some(schema) = &self.schema {
            schema.validate(policy)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_ref: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, Value>,
    #[serde(flatten)]
    pub extensions: Extensions,
}

impl Referenceable for Link {
    const KIND: &'static str = "link";

    fn from_value(node: &Value) -> Result<Self> {
        let object = node::object(Self::KIND, node)?;
        Ok(Link {
            operation_ref: node::str_field(Self::KIND, object, "operationRef")?,
            operation_id: node::str_field(Self::KIND, object, "operationId")?,
            description: node::str_field(Self::KIND, object, "description")?,
            parameters: node::value_map_field(Self::KIND, object, "parameters")?,
            extensions: collect_extensions(object),
        })
    }

    fn extensions(&self) -> Option<&Extensions> {
        Some(&self.extensions)
    }

    fn lookup(&self, key: &str) -> Option<Value> {
        match key {
            "operationRef" => string_value(&self.operation_ref),
            "operationId" => string_value(&self.operation_id),
            "description" => string_value(&self.description),
            _ => None,
        }
    }

    fn validate(&self, _policy: &ValidationPolicy) -> Result<()> {
        match (&self.operation_ref, &self.operation_id) {
            (None, None) => Err(Error::Invalid {
                kind: Self::KIND,
                message: "one of \"operationRef\" or \"operationId\" is required".to_string(),
            }),
            (Some(_), Some(_)) => Err(Error::Invalid {
                kind: Self::KIND,
                message: "fields \"operationRef\" and \"operationId\" are mutually exclusive"
                    .to_string(),
            }),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "in")]
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub deprecated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaRef>,
    #[serde(flatten)]
    pub extensions: Extensions,
}

impl Referenceable for Parameter {
    const KIND: &'static str = "parameter";

    fn from_value(node: &Value) -> Result<Self> {
        let object = node::object(Self::KIND, node)?;
        Ok(Parameter {
            name: node::str_field(Self::KIND, object, "name")?.unwrap_or_default(),
            location: node::str_field(Self::KIND, object, "in")?.unwrap_or_default(),
            description: node::str_field(Self::KIND, object, "description")?,
            required: node::bool_field(Self::KIND, object, "required")?.unwrap_or(false),
            deprecated: node::bool_field(Self::KIND, object, "deprecated")?.unwrap_or(false),
            schema: object.get("schema").map(SchemaRef::from_value).transpose()?,
            extensions: collect_extensions(object),
        })
    }

    fn extensions(&self) -> Option<&Extensions> {
        Some(&self.extensions)
    }

    fn lookup(&self, key: &str) -> Option<Value> {
        match key {
            "name" if !self.name.is_empty() => Some(Value::String(self.name.clone())),
            "in" if !self.location.is_empty() => Some(Value::String(self.location.clone())),
            "description" => string_value(&self.description),
            "required" => Some(Value::Bool(self.required)),
            _ => None,
        }
    }

    fn validate(&self, policy: &ValidationPolicy) -> Result<()> {
        if self.name.is_empty() {
            return Err(Error::Invalid {
                kind: Self::KIND,
                message: "field \"name\" is required".to_string(),
            });
        }
        match self.location.as_str() {
            "query" | "header" | "cookie" => {}
            "path" => {
                if !self.required {
                    return Err(Error::Invalid {
                        kind: Self::KIND,
                        message: "path parameters must be required".to_string(),
                    });
                }
            }
            other => {
                return Err(Error::Invalid {
                    kind: Self::KIND,
                    message: format!("field \"in\" has unknown value {other:?}"),
                });
            }
        }
        if let Some(schema) = &self.schema {
            schema.validate(policy)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub content: BTreeMap<String, Value>,
    #[serde(flatten)]
    pub extensions: Extensions,
}

impl Referenceable for RequestBody {
    const KIND: &'static str = "request body";

    fn from_value(node: &Value) -> Result<Self> {
        let object = node::object(Self::KIND, node)?;
        Ok(RequestBody {
            description: node::str_field(Self::KIND, object, "description")?,
            required: node::bool_field(Self::KIND, object, "required")?.unwrap_or(false),
            content: node::value_map_field(Self::KIND, object, "content")?,
            extensions: collect_extensions(object),
        })
    }

    fn extensions(&self) -> Option<&Extensions> {
        Some(&self.extensions)
    }

    fn lookup(&self, key: &str) -> Option<Value> {
        match key {
            "description" => string_value(&self.description),
            "required" => Some(Value::Bool(self.required)),
            _ => None,
        }
    }

    fn validate(&self, _policy: &ValidationPolicy) -> Result<()> {
        if self.content.is_empty() {
            return Err(Error::Invalid {
                kind: Self::KIND,
                message: "field \"content\" is required".to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, HeaderRef>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub content: BTreeMap<String, Value>,
    #[serde(flatten)]
    pub extensions: Extensions,
}

impl Referenceable for Response {
    const KIND: &'static str = "response";

    fn from_value(node: &Value) -> Result<Self> {
        let object = node::object(Self::KIND, node)?;
        let mut headers = BTreeMap::new();
        if let Some(value) = object.get("headers") {
            let entries = value.as_object().ok_or_else(|| Error::Invalid {
                kind: Self::KIND,
                message: format!(
                    "field \"headers\" must be an object, got {}",
                    node::json_type_name(value)
                ),
            })?;
            for (name, header) in entries {
                headers.insert(name.clone(), HeaderRef::from_value(header)?);
            }
        }
        Ok(Response {
            description: node::str_field(Self::KIND, object, "description")?,
            headers,
            content: node::value_map_field(Self::KIND, object, "content")?,
            extensions: collect_extensions(object),
        })
    }

    fn extensions(&self) -> Option<&Extensions> {
        Some(&self.extensions)
    }

    fn lookup(&self, key: &str) -> Option<Value> {
        match key {
            "description" => string_value(&self.description),
            _ => None,
        }
    }

    fn validate(&self, policy: &ValidationPolicy) -> Result<()> {
        if self.description.is_none() {
            return Err(Error::Invalid {
                kind: Self::KIND,
                message: "field \"description\" is required".to_string(),
            });
        }
        for header in self.headers.values() {
            header.validate(policy)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityScheme {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub scheme_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "in", skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bearer_format: Option<String>,
    #[serde(flatten)]
    pub extensions: Extensions,
}

impl Referenceable for SecurityScheme {
    const KIND: &'static str = "security scheme";

    fn from_value(node: &Value) -> Result<Self> {
        let object = node::object(Self::KIND, node)?;
        Ok(SecurityScheme {
            scheme_type: node::str_field(Self::KIND, object, "type")?,
            description: node::str_field(Self::KIND, object, "description")?,
            name: node::str_field(Self::KIND, object, "name")?,
            location: node::str_field(Self::KIND, object, "in")?,
            scheme: node::str_field(Self::KIND, object, "scheme")?,
            bearer_format: node::str_field(Self::KIND, object, "bearerFormat")?,
            extensions: collect_extensions(object),
        })
    }

    fn extensions(&self) -> Option<&Extensions> {
        Some(&self.extensions)
    }

    fn lookup(&self, key: &str) -> Option<Value> {
        match key {
            "type" => string_value(&self.scheme_type),
            "description" => string_value(&self.description),
            "name" => string_value(&self.name),
            "in" => string_value(&self.location),
            "scheme" => string_value(&self.scheme),
            "bearerFormat" => string_value(&self.bearer_format),
            _ => None,
        }
    }

    fn validate(&self, _policy: &ValidationPolicy) -> Result<()> {
        let scheme_type = self.scheme_type.as_deref().ok_or_else(|| Error::Invalid {
            kind: Self::KIND,
            message: "field \"type\" is required".to_string(),
        })?;
        match scheme_type {
            "apiKey" => {
                if self.name.is_none() || self.location.is_none() {
                    return Err(Error::Invalid {
                        kind: Self::KIND,
                        message: "apiKey schemes require \"name\" and \"in\"".to_string(),
                    });
                }
            }
            "http" | "oauth2" | "openIdConnect" | "mutualTLS" => {}
            other => {
                return Err(Error::Invalid {
                    kind: Self::KIND,
                    message: format!("field \"type\" has unknown value {other:?}"),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn header_decodes_nested_schema_container() {
        let node = json!({
            "description": "rate limit remaining",
            "required": true,
            "schema": {"type": "integer"}
        });
        let header = Header::from_value(&node).unwrap();

        assert!(header.required);
        assert!(header.schema.is_some());
        assert!(header.extensions().is_none());
    }

    #[test]
    fn callback_splits_expressions_from_extensions() {
        let node = json!({
            "{$request.body#/url}": {"post": {}},
            "x-tracked": true
        });
        let callback = Callback::from_value(&node).unwrap();

        assert_eq!(callback.expressions.len(), 1);
        assert_eq!(callback.extensions.get("x-tracked"), Some(&json!(true)));
        assert_eq!(callback.lookup("{$request.body#/url}"), Some(json!({"post": {}})));
    }

    #[test]
    fn parameter_requires_name_and_known_location() {
        let policy = ValidationPolicy::new();

        let missing_name = Parameter::from_value(&json!({"in": "query"})).unwrap();
        assert!(missing_name.validate(&policy).is_err());

        let bad_location =
            Parameter::from_value(&json!({"name": "limit", "in": "body"})).unwrap();
        assert!(bad_location.validate(&policy).is_err());

        let path_optional =
            Parameter::from_value(&json!({"name": "id", "in": "path"})).unwrap();
        assert_eq!(
            path_optional.validate(&policy).unwrap_err().to_string(),
            "invalid parameter: path parameters must be required"
        );

        let ok = Parameter::from_value(&json!({"name": "limit", "in": "query"})).unwrap();
        assert!(ok.validate(&policy).is_ok());
    }

    #[test]
    fn example_rejects_both_value_and_external_value() {
        let example = Example::from_value(&json!({
            "value": {"id": 1},
            "externalValue": "https://example.com/pet.json"
        }))
        .unwrap();
        assert!(example.validate(&ValidationPolicy::new()).is_err());
    }

    #[test]
    fn link_requires_exactly_one_operation_selector() {
        let policy = ValidationPolicy::new();

        let neither = Link::from_value(&json!({})).unwrap();
        assert!(neither.validate(&policy).is_err());

        let both = Link::from_value(&json!({
            "operationRef": "#/paths/~1pets/get",
            "operationId": "listPets"
        }))
        .unwrap();
        assert!(both.validate(&policy).is_err());

        let one = Link::from_value(&json!({"operationId": "listPets"})).unwrap();
        assert!(one.validate(&policy).is_ok());
    }

    #[test]
    fn response_requires_description_and_checks_headers() {
        let policy = ValidationPolicy::new();

        let missing = Response::from_value(&json!({})).unwrap();
        assert!(missing.validate(&policy).is_err());

        let response = Response::from_value(&json!({
            "description": "ok",
            "headers": {
                "X-Rate-Limit": {"$ref": "#/components/headers/RateLimit"}
            }
        }))
        .unwrap();
        // The header container was never resolved.
        assert!(matches!(
            response.validate(&policy),
            Err(Error::UnresolvedRef { .. })
        ));
    }

    #[test]
    fn security_scheme_validates_type_specific_fields() {
        let policy = ValidationPolicy::new();

        let untyped = SecurityScheme::from_value(&json!({})).unwrap();
        assert!(untyped.validate(&policy).is_err());

        let api_key = SecurityScheme::from_value(&json!({"type": "apiKey"})).unwrap();
        assert!(api_key.validate(&policy).is_err());

        let complete = SecurityScheme::from_value(&json!({
            "type": "apiKey",
            "name": "api_key",
            "in": "header"
        }))
        .unwrap();
        assert!(complete.validate(&policy).is_ok());
    }
}
