//! # oasdoc-model
//!
//! Document model for OpenAPI-style API descriptions: typed reference
//! containers over the reusable component kinds, vendor-extension capture
//! beside `$ref` keys, sibling-field policy validation, and pointer
//! resolution against an injected component index.
//!
//! The model consumes raw `serde_json::Value` trees; parsing JSON or YAML
//! text into those trees is the document loader's concern. Instance
//! validation of data against schemas lives in the companion
//! `oasdoc-validation` crate.
//!
//! ## Example
//!
//! ```rust
//! use oasdoc_model::{Components, ExampleRef, ValidationPolicy};
//! use serde_json::json;
//!
//! let node = json!({"$ref": "#/components/examples/greeting", "x-order": 1});
//! let mut container = ExampleRef::from_value(&node).unwrap();
//!
//! let mut components = Components::new();
//! components.insert("#/components/examples/greeting", json!({"summary": "hi"}));
//! container.resolve(&components).unwrap();
//!
//! assert!(container.validate(&ValidationPolicy::new()).is_ok());
//! assert_eq!(container.get("x-order").unwrap(), json!(1));
//! ```

pub mod entities;
pub mod error;
pub mod extensions;
mod node;
pub mod policy;
pub mod refs;
pub mod resolver;
pub mod schema;

pub use entities::{
    Callback, CallbackRef, Example, ExampleRef, Header, HeaderRef, Link, LinkRef, Parameter,
    ParameterRef, RequestBody, RequestBodyRef, Response, ResponseRef, SecurityScheme,
    SecuritySchemeRef,
};
pub use error::{Error, Result};
pub use extensions::{collect_extensions, is_extension_key, partition_fields, Extensions};
pub use node::json_type_name;
pub use policy::ValidationPolicy;
pub use refs::{Ref, Referenceable, Target};
pub use resolver::{Components, Resolver};
pub use schema::{Schema, SchemaRef, SchemaType};
