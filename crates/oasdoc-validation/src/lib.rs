//! # oasdoc-validation
//!
//! Instance validation for `oasdoc-model` schemas: the ordinary structural
//! checks (type tags, string and numeric bounds, patterns, enums, required
//! properties, nested object/array recursion) plus the combinator layer.
//!
//! Combinator semantics:
//! - `oneOf`: exactly one alternative must match. Every alternative is
//!   evaluated so ambiguity is reported as a conflict with the matching
//!   indices.
//! - `allOf`: every alternative must match, first failure wins.
//! - `anyOf`: at least one alternative must match.
//!
//! ## Example
//!
//! ```rust
//! use oasdoc_model::{Components, Referenceable, Schema};
//! use oasdoc_validation::{validate_instance, ValidationErrorKind};
//! use serde_json::json;
//!
//! let schema = Schema::from_value(&json!({
//!     "oneOf": [
//!         {"type": "string", "maxLength": 4},
//!         {"type": "string", "minLength": 3}
//!     ]
//! }))
//! .unwrap();
//!
//! // Satisfies both alternatives: ambiguous, not silently accepted.
//! let err = validate_instance(&json!("abcd"), &schema, &Components::new()).unwrap_err();
//! assert!(matches!(err.kind, ValidationErrorKind::OneOfConflict { .. }));
//! ```

pub mod error;
pub mod validator;

pub use error::{
    InstancePath, PathSegment, SchemaPath, ValidationError, ValidationErrorKind, ValidationResult,
};
pub use validator::{validate_instance, ValidationContext};
