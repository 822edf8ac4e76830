//! Per-kind behavior of reference containers: extension capture beside
//! `$ref`, sibling-field policies, and lookup precedence.

use oasdoc_model::{
    Callback, Error, Example, Header, Link, Parameter, Ref, Referenceable, RequestBody, Response,
    Schema, SecurityScheme, ValidationPolicy,
};
use serde_json::{json, Value};

fn ref_node() -> Value {
    json!({"$ref": "#/components/schemas/Pet", "something": "integer", "x-order": 1})
}

fn check_ref_extensions<T: Referenceable + std::fmt::Debug>() {
    let container = Ref::<T>::from_value(&ref_node()).unwrap();

    // captures the extension, not the plain sibling
    assert_eq!(container.pointer(), "#/components/schemas/Pet");
    assert_eq!(container.extensions().get("x-order"), Some(&json!(1)));
    assert!(!container.extensions().contains_key("something"));
    assert_eq!(container.foreign_fields().len(), 1);
    assert!(container.foreign_fields().contains("something"));

    // validation
    let err = container.validate(&ValidationPolicy::new()).unwrap_err();
    assert_eq!(err.to_string(), "extra sibling fields: [something]");

    let err = container
        .validate(&ValidationPolicy::new().prohibit_extensions_with_ref())
        .unwrap_err();
    assert_eq!(err.to_string(), "extra sibling fields: [something x-order]");

    // expected since the target was never resolved
    let err = container
        .validate(&ValidationPolicy::new().allow_extra_sibling_fields(["something"]))
        .unwrap_err();
    assert!(err.to_string().contains("found unresolved ref"));

    // a foreign field name is not lookable
    assert!(matches!(
        container.get("something"),
        Err(Error::UnknownKey { .. })
    ));
}

macro_rules! ref_extension_tests {
    ($name:ident, $ty:ty) => {
        #[test]
        fn $name() {
            check_ref_extensions::<$ty>();
        }
    };
}

ref_extension_tests!(callback_ref_extensions, Callback);
ref_extension_tests!(example_ref_extensions, Example);
ref_extension_tests!(header_ref_extensions, Header);
ref_extension_tests!(link_ref_extensions, Link);
ref_extension_tests!(parameter_ref_extensions, Parameter);
ref_extension_tests!(request_body_ref_extensions, RequestBody);
ref_extension_tests!(response_ref_extensions, Response);
ref_extension_tests!(schema_ref_extensions, Schema);
ref_extension_tests!(security_scheme_ref_extensions, SecurityScheme);

// The sibling extension beside the `$ref` wins over the same-named
// extension on the resolved target.
macro_rules! sibling_extension_precedence {
    ($name:ident, $ty:ty) => {
        #[test]
        fn $name() {
            let mut container = Ref::<$ty>::from_value(&ref_node()).unwrap();
            let mut target = <$ty>::default();
            target.extensions.insert("x-order".to_string(), json!(2.0));
            container.set_target(target);

            assert_eq!(container.get("x-order").unwrap(), json!(1));
        }
    };
}

sibling_extension_precedence!(callback_prefers_sibling_extension, Callback);
sibling_extension_precedence!(example_prefers_sibling_extension, Example);
sibling_extension_precedence!(link_prefers_sibling_extension, Link);
sibling_extension_precedence!(parameter_prefers_sibling_extension, Parameter);
sibling_extension_precedence!(request_body_prefers_sibling_extension, RequestBody);
sibling_extension_precedence!(response_prefers_sibling_extension, Response);
sibling_extension_precedence!(schema_prefers_sibling_extension, Schema);
sibling_extension_precedence!(security_scheme_prefers_sibling_extension, SecurityScheme);

// Header has no extensions of its own; only the container-level set exists.
#[test]
fn header_has_no_target_extensions() {
    let mut container = Ref::<Header>::from_value(&ref_node()).unwrap();
    container.set_target(Header::default());

    assert!(container.target().unwrap().extensions().is_none());
    assert_eq!(container.get("x-order").unwrap(), json!(1));
    assert!(matches!(
        container.get("x-unset"),
        Err(Error::UnknownKey { .. })
    ));
}

#[test]
fn target_extension_is_reachable_when_container_lacks_it() {
    let mut container =
        Ref::<Example>::from_value(&json!({"$ref": "#/components/examples/greeting"})).unwrap();
    let mut target = Example::default();
    target.extensions.insert("x-order".to_string(), json!(2.0));
    container.set_target(target);

    assert_eq!(container.get("x-order").unwrap(), json!(2.0));
}

#[test]
fn structural_lookup_delegates_to_resolved_target() {
    let mut container = Ref::<Example>::from_value(&ref_node()).unwrap();
    container.set_target(Example {
        summary: Some("a pet".to_string()),
        ..Example::default()
    });

    assert_eq!(container.get("summary").unwrap(), json!("a pet"));
    assert!(matches!(
        container.get("externalValue"),
        Err(Error::UnknownKey { .. })
    ));
}

#[test]
fn whitelisted_container_validates_once_resolved() {
    let mut container = Ref::<Example>::from_value(&ref_node()).unwrap();
    container.set_target(Example::default());

    let policy = ValidationPolicy::new().allow_extra_sibling_fields(["something"]);
    assert!(container.validate(&policy).is_ok());
}

// A partially whitelisted violation set reports only the remaining names,
// still in ascending lexical order.
#[test]
fn policy_whitelists_only_named_fields() {
    let node = json!({
        "$ref": "#/components/schemas/Pet",
        "beta": 1,
        "alpha": 2,
        "delta": 3
    });
    let container = Ref::<Schema>::from_value(&node).unwrap();

    let policy = ValidationPolicy::new().allow_extra_sibling_fields(["beta"]);
    let err = container.validate(&policy).unwrap_err();
    assert_eq!(err.to_string(), "extra sibling fields: [alpha delta]");

    let policy = ValidationPolicy::new().allow_extra_sibling_fields(["alpha", "beta", "delta"]);
    let err = container.validate(&policy).unwrap_err();
    assert!(matches!(err, Error::UnresolvedRef { .. }));
}

#[test]
fn prohibition_only_applies_to_reference_containers() {
    // Inline values keep their extensions on the target; the prohibit
    // policy has nothing to report against them.
    let container = Ref::<Example>::from_value(&json!({"summary": "hi", "x-order": 1})).unwrap();

    let policy = ValidationPolicy::new().prohibit_extensions_with_ref();
    assert!(container.validate(&policy).is_ok());
    assert!(container.extensions().is_empty());
    assert_eq!(
        container.target().unwrap().extensions().unwrap().get("x-order"),
        Some(&json!(1))
    );
}
