//! Error types for the document model.

use thiserror::Error;

/// Result type alias for oasdoc-model operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced while decoding, resolving, or validating reference
/// containers and their targets.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// A node does not have the structural shape the kind requires, or a
    /// decoded value fails the kind's own structural checks.
    #[error("invalid {kind}: {message}")]
    Invalid { kind: &'static str, message: String },

    /// Sibling fields beside `$ref` that the active policy does not permit.
    /// Names are listed in ascending lexical order.
    #[error("extra sibling fields: [{}]", .fields.join(" "))]
    ExtraSiblingFields { fields: Vec<String> },

    /// A reference container was validated before its target was resolved.
    #[error("found unresolved ref: {pointer:?}")]
    UnresolvedRef { pointer: String },

    /// The resolver could not produce a fragment of the expected kind.
    #[error("cannot resolve ref {pointer:?}: {reason}")]
    BrokenRef { pointer: String, reason: String },

    /// A by-name lookup probed a key this container and its target do not
    /// recognize. A lookup condition, not a validation failure.
    #[error("unknown key {key:?}")]
    UnknownKey { key: String },
}
