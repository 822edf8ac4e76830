//! Error types for instance validation.

use std::fmt;
use thiserror::Error;

/// Result type alias for validation operations.
pub type ValidationResult<T> = std::result::Result<T, ValidationError>;

/// An instance-validation failure, located by the path into the instance
/// value and the path through the schema that rejected it.
#[derive(Debug, Clone, PartialEq, Error)]
pub struct ValidationError {
    pub kind: ValidationErrorKind,
    pub instance_path: InstancePath,
    pub schema_path: SchemaPath,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "validation error at {}: {}", self.instance_path, self.kind)
    }
}

/// What went wrong, with enough context to diagnose without re-running
/// validation.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationErrorKind {
    /// An ordinary structural failure (type, bounds, pattern, required).
    Mismatch { message: String },
    /// No alternative of a combinator accepted the value.
    NoMatchingAlternative {
        combinator: &'static str,
        tried: usize,
    },
    /// More than one `oneOf` alternative accepted the value. Carries the
    /// indices of the matching alternatives.
    OneOfConflict { matched: Vec<usize> },
    /// A combinator had no resolvable alternative; the underlying
    /// resolution failure is surfaced directly.
    BrokenRef { pointer: String, reason: String },
}

impl fmt::Display for ValidationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationErrorKind::Mismatch { message } => write!(f, "{message}"),
            ValidationErrorKind::NoMatchingAlternative { combinator, tried } => {
                write!(f, "no {combinator} alternative matched ({tried} tried)")
            }
            ValidationErrorKind::OneOfConflict { matched } => {
                let indices: Vec<String> = matched.iter().map(usize::to_string).collect();
                write!(
                    f,
                    "value matches more than one oneOf alternative: [{}]",
                    indices.join(" ")
                )
            }
            ValidationErrorKind::BrokenRef { pointer, reason } => {
                write!(f, "cannot resolve ref {pointer:?}: {reason}")
            }
        }
    }
}

/// A segment in a path into the instance value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(key) => write!(f, "{key}"),
            PathSegment::Index(index) => write!(f, "[{index}]"),
        }
    }
}

/// Path into the instance value, e.g. `address.[0]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstancePath {
    segments: Vec<PathSegment>,
}

impl InstancePath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_key(&mut self, key: impl Into<String>) {
        self.segments.push(PathSegment::Key(key.into()));
    }

    pub fn push_index(&mut self, index: usize) {
        self.segments.push(PathSegment::Index(index));
    }

    pub fn pop(&mut self) -> Option<PathSegment> {
        self.segments.pop()
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

impl fmt::Display for InstancePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return write!(f, "(root)");
        }
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

/// Path through the schema, e.g. `object > properties > address > oneOf`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaPath {
    segments: Vec<String>,
}

impl SchemaPath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, segment: impl Into<String>) {
        self.segments.push(segment.into());
    }

    pub fn pop(&mut self) -> Option<String> {
        self.segments.pop()
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl fmt::Display for SchemaPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return write!(f, "(root)");
        }
        write!(f, "{}", self.segments.join(" > "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instance_path_display() {
        let mut path = InstancePath::new();
        assert_eq!(path.to_string(), "(root)");

        path.push_key("address");
        path.push_index(0);
        assert_eq!(path.to_string(), "address.[0]");
    }

    #[test]
    fn schema_path_display() {
        let mut path = SchemaPath::new();
        path.push("properties");
        path.push("address");
        assert_eq!(path.to_string(), "properties > address");
    }

    #[test]
    fn one_of_conflict_lists_matching_indices() {
        let kind = ValidationErrorKind::OneOfConflict { matched: vec![0, 2] };
        assert_eq!(
            kind.to_string(),
            "value matches more than one oneOf alternative: [0 2]"
        );
    }
}
