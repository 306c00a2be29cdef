//! Runtime value types, the flat data context, and evaluator errors.
//!
//! These types are DISTINCT from formtree-interchange types: the schema
//! document keeps operands and defaults as raw JSON, while everything the
//! builder and evaluator compute with is a [`Value`].

pub mod data;
pub mod values;

pub use data::FormData;
pub use values::{FileHandle, Value};

use formtree_interchange::SchemaError;

use crate::constraints::ConstraintError;
use crate::kinds::FieldKind;

// ──────────────────────────────────────────────
// Errors
// ──────────────────────────────────────────────

/// A raw value could not be turned into a date/time default.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoercionError {
    /// The text is not in any accepted date/time format.
    #[error("cannot parse '{input}' as {kind}")]
    Unparseable { kind: FieldKind, input: String },
    /// The value is neither text nor a date/time value.
    #[error("cannot use a {got} value as {kind}")]
    NotTemporal { kind: FieldKind, got: &'static str },
}

/// Failure while evaluating a condition tree.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VisibilityError {
    /// A group uses an operator outside `AND`, `OR`, `NOT`.
    #[error("unsupported logical operator: {operator}")]
    UnsupportedOperator { operator: String },
    /// Groups nest deeper than the configured limit.
    #[error("condition groups nest deeper than {max} levels")]
    DepthExceeded { max: usize },
}

/// Errors that abort a form build. No partial tree is ever returned.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BuildError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("field '{field}': {source}")]
    Constraint {
        field: String,
        #[source]
        source: ConstraintError,
    },

    #[error("field '{field}': {source}")]
    Visibility {
        field: String,
        #[source]
        source: VisibilityError,
    },

    #[error("field '{field}': {source}")]
    Coercion {
        field: String,
        #[source]
        source: CoercionError,
    },

    /// Form data supplied as JSON was not an object.
    #[error("form data must be a JSON object, got {got}")]
    InvalidData { got: String },

    /// A session was asked to build before any structure was stored.
    #[error("no form structure has been stored")]
    NoStructure,
}
