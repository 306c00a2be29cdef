//! formtree-interchange: typed form schema documents.
//!
//! Provides typed structs for the schema hierarchy (sections, categories,
//! questions, condition trees) and a single `from_schema()` entry point
//! that deserializes a `serde_json::Value` document into a `FormSchema`.
//!
//! Only structural validation happens here. Field kinds, value coercion,
//! constraint lookup and visibility evaluation belong to formtree-eval.

pub mod deserialize;
pub mod types;

pub use deserialize::{
    from_schema, parse_condition_group, parse_question, NestingExceeded, SchemaError,
    MAX_CONDITION_NESTING,
};
pub use types::*;
