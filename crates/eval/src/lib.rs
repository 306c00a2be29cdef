//! Form tree builder and visibility evaluator.
//!
//! Consumes a form schema document (see formtree-interchange) and a flat
//! data context, and produces a [`FormTree`]: groups for sections and
//! categories, strongly-typed field definitions for every question whose
//! `displayDependencies` allow it, and submit actions.
//!
//! Nothing is rendered or persisted here. Hosts bind the tree into their
//! own widgets through [`FormSink`] and keep drafts in a [`FormStateStore`]
//! they provide.

pub mod builder;
pub mod coerce;
pub mod config;
pub mod constraints;
pub mod kinds;
pub mod numeric;
pub mod session;
pub mod sink;
pub mod tree;
pub mod types;
pub mod visibility;

pub use builder::{capitalize, FormBuilder, VisibilityDecision, VisibilityRule};
pub use coerce::coerce;
pub use config::{BuildConfig, CoercionPolicy};
pub use constraints::{ConstraintDescriptor, ConstraintError, ConstraintRegistry};
pub use kinds::FieldKind;
pub use session::{FormSession, FormStateStore, MemoryStateStore};
pub use sink::{bind, transform, FormSink, OutlineSink};
pub use tree::{ActionKind, ActionNode, FieldDefinition, FormNode, FormTree, GroupNode};
pub use types::{BuildError, CoercionError, FileHandle, FormData, Value, VisibilityError};
pub use visibility::{should_display, should_display_json, Evaluator};

/// Build a form tree from JSON with the default configuration.
///
/// # Arguments
/// * `schema` - Form schema document
/// * `data` - Flat data context (a JSON object, or `null` for none)
pub fn build_form(
    schema: &serde_json::Value,
    data: &serde_json::Value,
) -> Result<FormTree, BuildError> {
    FormBuilder::default().build_json(schema, data)
}

/// Per-question visibility for a JSON schema with the default
/// configuration.
pub fn visibility_report(
    schema: &serde_json::Value,
    data: &serde_json::Value,
) -> Result<Vec<VisibilityDecision>, BuildError> {
    let schema = formtree_interchange::from_schema(schema)?;
    let data = FormData::from_json(data)?;
    FormBuilder::default().visibility_report(&schema, &data)
}
