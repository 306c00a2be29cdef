//! Draft state across requests.
//!
//! A host keeps the active schema and the data entered so far in a
//! [`FormStateStore`] it owns (an HTTP session, a cache entry, ...). The
//! store is always injected; nothing here is global.

use crate::builder::FormBuilder;
use crate::tree::FormTree;
use crate::types::{BuildError, FormData};
use formtree_interchange::from_schema;

/// Storage for one user's active form and draft data.
pub trait FormStateStore {
    /// The active schema document, if one was stored.
    fn structure(&self) -> Option<&serde_json::Value>;

    fn set_structure(&mut self, structure: serde_json::Value);

    /// Draft data saved so far; empty when nothing was saved.
    fn data(&self) -> FormData;

    /// Merge `data` over the stored draft. Keys in `data` win.
    fn save(&mut self, data: FormData);

    /// Forget both the structure and the draft.
    fn reset(&mut self);
}

/// In-process store, one per user.
#[derive(Debug, Clone, Default)]
pub struct MemoryStateStore {
    structure: Option<serde_json::Value>,
    draft: FormData,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FormStateStore for MemoryStateStore {
    fn structure(&self) -> Option<&serde_json::Value> {
        self.structure.as_ref()
    }

    fn set_structure(&mut self, structure: serde_json::Value) {
        self.structure = Some(structure);
    }

    fn data(&self) -> FormData {
        self.draft.clone()
    }

    fn save(&mut self, data: FormData) {
        self.draft.merge(data);
    }

    fn reset(&mut self) {
        self.structure = None;
        self.draft = FormData::new();
    }
}

/// A builder paired with a state store: builds whatever the store holds.
#[derive(Debug, Clone)]
pub struct FormSession<S> {
    builder: FormBuilder,
    store: S,
}

impl<S: FormStateStore> FormSession<S> {
    pub fn new(builder: FormBuilder, store: S) -> Self {
        FormSession { builder, store }
    }

    /// Store a new active schema. The document is checked before it
    /// replaces the current one, and the previous draft is discarded.
    pub fn start(&mut self, structure: serde_json::Value) -> Result<(), BuildError> {
        from_schema(&structure)?;
        self.store.reset();
        self.store.set_structure(structure);
        Ok(())
    }

    /// Merge a submitted step into the draft.
    pub fn save(&mut self, data: FormData) {
        self.store.save(data);
    }

    /// Build the stored schema against the stored draft.
    pub fn build(&self) -> Result<FormTree, BuildError> {
        let structure = self.store.structure().ok_or(BuildError::NoStructure)?;
        let schema = from_schema(structure)?;
        self.builder.build(&schema, &self.store.data())
    }

    pub fn reset(&mut self) {
        self.store.reset();
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }
}
