//! Binding a built tree into a host form framework.
//!
//! A host implements [`FormSink`] to turn tree nodes into its own widget
//! objects. [`bind`] walks the tree depth first, so a group's children are
//! always produced before the group itself.

use crate::builder::FormBuilder;
use crate::kinds::FieldKind;
use crate::tree::{ActionKind, ActionNode, FieldDefinition, FormNode, FormTree, GroupNode};
use crate::types::BuildError;

/// The host-side interface a form tree is bound into.
///
/// Each call returns the host's representation of the node. Children of a
/// group are handed back to [`FormSink::add_group`] in document order.
pub trait FormSink {
    /// Host representation of one node.
    type Node;

    // ── Leaves ────────────────────────────────────────────────────────────

    fn add_field(&mut self, name: &str, kind: FieldKind, field: &FieldDefinition) -> Self::Node;

    fn add_action(&mut self, name: &str, kind: ActionKind, action: &ActionNode) -> Self::Node;

    // ── Structure ─────────────────────────────────────────────────────────

    fn add_group(
        &mut self,
        name: &str,
        label: &str,
        group: &GroupNode,
        children: Vec<Self::Node>,
    ) -> Self::Node;
}

/// Bind every root node of `tree` into `sink`.
pub fn bind<S: FormSink>(tree: &FormTree, sink: &mut S) -> Vec<S::Node> {
    bind_nodes(&tree.children, sink)
}

pub fn bind_nodes<S: FormSink>(nodes: &[FormNode], sink: &mut S) -> Vec<S::Node> {
    nodes
        .iter()
        .map(|node| match node {
            FormNode::Field(field) => sink.add_field(&field.name, field.kind, field),
            FormNode::Action(action) => sink.add_action(&action.name, action.kind, action),
            FormNode::Group(group) => {
                let children = bind_nodes(&group.children, sink);
                sink.add_group(&group.name, &group.label, group, children)
            }
        })
        .collect()
}

/// Build a form from JSON and bind it into `sink` in one step.
///
/// Returns the bound root nodes together with the tree they came from.
pub fn transform<S: FormSink>(
    builder: &FormBuilder,
    schema: &serde_json::Value,
    data: &serde_json::Value,
    sink: &mut S,
) -> Result<(FormTree, Vec<S::Node>), BuildError> {
    let tree = builder.build_json(schema, data)?;
    let nodes = bind(&tree, sink);
    Ok((tree, nodes))
}

// ──────────────────────────────────────────────
// Outline sink
// ──────────────────────────────────────────────

/// Renders a tree as indented text lines, one per node.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutlineSink;

impl FormSink for OutlineSink {
    type Node = Vec<String>;

    fn add_field(&mut self, name: &str, kind: FieldKind, field: &FieldDefinition) -> Vec<String> {
        let mut line = format!("{} [{}] \"{}\"", name, kind, field.label);
        if field.required {
            line.push_str(" required");
        }
        if let Some(default) = &field.default_value {
            line.push_str(&format!(" = {}", default.to_json()));
        }
        if !field.constraints.is_empty() {
            let kinds: Vec<&str> = field.constraints.iter().map(|c| c.kind.as_str()).collect();
            line.push_str(&format!(" ({})", kinds.join(", ")));
        }
        let mut lines = vec![line];
        for entry in &field.entry_fields {
            lines.extend(
                self.add_field(&entry.name, entry.kind, entry)
                    .into_iter()
                    .map(|l| format!("  - {}", l)),
            );
        }
        lines
    }

    fn add_action(&mut self, name: &str, kind: ActionKind, action: &ActionNode) -> Vec<String> {
        vec![format!("<{}> {} \"{}\"", kind.as_str(), name, action.label)]
    }

    fn add_group(
        &mut self,
        name: &str,
        label: &str,
        _group: &GroupNode,
        children: Vec<Vec<String>>,
    ) -> Vec<String> {
        let mut lines = vec![format!("{} \"{}\"", name, label)];
        lines.extend(children.into_iter().flatten().map(|l| format!("  {}", l)));
        lines
    }
}
