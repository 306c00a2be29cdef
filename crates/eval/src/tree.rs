//! Output tree produced by a form build.
//!
//! The tree is a pure value: groups for sections and categories, fields for
//! included questions, and submit actions. It also carries the flat data
//! context as it stood after seeding so a host can bind values directly.

use formtree_interchange::JsonMap;
use serde::Serialize;

use crate::constraints::ConstraintDescriptor;
use crate::kinds::FieldKind;
use crate::types::{FormData, Value};

/// Strongly-typed description of one field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    pub name: String,
    pub kind: FieldKind,
    pub label: String,
    pub required: bool,
    /// `None` leaves the host widget's default in place.
    pub default_value: Option<Value>,
    pub constraints: Vec<ConstraintDescriptor>,
    /// Remaining question properties, passed through untouched.
    pub options: JsonMap,
    /// Per-row field template of a collection field.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub entry_fields: Vec<FieldDefinition>,
}

/// Structural node for a section or a category.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupNode {
    pub name: String,
    pub label: String,
    pub attr: JsonMap,
    pub label_attr: JsonMap,
    pub children: Vec<FormNode>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Submit,
}

impl ActionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::Submit => "submit",
        }
    }
}

/// A button-like node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionNode {
    pub name: String,
    pub kind: ActionKind,
    pub label: String,
    pub attr: JsonMap,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "node", rename_all = "lowercase")]
pub enum FormNode {
    Group(GroupNode),
    Field(FieldDefinition),
    Action(ActionNode),
}

/// Root of a built form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormTree {
    /// The schema slug.
    pub name: String,
    pub children: Vec<FormNode>,
    /// Data context after question defaults were seeded.
    pub data: FormData,
}

impl FormTree {
    /// Every field in document order, at any depth.
    pub fn fields(&self) -> Vec<&FieldDefinition> {
        let mut out = Vec::new();
        collect_fields(&self.children, &mut out);
        out
    }

    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields().into_iter().find(|f| f.name == name)
    }

    /// Every action in document order, at any depth.
    pub fn actions(&self) -> Vec<&ActionNode> {
        let mut out = Vec::new();
        collect_actions(&self.children, &mut out);
        out
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

fn collect_fields<'a>(nodes: &'a [FormNode], out: &mut Vec<&'a FieldDefinition>) {
    for node in nodes {
        match node {
            FormNode::Group(g) => collect_fields(&g.children, out),
            FormNode::Field(f) => out.push(f),
            FormNode::Action(_) => {}
        }
    }
}

fn collect_actions<'a>(nodes: &'a [FormNode], out: &mut Vec<&'a ActionNode>) {
    for node in nodes {
        match node {
            FormNode::Group(g) => collect_actions(&g.children, out),
            FormNode::Action(a) => out.push(a),
            FormNode::Field(_) => {}
        }
    }
}
