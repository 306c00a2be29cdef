//! Typed structs representing a form schema document.
//!
//! Sections and categories are purely structural: they carry layout
//! metadata only and never introduce a data namespace. Free-form parts of
//! the document (field options, attributes, operands, defaults) are kept as
//! `serde_json::Value` so consumers decide how to interpret them.

use serde::Serialize;

/// A JSON object with insertion order preserved.
pub type JsonMap = serde_json::Map<String, serde_json::Value>;

/// Top-level form schema.
#[derive(Debug, Clone, PartialEq)]
pub struct FormSchema {
    /// Form identifier.
    pub slug: String,
    pub sections: Vec<Section>,
    pub display_options: DisplayOptions,
}

impl FormSchema {
    /// Iterate over every question in document order.
    pub fn questions(&self) -> impl Iterator<Item = &Question> {
        self.sections
            .iter()
            .flat_map(|s| s.categories.iter())
            .flat_map(|c| c.questions.iter())
    }
}

/// Layout attributes applied to every section and every category node.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DisplayOptions {
    pub sections: GroupDisplay,
    pub categories: GroupDisplay,
}

/// HTML-ish attributes for a structural group and its label.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GroupDisplay {
    pub attr: JsonMap,
    pub label_attr: JsonMap,
}

// ── Structure ───────────────────────────────────────────────────────

/// A top-level structural grouping of categories.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub slug: String,
    pub title: Option<String>,
    pub categories: Vec<Category>,
    pub submit: Option<SubmitSpec>,
}

/// Submit button declared at the end of a section.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubmitSpec {
    pub label: Option<String>,
    /// Replaces the default CSS class before `attr` is merged.
    pub class: Option<String>,
    pub attr: JsonMap,
}

/// A nested structural grouping of questions.
#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub slug: String,
    pub title: Option<String>,
    pub questions: Vec<Question>,
}

// ── Question ────────────────────────────────────────────────────────

/// A single field descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct Question {
    /// Key of the value in the flat data context.
    pub key: String,
    /// Schema-level type token (`"text"`, `"number"`, ...).
    pub field_type: String,
    pub label: Option<String>,
    pub required: Option<bool>,
    /// Question-level default; only fills a gap in the data context.
    pub data: Option<serde_json::Value>,
    /// Constraint name to options, in declaration order.
    pub constraints: Option<Vec<(String, serde_json::Value)>>,
    pub display_dependencies: Option<Dependencies>,
    /// Entry fields of a collection question.
    pub fields: Vec<Question>,
    /// Every other property of the question, passed through as field options.
    pub options: JsonMap,
}

/// The `displayDependencies` block of a question.
#[derive(Debug, Clone, PartialEq)]
pub enum Dependencies {
    /// Carries both `operator` and `conditions`.
    Rule(ConditionGroup),
    /// Present but missing `operator` or `conditions`; kept verbatim.
    Malformed(serde_json::Value),
}

// ── Conditions ──────────────────────────────────────────────────────

/// Logical operator of a condition group.
///
/// Unrecognized tokens are preserved so evaluation can reject them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GroupOperator {
    #[default]
    And,
    Or,
    Not,
    Other(String),
}

impl GroupOperator {
    pub fn from_token(token: &str) -> GroupOperator {
        match token {
            "AND" => GroupOperator::And,
            "OR" => GroupOperator::Or,
            "NOT" => GroupOperator::Not,
            other => GroupOperator::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            GroupOperator::And => "AND",
            GroupOperator::Or => "OR",
            GroupOperator::Not => "NOT",
            GroupOperator::Other(token) => token,
        }
    }
}

/// A boolean combination of condition nodes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConditionGroup {
    pub operator: GroupOperator,
    pub conditions: Vec<ConditionNode>,
}

/// Either a nested group or a leaf comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionNode {
    Group(ConditionGroup),
    Comparison(Comparison),
}

/// A leaf condition testing one data field.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    /// Referenced data key. A comparison without one never matches.
    pub field: Option<String>,
    /// First recognized operator key on the node, if any.
    pub test: Option<ComparisonTest>,
}

/// Leaf operators, listed in dispatch priority order.
#[derive(Debug, Clone, PartialEq)]
pub enum ComparisonTest {
    IsNotNull,
    IsNull,
    /// Alias of `Equals`.
    HasValue(serde_json::Value),
    Equals(serde_json::Value),
    NotEquals(serde_json::Value),
    In(serde_json::Value),
    NotIn(serde_json::Value),
    Contains(serde_json::Value),
    /// Negates `contains` evaluated against the node's `contains` operand,
    /// which is null whenever this variant is selected.
    NotContains(serde_json::Value),
    GreaterThan(serde_json::Value),
    LessThan(serde_json::Value),
    GreaterThanOrEqual(serde_json::Value),
    LessThanOrEqual(serde_json::Value),
}

impl ComparisonTest {
    /// Operator key as written in schema documents.
    pub fn key(&self) -> &'static str {
        match self {
            ComparisonTest::IsNotNull => "isNotNull",
            ComparisonTest::IsNull => "isNull",
            ComparisonTest::HasValue(_) => "hasValue",
            ComparisonTest::Equals(_) => "equals",
            ComparisonTest::NotEquals(_) => "notEquals",
            ComparisonTest::In(_) => "in",
            ComparisonTest::NotIn(_) => "notIn",
            ComparisonTest::Contains(_) => "contains",
            ComparisonTest::NotContains(_) => "notContains",
            ComparisonTest::GreaterThan(_) => "greaterThan",
            ComparisonTest::LessThan(_) => "lessThan",
            ComparisonTest::GreaterThanOrEqual(_) => "greaterThanOrEqual",
            ComparisonTest::LessThanOrEqual(_) => "lessThanOrEqual",
        }
    }
}
