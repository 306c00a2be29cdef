//! Conditional visibility evaluator.
//!
//! Decides whether a question should be displayed by evaluating its
//! `displayDependencies` condition tree against the flat data context.
//!
//! Groups combine their conditions with `AND` (all, short-circuit), `OR`
//! (any, short-circuit) or `NOT` (negation of the `AND` of all
//! conditions). A group with no conditions is always true. Leaves resolve
//! the referenced field (missing reads as null) and apply the single
//! operator that was selected when the tree was parsed.
//!
//! Evaluation is pure: the data context is only read.

use formtree_interchange::{
    parse_condition_group, Comparison, ComparisonTest, ConditionGroup, ConditionNode,
    GroupOperator, MAX_CONDITION_NESTING,
};

use crate::numeric::{self, NumericOp};
use crate::types::{FormData, Value, VisibilityError};

/// Default nesting limit for condition groups.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Condition tree evaluator with a nesting guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evaluator {
    max_depth: usize,
}

impl Default for Evaluator {
    fn default() -> Self {
        Evaluator::new(DEFAULT_MAX_DEPTH)
    }
}

impl Evaluator {
    pub fn new(max_depth: usize) -> Self {
        Evaluator { max_depth }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Evaluate a condition group against the data context.
    pub fn should_display(
        &self,
        group: &ConditionGroup,
        data: &FormData,
    ) -> Result<bool, VisibilityError> {
        self.eval_group(group, data, 0)
    }

    fn eval_group(
        &self,
        group: &ConditionGroup,
        data: &FormData,
        depth: usize,
    ) -> Result<bool, VisibilityError> {
        if depth > self.max_depth {
            return Err(VisibilityError::DepthExceeded {
                max: self.max_depth,
            });
        }
        if group.conditions.is_empty() {
            return Ok(true);
        }

        match &group.operator {
            GroupOperator::And => self.all(&group.conditions, data, depth),
            GroupOperator::Or => {
                for node in &group.conditions {
                    if self.eval_node(node, data, depth)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            GroupOperator::Not => Ok(!self.all(&group.conditions, data, depth)?),
            GroupOperator::Other(token) => Err(VisibilityError::UnsupportedOperator {
                operator: token.clone(),
            }),
        }
    }

    fn all(
        &self,
        nodes: &[ConditionNode],
        data: &FormData,
        depth: usize,
    ) -> Result<bool, VisibilityError> {
        for node in nodes {
            if !self.eval_node(node, data, depth)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn eval_node(
        &self,
        node: &ConditionNode,
        data: &FormData,
        depth: usize,
    ) -> Result<bool, VisibilityError> {
        match node {
            ConditionNode::Group(group) => self.eval_group(group, data, depth + 1),
            ConditionNode::Comparison(cmp) => Ok(eval_comparison(cmp, data)),
        }
    }
}

/// Evaluate with the default nesting limit.
pub fn should_display(group: &ConditionGroup, data: &FormData) -> Result<bool, VisibilityError> {
    Evaluator::default().should_display(group, data)
}

/// Evaluate a raw JSON dependency block. Null or empty blocks are always
/// displayed; a missing `operator` means `AND`.
pub fn should_display_json(
    dependencies: &serde_json::Value,
    data: &FormData,
) -> Result<bool, VisibilityError> {
    let empty = match dependencies {
        serde_json::Value::Null => true,
        serde_json::Value::Object(map) => map.is_empty(),
        serde_json::Value::Array(arr) => arr.is_empty(),
        _ => false,
    };
    if empty {
        return Ok(true);
    }
    let group = parse_condition_group(dependencies).map_err(|_| VisibilityError::DepthExceeded {
        max: MAX_CONDITION_NESTING,
    })?;
    Evaluator::default().should_display(&group, data)
}

// ──────────────────────────────────────────────
// Leaves
// ──────────────────────────────────────────────

fn eval_comparison(cmp: &Comparison, data: &FormData) -> bool {
    let (Some(field), Some(test)) = (&cmp.field, &cmp.test) else {
        return false;
    };
    let value = data.resolve(field);
    let operand = |raw: &serde_json::Value| Value::from_json(raw);

    match test {
        ComparisonTest::IsNotNull => is_not_null(value),
        ComparisonTest::IsNull => !is_not_null(value),
        ComparisonTest::HasValue(raw) | ComparisonTest::Equals(raw) => *value == operand(raw),
        ComparisonTest::NotEquals(raw) => *value != operand(raw),
        ComparisonTest::In(raw) => in_list(value, &operand(raw)),
        ComparisonTest::NotIn(raw) => !in_list(value, &operand(raw)),
        ComparisonTest::Contains(raw) => contains(value, &operand(raw)),
        ComparisonTest::NotContains(raw) => !contains(value, &operand(raw)),
        ComparisonTest::GreaterThan(raw) => {
            numeric::compare(value, &operand(raw), NumericOp::GreaterThan)
        }
        ComparisonTest::LessThan(raw) => numeric::compare(value, &operand(raw), NumericOp::LessThan),
        ComparisonTest::GreaterThanOrEqual(raw) => {
            numeric::compare(value, &operand(raw), NumericOp::GreaterThanOrEqual)
        }
        ComparisonTest::LessThanOrEqual(raw) => {
            numeric::compare(value, &operand(raw), NumericOp::LessThanOrEqual)
        }
    }
}

/// Null, empty text and empty collections are "null".
fn is_not_null(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Text(s) => !s.is_empty(),
        Value::List(items) => !items.is_empty(),
        Value::Map(map) => !map.is_empty(),
        _ => true,
    }
}

/// Strict membership of `v` among the elements of `candidates`.
fn in_list(v: &Value, candidates: &Value) -> bool {
    match candidates {
        Value::List(items) => items.contains(v),
        Value::Map(map) => map.values().any(|item| item == v),
        _ => false,
    }
}

/// Collection membership, or substring when both sides are text.
fn contains(haystack: &Value, needle: &Value) -> bool {
    match (haystack, needle) {
        (Value::List(items), _) => items.contains(needle),
        (Value::Map(map), _) => map.values().any(|item| item == needle),
        (Value::Text(h), Value::Text(n)) => h.contains(n.as_str()),
        _ => false,
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
