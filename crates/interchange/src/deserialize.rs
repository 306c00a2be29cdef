//! Deserialization from form schema JSON into typed structs.
//!
//! The main entry point is [`from_schema`], which takes a
//! `&serde_json::Value` and produces a [`FormSchema`]. Mandatory fields are
//! checked here; everything else is lenient so that optional, oddly-typed
//! properties degrade to their defaults instead of failing the document.

use crate::types::*;

/// Maximum nesting of condition groups accepted while parsing.
pub const MAX_CONDITION_NESTING: usize = 128;

/// Errors raised for missing or invalid mandatory schema fields.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    /// The document is missing a required top-level field.
    #[error("schema missing required field: '{field}'")]
    MissingField { field: String },

    /// The document (or one of its top-level fields) has the wrong shape.
    #[error("invalid schema document: {0}")]
    InvalidDocument(String),

    /// A section is missing its slug or is not an object.
    #[error("section #{index}: {message}")]
    InvalidSection { index: usize, message: String },

    /// A category is missing its slug or is not an object.
    #[error("category #{index} in section '{section}': {message}")]
    InvalidCategory {
        section: String,
        index: usize,
        message: String,
    },

    /// A question is missing `key` or `type`.
    #[error("question #{index} in '{scope}': {message}")]
    InvalidQuestion {
        scope: String,
        index: usize,
        message: String,
    },

    /// Condition groups nest deeper than [`MAX_CONDITION_NESTING`].
    #[error("conditions of question '{key}' nest deeper than {max} levels")]
    ConditionTooDeep { key: String, max: usize },
}

/// Deserialize a form schema document into typed structs.
///
/// Fails when `slug` or `sections` is absent, when a section or category
/// has no non-empty slug, or when a question lacks `key` or `type`.
pub fn from_schema(doc: &serde_json::Value) -> Result<FormSchema, SchemaError> {
    let obj = doc
        .as_object()
        .ok_or_else(|| SchemaError::InvalidDocument("schema must be a JSON object".to_string()))?;

    let sections_val = obj
        .get("sections")
        .filter(|v| !v.is_null())
        .ok_or_else(|| SchemaError::MissingField {
            field: "sections".to_string(),
        })?;

    let slug = match obj.get("slug") {
        None | Some(serde_json::Value::Null) => {
            return Err(SchemaError::MissingField {
                field: "slug".to_string(),
            })
        }
        Some(v) => v
            .as_str()
            .ok_or_else(|| SchemaError::InvalidDocument("'slug' must be a string".to_string()))?
            .to_string(),
    };

    let sections_arr = sections_val
        .as_array()
        .ok_or_else(|| SchemaError::InvalidDocument("'sections' must be an array".to_string()))?;

    let mut sections = Vec::with_capacity(sections_arr.len());
    for (index, section) in sections_arr.iter().enumerate() {
        sections.push(parse_section(index, section)?);
    }

    let display_options = parse_display_options(obj.get("displayOptions"));

    Ok(FormSchema {
        slug,
        sections,
        display_options,
    })
}

// ── Parsing helpers ─────────────────────────────────────────────────

fn optional_str(obj: &serde_json::Value, field: &str) -> Option<String> {
    obj.get(field)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
}

fn optional_map(obj: Option<&serde_json::Value>, field: &str) -> JsonMap {
    obj.and_then(|o| o.get(field))
        .and_then(|v| v.as_object())
        .cloned()
        .unwrap_or_default()
}

/// A slug must be a string with at least one non-whitespace character.
fn non_empty_slug(obj: &serde_json::Value) -> Option<String> {
    obj.get("slug")
        .and_then(|v| v.as_str())
        .filter(|s| !s.trim().is_empty())
        .map(|s| s.to_string())
}

fn parse_display_options(v: Option<&serde_json::Value>) -> DisplayOptions {
    let group = |name: &str| {
        let node = v.and_then(|o| o.get(name));
        GroupDisplay {
            attr: optional_map(node, "attr"),
            label_attr: optional_map(node, "label_attr"),
        }
    };
    DisplayOptions {
        sections: group("sections"),
        categories: group("categories"),
    }
}

fn parse_section(index: usize, obj: &serde_json::Value) -> Result<Section, SchemaError> {
    let slug = non_empty_slug(obj).ok_or_else(|| SchemaError::InvalidSection {
        index,
        message: "each section must have a 'slug' (non-empty string)".to_string(),
    })?;

    let mut categories = Vec::new();
    if let Some(arr) = obj.get("categories").and_then(|c| c.as_array()) {
        for (cat_index, category) in arr.iter().enumerate() {
            categories.push(parse_category(&slug, cat_index, category)?);
        }
    }

    // An array (usually `[]`) asks for a submit with default settings.
    let submit = match obj.get("submit") {
        Some(s) if s.is_object() => Some(SubmitSpec {
            label: optional_str(s, "label"),
            class: optional_str(s, "class"),
            attr: optional_map(Some(s), "attr"),
        }),
        Some(serde_json::Value::Array(_)) => Some(SubmitSpec::default()),
        _ => None,
    };

    Ok(Section {
        title: optional_str(obj, "title"),
        slug,
        categories,
        submit,
    })
}

fn parse_category(
    section: &str,
    index: usize,
    obj: &serde_json::Value,
) -> Result<Category, SchemaError> {
    let slug = non_empty_slug(obj).ok_or_else(|| SchemaError::InvalidCategory {
        section: section.to_string(),
        index,
        message: "each category must have a 'slug' (non-empty string)".to_string(),
    })?;

    let scope = format!("{}/{}", section, slug);
    let mut questions = Vec::new();
    if let Some(arr) = obj.get("questions").and_then(|q| q.as_array()) {
        for (q_index, question) in arr.iter().enumerate() {
            questions.push(parse_question(&scope, q_index, question)?);
        }
    }

    Ok(Category {
        title: optional_str(obj, "title"),
        slug,
        questions,
    })
}

/// Properties consumed by [`parse_question`]; everything else becomes an option.
const QUESTION_KEYS: &[&str] = &[
    "key",
    "type",
    "label",
    "required",
    "data",
    "constraints",
    "displayDependencies",
    "fields",
];

/// Parse one question-shaped object.
///
/// `scope` names the enclosing category (or collection) for error messages.
pub fn parse_question(
    scope: &str,
    index: usize,
    obj: &serde_json::Value,
) -> Result<Question, SchemaError> {
    let invalid = |message: &str| SchemaError::InvalidQuestion {
        scope: scope.to_string(),
        index,
        message: message.to_string(),
    };

    let map = obj
        .as_object()
        .ok_or_else(|| invalid("question must be a JSON object"))?;

    let key = map
        .get("key")
        .and_then(|v| v.as_str())
        .ok_or_else(|| invalid("each question must have at least a 'key' and a 'type'"))?
        .to_string();
    let field_type = map
        .get("type")
        .and_then(|v| v.as_str())
        .ok_or_else(|| invalid("each question must have at least a 'key' and a 'type'"))?
        .to_string();

    let constraints = map
        .get("constraints")
        .filter(|c| !c.is_null() && c.as_array().map_or(true, |a| !a.is_empty()))
        .map(|c| match c.as_object() {
            Some(entries) => Ok(entries
                .iter()
                .map(|(name, options)| (name.clone(), options.clone()))
                .collect::<Vec<_>>()),
            None => Err(invalid("'constraints' must be an object")),
        })
        .transpose()?;

    let display_dependencies = map
        .get("displayDependencies")
        .map(|deps| parse_dependencies(&key, deps))
        .transpose()?
        .flatten();

    let mut fields = Vec::new();
    if let Some(arr) = map.get("fields").and_then(|f| f.as_array()) {
        let entry_scope = format!("{}:{}", scope, key);
        for (f_index, field) in arr.iter().enumerate() {
            fields.push(parse_question(&entry_scope, f_index, field)?);
        }
    }

    let options = map
        .iter()
        .filter(|(k, _)| !QUESTION_KEYS.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect::<JsonMap>();

    Ok(Question {
        label: map.get("label").and_then(|v| v.as_str()).map(|s| s.to_string()),
        required: map.get("required").and_then(|v| v.as_bool()),
        data: map.get("data").filter(|v| !v.is_null()).cloned(),
        key,
        field_type,
        constraints,
        display_dependencies,
        fields,
        options,
    })
}

/// Classify a `displayDependencies` block.
///
/// Null or empty blocks are treated as absent.
fn parse_dependencies(
    key: &str,
    deps: &serde_json::Value,
) -> Result<Option<Dependencies>, SchemaError> {
    match deps {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::Object(map) if map.is_empty() => Ok(None),
        serde_json::Value::Array(arr) if arr.is_empty() => Ok(None),
        serde_json::Value::Object(map)
            if map.contains_key("operator") && map.contains_key("conditions") =>
        {
            let group = parse_group(deps, 0).map_err(|_| SchemaError::ConditionTooDeep {
                key: key.to_string(),
                max: MAX_CONDITION_NESTING,
            })?;
            Ok(Some(Dependencies::Rule(group)))
        }
        other => Ok(Some(Dependencies::Malformed(other.clone()))),
    }
}

/// Nesting limit exceeded while parsing a condition tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NestingExceeded;

/// Parse a condition group leniently.
///
/// A missing `operator` defaults to `AND`; missing or non-array
/// `conditions` becomes an empty list.
pub fn parse_condition_group(v: &serde_json::Value) -> Result<ConditionGroup, NestingExceeded> {
    parse_group(v, 0)
}

fn parse_group(v: &serde_json::Value, depth: usize) -> Result<ConditionGroup, NestingExceeded> {
    if depth >= MAX_CONDITION_NESTING {
        return Err(NestingExceeded);
    }

    let operator = match v.get("operator") {
        None | Some(serde_json::Value::Null) => GroupOperator::And,
        Some(serde_json::Value::String(s)) => GroupOperator::from_token(s),
        Some(other) => GroupOperator::Other(other.to_string()),
    };

    let mut conditions = Vec::new();
    if let Some(arr) = v.get("conditions").and_then(|c| c.as_array()) {
        for node in arr {
            conditions.push(parse_node(node, depth + 1)?);
        }
    }

    Ok(ConditionGroup {
        operator,
        conditions,
    })
}

fn parse_node(v: &serde_json::Value, depth: usize) -> Result<ConditionNode, NestingExceeded> {
    if v.get("operator").is_some() && v.get("conditions").is_some() {
        return Ok(ConditionNode::Group(parse_group(v, depth)?));
    }
    Ok(ConditionNode::Comparison(Comparison {
        field: optional_str(v, "field"),
        test: parse_test(v),
    }))
}

/// Select the first operator key present on a leaf, in priority order.
fn parse_test(v: &serde_json::Value) -> Option<ComparisonTest> {
    let obj = v.as_object()?;
    let operand = |key: &str| obj.get(key).cloned().unwrap_or(serde_json::Value::Null);

    if obj.contains_key("isNotNull") {
        Some(ComparisonTest::IsNotNull)
    } else if obj.contains_key("isNull") {
        Some(ComparisonTest::IsNull)
    } else if obj.contains_key("hasValue") {
        Some(ComparisonTest::HasValue(operand("hasValue")))
    } else if obj.contains_key("equals") {
        Some(ComparisonTest::Equals(operand("equals")))
    } else if obj.contains_key("notEquals") {
        Some(ComparisonTest::NotEquals(operand("notEquals")))
    } else if obj.contains_key("in") {
        Some(ComparisonTest::In(operand("in")))
    } else if obj.contains_key("notIn") {
        Some(ComparisonTest::NotIn(operand("notIn")))
    } else if obj.contains_key("contains") {
        Some(ComparisonTest::Contains(operand("contains")))
    } else if obj.contains_key("notContains") {
        Some(ComparisonTest::NotContains(operand("contains")))
    } else if obj.contains_key("greaterThan") {
        Some(ComparisonTest::GreaterThan(operand("greaterThan")))
    } else if obj.contains_key("lessThan") {
        Some(ComparisonTest::LessThan(operand("lessThan")))
    } else if obj.contains_key("greaterThanOrEqual") {
        Some(ComparisonTest::GreaterThanOrEqual(operand("greaterThanOrEqual")))
    } else if obj.contains_key("lessThanOrEqual") {
        Some(ComparisonTest::LessThanOrEqual(operand("lessThanOrEqual")))
    } else {
        None
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn minimal(question: serde_json::Value) -> serde_json::Value {
        json!({
            "slug": "form",
            "sections": [{
                "slug": "s1",
                "categories": [{ "slug": "c1", "questions": [question] }]
            }]
        })
    }

    #[test]
    fn missing_slug_is_rejected() {
        let err = from_schema(&json!({ "sections": [] })).unwrap_err();
        assert_eq!(
            err,
            SchemaError::MissingField {
                field: "slug".to_string()
            }
        );
    }

    #[test]
    fn missing_sections_is_rejected() {
        let err = from_schema(&json!({ "slug": "x" })).unwrap_err();
        assert_eq!(
            err,
            SchemaError::MissingField {
                field: "sections".to_string()
            }
        );
    }

    #[test]
    fn blank_section_slug_is_rejected() {
        let err = from_schema(&json!({
            "slug": "x",
            "sections": [{ "slug": "   ", "categories": [] }]
        }))
        .unwrap_err();
        assert!(matches!(err, SchemaError::InvalidSection { index: 0, .. }));
    }

    #[test]
    fn category_without_slug_names_its_section() {
        let err = from_schema(&json!({
            "slug": "x",
            "sections": [{ "slug": "s1", "categories": [{ "title": "No slug" }] }]
        }))
        .unwrap_err();
        match err {
            SchemaError::InvalidCategory { section, index, .. } => {
                assert_eq!(section, "s1");
                assert_eq!(index, 0);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn question_without_type_is_rejected() {
        let err = from_schema(&minimal(json!({ "key": "age" }))).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidQuestion { .. }));
        assert!(err.to_string().contains("s1/c1"));
    }

    #[test]
    fn question_properties_split_into_known_and_options() {
        let schema = from_schema(&minimal(json!({
            "key": "color",
            "type": "choice",
            "label": "Colour",
            "required": true,
            "data": "red",
            "choices": { "Red": "red", "Blue": "blue" },
            "help": "Pick one"
        })))
        .unwrap();
        let q = schema.questions().next().unwrap();
        assert_eq!(q.key, "color");
        assert_eq!(q.field_type, "choice");
        assert_eq!(q.label.as_deref(), Some("Colour"));
        assert_eq!(q.required, Some(true));
        assert_eq!(q.data, Some(json!("red")));
        let keys: Vec<&str> = q.options.keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["choices", "help"]);
    }

    #[test]
    fn constraints_keep_declaration_order() {
        let schema = from_schema(&minimal(json!({
            "key": "name",
            "type": "text",
            "constraints": { "NotBlank": null, "Length": { "min": 2 }, "Email": {} }
        })))
        .unwrap();
        let q = schema.questions().next().unwrap();
        let names: Vec<&str> = q
            .constraints
            .as_ref()
            .unwrap()
            .iter()
            .map(|(n, _)| n.as_str())
            .collect();
        assert_eq!(names, vec!["NotBlank", "Length", "Email"]);
    }

    #[test]
    fn empty_constraint_list_means_none() {
        let schema = from_schema(&minimal(json!({
            "key": "name",
            "type": "text",
            "constraints": []
        })))
        .unwrap();
        assert_eq!(schema.questions().next().unwrap().constraints, None);

        let err = from_schema(&minimal(json!({
            "key": "name",
            "type": "text",
            "constraints": ["NotBlank"]
        })))
        .unwrap_err();
        assert!(err.to_string().contains("'constraints' must be an object"));
    }

    #[test]
    fn dependencies_without_conditions_are_malformed() {
        let schema = from_schema(&minimal(json!({
            "key": "promo",
            "type": "text",
            "displayDependencies": { "operator": "AND" }
        })))
        .unwrap();
        let q = schema.questions().next().unwrap();
        assert!(matches!(
            q.display_dependencies,
            Some(Dependencies::Malformed(_))
        ));
    }

    #[test]
    fn nested_groups_and_leaf_priority() {
        let group = parse_condition_group(&json!({
            "operator": "OR",
            "conditions": [
                { "field": "a", "equals": 1, "isNull": true },
                { "operator": "NOT", "conditions": [{ "field": "b", "notContains": "x" }] },
                { "field": "c" }
            ]
        }))
        .unwrap();
        assert_eq!(group.operator, GroupOperator::Or);
        match &group.conditions[0] {
            ConditionNode::Comparison(c) => {
                assert_eq!(c.field.as_deref(), Some("a"));
                assert_eq!(c.test, Some(ComparisonTest::IsNull));
            }
            other => panic!("expected comparison, got {:?}", other),
        }
        match &group.conditions[1] {
            ConditionNode::Group(g) => {
                assert_eq!(g.operator, GroupOperator::Not);
                match &g.conditions[0] {
                    ConditionNode::Comparison(c) => assert_eq!(
                        c.test,
                        Some(ComparisonTest::NotContains(serde_json::Value::Null))
                    ),
                    other => panic!("expected comparison, got {:?}", other),
                }
            }
            other => panic!("expected group, got {:?}", other),
        }
        match &group.conditions[2] {
            ConditionNode::Comparison(c) => assert_eq!(c.test, None),
            other => panic!("expected comparison, got {:?}", other),
        }
    }

    #[test]
    fn unknown_operator_token_is_preserved() {
        let group = parse_condition_group(&json!({ "operator": "XOR", "conditions": [] })).unwrap();
        assert_eq!(group.operator, GroupOperator::Other("XOR".to_string()));
    }

    #[test]
    fn overly_deep_conditions_are_rejected() {
        let mut node = json!({ "field": "x", "isNull": true });
        for _ in 0..(MAX_CONDITION_NESTING + 1) {
            node = json!({ "operator": "AND", "conditions": [node] });
        }
        let err = from_schema(&minimal(json!({
            "key": "deep",
            "type": "text",
            "displayDependencies": node
        })))
        .unwrap_err();
        assert!(matches!(err, SchemaError::ConditionTooDeep { .. }));
    }

    #[test]
    fn display_options_and_submit_are_read() {
        let schema = from_schema(&json!({
            "slug": "f",
            "displayOptions": {
                "sections": { "attr": { "class": "section" } },
                "categories": { "label_attr": { "class": "legend" } }
            },
            "sections": [{
                "slug": "s1",
                "submit": { "label": "Go", "class": "btn", "attr": { "id": "go" } },
                "categories": []
            }]
        }))
        .unwrap();
        assert_eq!(
            schema.display_options.sections.attr.get("class"),
            Some(&json!("section"))
        );
        assert_eq!(
            schema.display_options.categories.label_attr.get("class"),
            Some(&json!("legend"))
        );
        let submit = schema.sections[0].submit.as_ref().unwrap();
        assert_eq!(submit.label.as_deref(), Some("Go"));
        assert_eq!(submit.class.as_deref(), Some("btn"));
        assert_eq!(submit.attr.get("id"), Some(&json!("go")));
    }

    #[test]
    fn submit_array_uses_default_settings() {
        let schema = from_schema(&json!({
            "slug": "f",
            "sections": [
                { "slug": "s1", "submit": [], "categories": [] },
                { "slug": "s2", "submit": "yes", "categories": [] }
            ]
        }))
        .unwrap();
        assert_eq!(schema.sections[0].submit, Some(SubmitSpec::default()));
        assert_eq!(schema.sections[1].submit, None);
    }

    #[test]
    fn collection_entry_fields_are_parsed() {
        let schema = from_schema(&minimal(json!({
            "key": "guests",
            "type": "collection",
            "fields": [
                { "key": "name", "type": "text" },
                { "key": "age", "type": "integer" }
            ]
        })))
        .unwrap();
        let q = schema.questions().next().unwrap();
        assert_eq!(q.fields.len(), 2);
        assert_eq!(q.fields[1].key, "age");
        assert!(!q.options.contains_key("fields"));
    }
}
