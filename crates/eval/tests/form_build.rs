//! End-to-end form builds through the public API.
//!
//! Each test builds a schema document inline with `json!`, runs the full
//! pipeline (deserialize, seed, assemble, evaluate visibility) and checks
//! the resulting tree.

use formtree_eval::{
    build_form, visibility_report, BuildConfig, BuildError, ConstraintError, FieldKind,
    FormBuilder, FormData, FormNode, FormTree, Value, VisibilityError,
};
use formtree_interchange::SchemaError;
use serde_json::json;

// ──────────────────────────────────────────────
// Test helpers
// ──────────────────────────────────────────────

fn one_category(questions: serde_json::Value) -> serde_json::Value {
    json!({
        "slug": "form",
        "sections": [{
            "slug": "s1",
            "categories": [{ "slug": "c1", "questions": questions }]
        }]
    })
}

fn promo_schema() -> serde_json::Value {
    one_category(json!([
        { "key": "country", "type": "country" },
        {
            "key": "promo",
            "type": "text",
            "displayDependencies": {
                "operator": "AND",
                "conditions": [{ "field": "country", "equals": "FR" }]
            }
        }
    ]))
}

fn field_names(tree: &FormTree) -> Vec<&str> {
    tree.fields().iter().map(|f| f.name.as_str()).collect()
}

// ──────────────────────────────────────────────
// Structure
// ──────────────────────────────────────────────

#[test]
fn single_numeric_question_with_default_submit() {
    let tree = build_form(
        &one_category(json!([{ "key": "age", "type": "number" }])),
        &json!({}),
    )
    .unwrap();

    assert_eq!(tree.name, "form");
    assert_eq!(tree.children.len(), 2);

    let FormNode::Group(section) = &tree.children[0] else {
        panic!("expected section group, got {:?}", tree.children[0]);
    };
    assert_eq!(section.name, "s1");
    assert_eq!(section.label, "S1");
    let FormNode::Group(category) = &section.children[0] else {
        panic!("expected category group");
    };
    assert_eq!(category.label, "C1");

    let age = tree.field("age").unwrap();
    assert_eq!(age.kind, FieldKind::Integer);
    assert_eq!(age.default_value, None);

    let FormNode::Action(submit) = &tree.children[1] else {
        panic!("expected root submit");
    };
    assert_eq!(submit.name, "submit");
    assert_eq!(submit.label, "Send");
    assert_eq!(submit.attr["class"], json!("btn btn-primary"));
}

#[test]
fn section_submit_replaces_root_default() {
    let schema = json!({
        "slug": "wizard",
        "sections": [
            {
                "slug": "first",
                "categories": [],
                "submit": { "label": "Next", "attr": { "data-step": 1 } }
            },
            { "slug": "second", "title": "Second step", "categories": [] }
        ]
    });
    let tree = build_form(&schema, &json!(null)).unwrap();

    assert_eq!(tree.children.len(), 2, "no root submit expected");
    let actions = tree.actions();
    assert_eq!(actions.len(), 1);
    assert_eq!(actions[0].label, "Next");
    assert_eq!(actions[0].attr["class"], json!("btn btn-primary"));
    assert_eq!(actions[0].attr["data-step"], json!(1));

    let FormNode::Group(second) = &tree.children[1] else {
        panic!("expected group");
    };
    assert_eq!(second.label, "Second step");
}

#[test]
fn empty_submit_array_adds_a_default_section_submit() {
    let schema = json!({
        "slug": "f",
        "sections": [{ "slug": "only", "categories": [], "submit": [] }]
    });
    let tree = build_form(&schema, &json!(null)).unwrap();

    assert_eq!(tree.children.len(), 1, "no root submit expected");
    let FormNode::Group(section) = &tree.children[0] else {
        panic!("expected group");
    };
    let Some(FormNode::Action(submit)) = section.children.last() else {
        panic!("expected section submit");
    };
    assert_eq!(submit.label, "Send");
    assert_eq!(submit.attr["class"], json!("btn btn-primary"));
}

#[test]
fn display_options_are_copied_onto_groups() {
    let mut schema = one_category(json!([{ "key": "a", "type": "text" }]));
    schema["displayOptions"] = json!({
        "sections": { "attr": { "class": "card" }, "label_attr": { "class": "h2" } },
        "categories": { "attr": { "class": "row" } }
    });
    let tree = build_form(&schema, &json!({})).unwrap();

    let FormNode::Group(section) = &tree.children[0] else {
        panic!("expected group");
    };
    assert_eq!(section.attr["class"], json!("card"));
    assert_eq!(section.label_attr["class"], json!("h2"));
    let FormNode::Group(category) = &section.children[0] else {
        panic!("expected group");
    };
    assert_eq!(category.attr["class"], json!("row"));
    assert!(category.label_attr.is_empty());
}

#[test]
fn unknown_type_tokens_become_text_fields() {
    let tree = build_form(
        &one_category(json!([{ "key": "bio", "type": "textarea", "rows": 4 }])),
        &json!({}),
    )
    .unwrap();
    let bio = tree.field("bio").unwrap();
    assert_eq!(bio.kind, FieldKind::Text);
    assert_eq!(bio.options["rows"], json!(4));
}

// ──────────────────────────────────────────────
// Values
// ──────────────────────────────────────────────

#[test]
fn defaults_come_from_data_then_question() {
    let tree = build_form(
        &one_category(json!([
            { "key": "qty", "type": "integer", "data": 3 },
            { "key": "price", "type": "number", "data": "9.90" },
            { "key": "city", "type": "text", "data": "Lyon" }
        ])),
        &json!({ "qty": "12", "city": null }),
    )
    .unwrap();

    assert_eq!(tree.field("qty").unwrap().default_value, Some(Value::Int(12)));
    assert_eq!(tree.field("price").unwrap().default_value, Some(Value::Int(9)));
    assert_eq!(tree.field("city").unwrap().default_value, Some(Value::from("Lyon")));
    assert_eq!(tree.data.resolve("city"), &Value::from("Lyon"));
}

#[test]
fn caller_data_is_left_untouched() {
    let schema = formtree_interchange::from_schema(&one_category(json!([
        { "key": "a", "type": "text", "data": "x" }
    ])))
    .unwrap();
    let data = FormData::new();
    let tree = FormBuilder::default().build(&schema, &data).unwrap();
    assert!(data.is_empty());
    assert_eq!(tree.data.resolve("a"), &Value::from("x"));
}

#[test]
fn identical_inputs_give_identical_trees() {
    let schema = promo_schema();
    let data = json!({ "country": "FR" });
    assert_eq!(
        build_form(&schema, &data).unwrap(),
        build_form(&schema, &data).unwrap()
    );
}

// ──────────────────────────────────────────────
// Visibility
// ──────────────────────────────────────────────

#[test]
fn promo_shown_for_france_hidden_elsewhere() {
    let shown = build_form(&promo_schema(), &json!({ "country": "FR" })).unwrap();
    assert_eq!(field_names(&shown), vec!["country", "promo"]);

    let hidden = build_form(&promo_schema(), &json!({ "country": "US" })).unwrap();
    assert_eq!(field_names(&hidden), vec!["country"]);
}

#[test]
fn seeded_defaults_drive_later_visibility() {
    let schema = one_category(json!([
        { "key": "country", "type": "country", "data": "FR" },
        {
            "key": "promo",
            "type": "text",
            "displayDependencies": {
                "operator": "AND",
                "conditions": [{ "field": "country", "equals": "FR" }]
            }
        }
    ]));
    let tree = build_form(&schema, &json!({})).unwrap();
    assert!(tree.field("promo").is_some());
}

#[test]
fn malformed_dependencies_always_include() {
    let tree = build_form(
        &one_category(json!([{
            "key": "x",
            "type": "text",
            "displayDependencies": { "conditions": [{ "field": "y", "isNotNull": true }] }
        }])),
        &json!({}),
    )
    .unwrap();
    assert!(tree.field("x").is_some());
}

#[test]
fn unsupported_operator_aborts_the_build() {
    let err = build_form(
        &one_category(json!([{
            "key": "x",
            "type": "text",
            "displayDependencies": {
                "operator": "XOR",
                "conditions": [{ "field": "y", "isNull": true }]
            }
        }])),
        &json!({}),
    )
    .unwrap_err();
    assert_eq!(
        err,
        BuildError::Visibility {
            field: "x".to_string(),
            source: VisibilityError::UnsupportedOperator {
                operator: "XOR".to_string()
            },
        }
    );
}

#[test]
fn report_matches_build_decisions() {
    let report = visibility_report(&promo_schema(), &json!({ "country": "US" })).unwrap();
    let hidden: Vec<&str> = report
        .iter()
        .filter(|d| !d.visible)
        .map(|d| d.key.as_str())
        .collect();
    assert_eq!(hidden, vec!["promo"]);
    assert!(report.iter().all(|d| d.section == "s1" && d.category == "c1"));
}

// ──────────────────────────────────────────────
// Errors
// ──────────────────────────────────────────────

#[test]
fn unknown_constraint_produces_no_tree() {
    let err = build_form(
        &one_category(json!([
            { "key": "name", "type": "text", "constraints": { "NotBlank": null, "Bogus": {} } }
        ])),
        &json!({}),
    )
    .unwrap_err();
    assert_eq!(
        err,
        BuildError::Constraint {
            field: "name".to_string(),
            source: ConstraintError::Unknown {
                name: "Bogus".to_string()
            },
        }
    );
}

#[test]
fn extra_constraints_from_config_are_accepted() {
    let builder = FormBuilder::new(BuildConfig {
        extra_constraints: vec!["Bogus".to_string()],
        ..BuildConfig::default()
    });
    let tree = builder
        .build_json(
            &one_category(json!([
                { "key": "name", "type": "text", "constraints": { "Bogus": { "strict": true } } }
            ])),
            &json!({}),
        )
        .unwrap();
    let constraints = &tree.field("name").unwrap().constraints;
    assert_eq!(constraints[0].kind, "Bogus");
    assert_eq!(constraints[0].options.as_ref().unwrap()["strict"], json!(true));
}

#[test]
fn missing_mandatory_fields_are_schema_errors() {
    let err = build_form(&json!({ "sections": [] }), &json!({})).unwrap_err();
    assert!(matches!(err, BuildError::Schema(SchemaError::MissingField { .. })));

    let err = build_form(
        &one_category(json!([{ "key": "no_type" }])),
        &json!({}),
    )
    .unwrap_err();
    assert!(matches!(err, BuildError::Schema(SchemaError::InvalidQuestion { .. })));
}

#[test]
fn non_object_data_is_rejected() {
    let err = build_form(&promo_schema(), &json!("FR")).unwrap_err();
    assert_eq!(
        err,
        BuildError::InvalidData {
            got: "string".to_string()
        }
    );
}

#[test]
fn custom_submit_defaults_from_config() {
    let builder = FormBuilder::new(BuildConfig {
        submit_name: "go".to_string(),
        submit_label: "Continue".to_string(),
        submit_class: "button".to_string(),
        ..BuildConfig::default()
    });
    let tree = builder
        .build_json(&one_category(json!([])), &json!({}))
        .unwrap();
    let submit = tree.actions()[0];
    assert_eq!(submit.name, "go");
    assert_eq!(submit.label, "Continue");
    assert_eq!(submit.attr["class"], json!("button"));
}

#[test]
fn public_types_are_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<FormBuilder>();
    assert_send_sync::<FormTree>();
    assert_send_sync::<FormData>();
    assert_send_sync::<BuildError>();
}
