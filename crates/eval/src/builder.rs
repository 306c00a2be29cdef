//! Form tree builder.
//!
//! Walks a schema document section by section, category by category and
//! question by question. Each question is first seeded into the build's own
//! copy of the data context (an existing non-null value wins over the
//! question's `data`), then assembled into a [`FieldDefinition`] and kept
//! only if its `displayDependencies` allow it. Because seeding happens in
//! document order, later questions see the defaults of earlier ones when
//! their visibility is evaluated.
//!
//! Submit actions: each section declaring `submit` gets one at its end;
//! when none does, a single default submit is appended at the root.

use formtree_interchange::{
    from_schema, Category, Dependencies, FormSchema, GroupDisplay, JsonMap, Question, Section,
    SubmitSpec,
};
use serde::Serialize;
use tracing::{debug, warn};

use crate::coerce::coerce;
use crate::config::{BuildConfig, CoercionPolicy};
use crate::constraints::ConstraintRegistry;
use crate::kinds::FieldKind;
use crate::tree::{ActionKind, ActionNode, FieldDefinition, FormNode, FormTree, GroupNode};
use crate::types::{BuildError, FormData, Value};
use crate::visibility::Evaluator;

/// Reusable builder. Holds only read-only configuration, so one instance
/// can serve any number of independent builds.
#[derive(Debug, Clone)]
pub struct FormBuilder {
    config: BuildConfig,
    registry: ConstraintRegistry,
    evaluator: Evaluator,
}

impl Default for FormBuilder {
    fn default() -> Self {
        FormBuilder::new(BuildConfig::default())
    }
}

/// How a question's visibility was decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VisibilityRule {
    /// No `displayDependencies` block.
    None,
    /// A well-formed condition tree was evaluated.
    Rule,
    /// The block lacked `operator` or `conditions` and was ignored.
    Malformed,
}

/// One row of a visibility report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisibilityDecision {
    pub section: String,
    pub category: String,
    pub key: String,
    pub visible: bool,
    pub rule: VisibilityRule,
}

impl FormBuilder {
    pub fn new(config: BuildConfig) -> Self {
        FormBuilder {
            registry: config.registry(),
            evaluator: Evaluator::new(config.max_condition_depth),
            config,
        }
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    pub fn registry(&self) -> &ConstraintRegistry {
        &self.registry
    }

    /// Parse a JSON schema document and build it against JSON form data.
    pub fn build_json(
        &self,
        schema: &serde_json::Value,
        data: &serde_json::Value,
    ) -> Result<FormTree, BuildError> {
        let schema = from_schema(schema)?;
        let data = FormData::from_json(data)?;
        self.build(&schema, &data)
    }

    /// Build a form tree. The caller's data is never modified.
    pub fn build(&self, schema: &FormSchema, data: &FormData) -> Result<FormTree, BuildError> {
        let mut data = data.clone();
        let mut children = Vec::with_capacity(schema.sections.len() + 1);
        let mut has_submit = false;

        for section in &schema.sections {
            let (node, submitted) = self.build_section(schema, section, &mut data)?;
            has_submit |= submitted;
            children.push(node);
        }

        if !has_submit {
            debug!(form = %schema.slug, "no section declares a submit, adding default at root");
            children.push(FormNode::Action(self.submit_action(None)));
        }

        Ok(FormTree {
            name: schema.slug.clone(),
            children,
            data,
        })
    }

    fn build_section(
        &self,
        schema: &FormSchema,
        section: &Section,
        data: &mut FormData,
    ) -> Result<(FormNode, bool), BuildError> {
        let mut children = Vec::with_capacity(section.categories.len() + 1);
        for category in &section.categories {
            children.push(self.build_category(schema, category, data)?);
        }

        let submitted = match &section.submit {
            Some(spec) => {
                debug!(section = %section.slug, "adding section submit");
                children.push(FormNode::Action(self.submit_action(Some(spec))));
                true
            }
            None => false,
        };

        let node = group_node(
            &section.slug,
            section.title.as_deref(),
            &schema.display_options.sections,
            children,
        );
        Ok((node, submitted))
    }

    fn build_category(
        &self,
        schema: &FormSchema,
        category: &Category,
        data: &mut FormData,
    ) -> Result<FormNode, BuildError> {
        let mut children = Vec::with_capacity(category.questions.len());
        for question in &category.questions {
            seed(data, question);
            if let Some(field) = self.assemble(question, data)? {
                children.push(FormNode::Field(field));
            }
        }
        Ok(group_node(
            &category.slug,
            category.title.as_deref(),
            &schema.display_options.categories,
            children,
        ))
    }

    /// Assemble one seeded question and decide whether it is included.
    fn assemble(
        &self,
        question: &Question,
        data: &FormData,
    ) -> Result<Option<FieldDefinition>, BuildError> {
        let Some(field) = self.field_definition(question, data.resolve(&question.key))? else {
            return Ok(None);
        };

        let visible = match &question.display_dependencies {
            None => true,
            Some(Dependencies::Malformed(_)) => {
                warn!(
                    field = %question.key,
                    "displayDependencies lacks 'operator' or 'conditions', field always included"
                );
                true
            }
            Some(Dependencies::Rule(group)) => self
                .evaluator
                .should_display(group, data)
                .map_err(|source| BuildError::Visibility {
                    field: question.key.clone(),
                    source,
                })?,
        };

        if visible {
            debug!(field = %question.key, kind = %field.kind, "field included");
            Ok(Some(field))
        } else {
            debug!(field = %question.key, "field hidden by displayDependencies");
            Ok(None)
        }
    }

    /// Turn a question and its raw value into a field definition.
    ///
    /// Returns `Ok(None)` only when coercion failed and the configuration
    /// says to skip such fields.
    pub fn field_definition(
        &self,
        question: &Question,
        value: &Value,
    ) -> Result<Option<FieldDefinition>, BuildError> {
        let kind = FieldKind::from_token(&question.field_type);

        let default_value = match coerce(kind, value) {
            Ok(v) => v,
            Err(source) => match self.config.on_coercion_error {
                CoercionPolicy::Abort => {
                    return Err(BuildError::Coercion {
                        field: question.key.clone(),
                        source,
                    })
                }
                CoercionPolicy::Skip => {
                    warn!(field = %question.key, error = %source, "skipping field with unusable default");
                    return Ok(None);
                }
            },
        };

        let constraints = match &question.constraints {
            Some(block) => {
                self.registry
                    .build(block)
                    .map_err(|source| BuildError::Constraint {
                        field: question.key.clone(),
                        source,
                    })?
            }
            None => Vec::new(),
        };

        let entry_fields = if kind == FieldKind::Collection {
            self.build_entry(&question.fields, &Value::Null)?
        } else {
            Vec::new()
        };

        Ok(Some(FieldDefinition {
            name: question.key.clone(),
            kind,
            label: question
                .label
                .clone()
                .unwrap_or_else(|| capitalize(&question.key)),
            required: question.required.unwrap_or(false),
            default_value,
            constraints,
            options: question.options.clone(),
            entry_fields,
        }))
    }

    /// Field definitions for one collection row.
    ///
    /// Each entry field takes its value from the row's entry of the same
    /// key; a missing key, or a row that is not an object, reads as null.
    pub fn build_entry(
        &self,
        fields: &[Question],
        row: &Value,
    ) -> Result<Vec<FieldDefinition>, BuildError> {
        let mut out = Vec::with_capacity(fields.len());
        for field in fields {
            let value = match row {
                Value::Map(map) => map.get(&field.key).unwrap_or(&Value::Null),
                _ => &Value::Null,
            };
            if let Some(def) = self.field_definition(field, value)? {
                out.push(def);
            }
        }
        Ok(out)
    }

    /// Per-question visibility in document order, using the same seeding
    /// as [`FormBuilder::build`]. Constraints and coercion are not run.
    pub fn visibility_report(
        &self,
        schema: &FormSchema,
        data: &FormData,
    ) -> Result<Vec<VisibilityDecision>, BuildError> {
        let mut data = data.clone();
        let mut out = Vec::new();
        for section in &schema.sections {
            for category in &section.categories {
                for question in &category.questions {
                    seed(&mut data, question);
                    let (visible, rule) = match &question.display_dependencies {
                        None => (true, VisibilityRule::None),
                        Some(Dependencies::Malformed(_)) => (true, VisibilityRule::Malformed),
                        Some(Dependencies::Rule(group)) => {
                            let shown = self.evaluator.should_display(group, &data).map_err(
                                |source| BuildError::Visibility {
                                    field: question.key.clone(),
                                    source,
                                },
                            )?;
                            (shown, VisibilityRule::Rule)
                        }
                    };
                    out.push(VisibilityDecision {
                        section: section.slug.clone(),
                        category: category.slug.clone(),
                        key: question.key.clone(),
                        visible,
                        rule,
                    });
                }
            }
        }
        Ok(out)
    }

    fn submit_action(&self, spec: Option<&SubmitSpec>) -> ActionNode {
        let mut attr = JsonMap::new();
        let class = spec
            .and_then(|s| s.class.clone())
            .unwrap_or_else(|| self.config.submit_class.clone());
        attr.insert("class".to_string(), serde_json::Value::String(class));
        if let Some(spec) = spec {
            for (k, v) in &spec.attr {
                attr.insert(k.clone(), v.clone());
            }
        }

        ActionNode {
            name: self.config.submit_name.clone(),
            kind: ActionKind::Submit,
            label: spec
                .and_then(|s| s.label.clone())
                .unwrap_or_else(|| self.config.submit_label.clone()),
            attr,
        }
    }
}

/// `data[key] = data[key] ?? question.data ?? null`
fn seed(data: &mut FormData, question: &Question) {
    if !data.resolve(&question.key).is_null() {
        return;
    }
    let value = question
        .data
        .as_ref()
        .map(Value::from_json)
        .unwrap_or(Value::Null);
    data.insert(question.key.clone(), value);
}

fn group_node(
    slug: &str,
    title: Option<&str>,
    display: &GroupDisplay,
    children: Vec<FormNode>,
) -> FormNode {
    FormNode::Group(GroupNode {
        name: slug.to_string(),
        label: title.map(str::to_string).unwrap_or_else(|| capitalize(slug)),
        attr: display.attr.clone(),
        label_attr: display.label_attr.clone(),
        children,
    })
}

/// Uppercase the first character, leave the rest untouched.
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
