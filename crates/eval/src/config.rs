//! Build configuration.
//!
//! Every field has a default, so an empty TOML table (or no file at all)
//! yields the stock behavior.

use serde::{Deserialize, Serialize};

use crate::constraints::ConstraintRegistry;
use crate::visibility::DEFAULT_MAX_DEPTH;

/// What to do when a date/time default cannot be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CoercionPolicy {
    /// Fail the whole build.
    #[default]
    Abort,
    /// Drop only the offending field.
    Skip,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Name given to every submit action.
    pub submit_name: String,
    /// Label of submit actions without an explicit label.
    pub submit_label: String,
    /// CSS class every submit action starts from.
    pub submit_class: String,
    pub max_condition_depth: usize,
    pub on_coercion_error: CoercionPolicy,
    /// Constraint names accepted in addition to the built-in ones.
    pub extra_constraints: Vec<String>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        BuildConfig {
            submit_name: "submit".to_string(),
            submit_label: "Send".to_string(),
            submit_class: "btn btn-primary".to_string(),
            max_condition_depth: DEFAULT_MAX_DEPTH,
            on_coercion_error: CoercionPolicy::Abort,
            extra_constraints: Vec::new(),
        }
    }
}

impl BuildConfig {
    /// The constraint registry this configuration describes.
    pub fn registry(&self) -> ConstraintRegistry {
        ConstraintRegistry::builtin().with_extra(self.extra_constraints.iter().cloned())
    }
}
