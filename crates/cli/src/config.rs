//! TOML configuration file.
//!
//! ```toml
//! [build]
//! submit_label = "Continue"
//! on_coercion_error = "skip"
//! extra_constraints = ["PostalCode"]
//! ```

use std::path::Path;
use std::process;

use formtree_eval::BuildConfig;
use serde::Deserialize;

use crate::{report_error, OutputFormat};

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct CliConfig {
    pub build: BuildConfig,
}

pub(crate) fn parse_config(text: &str) -> Result<CliConfig, toml::de::Error> {
    toml::from_str(text)
}

/// Load `--config`, or the defaults when no file was given.
pub(crate) fn load_config(path: Option<&Path>, output: OutputFormat, quiet: bool) -> BuildConfig {
    let Some(path) = path else {
        return BuildConfig::default();
    };
    let text = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            let msg = format!("error reading config file '{}': {}", path.display(), e);
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    };
    match parse_config(&text) {
        Ok(cfg) => {
            tracing::debug!(path = %path.display(), "loaded configuration");
            cfg.build
        }
        Err(e) => {
            let msg = format!("invalid config file '{}': {}", path.display(), e);
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formtree_eval::CoercionPolicy;

    #[test]
    fn empty_file_gives_defaults() {
        let cfg = parse_config("").unwrap();
        assert_eq!(cfg.build, BuildConfig::default());
    }

    #[test]
    fn build_table_overrides_fields() {
        let cfg = parse_config(
            r#"
            [build]
            submit_label = "Continue"
            on_coercion_error = "skip"
            extra_constraints = ["PostalCode"]
            "#,
        )
        .unwrap();
        assert_eq!(cfg.build.submit_label, "Continue");
        assert_eq!(cfg.build.on_coercion_error, CoercionPolicy::Skip);
        assert_eq!(cfg.build.extra_constraints, vec!["PostalCode".to_string()]);
        assert_eq!(cfg.build.submit_name, "submit");
    }

    #[test]
    fn unknown_tables_are_rejected() {
        assert!(parse_config("[render]\ntheme = \"dark\"").is_err());
    }
}
