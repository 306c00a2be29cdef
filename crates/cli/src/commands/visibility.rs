use std::path::Path;
use std::process;

use formtree_eval::{FormBuilder, FormData, VisibilityRule};
use formtree_interchange::from_schema;

use crate::config::load_config;
use crate::{read_data, read_json, report_error, OutputFormat};

pub(crate) fn cmd_visibility(
    schema_path: &Path,
    data_path: Option<&Path>,
    config_path: Option<&Path>,
    output: OutputFormat,
    quiet: bool,
) {
    let config = load_config(config_path, output, quiet);
    let schema_doc = read_json(schema_path, "schema", output, quiet);
    let data_doc = read_data(data_path, output, quiet);

    let report = from_schema(&schema_doc)
        .map_err(|e| e.to_string())
        .and_then(|schema| {
            let data = FormData::from_json(&data_doc).map_err(|e| e.to_string())?;
            FormBuilder::new(config)
                .visibility_report(&schema, &data)
                .map_err(|e| e.to_string())
        });
    let report = match report {
        Ok(r) => r,
        Err(e) => {
            report_error(&format!("error: {}", e), output, quiet);
            process::exit(1);
        }
    };

    match output {
        OutputFormat::Json => {
            let pretty = serde_json::to_string_pretty(&report)
                .unwrap_or_else(|e| format!("serialization error: {}", e));
            println!("{}", pretty);
        }
        OutputFormat::Text => {
            for decision in &report {
                let state = if decision.visible { "shown" } else { "hidden" };
                let note = match decision.rule {
                    VisibilityRule::None => "",
                    VisibilityRule::Rule => " (rule)",
                    VisibilityRule::Malformed => " (malformed rule ignored)",
                };
                println!(
                    "{}/{}/{}: {}{}",
                    decision.section, decision.category, decision.key, state, note
                );
            }
            if !quiet {
                let hidden = report.iter().filter(|d| !d.visible).count();
                println!("{} questions, {} hidden", report.len(), hidden);
            }
        }
    }
}
