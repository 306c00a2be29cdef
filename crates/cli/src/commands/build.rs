use std::path::Path;
use std::process;

use formtree_eval::{bind, FormBuilder, OutlineSink};

use crate::config::load_config;
use crate::{read_data, read_json, report_error, OutputFormat};

pub(crate) fn cmd_build(
    schema_path: &Path,
    data_path: Option<&Path>,
    config_path: Option<&Path>,
    output: OutputFormat,
    quiet: bool,
) {
    let config = load_config(config_path, output, quiet);
    let schema = read_json(schema_path, "schema", output, quiet);
    let data = read_data(data_path, output, quiet);

    let builder = FormBuilder::new(config);
    let tree = match builder.build_json(&schema, &data) {
        Ok(t) => t,
        Err(e) => {
            let msg = format!("error: {}", e);
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    };

    match output {
        OutputFormat::Json => {
            let pretty = serde_json::to_string_pretty(&tree.to_json())
                .unwrap_or_else(|e| format!("serialization error: {}", e));
            println!("{}", pretty);
        }
        OutputFormat::Text => {
            if !quiet {
                println!("form {}", tree.name);
            }
            for line in bind(&tree, &mut OutlineSink).into_iter().flatten() {
                println!("  {}", line);
            }
        }
    }
}
