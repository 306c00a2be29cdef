use std::path::Path;

use crate::config::load_config;
use crate::OutputFormat;

pub(crate) fn cmd_constraints(config_path: Option<&Path>, output: OutputFormat, quiet: bool) {
    let registry = load_config(config_path, output, quiet).registry();

    match output {
        OutputFormat::Json => {
            let entries: Vec<serde_json::Value> = registry
                .names()
                .map(|name| {
                    serde_json::json!({
                        "name": name,
                        "requiresOneOf": registry.required_options(name).unwrap_or_default(),
                    })
                })
                .collect();
            let pretty = serde_json::to_string_pretty(&entries)
                .unwrap_or_else(|e| format!("serialization error: {}", e));
            println!("{}", pretty);
        }
        OutputFormat::Text => {
            for name in registry.names() {
                match registry.required_options(name) {
                    Some(keys) if !keys.is_empty() => {
                        println!("{} (one of: {})", name, keys.join(", "))
                    }
                    _ => println!("{}", name),
                }
            }
        }
    }
}
