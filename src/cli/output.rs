use anyhow::Result;
use clap::ValueEnum;
use serde::Serialize;

#[derive(Clone, Debug, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
    Yaml,
}

/// Renders a value in a machine-readable format; `Human` is left to the caller.
pub fn render<T: Serialize>(value: &T, format: &OutputFormat) -> Result<Option<String>> {
    match format {
        OutputFormat::Human => Ok(None),
        OutputFormat::Json => Ok(Some(serde_json::to_string_pretty(value)?)),
        OutputFormat::Yaml => Ok(Some(serde_yaml::to_string(value)?)),
    }
}
