//! Inspector Configuration
//!
//! Defines configuration options for the scenario inspector.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{read_document, InspectError};

/// Configuration for the scenario inspector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Output format for reports.
    pub format: OutputFormat,

    /// Stop `check` at the first failing query.
    pub fail_fast: bool,

    /// Prefix each class with the parameter it was dispatched on.
    pub qualified_names: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            fail_fast: false,
            qualified_names: false,
        }
    }
}

impl Config {
    /// Load a configuration file, TOML or JSON by extension.
    pub fn from_file(path: &Path) -> Result<Self, InspectError> {
        read_document(path)
    }

    /// Render this configuration in its own output format.
    pub fn render(&self) -> Result<String, InspectError> {
        match self.format {
            OutputFormat::Text => {
                toml::to_string_pretty(self).map_err(|err| InspectError::Render(err.to_string()))
            }
            OutputFormat::Json => {
                serde_json::to_string_pretty(self).map_err(|err| InspectError::Render(err.to_string()))
            }
        }
    }
}

/// Report output format.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: Config = toml::from_str("fail_fast = true").unwrap();
        assert!(config.fail_fast);
        assert_eq!(config.format, OutputFormat::Text);
        assert!(!config.qualified_names);
    }

    #[test]
    fn test_format_is_lowercase() {
        let config: Config = serde_json::from_str(r#"{"format": "json"}"#).unwrap();
        assert_eq!(config.format, OutputFormat::Json);
        assert!(config.render().unwrap().contains("\"json\""));
    }

    #[test]
    fn test_default_renders_as_toml() {
        let rendered = Config::default().render().unwrap();
        assert!(rendered.contains("format = \"text\""));
        assert!(rendered.contains("fail_fast = false"));
    }
}
