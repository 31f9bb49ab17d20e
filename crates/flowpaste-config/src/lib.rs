//! Flowpaste configuration
//!
//! Settings are read from `flowpaste.toml`, then overridden by `FLOWPASTE_*`
//! environment variables.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file name, looked up in the current directory.
pub const CONFIG_FILE: &str = "flowpaste.toml";

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct FlowpasteConfig {
    /// Conversion behavior
    pub convert: ConvertConfig,
    /// JSON output settings
    pub output: OutputConfig,
    /// Comma-separated diagnostics categories (`css`, `html`, `all`)
    pub diagnostics: Option<String>,
}

/// Conversion settings, mirrored onto the engine's convert options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertConfig {
    /// Asset id written into image nodes
    pub asset_placeholder: String,
    /// Wrap section content in a generic container
    pub wrap_sections: bool,
    /// Move CSS for classes no element uses into the embed node
    pub relocate_unused_classes: bool,
    /// Move selectors the matcher cannot evaluate into the embed node
    pub relocate_unsupported_selectors: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct OutputConfig {
    /// Pretty-print the JSON document
    pub pretty: bool,
    /// Validate the document against the schema before writing
    pub validate: bool,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            asset_placeholder: "placeholder-image".to_string(),
            wrap_sections: true,
            relocate_unused_classes: true,
            relocate_unsupported_selectors: true,
        }
    }
}

fn parse_flag(val: &str) -> bool {
    val == "1" || val.eq_ignore_ascii_case("true")
}

impl FlowpasteConfig {
    /// Load configuration from a TOML file
    ///
    /// # Returns
    /// * `Ok(FlowpasteConfig)` - Successfully loaded configuration
    /// * `Err(String)` - Error message if loading failed
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {}", e))
    }

    /// Load `flowpaste.toml` from the current directory, or defaults if it
    /// is missing or unreadable
    pub fn load_or_default() -> Self {
        Self::load_from_file(CONFIG_FILE).unwrap_or_default()
    }

    /// Merge configuration with environment variables
    ///
    /// Environment variables take precedence over configuration file values.
    pub fn merge_with_env(&mut self) {
        self.merge_with(|key| std::env::var(key).ok());
    }

    /// Applies overrides from any `FLOWPASTE_*` key lookup.
    pub fn merge_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(placeholder) = lookup("FLOWPASTE_ASSET_PLACEHOLDER") {
            self.convert.asset_placeholder = placeholder;
        }
        if let Some(val) = lookup("FLOWPASTE_WRAP_SECTIONS") {
            self.convert.wrap_sections = parse_flag(&val);
        }
        if let Some(val) = lookup("FLOWPASTE_RELOCATE_UNUSED") {
            self.convert.relocate_unused_classes = parse_flag(&val);
        }
        if let Some(val) = lookup("FLOWPASTE_RELOCATE_UNSUPPORTED") {
            self.convert.relocate_unsupported_selectors = parse_flag(&val);
        }

        if let Some(val) = lookup("FLOWPASTE_PRETTY") {
            self.output.pretty = parse_flag(&val);
        }
        if let Some(val) = lookup("FLOWPASTE_VALIDATE") {
            self.output.validate = parse_flag(&val);
        }

        if let Some(diagnostics) = lookup("FLOWPASTE_DIAGNOSTICS") {
            self.diagnostics = Some(diagnostics);
        }
    }

    /// Load `flowpaste.toml` (or defaults), then apply environment overrides
    pub fn load() -> Self {
        let mut config = Self::load_or_default();
        config.merge_with_env();
        config
    }

    /// Load a specific file, then apply environment overrides
    pub fn load_path<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let mut config = Self::load_from_file(path)?;
        config.merge_with_env();
        Ok(config)
    }
}
