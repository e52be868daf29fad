//! Converter settings (`--config <file.toml>`)

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use preset_codec::FourCC;
use serde::Deserialize;

/// What to produce for each input; every field may be omitted from the file
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ConvertConfig {
    /// Write a JSON summary next to every converted file
    pub write_summaries: bool,
    /// Unwrap VST3 component data into standalone `.fxp`/`.fxb`/`.ffp` files
    pub extract_component: bool,
    /// Re-wrap `.fxp`/`.fxb` files as `.vstpreset`
    pub wrap_fxp: bool,
    /// Effect id (4 characters) to plugin name, for VST2-wrapper class ids
    pub plugin_names: HashMap<String, String>,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            write_summaries: true,
            extract_component: true,
            wrap_fxp: true,
            plugin_names: HashMap::new(),
        }
    }
}

impl ConvertConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse converter config")
    }

    /// Configured plugin name for `fx_id`, falling back to the id itself
    pub fn plugin_name(&self, fx_id: FourCC) -> String {
        let key = fx_id.to_string();
        self.plugin_names.get(&key).cloned().unwrap_or(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = ConvertConfig::default();
        assert!(config.write_summaries);
        assert!(config.extract_component);
        assert!(config.wrap_fxp);
        assert!(config.plugin_names.is_empty());
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        assert_eq!(ConvertConfig::parse("").unwrap(), ConvertConfig::default());
    }

    #[test]
    fn test_partial_config() {
        let config = ConvertConfig::parse(
            r#"
wrap_fxp = false

[plugin_names]
FQ2p = "FabFilter Pro-Q 2"
"#,
        )
        .unwrap();
        assert!(!config.wrap_fxp);
        assert!(config.write_summaries);
        assert_eq!(
            config.plugin_name(FourCC::new(*b"FQ2p")),
            "FabFilter Pro-Q 2"
        );
        assert_eq!(config.plugin_name(FourCC::new(*b"abcd")), "abcd");
    }

    #[test]
    fn test_invalid_config() {
        assert!(ConvertConfig::parse("write_summaries = \"yes\"").is_err());
    }
}
