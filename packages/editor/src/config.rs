use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use splice_markup::ParseOptions;
use splice_transform::NormalizeOptions;
use std::path::Path;

pub const DEFAULT_CONFIG_NAME: &str = "splice.config.json";

/// Paste configuration file format
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasteConfig {
    /// Maximum number of undo levels kept per session (0 = unlimited)
    #[serde(default = "default_undo_levels")]
    pub undo_levels: usize,

    /// Limits applied when parsing clipboard markup
    #[serde(default)]
    pub parse: ParseOptions,

    /// Tag and attribute allowlists for pasted html
    #[serde(default)]
    pub normalize: NormalizeOptions,
}

fn default_undo_levels() -> usize {
    100
}

impl PasteConfig {
    /// Load config from a directory
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config_path = dir.as_ref().join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: PasteConfig = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            // Return default config if none exists
            Ok(PasteConfig::default())
        }
    }

    /// Normalization options carrying this config's parse limits
    pub fn normalize_options(&self) -> NormalizeOptions {
        NormalizeOptions {
            parse: self.parse.clone(),
            ..self.normalize.clone()
        }
    }
}

impl Default for PasteConfig {
    fn default() -> Self {
        Self {
            undo_levels: default_undo_levels(),
            parse: ParseOptions::default(),
            normalize: NormalizeOptions::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let json = r#"{
            "undoLevels": 20,
            "parse": { "maxDepth": 32 },
            "normalize": { "allowedTags": ["p", "b"], "keepStyles": true }
        }"#;

        let config: PasteConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.undo_levels, 20);
        assert_eq!(config.parse.max_depth, 32);
        assert_eq!(config.parse.max_input_bytes, ParseOptions::default().max_input_bytes);
        assert!(config.normalize.allows_tag("b"));
        assert!(!config.normalize.allows_tag("ul"));
        assert!(config.normalize.keep_styles);
    }

    #[test]
    fn test_default_config() {
        let config: PasteConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, PasteConfig::default());
        assert_eq!(config.undo_levels, 100);
    }

    #[test]
    fn test_normalize_options_inherit_parse_limits() {
        let config: PasteConfig = serde_json::from_str(r#"{ "parse": { "maxDepth": 8 } }"#).unwrap();
        assert_eq!(config.normalize_options().parse.max_depth, 8);
    }

    #[test]
    fn test_load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(PasteConfig::load(dir.path()).unwrap(), PasteConfig::default());

        std::fs::write(dir.path().join(DEFAULT_CONFIG_NAME), r#"{ "undoLevels": 5 }"#).unwrap();
        assert_eq!(PasteConfig::load(dir.path()).unwrap().undo_levels, 5);

        std::fs::write(dir.path().join(DEFAULT_CONFIG_NAME), "{ not json").unwrap();
        assert!(matches!(PasteConfig::load(dir.path()), Err(ConfigError::Json(_))));
    }
}
