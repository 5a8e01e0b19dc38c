use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{VisitorError, VisitorResult};

/// How a replacement treats more than one matching file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPolicy {
    /// Replace every match with the same payload.
    #[default]
    All,
    /// Refuse to mutate unless exactly one file matches.
    ExactlyOne,
}

/// Output rendering for command reports.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Settings shared by every command built from the registry.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditConfig {
    pub match_policy: MatchPolicy,
    pub output_format: OutputFormat,
}

impl EditConfig {
    /// Replacements must name exactly one file.
    pub fn strict() -> Self {
        Self {
            match_policy: MatchPolicy::ExactlyOne,
            ..Default::default()
        }
    }

    pub fn from_toml_str(text: &str) -> VisitorResult<Self> {
        toml::from_str(text).map_err(|e| VisitorError::Config(e.to_string()))
    }

    /// Load from a TOML file.
    pub fn load(path: &Path) -> VisitorResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| VisitorError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_replaces_all() {
        let config = EditConfig::default();
        assert_eq!(config.match_policy, MatchPolicy::All);
        assert_eq!(config.output_format, OutputFormat::Text);
    }

    #[test]
    fn parse_toml() {
        let config = EditConfig::from_toml_str(
            "match_policy = \"exactly_one\"\noutput_format = \"json\"\n",
        )
        .unwrap();
        assert_eq!(config.match_policy, MatchPolicy::ExactlyOne);
        assert_eq!(config.output_format, OutputFormat::Json);
    }

    #[test]
    fn missing_keys_use_defaults() {
        let config = EditConfig::from_toml_str("").unwrap();
        assert_eq!(config, EditConfig::default());
    }

    #[test]
    fn bad_value_is_config_error() {
        let err = EditConfig::from_toml_str("match_policy = \"some\"").unwrap_err();
        assert!(matches!(err, VisitorError::Config(_)));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fvkit.toml");
        std::fs::write(&path, "match_policy = \"exactly_one\"").unwrap();
        assert_eq!(EditConfig::load(&path).unwrap(), EditConfig::strict());
        let err = EditConfig::load(&dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, VisitorError::Io { .. }));
    }
}
