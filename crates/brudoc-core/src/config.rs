use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;

/// Top-level configuration loaded from `.brudoc.yaml`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BrudocConfig {
    pub matching: MatchConfig,
    pub merge: MergeConfig,
    pub backup: BackupConfig,
    pub render: RenderOptions,
}

/// Weights of the file-to-operation scoring function.
///
/// A candidate pair must share the HTTP method. It then scores `tag_weight`
/// when the file's folder equals one of the operation's tags, plus
/// `name_weight` when the normalized display name and summary contain one
/// another. Pairs below `min_score` are never matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    pub tag_weight: u32,
    pub name_weight: u32,
    pub min_score: u32,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            tag_weight: 1,
            name_weight: 2,
            min_score: 3,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    pub policy: MergePolicy,
}

/// What happens to an existing `docs` block that has no generated region yet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergePolicy {
    /// Keep hand-written notes and append the generated region after them.
    #[default]
    Preserve,
    /// Replace the whole interior of the block.
    Replace,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BackupConfig {
    pub policy: BackupPolicy,
}

/// What happens to a backup left by an earlier run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackupPolicy {
    /// Never touch an existing backup; `revert` restores the pre-tool state.
    #[default]
    KeepOriginal,
    /// Overwrite the backup with the current content before each write.
    Refresh,
}

/// Rendering options for the docs block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    pub examples: ExampleFormat,
    pub parameter_types: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            examples: ExampleFormat::Json,
            parameter_types: true,
        }
    }
}

/// How structured examples are serialized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExampleFormat {
    #[default]
    Json,
    Yaml,
}

/// Default config file name.
pub const CONFIG_FILE_NAME: &str = ".brudoc.yaml";

/// Load config from a YAML file. Returns `None` if the file doesn't exist.
pub fn load_config(path: &Path) -> Result<Option<BrudocConfig>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config: BrudocConfig =
        serde_yaml_ng::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(Some(config))
}

/// Generate the default config file content.
pub fn default_config_content() -> &'static str {
    r#"# brudoc configuration
matching:
  tag_weight: 1       # file folder equals one of the operation's tags
  name_weight: 2      # meta name and operation summary contain one another
  min_score: 3        # pairs scoring below this are left unmatched

merge:
  policy: preserve    # preserve | replace (hand-written docs notes)

backup:
  policy: keep_original   # keep_original | refresh

render:
  examples: json      # json | yaml
  parameter_types: true
"#
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BrudocConfig::default();
        assert_eq!(config.matching, MatchConfig::default());
        assert_eq!(config.matching.min_score, 3);
        assert_eq!(config.merge.policy, MergePolicy::Preserve);
        assert_eq!(config.backup.policy, BackupPolicy::KeepOriginal);
        assert_eq!(config.render.examples, ExampleFormat::Json);
        assert!(config.render.parameter_types);
    }

    #[test]
    fn test_parse_config_yaml() {
        let yaml = r#"
matching:
  tag_weight: 5
  name_weight: 1
  min_score: 1
merge:
  policy: replace
backup:
  policy: refresh
render:
  examples: yaml
  parameter_types: false
"#;
        let config: BrudocConfig = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(config.matching.tag_weight, 5);
        assert_eq!(config.matching.name_weight, 1);
        assert_eq!(config.matching.min_score, 1);
        assert_eq!(config.merge.policy, MergePolicy::Replace);
        assert_eq!(config.backup.policy, BackupPolicy::Refresh);
        assert_eq!(config.render.examples, ExampleFormat::Yaml);
        assert!(!config.render.parameter_types);
    }

    #[test]
    fn test_parse_minimal_config() {
        let yaml = "merge:\n  policy: replace\n";
        let config: BrudocConfig = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(config.merge.policy, MergePolicy::Replace);
        // Defaults applied
        assert_eq!(config.matching.min_score, 3);
        assert_eq!(config.backup.policy, BackupPolicy::KeepOriginal);
    }

    #[test]
    fn test_default_content_parses_to_defaults() {
        let config: BrudocConfig = serde_yaml_ng::from_str(default_config_content()).unwrap();
        assert_eq!(config.matching, MatchConfig::default());
        assert_eq!(config.render, RenderOptions::default());
    }

    #[test]
    fn test_missing_file_is_none() {
        let path = Path::new("definitely/not/here/.brudoc.yaml");
        assert!(load_config(path).unwrap().is_none());
    }
}
