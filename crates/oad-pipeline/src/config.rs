use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::generator::GenerationOptions;
use crate::orchestrate::{DEFAULT_WORKERS, RunOptions};
use crate::scan::ScanConfig;

/// Top-level project configuration loaded from `.oad.yaml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OadConfig {
    pub input: String,
    pub output: String,
    pub mode: RunMode,
    pub workers: usize,
    pub generation: GenerationOptions,
    pub scan: ScanConfig,
}

impl Default for OadConfig {
    fn default() -> Self {
        Self {
            input: "openapi.json".to_string(),
            output: "docs".to_string(),
            mode: RunMode::Single,
            workers: DEFAULT_WORKERS,
            generation: GenerationOptions::default(),
            scan: ScanConfig::default(),
        }
    }
}

impl OadConfig {
    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            workers: self.workers,
            generation: self.generation.clone(),
            scan: self.scan.clone(),
        }
    }
}

/// Whether to produce one document or an index plus one file per segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    Single,
    Segmented,
}

/// Default config file name.
pub const CONFIG_FILE_NAME: &str = ".oad.yaml";

/// Index document file name for segmented output.
pub const INDEX_FILE_NAME: &str = "SKILL_INDEX.md";

/// Load config from a YAML file. Returns `None` if the file doesn't exist.
pub fn load_config(path: &Path) -> Result<Option<OadConfig>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)
        .map_err(|e| format!("failed to read config {}: {}", path.display(), e))?;
    let config: OadConfig = serde_yaml_ng::from_str(&content)
        .map_err(|e| format!("failed to parse config {}: {}", path.display(), e))?;
    Ok(Some(config))
}

/// Generate the default config file content.
pub fn default_config_content() -> &'static str {
    r#"# oad configuration
input: openapi.json
output: docs
mode: single          # single | segmented
workers: 3            # segmented-mode concurrency (capped by segment count)

generation:
  provider: anthropic
  model: claude-sonnet-4-5
  max_output_tokens: 8192

scan:
  watch_env:
    - ANTHROPIC_API_KEY
    - OPENAI_API_KEY
    - OPENROUTER_API_KEY
    - API_KEY
"#
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = OadConfig::default();
        assert_eq!(config.input, "openapi.json");
        assert_eq!(config.output, "docs");
        assert_eq!(config.mode, RunMode::Single);
        assert_eq!(config.workers, 3);
        assert_eq!(config.generation.provider, "anthropic");
    }

    #[test]
    fn test_parse_config_yaml() {
        let yaml = r#"
input: spec.yaml
output: out
mode: segmented
workers: 5
generation:
  provider: openai
  model: gpt-4o
  max_output_tokens: 4096
scan:
  watch_env: [MY_SECRET]
"#;
        let config: OadConfig = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(config.input, "spec.yaml");
        assert_eq!(config.mode, RunMode::Segmented);
        assert_eq!(config.workers, 5);
        assert_eq!(config.generation.model, "gpt-4o");
        assert_eq!(config.scan.watch_env, vec!["MY_SECRET"]);
    }

    #[test]
    fn test_parse_minimal_config() {
        let yaml = "input: api.yaml\n";
        let config: OadConfig = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(config.input, "api.yaml");
        // Defaults applied
        assert_eq!(config.output, "docs");
        assert_eq!(config.mode, RunMode::Single);
    }

    #[test]
    fn test_default_content_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, default_config_content()).unwrap();

        let loaded = load_config(&path).unwrap().unwrap();
        assert_eq!(loaded.mode, RunMode::Single);
        assert_eq!(loaded.workers, 3);

        let absent = load_config(&dir.path().join("nope.yaml")).unwrap();
        assert!(absent.is_none());
    }
}
