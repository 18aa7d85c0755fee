//! Configuration file.
//!
//! Every field is optional; missing fields take their defaults.
//!
//! ```json
//! {
//!   "sources": { "extensions": ["json", "jsonl"], "include_hidden": true },
//!   "output": { "compact": false }
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{DotQueryError, Result};

pub const CONFIG_ENV_VAR: &str = "DOTQUERY_CONFIG";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub sources: SourceOptions,
    pub output: OutputOptions,
}

/// How source descriptors are expanded into files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceOptions {
    /// File extensions collected when walking a directory.
    pub extensions: Vec<String>,
    pub include_hidden: bool,
    /// Honour `.gitignore` / `.ignore` files while walking directories.
    pub respect_ignore_files: bool,
    pub follow_links: bool,
    pub max_depth: Option<usize>,
}

impl Default for SourceOptions {
    fn default() -> Self {
        Self {
            extensions: vec!["json".to_string(), "jsonl".to_string()],
            include_hidden: true,
            respect_ignore_files: false,
            follow_links: false,
            max_depth: None,
        }
    }
}

impl SourceOptions {
    pub fn accepts_extension(&self, path: &Path) -> bool {
        let Some(extension) = path.extension().and_then(|ext| ext.to_str()) else {
            return false;
        };
        self.extensions
            .iter()
            .any(|candidate| candidate.eq_ignore_ascii_case(extension))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputOptions {
    /// Emit the wire format on a single line.
    pub compact: bool,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path).map_err(|error| {
            DotQueryError::Config(format!("failed to read {}: {error}", path.display()))
        })?;
        let config = serde_json::from_str(&data).map_err(|error| {
            DotQueryError::Config(format!("failed to parse {}: {error}", path.display()))
        })?;
        log::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Loads `path` when given, otherwise returns the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::tempdir;

    #[test]
    fn missing_fields_take_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"sources": {"include_hidden": false}}"#).expect("parse");
        assert!(!config.sources.include_hidden);
        assert_eq!(config.sources.extensions, vec!["json", "jsonl"]);
        assert!(!config.output.compact);
    }

    #[test]
    fn loads_from_file() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("dotquery.json");
        std::fs::write(
            &path,
            r#"{"sources": {"extensions": ["ndjson"], "max_depth": 2}, "output": {"compact": true}}"#,
        )
        .expect("write config");

        let config = Config::load_or_default(Some(&path)).expect("load");
        assert_eq!(config.sources.extensions, vec!["ndjson"]);
        assert_eq!(config.sources.max_depth, Some(2));
        assert!(config.output.compact);
    }

    #[test]
    fn unreadable_or_invalid_file_is_a_config_error() {
        let dir = tempdir().expect("tempdir");
        let invalid = dir.path().join("bad.json");
        std::fs::write(&invalid, "{not json").expect("write config");

        for path in [invalid, dir.path().join("missing.json")] {
            match Config::load(&path) {
                Err(DotQueryError::Config(_)) => {}
                other => panic!("expected config error, got {other:?}"),
            }
        }
        assert_eq!(Config::load_or_default(None).expect("defaults"), Config::default());
    }

    #[test]
    fn extension_filter_is_case_insensitive() {
        let options = SourceOptions::default();
        assert!(options.accepts_extension(&PathBuf::from("a/b.JSON")));
        assert!(options.accepts_extension(&PathBuf::from("b.jsonl")));
        assert!(!options.accepts_extension(&PathBuf::from("b.txt")));
        assert!(!options.accepts_extension(&PathBuf::from("json")));
    }
}
