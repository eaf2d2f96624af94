/// Configuration for the translation store
use crate::filter::FilterCriterion;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const ROOT_ENV: &str = "TRANSLATIONS_ROOT";
pub const EDITOR_ENVS: [&str; 3] = ["TRANSLATIONS_EDITOR", "VISUAL", "EDITOR"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("translation directory is not configured (set TRANSLATIONS_ROOT or `root`)")]
    MissingRoot,

    #[error("translation directory {} does not exist or is not a directory", .0.display())]
    RootNotADirectory(PathBuf),

    #[error("block level must be at least 1")]
    InvalidBlockLevel,

    #[error("unsupported quote character {0:?}; use ' \" or `")]
    InvalidQuote(char),

    #[error("invalid file pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("no editor configured (set TRANSLATIONS_EDITOR, VISUAL or EDITOR)")]
    MissingEditor,

    #[error("failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },
}

/// How structured-literal catalogs are located and written.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LiteralOptions {
    /// Nesting depth of the translation object in the source file.
    #[serde(default = "default_block_level")]
    pub block_level: usize,

    /// Spaces per indentation step.
    #[serde(default = "default_indent_width")]
    pub indent_width: usize,

    /// Quote used for keys and string values of new lines.
    #[serde(default = "default_quote")]
    pub quote: char,
}

fn default_block_level() -> usize {
    1
}

fn default_indent_width() -> usize {
    4
}

fn default_quote() -> char {
    '\''
}

impl Default for LiteralOptions {
    fn default() -> Self {
        Self {
            block_level: default_block_level(),
            indent_width: default_indent_width(),
            quote: default_quote(),
        }
    }
}

impl LiteralOptions {
    /// Leading whitespace of an entry line: one step per block level.
    pub fn indent(&self) -> String {
        " ".repeat(self.indent_width * self.block_level)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.block_level == 0 {
            return Err(ConfigError::InvalidBlockLevel);
        }
        if !matches!(self.quote, '\'' | '"' | '`') {
            return Err(ConfigError::InvalidQuote(self.quote));
        }
        Ok(())
    }
}

fn default_file_pattern() -> String {
    r"^[A-Za-z]{2,3}([-_][A-Za-z0-9]+)?\.(ts|js|json)$".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreConfig {
    /// Directory holding one catalog file per locale.
    #[serde(default)]
    pub root: Option<PathBuf>,

    /// Regex matched against catalog file names.
    #[serde(default = "default_file_pattern")]
    pub file_pattern: String,

    #[serde(default)]
    pub literal: LiteralOptions,

    /// Editor program, optionally followed by arguments.
    #[serde(default)]
    pub editor: Option<String>,

    #[serde(default)]
    pub default_filter: FilterCriterion,

    /// Keep a timestamped copy of each catalog before rewriting it.
    #[serde(default)]
    pub keep_backups: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            root: None,
            file_pattern: default_file_pattern(),
            literal: LiteralOptions::default(),
            editor: None,
            default_filter: FilterCriterion::default(),
            keep_backups: false,
        }
    }
}

impl StoreConfig {
    /// Load configuration from YAML file
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_yaml(&content).map_err(|message| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        })
    }

    pub fn from_yaml(content: &str) -> Result<Self, String> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|e| e.to_string())
    }

    pub fn to_yaml(&self) -> Result<String, String> {
        serde_yaml::to_string(self).map_err(|e| e.to_string())
    }

    /// `<config dir>/translations/config.yaml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("translations").join("config.yaml"))
    }

    /// Load an explicit config file, or the default one when it exists,
    /// or fall back to defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::from_yaml_file(path);
        }

        match Self::default_path() {
            Some(path) if path.is_file() => {
                log::debug!("loading config from {}", path.display());
                Self::from_yaml_file(path)
            }
            _ => Ok(Self::default()),
        }
    }

    /// Apply environment overrides through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(root) = non_empty(ROOT_ENV) {
            self.root = Some(PathBuf::from(root));
        }
        if let Some(editor) = EDITOR_ENVS.iter().find_map(|name| non_empty(*name)) {
            self.editor = Some(editor);
        }
    }

    /// Resolved translation directory.
    pub fn root(&self) -> Result<&Path, ConfigError> {
        let root = self.root.as_deref().ok_or(ConfigError::MissingRoot)?;
        if !root.is_dir() {
            return Err(ConfigError::RootNotADirectory(root.to_path_buf()));
        }
        Ok(root)
    }

    pub fn file_regex(&self) -> Result<Regex, ConfigError> {
        Regex::new(&self.file_pattern).map_err(|source| ConfigError::InvalidPattern {
            pattern: self.file_pattern.clone(),
            source,
        })
    }

    /// Editor program and its leading arguments.
    pub fn editor_command(&self) -> Result<(String, Vec<String>), ConfigError> {
        let mut parts = self
            .editor
            .as_deref()
            .unwrap_or_default()
            .split_whitespace()
            .map(str::to_string);
        let program = parts.next().ok_or(ConfigError::MissingEditor)?;
        Ok((program, parts.collect()))
    }

    /// Check everything needed before any catalog is touched.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.root()?;
        self.file_regex()?;
        self.literal.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = StoreConfig::default();
        assert_eq!(config.literal.block_level, 1);
        assert_eq!(config.literal.indent(), "    ");
        assert_eq!(config.default_filter, FilterCriterion::Key);
        assert!(!config.keep_backups);
        assert!(config.file_regex().unwrap().is_match("de.json"));
        assert!(config.file_regex().unwrap().is_match("pt-BR.ts"));
        assert!(!config.file_regex().unwrap().is_match("index.ts"));
    }

    #[test]
    fn test_yaml_parsing() {
        let config = StoreConfig::from_yaml(
            "root: /srv/i18n\nliteral:\n  blockLevel: 2\neditor: code --wait\ndefaultFilter: value\n",
        )
        .unwrap();
        assert_eq!(config.root, Some(PathBuf::from("/srv/i18n")));
        assert_eq!(config.literal.block_level, 2);
        assert_eq!(config.literal.indent_width, 4);
        assert_eq!(config.literal.indent(), "        ");
        assert_eq!(config.default_filter, FilterCriterion::Value);
        assert_eq!(
            config.editor_command().unwrap(),
            ("code".to_string(), vec!["--wait".to_string()])
        );

        let reparsed = StoreConfig::from_yaml(&config.to_yaml().unwrap()).unwrap();
        assert_eq!(reparsed.literal, config.literal);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [("TRANSLATIONS_ROOT", "/tmp/i18n"), ("VISUAL", ""), ("EDITOR", "vim")]
            .into_iter()
            .collect();
        let mut config = StoreConfig::default();
        config.apply_env(|name| env.get(name).map(|v| v.to_string()));

        assert_eq!(config.root, Some(PathBuf::from("/tmp/i18n")));
        assert_eq!(config.editor.as_deref(), Some("vim"));
    }

    #[test]
    fn test_validation() {
        let config = StoreConfig::default();
        assert!(matches!(config.validate(), Err(ConfigError::MissingRoot)));
        assert!(matches!(config.editor_command(), Err(ConfigError::MissingEditor)));

        let dir = TempDir::new().unwrap();
        let mut config = StoreConfig {
            root: Some(dir.path().to_path_buf()),
            ..StoreConfig::default()
        };
        assert!(config.validate().is_ok());

        config.literal.block_level = 0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidBlockLevel)));

        config.literal.block_level = 1;
        config.file_pattern = "([".into();
        assert!(matches!(config.validate(), Err(ConfigError::InvalidPattern { .. })));

        config.root = Some(dir.path().join("missing"));
        assert!(matches!(config.validate(), Err(ConfigError::RootNotADirectory(_))));
    }
}
