//! Configuration types and parsing for ddlgraph.yml

use crate::analysis::AnalyzerConfig;
use crate::layout::LayoutConfig;
use crate::sql::ParserKind;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File names looked up in a project directory, in order.
pub const CONFIG_FILE_NAMES: [&str; 2] = ["ddlgraph.yml", "ddlgraph.yaml"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid config: {message}")]
    Invalid { message: String },
}

/// Project configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Statement parser used for every file
    #[serde(default)]
    pub parser: ParserKind,

    /// File extensions treated as schema files
    #[serde(default = "default_include")]
    pub include: Vec<String>,

    #[serde(default)]
    pub analyzer: AnalyzerConfig,

    #[serde(default)]
    pub layout: LayoutConfig,
}

fn default_include() -> Vec<String> {
    vec![".sql".to_string()]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            parser: ParserKind::default(),
            include: default_include(),
            analyzer: AnalyzerConfig::default(),
            layout: LayoutConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("loaded config from {}", path.display());
        Self::from_yaml_str(&content)
    }

    /// Load `ddlgraph.yml` or `ddlgraph.yaml` from `dir`, defaults when neither exists.
    pub fn load_from_dir(dir: &Path) -> Result<Self, ConfigError> {
        for name in CONFIG_FILE_NAMES {
            let path = dir.join(name);
            if path.is_file() {
                return Self::load(&path);
            }
        }
        log::debug!("no config file in {}; using defaults", dir.display());
        Ok(Self::default())
    }

    /// Parse and validate YAML text. Blank text yields the defaults.
    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Config = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.include.is_empty() {
            return Err(invalid("include must list at least one file extension"));
        }
        if self.analyzer.foreign_key_suffix.is_empty() {
            return Err(invalid("analyzer.foreign_key_suffix cannot be empty"));
        }

        let layout = &self.layout;
        let positive = [
            ("node_sep", layout.node_sep),
            ("rank_sep", layout.rank_sep),
            ("table_width", layout.table_width),
            ("enum_width", layout.enum_width),
            ("header_height", layout.header_height),
            ("row_height", layout.row_height),
        ];
        for (name, value) in positive {
            // NaN fails too
            if !(value > 0.0) {
                return Err(invalid(format!("layout.{name} must be positive, got {value}")));
            }
        }

        let non_negative = [
            ("margin", layout.margin),
            ("padding", layout.padding),
            ("group_padding", layout.group_padding),
            ("group_header", layout.group_header),
        ];
        for (name, value) in non_negative {
            if !(value >= 0.0) {
                return Err(invalid(format!("layout.{name} cannot be negative, got {value}")));
            }
        }

        Ok(())
    }

    /// Whether `path` has one of the configured extensions.
    pub fn includes(&self, path: &Path) -> bool {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return false;
        };
        self.include
            .iter()
            .any(|want| want.trim_start_matches('.').eq_ignore_ascii_case(ext))
    }
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        message: message.into(),
    }
}
