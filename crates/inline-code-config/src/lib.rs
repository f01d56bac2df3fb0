use inline_code_engine::{ButtonStyles, InlineCodeTool, MarkerSpec, SearchDepth};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid value for `{field}`: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Marker and toolbar settings for the inline code tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub tag: String,
    pub class: String,
    /// How many nodes the ancestor walk tests before giving up.
    pub search_depth: usize,
    pub button: ButtonConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ButtonConfig {
    pub base: String,
    pub active: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tag: MarkerSpec::TAG.to_string(),
            class: MarkerSpec::CLASS.to_string(),
            search_depth: SearchDepth::DEFAULT.get(),
            button: ButtonConfig::default(),
        }
    }
}

impl Default for ButtonConfig {
    fn default() -> Self {
        let ButtonStyles { base, active } = ButtonStyles::default();
        Self { base, active }
    }
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        config.validate()?;
        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        self.save_to_path(&config_path)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/inline-code");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        Self::check_name("tag", &self.tag)?;
        Self::check_name("class", &self.class)?;
        self.depth().map(|_| ())
    }

    fn check_name(field: &'static str, value: &str) -> Result<(), ConfigError> {
        if value.is_empty() {
            return Err(ConfigError::InvalidValue {
                field,
                reason: "must not be empty".to_string(),
            });
        }
        if value.chars().any(char::is_whitespace) {
            return Err(ConfigError::InvalidValue {
                field,
                reason: format!("{value:?} contains whitespace"),
            });
        }
        Ok(())
    }

    fn depth(&self) -> Result<SearchDepth, ConfigError> {
        SearchDepth::new(self.search_depth).ok_or_else(|| ConfigError::InvalidValue {
            field: "search_depth",
            reason: "must be at least 1".to_string(),
        })
    }

    pub fn marker_spec(&self) -> Result<MarkerSpec, ConfigError> {
        self.validate()?;
        Ok(MarkerSpec::new(&self.tag, self.class.clone()).with_depth(self.depth()?))
    }

    pub fn tool(&self) -> Result<InlineCodeTool, ConfigError> {
        let styles = ButtonStyles {
            base: self.button.base.clone(),
            active: self.button.active.clone(),
        };
        Ok(InlineCodeTool::new(self.marker_spec()?, styles))
    }
}
