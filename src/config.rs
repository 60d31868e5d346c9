//! Formula editor configuration
//!
//! Stores preferences in `~/.config/indicator-formula/config.yaml`

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::model::UnknownTagPolicy;
use crate::token::TokenKind;

/// Errors that can occur when loading a config file
#[derive(Debug, Clone)]
pub enum ConfigError {
    IoError(String),
    ParseError(String),
    /// Two kinds share the same trigger character
    DuplicateTrigger(char),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {}", e),
            ConfigError::ParseError(e) => write!(f, "Parse error: {}", e),
            ConfigError::DuplicateTrigger(c) => {
                write!(f, "Trigger character '{}' is used by more than one kind", c)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Trigger character for each token kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerConfig {
    #[serde(default = "default_position_trigger")]
    pub position: char,
    #[serde(default = "default_impact_trigger")]
    pub impact: char,
}

fn default_position_trigger() -> char {
    TokenKind::Position.default_trigger()
}

fn default_impact_trigger() -> char {
    TokenKind::Impact.default_trigger()
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            position: default_position_trigger(),
            impact: default_impact_trigger(),
        }
    }
}

impl TriggerConfig {
    pub fn char_for(&self, kind: TokenKind) -> char {
        match kind {
            TokenKind::Position => self.position,
            TokenKind::Impact => self.impact,
        }
    }
}

/// Editing session configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormulaConfig {
    #[serde(default)]
    pub triggers: TriggerConfig,
    /// Allow a trigger to open right after non-whitespace text
    #[serde(default = "default_allow_mid_word")]
    pub allow_mid_word: bool,
    /// Delay before a query change turns into a fetch (0 = immediate)
    #[serde(default)]
    pub debounce_ms: u64,
    /// Upper bound on the number of candidates shown
    #[serde(default = "default_max_candidates")]
    pub max_candidates: usize,
    /// Handling of unrecognised tags when loading a serialized formula
    #[serde(default)]
    pub unknown_tags: UnknownTagPolicy,
}

fn default_allow_mid_word() -> bool {
    true
}

fn default_max_candidates() -> usize {
    50
}

impl Default for FormulaConfig {
    fn default() -> Self {
        Self {
            triggers: TriggerConfig::default(),
            allow_mid_word: default_allow_mid_word(),
            debounce_ms: 0,
            max_candidates: default_max_candidates(),
            unknown_tags: UnknownTagPolicy::default(),
        }
    }
}

impl FormulaConfig {
    /// Load config from the default location, or return defaults
    pub fn load() -> Self {
        let Some(path) = crate::config_paths::config_file() else {
            tracing::debug!("No config directory available, using defaults");
            return Self::default();
        };

        if !path.exists() {
            tracing::debug!(
                "Config file not found at {}, using defaults",
                path.display()
            );
            return Self::default();
        }

        match Self::load_from(&path) {
            Ok(config) => {
                tracing::info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                tracing::warn!("Failed to load config at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Load and validate a specific config file
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_yaml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.triggers.position == self.triggers.impact {
            return Err(ConfigError::DuplicateTrigger(self.triggers.position));
        }
        Ok(())
    }

    /// Write config as YAML, creating the parent directory if needed
    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config directory: {}", e))?;
        }

        let content = serde_yaml::to_string(self)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;

        std::fs::write(path, content)
            .map_err(|e| format!("Failed to write config to {}: {}", path.display(), e))?;

        tracing::info!("Saved config to {}", path.display());
        Ok(())
    }
}
