//! Settings file for Lexis
//!
//! Read from `<data_dir>/config.toml`. A missing file or missing keys fall
//! back to defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::srs::session::DEFAULT_SESSION_CAP;
use crate::vocabulary::models::DEFAULT_NEW_WORD_EASE;

pub const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Could not serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Could not determine data directory")]
    DataDirNotFound,
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Which item store to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// One JSON file per record
    #[default]
    Json,
    /// Single SQLite database
    Sqlite,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct LexisConfig {
    /// Maximum words per review session, due and new combined
    pub session_cap: usize,
    /// Ease factor given to newly saved words
    pub new_word_ease_factor: f64,
    /// Language the answers of target-to-native cards are in
    pub native_language: String,
    pub backend: StoreBackend,
}

impl Default for LexisConfig {
    fn default() -> Self {
        Self {
            session_cap: DEFAULT_SESSION_CAP,
            new_word_ease_factor: DEFAULT_NEW_WORD_EASE,
            native_language: "en".to_string(),
            backend: StoreBackend::default(),
        }
    }
}

impl LexisConfig {
    /// Default data directory (e.g., ~/.local/share/lexis)
    pub fn default_data_dir() -> Result<PathBuf> {
        dirs::data_local_dir()
            .map(|p| p.join("lexis"))
            .ok_or(ConfigError::DataDirNotFound)
    }

    pub fn path_in(data_dir: &Path) -> PathBuf {
        data_dir.join(CONFIG_FILE_NAME)
    }

    /// Load the config from a data directory, or defaults if there is none
    pub fn load(data_dir: &Path) -> Result<Self> {
        let path = Self::path_in(data_dir);
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)?;
        Ok(toml::from_str(&content)?)
    }

    pub fn save(&self, data_dir: &Path) -> Result<()> {
        fs::create_dir_all(data_dir)?;
        fs::write(Self::path_in(data_dir), toml::to_string_pretty(self)?)?;
        Ok(())
    }
}
