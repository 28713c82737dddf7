//! Site configuration
//!
//! Loaded from TOML; every field has a default so an empty file is valid.
//!
//! ```toml
//! password = "swordfish"
//! state_dir = ".termsite"
//!
//! [shell]
//! history_limit = 200
//!
//! [[shell.seed]]
//! path = "~/projects/termsite.txt"
//! content = "This very site."
//!
//! [chess]
//! think_delay_ms = 750
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use termsite_chess::RoomClient;
use termsite_shell::ShellConfig;
use termsite_store::DocumentStore;

/// Subdirectory of `state_dir` holding the document store
pub const DOCUMENTS_DIR: &str = "documents";

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// File is not valid TOML for this schema
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Values parse but make no sense
    #[error("invalid config value: {0}")]
    Invalid(String),
}

/// Chess settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChessConfig {
    /// Minimum engine answer time in milliseconds
    pub think_delay_ms: u64,
    /// Length of generated room codes
    pub room_code_len: usize,
    /// Random codes tried before giving up
    pub create_attempts: usize,
}

impl ChessConfig {
    #[inline]
    #[must_use]
    pub fn think_delay(&self) -> Duration {
        Duration::from_millis(self.think_delay_ms)
    }

    /// Room client honouring these settings
    #[must_use]
    pub fn room_client(&self, store: Arc<dyn DocumentStore>) -> RoomClient {
        RoomClient::new(store)
            .with_code_len(self.room_code_len)
            .with_create_attempts(self.create_attempts)
    }
}

impl Default for ChessConfig {
    fn default() -> Self {
        Self {
            think_delay_ms: 500,
            room_code_len: 6,
            create_attempts: 5,
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Shared password of the gate
    pub password: String,
    /// Where per-device state is kept
    pub state_dir: PathBuf,
    pub shell: ShellConfig,
    pub chess: ChessConfig,
}

impl SiteConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With gate password
    #[inline]
    #[must_use]
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = password.into();
        self
    }

    /// With state directory
    #[inline]
    #[must_use]
    pub fn with_state_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.state_dir = dir.into();
        self
    }

    /// With shell settings
    #[inline]
    #[must_use]
    pub fn with_shell(mut self, shell: ShellConfig) -> Self {
        self.shell = shell;
        self
    }

    /// With chess settings
    #[inline]
    #[must_use]
    pub fn with_chess(mut self, chess: ChessConfig) -> Self {
        self.chess = chess;
        self
    }

    /// Where the persisted document store lives inside `state_dir`
    #[inline]
    #[must_use]
    pub fn documents_dir(&self) -> PathBuf {
        self.state_dir.join(DOCUMENTS_DIR)
    }

    /// Parse and validate TOML
    ///
    /// # Errors
    /// `ConfigError::Parse` or `ConfigError::Invalid`.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    ///
    /// # Errors
    /// `ConfigError::Io` if the file cannot be read, otherwise as
    /// [`Self::from_toml_str`].
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&raw)?;
        tracing::info!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Check values that parse but cannot work
    ///
    /// Seed entries are tried against a scratch tree so a bad entry fails
    /// here rather than on the first visitor.
    ///
    /// # Errors
    /// `ConfigError::Invalid` naming the offending value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.password.trim().is_empty() {
            return Err(ConfigError::Invalid("password must not be empty".into()));
        }
        if !(4..=16).contains(&self.chess.room_code_len) {
            return Err(ConfigError::Invalid(format!(
                "chess.room_code_len must be 4-16, got {}",
                self.chess.room_code_len
            )));
        }
        if self.chess.create_attempts == 0 {
            return Err(ConfigError::Invalid(
                "chess.create_attempts must be at least 1".into(),
            ));
        }
        termsite_vfs::build_tree("visitor", &self.shell.seed)
            .map_err(|e| ConfigError::Invalid(format!("shell.seed: {e}")))?;
        Ok(())
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            password: "letmein".to_string(),
            state_dir: PathBuf::from(".termsite"),
            shell: ShellConfig::default(),
            chess: ChessConfig::default(),
        }
    }
}
