//! Server configuration, loaded from TOML.

use std::path::Path;
use std::time::Duration;

use fortune_game::GameConfig;
use serde::{Deserialize, Serialize};

use crate::FortuneError;

/// Server settings.
///
/// Every field has a default, so a file only lists what it changes:
///
/// ```toml
/// bind = "0.0.0.0:1234"
/// idle_timeout_secs = 600
///
/// [game]
/// rounds = 5
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the listener binds to.
    pub bind: String,

    /// Longest line accepted from a client, in bytes.
    pub max_line_length: usize,

    /// A connection that sends nothing for this long is closed.
    pub idle_timeout_secs: u64,

    /// Capacity of the match actor's command channel.
    pub channel_size: usize,

    /// Match rules.
    pub game: GameConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:1234".to_string(),
            max_line_length: fortune_transport::DEFAULT_MAX_LINE_LENGTH,
            idle_timeout_secs: 300,
            channel_size: 256,
            game: GameConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Parses a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, FortuneError> {
        Ok(toml::from_str(text)?)
    }

    /// Reads and parses a configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, FortuneError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&text)?;
        tracing::info!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }
}
