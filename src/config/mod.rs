//! Configuration loading and validation.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::fetch::FetcherConfig;
use crate::parse_duration;

/// Environment variable that overrides `discord.token`.
pub const DISCORD_TOKEN_ENV: &str = "DISCORD_TOKEN";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Discord connection settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiscordConfig {
    /// Bot token; the `DISCORD_TOKEN` environment variable takes precedence
    #[serde(default)]
    pub token: String,
}

/// Lichess API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LichessConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_base_url() -> String {
    crate::lichess::DEFAULT_BASE_URL.to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    concat!("lichess-leaderboard/", env!("CARGO_PKG_VERSION")).to_string()
}

impl Default for LichessConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl LichessConfig {
    pub fn fetcher_config(&self) -> FetcherConfig {
        FetcherConfig {
            timeout: Duration::from_secs(self.timeout_seconds),
            user_agent: self.user_agent.clone(),
            ..FetcherConfig::default()
        }
    }
}

/// How the leaderboard is posted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Image,
}

/// Chat command behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    /// Per-user cooldown between commands (e.g. "30s")
    #[serde(default = "default_cooldown")]
    pub cooldown: String,

    /// How long a team table is served without refreshing (e.g. "24h")
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl: String,

    /// Rows shown by `!tabelle` when no count is given
    #[serde(default = "default_top")]
    pub default_top: usize,

    /// Maximum lines per chat message when posting text tables
    #[serde(default = "default_chunk_lines")]
    pub chunk_lines: usize,

    #[serde(default)]
    pub output: OutputFormat,
}

fn default_cooldown() -> String {
    "30s".to_string()
}

fn default_cache_ttl() -> String {
    "24h".to_string()
}

fn default_top() -> usize {
    10
}

fn default_chunk_lines() -> usize {
    40
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            cooldown: default_cooldown(),
            cache_ttl: default_cache_ttl(),
            default_top: default_top(),
            chunk_lines: default_chunk_lines(),
            output: OutputFormat::default(),
        }
    }
}

impl BotConfig {
    pub fn cooldown(&self) -> Result<Duration, ConfigError> {
        parse_duration(&self.cooldown).ok_or_else(|| {
            ConfigError::ValidationError(format!("Invalid cooldown: {:?}", self.cooldown))
        })
    }

    pub fn cache_ttl(&self) -> Result<Duration, ConfigError> {
        parse_duration(&self.cache_ttl).ok_or_else(|| {
            ConfigError::ValidationError(format!("Invalid cache_ttl: {:?}", self.cache_ttl))
        })
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub discord: DiscordConfig,

    #[serde(default)]
    pub lichess: LichessConfig,

    #[serde(default)]
    pub bot: BotConfig,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            discord: DiscordConfig::default(),
            lichess: LichessConfig::default(),
            bot: BotConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Discord token from the environment, else from the file.
    pub fn discord_token(&self) -> Option<String> {
        std::env::var(DISCORD_TOKEN_ENV)
            .ok()
            .filter(|t| !t.trim().is_empty())
            .or_else(|| Some(self.discord.token.clone()).filter(|t| !t.trim().is_empty()))
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lichess.timeout_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "Lichess timeout must be greater than 0".to_string(),
            ));
        }

        if url::Url::parse(&self.lichess.base_url).is_err() {
            return Err(ConfigError::ValidationError(format!(
                "Invalid Lichess base URL: {}",
                self.lichess.base_url
            )));
        }

        if self.bot.default_top == 0 {
            return Err(ConfigError::ValidationError(
                "default_top must be greater than 0".to_string(),
            ));
        }

        if self.bot.chunk_lines == 0 {
            return Err(ConfigError::ValidationError(
                "chunk_lines must be greater than 0".to_string(),
            ));
        }

        self.bot.cooldown()?;
        self.bot.cache_ttl()?;

        Ok(())
    }
}
