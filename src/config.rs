//! Configuration management.
//!
//! Values are resolved field by field, first match wins:
//! 1. Command-line flags
//! 2. JSON config file (`~/.config/sendtg/config.json` or `--config`)
//! 3. Environment variables (a `.env` file is loaded first)
//!
//! The API URL and timeout fall back to built-in defaults.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use teloxide::types::{ChatId, MessageId, Recipient, ThreadId};
use url::Url;

/// Telegram Bot API base URL.
pub const DEFAULT_API_URL: &str = "https://api.telegram.org";

/// Default request timeout. Uploads of large files need a generous limit.
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 300;

/// Default configuration file path.
pub fn default_config_path() -> PathBuf {
    dirs_config_dir().join("config.json")
}

/// Get the sendtg config directory path.
fn dirs_config_dir() -> PathBuf {
    directories::BaseDirs::new()
        .map(|dirs| dirs.home_dir().join(".config").join("sendtg"))
        .unwrap_or_else(|| PathBuf::from(".sendtg"))
}

// ============================================================================
// Configuration File
// ============================================================================

/// JSON configuration file structure. Every field is optional so partially
/// written files still load.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bot_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat_id: Option<ChatIdValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u64>,
}

/// Chat ID that can be either string or integer in JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChatIdValue {
    String(String),
    Integer(i64),
}

impl ChatIdValue {
    pub fn as_string(&self) -> String {
        match self {
            ChatIdValue::String(s) => s.trim().to_string(),
            ChatIdValue::Integer(i) => i.to_string(),
        }
    }
}

impl FileConfig {
    /// Read a config file. A missing file yields `FileNotFound`.
    pub fn from_json(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Read a config file, treating a missing file as empty.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        match Self::from_json(path) {
            Err(ConfigError::FileNotFound(_)) => Ok(Self::default()),
            other => other,
        }
    }

    /// Write the config file, creating parent directories. Blank values are
    /// dropped and the file is made owner-readable only.
    pub fn write(&self, path: &Path) -> Result<(), ConfigError> {
        let cleaned = Self {
            api_url: non_blank(self.api_url.clone()),
            bot_token: non_blank(self.bot_token.clone()),
            chat_id: self
                .chat_id
                .clone()
                .filter(|c| !c.as_string().is_empty()),
            timeout_seconds: self.timeout_seconds,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(&cleaned)?)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
        }

        Ok(())
    }

    /// True when token and chat id are both present and non-blank.
    pub fn has_required_fields(&self) -> bool {
        non_blank(self.bot_token.clone()).is_some()
            && self
                .chat_id
                .as_ref()
                .is_some_and(|c| !c.as_string().is_empty())
    }
}

// ============================================================================
// Environment
// ============================================================================

/// Values read from the process environment.
#[derive(Debug, Default, Clone)]
pub struct EnvConfig {
    pub api_url: Option<String>,
    pub bot_token: Option<String>,
    pub chat_id: Option<String>,
    pub timeout_seconds: Option<String>,
}

impl EnvConfig {
    /// Load `.env` files (silently ignored if absent) and read the variables.
    pub fn from_env() -> Self {
        let _ = dotenvy::from_path(dirs_config_dir().join(".env"));
        let _ = dotenvy::dotenv();

        Self {
            api_url: env::var("TELEGRAM_API_URL").ok(),
            bot_token: env::var("TELEGRAM_BOT_TOKEN").ok(),
            chat_id: env::var("TELEGRAM_CHAT_ID").ok(),
            timeout_seconds: env::var("SENDTG_TIMEOUT").ok(),
        }
    }
}

// ============================================================================
// Application Configuration
// ============================================================================

/// Values supplied on the command line.
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    pub config_path: Option<PathBuf>,
    pub api_url: Option<String>,
    pub bot_token: Option<String>,
    pub chat_id: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub thread_id: Option<i32>,
}

impl ConfigOverrides {
    /// Config file to read and write.
    pub fn config_path(&self) -> PathBuf {
        self.config_path.clone().unwrap_or_else(default_config_path)
    }

    /// True when the credentials came entirely from elsewhere.
    pub fn uses_stored_credentials(&self) -> bool {
        self.bot_token.is_none() && self.chat_id.is_none()
    }
}

/// Resolved application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// API base URL, without the `/bot<token>` suffix
    pub api_url: Url,
    pub bot_token: String,
    pub chat_id: Recipient,
    /// Per-request timeout
    pub timeout: Duration,
    /// Forum topic every request is posted into
    pub thread_id: Option<ThreadId>,
}

impl Config {
    /// Resolve configuration from flags, the config file and the environment.
    pub fn load(overrides: &ConfigOverrides) -> Result<Self, ConfigError> {
        let file = match &overrides.config_path {
            // An explicitly named file must exist
            Some(path) => FileConfig::from_json(path)?,
            None => FileConfig::load_or_default(&default_config_path())?,
        };
        Self::resolve(overrides, &file, &EnvConfig::from_env())
    }

    /// Merge the three sources without touching the filesystem or process
    /// environment.
    pub fn resolve(
        overrides: &ConfigOverrides,
        file: &FileConfig,
        env: &EnvConfig,
    ) -> Result<Self, ConfigError> {
        let bot_token = non_blank(overrides.bot_token.clone())
            .or_else(|| non_blank(file.bot_token.clone()))
            .or_else(|| non_blank(env.bot_token.clone()))
            .ok_or_else(|| ConfigError::MissingField("bot token".to_string()))?;

        let chat_id = non_blank(overrides.chat_id.clone())
            .or_else(|| non_blank(file.chat_id.as_ref().map(ChatIdValue::as_string)))
            .or_else(|| non_blank(env.chat_id.clone()))
            .ok_or_else(|| ConfigError::MissingField("chat ID".to_string()))?;

        let api_url = non_blank(overrides.api_url.clone())
            .or_else(|| non_blank(file.api_url.clone()))
            .or_else(|| non_blank(env.api_url.clone()))
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let timeout_seconds = match overrides.timeout_seconds.or(file.timeout_seconds) {
            Some(seconds) => seconds,
            None => match non_blank(env.timeout_seconds.clone()) {
                Some(raw) => raw
                    .parse::<u64>()
                    .map_err(|_| ConfigError::InvalidTimeout(raw))?,
                None => DEFAULT_TIMEOUT_SECONDS,
            },
        };
        if timeout_seconds == 0 {
            return Err(ConfigError::InvalidTimeout("0".to_string()));
        }

        Ok(Self {
            api_url: parse_api_url(&api_url)?,
            bot_token,
            chat_id: parse_chat_id(&chat_id)?,
            timeout: Duration::from_secs(timeout_seconds),
            thread_id: overrides.thread_id.map(|id| ThreadId(MessageId(id))),
        })
    }
}

/// Parse a numeric chat id or an `@channelusername`.
pub fn parse_chat_id(raw: &str) -> Result<Recipient, ConfigError> {
    let raw = raw.trim();
    if let Some(name) = raw.strip_prefix('@') {
        if name.is_empty() {
            return Err(ConfigError::InvalidChatId(raw.to_string()));
        }
        return Ok(Recipient::ChannelUsername(raw.to_string()));
    }
    raw.parse::<i64>()
        .map(|id| Recipient::Id(ChatId(id)))
        .map_err(|_| ConfigError::InvalidChatId(raw.to_string()))
}

/// Parse the API base URL. Old-style values ending in `/bot` (the token was
/// appended directly) are accepted and trimmed back to the base.
pub fn parse_api_url(raw: &str) -> Result<Url, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let base = trimmed.strip_suffix("/bot").unwrap_or(trimmed);
    Url::parse(base).map_err(|e| ConfigError::InvalidApiUrl(raw.to_string(), e))
}

/// Display form of a recipient.
pub fn display_chat_id(chat_id: &Recipient) -> String {
    match chat_id {
        Recipient::Id(id) => id.0.to_string(),
        Recipient::ChannelUsername(name) => name.clone(),
    }
}

/// Trim a value, treating blank as absent.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
