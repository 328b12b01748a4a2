//! CLI argument parsing.

use crate::config::ConfigOverrides;
use clap::{ArgAction, Parser, ValueHint};
use std::path::PathBuf;

/// Send text or media through the Telegram Bot API.
///
/// Credentials come from flags, `~/.config/sendtg/config.json`, or the
/// TELEGRAM_BOT_TOKEN / TELEGRAM_CHAT_ID environment variables.
#[derive(Parser, Debug, Default)]
#[command(name = "sendtg")]
#[command(about = "Send text or media through the Telegram Bot API")]
#[command(version)]
pub struct Cli {
    /// Message text, used when no media is given
    pub message: Option<String>,

    /// Files to send
    #[arg(short = 'm', long = "media", value_hint = ValueHint::FilePath, action = ArgAction::Append, num_args = 1..)]
    pub media: Vec<PathBuf>,

    /// Send files uncompressed, as documents
    #[arg(short = 'F', long = "as-file", alias = "as_file")]
    pub as_file: bool,

    /// Send media one by one instead of as an album
    #[arg(long = "no-group", alias = "no_group")]
    pub no_group: bool,

    /// Caption for the first media item
    #[arg(short = 'C', long = "caption")]
    pub caption: Option<String>,

    /// Inline button label (requires --button-url)
    #[arg(long = "button-text", alias = "button_text")]
    pub button_text: Option<String>,

    /// URL the inline button opens (requires --button-text)
    #[arg(long = "button-url", alias = "button_url")]
    pub button_url: Option<String>,

    /// Hide photo and video previews behind a spoiler
    #[arg(long = "spoiler")]
    pub spoiler: bool,

    /// Send the message without a notification sound
    #[arg(long = "silent")]
    pub silent: bool,

    /// Override the bot token
    #[arg(short = 't', long = "bot_token", alias = "bot-token")]
    pub bot_token: Option<String>,

    /// Override the target chat ID
    #[arg(short = 'c', long = "chat_id", alias = "chat-id", allow_hyphen_values = true)]
    pub chat_id: Option<String>,

    /// Forum topic (message thread) to post into
    #[arg(long = "thread-id", alias = "thread_id", allow_hyphen_values = true)]
    pub thread_id: Option<i32>,

    /// Override the Telegram API base URL
    #[arg(short = 'a', long = "api_url", alias = "api-url")]
    pub api_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long = "timeout")]
    pub timeout: Option<u64>,

    /// Config file to read and write
    #[arg(long = "config", value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Check connectivity and credentials only
    #[arg(long = "check", conflicts_with_all = ["media", "message"])]
    pub check: bool,

    /// Write the config file from flags, prompting for anything missing
    #[arg(long = "setup", conflicts_with_all = ["check", "show_config"])]
    pub setup: bool,

    /// Print the current config file and exit
    #[arg(long = "show-config", alias = "show_config")]
    pub show_config: bool,
}

impl Cli {
    /// Configuration values given on the command line.
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            config_path: self.config.clone(),
            api_url: self.api_url.clone(),
            bot_token: self.bot_token.clone(),
            chat_id: self.chat_id.clone(),
            timeout_seconds: self.timeout,
            thread_id: self.thread_id,
        }
    }

    /// True when there is nothing to send and no probe requested.
    pub fn has_nothing_to_do(&self) -> bool {
        self.media.is_empty() && self.message.is_none() && !self.check
    }
}
