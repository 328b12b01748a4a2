//! Messenger abstraction over the chat API.
//!
//! The dispatcher and message sender only talk to the [`Messenger`] trait, so
//! they can be exercised without a network.

mod types;

pub mod telegram;

pub use types::{ChatAction, MediaItem, MediaKind, ReplyMarkup};

use crate::error::SendError;
use async_trait::async_trait;
use std::time::Duration;

/// Chat name used when the lookup fails.
pub const UNKNOWN_CHAT: &str = "Unknown";

/// Outbound requests against a single chat.
///
/// Every error returned by an implementation must already have the bot token
/// redacted from its text.
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Send a text message.
    async fn send_text(
        &self,
        text: &str,
        markup: Option<&ReplyMarkup>,
        silent: bool,
    ) -> Result<(), SendError>;

    /// Send a file uncompressed, as a document.
    async fn send_document(
        &self,
        item: &MediaItem,
        caption: Option<&str>,
        markup: Option<&ReplyMarkup>,
    ) -> Result<(), SendError>;

    /// Send one photo, video or audio file through its typed endpoint.
    async fn send_media(
        &self,
        item: &MediaItem,
        caption: Option<&str>,
        markup: Option<&ReplyMarkup>,
    ) -> Result<(), SendError>;

    /// Send 2 to 10 items as one album. The caption goes on the first item.
    async fn send_media_group(
        &self,
        items: &[MediaItem],
        caption: Option<&str>,
    ) -> Result<(), SendError>;

    /// Show a progress indicator in the chat.
    ///
    /// Returns immediately; the request runs in the background and its
    /// failure is only logged.
    fn send_chat_action(&self, action: ChatAction);

    /// Display name of the chat for log lines. Lookup failures are logged and
    /// yield [`UNKNOWN_CHAT`].
    async fn chat_name(&self) -> String;

    /// Send a chat action and wait for it, returning the round-trip time.
    async fn probe(&self) -> Result<Duration, SendError>;

    /// Get the platform name for logging purposes.
    fn platform_name(&self) -> &'static str;
}
