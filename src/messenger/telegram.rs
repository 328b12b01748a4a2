//! Telegram messenger implementation.
//!
//! Implements the Messenger trait on top of teloxide's Bot API client.

use super::{ChatAction, MediaItem, MediaKind, Messenger, ReplyMarkup, UNKNOWN_CHAT};
use crate::config::Config;
use crate::error::SendError;
use crate::redact::redact;
use async_trait::async_trait;
use std::fmt::Display;
use std::time::{Duration, Instant};
use teloxide::prelude::*;
use teloxide::types::{
    ChatAction as TelegramChatAction, InlineKeyboardButton, InlineKeyboardMarkup, InputFile,
    InputMedia, InputMediaAudio, InputMediaPhoto, InputMediaVideo, ParseMode, Recipient,
    ThreadId,
};
use tracing::{debug, warn};

/// Telegram messenger bound to one chat, and optionally one forum topic.
pub struct TelegramMessenger {
    bot: Bot,
    chat_id: Recipient,
    thread_id: Option<ThreadId>,
    bot_token: String,
}

impl TelegramMessenger {
    /// Create a messenger with the configured API URL and request timeout.
    pub fn new(config: &Config) -> Result<Self, SendError> {
        let client = teloxide::net::default_reqwest_settings()
            .timeout(config.timeout)
            .build()
            .map_err(|e| SendError::Client(redact(&e.to_string(), &config.bot_token)))?;

        let bot = Bot::with_client(config.bot_token.clone(), client)
            .set_api_url(config.api_url.clone());

        Ok(Self {
            bot,
            chat_id: config.chat_id.clone(),
            thread_id: config.thread_id,
            bot_token: config.bot_token.clone(),
        })
    }

    fn error(&self, context: &str, err: impl Display) -> SendError {
        transport_error(context, err, &self.bot_token)
    }
}

#[async_trait]
impl Messenger for TelegramMessenger {
    async fn send_text(
        &self,
        text: &str,
        markup: Option<&ReplyMarkup>,
        silent: bool,
    ) -> Result<(), SendError> {
        let mut request = self
            .bot
            .send_message(self.chat_id.clone(), text)
            .parse_mode(ParseMode::Html)
            .disable_notification(silent);
        if let Some(thread_id) = self.thread_id {
            request = request.message_thread_id(thread_id);
        }
        if let Some(markup) = markup {
            request = request.reply_markup(keyboard(markup));
        }

        request
            .await
            .map(|_| ())
            .map_err(|e| self.error("Failed to send message:", e))
    }

    async fn send_document(
        &self,
        item: &MediaItem,
        caption: Option<&str>,
        markup: Option<&ReplyMarkup>,
    ) -> Result<(), SendError> {
        let mut request = self
            .bot
            .send_document(self.chat_id.clone(), input_file(item))
            .disable_content_type_detection(true);
        if let Some(thread_id) = self.thread_id {
            request = request.message_thread_id(thread_id);
        }
        if let Some(caption) = caption {
            request = request.caption(caption);
        }
        if let Some(markup) = markup {
            request = request.reply_markup(keyboard(markup));
        }

        request
            .await
            .map(|_| ())
            .map_err(|e| self.error("Failed to send document:", e))
    }

    async fn send_media(
        &self,
        item: &MediaItem,
        caption: Option<&str>,
        markup: Option<&ReplyMarkup>,
    ) -> Result<(), SendError> {
        let file = input_file(item);
        let result = match item.kind {
            MediaKind::Photo => {
                let mut request = self
                    .bot
                    .send_photo(self.chat_id.clone(), file)
                    .has_spoiler(item.spoiler);
                if let Some(thread_id) = self.thread_id {
                    request = request.message_thread_id(thread_id);
                }
                if let Some(caption) = caption {
                    request = request.caption(caption);
                }
                if let Some(markup) = markup {
                    request = request.reply_markup(keyboard(markup));
                }
                request.await.map(|_| ())
            }
            MediaKind::Video => {
                let mut request = self
                    .bot
                    .send_video(self.chat_id.clone(), file)
                    .supports_streaming(true)
                    .has_spoiler(item.spoiler);
                if let Some(thread_id) = self.thread_id {
                    request = request.message_thread_id(thread_id);
                }
                if let Some(caption) = caption {
                    request = request.caption(caption);
                }
                if let Some(markup) = markup {
                    request = request.reply_markup(keyboard(markup));
                }
                request.await.map(|_| ())
            }
            MediaKind::Audio => {
                let mut request = self.bot.send_audio(self.chat_id.clone(), file);
                if let Some(thread_id) = self.thread_id {
                    request = request.message_thread_id(thread_id);
                }
                if let Some(caption) = caption {
                    request = request.caption(caption);
                }
                if let Some(markup) = markup {
                    request = request.reply_markup(keyboard(markup));
                }
                request.await.map(|_| ())
            }
            MediaKind::Document => return self.send_document(item, caption, markup).await,
        };

        result.map_err(|e| self.error("Failed to send media file:", e))
    }

    async fn send_media_group(
        &self,
        items: &[MediaItem],
        caption: Option<&str>,
    ) -> Result<(), SendError> {
        let media: Vec<InputMedia> = items
            .iter()
            .enumerate()
            .map(|(i, item)| input_media(item, if i == 0 { caption } else { None }))
            .collect();

        let mut request = self.bot.send_media_group(self.chat_id.clone(), media);
        if let Some(thread_id) = self.thread_id {
            request = request.message_thread_id(thread_id);
        }

        request
            .await
            .map(|_| ())
            .map_err(|e| self.error("Failed to send media group:", e))
    }

    fn send_chat_action(&self, action: ChatAction) {
        let bot = self.bot.clone();
        let chat_id = self.chat_id.clone();
        let thread_id = self.thread_id;
        let token = self.bot_token.clone();

        tokio::spawn(async move {
            let mut request = bot.send_chat_action(chat_id, action.into());
            if let Some(thread_id) = thread_id {
                request = request.message_thread_id(thread_id);
            }
            if let Err(e) = request.await {
                debug!("Failed to send chat action: {}", redact(&e.to_string(), &token));
            }
        });
    }

    async fn chat_name(&self) -> String {
        match self.bot.get_chat(self.chat_id.clone()).await {
            Ok(chat) => chat_label(chat.title(), chat.first_name(), chat.last_name()),
            Err(e) => {
                warn!("{}", self.error("Failed to get chat name:", e));
                UNKNOWN_CHAT.to_string()
            }
        }
    }

    async fn probe(&self) -> Result<Duration, SendError> {
        let start = Instant::now();
        self.bot
            .send_chat_action(self.chat_id.clone(), TelegramChatAction::Typing)
            .await
            .map_err(|e| self.error("Failed to send chat action:", e))?;
        Ok(start.elapsed())
    }

    fn platform_name(&self) -> &'static str {
        "Telegram"
    }
}

impl From<ChatAction> for TelegramChatAction {
    fn from(action: ChatAction) -> Self {
        match action {
            ChatAction::Typing => TelegramChatAction::Typing,
            ChatAction::UploadPhoto => TelegramChatAction::UploadPhoto,
            ChatAction::UploadVideo => TelegramChatAction::UploadVideo,
            ChatAction::UploadVoice => TelegramChatAction::UploadVoice,
            ChatAction::UploadDocument => TelegramChatAction::UploadDocument,
        }
    }
}

/// Build a transport error with the token scrubbed from the message.
fn transport_error(context: &str, err: impl Display, token: &str) -> SendError {
    SendError::Transport {
        context: context.to_string(),
        message: redact(&err.to_string(), token),
    }
}

/// Group or channel title, else the user's full name.
fn chat_label(title: Option<&str>, first_name: Option<&str>, last_name: Option<&str>) -> String {
    if let Some(title) = title {
        return title.to_string();
    }
    let full = [first_name, last_name]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    if full.is_empty() {
        UNKNOWN_CHAT.to_string()
    } else {
        full
    }
}

/// The file is opened when the request body is written and closed with it.
fn input_file(item: &MediaItem) -> InputFile {
    InputFile::file(item.path.clone()).file_name(item.file_name.clone())
}

/// Create a one-button inline keyboard.
fn keyboard(markup: &ReplyMarkup) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::url(
        markup.text.clone(),
        markup.url.clone(),
    )]])
}

/// Album entry. Documents never reach albums; they map to photos here only
/// to keep the match exhaustive.
fn input_media(item: &MediaItem, caption: Option<&str>) -> InputMedia {
    let file = input_file(item);
    let caption = caption.map(str::to_string);
    match item.kind {
        MediaKind::Video => {
            let mut video = InputMediaVideo::new(file);
            video.caption = caption;
            video.has_spoiler = item.spoiler;
            InputMedia::Video(video)
        }
        MediaKind::Audio => {
            let mut audio = InputMediaAudio::new(file);
            audio.caption = caption;
            InputMedia::Audio(audio)
        }
        MediaKind::Photo | MediaKind::Document => {
            let mut photo = InputMediaPhoto::new(file);
            photo.caption = caption;
            photo.has_spoiler = item.spoiler;
            InputMedia::Photo(photo)
        }
    }
}
