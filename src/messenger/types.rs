//! Shared types for messenger implementations.

use crate::error::MarkupError;
use std::path::{Path, PathBuf};
use url::Url;

/// How a file is uploaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Photo,
    Video,
    Audio,
    Document,
}

impl MediaKind {
    /// Map a MIME type to the upload kind. Unknown types are documents.
    pub fn from_mime(mime: Option<&str>) -> Self {
        match mime {
            Some(mt) if mt.starts_with("image/") => MediaKind::Photo,
            Some(mt) if mt.starts_with("video/") => MediaKind::Video,
            Some(mt) if mt.starts_with("audio/") => MediaKind::Audio,
            _ => MediaKind::Document,
        }
    }

    /// Progress indicator shown while this kind uploads.
    pub fn upload_action(self) -> ChatAction {
        match self {
            MediaKind::Photo => ChatAction::UploadPhoto,
            MediaKind::Video => ChatAction::UploadVideo,
            MediaKind::Audio => ChatAction::UploadVoice,
            MediaKind::Document => ChatAction::UploadDocument,
        }
    }

    /// Only photos and videos can be hidden behind a spoiler.
    pub fn supports_spoiler(self) -> bool {
        matches!(self, MediaKind::Photo | MediaKind::Video)
    }

    /// Albums may hold photos and videos together, or audio alone.
    pub fn can_share_album_with(self, other: MediaKind) -> bool {
        match (self, other) {
            (MediaKind::Audio, MediaKind::Audio) => true,
            (MediaKind::Photo | MediaKind::Video, MediaKind::Photo | MediaKind::Video) => true,
            _ => false,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MediaKind::Photo => "photo",
            MediaKind::Video => "video",
            MediaKind::Audio => "audio",
            MediaKind::Document => "document",
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Chat action sent as a progress indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatAction {
    Typing,
    UploadPhoto,
    UploadVideo,
    UploadVoice,
    UploadDocument,
}

/// A file resolved for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaItem {
    /// Path on disk; opened by the transport only while its request runs
    pub path: PathBuf,
    /// File name presented to the recipient
    pub file_name: String,
    pub kind: MediaKind,
    /// Hide the preview until tapped (photo and video only)
    pub spoiler: bool,
}

impl MediaItem {
    /// Create an item, dropping the spoiler flag for kinds that cannot carry it.
    pub fn new(path: PathBuf, kind: MediaKind, spoiler: bool) -> Self {
        let file_name = file_name_of(&path);
        Self {
            path,
            file_name,
            kind,
            spoiler: spoiler && kind.supports_spoiler(),
        }
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| "media".to_string())
}

/// A single inline URL button attached below a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyMarkup {
    pub text: String,
    pub url: Url,
}

impl ReplyMarkup {
    /// Build markup from optional CLI values.
    ///
    /// Returns `Ok(None)` when neither value is given and an error when only
    /// one is, or when the URL does not parse.
    pub fn from_parts(
        text: Option<&str>,
        url: Option<&str>,
    ) -> Result<Option<Self>, MarkupError> {
        match (text, url) {
            (Some(text), Some(url)) => {
                let url = Url::parse(url).map_err(|_| MarkupError::InvalidUrl(url.to_string()))?;
                Ok(Some(Self {
                    text: text.to_string(),
                    url,
                }))
            }
            (Some(_), None) | (None, Some(_)) => Err(MarkupError::IncompleteButton),
            (None, None) => Ok(None),
        }
    }
}
