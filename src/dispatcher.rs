//! Media dispatch: turns a list of paths into upload requests.
//!
//! Files are sent strictly in input order, one request at a time:
//! - Photos, videos and audio are collected into albums of at most
//!   [`MAX_GROUP_SIZE`] items, or sent one by one with `no_group`.
//! - A document (or any file with `as_file`) flushes what was collected,
//!   is sent on its own, and ends the dispatch. Files after it are not sent.
//! - The caption is attached to the first item sent and nowhere else.
//!
//! Missing files and failed requests are logged and skipped; they never stop
//! the remaining files from being sent.
//!
//! The chat name used in log lines is looked up once, before the first
//! request.

use crate::error::SendError;
use crate::media;
use crate::messenger::{MediaItem, MediaKind, Messenger, ReplyMarkup};
use std::path::PathBuf;
use tracing::{error, info, warn};

/// Album size limit imposed by the API.
pub const MAX_GROUP_SIZE: usize = 10;

/// Everything needed to send one batch of files.
#[derive(Debug, Clone, Default)]
pub struct DispatchRequest {
    pub paths: Vec<PathBuf>,
    pub as_file: bool,
    pub no_group: bool,
    pub spoiler: bool,
    pub caption: Option<String>,
    pub markup: Option<ReplyMarkup>,
}

/// Outcome counters of a dispatch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Requests that succeeded
    pub sent: usize,
    /// Requests that failed
    pub failed: usize,
    /// Paths that were not regular files
    pub missing: usize,
    /// Existing files left unsent after a document ended the dispatch
    pub skipped: usize,
    /// Chat name, once a request has been made
    pub chat: Option<String>,
}

/// Send every file of `request` through `messenger`.
pub async fn dispatch<M>(messenger: &M, request: &DispatchRequest) -> DispatchReport
where
    M: Messenger + ?Sized,
{
    let mut run = Dispatch {
        messenger,
        markup: request.markup.as_ref(),
        caption: request.caption.clone(),
        pending: Vec::with_capacity(MAX_GROUP_SIZE),
        report: DispatchReport::default(),
    };

    for (index, path) in request.paths.iter().enumerate() {
        let item = match media::resolve_item(path, request.as_file, request.spoiler) {
            Ok(item) => item,
            Err(e) => {
                warn!(path = %path.display(), "{}", e);
                run.report.missing += 1;
                continue;
            }
        };

        if item.kind == MediaKind::Document {
            run.flush().await;
            run.send_document(&item).await;

            let rest = &request.paths[index + 1..];
            let (remaining, missing): (Vec<&PathBuf>, Vec<&PathBuf>) =
                rest.iter().partition(|path| path.is_file());
            run.report.missing += missing.len();
            if !remaining.is_empty() {
                warn!(
                    remaining = remaining.len(),
                    "Documents are sent one per invocation; remaining files were not sent"
                );
                run.report.skipped = remaining.len();
            }
            return run.report;
        }

        if request.no_group {
            run.send_single(&item).await;
            continue;
        }

        let fits = run.pending.len() < MAX_GROUP_SIZE
            && run
                .pending
                .first()
                .map_or(true, |first| first.kind.can_share_album_with(item.kind));
        if !fits {
            run.flush().await;
        }
        run.pending.push(item);
    }

    run.flush().await;
    run.report
}

/// State of one dispatch call.
struct Dispatch<'a, M: ?Sized> {
    messenger: &'a M,
    markup: Option<&'a ReplyMarkup>,
    /// Taken by the first request that sends anything
    caption: Option<String>,
    pending: Vec<MediaItem>,
    report: DispatchReport,
}

impl<M> Dispatch<'_, M>
where
    M: Messenger + ?Sized,
{
    /// Send the collected items as an album, or as a single media request
    /// when only one is collected.
    async fn flush(&mut self) {
        match self.pending.len() {
            0 => {}
            1 => {
                let item = self.pending.remove(0);
                self.send_single(&item).await;
            }
            count => {
                let items = std::mem::take(&mut self.pending);
                self.messenger.send_chat_action(items[0].kind.upload_action());
                let chat = self.chat().await;
                let caption = self.caption.take();
                let result = self
                    .messenger
                    .send_media_group(&items, caption.as_deref())
                    .await;
                self.record(result, || info!(count, chat = %chat, "Media group sent"));
            }
        }
    }

    async fn send_single(&mut self, item: &MediaItem) {
        self.messenger.send_chat_action(item.kind.upload_action());
        let chat = self.chat().await;
        let caption = self.caption.take();
        let result = self
            .messenger
            .send_media(item, caption.as_deref(), self.markup)
            .await;
        self.record(result, || {
            info!(file = %item.file_name, kind = %item.kind, chat = %chat, "Media sent")
        });
    }

    async fn send_document(&mut self, item: &MediaItem) {
        self.messenger.send_chat_action(item.kind.upload_action());
        let chat = self.chat().await;
        let caption = self.caption.take();
        let result = self
            .messenger
            .send_document(item, caption.as_deref(), self.markup)
            .await;
        self.record(result, || {
            info!(file = %item.file_name, chat = %chat, "Document sent")
        });
    }

    async fn chat(&mut self) -> String {
        if let Some(chat) = &self.report.chat {
            return chat.clone();
        }
        let chat = self.messenger.chat_name().await;
        self.report.chat = Some(chat.clone());
        chat
    }

    fn record<F: FnOnce()>(&mut self, result: Result<(), SendError>, on_success: F) {
        match result {
            Ok(()) => {
                self.report.sent += 1;
                on_success();
            }
            Err(e) => {
                self.report.failed += 1;
                error!("{}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messenger::testing::{Call, RecordingMessenger};
    use crate::messenger::ChatAction;
    use std::fs;
    use std::path::Path;
    use tempfile::{tempdir, TempDir};

    fn touch(dir: &TempDir, name: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, b"data").unwrap();
        path
    }

    fn photos(dir: &TempDir, count: usize) -> Vec<PathBuf> {
        (0..count)
            .map(|i| touch(dir, &format!("photo{:02}.jpg", i)))
            .collect()
    }

    fn request(paths: Vec<PathBuf>) -> DispatchRequest {
        DispatchRequest {
            paths,
            ..DispatchRequest::default()
        }
    }

    fn markup() -> ReplyMarkup {
        ReplyMarkup::from_parts(Some("Open"), Some("https://example.com"))
            .unwrap()
            .unwrap()
    }

    #[tokio::test]
    async fn test_missing_paths_are_skipped() {
        let dir = tempdir().unwrap();
        let paths = vec![
            touch(&dir, "a.jpg"),
            Path::new("/nonexistent/b.jpg").to_path_buf(),
            touch(&dir, "c.mp4"),
        ];
        let messenger = RecordingMessenger::new();

        let report = dispatch(&messenger, &request(paths)).await;

        assert_eq!(report.missing, 1);
        assert_eq!(report.sent, 1);
        assert_eq!(
            messenger.requests(),
            vec![Call::Group {
                file_names: vec!["a.jpg".to_string(), "c.mp4".to_string()],
                caption: None,
            }]
        );
    }

    #[tokio::test]
    async fn test_groups_of_ten_caption_on_first_only() {
        let dir = tempdir().unwrap();
        let messenger = RecordingMessenger::new();
        let mut req = request(photos(&dir, 23));
        req.caption = Some("nightly build".to_string());

        let report = dispatch(&messenger, &req).await;

        let requests = messenger.requests();
        assert_eq!(requests.len(), 3);
        assert_eq!(report.sent, 3);

        let mut sizes = Vec::new();
        for (i, call) in requests.iter().enumerate() {
            match call {
                Call::Group {
                    file_names,
                    caption,
                } => {
                    assert!(file_names.len() <= MAX_GROUP_SIZE);
                    sizes.push(file_names.len());
                    if i == 0 {
                        assert_eq!(caption.as_deref(), Some("nightly build"));
                    } else {
                        assert!(caption.is_none());
                    }
                }
                other => panic!("unexpected request {:?}", other),
            }
        }
        assert_eq!(sizes, vec![10, 10, 3]);
    }

    #[tokio::test]
    async fn test_trailing_single_item_uses_single_endpoint() {
        let dir = tempdir().unwrap();
        let messenger = RecordingMessenger::new();

        dispatch(&messenger, &request(photos(&dir, 11))).await;

        let requests = messenger.requests();
        assert_eq!(requests.len(), 2);
        assert!(matches!(&requests[0], Call::Group { file_names, .. } if file_names.len() == 10));
        assert!(matches!(
            &requests[1],
            Call::Media {
                kind: MediaKind::Photo,
                caption: None,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_as_file_sends_only_first_file() {
        let dir = tempdir().unwrap();
        let paths = vec![
            Path::new("/nonexistent/gone.png").to_path_buf(),
            touch(&dir, "a.jpg"),
            touch(&dir, "b.mp4"),
            touch(&dir, "c.txt"),
        ];
        let messenger = RecordingMessenger::new();
        let mut req = request(paths);
        req.as_file = true;
        req.caption = Some("logs".to_string());
        req.markup = Some(markup());

        let report = dispatch(&messenger, &req).await;

        assert_eq!(
            messenger.requests(),
            vec![Call::Document {
                file_name: "a.jpg".to_string(),
                caption: Some("logs".to_string()),
                markup: true,
            }]
        );
        assert_eq!(report.missing, 1);
        assert_eq!(report.skipped, 2);
    }

    #[tokio::test]
    async fn test_missing_paths_after_document_are_not_skipped() {
        let dir = tempdir().unwrap();
        let paths = vec![
            touch(&dir, "report.pdf"),
            PathBuf::from("/nonexistent/late.jpg"),
            touch(&dir, "b.jpg"),
        ];
        let messenger = RecordingMessenger::new();

        let report = dispatch(&messenger, &request(paths)).await;

        assert_eq!(report.sent, 1);
        assert_eq!(report.missing, 1);
        assert_eq!(report.skipped, 1);
    }

    #[tokio::test]
    async fn test_document_flushes_pending_media_first() {
        let dir = tempdir().unwrap();
        let paths = vec![
            touch(&dir, "a.jpg"),
            touch(&dir, "b.jpg"),
            touch(&dir, "notes.pdf"),
            touch(&dir, "c.jpg"),
        ];
        let messenger = RecordingMessenger::new();
        let mut req = request(paths);
        req.caption = Some("caption".to_string());

        let report = dispatch(&messenger, &req).await;

        assert_eq!(
            messenger.requests(),
            vec![
                Call::Group {
                    file_names: vec!["a.jpg".to_string(), "b.jpg".to_string()],
                    caption: Some("caption".to_string()),
                },
                Call::Document {
                    file_name: "notes.pdf".to_string(),
                    caption: None,
                    markup: false,
                },
            ]
        );
        assert_eq!(report.skipped, 1);
    }

    #[tokio::test]
    async fn test_no_group_sends_individually() {
        let dir = tempdir().unwrap();
        let messenger = RecordingMessenger::new();
        let mut req = request(vec![touch(&dir, "a.jpg"), touch(&dir, "b.mp4")]);
        req.no_group = true;
        req.caption = Some("first".to_string());
        req.spoiler = true;
        req.markup = Some(markup());

        dispatch(&messenger, &req).await;

        assert_eq!(
            messenger.calls(),
            vec![
                Call::Action(ChatAction::UploadPhoto),
                Call::Media {
                    file_name: "a.jpg".to_string(),
                    kind: MediaKind::Photo,
                    caption: Some("first".to_string()),
                    markup: true,
                    spoiler: true,
                },
                Call::Action(ChatAction::UploadVideo),
                Call::Media {
                    file_name: "b.mp4".to_string(),
                    kind: MediaKind::Video,
                    caption: None,
                    markup: true,
                    spoiler: true,
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_audio_is_not_mixed_with_photos() {
        let dir = tempdir().unwrap();
        let paths = vec![
            touch(&dir, "a.jpg"),
            touch(&dir, "b.jpg"),
            touch(&dir, "c.mp3"),
            touch(&dir, "d.mp3"),
        ];
        let messenger = RecordingMessenger::new();

        dispatch(&messenger, &request(paths)).await;

        assert_eq!(
            messenger.requests(),
            vec![
                Call::Group {
                    file_names: vec!["a.jpg".to_string(), "b.jpg".to_string()],
                    caption: None,
                },
                Call::Group {
                    file_names: vec!["c.mp3".to_string(), "d.mp3".to_string()],
                    caption: None,
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_failed_batch_does_not_stop_later_batches() {
        let dir = tempdir().unwrap();
        let messenger = RecordingMessenger::failing_on(&[1]);

        let report = dispatch(&messenger, &request(photos(&dir, 25))).await;

        assert_eq!(messenger.requests().len(), 3);
        assert_eq!(report.sent, 2);
        assert_eq!(report.failed, 1);
    }

    #[tokio::test]
    async fn test_progress_indicator_precedes_each_request() {
        let dir = tempdir().unwrap();
        let messenger = RecordingMessenger::new();

        dispatch(&messenger, &request(photos(&dir, 12))).await;

        let calls = messenger.calls();
        assert_eq!(calls.len(), 4);
        assert_eq!(calls[0], Call::Action(ChatAction::UploadPhoto));
        assert!(calls[1].is_request());
        assert_eq!(calls[2], Call::Action(ChatAction::UploadPhoto));
        assert!(calls[3].is_request());
    }

    #[tokio::test]
    async fn test_all_missing_sends_nothing() {
        let messenger = RecordingMessenger::new();
        let req = request(vec![
            PathBuf::from("/nonexistent/a.jpg"),
            PathBuf::from("/nonexistent/b.jpg"),
        ]);

        let report = dispatch(&messenger, &req).await;

        assert!(messenger.calls().is_empty());
        assert_eq!(messenger.lookups(), 0);
        assert_eq!(
            report,
            DispatchReport {
                missing: 2,
                ..DispatchReport::default()
            }
        );
    }

    #[tokio::test]
    async fn test_chat_name_looked_up_once() {
        let dir = tempdir().unwrap();
        let messenger = RecordingMessenger::named("Ops Alerts");
        let mut req = request(photos(&dir, 12));
        req.no_group = true;

        let report = dispatch(&messenger, &req).await;

        assert_eq!(report.sent, 12);
        assert_eq!(messenger.lookups(), 1);
        assert_eq!(report.chat.as_deref(), Some("Ops Alerts"));
    }
}
