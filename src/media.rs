//! Classification of files into upload kinds.

use crate::error::SendError;
use crate::messenger::{MediaItem, MediaKind};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Largest photo the API accepts through the compressed photo endpoint.
pub const PHOTO_MAX_BYTES: u64 = 10 * 1024 * 1024;

/// Guess the MIME type from the file extension.
pub fn detect_mime_type(path: &Path) -> Option<&'static str> {
    mime_guess::from_path(path).first_raw()
}

/// Decide how a file is uploaded.
///
/// `as_file` forces every file to be a document. Photos too large for the
/// photo endpoint also fall back to documents.
pub fn classify(path: &Path, as_file: bool) -> MediaKind {
    if as_file {
        return MediaKind::Document;
    }

    let kind = MediaKind::from_mime(detect_mime_type(path));
    if kind != MediaKind::Photo {
        return kind;
    }

    match fs::metadata(path) {
        Ok(meta) if meta.len() > PHOTO_MAX_BYTES => {
            info!(
                path = %path.display(),
                bytes = meta.len(),
                "Photo exceeds 10 MB; sending as document"
            );
            MediaKind::Document
        }
        Ok(_) => MediaKind::Photo,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to read photo metadata; sending as document");
            MediaKind::Document
        }
    }
}

/// Resolve a path into a [`MediaItem`], failing if it is not a regular file.
pub fn resolve_item(path: &Path, as_file: bool, spoiler: bool) -> Result<MediaItem, SendError> {
    if !path.is_file() {
        return Err(SendError::FileNotFound(path.to_path_buf()));
    }
    let kind = classify(path, as_file);
    Ok(MediaItem::new(path.to_path_buf(), kind, spoiler))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::tempdir;

    #[test]
    fn test_classify_by_extension() {
        let dir = tempdir().unwrap();
        let cases = [
            ("cat.jpg", MediaKind::Photo),
            ("clip.mp4", MediaKind::Video),
            ("song.mp3", MediaKind::Audio),
            ("report.pdf", MediaKind::Document),
            ("noext", MediaKind::Document),
        ];
        for (name, expected) in cases {
            let path = dir.path().join(name);
            fs::write(&path, b"data").unwrap();
            assert_eq!(classify(&path, false), expected, "{}", name);
        }
    }

    #[test]
    fn test_as_file_forces_document() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cat.png");
        fs::write(&path, b"data").unwrap();
        assert_eq!(classify(&path, true), MediaKind::Document);
    }

    #[test]
    fn test_large_photo_becomes_document() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("huge.jpg");
        let file = File::create(&path).unwrap();
        file.set_len(PHOTO_MAX_BYTES + 1).unwrap();
        assert_eq!(classify(&path, false), MediaKind::Document);
    }

    #[test]
    fn test_resolve_item_missing_file() {
        let result = resolve_item(Path::new("/nonexistent/cat.jpg"), false, false);
        assert!(matches!(result, Err(SendError::FileNotFound(_))));
    }

    #[test]
    fn test_resolve_item_rejects_directory() {
        let dir = tempdir().unwrap();
        let result = resolve_item(dir.path(), false, false);
        assert!(matches!(result, Err(SendError::FileNotFound(_))));
    }

    #[test]
    fn test_resolve_item_spoiler() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("clip.mov");
        fs::write(&path, b"data").unwrap();

        let item = resolve_item(&path, false, true).unwrap();
        assert_eq!(item.kind, MediaKind::Video);
        assert!(item.spoiler);
        assert_eq!(item.file_name, "clip.mov");
    }
}
