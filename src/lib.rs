//! sendtg library.
//!
//! Sends text messages and media files to a single Telegram chat. The binary
//! in `main.rs` wires these modules to the command line.

pub mod check;
pub mod cli;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod media;
pub mod messenger;
pub mod redact;
pub mod sender;
pub mod setup;

// Re-export commonly used types
pub use config::Config;
pub use dispatcher::{dispatch, DispatchReport, DispatchRequest};
pub use messenger::{MediaItem, MediaKind, Messenger, ReplyMarkup};
