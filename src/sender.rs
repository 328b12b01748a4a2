//! Plain text messages.

use crate::error::SendError;
use crate::messenger::{ChatAction, Messenger, ReplyMarkup};
use tracing::{error, info};

/// Turn literal `\n` sequences (as typed in a shell) into real newlines.
pub fn normalize_newlines(text: &str) -> String {
    text.replace("\\n", "\n")
}

/// Send one text message. A failure is logged and returned; callers decide
/// whether it matters.
pub async fn send_message<M>(
    messenger: &M,
    text: &str,
    markup: Option<&ReplyMarkup>,
    silent: bool,
) -> Result<(), SendError>
where
    M: Messenger + ?Sized,
{
    messenger.send_chat_action(ChatAction::Typing);
    let chat = messenger.chat_name().await;

    let text = normalize_newlines(text);
    match messenger.send_text(&text, markup, silent).await {
        Ok(()) => {
            info!(
                "Message sent to {} via {}: {}",
                chat,
                messenger.platform_name(),
                text
            );
            Ok(())
        }
        Err(e) => {
            error!("{}", e);
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messenger::testing::{Call, RecordingMessenger};

    #[test]
    fn test_normalize_newlines() {
        assert_eq!(normalize_newlines("line1\\nline2"), "line1\nline2");
        assert_eq!(normalize_newlines("no escapes"), "no escapes");
        assert_eq!(normalize_newlines("real\nnewline"), "real\nnewline");
    }

    #[tokio::test]
    async fn test_send_message_typing_first() {
        let messenger = RecordingMessenger::new();
        let markup = ReplyMarkup::from_parts(Some("CI"), Some("https://ci.example.com"))
            .unwrap();

        send_message(&messenger, "build\\npassed", markup.as_ref(), true)
            .await
            .unwrap();

        assert_eq!(
            messenger.calls(),
            vec![
                Call::Action(ChatAction::Typing),
                Call::Text {
                    text: "build\npassed".to_string(),
                    markup: true,
                    silent: true,
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_send_message_looks_up_chat_once() {
        let messenger = RecordingMessenger::named("Release Notes");

        send_message(&messenger, "v1.2.0 is out", None, false)
            .await
            .unwrap();

        assert_eq!(messenger.lookups(), 1);
        assert_eq!(messenger.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_send_message_failure_is_returned() {
        let messenger = RecordingMessenger::failing_on(&[0]);

        let result = send_message(&messenger, "hello", None, false).await;

        assert!(matches!(result, Err(SendError::Transport { .. })));
    }
}
