//! Keeps the bot token out of anything that gets logged or printed.

const PLACEHOLDER: &str = "REDACTED";

/// Replace every occurrence of `token` in `text` with `REDACTED`.
pub fn redact(text: &str, token: &str) -> String {
    if token.is_empty() {
        return text.to_string();
    }
    text.replace(token, PLACEHOLDER)
}

/// Short form of a token for display: the first 10 characters and a mask.
pub fn mask_token(token: &str) -> String {
    match token.char_indices().nth(10) {
        Some((idx, _)) => format!("{}{}", &token[..idx], "*".repeat(30)),
        None => PLACEHOLDER.to_string(),
    }
}
