//! `--setup` and `--show-config`.

use crate::config::{non_blank, ChatIdValue, ConfigOverrides, FileConfig, DEFAULT_API_URL};
use crate::error::ConfigError;
use crate::redact::mask_token;
use std::io::{self, BufRead, Write};
use std::path::Path;
use tracing::info;

/// Write the config file, taking values from flags and prompting on stdin
/// for any required value that is still missing.
pub fn run(overrides: &ConfigOverrides) -> Result<(), ConfigError> {
    let path = overrides.config_path();
    let existing = FileConfig::load_or_default(&path)?;

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();
    let config = collect(existing, overrides, &mut input, &mut output)?;

    config.write(&path)?;
    info!("Configuration saved to {}", path.display());
    Ok(())
}

/// Merge flags into the existing file config and prompt for the rest.
fn collect<R: BufRead, W: Write>(
    mut config: FileConfig,
    overrides: &ConfigOverrides,
    input: &mut R,
    output: &mut W,
) -> Result<FileConfig, ConfigError> {
    let api_url = ensure_value(
        config.api_url.take(),
        overrides.api_url.clone(),
        "API URL",
        Some(DEFAULT_API_URL),
        false,
        input,
        output,
    )?;
    let bot_token = ensure_value(
        config.bot_token.take(),
        overrides.bot_token.clone(),
        "Bot token",
        None,
        true,
        input,
        output,
    )?;
    let chat_id = ensure_value(
        config.chat_id.take().map(|c| c.as_string()),
        overrides.chat_id.clone(),
        "Chat ID",
        None,
        false,
        input,
        output,
    )?;

    Ok(FileConfig {
        api_url: Some(api_url),
        bot_token: Some(bot_token),
        chat_id: Some(ChatIdValue::String(chat_id)),
        timeout_seconds: overrides.timeout_seconds.or(config.timeout_seconds),
    })
}

/// A flag value wins; otherwise prompt, keeping the current value (or the
/// default) on blank input. A `secret` value is never echoed in the prompt.
fn ensure_value<R: BufRead, W: Write>(
    current: Option<String>,
    provided: Option<String>,
    label: &str,
    default: Option<&str>,
    secret: bool,
    input: &mut R,
    output: &mut W,
) -> Result<String, ConfigError> {
    if let Some(value) = non_blank(provided) {
        return Ok(value);
    }
    let fallback = non_blank(current).or_else(|| default.map(str::to_string));

    loop {
        match &fallback {
            Some(_) if secret => write!(output, "{} (leave blank to keep current): ", label)?,
            Some(value) => write!(output, "{} [{}]: ", label, value)?,
            None => write!(output, "{}: ", label)?,
        }
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            // stdin closed
            return fallback.ok_or_else(|| ConfigError::MissingField(label.to_string()));
        }
        if let Some(value) = non_blank(Some(line)) {
            return Ok(value);
        }
        if let Some(value) = &fallback {
            return Ok(value.clone());
        }
        writeln!(output, "{} is required.", label)?;
    }
}

/// Print the config file location and its contents with the token masked.
pub fn show(path: &Path) -> Result<(), ConfigError> {
    let mut output = io::stdout();
    render(path, &mut output)
}

fn render<W: Write>(path: &Path, output: &mut W) -> Result<(), ConfigError> {
    writeln!(output, "Configuration file: {}", path.display())?;

    match FileConfig::from_json(path) {
        Ok(config) => {
            let complete = config.has_required_fields();
            let not_set = || "<not set>".to_string();
            writeln!(
                output,
                "API URL   : {}",
                config.api_url.unwrap_or_else(not_set)
            )?;
            writeln!(
                output,
                "Bot Token : {}",
                config
                    .bot_token
                    .as_deref()
                    .map(mask_token)
                    .unwrap_or_else(not_set)
            )?;
            writeln!(
                output,
                "Chat ID   : {}",
                config
                    .chat_id
                    .as_ref()
                    .map(ChatIdValue::as_string)
                    .unwrap_or_else(not_set)
            )?;
            if let Some(timeout) = config.timeout_seconds {
                writeln!(output, "Timeout   : {}s", timeout)?;
            }
            if !complete {
                writeln!(
                    output,
                    "Bot token or chat ID is missing. Run `sendtg --setup` to fill them in."
                )?;
            }
        }
        Err(ConfigError::FileNotFound(_)) => {
            writeln!(
                output,
                "No configuration found. Run `sendtg --setup` to create one."
            )?;
        }
        Err(e) => return Err(e),
    }

    Ok(())
}
