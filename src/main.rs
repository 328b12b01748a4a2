//! sendtg - CLI entry point.
//!
//! One invocation performs one action: a media dispatch, a text message,
//! a connectivity check, or a config operation.

use anyhow::{bail, Context, Result};
use clap::Parser;
use sendtg::cli::Cli;
use sendtg::config::{display_chat_id, Config};
use sendtg::messenger::telegram::TelegramMessenger;
use sendtg::messenger::UNKNOWN_CHAT;
use sendtg::redact::mask_token;
use sendtg::{check, dispatcher, sender, setup, DispatchRequest, ReplyMarkup};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();
    let overrides = cli.overrides();

    if cli.setup {
        setup::run(&overrides).context("Failed to write configuration")?;
        return Ok(());
    }

    if cli.show_config {
        setup::show(&overrides.config_path()).context("Failed to read configuration")?;
        return Ok(());
    }

    if cli.has_nothing_to_do() {
        bail!("No message or media provided, use -h/--help for help.");
    }

    let config = Config::load(&overrides).context("Failed to resolve configuration")?;
    if overrides.uses_stored_credentials() {
        info!(
            "Using bot token and chat ID from configuration: {}, {}",
            mask_token(&config.bot_token),
            display_chat_id(&config.chat_id)
        );
    }

    let messenger = TelegramMessenger::new(&config)?;

    if cli.check {
        check::run(&messenger, config.api_url.as_str())
            .await
            .context("API check failed")?;
        return Ok(());
    }

    let markup = match ReplyMarkup::from_parts(cli.button_text.as_deref(), cli.button_url.as_deref())
    {
        Ok(markup) => markup,
        Err(e) => {
            error!("{}; sending without a button", e);
            None
        }
    };

    if !cli.media.is_empty() {
        let request = DispatchRequest {
            paths: cli.media,
            as_file: cli.as_file,
            no_group: cli.no_group,
            spoiler: cli.spoiler,
            caption: cli.caption,
            markup,
        };
        let report = dispatcher::dispatch(&messenger, &request).await;
        info!(
            sent = report.sent,
            failed = report.failed,
            missing = report.missing,
            skipped = report.skipped,
            chat = report.chat.as_deref().unwrap_or(UNKNOWN_CHAT),
            "Dispatch finished"
        );
        if report.sent == 0 {
            warn!("No media was delivered");
        }
    } else if let Some(message) = &cli.message {
        // Failure is already logged and does not change the exit status
        let _ = sender::send_message(&messenger, message, markup.as_ref(), cli.silent).await;
    }

    Ok(())
}
