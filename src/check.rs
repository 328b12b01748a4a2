//! Connectivity and credential check.

use crate::error::SendError;
use crate::messenger::Messenger;
use tracing::info;

/// Send a chat action, wait for the reply and log how long it took.
pub async fn run<M>(messenger: &M, api_url: &str) -> Result<u128, SendError>
where
    M: Messenger + ?Sized,
{
    let elapsed = messenger.probe().await?.as_millis();
    info!("{} API response time: {} ms", api_url, elapsed);
    Ok(elapsed)
}
