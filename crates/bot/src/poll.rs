use std::time::Duration;

use futures::{stream, StreamExt};
use storefront::{Storefront, Transport};
use telegram::{BotApi, Incoming, Update};
use tracing::{debug, error, info, warn};

const RETRY_DELAY: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy)]
pub(crate) struct PollOptions {
    pub timeout_seconds: u64,
    pub max_concurrent_updates: usize,
}

/// Long-polls until the future is dropped. Each update is handled on its own;
/// a failure in one never holds back the offset or the rest of the batch.
pub(crate) async fn run<T: Transport>(
    api: &BotApi,
    storefront: &Storefront<T>,
    options: PollOptions,
) {
    let mut offset = None;
    info!(
        timeout_seconds = options.timeout_seconds,
        max_concurrent_updates = options.max_concurrent_updates,
        "polling for updates"
    );

    loop {
        let updates = match api.get_updates(offset, options.timeout_seconds).await {
            Ok(updates) => updates,
            Err(error) => {
                warn!(%error, retry_in = ?RETRY_DELAY, "failed to fetch updates");
                tokio::time::sleep(RETRY_DELAY).await;
                continue;
            }
        };

        offset = next_offset(offset, &updates);
        stream::iter(updates)
            .for_each_concurrent(options.max_concurrent_updates, |update| {
                dispatch(storefront, update)
            })
            .await;
    }
}

pub(crate) fn next_offset(current: Option<i64>, updates: &[Update]) -> Option<i64> {
    updates
        .iter()
        .map(|update| update.update_id + 1)
        .max()
        .max(current)
}

pub(crate) async fn dispatch<T: Transport>(storefront: &Storefront<T>, update: Update) {
    let Some(incoming) = update.incoming() else {
        debug!(update_id = update.update_id, "ignoring update");
        return;
    };

    let result = match &incoming {
        Incoming::Start { chat_id, user } => storefront.start(*chat_id, user).await,
        Incoming::Interaction(interaction) => storefront.handle_interaction(interaction).await,
    };

    match result {
        Ok(delivery) => debug!(update_id = update.update_id, ?delivery, "update handled"),
        Err(error) => error!(update_id = update.update_id, %error, "failed to deliver screen"),
    }
}

#[cfg(test)]
#[path = "tests/poll_tests.rs"]
mod tests;
