//! Postgres change listener for the inbox feed.
//!
//! Listens on the `product_requests_changed` notify channel and applies each
//! parsed event to the in-memory feed. The listener reconnects with a fixed
//! backoff; after every (re)connect the feed is primed with a full fetch so
//! events missed while disconnected are not lost.

use std::time::Duration;

use sqlx::PgPool;
use sqlx::postgres::PgListener;
use tracing::{info, warn};

use crate::db::ProductRequestRepository;

use super::{ChangeEvent, InboxFeed};

/// The notify channel populated by the site migration's trigger.
const CHANNEL: &str = "product_requests_changed";

/// Delay before reconnecting after the listener drops.
const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Spawn the background task that keeps `feed` in sync with the database.
pub fn spawn_change_listener(pool: PgPool, feed: InboxFeed) {
    tokio::spawn(async move {
        loop {
            match run_listener(&pool, &feed).await {
                Ok(()) => warn!("change listener stream ended, reconnecting"),
                Err(e) => warn!(error = %e, "change listener failed, reconnecting"),
            }
            tokio::time::sleep(RECONNECT_DELAY).await;
        }
    });
}

/// Connect, prime the feed, and apply events until the stream fails.
async fn run_listener(pool: &PgPool, feed: &InboxFeed) -> Result<(), sqlx::Error> {
    let mut listener = PgListener::connect_with(pool).await?;
    listener.listen(CHANNEL).await?;
    info!(channel = CHANNEL, "change listener connected");

    // Prime after LISTEN is active so no event can fall between fetch and
    // subscription.
    match ProductRequestRepository::new(pool).list_all().await {
        Ok(rows) => feed.replace(rows),
        Err(e) => warn!(error = %e, "failed to prime inbox feed"),
    }

    loop {
        let notification = listener.recv().await?;
        match notification.payload().parse::<ChangeEvent>() {
            Ok(event) => {
                feed.apply(event);
            }
            Err(e) => {
                // Reject malformed rows at the boundary instead of guessing
                warn!(error = %e, payload = notification.payload(), "ignoring malformed change payload");
            }
        }
    }
}
