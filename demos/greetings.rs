//! # Example: greetings
//!
//! Serves the `greetings` item the way an adapter would behind a real
//! distribution server.
//!
//! Shows how to:
//! - Register an item with its generator factory.
//! - Hand updates to a transport task through [`ChannelSink`].
//! - Drive subscriptions through a [`SourceHandle`] and [`Feed::serve`].
//! - Render runtime events with [`LogWriter`] and `tracing-subscriber`.
//!
//! ## Flow
//! ```text
//! upstream task ──► SourceHandle::subscribe("greetings")
//!                       └─► Feed::serve ──► Registry ──► Scheduler ──► Ticker
//!                                                                     │
//!                         transport task ◄── [ChannelSink queue] ◄────┘
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=debug cargo run --example greetings
//! ```
//! Stop with Ctrl-C.

use std::{sync::Arc, time::Duration};

use feedvisor::{
    ChannelSink, Feed, FeedConfig, Greetings, LogWriter, MESSAGE_FIELD, SourceHandle, Subscribe,
    TIMESTAMP_FIELD,
};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const ITEM: &str = "greetings";

/// Pretends to be the distribution server: interest comes and goes.
async fn upstream(source: SourceHandle) {
    match source.subscribe(ITEM).await {
        Ok(outcome) => info!(target: "upstream", ?outcome, "subscribe"),
        Err(e) => warn!(target: "upstream", error = e.as_label(), "{}", e.as_message()),
    }
    tokio::time::sleep(Duration::from_secs(8)).await;

    match source.unsubscribe(ITEM).await {
        Ok(outcome) => info!(target: "upstream", ?outcome, "unsubscribe"),
        Err(e) => warn!(target: "upstream", error = e.as_label(), "{}", e.as_message()),
    }
    tokio::time::sleep(Duration::from_secs(3)).await;

    if let Err(e) = source.subscribe(ITEM).await {
        warn!(target: "upstream", error = e.as_label(), "{}", e.as_message());
    }

    // Keep the source open until the process is stopped.
    std::future::pending::<()>().await;
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .init();

    let (sink, mut updates) = ChannelSink::new(256);
    tokio::spawn(async move {
        while let Some(update) = updates.recv().await {
            info!(
                target: "transport",
                item = %update.item,
                message = update.field(MESSAGE_FIELD).unwrap_or("-"),
                timestamp = update.field(TIMESTAMP_FIELD).unwrap_or("-"),
                snapshot = update.is_snapshot,
                "update"
            );
        }
    });

    let cfg = FeedConfig {
        grace: Duration::from_secs(5),
        ..FeedConfig::default()
    };
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];

    let feed = Feed::builder(cfg, Arc::new(sink))
        .with_subscribers(subs)
        .with_item(ITEM, |_| Greetings::new())
        .build();

    let (source, rx) = feed.source();
    tokio::spawn(upstream(source));

    if let Err(e) = feed.serve(rx).await {
        error!(target: "feed", error = e.as_label(), "{}", e.as_message());
        return Err(e.into());
    }
    Ok(())
}
