//! # feedvisor
//!
//! **Feedvisor** is the core of a streaming data adapter: it tracks which items
//! an upstream distribution server is interested in and, for every item with
//! interest, periodically produces field updates and hands them to a publish sink.
//!
//! An item is *active* while at least one subscriber wants it. Each active item
//! runs its own ticker: the first update goes out immediately, the next ones
//! after a jittered delay (1–3 s by default). When the last subscriber leaves,
//! the ticker is cancelled and no further update is published for that item.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐
//!     │ SourceHandle │   │ direct calls │
//!     │  (requests)  │   │ Feed::sub... │
//!     └──────┬───────┘   └──────┬───────┘
//!            ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Feed (runtime orchestrator)                                      │
//! │  - Registry  (subscriber counts per item)                         │
//! │  - Catalog   (item name → generator factory)                      │
//! │  - Scheduler (one ticker per active item)                         │
//! │  - SubscriberSet (fans out events to user subscribers)            │
//! └──────┬──────────────────┬──────────────────┬───────────────┬──────┘
//!        ▼                  ▼                  ▼               │
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐   │
//!     │   Ticker     │   │   Ticker     │   │   Ticker     │   │
//!     │ "greetings"  │   │  "item B"    │   │  "item C"    │   │
//!     └┬──────┬──────┘   └┬──────┬──────┘   └┬──────┬──────┘   │
//!      │      │           │      │           │      │          │
//!      │      └───────────┴──────┴───────────┴──────┼──► Publish sink
//!      │ Events:          │                  │      (item, fields, is_snapshot)
//!      │ - UpdatePublished│ - PublishFailed  │ - TickScheduled │
//!      ▼                  ▼                  ▼                 ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                        Bus (broadcast channel)                    │
//! │                 (capacity: FeedConfig::bus_capacity)              │
//! └─────────────────────────────────┬─────────────────────────────────┘
//!                                   ▼
//!                       ┌────────────────────────┐
//!                       │  subscriber_listener   │
//!                       │       (in Feed)        │
//!                       └───────────┬────────────┘
//!                                   ▼
//!                             SubscriberSet
//!                            (per-sub queues)
//!                         ┌─────────┼─────────┐
//!                         ▼         ▼         ▼
//!                       worker1  worker2  workerN
//! ```
//!
//! ### Lifecycle
//! ```text
//! subscribe(item)
//!   ├─► count > 0   → count += 1, no new ticker
//!   └─► count == 0  → factory = catalog.factory_for(item)
//!                     scheduler.activate(item, factory) ──► Ticker::run()
//!
//! Ticker::run() loop {
//!   ├─► generator = factory(item)   (again after a caught panic)
//!   ├─► fields = generator.next_fields()
//!   ├─► gate open?  → sink.publish(item, fields, false)
//!   ├─► publish UpdatePublished | PublishFailed
//!   ├─► delay = cadence.next()   (base + uniform jitter)
//!   └─► sleep(delay) (cancellable)
//! }
//!
//! unsubscribe(item)
//!   ├─► count > 1   → count -= 1
//!   └─► count == 1  → scheduler.deactivate(item): close gate, cancel ticker
//! ```
//!
//! ## Features
//! | Area              | Description                                                   | Key types / traits                         |
//! |-------------------|---------------------------------------------------------------|--------------------------------------------|
//! | **Runtime**       | Subscriptions, tickers and graceful shutdown.                 | [`Feed`], [`FeedBuilder`], [`SourceHandle`]|
//! | **Generators**    | Compute the fields of the next update per item.               | [`Generate`], [`GenerateFn`], [`Catalog`]  |
//! | **Sinks**         | Hand updates to the downstream transport.                     | [`Publish`], [`ChannelSink`]               |
//! | **Policies**      | Configure tick delays and jitter.                             | [`CadencePolicy`], [`JitterPolicy`]        |
//! | **Subscriber API**| Hook into runtime events (logging, metrics, custom).          | [`Subscribe`]                              |
//! | **Errors**        | Typed errors and outcomes.                                    | [`FeedError`], [`RuntimeError`]            |
//! | **Configuration** | Centralize runtime settings.                                  | [`FeedConfig`]                             |
//!
//! ## Optional features
//! - `logging`: exports a built-in [`LogWriter`] rendering events through `tracing`.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use feedvisor::{ChannelSink, Feed, FeedConfig, Greetings};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cfg = FeedConfig {
//!         grace: Duration::from_secs(5),
//!         handle_signals: false,
//!         ..FeedConfig::default()
//!     };
//!
//!     // Build subscribers (optional)
//!     #[cfg(feature = "logging")]
//!     let subs: Vec<Arc<dyn feedvisor::Subscribe>> = {
//!         use feedvisor::LogWriter;
//!         vec![Arc::new(LogWriter::default())]
//!     };
//!     #[cfg(not(feature = "logging"))]
//!     let subs: Vec<Arc<dyn feedvisor::Subscribe>> = Vec::new();
//!
//!     // Updates land in a bounded channel read by the transport.
//!     let (sink, mut updates) = ChannelSink::new(128);
//!
//!     let feed = Feed::builder(cfg, Arc::new(sink))
//!         .with_subscribers(subs)
//!         .with_item("greetings", |_| Greetings::new())
//!         .build();
//!
//!     feed.subscribe("greetings").await?;
//!     let update = updates.recv().await.expect("first update");
//!     assert_eq!(update.item.as_ref(), "greetings");
//!     assert_eq!(update.field("message"), Some("Hello"));
//!     assert!(!update.is_snapshot);
//!
//!     feed.unsubscribe("greetings").await;
//!     feed.shutdown().await?;
//!     Ok(())
//! }
//! ```

mod core;
mod error;
mod events;
mod generators;
mod policies;
mod sinks;
mod subscribers;
mod update;

// ---- Public re-exports ----

pub use core::{Feed, FeedBuilder, FeedConfig, Request, SourceHandle};
pub use error::{FeedError, PublishError, RuntimeError, SubscribeOutcome, UnsubscribeOutcome};
pub use events::{Bus, Event, EventKind};
pub use generators::{
    Catalog, Generate, GenerateFn, GeneratorBox, GeneratorFactory, Greetings, MESSAGE_FIELD,
    TIMESTAMP_FIELD,
};
pub use policies::{CadencePolicy, JitterPolicy};
pub use sinks::{ChannelSink, Publish};
pub use subscribers::{Subscribe, SubscriberSet};
pub use update::{Fields, Update};

#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
