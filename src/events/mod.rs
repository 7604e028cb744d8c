//! Runtime events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to runtime events emitted by the feed, registry,
//! scheduler, item tickers and subscriber workers.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `Feed`, `Registry`, `Scheduler`, item tickers,
//!   `SubscriberSet` workers (overflow/panic).
//! - **Consumers**: `Feed::subscriber_listener()` (fans out to `SubscriberSet`)
//!   and any receiver obtained from [`Feed::bus`](crate::Feed::bus).

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
