//! # Runtime events emitted by the registry, scheduler and item tickers.
//!
//! The [`EventKind`] enum classifies event types across four categories:
//! - **Subscription events**: interest changes reported by the registry
//! - **Ticker events**: per-item update flow (published, failed, scheduled, stopped)
//! - **Subscriber events**: fan-out overflow and panics
//! - **Shutdown events**: graceful shutdown progress
//!
//! The [`Event`] struct carries additional metadata such as timestamps, item name,
//! reasons, tick numbers and delays.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use feedvisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::PublishFailed)
//!     .with_item("greetings")
//!     .with_reason("sink closed")
//!     .with_tick(3)
//!     .with_delay(Duration::from_millis(1500));
//!
//! assert_eq!(ev.kind, EventKind::PublishFailed);
//! assert_eq!(ev.item.as_deref(), Some("greetings"));
//! assert_eq!(ev.delay_ms, Some(1500));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Subscription events ===
    /// A subscriber was added to an item.
    ///
    /// Sets:
    /// - `item`: item name
    /// - `subscribers`: subscriber count after the change
    ItemSubscribed,

    /// A subscriber was removed from an item.
    ///
    /// Sets:
    /// - `item`: item name
    /// - `subscribers`: subscriber count after the change
    ItemUnsubscribed,

    /// Subscription request was refused (unknown item, inactive item).
    ///
    /// Sets:
    /// - `item`: item name
    /// - `reason`: error label
    SubscriptionRejected,

    // === Ticker events ===
    /// Item transitioned to active; its ticker was spawned.
    ///
    /// Sets:
    /// - `item`: item name
    ItemActivated,

    /// Item transitioned to inactive; its ticker was cancelled.
    ///
    /// Sets:
    /// - `item`: item name
    ItemDeactivated,

    /// An update was handed to the publish sink.
    ///
    /// Sets:
    /// - `item`: item name
    /// - `tick`: tick number (1-based, per activation)
    UpdatePublished,

    /// The publish sink refused or failed an update (ticker keeps running).
    ///
    /// Sets:
    /// - `item`: item name
    /// - `tick`: tick number
    /// - `reason`: sink error message
    PublishFailed,

    /// Next tick scheduled.
    ///
    /// Sets:
    /// - `item`: item name
    /// - `tick`: tick that just ran
    /// - `delay_ms`: delay before the next tick (ms)
    TickScheduled,

    /// Ticker task finished and was joined.
    ///
    /// Sets:
    /// - `item`: item name
    TickerStopped,

    /// Ticker task panicked (generator or sink panic).
    ///
    /// Sets:
    /// - `item`: item name
    /// - `reason`: panic code
    TickerPanicked,

    /// Registry and scheduler invariant broken (double activation).
    ///
    /// Sets:
    /// - `item`: item name
    InvariantViolated,

    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `item`: subscriber name
    /// - `reason`: panic info/message
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `item`: subscriber name
    /// - `reason`: reason string (e.g., "full", "closed")
    SubscriberOverflow,

    // === Shutdown events ===
    /// Shutdown requested (OS signal, source closed or explicit call).
    ShutdownRequested,

    /// All tickers stopped within configured grace period.
    AllStoppedWithin,

    /// Grace period exceeded; some tickers did not stop in time.
    GraceExceeded,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Name of the item (or subscriber), if applicable.
    pub item: Option<Arc<str>>,
    /// Human-readable reason (errors, overflow details, etc.).
    pub reason: Option<Arc<str>>,
    /// Tick number within the current activation (starting from 1).
    pub tick: Option<u64>,
    /// Delay before the next tick in milliseconds (compact).
    pub delay_ms: Option<u32>,
    /// Subscriber count after a subscription change.
    pub subscribers: Option<usize>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            item: None,
            reason: None,
            tick: None,
            delay_ms: None,
            subscribers: None,
        }
    }

    /// Attaches an item name.
    #[inline]
    pub fn with_item(mut self, item: impl Into<Arc<str>>) -> Self {
        self.item = Some(item.into());
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a tick number.
    #[inline]
    pub fn with_tick(mut self, tick: u64) -> Self {
        self.tick = Some(tick);
        self
    }

    /// Attaches a delay (stored as milliseconds).
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.delay_ms = Some(ms);
        self
    }

    /// Attaches a subscriber count.
    #[inline]
    pub fn with_subscribers(mut self, n: usize) -> Self {
        self.subscribers = Some(n);
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_item(subscriber)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_item(subscriber)
            .with_reason(info)
    }

    /// True for `SubscriberOverflow`; such events are never re-reported when they overflow.
    #[inline]
    pub fn is_subscriber_overflow(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberOverflow)
    }

    /// True for the last event of a shutdown (`AllStoppedWithin` or `GraceExceeded`).
    #[inline]
    pub fn is_shutdown_outcome(&self) -> bool {
        matches!(
            self.kind,
            EventKind::AllStoppedWithin | EventKind::GraceExceeded
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seq_is_monotonic() {
        let a = Event::new(EventKind::ItemActivated);
        let b = Event::new(EventKind::ItemDeactivated);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn test_delay_saturates_at_u32() {
        let ev = Event::new(EventKind::TickScheduled).with_delay(Duration::from_secs(u64::MAX));
        assert_eq!(ev.delay_ms, Some(u32::MAX));
    }

    #[test]
    fn test_events_are_classified() {
        assert!(Event::new(EventKind::AllStoppedWithin).is_shutdown_outcome());
        assert!(Event::new(EventKind::GraceExceeded).is_shutdown_outcome());
        assert!(!Event::new(EventKind::ShutdownRequested).is_shutdown_outcome());
        assert!(Event::subscriber_overflow("log", "full").is_subscriber_overflow());
    }
}
