//! # Feed: wires the registry, scheduler, event fan-out and graceful shutdown.
//!
//! The [`Feed`] owns the event bus, a [`SubscriberSet`], the subscription
//! [`Registry`] and the update [`Scheduler`]. It serves subscription requests
//! coming from a [`SourceHandle`] and handles OS termination signals.
//!
//! ## High-level architecture
//! ```text
//! FeedBuilder::build()
//!   - Bus::new(cfg.bus_capacity)
//!   - Scheduler::new(sink, cfg.cadence, bus, runtime_token)
//!   - Registry::new(catalog, scheduler, bus)
//!   - subscriber_listener(set): Bus.subscribe() ─► SubscriberSet::emit(Arc<Event>)
//!     (owns the set; skipped when there are no subscribers)
//!
//! Serving:
//!   SourceHandle ──► [request queue] ──► Feed::serve(rx)
//!                                            ├─► Request::Subscribe   ─► Registry::subscribe   ─► reply
//!                                            └─► Request::Unsubscribe ─► Registry::unsubscribe ─► reply
//!
//! Event flow:
//!   Registry / Scheduler / Ticker ── publish(Event) ──► Bus ──► listener ──► SubscriberSet::emit(Arc<Event>)
//!                                                                     ┌─────────┬─────────┐
//!                                                                     ▼         ▼         ▼
//!                                                               [queue S1] [queue S2] ... [queue SN]
//!
//! Shutdown path (signal, source closed, fatal error or explicit call):
//!   Feed::shutdown()                    (first caller only)
//!     └─► Bus.publish(ShutdownRequested)
//!     └─► runtime_token.cancel()        → no new activations
//!     └─► Registry::shutdown(cfg.grace) → every ticker stopped and joined
//!            ├─ all joined      → Bus.publish(AllStoppedWithin)
//!            └─ grace exceeded  → Bus.publish(GraceExceeded) + Err(GraceExceeded)
//!     └─► listener forwards that last event, then SubscriberSet::shutdown()
//!         drains every subscriber queue (bounded by cfg.grace)
//! ```
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use feedvisor::{ChannelSink, Feed, FeedConfig, Greetings, SubscribeOutcome};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let (sink, mut updates) = ChannelSink::new(64);
//!     let cfg = FeedConfig { handle_signals: false, ..FeedConfig::default() };
//!
//!     let feed = Feed::builder(cfg, Arc::new(sink))
//!         .with_item("greetings", |_| Greetings::new())
//!         .build();
//!
//!     let (source, rx) = feed.source();
//!     let server = tokio::spawn({
//!         let feed = Arc::clone(&feed);
//!         async move { feed.serve(rx).await }
//!     });
//!
//!     assert_eq!(source.subscribe("greetings").await?, SubscribeOutcome::Accepted);
//!     let first = updates.recv().await.expect("first update");
//!     assert_eq!(first.field("message"), Some("Hello"));
//!
//!     drop(source);
//!     server.await??;
//!     Ok(())
//! }
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::core::{
    builder::FeedBuilder,
    config::FeedConfig,
    registry::Registry,
    scheduler::Scheduler,
    shutdown,
    source::{Request, SourceHandle},
};
use crate::error::{FeedError, RuntimeError, SubscribeOutcome, UnsubscribeOutcome};
use crate::events::{Bus, Event, EventKind};
use crate::sinks::Publish;
use crate::subscribers::SubscriberSet;

/// Coordinates item tickers, event delivery (via [`SubscriberSet`]), and graceful shutdown.
pub struct Feed {
    /// Global runtime configuration.
    pub cfg: FeedConfig,
    bus: Bus,
    subscriber_count: usize,
    listener: Mutex<Option<JoinHandle<()>>>,
    registry: Arc<Registry>,
    scheduler: Arc<Scheduler>,
    runtime_token: CancellationToken,
    shutting_down: AtomicBool,
}

impl Feed {
    /// Creates a builder publishing every update through `sink`.
    pub fn builder(cfg: FeedConfig, sink: Arc<dyn Publish>) -> FeedBuilder {
        FeedBuilder::new(cfg, sink)
    }

    pub(crate) fn new_internal(
        cfg: FeedConfig,
        bus: Bus,
        subscriber_count: usize,
        registry: Arc<Registry>,
        scheduler: Arc<Scheduler>,
        runtime_token: CancellationToken,
    ) -> Self {
        Self {
            cfg,
            bus,
            subscriber_count,
            listener: Mutex::new(None),
            registry,
            scheduler,
            runtime_token,
            shutting_down: AtomicBool::new(false),
        }
    }

    /// Adds a subscriber to `item`, starting its ticker on the first one.
    pub async fn subscribe(&self, item: &str) -> Result<SubscribeOutcome, FeedError> {
        self.registry.subscribe(item).await
    }

    /// Removes a subscriber from `item`, stopping its ticker on the last one.
    pub async fn unsubscribe(&self, item: &str) -> UnsubscribeOutcome {
        self.registry.unsubscribe(item).await
    }

    /// Returns true if `item` has at least one subscriber.
    pub async fn is_active(&self, item: &str) -> bool {
        self.registry.is_active(item).await
    }

    /// Returns the subscriber count of `item`.
    pub async fn subscribers(&self, item: &str) -> usize {
        self.registry.subscribers(item).await
    }

    /// Returns sorted list of active item names.
    pub async fn active_items(&self) -> Vec<String> {
        self.registry.list().await
    }

    /// Returns true if a ticker is currently registered for `item`.
    pub fn is_running(&self, item: &str) -> bool {
        self.scheduler.is_running(item)
    }

    /// Returns sorted list of items with a live ticker.
    ///
    /// Matches [`active_items`](Self::active_items) unless the feed is
    /// shutting down.
    pub fn running_items(&self) -> Vec<String> {
        self.scheduler.list()
    }

    /// Event bus shared by every runtime component.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Number of attached event subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscriber_count
    }

    /// Creates a request channel sized by `cfg.source_capacity`.
    pub fn source(&self) -> (SourceHandle, mpsc::Receiver<Request>) {
        SourceHandle::channel(self.cfg.source_capacity_clamped())
    }

    /// Serves subscription requests until either:
    /// - every [`SourceHandle`] is dropped,
    /// - a termination signal arrives (when `cfg.handle_signals`),
    /// - [`shutdown`](Self::shutdown) is called elsewhere,
    ///
    /// and then shuts the feed down.
    ///
    /// ### Errors
    /// - [`RuntimeError::InvariantViolated`] if a subscription hit an already
    ///   running ticker (the feed is shut down first, whatever the outcome)
    /// - [`RuntimeError::GraceExceeded`] if tickers did not stop in time
    pub async fn serve(&self, mut rx: mpsc::Receiver<Request>) -> Result<(), RuntimeError> {
        let signal = shutdown::shutdown_signal(self.cfg.handle_signals);
        tokio::pin!(signal);

        loop {
            tokio::select! {
                _ = self.runtime_token.cancelled() => return Ok(()),
                _ = &mut signal => return self.shutdown().await,
                req = rx.recv() => {
                    let Some(req) = req else {
                        return self.shutdown().await;
                    };
                    if let Some(item) = self.dispatch(req).await {
                        // The violation outranks a slow shutdown.
                        let _ = self.shutdown().await;
                        return Err(RuntimeError::InvariantViolated { item });
                    }
                }
            }
        }
    }

    /// Stops all tickers and waits for them within `cfg.grace`.
    ///
    /// Publishes [`EventKind::AllStoppedWithin`] on success, or
    /// [`EventKind::GraceExceeded`] on timeout and returns
    /// [`RuntimeError::GraceExceeded`] with the list of stuck items.
    /// Event subscribers have seen that final event when this returns, unless
    /// draining their queues took longer than `cfg.grace`.
    ///
    /// Only the first call does the work; any later or concurrent call
    /// returns `Ok(())` right away.
    pub async fn shutdown(&self) -> Result<(), RuntimeError> {
        if self.shutting_down.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        self.bus.publish(Event::new(EventKind::ShutdownRequested));
        self.runtime_token.cancel();

        let grace = self.cfg.grace;
        let stuck = self.registry.shutdown(grace).await;
        let res = if stuck.is_empty() {
            self.bus.publish(Event::new(EventKind::AllStoppedWithin));
            Ok(())
        } else {
            self.bus.publish(
                Event::new(EventKind::GraceExceeded).with_reason(stuck.join(",")),
            );
            Err(RuntimeError::GraceExceeded { grace, stuck })
        };

        let listener = self
            .listener
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(listener) = listener {
            let _ = time::timeout(grace, listener).await;
        }
        res
    }

    /// Handles one request and answers it; returns the item on a fatal error.
    async fn dispatch(&self, req: Request) -> Option<String> {
        match req {
            Request::Subscribe { item, reply } => {
                let res = self.registry.subscribe(&item).await;
                let fatal = matches!(&res, Err(e) if e.is_fatal());
                let _ = reply.send(res);
                fatal.then_some(item)
            }
            Request::Unsubscribe { item, reply } => {
                let _ = reply.send(self.registry.unsubscribe(&item).await);
                None
            }
        }
    }

    /// Subscribes to the bus and forwards events to `set` until the shutdown
    /// outcome went through, then shuts the set down.
    pub(crate) fn subscriber_listener(&self, set: SubscriberSet) {
        let mut rx = self.bus.subscribe();
        let handle = tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(ev) => {
                        let last = ev.is_shutdown_outcome();
                        set.emit(Arc::new(ev));
                        if last {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
            set.shutdown().await;
        });
        *self.listener.lock().unwrap_or_else(PoisonError::into_inner) = Some(handle);
    }
}
