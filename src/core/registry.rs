//! # Subscription registry - the source of truth for item interest.
//!
//! The registry counts subscribers per item and drives the
//! [`Scheduler`] on the zero-to-one and one-to-zero transitions:
//!
//! ```text
//! subscribe(item)
//!   ├─► count > 0            → count += 1                      → AlreadyActive
//!   ├─► unknown to catalog   → SubscriptionRejected            → Err(UnknownItem)
//!   └─► count == 0           → scheduler.activate(item, factory)
//!                              count = 1                       → Accepted
//!
//! unsubscribe(item)
//!   ├─► no entry             → SubscriptionRejected            → NotActive
//!   ├─► count > 1            → count -= 1                      → Accepted
//!   └─► count == 1           → remove entry
//!                              scheduler.deactivate(item)      → Accepted
//! ```
//!
//! ## Rules
//! - An item has a running ticker **iff** it has an entry here
//! - One lock serializes all subscribe/unsubscribe calls, held across the
//!   scheduler call, so transitions are detected race-free
//! - Scheduler calls under the lock never wait on a publish

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;

use crate::core::scheduler::Scheduler;
use crate::error::{FeedError, SubscribeOutcome, UnsubscribeOutcome};
use crate::events::{Bus, Event, EventKind};
use crate::generators::Catalog;

/// Subscriber counts per active item.
pub struct Registry {
    counts: Mutex<HashMap<String, usize>>,
    catalog: Catalog,
    scheduler: Arc<Scheduler>,
    bus: Bus,
}

impl Registry {
    /// Creates a new registry.
    pub fn new(catalog: Catalog, scheduler: Arc<Scheduler>, bus: Bus) -> Arc<Self> {
        Arc::new(Self {
            counts: Mutex::new(HashMap::new()),
            catalog,
            scheduler,
            bus,
        })
    }

    /// Adds one subscriber to `item`, starting its ticker on the first one.
    ///
    /// ### Errors
    /// - [`FeedError::UnknownItem`] if the catalog has no generator for `item`
    /// - [`FeedError::DoubleActivation`] if the scheduler already runs `item`
    ///   (invariant violation)
    /// - [`FeedError::Closed`] after shutdown
    pub async fn subscribe(&self, item: &str) -> Result<SubscribeOutcome, FeedError> {
        let mut counts = self.counts.lock().await;

        if let Some(n) = counts.get_mut(item) {
            *n += 1;
            self.publish_count(EventKind::ItemSubscribed, item, *n);
            return Ok(SubscribeOutcome::AlreadyActive);
        }

        let Some(factory) = self.catalog.factory_for(item) else {
            let err = FeedError::UnknownItem {
                item: item.to_string(),
            };
            self.publish_rejected(item, err.as_label());
            return Err(err);
        };

        if let Err(err) = self.scheduler.activate(item, factory) {
            self.publish_rejected(item, err.as_label());
            return Err(err);
        }
        counts.insert(item.to_string(), 1);

        self.publish_count(EventKind::ItemSubscribed, item, 1);
        Ok(SubscribeOutcome::Accepted)
    }

    /// Removes one subscriber from `item`, stopping its ticker on the last one.
    ///
    /// Returns [`UnsubscribeOutcome::NotActive`] (and changes nothing) if the
    /// item has no active interest.
    pub async fn unsubscribe(&self, item: &str) -> UnsubscribeOutcome {
        let mut counts = self.counts.lock().await;

        let remaining = match counts.get(item).copied() {
            None => {
                self.publish_rejected(item, "not_active");
                return UnsubscribeOutcome::NotActive;
            }
            Some(n) if n > 1 => {
                counts.insert(item.to_string(), n - 1);
                n - 1
            }
            Some(_) => {
                counts.remove(item);
                self.scheduler.deactivate(item);
                0
            }
        };

        self.publish_count(EventKind::ItemUnsubscribed, item, remaining);
        UnsubscribeOutcome::Accepted
    }

    /// Returns true if `item` has at least one subscriber.
    pub async fn is_active(&self, item: &str) -> bool {
        self.counts.lock().await.contains_key(item)
    }

    /// Returns the subscriber count of `item` (0 when inactive).
    pub async fn subscribers(&self, item: &str) -> usize {
        self.counts.lock().await.get(item).copied().unwrap_or(0)
    }

    /// Returns sorted list of active item names.
    pub async fn list(&self) -> Vec<String> {
        let counts = self.counts.lock().await;
        let mut names: Vec<String> = counts.keys().cloned().collect();
        names.sort_unstable();
        names
    }

    /// Drops all interest and stops every ticker, waiting at most `grace`.
    ///
    /// Returns the items whose tickers did not stop in time.
    pub async fn shutdown(&self, grace: Duration) -> Vec<String> {
        let mut counts = self.counts.lock().await;
        counts.clear();
        self.scheduler.cancel_all(grace).await
    }

    fn publish_count(&self, kind: EventKind, item: &str, n: usize) {
        self.bus
            .publish(Event::new(kind).with_item(item).with_subscribers(n));
    }

    fn publish_rejected(&self, item: &str, reason: &'static str) {
        self.bus.publish(
            Event::new(EventKind::SubscriptionRejected)
                .with_item(item)
                .with_reason(reason),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testing::{RecordingSink, greetings, wait_for_calls};
    use crate::generators::Greetings;
    use crate::policies::CadencePolicy;
    use tokio::sync::broadcast;
    use tokio_util::sync::CancellationToken;

    struct Fixture {
        registry: Arc<Registry>,
        scheduler: Arc<Scheduler>,
        sink: Arc<RecordingSink>,
        rx: broadcast::Receiver<Event>,
    }

    fn fixture() -> Fixture {
        let bus = Bus::new(256);
        let rx = bus.subscribe();
        let sink = RecordingSink::new();
        let scheduler = Scheduler::new(
            sink.clone(),
            CadencePolicy::default(),
            bus.clone(),
            CancellationToken::new(),
        );
        let catalog = Catalog::new().with_item("greetings", |_| Greetings::new());
        let registry = Registry::new(catalog, Arc::clone(&scheduler), bus);
        Fixture {
            registry,
            scheduler,
            sink,
            rx,
        }
    }

    fn drain(rx: &mut broadcast::Receiver<Event>) -> Vec<EventKind> {
        let mut kinds = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            kinds.push(ev.kind);
        }
        kinds
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscribe_activates_and_unsubscribe_deactivates() {
        let f = fixture();

        let out = f.registry.subscribe("greetings").await.unwrap();
        assert_eq!(out, SubscribeOutcome::Accepted);
        assert!(f.registry.is_active("greetings").await);
        assert!(f.scheduler.is_running("greetings"));

        let out = f.registry.unsubscribe("greetings").await;
        assert_eq!(out, UnsubscribeOutcome::Accepted);
        assert!(!f.registry.is_active("greetings").await);
        assert!(!f.scheduler.is_running("greetings"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_subscribe_is_already_active() {
        let mut f = fixture();

        f.registry.subscribe("greetings").await.unwrap();
        let out = f.registry.subscribe("greetings").await.unwrap();
        assert_eq!(out, SubscribeOutcome::AlreadyActive);
        assert_eq!(f.registry.subscribers("greetings").await, 2);

        let activations = drain(&mut f.rx)
            .into_iter()
            .filter(|k| *k == EventKind::ItemActivated)
            .count();
        assert_eq!(activations, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_counts_drain_before_deactivation() {
        let f = fixture();

        f.registry.subscribe("greetings").await.unwrap();
        f.registry.subscribe("greetings").await.unwrap();

        assert_eq!(
            f.registry.unsubscribe("greetings").await,
            UnsubscribeOutcome::Accepted
        );
        assert!(f.registry.is_active("greetings").await);
        assert!(f.scheduler.is_running("greetings"));

        assert_eq!(
            f.registry.unsubscribe("greetings").await,
            UnsubscribeOutcome::Accepted
        );
        assert!(!f.registry.is_active("greetings").await);
        assert!(!f.scheduler.is_running("greetings"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unsubscribe_inactive_is_not_active_without_scheduler_event() {
        let mut f = fixture();

        let out = f.registry.unsubscribe("greetings").await;
        assert_eq!(out, UnsubscribeOutcome::NotActive);

        let kinds = drain(&mut f.rx);
        assert!(!kinds.contains(&EventKind::ItemDeactivated));
        assert!(!kinds.contains(&EventKind::ItemActivated));
        assert_eq!(kinds, [EventKind::SubscriptionRejected]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_item_is_rejected() {
        let f = fixture();

        let err = f.registry.subscribe("prices").await.unwrap_err();
        assert_eq!(
            err,
            FeedError::UnknownItem {
                item: "prices".into()
            }
        );
        assert!(!f.registry.is_active("prices").await);
        assert!(f.scheduler.list().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_broken_invariant_surfaces_double_activation() {
        let f = fixture();

        f.scheduler.activate("greetings", greetings()).unwrap();
        let err = f.registry.subscribe("greetings").await.unwrap_err();
        assert!(err.is_fatal());
        assert!(!f.registry.is_active("greetings").await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_resubscribe_starts_fresh_generator() {
        let f = fixture();

        f.registry.subscribe("greetings").await.unwrap();
        wait_for_calls(&f.sink, 2).await;
        f.registry.unsubscribe("greetings").await;
        let before = f.sink.len();

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(f.sink.len(), before);

        f.registry.subscribe("greetings").await.unwrap();
        wait_for_calls(&f.sink, before + 1).await;
        assert_eq!(f.sink.calls()[before].fields["message"], "Hello");
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_clears_interest() {
        let f = fixture();

        f.registry.subscribe("greetings").await.unwrap();
        let stuck = f.registry.shutdown(Duration::from_secs(1)).await;

        assert!(stuck.is_empty());
        assert!(f.registry.list().await.is_empty());
        assert!(f.scheduler.list().is_empty());
    }
}
