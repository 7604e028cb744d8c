use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::{
    core::FeedConfig,
    events::Bus,
    generators::{Catalog, Generate},
    sinks::Publish,
    subscribers::{Subscribe, SubscriberSet},
};
use super::{feed::Feed, registry::Registry, scheduler::Scheduler};

/// Builder for constructing a [`Feed`].
pub struct FeedBuilder {
    cfg: FeedConfig,
    sink: Arc<dyn Publish>,
    catalog: Catalog,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl FeedBuilder {
    /// Creates a new builder with the given configuration and publish sink.
    pub fn new(cfg: FeedConfig, sink: Arc<dyn Publish>) -> Self {
        Self {
            cfg,
            sink,
            catalog: Catalog::new(),
            subscribers: Vec::new(),
        }
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive runtime events (subscriptions, ticks, failures, etc.)
    /// through dedicated workers with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Makes `item` subscribable; `factory` creates its generator on every activation.
    pub fn with_item<G, F>(mut self, item: impl Into<String>, factory: F) -> Self
    where
        G: Generate,
        F: Fn(&str) -> G + Send + Sync + 'static,
    {
        self.catalog.register(item, factory);
        self
    }

    /// Replaces the item catalog (items added before are dropped).
    pub fn with_catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Builds and returns the Feed instance.
    ///
    /// This consumes the builder and initializes all runtime components:
    /// - Event bus for broadcasting
    /// - Scheduler owning the item tickers
    /// - Registry counting subscribers per item
    /// - Subscriber workers and the bus listener feeding them (only when
    ///   subscribers were given)
    ///
    /// Must be called from within a tokio runtime.
    pub fn build(self) -> Arc<Feed> {
        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let subs = SubscriberSet::new(self.subscribers, bus.clone());
        let runtime_token = CancellationToken::new();

        let scheduler = Scheduler::new(
            self.sink,
            self.cfg.cadence,
            bus.clone(),
            runtime_token.clone(),
        );
        let registry = Registry::new(self.catalog, Arc::clone(&scheduler), bus.clone());

        let feed = Arc::new(Feed::new_internal(
            self.cfg,
            bus,
            subs.len(),
            registry,
            scheduler,
            runtime_token,
        ));
        if !subs.is_empty() {
            feed.subscriber_listener(subs);
        }
        feed
    }
}
