//! # LogWriter - structured event logger
//!
//! A subscriber that renders incoming [`Event`]s through `tracing`. Install any
//! `tracing` subscriber (for example `tracing_subscriber::fmt`) to see them.
//!
//! ## Example output (`tracing_subscriber::fmt`)
//! ```text
//! INFO  feedvisor: subscribed item="greetings" subscribers=1
//! INFO  feedvisor: activated item="greetings"
//! DEBUG feedvisor: published item="greetings" tick=1
//! DEBUG feedvisor: next tick item="greetings" tick=1 delay_ms=2187
//! WARN  feedvisor: publish failed item="greetings" tick=2 reason="sink closed"
//! INFO  feedvisor: deactivated item="greetings"
//! ```

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

const TARGET: &str = "feedvisor";

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let item = e.item.as_deref().unwrap_or("-");
        let reason = e.reason.as_deref().unwrap_or("-");

        match e.kind {
            EventKind::ItemSubscribed => {
                info!(target: TARGET, item, subscribers = e.subscribers, "subscribed");
            }
            EventKind::ItemUnsubscribed => {
                info!(target: TARGET, item, subscribers = e.subscribers, "unsubscribed");
            }
            EventKind::SubscriptionRejected => {
                warn!(target: TARGET, item, reason, "subscription rejected");
            }
            EventKind::ItemActivated => {
                info!(target: TARGET, item, "activated");
            }
            EventKind::ItemDeactivated => {
                info!(target: TARGET, item, "deactivated");
            }
            EventKind::UpdatePublished => {
                debug!(target: TARGET, item, tick = e.tick, "published");
            }
            EventKind::PublishFailed => {
                warn!(target: TARGET, item, tick = e.tick, reason, "publish failed");
            }
            EventKind::TickScheduled => {
                debug!(target: TARGET, item, tick = e.tick, delay_ms = e.delay_ms, "next tick");
            }
            EventKind::TickerStopped => {
                debug!(target: TARGET, item, "ticker stopped");
            }
            EventKind::TickerPanicked => {
                error!(target: TARGET, item, reason, "ticker panicked");
            }
            EventKind::InvariantViolated => {
                error!(target: TARGET, item, "double activation");
            }
            EventKind::SubscriberOverflow => {
                warn!(target: TARGET, subscriber = item, reason, "subscriber overflow");
            }
            EventKind::SubscriberPanicked => {
                error!(target: TARGET, subscriber = item, reason, "subscriber panicked");
            }
            EventKind::ShutdownRequested => {
                info!(target: TARGET, "shutdown requested");
            }
            EventKind::AllStoppedWithin => {
                info!(target: TARGET, "all tickers stopped within grace");
            }
            EventKind::GraceExceeded => {
                error!(target: TARGET, "grace exceeded");
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
