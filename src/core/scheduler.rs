//! # Update scheduler - one ticker per active item.
//!
//! The scheduler owns the ticker handles (gate + cancellation token + join
//! handle) and is the only place tickers are spawned or cancelled. It is driven
//! by the [`Registry`](super::registry::Registry), which guarantees that
//! `activate` is only called for inactive items.
//!
//! ## Architecture
//! ```text
//! Registry ──► activate(item, factory)
//!                ├─► already running → Err(DoubleActivation) + InvariantViolated
//!                └─► spawn Ticker::run(child token) ──► ItemActivated
//!                      └─► panics are caught inside: TickerPanicked, then restart
//!
//! Registry ──► deactivate(item)
//!                ├─► gate.close()     (no sink call starts after this)
//!                ├─► token.cancel()   (wakes the ticker's sleep)
//!                ├─► ItemDeactivated
//!                └─► spawn reaper: join ──► TickerStopped
//! ```
//!
//! ## Rules
//! - At most one handle per item
//! - `activate`/`deactivate` never await: they only spawn, lock briefly and cancel
//! - `cancel_all` joins every ticker, bounded by a grace period

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::task::{JoinError, JoinHandle};
use tokio::time::{Instant, timeout_at};
use tokio_util::sync::CancellationToken;

use crate::core::ticker::{Gate, Ticker};
use crate::error::FeedError;
use crate::events::{Bus, Event, EventKind};
use crate::generators::GeneratorFactory;
use crate::policies::CadencePolicy;
use crate::sinks::Publish;

/// Handle to a running ticker.
struct Handle {
    gate: Arc<Gate>,
    cancel: CancellationToken,
    join: JoinHandle<()>,
}

impl Handle {
    /// Stops the ticker: close gate first, then wake it up.
    fn stop(&self) {
        self.gate.close();
        self.cancel.cancel();
    }
}

/// Runs exactly one ticker per active item.
pub struct Scheduler {
    tickers: Mutex<HashMap<String, Handle>>,
    sink: Arc<dyn Publish>,
    cadence: CadencePolicy,
    bus: Bus,
    runtime_token: CancellationToken,
}

impl Scheduler {
    /// Creates a new scheduler.
    pub fn new(
        sink: Arc<dyn Publish>,
        cadence: CadencePolicy,
        bus: Bus,
        runtime_token: CancellationToken,
    ) -> Arc<Self> {
        Arc::new(Self {
            tickers: Mutex::new(HashMap::new()),
            sink,
            cadence,
            bus,
            runtime_token,
        })
    }

    /// Starts the ticker for `item`; the first update is published immediately.
    ///
    /// `factory` builds the ticker's generator, and a replacement after a panic.
    /// Must be called from within a tokio runtime.
    ///
    /// ### Errors
    /// - [`FeedError::DoubleActivation`] if a ticker is already registered for `item`
    /// - [`FeedError::Closed`] if the runtime is shutting down
    pub fn activate(&self, item: &str, factory: GeneratorFactory) -> Result<(), FeedError> {
        if self.runtime_token.is_cancelled() {
            return Err(FeedError::Closed);
        }

        let mut tickers = self.lock();
        if tickers.contains_key(item) {
            drop(tickers);
            self.bus
                .publish(Event::new(EventKind::InvariantViolated).with_item(item));
            return Err(FeedError::DoubleActivation {
                item: item.to_string(),
            });
        }

        let gate = Arc::new(Gate::new());
        let cancel = self.runtime_token.child_token();
        let ticker = Ticker {
            item: Arc::from(item),
            factory,
            sink: Arc::clone(&self.sink),
            cadence: self.cadence,
            gate: Arc::clone(&gate),
            bus: self.bus.clone(),
        };

        let token = cancel.clone();
        let join = tokio::spawn(async move { ticker.run(token).await });

        tickers.insert(item.to_string(), Handle { gate, cancel, join });
        drop(tickers);

        self.bus
            .publish(Event::new(EventKind::ItemActivated).with_item(item));
        Ok(())
    }

    /// Stops the ticker for `item`; returns false if none was running.
    ///
    /// After this returns, no sink call for `item` begins until the next
    /// [`activate`](Self::activate). The ticker task is joined in the background.
    pub fn deactivate(&self, item: &str) -> bool {
        let Some(handle) = self.lock().remove(item) else {
            return false;
        };

        handle.stop();
        self.bus
            .publish(Event::new(EventKind::ItemDeactivated).with_item(item));

        let bus = self.bus.clone();
        let name = item.to_string();
        tokio::spawn(async move {
            report_exit(&bus, &name, handle.join.await);
        });
        true
    }

    /// Returns true if a ticker is registered for `item`.
    pub fn is_running(&self, item: &str) -> bool {
        self.lock().contains_key(item)
    }

    /// Returns sorted list of items with a registered ticker.
    pub fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = self.lock().keys().cloned().collect();
        names.sort_unstable();
        names
    }

    /// Stops every ticker and joins them, waiting at most `grace`.
    ///
    /// Returns the sorted names of tickers that did not finish in time
    /// (they are aborted).
    pub async fn cancel_all(&self, grace: Duration) -> Vec<String> {
        let handles: Vec<(String, Handle)> = self.lock().drain().collect();

        for (_, h) in &handles {
            h.stop();
        }

        let deadline = Instant::now() + grace;
        let mut stuck = Vec::new();
        for (name, mut h) in handles {
            match timeout_at(deadline, &mut h.join).await {
                Ok(res) => report_exit(&self.bus, &name, res),
                Err(_elapsed) => {
                    h.join.abort();
                    stuck.push(name);
                }
            }
        }
        stuck.sort_unstable();
        stuck
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Handle>> {
        self.tickers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Publishes the terminal event of a joined ticker.
///
/// Panics are handled inside the ticker, so a join error means the task was
/// torn down by the runtime itself.
fn report_exit(bus: &Bus, item: &str, res: Result<(), JoinError>) {
    match res {
        Ok(()) => bus.publish(Event::new(EventKind::TickerStopped).with_item(item)),
        Err(e) => bus.publish(
            Event::new(EventKind::TickerPanicked)
                .with_item(item)
                .with_reason(e.to_string()),
        ),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use super::*;
    use crate::core::testing::{RecordingSink, greetings, wait_for_calls};
    use crate::error::PublishError;
    use crate::generators::{GenerateFn, GeneratorBox};
    use crate::update::Fields;

    fn scheduler(sink: Arc<RecordingSink>) -> Arc<Scheduler> {
        Scheduler::new(
            sink,
            CadencePolicy::default(),
            Bus::new(64),
            CancellationToken::new(),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_activate_publishes_immediately() {
        let sink = RecordingSink::new();
        let sched = scheduler(sink.clone());

        sched.activate("greetings", greetings()).unwrap();
        wait_for_calls(&sink, 1).await;

        let calls = sink.calls();
        assert_eq!(calls[0].item, "greetings");
        assert_eq!(calls[0].fields["message"], "Hello");
        assert!(!calls[0].is_snapshot);
        assert!(sched.is_running("greetings"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_double_activation_is_rejected() {
        let sink = RecordingSink::new();
        let sched = scheduler(sink.clone());
        let mut rx = sched.bus.subscribe();

        sched.activate("a", greetings()).unwrap();
        let err = sched.activate("a", greetings()).unwrap_err();
        assert_eq!(err, FeedError::DoubleActivation { item: "a".into() });

        let mut saw_violation = false;
        while let Ok(ev) = rx.try_recv() {
            saw_violation |= ev.kind == EventKind::InvariantViolated;
        }
        assert!(saw_violation);
        assert_eq!(sched.list(), ["a"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_publish_after_deactivate() {
        let sink = RecordingSink::new();
        let sched = scheduler(sink.clone());

        sched.activate("a", greetings()).unwrap();
        wait_for_calls(&sink, 2).await;
        assert!(sched.deactivate("a"));
        let seen = sink.count("a");

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(sink.count("a"), seen);
        assert!(!sched.is_running("a"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_deactivate_unknown_is_false() {
        let sched = scheduler(RecordingSink::new());
        assert!(!sched.deactivate("missing"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_publish_keeps_ticking() {
        let sink = RecordingSink::new();
        sink.set_failing(true);
        let sched = scheduler(sink.clone());
        let mut rx = sched.bus.subscribe();

        sched.activate("a", greetings()).unwrap();
        wait_for_calls(&sink, 3).await;

        let mut failures = 0;
        while let Ok(ev) = rx.try_recv() {
            if ev.kind == EventKind::PublishFailed {
                failures += 1;
                assert_eq!(ev.reason.as_deref(), Some("sink closed"));
            }
        }
        assert!(failures >= 3, "failures={failures}");

        sink.set_failing(false);
        wait_for_calls(&sink, 4).await;
        assert!(sched.is_running("a"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_items_tick_independently() {
        let sink = RecordingSink::new();
        let sched = scheduler(sink.clone());

        sched.activate("a", greetings()).unwrap();
        sched
            .activate(
                "b",
                Arc::new(|_: &str| {
                    GenerateFn::boxed("const", || Fields::from([("k".into(), "v".into())]))
                }),
            )
            .unwrap();
        wait_for_calls(&sink, 6).await;

        assert!(sink.count("a") >= 1);
        assert!(sink.count("b") >= 1);
        assert!(sched.deactivate("a"));
        assert_eq!(sched.list(), ["b"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_all_joins_everything() {
        let sink = RecordingSink::new();
        let sched = scheduler(sink.clone());

        sched.activate("a", greetings()).unwrap();
        sched.activate("b", greetings()).unwrap();
        wait_for_calls(&sink, 2).await;

        let stuck = sched.cancel_all(Duration::from_secs(1)).await;
        assert!(stuck.is_empty(), "stuck={stuck:?}");
        assert!(sched.list().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_activate_after_shutdown_is_closed() {
        let token = CancellationToken::new();
        let sched = Scheduler::new(
            RecordingSink::new(),
            CadencePolicy::default(),
            Bus::new(8),
            token.clone(),
        );
        token.cancel();

        let err = sched.activate("a", greetings()).unwrap_err();
        assert_eq!(err, FeedError::Closed);
    }

    /// Sink that panics on its first call and records the rest.
    struct PanicOnce {
        inner: Arc<RecordingSink>,
        armed: AtomicBool,
    }

    impl Publish for PanicOnce {
        fn publish(&self, item: &str, fields: &Fields, is_snapshot: bool) -> Result<(), PublishError> {
            if self.armed.swap(false, Ordering::SeqCst) {
                panic!("sink exploded");
            }
            self.inner.publish(item, fields, is_snapshot)
        }
    }

    /// Sink whose calls take a few milliseconds of wall-clock time.
    #[derive(Default)]
    struct SlowSink {
        started: AtomicUsize,
        finished: AtomicUsize,
    }

    impl Publish for SlowSink {
        fn publish(&self, _item: &str, _fields: &Fields, _snapshot: bool) -> Result<(), PublishError> {
            self.started.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(5));
            self.finished.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_generator_panic_is_reported_and_ticker_restarts() {
        let sink = RecordingSink::new();
        let sched = scheduler(sink.clone());
        let mut rx = sched.bus.subscribe();

        let builds = Arc::new(AtomicUsize::new(0));
        let factory: GeneratorFactory = Arc::new({
            let builds = Arc::clone(&builds);
            move |_: &str| -> GeneratorBox {
                if builds.fetch_add(1, Ordering::SeqCst) == 0 {
                    GenerateFn::boxed("flaky", || -> Fields { panic!("generator exploded") })
                } else {
                    greetings()("a")
                }
            }
        });

        sched.activate("a", factory).unwrap();
        wait_for_calls(&sink, 1).await;

        let panicked: Vec<Event> = std::iter::from_fn(|| rx.try_recv().ok())
            .filter(|ev| ev.kind == EventKind::TickerPanicked)
            .collect();
        assert_eq!(panicked.len(), 1);
        assert_eq!(panicked[0].item.as_deref(), Some("a"));
        assert_eq!(panicked[0].tick, Some(1));
        assert_eq!(panicked[0].reason.as_deref(), Some("generator exploded"));

        assert_eq!(builds.load(Ordering::SeqCst), 2);
        assert_eq!(sink.calls()[0].fields["message"], "Hello");
        assert!(sched.is_running("a"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_sink_panic_keeps_gate_usable() {
        let recorded = RecordingSink::new();
        let sink = Arc::new(PanicOnce {
            inner: recorded.clone(),
            armed: AtomicBool::new(true),
        });
        let sched = Scheduler::new(
            sink,
            CadencePolicy::default(),
            Bus::new(64),
            CancellationToken::new(),
        );
        let mut rx = sched.bus.subscribe();

        sched.activate("a", greetings()).unwrap();
        wait_for_calls(&recorded, 2).await;

        let reasons: Vec<String> = std::iter::from_fn(|| rx.try_recv().ok())
            .filter(|ev| ev.kind == EventKind::TickerPanicked)
            .filter_map(|ev| ev.reason.map(|r| r.to_string()))
            .collect();
        assert_eq!(reasons, ["sink exploded"]);

        assert!(sched.deactivate("a"));
        let seen = recorded.len();
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(recorded.len(), seen);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_deactivate_waits_for_in_flight_publish() {
        let sink = Arc::new(SlowSink::default());
        let sched = Scheduler::new(
            sink.clone(),
            CadencePolicy::fixed(Duration::from_millis(1)),
            Bus::new(1024),
            CancellationToken::new(),
        );

        sched.activate("a", greetings()).unwrap();
        while sink.started.load(Ordering::SeqCst) < 3 {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }

        assert!(sched.deactivate("a"));
        let started = sink.started.load(Ordering::SeqCst);
        assert_eq!(sink.finished.load(Ordering::SeqCst), started);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(sink.started.load(Ordering::SeqCst), started);
    }
}
