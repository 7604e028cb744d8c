//! # Ticker: single-item update loop.
//!
//! Drives one active item:
//! - computes fields via the item's own [`Generate`](crate::Generate),
//! - hands them to the shared [`Publish`] sink,
//! - waits per [`CadencePolicy`] before the next tick,
//! - cooperative cancellation via [`CancellationToken`].
//!
//! ## Event flow
//! For each tick, the ticker publishes:
//! ```text
//! [generate] → [gate check + sink.publish] → UpdatePublished (Ok)
//!                                          → PublishFailed   (Err, keeps running)
//!            → TickScheduled{delay} → [sleep] → (next tick)
//!
//! panic in generate or publish → TickerPanicked → TickScheduled → [sleep]
//!                              → (next tick with a fresh generator)
//! ```
//!
//! ## Architecture
//! ```text
//! Scheduler::activate ──► Ticker::run()
//!
//! loop {
//!   ├─► generator = factory(item)
//!   └─► catch_unwind(loop {
//!         ├─► tick += 1
//!         ├─► fields = generator.next_fields()
//!         ├─► gate.run_if_open(sink.publish(item, fields, false))
//!         │     ├─► closed → exit (deactivated between ticks)
//!         │     ├─► Ok     → publish UpdatePublished
//!         │     └─► Err    → publish PublishFailed
//!         ├─► delay = cadence.next()
//!         ├─► publish TickScheduled
//!         └─► sleep(delay) (cancellable)
//!       })
//!       └─► panicked → publish TickerPanicked, sleep(cadence.next()), restart
//! }
//! ```
//!
//! ## Rules
//! - Ticks run **sequentially** within one ticker (never parallel)
//! - The first tick runs **immediately** after spawn
//! - A sink call never **starts** after the item's gate was closed
//! - A panic never ends the ticker; only cancellation or a closed gate does
//!
//! **Warning**: `AssertUnwindSafe` is used; the generator that panicked is
//! dropped and never polled again, the sink is reused as is.

use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, PoisonError};

use futures::FutureExt;
use tokio::{select, time};
use tokio_util::sync::CancellationToken;

use crate::{
    events::{Bus, Event, EventKind},
    generators::GeneratorFactory,
    policies::CadencePolicy,
    sinks::Publish,
    subscribers::panic_message,
};

/// Per-item "still active" flag shared by the scheduler and the ticker.
///
/// The ticker holds the lock for the whole sink call; [`Gate::close`] takes the
/// same lock, so once `close` returns no new sink call can begin.
#[derive(Debug)]
pub struct Gate {
    open: Mutex<bool>,
}

impl Gate {
    /// Creates an open gate.
    pub fn new() -> Self {
        Self {
            open: Mutex::new(true),
        }
    }

    /// Closes the gate. Waits for an in-flight sink call, if any.
    pub fn close(&self) {
        *self.open.lock().unwrap_or_else(PoisonError::into_inner) = false;
    }

    /// Runs `f` under the gate lock if the gate is still open.
    pub fn run_if_open<R>(&self, f: impl FnOnce() -> R) -> Option<R> {
        let open = self.open.lock().unwrap_or_else(PoisonError::into_inner);
        if *open { Some(f()) } else { None }
    }
}

/// Produces and publishes updates for a single active item.
pub struct Ticker {
    /// Item this ticker serves.
    pub item: Arc<str>,
    /// Builds the generator, again after every panic.
    pub factory: GeneratorFactory,
    /// Shared publish sink.
    pub sink: Arc<dyn Publish>,
    /// Delay policy between ticks.
    pub cadence: CadencePolicy,
    /// Activation gate shared with the scheduler.
    pub gate: Arc<Gate>,
    /// Internal event bus.
    pub bus: Bus,
}

impl Ticker {
    /// Runs the ticker until the gate closes or `token` is cancelled.
    ///
    /// ### Exit conditions
    /// - `token` is cancelled (deactivation or runtime shutdown), checked
    ///   before every tick and during the sleep
    /// - the gate is found closed right before a sink call
    ///
    /// ### Failure semantics
    /// - A sink error is reported as `PublishFailed` and the next tick is
    ///   scheduled as usual.
    /// - A panic in the generator or the sink is reported as `TickerPanicked`;
    ///   after one cadence delay the ticker resumes with a fresh generator.
    ///   Tick numbers keep counting across restarts.
    pub async fn run(self, token: CancellationToken) {
        let mut tick: u64 = 0;

        loop {
            let attempt = AssertUnwindSafe(self.run_generator(&mut tick, &token))
                .catch_unwind()
                .await;
            let Err(panic_err) = attempt else {
                break;
            };

            self.bus.publish(
                Event::new(EventKind::TickerPanicked)
                    .with_item(Arc::clone(&self.item))
                    .with_tick(tick)
                    .with_reason(panic_message(&*panic_err)),
            );
            if !self.pause(tick, &token).await {
                break;
            }
        }
    }

    /// Ticks with one generator until cancelled or the gate closes.
    async fn run_generator(&self, tick: &mut u64, token: &CancellationToken) {
        let mut generator = (self.factory)(&*self.item);

        loop {
            if token.is_cancelled() {
                return;
            }
            *tick += 1;

            let fields = generator.next_fields();
            let outcome = self
                .gate
                .run_if_open(|| self.sink.publish(&self.item, &fields, false));

            match outcome {
                None => return,
                Some(Ok(())) => {
                    self.bus.publish(
                        Event::new(EventKind::UpdatePublished)
                            .with_item(Arc::clone(&self.item))
                            .with_tick(*tick),
                    );
                }
                Some(Err(e)) => {
                    self.bus.publish(
                        Event::new(EventKind::PublishFailed)
                            .with_item(Arc::clone(&self.item))
                            .with_tick(*tick)
                            .with_reason(e.as_message()),
                    );
                }
            }

            if !self.pause(*tick, token).await {
                return;
            }
        }
    }

    /// Draws the next delay, announces it and sleeps; false if cancelled meanwhile.
    async fn pause(&self, tick: u64, token: &CancellationToken) -> bool {
        let delay = self.cadence.next();
        self.bus.publish(
            Event::new(EventKind::TickScheduled)
                .with_item(Arc::clone(&self.item))
                .with_tick(tick)
                .with_delay(delay),
        );

        select! {
            _ = time::sleep(delay) => true,
            _ = token.cancelled() => false,
        }
    }
}
