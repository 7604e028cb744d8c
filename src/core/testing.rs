//! In-memory sink and helpers shared by the runtime tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::time::Instant;

use crate::error::PublishError;
use crate::generators::{GeneratorBox, GeneratorFactory, Greetings};
use crate::sinks::Publish;
use crate::update::Fields;

/// One recorded `publish` call.
#[derive(Clone, Debug)]
pub struct Call {
    pub item: String,
    pub fields: Fields,
    pub is_snapshot: bool,
    pub at: Instant,
}

/// Sink recording every call; optionally fails them all with `Closed`.
#[derive(Default)]
pub struct RecordingSink {
    calls: Mutex<Vec<Call>>,
    failing: AtomicBool,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_for(&self, item: &str) -> Vec<Call> {
        self.calls().into_iter().filter(|c| c.item == item).collect()
    }

    pub fn count(&self, item: &str) -> usize {
        self.calls_for(item).len()
    }

    pub fn len(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl Publish for RecordingSink {
    fn publish(&self, item: &str, fields: &Fields, is_snapshot: bool) -> Result<(), PublishError> {
        self.calls.lock().unwrap().push(Call {
            item: item.to_string(),
            fields: fields.clone(),
            is_snapshot,
            at: Instant::now(),
        });
        if self.failing.load(Ordering::SeqCst) {
            Err(PublishError::Closed)
        } else {
            Ok(())
        }
    }

    fn name(&self) -> &'static str {
        "RecordingSink"
    }
}

/// Polls until the sink has seen at least `n` calls in total.
///
/// Meant for paused-clock tests: every poll advances virtual time by 1ms.
pub async fn wait_for_calls(sink: &RecordingSink, n: usize) {
    for _ in 0..1_000_000 {
        if sink.len() >= n {
            return;
        }
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
    panic!("sink saw {} calls, expected {n}", sink.len());
}

/// Factory building a fresh [`Greetings`] generator.
pub fn greetings() -> GeneratorFactory {
    Arc::new(|_: &str| -> GeneratorBox { Box::new(Greetings::new()) })
}
