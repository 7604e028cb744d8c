//! # ChannelSink: bounded hand-off to a transport task
//!
//! [`ChannelSink`] turns each publish call into an owned [`Update`] and pushes
//! it into a bounded `mpsc` queue. The receiving half belongs to whatever
//! speaks the upstream wire protocol.
//!
//! ```text
//! Ticker 1 ──┐
//! Ticker 2 ──┼── publish() ──► try_send ──► [bounded queue] ──► transport task ──► upstream
//! Ticker N ──┘                  │
//!                               ├─ Full   → PublishError::Full
//!                               └─ Closed → PublishError::Closed (transport gone)
//! ```
//!
//! ## Example
//! ```rust
//! use feedvisor::{ChannelSink, Fields, Publish};
//!
//! let (sink, mut rx) = ChannelSink::new(16);
//! sink.publish("greetings", &Fields::new(), false).unwrap();
//!
//! let update = rx.try_recv().unwrap();
//! assert_eq!(&*update.item, "greetings");
//! ```

use tokio::sync::mpsc;

use crate::error::PublishError;
use crate::sinks::Publish;
use crate::update::{Fields, Update};

/// Sink forwarding updates into a bounded channel.
#[derive(Clone, Debug)]
pub struct ChannelSink {
    tx: mpsc::Sender<Update>,
}

impl ChannelSink {
    /// Creates a sink and the receiver the transport task should drain.
    ///
    /// The minimum capacity is 1 (clamped).
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<Update>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }

    /// True once the transport dropped its receiver.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl Publish for ChannelSink {
    fn publish(&self, item: &str, fields: &Fields, is_snapshot: bool) -> Result<(), PublishError> {
        self.tx
            .try_send(Update::new(item, fields, is_snapshot))
            .map_err(|e| match e {
                mpsc::error::TrySendError::Full(_) => PublishError::Full,
                mpsc::error::TrySendError::Closed(_) => PublishError::Closed,
            })
    }

    fn name(&self) -> &'static str {
        "ChannelSink"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(msg: &str) -> Fields {
        Fields::from([("message".to_string(), msg.to_string())])
    }

    #[test]
    fn test_publish_forwards_update() {
        let (sink, mut rx) = ChannelSink::new(4);
        sink.publish("greetings", &fields("Hello"), false).unwrap();

        let update = rx.try_recv().unwrap();
        assert_eq!(&*update.item, "greetings");
        assert_eq!(update.field("message"), Some("Hello"));
        assert!(!update.is_snapshot);
    }

    #[test]
    fn test_full_queue_reports_full() {
        let (sink, _rx) = ChannelSink::new(1);
        sink.publish("a", &fields("1"), false).unwrap();

        let err = sink.publish("a", &fields("2"), false).unwrap_err();
        assert_eq!(err, PublishError::Full);
    }

    #[test]
    fn test_dropped_receiver_reports_closed() {
        let (sink, rx) = ChannelSink::new(4);
        drop(rx);

        assert!(sink.is_closed());
        let err = sink.publish("a", &fields("1"), true).unwrap_err();
        assert_eq!(err, PublishError::Closed);
    }
}
