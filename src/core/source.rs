//! # Subscription event source.
//!
//! The upstream distribution server tells the adapter which items it wants.
//! Whatever speaks that protocol turns each notification into a [`Request`]
//! and sends it to the feed; the feed answers on the request's reply channel.
//!
//! ```text
//! protocol task ──► SourceHandle::subscribe("greetings") ──► [request queue]
//!                                                               │
//!                                            Feed::serve ◄──────┘
//!                                               └─► Registry::subscribe
//!                                                      └─► reply (oneshot) ──► protocol task
//! ```

use tokio::sync::{mpsc, oneshot};

use crate::error::{FeedError, SubscribeOutcome, UnsubscribeOutcome};

/// A subscription notification awaiting an answer.
#[derive(Debug)]
pub enum Request {
    /// Upstream wants updates for `item`.
    Subscribe {
        item: String,
        reply: oneshot::Sender<Result<SubscribeOutcome, FeedError>>,
    },
    /// Upstream no longer wants updates for `item`.
    Unsubscribe {
        item: String,
        reply: oneshot::Sender<UnsubscribeOutcome>,
    },
}

impl Request {
    /// Item the request refers to.
    pub fn item(&self) -> &str {
        match self {
            Request::Subscribe { item, .. } | Request::Unsubscribe { item, .. } => item,
        }
    }
}

/// Handle for submitting subscription requests to a serving feed.
#[derive(Clone, Debug)]
pub struct SourceHandle {
    tx: mpsc::Sender<Request>,
}

impl SourceHandle {
    /// Creates a handle and the receiver to pass to [`Feed::serve`](crate::Feed::serve).
    ///
    /// The minimum capacity is 1 (clamped).
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<Request>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }

    /// Requests updates for `item` and waits for the registry's answer.
    ///
    /// Returns [`FeedError::Closed`] if the feed is not serving anymore.
    pub async fn subscribe(&self, item: impl Into<String>) -> Result<SubscribeOutcome, FeedError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Request::Subscribe {
                item: item.into(),
                reply,
            })
            .await
            .map_err(|_| FeedError::Closed)?;
        rx.await.map_err(|_| FeedError::Closed)?
    }

    /// Withdraws interest in `item` and waits for the registry's answer.
    ///
    /// Returns [`FeedError::Closed`] if the feed is not serving anymore.
    pub async fn unsubscribe(
        &self,
        item: impl Into<String>,
    ) -> Result<UnsubscribeOutcome, FeedError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Request::Unsubscribe {
                item: item.into(),
                reply,
            })
            .await
            .map_err(|_| FeedError::Closed)?;
        rx.await.map_err(|_| FeedError::Closed)
    }

    /// True once the feed dropped the receiving side.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_dropped_receiver_is_closed() {
        let (handle, rx) = SourceHandle::channel(1);
        drop(rx);

        assert!(handle.is_closed());
        assert_eq!(handle.subscribe("a").await, Err(FeedError::Closed));
        assert_eq!(handle.unsubscribe("a").await, Err(FeedError::Closed));
    }

    #[tokio::test]
    async fn test_request_carries_item_and_reply() {
        let (handle, mut rx) = SourceHandle::channel(1);

        let server = tokio::spawn(async move {
            let req = rx.recv().await.unwrap();
            assert_eq!(req.item(), "greetings");
            match req {
                Request::Subscribe { reply, .. } => {
                    let _ = reply.send(Ok(SubscribeOutcome::Accepted));
                }
                Request::Unsubscribe { .. } => panic!("unexpected unsubscribe"),
            }
        });

        assert_eq!(
            handle.subscribe("greetings").await,
            Ok(SubscribeOutcome::Accepted)
        );
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_dropped_reply_is_closed() {
        let (handle, mut rx) = SourceHandle::channel(1);

        tokio::spawn(async move {
            let req = rx.recv().await.unwrap();
            drop(req);
        });

        assert_eq!(handle.unsubscribe("a").await, Err(FeedError::Closed));
    }
}
