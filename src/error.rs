//! Error types used by the feedvisor runtime, registry and sinks.
//!
//! This module defines three error enums:
//!
//! - [`RuntimeError`]: errors raised by the feed runtime itself.
//! - [`FeedError`]: errors raised by subscription handling.
//! - [`PublishError`]: delivery failures reported by a [`Publish`](crate::Publish) sink.
//!
//! All of them provide helper methods (`as_label`, `as_message`) for logging/metrics.
//! Ordinary subscription churn is not an error: see [`SubscribeOutcome`] and
//! [`UnsubscribeOutcome`].

use std::time::Duration;
use thiserror::Error;

/// Result of a successful `subscribe(item)` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscribeOutcome {
    /// Item went from inactive to active; its ticker was started.
    Accepted,
    /// Item already had interest; subscriber count grew, no new ticker.
    AlreadyActive,
}

/// Result of a successful `unsubscribe(item)` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnsubscribeOutcome {
    /// One subscriber was removed (the ticker stops when the last one leaves).
    Accepted,
    /// Item had no active interest; nothing changed.
    NotActive,
}

/// # Errors produced by the feedvisor runtime.
///
/// These represent failures in the runtime itself, such as a shutdown
/// sequence exceeding its grace period or a broken registry/scheduler invariant.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Shutdown grace period was exceeded; some tickers did not stop in time.
    #[error("shutdown timeout {grace:?} exceeded; stuck: {stuck:?}")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
        /// Items whose tickers did not stop in time.
        stuck: Vec<String>,
    },

    /// Registry and scheduler disagree about an item; serving was aborted.
    #[error("invariant violated for item {item:?}: ticker already running")]
    InvariantViolated {
        /// The item whose ticker was activated twice.
        item: String,
    },
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use feedvisor::RuntimeError;
    /// use std::time::Duration;
    ///
    /// let err = RuntimeError::GraceExceeded { grace: Duration::from_secs(5), stuck: vec![] };
    /// assert_eq!(err.as_label(), "runtime_grace_exceeded");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::GraceExceeded { .. } => "runtime_grace_exceeded",
            RuntimeError::InvariantViolated { .. } => "runtime_invariant_violated",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RuntimeError::GraceExceeded { grace, stuck } => {
                format!("grace exceeded after {grace:?}; stuck items={stuck:?}")
            }
            RuntimeError::InvariantViolated { item } => {
                format!("double activation of item {item}")
            }
        }
    }
}

/// # Errors produced by subscription handling.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FeedError {
    /// No generator is registered for the requested item.
    #[error("unknown item: {item}")]
    UnknownItem {
        /// The requested item name.
        item: String,
    },

    /// A ticker is already running for this item.
    ///
    /// Only reachable when the registry/scheduler invariant is broken;
    /// [`Feed::serve`](crate::Feed::serve) treats it as fatal.
    #[error("ticker already running for item: {item}")]
    DoubleActivation {
        /// The item that was activated twice.
        item: String,
    },

    /// The feed is shut down or no longer serving its subscription source.
    #[error("feed closed")]
    Closed,
}

impl FeedError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use feedvisor::FeedError;
    ///
    /// let err = FeedError::UnknownItem { item: "prices".into() };
    /// assert_eq!(err.as_label(), "feed_unknown_item");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            FeedError::UnknownItem { .. } => "feed_unknown_item",
            FeedError::DoubleActivation { .. } => "feed_double_activation",
            FeedError::Closed => "feed_closed",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            FeedError::UnknownItem { item } => format!("unknown item: {item}"),
            FeedError::DoubleActivation { item } => format!("double activation: {item}"),
            FeedError::Closed => "feed closed".to_string(),
        }
    }

    /// Indicates whether the error breaks a runtime invariant.
    ///
    /// # Example
    /// ```
    /// use feedvisor::FeedError;
    ///
    /// assert!(FeedError::DoubleActivation { item: "x".into() }.is_fatal());
    /// assert!(!FeedError::Closed.is_fatal());
    /// ```
    pub fn is_fatal(&self) -> bool {
        matches!(self, FeedError::DoubleActivation { .. })
    }
}

/// # Delivery failures reported by a publish sink.
///
/// Always transient from the scheduler's point of view: the ticker reports
/// the failure and keeps its schedule.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PublishError {
    /// The sink's outbound queue is full.
    #[error("sink queue full")]
    Full,

    /// The upstream side of the sink is gone (connection lost).
    #[error("sink closed")]
    Closed,

    /// The sink refused the update.
    #[error("update rejected: {reason}")]
    Rejected {
        /// Sink-provided reason.
        reason: String,
    },
}

impl PublishError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            PublishError::Full => "publish_full",
            PublishError::Closed => "publish_closed",
            PublishError::Rejected { .. } => "publish_rejected",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            PublishError::Full => "sink queue full".to_string(),
            PublishError::Closed => "sink closed".to_string(),
            PublishError::Rejected { reason } => format!("rejected by sink: {reason}"),
        }
    }
}
