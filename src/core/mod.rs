//! Runtime core: orchestration and lifecycle.
//!
//! This module contains the embedded implementation of the feedvisor runtime.
//! The public API from this module is [`Feed`] (built with [`FeedBuilder`]),
//! its [`FeedConfig`], and the [`SourceHandle`]/[`Request`] pair used to feed
//! subscription notifications into [`Feed::serve`].
//!
//! Internal modules:
//! - [`feed`]: wires components, serves requests, handles shutdown;
//! - [`registry`]: subscriber counts per item, drives the scheduler;
//! - [`scheduler`]: owns one ticker per active item;
//! - [`ticker`]: generates and publishes updates for a single item;
//! - [`shutdown`]: cross-platform shutdown signal handling;
//! - [`source`]: subscription request channel.

mod builder;
mod config;
mod feed;
mod registry;
mod scheduler;
mod shutdown;
mod source;
mod ticker;

#[cfg(test)]
mod testing;

pub use builder::FeedBuilder;
pub use config::FeedConfig;
pub use feed::Feed;
pub use source::{Request, SourceHandle};
