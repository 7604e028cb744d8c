//! # Publish sinks.
//!
//! - [`Publish`] - the `publish(item, fields, is_snapshot)` contract
//! - [`ChannelSink`] - bounded `mpsc` hand-off to a transport task

mod channel;
mod publish;

pub use channel::ChannelSink;
pub use publish::Publish;
