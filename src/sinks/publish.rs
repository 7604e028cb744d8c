//! # Publish sink contract
//!
//! `Publish` is the seam between the scheduler and the upstream distribution
//! server. Every item ticker calls [`Publish::publish`] once per tick.
//!
//! ## Contract
//! - The call is **synchronous** and must not block: hand the update to a
//!   queue or buffered writer and return. Tickers hold the item's gate while
//!   calling it, so a slow sink delays that item's deactivation.
//! - The sink is shared by all tickers and may be called concurrently.
//! - Failures are transient from the core's point of view: they are reported
//!   as [`PublishFailed`](crate::EventKind::PublishFailed) events and the
//!   ticker keeps its schedule.
//!
//! ## Example
//! ```rust
//! use feedvisor::{Fields, Publish, PublishError};
//!
//! struct Stdout;
//!
//! impl Publish for Stdout {
//!     fn publish(&self, item: &str, fields: &Fields, is_snapshot: bool) -> Result<(), PublishError> {
//!         println!("{item} snapshot={is_snapshot} {fields:?}");
//!         Ok(())
//!     }
//! }
//! ```

use crate::error::PublishError;
use crate::update::Fields;

/// Contract for publish sinks.
pub trait Publish: Send + Sync + 'static {
    /// Delivers one update for `item`.
    fn publish(&self, item: &str, fields: &Fields, is_snapshot: bool) -> Result<(), PublishError>;

    /// Human-readable name (for logs/metrics).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
