//! Tick scheduling policies.
//!
//! This module groups the knobs that control **how long** an item ticker
//! waits between two updates.
//!
//! ## Contents
//! - [`CadencePolicy`] base delay plus jitter
//! - [`JitterPolicy`]  randomization strategy to avoid synchronized bursts
//!
//! ## Quick wiring
//! ```text
//! FeedConfig { cadence: CadencePolicy, .. }
//!      └─► core::ticker::Ticker uses cadence.next() after every tick
//! ```
//!
//! ## Defaults
//! - `CadencePolicy::default()` → base=1000ms, jitter=Uniform{2000ms}.
//! - `JitterPolicy::None` by default.

mod cadence;
mod jitter;

pub use cadence::CadencePolicy;
pub use jitter::JitterPolicy;
