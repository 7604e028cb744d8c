//! # Cadence policy for item tickers.
//!
//! [`CadencePolicy`] controls how long a ticker waits between two updates.
//! It is parameterized by:
//! - [`CadencePolicy::base`] the fixed part of the delay;
//! - [`CadencePolicy::jitter`] the randomized part added on top.
//!
//! Every delay is drawn independently; previous delays never feed back into
//! the next one. The first tick after activation is not subject to the
//! cadence at all: it fires immediately.
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use feedvisor::{CadencePolicy, JitterPolicy};
//!
//! let cadence = CadencePolicy {
//!     base: Duration::from_millis(1000),
//!     jitter: JitterPolicy::Uniform { span: Duration::from_millis(2000) },
//! };
//!
//! let d = cadence.next();
//! assert!(d >= Duration::from_millis(1000) && d < Duration::from_millis(3000));
//! ```

use std::time::Duration;

use crate::policies::jitter::JitterPolicy;

/// Tick delay policy: `base + jitter`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CadencePolicy {
    /// Fixed delay between two ticks.
    pub base: Duration,
    /// Random offset added to `base`.
    pub jitter: JitterPolicy,
}

impl Default for CadencePolicy {
    /// Returns a cadence with:
    /// - `base = 1000ms`;
    /// - `jitter = Uniform { span: 2000ms }`.
    ///
    /// Delays therefore fall in `[1000ms, 3000ms)`.
    fn default() -> Self {
        Self {
            base: Duration::from_millis(1000),
            jitter: JitterPolicy::Uniform {
                span: Duration::from_millis(2000),
            },
        }
    }
}

impl CadencePolicy {
    /// Fixed cadence without jitter.
    pub fn fixed(base: Duration) -> Self {
        Self {
            base,
            jitter: JitterPolicy::None,
        }
    }

    /// Draws the delay before the next tick.
    pub fn next(&self) -> Duration {
        self.base.saturating_add(self.jitter.offset())
    }

    /// Inclusive lower and exclusive upper bound of [`next`](Self::next).
    ///
    /// For a fixed cadence both bounds equal `base`.
    pub fn bounds(&self) -> (Duration, Duration) {
        (self.base, self.base.saturating_add(self.jitter.span()))
    }
}
