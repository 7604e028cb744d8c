//! # Global runtime configuration.
//!
//! Provides [`FeedConfig`] centralized settings for the feed runtime.
//!
//! ## Sentinel values
//! - `grace = 0s` → do not wait for tickers on shutdown (abort immediately)
//! - `bus_capacity = 0`, `source_capacity = 0` → clamped to 1

use std::time::Duration;

use crate::policies::CadencePolicy;

/// Global configuration for the feed runtime.
///
/// ## Field semantics
/// - `grace`: Maximum wait for tickers to stop on shutdown
/// - `bus_capacity`: Event bus ring buffer size (min 1)
/// - `source_capacity`: Subscription request queue size (min 1)
/// - `cadence`: Delay policy between two ticks of one item
/// - `handle_signals`: Whether [`Feed::serve`](crate::Feed::serve) listens for OS termination signals
///
/// ## Notes
/// All fields are public for flexibility. Prefer using helper accessors to avoid
/// sprinkling sentinel checks (`0`) across the codebase.
#[derive(Clone, Debug)]
pub struct FeedConfig {
    /// Maximum time to wait for tickers to stop during shutdown.
    ///
    /// Tickers still running after `grace` are aborted and reported as stuck
    /// in `RuntimeError::GraceExceeded`.
    pub grace: Duration,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Slow receivers that lag behind more than `bus_capacity` messages
    /// skip older events.
    pub bus_capacity: usize,

    /// Capacity of the request queue created by [`Feed::source`](crate::Feed::source).
    pub source_capacity: usize,

    /// Tick delay policy applied to every item.
    pub cadence: CadencePolicy,

    /// Listen for SIGINT/SIGTERM/SIGQUIT (Ctrl-C on Windows) while serving.
    pub handle_signals: bool,
}

impl FeedConfig {
    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }

    /// Returns a source capacity clamped to a minimum of 1.
    #[inline]
    pub fn source_capacity_clamped(&self) -> usize {
        self.source_capacity.max(1)
    }
}

impl Default for FeedConfig {
    /// Default configuration:
    ///
    /// - `grace = 60s`
    /// - `bus_capacity = 1024`
    /// - `source_capacity = 256`
    /// - `cadence = CadencePolicy::default()` (1000ms + uniform 2000ms jitter)
    /// - `handle_signals = true`
    fn default() -> Self {
        Self {
            grace: Duration::from_secs(60),
            bus_capacity: 1024,
            source_capacity: 256,
            cadence: CadencePolicy::default(),
            handle_signals: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacities_are_clamped() {
        let cfg = FeedConfig {
            bus_capacity: 0,
            source_capacity: 0,
            ..FeedConfig::default()
        };
        assert_eq!(cfg.bus_capacity_clamped(), 1);
        assert_eq!(cfg.source_capacity_clamped(), 1);
    }
}
