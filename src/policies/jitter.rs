//! # Jitter policy for tick delays.
//!
//! [`JitterPolicy`] adds randomness to the base tick delay so that items
//! activated at the same moment do not publish in synchronized bursts.
//!
//! - [`JitterPolicy::None`]: no randomization, predictable delays
//! - [`JitterPolicy::Uniform`]: random offset in `[0, span)`, millisecond resolution

use rand::Rng;
use std::time::Duration;

/// Policy controlling randomization of tick delays.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum JitterPolicy {
    /// No jitter: every tick uses the exact base delay.
    ///
    /// Use when:
    /// - Only one item is active (no burst risk)
    /// - Predictable timing required
    /// - Testing/debugging
    #[default]
    None,

    /// Uniform jitter: offset drawn uniformly from `[0, span)`.
    ///
    /// The upper bound is exclusive, so `base + offset` never reaches `base + span`.
    Uniform {
        /// Width of the jitter window.
        span: Duration,
    },
}

impl JitterPolicy {
    /// Draws the random offset to add to the base delay.
    pub fn offset(&self) -> Duration {
        match self {
            JitterPolicy::None => Duration::ZERO,
            JitterPolicy::Uniform { span } => uniform_offset(*span),
        }
    }

    /// Upper bound (exclusive) of [`offset`](Self::offset); `ZERO` for `None`.
    pub fn span(&self) -> Duration {
        match self {
            JitterPolicy::None => Duration::ZERO,
            JitterPolicy::Uniform { span } => *span,
        }
    }
}

/// Uniform: random[0, span)
fn uniform_offset(span: Duration) -> Duration {
    let ms = span.as_millis().min(u128::from(u64::MAX)) as u64;
    if ms == 0 {
        return Duration::ZERO;
    }
    let mut rng = rand::rng();
    Duration::from_millis(rng.random_range(0..ms))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_none_is_zero() {
        assert_eq!(JitterPolicy::None.offset(), Duration::ZERO);
        assert_eq!(JitterPolicy::None.span(), Duration::ZERO);
    }

    #[test]
    fn test_zero_span_is_zero() {
        let policy = JitterPolicy::Uniform {
            span: Duration::ZERO,
        };
        assert_eq!(policy.offset(), Duration::ZERO);
    }

    #[test]
    fn test_uniform_stays_below_span() {
        let policy = JitterPolicy::Uniform {
            span: Duration::from_millis(10),
        };
        for _ in 0..1000 {
            assert!(policy.offset() < Duration::from_millis(10));
        }
    }

    #[test]
    fn test_uniform_covers_window() {
        let policy = JitterPolicy::Uniform {
            span: Duration::from_millis(4),
        };
        let mut seen = [false; 4];
        for _ in 0..1000 {
            seen[policy.offset().as_millis() as usize] = true;
        }
        assert!(seen.iter().all(|s| *s), "every offset should appear: {seen:?}");
    }
}
