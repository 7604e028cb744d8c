//! # Field value generators.
//!
//! A [`Generate`] implementation computes the field values of the next update
//! for one item. The scheduler hands each item ticker its **own** generator at
//! activation time, so implementations may keep mutable state (counters,
//! toggles) without any synchronization.

use crate::update::Fields;

/// # Per-item field generator.
///
/// # Example
/// ```
/// use feedvisor::{Fields, Generate};
///
/// struct Counter(u64);
///
/// impl Generate for Counter {
///     fn name(&self) -> &str { "counter" }
///
///     fn next_fields(&mut self) -> Fields {
///         self.0 += 1;
///         Fields::from([("n".to_string(), self.0.to_string())])
///     }
/// }
///
/// let mut c = Counter(0);
/// assert_eq!(c.next_fields()["n"], "1");
/// assert_eq!(c.next_fields()["n"], "2");
/// ```
pub trait Generate: Send + 'static {
    /// Returns a stable, human-readable generator name.
    fn name(&self) -> &str;

    /// Computes the field values of the next update.
    fn next_fields(&mut self) -> Fields;
}

/// Boxed generator, as stored by a ticker.
pub type GeneratorBox = Box<dyn Generate>;
