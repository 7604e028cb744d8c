//! # Built-in subscribers
//!
//! - [`LogWriter`]: renders events through `tracing` with structured fields.

mod log;

pub use log::LogWriter;
