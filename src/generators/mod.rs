//! # Generators: per-item field value producers.
//!
//! This module provides the generator-related types:
//! - [`Generate`] - trait computing the next update's fields
//! - [`GenerateFn`] - closure-backed generator
//! - [`Greetings`] - alternating `Hello`/`World` generator
//! - [`Catalog`] - item name → generator factory

mod catalog;
mod generate;
mod generate_fn;
mod greetings;

pub use catalog::{Catalog, GeneratorFactory};
pub use generate::{Generate, GeneratorBox};
pub use generate_fn::GenerateFn;
pub use greetings::{Greetings, MESSAGE_FIELD, TIMESTAMP_FIELD};
