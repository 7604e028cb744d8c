//! # Function-backed generator (`GenerateFn`)
//!
//! [`GenerateFn`] wraps a closure `F: FnMut() -> Fields`. The closure is owned
//! by exactly one ticker, so captured state needs no `Mutex`.
//!
//! ## Example
//! ```rust
//! use feedvisor::{Fields, Generate, GenerateFn};
//!
//! let mut n = 0u32;
//! let mut g = GenerateFn::new("counter", move || {
//!     n += 1;
//!     Fields::from([("n".to_string(), n.to_string())])
//! });
//!
//! assert_eq!(g.name(), "counter");
//! assert_eq!(g.next_fields()["n"], "1");
//! ```

use std::borrow::Cow;

use crate::generators::generate::{Generate, GeneratorBox};
use crate::update::Fields;

/// Function-backed generator implementation.
#[derive(Debug)]
pub struct GenerateFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> GenerateFn<F> {
    /// Creates a new function-backed generator.
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<F> GenerateFn<F>
where
    F: FnMut() -> Fields + Send + 'static,
{
    /// Creates the generator and returns it boxed, ready for the scheduler.
    pub fn boxed(name: impl Into<Cow<'static, str>>, f: F) -> GeneratorBox {
        Box::new(Self::new(name, f))
    }
}

impl<F> Generate for GenerateFn<F>
where
    F: FnMut() -> Fields + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn next_fields(&mut self) -> Fields {
        (self.f)()
    }
}
