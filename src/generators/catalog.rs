//! # Generator catalog.
//!
//! Maps item names to generator factories. The registry consults the catalog
//! when an item transitions to active and hands the factory to the scheduler,
//! which builds a fresh generator for every ticker it starts; an item without
//! a factory cannot be subscribed.
//!
//! ```text
//! subscribe("greetings") ──► Catalog::factory_for("greetings")
//!                                 └─► Scheduler::activate(item, factory)
//!                                        └─► factory("greetings") ──► Box<dyn Generate>
//! ```
//!
//! ## Example
//! ```rust
//! use feedvisor::{Catalog, Greetings};
//!
//! let catalog = Catalog::new().with_item("greetings", |_| Greetings::new());
//! assert!(catalog.contains("greetings"));
//! assert!(catalog.factory_for("prices").is_none());
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::generators::generate::{Generate, GeneratorBox};

/// Factory producing a fresh generator for an item (receives the item name).
pub type GeneratorFactory = Arc<dyn Fn(&str) -> GeneratorBox + Send + Sync>;

/// Item name → generator factory.
#[derive(Clone, Default)]
pub struct Catalog {
    factories: HashMap<String, GeneratorFactory>,
}

impl Catalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or replaces) the factory for `item`.
    pub fn register<G, F>(&mut self, item: impl Into<String>, factory: F)
    where
        G: Generate,
        F: Fn(&str) -> G + Send + Sync + 'static,
    {
        let factory: GeneratorFactory = Arc::new(move |name| Box::new(factory(name)));
        self.factories.insert(item.into(), factory);
    }

    /// Builder-style [`register`](Self::register).
    pub fn with_item<G, F>(mut self, item: impl Into<String>, factory: F) -> Self
    where
        G: Generate,
        F: Fn(&str) -> G + Send + Sync + 'static,
    {
        self.register(item, factory);
        self
    }

    /// Returns true if a factory is registered for `item`.
    pub fn contains(&self, item: &str) -> bool {
        self.factories.contains_key(item)
    }

    /// Returns the generator factory for `item`, if the item is known.
    pub fn factory_for(&self, item: &str) -> Option<GeneratorFactory> {
        self.factories.get(item).map(Arc::clone)
    }

    /// Returns sorted list of known item names.
    pub fn items(&self) -> Vec<String> {
        let mut names: Vec<String> = self.factories.keys().cloned().collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Catalog")
            .field("items", &self.items())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generators::{GenerateFn, Greetings};
    use crate::update::Fields;

    #[test]
    fn test_each_call_builds_independent_generator() {
        let catalog = Catalog::new().with_item("greetings", |_| Greetings::new());

        let factory = catalog.factory_for("greetings").unwrap();
        let mut a = factory("greetings");
        let mut b = factory("greetings");

        assert_eq!(a.next_fields()["message"], "Hello");
        assert_eq!(a.next_fields()["message"], "World");
        // b has its own toggle.
        assert_eq!(b.next_fields()["message"], "Hello");
    }

    #[test]
    fn test_factory_receives_item_name() {
        let catalog = Catalog::new().with_item("quotes", |item| {
            let item = item.to_string();
            GenerateFn::new("echo", move || Fields::from([("item".into(), item.clone())]))
        });

        let mut g = catalog.factory_for("quotes").unwrap()("quotes");
        assert_eq!(g.next_fields()["item"], "quotes");
    }

    #[test]
    fn test_items_sorted() {
        let catalog = Catalog::new()
            .with_item("b", |_| Greetings::new())
            .with_item("a", |_| Greetings::new());
        assert_eq!(catalog.items(), ["a", "b"]);
        assert!(!catalog.contains("c"));
    }
}
