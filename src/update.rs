//! # Update records.
//!
//! [`Fields`] is the field-name → value mapping produced by a generator and
//! handed to a sink. [`Update`] is its owned form, used by sinks that move
//! updates across tasks (see [`ChannelSink`](crate::ChannelSink)).
//!
//! Updates are transient: produced, published, dropped. Nothing in the core
//! retains them.

use std::collections::BTreeMap;
use std::sync::Arc;

/// Field values of one update, ordered by field name.
pub type Fields = BTreeMap<String, String>;

/// Owned update record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Update {
    /// Item the update belongs to.
    pub item: Arc<str>,
    /// Field values.
    pub fields: Fields,
    /// `true` if the update carries full state rather than a delta.
    pub is_snapshot: bool,
}

impl Update {
    /// Creates an update by copying the borrowed parts handed to a sink.
    pub fn new(item: &str, fields: &Fields, is_snapshot: bool) -> Self {
        Self {
            item: Arc::from(item),
            fields: fields.clone(),
            is_snapshot,
        }
    }

    /// Returns a field value by name.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}
