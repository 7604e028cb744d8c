//! # Greetings generator
//!
//! Produces two fields per update:
//! - `timestamp`: current wall-clock time, RFC 3339 UTC with milliseconds;
//! - `message`: `"Hello"` and `"World"`, strictly alternating, starting with `"Hello"`.
//!
//! ## Example output
//! ```text
//! {timestamp: "2026-10-19T08:15:02.114Z", message: "Hello"}
//! {timestamp: "2026-10-19T08:15:04.530Z", message: "World"}
//! {timestamp: "2026-10-19T08:15:05.871Z", message: "Hello"}
//! ```

use chrono::{SecondsFormat, Utc};

use crate::generators::generate::Generate;
use crate::update::Fields;

/// Field holding the update's wall-clock time.
pub const TIMESTAMP_FIELD: &str = "timestamp";
/// Field holding the alternating greeting.
pub const MESSAGE_FIELD: &str = "message";

const MESSAGES: [&str; 2] = ["Hello", "World"];

/// Alternating greetings generator.
#[derive(Debug, Default)]
pub struct Greetings {
    ticks: u64,
}

impl Greetings {
    /// Construct a new [`Greetings`] generator; the first message is `"Hello"`.
    #[must_use]
    pub fn new() -> Self {
        Self { ticks: 0 }
    }

    fn next_message(&mut self) -> &'static str {
        let msg = MESSAGES[(self.ticks % 2) as usize];
        self.ticks = self.ticks.wrapping_add(1);
        msg
    }
}

impl Generate for Greetings {
    fn name(&self) -> &str {
        "greetings"
    }

    fn next_fields(&mut self) -> Fields {
        let message = self.next_message();
        Fields::from([
            (
                TIMESTAMP_FIELD.to_string(),
                Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            ),
            (MESSAGE_FIELD.to_string(), message.to_string()),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    #[test]
    fn test_messages_alternate_starting_with_hello() {
        let mut g = Greetings::new();
        let got: Vec<String> = (0..5)
            .map(|_| g.next_fields()[MESSAGE_FIELD].clone())
            .collect();
        assert_eq!(got, ["Hello", "World", "Hello", "World", "Hello"]);
    }

    #[test]
    fn test_timestamp_is_rfc3339_utc() {
        let mut g = Greetings::new();
        let fields = g.next_fields();
        let ts = &fields[TIMESTAMP_FIELD];

        assert!(ts.ends_with('Z'), "not UTC: {ts}");
        assert!(DateTime::parse_from_rfc3339(ts).is_ok(), "not RFC 3339: {ts}");
        assert_eq!(fields.len(), 2);
    }
}
