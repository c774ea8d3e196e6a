//! Observed update events.

use serde::{Deserialize, Serialize};

/// One released item (chapter or episode) of a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UpdateEvent {
    /// Source-declared publish time in epoch milliseconds (0 if unknown).
    pub upload_timestamp: i64,
    /// Time the item was first seen locally, in epoch milliseconds.
    pub fetch_timestamp: i64,
    /// True if the item is a cross-posted release of an item already present.
    #[serde(default)]
    pub duplicate: bool,
}

impl UpdateEvent {
    /// Creates an event.
    #[must_use]
    pub const fn new(upload_timestamp: i64, fetch_timestamp: i64) -> Self {
        Self {
            upload_timestamp,
            fetch_timestamp,
            duplicate: false,
        }
    }

    /// Marks the event as a cross-posted duplicate.
    #[must_use]
    pub const fn as_duplicate(mut self) -> Self {
        self.duplicate = true;
        self
    }

    /// Returns true if the source declared a publish time.
    #[must_use]
    pub const fn has_upload_date(&self) -> bool {
        self.upload_timestamp > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_defaults_to_false() {
        let event: UpdateEvent =
            serde_json::from_str(r#"{"upload_timestamp":0,"fetch_timestamp":1000}"#).unwrap();
        assert!(!event.duplicate);
        assert!(!event.has_upload_date());
    }

    #[test]
    fn test_as_duplicate() {
        let event = UpdateEvent::new(10, 20).as_duplicate();
        assert!(event.duplicate);
        assert!(event.has_upload_date());
    }
}
