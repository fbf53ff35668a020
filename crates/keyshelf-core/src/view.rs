//! Per-record presentation state kept apart from the persisted records.

use std::collections::HashSet;

use crate::mask::mask_key;
use crate::models::KeyRecord;

/// Tracks which records are currently shown unmasked, keyed by record id.
#[derive(Debug, Clone, Default)]
pub struct KeyViewState {
    visible: HashSet<String>,
}

impl KeyViewState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip visibility for `id`; returns the new state.
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.visible.remove(id) {
            false
        } else {
            self.visible.insert(id.to_string());
            true
        }
    }

    pub fn reveal(&mut self, id: &str) {
        self.visible.insert(id.to_string());
    }

    pub fn hide(&mut self, id: &str) {
        self.visible.remove(id);
    }

    pub fn is_visible(&self, id: &str) -> bool {
        self.visible.contains(id)
    }

    /// The value to render for `record`: plain when revealed, masked otherwise.
    pub fn display_value(&self, record: &KeyRecord) -> String {
        if self.is_visible(&record.id) {
            record.value.clone()
        } else {
            mask_key(&record.value)
        }
    }

    /// Forget ids that no longer exist in `records`.
    pub fn retain_existing(&mut self, records: &[KeyRecord]) {
        let live: HashSet<&str> = records.iter().map(|record| record.id.as_str()).collect();
        self.visible.retain(|id| live.contains(id.as_str()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(id: &str) -> KeyRecord {
        KeyRecord {
            id: id.to_string(),
            name: "My App".to_string(),
            value: "sk-abcdef1234567890".to_string(),
            key_type: "dev".to_string(),
            usage: 0,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_masked_by_default() {
        let view = KeyViewState::new();
        let key = record("a");
        assert!(!view.is_visible("a"));
        assert_eq!(view.display_value(&key), format!("sk-{}", "*".repeat(32)));
    }

    #[test]
    fn test_toggle() {
        let mut view = KeyViewState::new();
        let key = record("a");

        assert!(view.toggle("a"));
        assert_eq!(view.display_value(&key), "sk-abcdef1234567890");

        assert!(!view.toggle("a"));
        assert!(!view.is_visible("a"));
    }

    #[test]
    fn test_visibility_is_per_record() {
        let mut view = KeyViewState::new();
        view.reveal("a");
        assert!(view.is_visible("a"));
        assert!(!view.is_visible("b"));

        view.hide("a");
        assert!(!view.is_visible("a"));
    }

    #[test]
    fn test_retain_existing_drops_deleted_ids() {
        let mut view = KeyViewState::new();
        view.reveal("a");
        view.reveal("gone");

        view.retain_existing(&[record("a"), record("b")]);
        assert!(view.is_visible("a"));
        assert!(!view.is_visible("gone"));
    }
}
