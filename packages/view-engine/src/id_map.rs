//! Bidirectional slot-id/stable-id cache (C2, spec.md §4.2).
//!
//! The real id-mapping service is an out-of-scope external collaborator
//! (spec.md §1) shared with other subsystems; this module only defines the
//! narrow trait the engine calls through, plus a reference in-memory
//! implementation for tests and simple embedders. Grounded in the
//! `RwLock<HashMap<...>>` pattern the teacher's failure detectors use for
//! shared per-node state (`cluster/failure_detector.rs`).

use std::collections::HashMap;

use parking_lot::RwLock;

/// `stableIdOf`/`clearCache` from spec.md §4.2.
///
/// `clear_cache` must be safe to call concurrently with lookups from the
/// engine's call path (spec.md §5): the only contract is that the next
/// lookup after a clear observes fresh data.
pub trait IdMap: Send + Sync {
    fn stable_id_of(&self, slot_id: i64) -> Option<String>;
    fn clear_cache(&self);
}

/// Reference in-memory `IdMap`. Populated externally (by whatever keeps the
/// real bidirectional cache in sync); `clear_cache` simply drops all
/// entries, so a cleared map resolves nothing until repopulated.
#[derive(Debug, Default)]
pub struct CachingIdMap {
    entries: RwLock<HashMap<i64, String>>,
}

impl CachingIdMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the mapping for a slot id.
    pub fn insert(&self, slot_id: i64, stable_id: impl Into<String>) {
        self.entries.write().insert(slot_id, stable_id.into());
    }
}

impl IdMap for CachingIdMap {
    fn stable_id_of(&self, slot_id: i64) -> Option<String> {
        self.entries.read().get(&slot_id).cloned()
    }

    fn clear_cache(&self) {
        self.entries.write().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_inserted_mapping() {
        let map = CachingIdMap::new();
        map.insert(1, "stable-1");
        assert_eq!(map.stable_id_of(1), Some("stable-1".to_string()));
        assert_eq!(map.stable_id_of(2), None);
    }

    #[test]
    fn clear_cache_drops_all_entries() {
        let map = CachingIdMap::new();
        map.insert(1, "stable-1");
        map.clear_cache();
        assert_eq!(map.stable_id_of(1), None);
    }
}
