use crate::data::SessionSnapshot;
use dashmap::DashMap;
use std::sync::Arc;

/// In-process key-value store for session snapshots.
#[derive(Clone, Default)]
pub struct MemoryStateStore {
    snapshots: Arc<DashMap<String, SessionSnapshot>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&self, key: &str, snapshot: SessionSnapshot) {
        self.snapshots.insert(key.to_string(), snapshot);
    }

    pub fn get(&self, key: &str) -> Option<SessionSnapshot> {
        self.snapshots.get(key).map(|s| s.clone())
    }

    pub fn delete(&self, key: &str) -> bool {
        self.snapshots.remove(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}
