//! In-memory resource cache and name index
//!
//! Both structures grow monotonically for the lifetime of their endpoint.
//! Locks are taken only for the duration of a single map operation and are
//! never held across an await point.

use super::types::normalize_name;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Mapping from resource id to resolved resource
pub struct ResourceCache<T> {
    entries: RwLock<HashMap<u64, Arc<T>>>,
}

impl<T> ResourceCache<T> {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Cached resource for `id`
    pub fn get(&self, id: u64) -> Option<Arc<T>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
    }

    /// Insert or overwrite the entry for `id`
    pub fn insert(&self, id: u64, value: Arc<T>) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, value);
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> Default for ResourceCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Mapping from lower-cased resource name to resource id
#[derive(Default)]
pub struct NameIndex {
    ids: RwLock<HashMap<String, u64>>,
}

impl NameIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index `name` (normalized) under `id`
    pub fn insert(&self, name: &str, id: u64) {
        self.ids
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(normalize_name(name), id);
    }

    /// Id for `name`, compared case-insensitively
    pub fn lookup(&self, name: &str) -> Option<u64> {
        self.ids
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&normalize_name(name))
            .copied()
    }

    pub fn len(&self) -> usize {
        self.ids.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
