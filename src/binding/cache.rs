//! Parsed-binding cache keyed by raw template

use dashmap::DashMap;

use super::types::Binding;

/// Concurrent template → bindings cache
///
/// Entries are cloned on the way in and out, so callers can never mutate a
/// cached list. Nothing is evicted.
#[derive(Debug, Default)]
pub struct BindingCache {
    entries: DashMap<String, Vec<Binding>>,
}

impl BindingCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, template: &str) -> Option<Vec<Binding>> {
        self.entries.get(template).map(|entry| entry.value().clone())
    }

    pub fn insert(&self, template: &str, bindings: &[Binding]) {
        self.entries.insert(template.to_string(), bindings.to_vec());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}
