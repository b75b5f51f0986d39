//! In-memory cache of indexed pages for interactive sessions.

use std::collections::HashMap;

use crate::types::IndexedPage;

/// Indexed pages keyed by the URL they were requested with.
///
/// Entries never expire; a session refreshes a page explicitly.
#[derive(Debug, Default)]
pub struct ContentCache {
    entries: HashMap<String, IndexedPage>,
}

impl ContentCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(url: &str) -> String {
        url.trim().to_string()
    }

    pub fn get(&self, url: &str) -> Option<&IndexedPage> {
        self.entries.get(&Self::key(url))
    }

    pub fn insert(&mut self, url: &str, page: IndexedPage) {
        self.entries.insert(Self::key(url), page);
    }

    /// Drop a cached page. Returns whether an entry was removed.
    pub fn invalidate(&mut self, url: &str) -> bool {
        self.entries.remove(&Self::key(url)).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
