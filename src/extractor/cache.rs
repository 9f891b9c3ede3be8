//! In-memory cache of extraction results.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::model::ExtractedConfig;

/// Application name to extraction result, shared between callers and batch
/// workers.
///
/// Entries are immutable once inserted; there is no eviction. A fresh cache
/// (or a fresh process) is the only way to force re-extraction.
#[derive(Debug, Default)]
pub struct ExtractionCache {
    entries: RwLock<HashMap<String, Arc<ExtractedConfig>>>,
}

impl ExtractionCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached result for `app`, if any.
    #[must_use]
    pub fn get(&self, app: &str) -> Option<Arc<ExtractedConfig>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(app)
            .cloned()
    }

    /// Stores `config` under its application name.
    ///
    /// If another writer got there first, the existing entry is kept and
    /// returned.
    pub fn insert(&self, config: ExtractedConfig) -> Arc<ExtractedConfig> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(
            entries
                .entry(config.app.clone())
                .or_insert_with(|| Arc::new(config)),
        )
    }

    /// Returns true if `app` has a cached result.
    #[must_use]
    pub fn contains(&self, app: &str) -> bool {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(app)
    }

    /// Number of cached applications.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns true if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
