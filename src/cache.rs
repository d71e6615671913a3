//! Bounded keyed caches for resolved schema nodes.
//!
//! Three independent caches (schemas, compositions, references) share one
//! configuration. Eviction is insertion-order, not LRU: overflow drops the
//! oldest tenth, and memory-pressure cleanup drops an explicit fraction.

use indexmap::IndexMap;
use serde::Serialize;

use crate::node::SchemaNode;

/// Default per-cache entry bound.
pub const DEFAULT_MAX_CACHE_SIZE: usize = 1000;

/// Cache behavior shared by all three caches.
#[derive(Debug, Clone, Copy)]
pub struct CacheConfig {
    /// When false, lookups and inserts are bypassed entirely and every call
    /// recomputes.
    pub enabled: bool,
    /// Entry bound per cache.
    pub max_size: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            enabled: true,
            max_size: DEFAULT_MAX_CACHE_SIZE,
        }
    }
}

/// One insertion-ordered keyed store with a size bound and byte accounting.
#[derive(Debug, Default)]
pub struct ResolutionCache {
    entries: IndexMap<String, (SchemaNode, usize)>,
    bytes: usize,
}

impl ResolutionCache {
    pub fn get(&self, key: &str) -> Option<&SchemaNode> {
        self.entries.get(key).map(|(node, _)| node)
    }

    /// Insert an entry, then evict the oldest tenth if the bound is now
    /// exceeded. Returns the number of evicted entries.
    pub fn insert(&mut self, key: String, node: SchemaNode, max_size: usize) -> usize {
        let cost = node.estimated_size();
        if let Some((_, old_cost)) = self.entries.insert(key, (node, cost)) {
            self.bytes -= old_cost;
        }
        self.bytes += cost;

        if self.entries.len() > max_size {
            self.evict_oldest((self.entries.len() / 10).max(1))
        } else {
            0
        }
    }

    /// Remove exactly `floor(len × fraction)` oldest entries. Returns the
    /// number removed.
    pub fn evict_fraction(&mut self, fraction: f64) -> usize {
        let fraction = fraction.clamp(0.0, 1.0);
        let count = (self.entries.len() as f64 * fraction).floor() as usize;
        self.evict_oldest(count)
    }

    fn evict_oldest(&mut self, count: usize) -> usize {
        let count = count.min(self.entries.len());
        for (_, (_, cost)) in self.entries.drain(0..count) {
            self.bytes -= cost;
        }
        count
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Estimated footprint of the cached nodes, in bytes.
    pub fn bytes(&self) -> usize {
        self.bytes
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.bytes = 0;
    }
}

/// The three engine caches behind one shared configuration.
#[derive(Debug, Default)]
pub struct CacheManager {
    config: CacheConfig,
    schemas: ResolutionCache,
    compositions: ResolutionCache,
    references: ResolutionCache,
}

impl CacheManager {
    pub fn new() -> CacheManager {
        CacheManager::default()
    }

    /// Apply a new configuration, trimming caches that now exceed the bound.
    pub fn configure(&mut self, config: CacheConfig) {
        self.config = config;
        for cache in [
            &mut self.schemas,
            &mut self.compositions,
            &mut self.references,
        ] {
            if cache.len() > config.max_size {
                let excess = cache.len() - config.max_size;
                cache.evict_oldest(excess);
            }
        }
    }

    pub fn enabled(&self) -> bool {
        self.config.enabled
    }

    pub fn get_schema(&self, key: &str) -> Option<&SchemaNode> {
        self.schemas.get(key)
    }

    pub fn insert_schema(&mut self, key: String, node: SchemaNode) -> usize {
        self.schemas.insert(key, node, self.config.max_size)
    }

    pub fn get_composition(&self, key: &str) -> Option<&SchemaNode> {
        self.compositions.get(key)
    }

    pub fn insert_composition(&mut self, key: String, node: SchemaNode) -> usize {
        self.compositions.insert(key, node, self.config.max_size)
    }

    pub fn get_reference(&self, key: &str) -> Option<&SchemaNode> {
        self.references.get(key)
    }

    pub fn insert_reference(&mut self, key: String, node: SchemaNode) -> usize {
        self.references.insert(key, node, self.config.max_size)
    }

    /// Drop the given fraction of oldest entries from every cache. Returns
    /// the total number evicted.
    pub fn evict_fraction(&mut self, fraction: f64) -> usize {
        self.schemas.evict_fraction(fraction)
            + self.compositions.evict_fraction(fraction)
            + self.references.evict_fraction(fraction)
    }

    /// Empty all three caches unconditionally.
    pub fn clear_all(&mut self) {
        self.schemas.clear();
        self.compositions.clear();
        self.references.clear();
    }

    /// Estimated footprint across all three caches, in bytes.
    pub fn estimated_bytes(&self) -> usize {
        self.schemas.bytes() + self.compositions.bytes() + self.references.bytes()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            enabled: self.config.enabled,
            max_size: self.config.max_size,
            schemas: self.schemas.len(),
            compositions: self.compositions.len(),
            references: self.references.len(),
        }
    }
}

/// Current cache sizes and the configured bound.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub enabled: bool,
    pub max_size: usize,
    pub schemas: usize,
    pub compositions: usize,
    pub references: usize,
}

impl CacheStats {
    /// Entries across all three caches.
    pub fn total(&self) -> usize {
        self.schemas + self.compositions + self.references
    }
}
