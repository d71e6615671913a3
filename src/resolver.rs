//! The resolution engine: reference resolution with cycle detection,
//! composition resolution, and schema enumeration, backed by the cache
//! manager and instrumented through the metrics sink.
//!
//! A [`Resolver`] is one resolution session. Documents are read-only input;
//! every resolved node is new. The active reference path is a value
//! ([`VisitedPath`]) threaded through recursion, so cycle detection holds
//! even when a resolution suspends at an external fetch.

use std::fmt;
use std::time::Instant;

use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, trace};

use crate::cache::{CacheConfig, CacheManager, CacheStats};
use crate::compose;
use crate::document::Document;
use crate::error::ResolveError;
use crate::external::{ExternalConfig, ExternalResolver};
use crate::metrics::{MemoryConfig, MemoryStats, Metrics, MetricsConfig, MetricsReport};
use crate::node::{CompositionKind, CompositionNode, SchemaNode, Variant};
use crate::reference::ParsedReference;

/// Registry size above which streaming mode batches enumeration.
const STREAMING_THRESHOLD: usize = 50;

/// Schemas per enumeration batch under streaming mode.
const STREAMING_BATCH_SIZE: usize = 25;

/// Fraction of oldest cache entries dropped by a memory-pressure cleanup.
const MEMORY_CLEANUP_FRACTION: f64 = 0.5;

/// The active reference path of one resolution call.
///
/// Recursion extends a copy rather than mutating in place: a suspended
/// resolution keeps the exact path it started with, and independent
/// top-level calls never share state.
#[derive(Debug, Clone, Default)]
pub struct VisitedPath {
    references: Vec<String>,
}

impl VisitedPath {
    pub fn new() -> VisitedPath {
        VisitedPath::default()
    }

    pub fn contains(&self, reference: &str) -> bool {
        self.references.iter().any(|r| r == reference)
    }

    /// A new path with `reference` appended.
    pub fn with(&self, reference: &str) -> VisitedPath {
        let mut references = self.references.clone();
        references.push(reference.to_string());
        VisitedPath { references }
    }

    pub fn len(&self) -> usize {
        self.references.len()
    }

    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
    }
}

impl fmt::Display for VisitedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.references.join(" -> "))
    }
}

/// A resolution session: three caches, metrics, and external fetching
/// behind the resolve and enumerate entry points.
#[derive(Debug, Default)]
pub struct Resolver {
    caches: CacheManager,
    metrics: Metrics,
    external: ExternalResolver,
    memory: MemoryConfig,
}

impl Resolver {
    pub fn new() -> Resolver {
        Resolver::default()
    }

    /// A resolver with custom external-fetch behavior.
    pub fn with_external(config: ExternalConfig) -> Resolver {
        Resolver {
            external: ExternalResolver::new(config),
            ..Resolver::default()
        }
    }

    pub fn configure_caching(&mut self, config: CacheConfig) {
        self.caches.configure(config);
    }

    pub fn configure_memory_optimization(&mut self, config: MemoryConfig) {
        self.memory = config;
    }

    pub fn configure_metrics(&mut self, config: MetricsConfig) {
        self.metrics.configure(config);
    }

    pub fn configure_external(&mut self, config: ExternalConfig) {
        self.external.configure(config);
    }

    /// Empty all three caches plus memoized external fetches.
    pub fn clear_all_caches(&mut self) {
        self.caches.clear_all();
        self.external.clear();
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.caches.stats()
    }

    pub fn memory_stats(&self) -> MemoryStats {
        MemoryStats {
            enabled: self.memory.enabled,
            streaming_mode: self.memory.streaming_mode,
            memory_threshold: self.memory.memory_threshold,
            estimated_bytes: self.caches.estimated_bytes(),
            peak_bytes: self.metrics.peak_bytes(),
            schemas_processed: self.metrics.schemas_processed(),
            cleanups: self.metrics.cleanups(),
        }
    }

    pub fn metrics_report(&self) -> MetricsReport {
        self.metrics.report()
    }

    /// Resolve a `$ref` pointer against a document.
    ///
    /// # Errors
    ///
    /// Fails with [`ResolveError::MalformedReference`] on grammar
    /// violations, [`ResolveError::ReferenceNotFound`] for a missing local
    /// entry, [`ResolveError::ExternalResolutionFailed`] wrapping external
    /// fetch problems, and [`ResolveError::CircularReference`] on cycles.
    pub fn resolve_reference(
        &mut self,
        document: &Document,
        reference: &str,
    ) -> Result<SchemaNode, ResolveError> {
        self.resolve_reference_from(document, reference, &VisitedPath::new())
    }

    /// Resolve a `$ref` pointer with an explicit active path.
    ///
    /// Consumers walking nested references thread the path through so a
    /// pointer back to an ancestor fails instead of looping. The cycle check
    /// runs before the cache lookup: a reference already on the path fails
    /// regardless of cache state. A cache hit is terminal, returning the
    /// stored node without recursing.
    pub fn resolve_reference_from(
        &mut self,
        document: &Document,
        reference: &str,
        visited: &VisitedPath,
    ) -> Result<SchemaNode, ResolveError> {
        let started = Instant::now();

        if visited.contains(reference) {
            debug!(%reference, path = %visited, "reference cycle detected");
            return Err(ResolveError::CircularReference {
                reference: reference.to_string(),
            });
        }

        let key = reference_key(document, reference);
        if self.caches.enabled() {
            if let Some(node) = self.caches.get_reference(&key) {
                self.metrics.record_hit();
                let node = node.clone();
                self.metrics.observe("resolve_reference", started.elapsed());
                return Ok(node);
            }
            self.metrics.record_miss();
        }

        trace!(%reference, depth = visited.len(), "resolving reference");
        let raw = self.lookup(document, reference)?;
        let visited = visited.with(reference);
        let node = self.resolve_value(document, &raw, &visited)?;

        if self.caches.enabled() {
            let evicted = self.caches.insert_reference(key, node.clone());
            self.metrics.record_evictions(evicted);
            self.metrics.note_memory(self.caches.estimated_bytes());
        }

        self.metrics.observe("resolve_reference", started.elapsed());
        Ok(node)
    }

    /// Fetch the raw value a reference points at, local or external.
    fn lookup(&mut self, document: &Document, reference: &str) -> Result<Value, ResolveError> {
        match ParsedReference::parse(reference)? {
            ParsedReference::Local { name } => document.schema(&name).cloned().ok_or_else(|| {
                ResolveError::ReferenceNotFound {
                    reference: reference.to_string(),
                }
            }),
            ParsedReference::External { location, name } => self
                .external
                .resolve_external(document.base_dir(), &location, &name)
                .map_err(|source| ResolveError::ExternalResolutionFailed {
                    reference: reference.to_string(),
                    source: Box::new(source),
                }),
        }
    }

    /// Resolve a raw schema value: follow a reference, resolve a
    /// composition, pass already-normalized nodes through unchanged.
    ///
    /// # Errors
    ///
    /// As [`Resolver::resolve_reference`], plus the composition errors
    /// described in [`crate::compose`].
    pub fn resolve_schema(
        &mut self,
        document: &Document,
        value: &Value,
    ) -> Result<SchemaNode, ResolveError> {
        self.resolve_value(document, value, &VisitedPath::new())
    }

    fn resolve_value(
        &mut self,
        document: &Document,
        value: &Value,
        visited: &VisitedPath,
    ) -> Result<SchemaNode, ResolveError> {
        match SchemaNode::classify(value)? {
            SchemaNode::Reference { pointer } => {
                self.resolve_reference_from(document, &pointer, visited)
            }
            SchemaNode::Composition(composition) => {
                self.resolve_composition(document, &composition, visited)
            }
            resolved => Ok(resolved),
        }
    }

    fn resolve_composition(
        &mut self,
        document: &Document,
        composition: &CompositionNode,
        visited: &VisitedPath,
    ) -> Result<SchemaNode, ResolveError> {
        let started = Instant::now();

        // A oneOf without a discriminator fails before any member work.
        if composition.kind == CompositionKind::OneOf && composition.discriminator.is_none() {
            return Err(ResolveError::MissingDiscriminator);
        }

        let key = composition_key(document, composition);
        if self.caches.enabled() {
            if let Some(node) = self.caches.get_composition(&key) {
                self.metrics.record_hit();
                let node = node.clone();
                self.metrics.observe("resolve_composition", started.elapsed());
                return Ok(node);
            }
            self.metrics.record_miss();
        }

        let mut members = Vec::with_capacity(composition.members.len());
        for member in &composition.members {
            members.push(self.resolve_value(document, member, visited)?);
        }

        let node = match composition.kind {
            CompositionKind::AllOf => {
                compose::merge_all_of(&members, composition.description.clone())?
            }
            CompositionKind::OneOf => {
                let discriminator = composition
                    .discriminator
                    .clone()
                    .ok_or(ResolveError::MissingDiscriminator)?;
                compose::one_of_object(
                    discriminator,
                    named_variants(composition, members),
                    composition.description.clone(),
                )
            }
            CompositionKind::AnyOf => compose::any_of_object(
                named_variants(composition, members),
                composition.description.clone(),
            ),
        };

        if self.caches.enabled() {
            let evicted = self.caches.insert_composition(key, node.clone());
            self.metrics.record_evictions(evicted);
            self.metrics.note_memory(self.caches.estimated_bytes());
        }

        self.metrics.observe("resolve_composition", started.elapsed());
        Ok(node)
    }

    /// Resolve every schema declared in the document's registry, in
    /// declaration order. Empty mapping when there is no schemas section.
    ///
    /// Under streaming mode, large registries are processed in batches:
    /// control returns to this loop between batches, the processed-schema
    /// counter advances, and the memory-cleanup hook gets a chance to run.
    /// The resolved output is identical either way.
    ///
    /// # Errors
    ///
    /// Fails on the first schema that does not resolve; earlier schemas from
    /// the same run stay cached.
    pub fn all_schemas(
        &mut self,
        document: &Document,
    ) -> Result<IndexMap<String, SchemaNode>, ResolveError> {
        let started = Instant::now();

        let names: Vec<String> = match document.schemas() {
            Some(schemas) => schemas.keys().cloned().collect(),
            None => return Ok(IndexMap::new()),
        };

        let streaming = self.memory.streaming_mode && names.len() > STREAMING_THRESHOLD;
        let batch_size = if streaming {
            STREAMING_BATCH_SIZE
        } else {
            names.len().max(1)
        };
        if streaming {
            debug!(
                schemas = names.len(),
                batch_size, "streaming schema enumeration"
            );
        }

        let mut resolved = IndexMap::with_capacity(names.len());
        for batch in names.chunks(batch_size) {
            for name in batch {
                let node = self.resolve_schema_by_name(document, name)?;
                resolved.insert(name.clone(), node);
            }
            self.metrics.record_processed(batch.len());
            if streaming {
                trace!(
                    processed = self.metrics.schemas_processed(),
                    "yield between schema batches"
                );
                self.maybe_cleanup();
            }
        }

        self.metrics.observe("all_schemas", started.elapsed());
        Ok(resolved)
    }

    /// Resolve one named registry entry through the schema cache.
    fn resolve_schema_by_name(
        &mut self,
        document: &Document,
        name: &str,
    ) -> Result<SchemaNode, ResolveError> {
        let key = schema_key(document, name);
        if self.caches.enabled() {
            if let Some(node) = self.caches.get_schema(&key) {
                self.metrics.record_hit();
                return Ok(node.clone());
            }
            self.metrics.record_miss();
        }

        let raw = document
            .schema(name)
            .cloned()
            .ok_or_else(|| ResolveError::ReferenceNotFound {
                reference: format!("#/components/schemas/{name}"),
            })?;
        let node = self.resolve_value(document, &raw, &VisitedPath::new())?;

        if self.caches.enabled() {
            let evicted = self.caches.insert_schema(key, node.clone());
            self.metrics.record_evictions(evicted);
            self.metrics.note_memory(self.caches.estimated_bytes());
        }
        Ok(node)
    }

    /// Memory-pressure hook: when optimization is enabled and the estimated
    /// cache footprint crosses the threshold, evict the oldest fraction of
    /// every cache. No-op otherwise.
    fn maybe_cleanup(&mut self) {
        if !self.memory.enabled {
            return;
        }
        let bytes = self.caches.estimated_bytes();
        self.metrics.note_memory(bytes);
        if bytes > self.memory.memory_threshold {
            let evicted = self.caches.evict_fraction(MEMORY_CLEANUP_FRACTION);
            self.metrics.record_evictions(evicted);
            self.metrics.record_cleanup();
            debug!(evicted, bytes, "memory pressure cleanup");
        }
    }
}

fn reference_key(document: &Document, reference: &str) -> String {
    format!("{}::{}", document.id(), reference)
}

fn schema_key(document: &Document, name: &str) -> String {
    format!("{}::{}", document.id(), name)
}

/// Structural signature of a composition: kind, discriminator, and the
/// serialized member list, scoped to the document.
fn composition_key(document: &Document, composition: &CompositionNode) -> String {
    format!(
        "{}::{}:{}:{}",
        document.id(),
        composition.kind.keyword(),
        composition.discriminator.as_deref().unwrap_or(""),
        Value::Array(composition.members.clone())
    )
}

fn named_variants(composition: &CompositionNode, members: Vec<SchemaNode>) -> Vec<Variant> {
    composition
        .members
        .iter()
        .zip(members)
        .enumerate()
        .map(|(index, (raw, node))| Variant {
            name: compose::variant_name(raw, index),
            node,
        })
        .collect()
}
