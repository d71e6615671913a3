//! Resolution metrics: counters, timers, and memory accounting.

use std::fmt;
use std::time::Duration;

use indexmap::IndexMap;
use serde::Serialize;

/// Metrics collection toggle. Off by default; counters and timers record
/// nothing until enabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsConfig {
    pub enabled: bool,
}

/// Default memory threshold before pressure cleanup kicks in (64 MiB).
pub const DEFAULT_MEMORY_THRESHOLD: usize = 64 * 1024 * 1024;

/// Memory optimization settings.
#[derive(Debug, Clone, Copy)]
pub struct MemoryConfig {
    /// Enables the opportunistic cleanup hook.
    pub enabled: bool,
    /// Estimated cache footprint, in bytes, above which cleanup evicts.
    pub memory_threshold: usize,
    /// Enumerate large schema registries in batches.
    pub streaming_mode: bool,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        MemoryConfig {
            enabled: false,
            memory_threshold: DEFAULT_MEMORY_THRESHOLD,
            streaming_mode: false,
        }
    }
}

#[derive(Debug, Default, Clone)]
struct TimingEntry {
    count: u64,
    total: Duration,
}

/// Counter and timer sink for one resolution session.
///
/// Cache hit/miss/eviction counters and timers respect the enabled flag.
/// The processed-schema counter and memory peak are part of the memory
/// instrumentation and always record.
#[derive(Debug, Default)]
pub struct Metrics {
    enabled: bool,
    cache_hits: u64,
    cache_misses: u64,
    evictions: u64,
    schemas_processed: u64,
    cleanups: u64,
    peak_bytes: usize,
    timings: IndexMap<String, TimingEntry>,
}

impl Metrics {
    pub fn configure(&mut self, config: MetricsConfig) {
        self.enabled = config.enabled;
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn record_hit(&mut self) {
        if self.enabled {
            self.cache_hits += 1;
        }
    }

    pub fn record_miss(&mut self) {
        if self.enabled {
            self.cache_misses += 1;
        }
    }

    pub fn record_evictions(&mut self, count: usize) {
        if self.enabled && count > 0 {
            self.evictions += count as u64;
        }
    }

    /// Count schemas handled by the enumerator. Always records.
    pub fn record_processed(&mut self, count: usize) {
        self.schemas_processed += count as u64;
    }

    pub fn schemas_processed(&self) -> u64 {
        self.schemas_processed
    }

    /// Count one memory-pressure cleanup. Always records.
    pub fn record_cleanup(&mut self) {
        self.cleanups += 1;
    }

    pub fn cleanups(&self) -> u64 {
        self.cleanups
    }

    /// Track the high-water mark of the estimated cache footprint.
    pub fn note_memory(&mut self, bytes: usize) {
        self.peak_bytes = self.peak_bytes.max(bytes);
    }

    pub fn peak_bytes(&self) -> usize {
        self.peak_bytes
    }

    /// Accumulate one timed operation under a label.
    pub fn observe(&mut self, label: &str, elapsed: Duration) {
        if !self.enabled {
            return;
        }
        let entry = self.timings.entry(label.to_string()).or_default();
        entry.count += 1;
        entry.total += elapsed;
    }

    pub fn report(&self) -> MetricsReport {
        MetricsReport {
            cache_hits: self.cache_hits,
            cache_misses: self.cache_misses,
            evictions: self.evictions,
            schemas_processed: self.schemas_processed,
            timings: self
                .timings
                .iter()
                .map(|(label, entry)| TimingSummary {
                    label: label.clone(),
                    count: entry.count,
                    total_micros: entry.total.as_micros() as u64,
                })
                .collect(),
        }
    }
}

/// Structured metrics summary.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport {
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub evictions: u64,
    pub schemas_processed: u64,
    pub timings: Vec<TimingSummary>,
}

/// Accumulated time under one label.
#[derive(Debug, Clone, Serialize)]
pub struct TimingSummary {
    pub label: String,
    pub count: u64,
    pub total_micros: u64,
}

impl MetricsReport {
    /// Hit fraction over all cache lookups, when any happened.
    pub fn hit_rate(&self) -> Option<f64> {
        let lookups = self.cache_hits + self.cache_misses;
        if lookups == 0 {
            None
        } else {
            Some(self.cache_hits as f64 / lookups as f64)
        }
    }
}

impl fmt::Display for MetricsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Resolution metrics:")?;
        writeln!(f, "  cache hits:        {}", self.cache_hits)?;
        writeln!(f, "  cache misses:      {}", self.cache_misses)?;
        if let Some(rate) = self.hit_rate() {
            writeln!(f, "  hit rate:          {:.1}%", rate * 100.0)?;
        }
        writeln!(f, "  evictions:         {}", self.evictions)?;
        writeln!(f, "  schemas processed: {}", self.schemas_processed)?;
        if !self.timings.is_empty() {
            writeln!(f, "  timers:")?;
            for timing in &self.timings {
                writeln!(
                    f,
                    "    {}: {} call(s), {:?} total",
                    timing.label,
                    timing.count,
                    Duration::from_micros(timing.total_micros)
                )?;
            }
        }
        Ok(())
    }
}

/// Memory snapshot: configuration plus current and peak footprint.
#[derive(Debug, Clone, Serialize)]
pub struct MemoryStats {
    pub enabled: bool,
    pub streaming_mode: bool,
    pub memory_threshold: usize,
    pub estimated_bytes: usize,
    pub peak_bytes: usize,
    pub schemas_processed: u64,
    pub cleanups: u64,
}
