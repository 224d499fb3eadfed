//! # QueryCache
//!
//! Cached copies of backend collections, keyed by query. Invalidation marks
//! an entry stale instead of dropping it, so the last good copy stays
//! available until a refetch succeeds.
//!
//! Every key carries a generation, drawn from one cache-wide counter so it
//! stays unique even across eviction. Starting a fetch or invalidating moves
//! it forward, and a completed fetch is only written back while its ticket
//! still matches.
//! A slow response can therefore never overwrite newer state.
//!
//! Keys built from a client-supplied serial are garbage-collected: entries
//! idle for longer than the retention window are dropped, and the number of
//! per-serial entries is capped, least recently used first.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use domains::{Equipment, MaintenanceLog, MonitoringReading};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    Equipments,
    OpenLogs,
    AllLogs,
    EquipmentLogs(String),
    MonitoringReadings(String),
}

impl QueryKey {
    /// Keys that carry a serial and are subject to eviction.
    pub fn is_per_serial(&self) -> bool {
        matches!(self, QueryKey::EquipmentLogs(_) | QueryKey::MonitoringReadings(_))
    }
}

/// How long an unused per-serial entry is kept.
pub const DEFAULT_GC_WINDOW: Duration = Duration::from_secs(5 * 60);
/// Upper bound on per-serial entries held at once.
pub const DEFAULT_SERIAL_CAPACITY: usize = 256;

#[derive(Debug, Clone)]
pub enum Collection {
    Equipments(Arc<Vec<Equipment>>),
    Logs(Arc<Vec<MaintenanceLog>>),
    Readings(Arc<Vec<MonitoringReading>>),
}

/// Record types that can be stored in a [`Collection`].
pub trait Cacheable: Sized {
    fn wrap(records: Arc<Vec<Self>>) -> Collection;
    fn unwrap(collection: Collection) -> Option<Arc<Vec<Self>>>;
}

impl Cacheable for Equipment {
    fn wrap(records: Arc<Vec<Self>>) -> Collection {
        Collection::Equipments(records)
    }

    fn unwrap(collection: Collection) -> Option<Arc<Vec<Self>>> {
        match collection {
            Collection::Equipments(v) => Some(v),
            _ => None,
        }
    }
}

impl Cacheable for MaintenanceLog {
    fn wrap(records: Arc<Vec<Self>>) -> Collection {
        Collection::Logs(records)
    }

    fn unwrap(collection: Collection) -> Option<Arc<Vec<Self>>> {
        match collection {
            Collection::Logs(v) => Some(v),
            _ => None,
        }
    }
}

impl Cacheable for MonitoringReading {
    fn wrap(records: Arc<Vec<Self>>) -> Collection {
        Collection::Readings(records)
    }

    fn unwrap(collection: Collection) -> Option<Arc<Vec<Self>>> {
        match collection {
            Collection::Readings(v) => Some(v),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Option<Collection>,
    fetched_at: Option<Instant>,
    stale: bool,
    generation: u64,
    last_used: Instant,
    /// Recency rank for eviction; larger is more recent.
    touched: u64,
}

impl CacheEntry {
    fn empty(touched: u64) -> Self {
        Self {
            value: None,
            fetched_at: None,
            stale: true,
            generation: touched,
            last_used: Instant::now(),
            touched,
        }
    }

    fn touch(&mut self, tick: u64) {
        self.last_used = Instant::now();
        self.touched = tick;
    }
}

/// A cached value plus whether it may be served without refetching.
#[derive(Debug, Clone)]
pub struct Cached {
    pub value: Collection,
    pub fresh: bool,
}

/// Proof that a fetch was started at a particular generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    key: QueryKey,
    generation: u64,
}

impl FetchTicket {
    pub fn key(&self) -> &QueryKey {
        &self.key
    }
}

pub struct QueryCache {
    entries: DashMap<QueryKey, CacheEntry>,
    ttl: Duration,
    gc_window: Duration,
    serial_capacity: usize,
    clock: AtomicU64,
}

impl QueryCache {
    /// `ttl` bounds how long a fetched value counts as fresh.
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            gc_window: DEFAULT_GC_WINDOW,
            serial_capacity: DEFAULT_SERIAL_CAPACITY,
            clock: AtomicU64::new(0),
        }
    }

    pub fn with_retention(mut self, gc_window: Duration, serial_capacity: usize) -> Self {
        self.gc_window = gc_window;
        self.serial_capacity = serial_capacity.max(1);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &QueryKey) -> bool {
        self.entries.contains_key(key)
    }

    fn tick(&self) -> u64 {
        self.clock.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn get(&self, key: &QueryKey) -> Option<Cached> {
        let tick = self.tick();
        let mut entry = self.entries.get_mut(key)?;
        entry.touch(tick);
        let value = entry.value.clone()?;
        let within_ttl = entry.fetched_at.is_some_and(|t| t.elapsed() < self.ttl);
        Some(Cached {
            value,
            fresh: !entry.stale && within_ttl,
        })
    }

    /// Registers a new fetch for `key`, superseding any in flight.
    pub fn begin_fetch(&self, key: QueryKey) -> FetchTicket {
        if key.is_per_serial() {
            self.evict_serial_entries(&key);
        }
        let tick = self.tick();
        let mut entry = self
            .entries
            .entry(key.clone())
            .or_insert_with(|| CacheEntry::empty(tick));
        entry.touch(tick);
        entry.generation = tick;
        FetchTicket {
            key,
            generation: entry.generation,
        }
    }

    /// Stores a fetch result. Returns `false` and drops the value when the
    /// ticket was superseded by a newer fetch or an invalidation.
    pub fn complete(&self, ticket: &FetchTicket, value: Collection) -> bool {
        let Some(mut entry) = self.entries.get_mut(&ticket.key) else {
            return false;
        };
        if entry.generation != ticket.generation {
            debug!(key = ?ticket.key, "discarding superseded fetch result");
            return false;
        }
        entry.value = Some(value);
        entry.fetched_at = Some(Instant::now());
        entry.stale = false;
        true
    }

    /// Marks `key` stale and supersedes any fetch in flight for it.
    pub fn invalidate(&self, key: &QueryKey) {
        let tick = self.tick();
        if let Some(mut entry) = self.entries.get_mut(key) {
            entry.stale = true;
            entry.generation = tick;
            debug!(?key, "invalidated");
        }
    }

    /// Drops idle per-serial entries, then the least recently used ones until
    /// `keep` fits under the cap. Must not be called while holding an entry.
    fn evict_serial_entries(&self, keep: &QueryKey) {
        let window = self.gc_window;
        self.entries.retain(|key, entry| {
            let keep_it = !key.is_per_serial() || key == keep || entry.last_used.elapsed() < window;
            if !keep_it {
                debug!(?key, "evicted idle entry");
            }
            keep_it
        });

        let mut others: Vec<(QueryKey, u64)> = self
            .entries
            .iter()
            .filter(|e| e.key().is_per_serial() && e.key() != keep)
            .map(|e| (e.key().clone(), e.value().touched))
            .collect();
        let room = self.serial_capacity - 1;
        if others.len() <= room {
            return;
        }
        others.sort_by_key(|(_, touched)| *touched);
        let excess = others.len() - room;
        for (key, _) in others.into_iter().take(excess) {
            self.entries.remove(&key);
            debug!(?key, "evicted least recently used entry");
        }
    }

    /// The invalidation that follows any write to maintenance logs.
    pub fn invalidate_logs(&self) {
        self.invalidate(&QueryKey::OpenLogs);
        self.invalidate(&QueryKey::AllLogs);
    }
}
