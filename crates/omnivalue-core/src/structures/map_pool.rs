//! Size-bucketed pool of map-store blocks
//!
//! Map stores churn heavily: every algebra operation builds small,
//! short-lived maps. Blocks of a few fixed capacities are recycled through
//! bounded lock-free free lists; anything larger than the biggest bucket
//! goes straight to the allocator.

use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam::queue::ArrayQueue;
use once_cell::sync::Lazy;

use super::map_store::MapEntry;
use crate::core::config::{global_config, PoolConfig};
use crate::{log_info, log_trace};

static MAP_POOL: Lazy<MapPool> = Lazy::new(|| MapPool::new(&global_config().pool));

/// The process-wide pool, created from the global configuration on first use
pub fn map_pool() -> &'static MapPool {
    &MAP_POOL
}

struct Bucket {
    capacity: usize,
    free: Option<ArrayQueue<Vec<MapEntry>>>,
}

/// Snapshot of pool activity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Blocks served from a free list
    pub hits: u64,
    /// Blocks freshly allocated
    pub misses: u64,
    /// Blocks returned to a free list
    pub recycled: u64,
    /// Blocks dropped (full free list or unpooled capacity)
    pub discarded: u64,
}

/// Bucketed block pool for map entries
pub struct MapPool {
    buckets: Vec<Bucket>,
    hits: AtomicU64,
    misses: AtomicU64,
    recycled: AtomicU64,
    discarded: AtomicU64,
}

impl MapPool {
    /// Create a pool with the configured bucket capacities
    pub fn new(config: &PoolConfig) -> Self {
        let buckets = config
            .bucket_capacities
            .iter()
            .map(|&capacity| Bucket {
                capacity,
                free: (config.free_list_depth > 0).then(|| ArrayQueue::new(config.free_list_depth)),
            })
            .collect();
        log_info!(
            "Initialized map pool: buckets={:?} free_list_depth={}",
            config.bucket_capacities,
            config.free_list_depth
        );
        Self {
            buckets,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            recycled: AtomicU64::new(0),
            discarded: AtomicU64::new(0),
        }
    }

    /// Capacities of the pooled buckets, ascending
    pub fn bucket_capacities(&self) -> Vec<usize> {
        self.buckets.iter().map(|b| b.capacity).collect()
    }

    /// Smallest bucket capacity
    pub fn smallest_capacity(&self) -> usize {
        self.buckets.first().map_or(1, |b| b.capacity)
    }

    /// Capacity of the block handed out for a request of `min` entries
    pub fn capacity_for(&self, min: usize) -> usize {
        let min = min.max(1);
        self.buckets
            .iter()
            .find(|b| b.capacity >= min)
            .map_or(min, |b| b.capacity)
    }

    /// Capacity to grow to from a full block of `current` entries
    pub fn next_capacity(&self, current: usize, grow_percent: usize) -> usize {
        match self.buckets.iter().find(|b| b.capacity > current) {
            Some(bucket) => bucket.capacity,
            None => (current * grow_percent / 100).max(current + 1),
        }
    }

    /// Take an empty block holding at least `min_capacity` entries
    pub fn acquire(&self, min_capacity: usize) -> Vec<MapEntry> {
        let capacity = self.capacity_for(min_capacity);
        if let Some(bucket) = self.buckets.iter().find(|b| b.capacity == capacity) {
            if let Some(block) = bucket.free.as_ref().and_then(|free| free.pop()) {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return block;
            }
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        log_trace!("map pool miss: capacity={}", capacity);
        Vec::with_capacity(capacity)
    }

    /// Return a block; its entries are dropped first
    pub fn release(&self, mut block: Vec<MapEntry>) {
        block.clear();
        let capacity = block.capacity();
        if capacity == 0 {
            return;
        }
        let free = self
            .buckets
            .iter()
            .find(|b| b.capacity == capacity)
            .and_then(|b| b.free.as_ref());
        match free.map(|free| free.push(block)) {
            Some(Ok(())) => {
                self.recycled.fetch_add(1, Ordering::Relaxed);
            }
            _ => {
                self.discarded.fetch_add(1, Ordering::Relaxed);
                log_trace!("map pool discard: capacity={}", capacity);
            }
        }
    }

    /// Current counters
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            recycled: self.recycled.load(Ordering::Relaxed),
            discarded: self.discarded.load(Ordering::Relaxed),
        }
    }
}
