//! Per-class occupancy and dirty-block accounting.
//!
//! Counters are adjusted by the surrounding cache on extent allocation,
//! deallocation, dirty-marking, and cleaning. The accumulator is policy-free:
//! whether a class's data may be cached at all is decided by the allocator
//! against the class's `allocation` flag before any counter moves.

use std::collections::HashMap;

use parking_lot::Mutex;

use crate::registry::ClassRegistry;

/// Point-in-time counters for one class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassUsage {
    /// Bytes of cached data attributed to the class.
    pub occupancy: u64,
    /// Dirty cache blocks ([`crate::core::CACHE_BLOCK_SIZE`] units)
    /// attributed to the class.
    pub dirty: u64,
}

/// Thread-safe per-class statistics store.
///
/// All counters live behind one mutex so a reclassification transfer is a
/// single critical section: a concurrent snapshot sees either both sides of
/// the move or neither. Counters never go below zero; a decrement larger
/// than the current value clamps at zero.
#[derive(Debug, Default)]
pub struct StatsAccumulator {
    classes: Mutex<HashMap<u32, ClassUsage>>,
}

impl StatsAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Zeroed counters for every class in the registry.
    pub fn for_registry(registry: &ClassRegistry) -> Self {
        let stats = Self::new();
        stats.rebuild(registry);
        stats
    }

    /// Re-key the store for a freshly installed registry: surviving class
    /// ids keep their counters, removed ids are dropped, new ids start at
    /// zero.
    pub fn rebuild(&self, registry: &ClassRegistry) {
        let mut classes = self.classes.lock();
        let next = registry
            .classes()
            .iter()
            .map(|class| {
                let usage = classes.get(&class.id()).copied().unwrap_or_default();
                (class.id(), usage)
            })
            .collect();
        *classes = next;
    }

    pub fn on_allocate(&self, class_id: u32, bytes: u64) {
        self.update(class_id, |usage| usage.occupancy += bytes);
    }

    pub fn on_deallocate(&self, class_id: u32, bytes: u64) {
        self.update(class_id, |usage| {
            usage.occupancy = usage.occupancy.saturating_sub(bytes)
        });
    }

    pub fn on_dirty(&self, class_id: u32, blocks: u64) {
        self.update(class_id, |usage| usage.dirty += blocks);
    }

    pub fn on_clean(&self, class_id: u32, blocks: u64) {
        self.update(class_id, |usage| {
            usage.dirty = usage.dirty.saturating_sub(blocks)
        });
    }

    /// Move `bytes` of accounted occupancy from one class to another in a
    /// single critical section. At most the source's current balance moves,
    /// so total occupancy is conserved; no reader can observe the decrement
    /// without the increment.
    pub fn reclassify(&self, from: u32, to: u32, bytes: u64) {
        if from == to || bytes == 0 {
            return;
        }
        let mut classes = self.classes.lock();
        if !classes.contains_key(&from) || !classes.contains_key(&to) {
            log::debug!("reclassify {from} -> {to} ignored: unknown io class");
            return;
        }
        let moved = match classes.get_mut(&from) {
            Some(src) => {
                let moved = bytes.min(src.occupancy);
                src.occupancy -= moved;
                moved
            }
            None => 0,
        };
        if moved < bytes {
            log::warn!("reclassify {from} -> {to} truncated to {moved} of {bytes} bytes");
        }
        if let Some(dst) = classes.get_mut(&to) {
            dst.occupancy += moved;
        }
    }

    /// Current counters for a class; zero for unknown ids.
    pub fn snapshot(&self, class_id: u32) -> ClassUsage {
        self.classes
            .lock()
            .get(&class_id)
            .copied()
            .unwrap_or_default()
    }

    /// Counters for every known class.
    pub fn snapshot_all(&self) -> HashMap<u32, ClassUsage> {
        self.classes.lock().clone()
    }

    /// Sum of occupancy across all classes.
    pub fn total_occupancy(&self) -> u64 {
        self.classes
            .lock()
            .values()
            .map(|usage| usage.occupancy)
            .sum()
    }

    /// Zero every counter, keeping the class set (cache reset/flush).
    pub fn reset(&self) {
        for usage in self.classes.lock().values_mut() {
            *usage = ClassUsage::default();
        }
    }

    fn update(&self, class_id: u32, apply: impl FnOnce(&mut ClassUsage)) {
        let mut classes = self.classes.lock();
        match classes.get_mut(&class_id) {
            Some(usage) => apply(usage),
            None => log::debug!("statistics update for unknown io class {class_id} ignored"),
        }
    }
}
