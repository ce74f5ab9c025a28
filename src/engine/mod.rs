//! Shared classification engine.
//!
//! Holds the active [`ClassRegistry`] behind an atomically swappable handle
//! plus the per-class statistics store. Classification runs concurrently on
//! many request-handling threads: readers clone the `Arc` snapshot and
//! evaluate against an immutable registry, so an in-flight classification
//! finishes against the old or the new configuration, never a mixture.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::core::errors::Result;
use crate::core::RequestContext;
use crate::registry::{ClassRecord, ClassRegistry};
use crate::stats::StatsAccumulator;

/// The classification core as one shared object: active registry + stats.
#[derive(Debug)]
pub struct IoClassifier {
    active: RwLock<Arc<ClassRegistry>>,
    stats: StatsAccumulator,
}

impl Default for IoClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl IoClassifier {
    /// Engine with only the unclassified fallback class active.
    pub fn new() -> Self {
        let registry = ClassRegistry::unclassified_only();
        let stats = StatsAccumulator::for_registry(&registry);
        Self {
            active: RwLock::new(Arc::new(registry)),
            stats,
        }
    }

    /// Engine starting from an already built registry.
    pub fn with_registry(registry: ClassRegistry) -> Self {
        let stats = StatsAccumulator::for_registry(&registry);
        Self {
            active: RwLock::new(Arc::new(registry)),
            stats,
        }
    }

    /// Compile and atomically install a new configuration.
    ///
    /// The registry is built in full before anything is published; on error
    /// the previously active registry stays untouched and operative, so a
    /// failed reload is a no-op with an observable failure. Counters of
    /// surviving class ids carry over, removed ids are dropped, new ids
    /// start at zero.
    pub fn load(&self, records: &[ClassRecord]) -> Result<()> {
        let registry = Arc::new(ClassRegistry::load(records)?);

        // Swap and re-key stats under the write lock so no reader pairs the
        // new registry with the old class set
        let mut active = self.active.write();
        self.stats.rebuild(&registry);
        *active = Arc::clone(&registry);

        log::debug!("installed io class configuration with {} classes", registry.len());
        Ok(())
    }

    /// Clear to the default registry holding only the unclassified class.
    pub fn remove(&self) {
        let registry = Arc::new(ClassRegistry::unclassified_only());
        let mut active = self.active.write();
        self.stats.rebuild(&registry);
        *active = registry;
        log::debug!("io class configuration removed");
    }

    /// Snapshot handle of the active registry. The snapshot stays valid for
    /// as long as the caller holds it, even across reloads.
    pub fn registry(&self) -> Arc<ClassRegistry> {
        Arc::clone(&self.active.read())
    }

    /// Classify one request against the active registry.
    pub fn classify(&self, ctx: &RequestContext) -> u32 {
        self.registry().classify(ctx)
    }

    /// Whether data classified into `class_id` may be cached. The cache
    /// allocator must consult this before accounting any bytes.
    pub fn should_allocate(&self, class_id: u32) -> bool {
        self.registry()
            .get(class_id)
            .is_some_and(|class| class.allocation())
    }

    /// Eviction priority of a class, for the reclamation collaborator.
    pub fn eviction_priority(&self, class_id: u32) -> Option<u32> {
        self.registry().get(class_id).map(|class| class.eviction_priority())
    }

    pub fn stats(&self) -> &StatsAccumulator {
        &self.stats
    }
}
