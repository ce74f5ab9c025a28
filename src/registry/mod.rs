//! Ordered io class registry and the classification decision procedure.

pub mod config;

pub use config::{load_config_file, parse_config, ClassRecord};

use crate::core::errors::{MalformedRule, Result};
use crate::core::{RequestContext, MAX_IO_CLASSES};
use crate::rule::{compile, Predicate};

/// Id of the implicit fallback class.
pub const UNCLASSIFIED_CLASS_ID: u32 = 0;

/// Eviction priority given to the implicit unclassified class when the
/// configuration does not define one; explicit records override it.
const DEFAULT_UNCLASSIFIED_PRIORITY: u32 = 255;

/// One io class: a compiled predicate plus the cache-policy attributes
/// consumed by the eviction/allocation collaborators.
#[derive(Debug, Clone)]
pub struct IoClass {
    id: u32,
    predicate: Predicate,
    allocation: bool,
    eviction_priority: u32,
    terminal: bool,
}

impl IoClass {
    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    /// When false, requests are still classified into this class for
    /// accounting but their data must not be cached.
    pub fn allocation(&self) -> bool {
        self.allocation
    }

    /// Ordering value for the external reclamation policy; has no effect on
    /// classification order.
    pub fn eviction_priority(&self) -> u32 {
        self.eviction_priority
    }

    /// The `done` flag from the rule definition.
    pub fn terminal(&self) -> bool {
        self.terminal
    }

    fn is_unclassified(&self) -> bool {
        self.predicate.is_unclassified()
    }
}

/// Immutable snapshot of the configured classes, in classification order.
///
/// A registry is built wholesale by [`ClassRegistry::load`] and never
/// mutated afterwards; reload replaces the entire snapshot (see
/// `engine::IoClassifier`).
#[derive(Debug, Clone)]
pub struct ClassRegistry {
    classes: Vec<IoClass>,
}

impl Default for ClassRegistry {
    fn default() -> Self {
        Self::unclassified_only()
    }
}

impl ClassRegistry {
    /// Registry holding only the unclassified fallback class.
    pub fn unclassified_only() -> Self {
        Self {
            classes: vec![IoClass {
                id: UNCLASSIFIED_CLASS_ID,
                predicate: Predicate::unclassified(),
                allocation: false,
                eviction_priority: DEFAULT_UNCLASSIFIED_PRIORITY,
                terminal: false,
            }],
        }
    }

    /// Compile an ordered list of class records into a registry.
    ///
    /// All-or-nothing: the first malformed record aborts the whole load and
    /// nothing of the partial result escapes. Record order becomes
    /// classification order. When no record defines id 0, the implicit
    /// unclassified class is appended.
    pub fn load(records: &[ClassRecord]) -> Result<Self> {
        let mut classes = Vec::with_capacity(records.len() + 1);
        let mut seen = [false; MAX_IO_CLASSES as usize];

        for record in records {
            if record.ioclass_id >= MAX_IO_CLASSES {
                return Err(MalformedRule::ClassIdOutOfRange(record.ioclass_id));
            }
            if seen[record.ioclass_id as usize] {
                return Err(MalformedRule::DuplicateClassId(record.ioclass_id));
            }
            seen[record.ioclass_id as usize] = true;

            let compiled = compile(&record.rule)?;
            classes.push(IoClass {
                id: record.ioclass_id,
                predicate: compiled.predicate,
                allocation: record.allocation,
                eviction_priority: record.eviction_priority,
                terminal: compiled.terminal,
            });
        }

        if !seen[UNCLASSIFIED_CLASS_ID as usize] {
            classes.push(IoClass {
                id: UNCLASSIFIED_CLASS_ID,
                predicate: Predicate::unclassified(),
                allocation: false,
                eviction_priority: DEFAULT_UNCLASSIFIED_PRIORITY,
                terminal: false,
            });
        }

        Ok(Self { classes })
    }

    /// Classify a request: first matching class in registration order wins;
    /// anything unmatched resolves to the unclassified class. Total and
    /// deterministic, never fails.
    pub fn classify(&self, ctx: &RequestContext) -> u32 {
        for class in &self.classes {
            // The sentinel only matches as fallback, not during the scan
            if class.is_unclassified() {
                continue;
            }
            if class.predicate.matches(ctx) {
                return class.id;
            }
        }

        self.classes
            .iter()
            .find(|class| class.is_unclassified())
            .map(IoClass::id)
            .unwrap_or(UNCLASSIFIED_CLASS_ID)
    }

    pub fn get(&self, class_id: u32) -> Option<&IoClass> {
        self.classes.iter().find(|class| class.id == class_id)
    }

    /// Classes in classification order.
    pub fn classes(&self) -> &[IoClass] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}
