//! I/O classification core for a block-level cache.
//!
//! Every incoming request is assigned to exactly one of an ordered set of
//! user-defined io classes based on its attributes (file extension, file
//! offset, file size, direction). The assignment decides whether the
//! request's data is cached and with what eviction priority, and feeds the
//! per-class occupancy/dirty accounting the rest of the cache consumes.
//!
//! ```
//! use ioclass::{IoClassifier, IoDirection, RequestContext, parse_config};
//!
//! let engine = IoClassifier::new();
//! let records = parse_config("1,1,1,extension:tmp&done\n").unwrap();
//! engine.load(&records).unwrap();
//!
//! let ctx = RequestContext::for_file("scratch.tmp", IoDirection::Write).with_size(40960);
//! assert_eq!(engine.classify(&ctx), 1);
//! ```

// Export modules for library usage
pub mod core;
pub mod engine;
pub mod registry;
pub mod rule;
pub mod stats;

// Re-export commonly used types
pub use crate::core::{
    file_extension, IoDirection, MalformedRule, RequestContext, Result, CACHE_BLOCK_SIZE,
    MAX_IO_CLASSES,
};

pub use crate::engine::IoClassifier;

pub use crate::registry::{
    load_config_file, parse_config, ClassRecord, ClassRegistry, IoClass, UNCLASSIFIED_CLASS_ID,
};

pub use crate::rule::{compile, Comparator, CompiledRule, Predicate, Rule};

pub use crate::stats::{ClassUsage, StatsAccumulator};
