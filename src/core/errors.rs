//! Shared error types for rule compilation and configuration loading

use std::path::PathBuf;
use thiserror::Error;

use super::MAX_IO_CLASSES;

/// The single error surfaced by the classification core.
///
/// Every variant is detected while compiling a rule or loading a class
/// configuration. Classification itself is total: an unmatched request
/// resolves to the unclassified class instead of failing.
#[derive(Debug, Error)]
pub enum MalformedRule {
    /// Unknown attribute keyword in a rule clause
    #[error("unknown attribute keyword: {0:?}")]
    UnknownAttribute(String),

    /// Unknown comparator for a numeric attribute
    #[error("unknown comparator {comparator:?} for attribute {attribute}")]
    UnknownComparator {
        attribute: &'static str,
        comparator: String,
    },

    /// Operand that does not parse for its attribute
    #[error("invalid operand {operand:?} for attribute {attribute}")]
    InvalidOperand {
        attribute: &'static str,
        operand: String,
    },

    /// Empty clause between `&`/`|` separators
    #[error("empty clause in rule definition")]
    EmptyClause,

    /// Rule that compiles to no predicate at all (e.g. only `done`)
    #[error("rule definition contains no predicate clauses")]
    EmptyRule,

    /// The `unclassified` sentinel mixed with other clauses
    #[error("`unclassified` cannot be combined with other clauses")]
    UnclassifiedCombined,

    /// Configuration record with a bad shape or unparsable field
    #[error("malformed class record at line {line}: {message}")]
    MalformedRecord { line: usize, message: String },

    /// Class id used twice within one configuration
    #[error("duplicate io class id: {0}")]
    DuplicateClassId(u32),

    /// Class id beyond the supported id space
    #[error("io class id {0} out of range (maximum {max})", max = MAX_IO_CLASSES - 1)]
    ClassIdOutOfRange(u32),

    /// Configuration file could not be read
    #[error("failed to read class configuration {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl MalformedRule {
    /// Create a record-level error with line context
    pub fn record(line: usize, message: impl Into<String>) -> Self {
        Self::MalformedRecord {
            line,
            message: message.into(),
        }
    }
}

/// Result type alias using our error type
pub type Result<T> = std::result::Result<T, MalformedRule>;
