//! Rule predicates and the textual rule grammar.
//!
//! A class rule is an OR of AND-conjunctions over single-attribute
//! predicates: `&` binds tighter than `|`, so `a&b|c&d` reads `(a&b)|(c&d)`.
//! Rules form a small closed set of tagged variants; evaluation is a pure
//! fold over the compiled tree with no dynamic dispatch.

pub mod parser;

pub use parser::{compile, CompiledRule};

use crate::core::{IoDirection, RequestContext};

/// Comparator for numeric rule operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    Eq,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Comparator {
    /// Compare an extracted attribute value against a rule operand.
    /// Strict `Lt`/`Gt` exclude the boundary value itself.
    pub fn matches(self, value: u64, operand: u64) -> bool {
        match self {
            Comparator::Eq => value == operand,
            Comparator::Lt => value < operand,
            Comparator::Le => value <= operand,
            Comparator::Gt => value > operand,
            Comparator::Ge => value >= operand,
        }
    }
}

/// A single predicate over one request attribute. Immutable once compiled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    /// Exact, case-sensitive match of the file extension (no leading dot).
    Extension(String),
    /// Byte offset of the I/O within the file.
    FileOffset(Comparator, u64),
    /// Total file size at operation time.
    FileSize(Comparator, u64),
    /// Request direction.
    Direction(IoDirection),
    /// Sentinel for the fallback class; matches only when no other class
    /// matched, so it is never satisfied during the ordered scan.
    Unclassified,
}

impl Rule {
    /// Evaluate against a request context.
    ///
    /// Contexts without a known size (or without an extension) never match
    /// size (extension) rules. `Unclassified` always evaluates to false
    /// here; the fallback is applied by the classifier itself.
    pub fn matches(&self, ctx: &RequestContext) -> bool {
        match self {
            Rule::Extension(ext) => ctx.file_extension.as_deref() == Some(ext.as_str()),
            Rule::FileOffset(cmp, operand) => cmp.matches(ctx.file_offset, *operand),
            Rule::FileSize(cmp, operand) => ctx
                .file_size
                .is_some_and(|size| cmp.matches(size, *operand)),
            Rule::Direction(direction) => ctx.direction == *direction,
            Rule::Unclassified => false,
        }
    }
}

/// A compiled boolean combination of rules: OR of AND-conjunctions.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Predicate {
    terms: Vec<Vec<Rule>>,
}

impl Predicate {
    pub(crate) fn new(terms: Vec<Vec<Rule>>) -> Self {
        Self { terms }
    }

    /// Predicate of the implicit fallback class.
    pub fn unclassified() -> Self {
        Self {
            terms: vec![vec![Rule::Unclassified]],
        }
    }

    /// True when any conjunction is satisfied in full.
    pub fn matches(&self, ctx: &RequestContext) -> bool {
        self.terms
            .iter()
            .any(|term| term.iter().all(|rule| rule.matches(ctx)))
    }

    /// True when this predicate carries the `unclassified` sentinel.
    pub fn is_unclassified(&self) -> bool {
        self.rules().any(|rule| matches!(rule, Rule::Unclassified))
    }

    /// All rules across every conjunction, for inspection.
    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.terms.iter().flatten()
    }
}
