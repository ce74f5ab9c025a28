//! Compiler for the textual rule grammar.
//!
//! Compilation is pure: a rule string either yields a [`CompiledRule`] or a
//! [`MalformedRule`], with no side effects. All grammar errors surface here,
//! at configuration load time, never during classification.

use crate::core::errors::{MalformedRule, Result};
use crate::core::IoDirection;

use super::{Comparator, Predicate, Rule};

/// A compiled class rule: the predicate plus the `done` terminal flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledRule {
    pub predicate: Predicate,
    /// Set by a `done` token. Informational for the caller; evaluation
    /// already stops at the first matching class.
    pub terminal: bool,
}

/// Compile a textual rule definition.
///
/// Clauses joined by `&` are conjoined; `|` disjoins whole conjunctions at
/// lower precedence. Supported clauses: `extension:<ext>`,
/// `file_offset:<cmp>:<bytes>`, `file_size:<cmp>:<bytes>` with
/// `<cmp>` one of `eq`/`lt`/`le`/`gt`/`ge`, `direction:read`/`direction:write`,
/// the `unclassified` sentinel, and the `done` marker.
pub fn compile(rule: &str) -> Result<CompiledRule> {
    let mut terminal = false;
    let mut terms = Vec::new();

    for disjunct in rule.split('|') {
        let mut conjunction = Vec::new();
        for clause in disjunct.split('&') {
            let clause = clause.trim();
            if clause.is_empty() {
                return Err(MalformedRule::EmptyClause);
            }
            if clause == "done" {
                terminal = true;
                continue;
            }
            conjunction.push(parse_clause(clause)?);
        }
        if !conjunction.is_empty() {
            terms.push(conjunction);
        }
    }

    if terms.is_empty() {
        return Err(MalformedRule::EmptyRule);
    }

    // The sentinel only makes sense as a class's entire rule: it is skipped
    // during the ordered scan, so any clause combined with it could never
    // be evaluated
    let clause_count: usize = terms.iter().map(Vec::len).sum();
    let has_sentinel = terms
        .iter()
        .flatten()
        .any(|rule| matches!(rule, Rule::Unclassified));
    if has_sentinel && clause_count > 1 {
        return Err(MalformedRule::UnclassifiedCombined);
    }

    Ok(CompiledRule {
        predicate: Predicate::new(terms),
        terminal,
    })
}

fn parse_clause(clause: &str) -> Result<Rule> {
    let (keyword, operand) = match clause.split_once(':') {
        Some((keyword, operand)) => (keyword.trim(), Some(operand.trim())),
        None => (clause, None),
    };

    match keyword {
        "unclassified" => match operand {
            None => Ok(Rule::Unclassified),
            Some(operand) => Err(MalformedRule::InvalidOperand {
                attribute: "unclassified",
                operand: operand.to_string(),
            }),
        },
        "extension" => match operand {
            Some(ext) if !ext.is_empty() => Ok(Rule::Extension(ext.to_string())),
            _ => Err(MalformedRule::InvalidOperand {
                attribute: "extension",
                operand: operand.unwrap_or_default().to_string(),
            }),
        },
        "file_offset" => {
            let (cmp, value) = parse_comparison("file_offset", operand)?;
            Ok(Rule::FileOffset(cmp, value))
        }
        "file_size" => {
            let (cmp, value) = parse_comparison("file_size", operand)?;
            Ok(Rule::FileSize(cmp, value))
        }
        "direction" => match operand {
            Some("read") => Ok(Rule::Direction(IoDirection::Read)),
            Some("write") => Ok(Rule::Direction(IoDirection::Write)),
            _ => Err(MalformedRule::InvalidOperand {
                attribute: "direction",
                operand: operand.unwrap_or_default().to_string(),
            }),
        },
        other => Err(MalformedRule::UnknownAttribute(other.to_string())),
    }
}

fn parse_comparison(attribute: &'static str, operand: Option<&str>) -> Result<(Comparator, u64)> {
    let spec = operand.unwrap_or_default();
    let (cmp, value) = spec
        .split_once(':')
        .ok_or_else(|| MalformedRule::UnknownComparator {
            attribute,
            comparator: spec.to_string(),
        })?;

    let cmp = match cmp.trim() {
        "eq" => Comparator::Eq,
        "lt" => Comparator::Lt,
        "le" => Comparator::Le,
        "gt" => Comparator::Gt,
        "ge" => Comparator::Ge,
        other => {
            return Err(MalformedRule::UnknownComparator {
                attribute,
                comparator: other.to_string(),
            })
        }
    };

    let value = value.trim();
    let value = value.parse::<u64>().map_err(|_| MalformedRule::InvalidOperand {
        attribute,
        operand: value.to_string(),
    })?;

    Ok((cmp, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::RequestContext;

    fn write_ctx(extension: Option<&str>, offset: u64, size: Option<u64>) -> RequestContext {
        RequestContext {
            file_extension: extension.map(str::to_string),
            file_offset: offset,
            file_size: size,
            direction: IoDirection::Write,
        }
    }

    #[test]
    fn compiles_single_extension_clause() {
        let compiled = compile("extension:tmp").unwrap();
        assert!(!compiled.terminal);
        assert!(compiled.predicate.matches(&write_ctx(Some("tmp"), 0, None)));
        assert!(!compiled.predicate.matches(&write_ctx(Some("txt"), 0, None)));
    }

    #[test]
    fn done_sets_terminal_flag_without_a_predicate() {
        let compiled = compile("extension:tmp&done").unwrap();
        assert!(compiled.terminal);
        assert!(compiled.predicate.matches(&write_ctx(Some("tmp"), 0, None)));
    }

    #[test]
    fn and_binds_tighter_than_or() {
        // (extension:a & file_size:gt:100) | (extension:b & file_size:lt:10)
        let compiled = compile("extension:a&file_size:gt:100|extension:b&file_size:lt:10").unwrap();
        let p = &compiled.predicate;
        assert!(p.matches(&write_ctx(Some("a"), 0, Some(200))));
        assert!(!p.matches(&write_ctx(Some("a"), 0, Some(5))));
        assert!(p.matches(&write_ctx(Some("b"), 0, Some(5))));
        assert!(!p.matches(&write_ctx(Some("b"), 0, Some(200))));
    }

    #[test]
    fn compiles_offset_window() {
        let compiled = compile("file_offset:gt:16384&file_offset:lt:65536&done").unwrap();
        assert!(compiled.terminal);
        assert!(compiled.predicate.matches(&write_ctx(None, 20480, None)));
        assert!(!compiled.predicate.matches(&write_ctx(None, 0, None)));
        assert!(!compiled.predicate.matches(&write_ctx(None, 16384, None)));
        assert!(!compiled.predicate.matches(&write_ctx(None, 65536, None)));
    }

    #[test]
    fn compiles_direction_clause() {
        let compiled = compile("direction:read").unwrap();
        let read = RequestContext::new(IoDirection::Read);
        let write = RequestContext::new(IoDirection::Write);
        assert!(compiled.predicate.matches(&read));
        assert!(!compiled.predicate.matches(&write));
    }

    #[test]
    fn rejects_unknown_attribute() {
        assert!(matches!(
            compile("wlth:eq:1"),
            Err(MalformedRule::UnknownAttribute(ref kw)) if kw == "wlth"
        ));
    }

    #[test]
    fn rejects_unknown_comparator() {
        assert!(matches!(
            compile("file_size:between:100"),
            Err(MalformedRule::UnknownComparator { attribute: "file_size", .. })
        ));
        // Numeric attributes need an explicit comparator
        assert!(matches!(
            compile("file_offset:4096"),
            Err(MalformedRule::UnknownComparator { attribute: "file_offset", .. })
        ));
    }

    #[test]
    fn rejects_unparsable_operand() {
        assert!(matches!(
            compile("file_size:gt:huge"),
            Err(MalformedRule::InvalidOperand { attribute: "file_size", .. })
        ));
        assert!(matches!(
            compile("extension:"),
            Err(MalformedRule::InvalidOperand { attribute: "extension", .. })
        ));
        assert!(matches!(
            compile("direction:sideways"),
            Err(MalformedRule::InvalidOperand { attribute: "direction", .. })
        ));
    }

    #[test]
    fn rejects_empty_clauses_and_empty_rules() {
        assert!(matches!(compile(""), Err(MalformedRule::EmptyClause)));
        assert!(matches!(
            compile("extension:tmp&&done"),
            Err(MalformedRule::EmptyClause)
        ));
        assert!(matches!(
            compile("extension:tmp|"),
            Err(MalformedRule::EmptyClause)
        ));
        assert!(matches!(compile("done"), Err(MalformedRule::EmptyRule)));
    }

    #[test]
    fn rejects_unclassified_combined_with_other_clauses() {
        assert!(matches!(
            compile("unclassified|extension:tmp"),
            Err(MalformedRule::UnclassifiedCombined)
        ));
        assert!(matches!(
            compile("unclassified&extension:tmp"),
            Err(MalformedRule::UnclassifiedCombined)
        ));
        // Standalone forms stay valid, with or without the done marker
        assert!(compile("unclassified").is_ok());
        assert!(compile("unclassified&done").is_ok());
    }

    #[test]
    fn whitespace_around_tokens_is_tolerated() {
        let compiled = compile(" extension:tmp & file_size:ge: 4096 ").unwrap();
        assert!(compiled
            .predicate
            .matches(&write_ctx(Some("tmp"), 0, Some(4096))));
    }
}
