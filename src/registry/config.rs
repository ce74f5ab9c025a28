//! Textual class configuration.
//!
//! One class per line, fields comma-separated:
//!
//! ```text
//! # ioclass_id,eviction_priority,allocation,rule
//! 0,255,0,unclassified
//! 1,1,1,extension:tmp&done
//! 2,3,1,file_size:ge:1048576
//! ```
//!
//! `#` starts a comment and blank lines are ignored. The rule field is the
//! grammar accepted by [`crate::rule::compile`]; it is the last field, so it
//! may not contain commas.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::errors::{MalformedRule, Result};

/// One class definition in the order it will be classified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassRecord {
    pub ioclass_id: u32,
    /// Lower loads first per the external eviction policy contract.
    #[serde(default = "default_eviction_priority")]
    pub eviction_priority: u32,
    /// Whether data classified into this class may be cached at all.
    #[serde(default)]
    pub allocation: bool,
    pub rule: String,
}

fn default_eviction_priority() -> u32 {
    255
}

impl ClassRecord {
    pub fn new(ioclass_id: u32, eviction_priority: u32, allocation: bool, rule: impl Into<String>) -> Self {
        Self {
            ioclass_id,
            eviction_priority,
            allocation,
            rule: rule.into(),
        }
    }
}

/// Parse the line-oriented configuration format into ordered class records.
///
/// Rules themselves are not compiled here; [`crate::registry::ClassRegistry::load`]
/// does that, so a grammar error and a record-shape error both surface from
/// the same load call.
pub fn parse_config(text: &str) -> Result<Vec<ClassRecord>> {
    let mut records = Vec::new();
    for (index, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        records.push(parse_record(index + 1, line)?);
    }
    Ok(records)
}

fn parse_record(line_no: usize, line: &str) -> Result<ClassRecord> {
    let fields: Vec<&str> = line.splitn(4, ',').map(str::trim).collect();
    if fields.len() != 4 {
        return Err(MalformedRule::record(
            line_no,
            format!(
                "expected `ioclass_id,eviction_priority,allocation,rule`, found {} fields",
                fields.len()
            ),
        ));
    }

    let ioclass_id = fields[0]
        .parse::<u32>()
        .map_err(|_| MalformedRule::record(line_no, format!("bad ioclass_id {:?}", fields[0])))?;
    let eviction_priority = fields[1].parse::<u32>().map_err(|_| {
        MalformedRule::record(line_no, format!("bad eviction_priority {:?}", fields[1]))
    })?;
    let allocation = parse_bool(fields[2])
        .ok_or_else(|| MalformedRule::record(line_no, format!("bad allocation {:?}", fields[2])))?;

    Ok(ClassRecord {
        ioclass_id,
        eviction_priority,
        allocation,
        rule: fields[3].to_string(),
    })
}

fn parse_bool(field: &str) -> Option<bool> {
    match field {
        "1" | "true" => Some(true),
        "0" | "false" => Some(false),
        _ => None,
    }
}

/// Read and parse a configuration file.
pub fn load_config_file(path: &Path) -> Result<Vec<ClassRecord>> {
    let contents = fs::read_to_string(path).map_err(|source| MalformedRule::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let records = parse_config(&contents)?;
    log::debug!(
        "parsed {} class records from {}",
        records.len(),
        path.display()
    );
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_records_skipping_comments_and_blanks() {
        let text = indoc! {"
            # ioclass_id,eviction_priority,allocation,rule
            0,255,0,unclassified

            1,1,1,extension:tmp&done
            2,3,true,file_size:ge:1048576
        "};
        let records = parse_config(text).unwrap();
        assert_eq!(
            records,
            vec![
                ClassRecord::new(0, 255, false, "unclassified"),
                ClassRecord::new(1, 1, true, "extension:tmp&done"),
                ClassRecord::new(2, 3, true, "file_size:ge:1048576"),
            ]
        );
    }

    #[test]
    fn record_order_is_preserved() {
        let records = parse_config("5,1,1,extension:a\n1,1,1,extension:b\n").unwrap();
        assert_eq!(records[0].ioclass_id, 5);
        assert_eq!(records[1].ioclass_id, 1);
    }

    #[test]
    fn rejects_short_records() {
        let err = parse_config("1,1,extension:tmp").unwrap_err();
        assert!(matches!(err, MalformedRule::MalformedRecord { line: 1, .. }));
    }

    #[test]
    fn rejects_bad_fields_with_line_numbers() {
        let err = parse_config("0,255,0,unclassified\nx,1,1,extension:tmp").unwrap_err();
        assert!(matches!(err, MalformedRule::MalformedRecord { line: 2, .. }));

        let err = parse_config("1,first,1,extension:tmp").unwrap_err();
        assert!(matches!(err, MalformedRule::MalformedRecord { line: 1, .. }));

        let err = parse_config("1,1,yes,extension:tmp").unwrap_err();
        assert!(matches!(err, MalformedRule::MalformedRecord { line: 1, .. }));
    }

    #[test]
    fn loads_config_from_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ioclass.conf");
        std::fs::write(&path, "1,1,1,extension:tmp&done\n").unwrap();

        let records = load_config_file(&path).unwrap();
        assert_eq!(records, vec![ClassRecord::new(1, 1, true, "extension:tmp&done")]);
    }

    #[test]
    fn missing_file_surfaces_an_io_error() {
        let err = load_config_file(Path::new("/nonexistent/ioclass.conf")).unwrap_err();
        assert!(matches!(err, MalformedRule::Io { .. }));
    }
}
