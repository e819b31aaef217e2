//! Parser for dynamic accessor and finder names.
//!
//! Names such as `find_by_name_and_email` or `set_status` are turned into a
//! structured [`DynamicMethod`] once, up front; nothing downstream matches
//! on strings. Recognized shapes (lower snake case):
//!
//! | name                                   | meaning                          |
//! |----------------------------------------|----------------------------------|
//! | `find_by_<c1>_and_<c2>...`             | load one row into the record     |
//! | `find_all_by_<c1>_and_<c2>...`         | load many records                |
//! | `find_all_as_array_by_<c1>_and_<c2>...`| load many raw rows               |
//! | `get_<column>`                         | read a column                    |
//! | `set_<column>`                         | write a column                   |

use std::sync::OnceLock;

use regex::Regex;
use sqlrecord_core::{Error, Result, Value};

use crate::fragment::Filter;

/// What a dynamic finder returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinderKind {
    /// Single row, loaded in place.
    One,
    /// Many records.
    All,
    /// Many raw rows.
    AllAsRows,
}

/// A parsed dynamic method name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DynamicMethod {
    /// Equality finder over `columns`, bound positionally.
    Find {
        kind: FinderKind,
        columns: Vec<String>,
    },
    /// Column read.
    Get(String),
    /// Column write.
    Set(String),
}

fn method_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(find_all_as_array_by|find_all_by|find_by|get|set)_(.*)$")
            .unwrap_or_else(|e| unreachable!("static method pattern: {e}"))
    })
}

fn is_token(s: &str) -> bool {
    !s.is_empty()
        && s
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_')
}

impl DynamicMethod {
    /// Parse a method name.
    ///
    /// Fails with `UnknownMethod` for unrecognized names (including any
    /// character outside `[a-z0-9_]` in the suffix) and `MissingParameters`
    /// when the prefix matches but names no column.
    pub fn parse(method: &str) -> Result<Self> {
        let unknown = || Error::UnknownMethod {
            method: method.to_string(),
        };
        let missing = || Error::MissingParameters {
            method: method.to_string(),
        };

        let caps = method_pattern().captures(method).ok_or_else(unknown)?;
        let prefix = caps.get(1).map_or("", |m| m.as_str());
        let suffix = caps.get(2).map_or("", |m| m.as_str());

        if suffix.is_empty() {
            return Err(missing());
        }
        if !is_token(suffix) {
            return Err(unknown());
        }

        let kind = match prefix {
            "get" => return Ok(DynamicMethod::Get(suffix.to_string())),
            "set" => return Ok(DynamicMethod::Set(suffix.to_string())),
            "find_by" => FinderKind::One,
            "find_all_by" => FinderKind::All,
            "find_all_as_array_by" => FinderKind::AllAsRows,
            _ => return Err(unknown()),
        };

        let columns: Vec<String> = suffix.split("_and_").map(str::to_string).collect();
        if columns.iter().any(|c| c.is_empty() || c.starts_with('_') || c.ends_with('_')) {
            return Err(missing());
        }
        Ok(DynamicMethod::Find { kind, columns })
    }

    /// Pair finder columns with positional arguments.
    ///
    /// The counts must match exactly.
    pub fn bind(method: &str, columns: &[String], args: Vec<Value>) -> Result<Filter> {
        if columns.len() != args.len() {
            return Err(Error::ArityMismatch {
                method: method.to_string(),
                expected: columns.len(),
                got: args.len(),
            });
        }
        Ok(columns.iter().cloned().zip(args).collect())
    }
}
