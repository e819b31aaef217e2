//! Caller-supplied SQL fragments and equality filters.

use std::fmt;

use sqlrecord_core::Value;

/// A raw SQL fragment appended verbatim to a generated statement.
///
/// **Not escaped.** Whatever goes in here reaches the database as written,
/// so it must never carry untrusted input; bind values through the
/// statement parameters instead and reference them with placeholders.
/// Typical uses are `ORDER BY name` trailers and `WHERE ...` conditions
/// for `count` and `find_all`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawSql(String);

impl RawSql {
    /// Wrap caller-escaped SQL.
    pub fn new(sql: impl Into<String>) -> Self {
        Self(sql.into())
    }

    /// The fragment text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the fragment is empty after trimming.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for RawSql {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RawSql {
    fn from(sql: &str) -> Self {
        Self::new(sql)
    }
}

impl From<String> for RawSql {
    fn from(sql: String) -> Self {
        Self(sql)
    }
}

/// Conjunctive equality filter: `c1 = ? AND c2 = ? ...`.
///
/// Pairs keep insertion order, which is also the parameter binding order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Filter {
    pairs: Vec<(String, Value)>,
}

impl Filter {
    /// Empty filter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an equality condition.
    pub fn eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.pairs.push((column.into(), value.into()));
        self
    }

    /// Add an equality condition in place.
    pub fn push(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        self.pairs.push((column.into(), value.into()));
    }

    /// Conditions in binding order.
    pub fn pairs(&self) -> &[(String, Value)] {
        &self.pairs
    }

    /// Column names in binding order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.pairs.iter().map(|(c, _)| c.as_str())
    }

    /// Bound values in order.
    pub fn values(&self) -> Vec<Value> {
        self.pairs.iter().map(|(_, v)| v.clone()).collect()
    }

    /// Number of conditions.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Whether there are no conditions.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Filter {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            pairs: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
