//! Value-level checks behind the record validation rules.
//!
//! The rules themselves live on the record (they need its state and, for
//! uniqueness and foreign keys, the gateway). These helpers are the pure
//! parts: presence, length bounds and cached regex matching.

use std::collections::HashMap;
use std::sync::{OnceLock, PoisonError, RwLock};

use regex::Regex;

use crate::value::Value;

/// Process-wide cache of compiled patterns.
///
/// Patterns come from entity definitions and are few, so entries are never
/// evicted.
struct RegexCache {
    cache: RwLock<HashMap<String, Regex>>,
}

impl RegexCache {
    fn new() -> Self {
        Self {
            cache: RwLock::new(HashMap::new()),
        }
    }

    fn get_or_compile(&self, pattern: &str) -> Result<Regex, regex::Error> {
        {
            let cache = self.cache.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(regex) = cache.get(pattern) {
                return Ok(regex.clone());
            }
        }

        let regex = Regex::new(pattern)?;
        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(pattern.to_string(), regex.clone());
        Ok(regex)
    }
}

fn regex_cache() -> &'static RegexCache {
    static CACHE: OnceLock<RegexCache> = OnceLock::new();
    CACHE.get_or_init(RegexCache::new)
}

/// Whether `value` matches `pattern`.
///
/// An invalid pattern never matches; it is logged once per call so the
/// failing rule is visible.
pub fn matches_pattern(value: &str, pattern: &str) -> bool {
    match regex_cache().get_or_compile(pattern) {
        Ok(regex) => regex.is_match(value),
        Err(e) => {
            tracing::warn!(
                pattern = pattern,
                error = %e,
                "Invalid regex pattern in validation, treating as non-match"
            );
            false
        }
    }
}

/// Presence: not NULL and not the empty string.
pub fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Text(s) => !s.is_empty(),
        _ => true,
    }
}

/// Character length of the value's text rendering is within `[min, max]`,
/// or at least `min` when `max` is `None`.
pub fn length_within(value: &Value, min: usize, max: Option<usize>) -> bool {
    let len = value.to_text().chars().count();
    len >= min && max.is_none_or(|max| len <= max)
}
