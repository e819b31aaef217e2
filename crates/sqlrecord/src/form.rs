//! Bulk assignment from submitted form fields and form field export.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use sqlrecord_core::{Gateway, Result, TypeClass, Value};

use crate::record::Record;

/// One editable column, ready to render as a form input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormField {
    /// Column name.
    pub name: String,
    /// Owning table.
    pub table: String,
    /// Current value, else the column default, else the empty string.
    pub value: Value,
    /// Vendor type name.
    pub data_type: String,
    /// Unified type family.
    pub type_class: TypeClass,
    /// Declared maximum length.
    pub max_length: Option<u32>,
    /// Whether the column accepts NULL.
    pub nullable: bool,
    /// Whether the column renders as a checkbox.
    pub checkbox: bool,
}

impl<G: Gateway> Record<'_, G> {
    /// Assign columns from submitted form fields.
    ///
    /// - protected columns are skipped,
    /// - checkbox-typed columns become `true` when the field is present and
    ///   `false` when it is absent,
    /// - integer-typed columns keep only the digits of the field (no digits
    ///   means `0`),
    /// - any other present field is assigned trimmed; absent ones are left
    ///   alone.
    pub fn assign_from_form(&mut self, fields: &HashMap<String, String>) -> Result<()> {
        let db = self.db;
        let config = db.config();
        let schema = Arc::clone(&self.schema);
        for column in schema.columns() {
            if self.is_protected(&column.name) {
                continue;
            }
            let submitted = fields.get(&column.name);
            if column.has_type_in(&config.checkbox_types) {
                self.set(&column.name, submitted.is_some())?;
                continue;
            }
            let Some(raw) = submitted else {
                continue;
            };
            let value = if column.has_type_in(&config.integer_types) {
                Value::BigInt(digits_only(raw))
            } else {
                Value::Text(raw.trim().to_string())
            };
            self.set(&column.name, value)?;
        }
        Ok(())
    }

    /// Columns a form should offer: everything except foreign keys and
    /// protected columns, in schema order.
    pub fn fields_for_form(&self) -> Vec<FormField> {
        let config = self.db.config();
        self.column_states()
            .filter(|c| !c.metadata.is_foreign_key() && !self.is_protected(&c.metadata.name))
            .map(|c| {
                let column = c.metadata;
                let value = if c.is_set() {
                    c.value.clone()
                } else {
                    column
                        .default_value
                        .as_deref()
                        .map_or_else(|| Value::from(""), |d| Value::from(unquote(d)))
                };
                FormField {
                    name: column.name.clone(),
                    table: self.table().to_string(),
                    value,
                    data_type: column.data_type.clone(),
                    type_class: column.type_class(),
                    max_length: column.max_length,
                    nullable: !column.not_null,
                    checkbox: column.has_type_in(&config.checkbox_types),
                }
            })
            .collect()
    }
}

fn digits_only(raw: &str) -> i64 {
    let digits: String = raw.trim().chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return 0;
    }
    digits.parse().unwrap_or(i64::MAX)
}

/// `'active'` -> `active`; anything else unchanged.
fn unquote(literal: &str) -> &str {
    literal
        .strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
        .unwrap_or(literal)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digits_only() {
        assert_eq!(digits_only(" 1,234 "), 1234);
        assert_eq!(digits_only("abc"), 0);
        assert_eq!(digits_only("-42"), 42);
        assert_eq!(digits_only("99999999999999999999"), i64::MAX);
    }

    #[test]
    fn test_unquote() {
        assert_eq!(unquote("'active'"), "active");
        assert_eq!(unquote("0"), "0");
        assert_eq!(unquote("CURRENT_TIMESTAMP"), "CURRENT_TIMESTAMP");
    }
}
