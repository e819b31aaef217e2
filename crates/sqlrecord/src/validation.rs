//! Validation rules and the error list.
//!
//! Rules are called explicitly, usually from a `BeforeValidate` hook. A
//! failing rule appends a message to the record; [`Record::validate`] only
//! checks whether any message has accumulated.

use sqlrecord_core::validate::{is_present, length_within, matches_pattern};
use sqlrecord_core::{Error, Gateway, Result, SchemaError, humanize};
use sqlrecord_query::Filter;

use crate::record::Record;
use crate::relation::ForeignKeyResolver;

impl<G: Gateway> Record<'_, G> {
    /// Append a validation error.
    pub fn add_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    /// Accumulated validation errors, oldest first.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Forget every validation error.
    pub fn clear_errors(&mut self) {
        self.errors.clear();
    }

    /// Whether no validation error has been recorded.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Validity check used by persistence. Runs no rules.
    pub fn validate(&self) -> bool {
        self.is_valid()
    }

    fn fail(&mut self, message: Option<&str>, default: impl FnOnce() -> String) -> bool {
        let message = message.map_or_else(default, str::to_string);
        self.add_error(message);
        false
    }

    /// `column` must be set and not the empty string.
    pub fn validates_presence_of(&mut self, column: &str, message: Option<&str>) -> Result<bool> {
        if is_present(self.get(column)?) {
            return Ok(true);
        }
        Ok(self.fail(message, || format!("{} cannot be empty", humanize(column))))
    }

    /// No other row may carry the same values in `columns`.
    ///
    /// The record's own row is excluded once it has a primary key.
    pub fn validates_uniqueness_of(
        &mut self,
        columns: &[&str],
        message: Option<&str>,
    ) -> Result<bool> {
        let mut filter = Filter::new();
        for column in columns {
            filter.push(*column, self.get(column)?.clone());
        }
        let exclude = match (self.primary_key(), self.primary_key_value()) {
            (Some(pk), Some(id)) if !id.is_null() => Some((pk.name.as_str(), id)),
            _ => None,
        };
        let stmt = self
            .db
            .query_builder()
            .exists(self.table(), &filter, exclude)?;
        if self.db.fetch_cell(&stmt)?.is_none() {
            return Ok(true);
        }
        let label = columns.join(", ");
        Ok(self.fail(message, || format!("{} is not unique", humanize(&label))))
    }

    /// The text of `column` must be between `min` and `max` characters
    /// long; without `max` only the lower bound applies.
    pub fn validates_length_of(
        &mut self,
        column: &str,
        min: usize,
        max: Option<usize>,
        message: Option<&str>,
    ) -> Result<bool> {
        if length_within(self.get(column)?, min, max) {
            return Ok(true);
        }
        Ok(self.fail(message, || match max {
            Some(max) => format!(
                "{} must be between {min} and {max} characters",
                humanize(column)
            ),
            None => format!("{} must be at least {min} characters", humanize(column)),
        }))
    }

    /// The foreign key in `column` must point at an existing row.
    ///
    /// A column that is not a foreign key always fails. A hit is cached as
    /// the related record.
    pub fn validates_foreign_key_exists(
        &mut self,
        column: &str,
        message: Option<&str>,
    ) -> Result<bool> {
        match ForeignKeyResolver::resolve(self, column) {
            Ok(Some(related)) => {
                self.related.insert(related.table().to_string(), related);
                Ok(true)
            }
            Ok(None) | Err(Error::Schema(SchemaError::NotAForeignKey { .. })) => {
                Ok(self.fail(message, || format!("{column} foreign key is not valid")))
            }
            Err(err) => Err(err),
        }
    }

    /// The text of `column` must match the regular expression `pattern`.
    ///
    /// An invalid pattern never matches.
    pub fn validates_format_of(
        &mut self,
        column: &str,
        pattern: &str,
        message: Option<&str>,
    ) -> Result<bool> {
        if matches_pattern(&self.get(column)?.to_text(), pattern) {
            return Ok(true);
        }
        Ok(self.fail(message, || format!("{} is invalid", humanize(column))))
    }
}
