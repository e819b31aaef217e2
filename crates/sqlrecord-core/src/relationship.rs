//! Declared relations between tables.
//!
//! Introspection already tells us which columns are foreign keys. A
//! [`BelongsTo`] gives such a column a name (`customer` via `customer_id`)
//! so callers reach the related record through an explicit accessor, and
//! may pin the target when the schema does not declare the constraint.

use crate::column::{ForeignKeyRef, TableSchema};
use crate::error::SchemaError;

/// Many-to-one relation: this record's `via` column points at one row of
/// another table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BelongsTo {
    /// Relation name used by callers (e.g. `"customer"`).
    pub name: String,
    /// Owning foreign-key column (e.g. `"customer_id"`).
    pub via: String,
    /// Explicit target, overriding the introspected foreign key.
    pub target: Option<ForeignKeyRef>,
}

impl BelongsTo {
    /// Declare a relation resolved through the introspected foreign key of
    /// `via`.
    pub fn new(name: impl Into<String>, via: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            via: via.into(),
            target: None,
        }
    }

    /// Pin the target table and column.
    pub fn references(mut self, table: impl Into<String>, column: impl Into<String>) -> Self {
        self.target = Some(ForeignKeyRef::new(table, column));
        self
    }

    /// Resolve the target against `schema`.
    pub fn target_in(&self, schema: &TableSchema) -> Result<ForeignKeyRef, SchemaError> {
        if let Some(target) = &self.target {
            return Ok(target.clone());
        }
        schema
            .column(&self.via)
            .and_then(|c| c.foreign_key.clone())
            .ok_or_else(|| SchemaError::NotAForeignKey {
                table: schema.table().to_string(),
                column: self.via.clone(),
            })
    }
}

/// Conventional foreign-key column for a relation name: `customer` →
/// `customer_id`.
pub fn conventional_fk_column(relation: &str) -> String {
    format!("{relation}_id")
}
