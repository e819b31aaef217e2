//! Column and table metadata discovered by schema introspection.

use std::collections::HashMap;

use serde::Serialize;

use crate::types::TypeClass;
use crate::value::Value;

/// Target of a foreign-key column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ForeignKeyRef {
    /// Referenced table name.
    pub table: String,
    /// Referenced column on that table.
    pub column: String,
}

impl ForeignKeyRef {
    /// Create a foreign-key target.
    pub fn new(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
        }
    }
}

/// Metadata about one database column.
///
/// Produced by a gateway and never mutated after the owning
/// [`TableSchema`] is built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnMetadata {
    /// Column name in the database.
    pub name: String,
    /// Vendor type name as reported by the driver (e.g. `varchar`, `int4`).
    pub data_type: String,
    /// Declared size, when the type carries one.
    pub max_length: Option<u32>,
    /// Default expression, emitted verbatim into INSERT statements.
    pub default_value: Option<String>,
    /// Whether the column rejects NULL.
    pub not_null: bool,
    /// Whether the column is (part of) the primary key.
    pub is_primary_key: bool,
    /// Foreign-key target, if the column references another table.
    pub foreign_key: Option<ForeignKeyRef>,
}

impl ColumnMetadata {
    /// Create metadata with only a name and vendor type.
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            max_length: None,
            default_value: None,
            not_null: false,
            is_primary_key: false,
            foreign_key: None,
        }
    }

    /// Set the declared size.
    pub fn max_length(mut self, len: u32) -> Self {
        self.max_length = Some(len);
        self
    }

    /// Set the default expression.
    pub fn default_value(mut self, expr: impl Into<String>) -> Self {
        self.default_value = Some(expr.into());
        self
    }

    /// Mark as NOT NULL.
    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    /// Mark as primary key.
    pub fn primary_key(mut self) -> Self {
        self.is_primary_key = true;
        self
    }

    /// Attach a foreign-key target.
    pub fn references(mut self, table: impl Into<String>, column: impl Into<String>) -> Self {
        self.foreign_key = Some(ForeignKeyRef::new(table, column));
        self
    }

    /// Whether the column references another table.
    pub fn is_foreign_key(&self) -> bool {
        self.foreign_key.is_some()
    }

    /// Unified classification of the vendor type.
    pub fn type_class(&self) -> TypeClass {
        TypeClass::classify(&self.data_type)
    }

    /// Whether the vendor type is one of `types` (case-insensitive).
    pub fn has_type_in<S: AsRef<str>>(&self, types: &[S]) -> bool {
        types
            .iter()
            .any(|t| t.as_ref().eq_ignore_ascii_case(&self.data_type))
    }
}

/// Ordered, immutable column set for one table.
///
/// Column order is the order the gateway reported, which is also the order
/// used for INSERT column lists and UPDATE SET lists.
#[derive(Debug, Clone, PartialEq)]
pub struct TableSchema {
    table: String,
    columns: Vec<ColumnMetadata>,
    index: HashMap<String, usize>,
    primary_key: Option<usize>,
}

impl TableSchema {
    /// Build a schema from ordered columns.
    ///
    /// The primary key is the first column flagged `is_primary_key`.
    pub fn new(table: impl Into<String>, columns: Vec<ColumnMetadata>) -> Self {
        let index = columns
            .iter()
            .enumerate()
            .map(|(i, c)| (c.name.clone(), i))
            .collect();
        let primary_key = columns.iter().position(|c| c.is_primary_key);
        Self {
            table: table.into(),
            columns,
            index,
            primary_key,
        }
    }

    /// Table name.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Columns in order.
    pub fn columns(&self) -> &[ColumnMetadata] {
        &self.columns
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether the table has no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Position of a column.
    pub fn position(&self, column: &str) -> Option<usize> {
        self.index.get(column).copied()
    }

    /// Metadata by column name.
    pub fn column(&self, column: &str) -> Option<&ColumnMetadata> {
        self.position(column).map(|i| &self.columns[i])
    }

    /// Whether the named column exists.
    pub fn has_column(&self, column: &str) -> bool {
        self.index.contains_key(column)
    }

    /// Primary key column metadata.
    pub fn primary_key(&self) -> Option<&ColumnMetadata> {
        self.primary_key.map(|i| &self.columns[i])
    }

    /// Position of the primary key column.
    pub fn primary_key_position(&self) -> Option<usize> {
        self.primary_key
    }

    /// Columns that reference another table.
    pub fn foreign_key_columns(&self) -> impl Iterator<Item = &ColumnMetadata> {
        self.columns.iter().filter(|c| c.is_foreign_key())
    }
}

/// Borrowed view of one column of a record: its metadata and current value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnState<'a> {
    /// Shared metadata.
    pub metadata: &'a ColumnMetadata,
    /// Current value; `Null` until set or loaded.
    pub value: &'a Value,
}

impl ColumnState<'_> {
    /// Whether the value has been set or loaded.
    pub fn is_set(&self) -> bool {
        !self.value.is_null()
    }
}
