//! Schema-driven records.
//!
//! A [`Record`] is one row of one table. Its column set comes from the
//! shared [`TableSchema`] and never changes; only the values do. Values are
//! kept in schema order, so the column list and the value list of every
//! generated INSERT or UPDATE line up by construction.
//!
//! This module holds column state and accessors. Persistence, dynamic
//! dispatch, relations, validation and form handling are further `impl`
//! blocks in their own modules.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use sqlrecord_core::{
    ColumnMetadata, ColumnState, Error, FromValue, Gateway, Result, Row, TableSchema, Value,
};

use crate::database::Database;
use crate::entity::EntityDef;

/// One row of a table, bound to a [`Database`].
pub struct Record<'db, G> {
    pub(crate) db: &'db Database<G>,
    pub(crate) schema: Arc<TableSchema>,
    pub(crate) entity: Option<&'db EntityDef<G>>,
    pub(crate) values: Vec<Value>,
    pub(crate) errors: Vec<String>,
    pub(crate) protected: Vec<String>,
    /// Resolved related records keyed by referenced table.
    pub(crate) related: HashMap<String, Record<'db, G>>,
}

impl<'db, G: Gateway> Record<'db, G> {
    pub(crate) fn new(
        db: &'db Database<G>,
        schema: Arc<TableSchema>,
        entity: Option<&'db EntityDef<G>>,
    ) -> Self {
        let mut protected = db.config().default_protected_fields.clone();
        if let Some(entity) = entity {
            for field in entity.protected_fields() {
                if !protected.contains(field) {
                    protected.push(field.clone());
                }
            }
        }
        Self {
            db,
            values: vec![Value::Null; schema.len()],
            schema,
            entity,
            errors: Vec::new(),
            protected,
            related: HashMap::new(),
        }
    }

    /// A fresh, empty record of the same table.
    pub fn sibling(&self) -> Record<'db, G> {
        Record::new(self.db, Arc::clone(&self.schema), self.entity)
    }

    /// Table name.
    pub fn table(&self) -> &str {
        self.schema.table()
    }

    /// Shared table schema.
    pub fn schema(&self) -> &Arc<TableSchema> {
        &self.schema
    }

    /// Database the record belongs to.
    pub fn database(&self) -> &'db Database<G> {
        self.db
    }

    /// Entity definition, if one was registered for the table.
    pub fn entity(&self) -> Option<&'db EntityDef<G>> {
        self.entity
    }

    fn position(&self, column: &str) -> Result<usize> {
        self.schema
            .position(column)
            .ok_or_else(|| Error::unknown_property(self.table(), column))
    }

    /// Current value of `column`; `Null` until set or loaded.
    pub fn get(&self, column: &str) -> Result<&Value> {
        Ok(&self.values[self.position(column)?])
    }

    /// Typed value of `column`. `None` when unset or of another shape.
    pub fn get_as<T: FromValue>(&self, column: &str) -> Result<Option<T>> {
        let value = self.get(column)?;
        if value.is_null() {
            return Ok(None);
        }
        Ok(T::from_value(value))
    }

    /// Assign `column`.
    ///
    /// Assigning a foreign-key column drops the cached related record it
    /// pointed at.
    pub fn set(&mut self, column: &str, value: impl Into<Value>) -> Result<()> {
        let idx = self.position(column)?;
        self.values[idx] = value.into();
        for table in self.relation_tables_via(column) {
            self.related.remove(&table);
        }
        Ok(())
    }

    /// Metadata and value of `column`.
    pub fn column_state(&self, column: &str) -> Result<ColumnState<'_>> {
        let idx = self.position(column)?;
        Ok(ColumnState {
            metadata: &self.schema.columns()[idx],
            value: &self.values[idx],
        })
    }

    /// Every column with its value, in schema order.
    pub fn column_states(&self) -> impl Iterator<Item = ColumnState<'_>> {
        self.schema
            .columns()
            .iter()
            .zip(&self.values)
            .map(|(metadata, value)| ColumnState { metadata, value })
    }

    /// Values in schema order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Primary key column, if the table has one.
    pub fn primary_key(&self) -> Option<&ColumnMetadata> {
        self.schema.primary_key()
    }

    /// Primary key value; `None` without a primary key column.
    pub fn primary_key_value(&self) -> Option<&Value> {
        self.schema.primary_key_position().map(|i| &self.values[i])
    }

    /// Whether the table has a primary key.
    pub fn has_primary_key(&self) -> bool {
        self.schema.primary_key().is_some()
    }

    /// Whether the record has not been stored yet: its primary key is unset.
    ///
    /// Tables without a primary key always count as new.
    pub fn is_new(&self) -> bool {
        self.primary_key_value().is_none_or(Value::is_null)
    }

    /// Populate from a result row.
    ///
    /// Columns the row does not carry keep their values; row entries the
    /// table does not have are ignored. Boolean columns are coerced. The
    /// related-record cache is dropped.
    pub fn load_row(&mut self, row: &Row) {
        for (name, value) in row.iter() {
            if let Some(idx) = self.schema.position(name) {
                let coerced = self.coerce(&self.schema.columns()[idx], value);
                self.values[idx] = coerced;
            }
        }
        self.related.clear();
    }

    fn coerce(&self, column: &ColumnMetadata, value: &Value) -> Value {
        let config = self.db.config();
        if !column.has_type_in(&config.boolean_types) {
            return value.clone();
        }
        match value {
            Value::Text(s) => Value::Bool(*s == config.boolean_true_marker),
            Value::Bytes(b) => Value::Bool(b.as_slice() == config.boolean_true_marker.as_bytes()),
            Value::Null => Value::Null,
            other => other.as_bool().map_or_else(|| other.clone(), Value::Bool),
        }
    }

    /// Clear every value, error and cached relation.
    pub fn reset(&mut self) {
        self.values.iter_mut().for_each(|v| *v = Value::Null);
        self.errors.clear();
        self.related.clear();
    }

    /// Protect more columns from form assignment. Existing protections stay.
    pub fn set_protected_fields<I, S>(&mut self, fields: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for field in fields {
            let field = field.into();
            if !self.protected.contains(&field) {
                self.protected.push(field);
            }
        }
    }

    /// Columns protected from form assignment.
    pub fn protected_fields(&self) -> &[String] {
        &self.protected
    }

    /// Whether `column` is protected from form assignment.
    pub fn is_protected(&self, column: &str) -> bool {
        self.protected.iter().any(|p| p == column)
    }

    /// Loose emptiness of `column`: unset, `false`, zero, `""` or `"0"`.
    pub fn is_column_empty(&self, column: &str) -> Result<bool> {
        Ok(self.get(column)?.is_empty())
    }

    /// Assign `value` only when `column` is empty. Returns whether it was
    /// assigned.
    pub fn set_default_value(&mut self, column: &str, value: impl Into<Value>) -> Result<bool> {
        if !self.is_column_empty(column)? {
            return Ok(false);
        }
        self.set(column, value)?;
        Ok(true)
    }

    /// Column values by name.
    pub fn to_map(&self) -> BTreeMap<String, Value> {
        self.column_states()
            .map(|c| (c.metadata.name.clone(), c.value.clone()))
            .collect()
    }

    /// Column values as a JSON object.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.column_states()
                .map(|c| (c.metadata.name.clone(), json_value(c.value)))
                .collect(),
        )
    }

    /// Column values as a row, in schema order.
    pub fn to_row(&self) -> Row {
        Row::new(
            self.schema.columns().iter().map(|c| c.name.clone()).collect(),
            self.values.clone(),
        )
    }
}

fn json_value(value: &Value) -> serde_json::Value {
    use serde_json::Value as Json;
    match value {
        Value::Null => Json::Null,
        Value::Bool(b) => Json::Bool(*b),
        Value::Int(i) => Json::from(*i),
        Value::BigInt(i) => Json::from(*i),
        Value::Double(f) => serde_json::Number::from_f64(*f).map_or(Json::Null, Json::Number),
        Value::Decimal(s) | Value::Text(s) => Json::String(s.clone()),
        Value::Bytes(b) => Json::String(String::from_utf8_lossy(b).into_owned()),
    }
}

impl<G> fmt::Debug for Record<'_, G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (column, value) in self.schema.columns().iter().zip(&self.values) {
            map.entry(&column.name, value);
        }
        map.finish()
    }
}
