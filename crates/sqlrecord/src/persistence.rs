//! Finders and CRUD persistence.

use sqlrecord_core::{Gateway, Result, Row, SchemaError, Value};
use sqlrecord_query::{Filter, RawSql};

use crate::entity::HookPoint;
use crate::record::Record;

impl<'db, G: Gateway> Record<'db, G> {
    fn require_primary_key(&self) -> Result<(usize, String)> {
        let pos = self
            .schema
            .primary_key_position()
            .ok_or_else(|| SchemaError::NoPrimaryKey {
                table: self.table().to_string(),
            })?;
        Ok((pos, self.schema.columns()[pos].name.clone()))
    }

    fn load_first(&mut self, row: Option<Row>) -> bool {
        match row {
            Some(row) => {
                self.load_row(&row);
                true
            }
            None => false,
        }
    }

    fn hydrate(&self, rows: &[Row]) -> Vec<Record<'db, G>> {
        rows.iter()
            .map(|row| {
                let mut record = self.sibling();
                record.load_row(row);
                record
            })
            .collect()
    }

    /// Load the row whose primary key is `id` into this record.
    ///
    /// Returns whether a row was found; on a miss the record is unchanged.
    pub fn find(&mut self, id: impl Into<Value>) -> Result<bool> {
        let (_, pk) = self.require_primary_key()?;
        let stmt = self
            .db
            .query_builder()
            .select_by_id(self.table(), &pk, &id.into());
        let row = self.db.fetch_one(&stmt)?;
        Ok(self.load_first(row))
    }

    /// Load the first row of an arbitrary query into this record.
    pub fn find_by_sql(&mut self, sql: &RawSql, params: &[Value]) -> Result<bool> {
        let stmt = (sql.as_str().to_string(), params.to_vec());
        let row = self.db.fetch_one(&stmt)?;
        Ok(self.load_first(row))
    }

    /// Every row matching `conditions` (a trailing `WHERE ...` / `ORDER BY`
    /// fragment) as records of this table.
    pub fn find_all(
        &self,
        conditions: Option<&RawSql>,
        params: &[Value],
    ) -> Result<Vec<Record<'db, G>>> {
        let rows = self.find_all_as_array(conditions, params)?;
        Ok(self.hydrate(&rows))
    }

    /// Like [`find_all`](Self::find_all) but returns the raw rows.
    pub fn find_all_as_array(
        &self,
        conditions: Option<&RawSql>,
        params: &[Value],
    ) -> Result<Vec<Row>> {
        let stmt = self
            .db
            .query_builder()
            .select_all(self.table(), conditions, params);
        self.db.fetch_all(&stmt)
    }

    /// Load the first row matching every equality in `filter`.
    ///
    /// An empty filter is a `MissingParameters` error, as are the other
    /// column finders given one.
    pub fn find_by_columns(&mut self, filter: &Filter) -> Result<bool> {
        let stmt = self
            .db
            .query_builder()
            .select_by_columns(self.table(), filter, true, None)?;
        let row = self.db.fetch_one(&stmt)?;
        Ok(self.load_first(row))
    }

    /// Every row matching `filter`, as records. `trailing` is appended
    /// after the WHERE clause (e.g. `ORDER BY name`).
    pub fn find_all_by_columns(
        &self,
        filter: &Filter,
        trailing: Option<&RawSql>,
    ) -> Result<Vec<Record<'db, G>>> {
        let rows = self.find_all_as_array_by_columns(filter, trailing)?;
        Ok(self.hydrate(&rows))
    }

    /// Every row matching `filter`, uncoerced.
    pub fn find_all_as_array_by_columns(
        &self,
        filter: &Filter,
        trailing: Option<&RawSql>,
    ) -> Result<Vec<Row>> {
        let stmt = self
            .db
            .query_builder()
            .select_by_columns(self.table(), filter, false, trailing)?;
        self.db.fetch_all(&stmt)
    }

    /// Number of rows matching `conditions`.
    pub fn count(&self, conditions: Option<&RawSql>, params: &[Value]) -> Result<i64> {
        let stmt = self.db.query_builder().count(self.table(), conditions, params);
        Ok(self
            .db
            .fetch_cell(&stmt)?
            .and_then(|v| v.as_i64())
            .unwrap_or(0))
    }

    pub(crate) fn fire(&mut self, point: HookPoint) -> Result<()> {
        if let Some(entity) = self.entity {
            for hook in entity.hooks().at(point) {
                hook(self)?;
            }
        }
        Ok(())
    }

    /// Insert the record.
    ///
    /// Runs `BeforeValidate` and `BeforeInsert`; if errors have been
    /// recorded by then, returns `Ok(None)` without touching the database.
    /// Otherwise runs `BeforeSaveAfterValidate`, inserts, stores the
    /// generated key, runs `AfterInsert` and `AfterSave`, and returns the
    /// key (`Value::Null` for tables without a primary key).
    pub fn insert(&mut self) -> Result<Option<Value>> {
        self.fire(HookPoint::BeforeValidate)?;
        self.fire(HookPoint::BeforeInsert)?;
        if !self.validate() {
            tracing::debug!(table = self.table(), errors = self.errors.len(), "insert rejected");
            return Ok(None);
        }
        self.fire(HookPoint::BeforeSaveAfterValidate)?;

        let stmt = self.db.query_builder().insert(&self.schema, &self.values);
        self.db.run(&stmt)?;

        let id = match self.schema.primary_key_position() {
            Some(pos) => {
                let pk = &self.schema.columns()[pos].name;
                let id = self.db.gateway().last_insert_id(self.table(), pk)?;
                self.values[pos] = id.clone();
                id
            }
            None => Value::Null,
        };
        tracing::info!(table = self.table(), id = %id, "inserted record");

        self.fire(HookPoint::AfterInsert)?;
        self.fire(HookPoint::AfterSave)?;
        Ok(Some(id))
    }

    /// Write every column back to the row identified by the primary key.
    ///
    /// Returns `Ok(false)` when validation errors stop the update.
    pub fn update(&mut self) -> Result<bool> {
        self.fire(HookPoint::BeforeValidate)?;
        self.fire(HookPoint::BeforeUpdate)?;
        if !self.validate() {
            tracing::debug!(table = self.table(), errors = self.errors.len(), "update rejected");
            return Ok(false);
        }
        self.fire(HookPoint::BeforeSaveAfterValidate)?;

        let stmt = self.db.query_builder().update(&self.schema, &self.values)?;
        let affected = self.db.run(&stmt)?;
        tracing::debug!(table = self.table(), affected, "updated record");

        self.fire(HookPoint::AfterUpdate)?;
        self.fire(HookPoint::AfterSave)?;
        Ok(true)
    }

    /// Insert when new, update otherwise. Returns whether it was stored.
    pub fn save(&mut self) -> Result<bool> {
        if self.is_new() {
            Ok(self.insert()?.is_some())
        } else {
            self.update()
        }
    }

    /// Delete the row identified by the primary key.
    ///
    /// The in-memory values are kept. Returns `false` for a record that was
    /// never stored.
    pub fn delete(&self) -> Result<bool> {
        let (pos, pk) = self.require_primary_key()?;
        let id = self.values[pos].clone();
        if id.is_null() {
            return Ok(false);
        }
        let stmt = self.db.query_builder().delete(self.table(), &pk, &id);
        let affected = self.db.run(&stmt)?;
        tracing::info!(table = self.table(), id = %id, affected, "deleted record");
        Ok(true)
    }
}
