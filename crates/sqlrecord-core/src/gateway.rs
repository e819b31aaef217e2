//! The database gateway contract consumed by the record engine.
//!
//! A gateway is split in two layers:
//!
//! - [`Executor`] runs parameterized SQL and returns rows. Every driver
//!   provides this.
//! - [`Gateway`] adds schema introspection, generated-key retrieval and
//!   transaction statements on top of an executor. Engine-specific
//!   introspection (e.g. `sqlrecord-mysql`) lives here.
//!
//! Both traits are synchronous: one blocking round-trip per call.

use std::collections::HashMap;

use crate::column::ColumnMetadata;
use crate::error::Result;
use crate::identifiers::Dialect;
use crate::row::Row;
use crate::value::Value;

/// `referenced_table -> (referenced_column -> owning_column)`.
pub type ForeignKeyMap = HashMap<String, HashMap<String, String>>;

/// Runs SQL statements.
pub trait Executor {
    /// Placeholder style this executor expects.
    fn dialect(&self) -> Dialect {
        Dialect::default()
    }

    /// Run a query and return every row.
    fn records(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>>;

    /// Run a query and return the first row, if any.
    fn first_row(&self, sql: &str, params: &[Value]) -> Result<Option<Row>> {
        Ok(self.records(sql, params)?.into_iter().next())
    }

    /// Run a query and return the first column of the first row, if any.
    fn first_cell(&self, sql: &str, params: &[Value]) -> Result<Option<Value>> {
        Ok(self
            .first_row(sql, params)?
            .and_then(|row| row.get(0).cloned()))
    }

    /// Run a statement, returning the number of affected rows.
    fn execute(&self, sql: &str, params: &[Value]) -> Result<u64>;
}

/// Full gateway: execution plus introspection.
pub trait Gateway: Executor {
    /// Ordered column metadata for `table`.
    ///
    /// Implementations fail with `SchemaError::NoColumns` when nothing is
    /// found; the catalog enforces the same rule for implementations that
    /// return an empty list instead.
    fn columns_and_meta_for_table(&self, table: &str) -> Result<Vec<ColumnMetadata>>;

    /// Foreign keys declared on `table`. Empty when there are none.
    fn foreign_keys(&self, table: &str) -> Result<ForeignKeyMap>;

    /// Key generated by the last INSERT into `table`.
    fn last_insert_id(&self, table: &str, primary_key: &str) -> Result<Value>;

    /// Issue `BEGIN`.
    fn begin_transaction(&self) -> Result<()> {
        self.execute("BEGIN", &[]).map(|_| ())
    }

    /// Issue `COMMIT`.
    fn commit_transaction(&self) -> Result<()> {
        self.execute("COMMIT", &[]).map(|_| ())
    }

    /// Issue `ROLLBACK`.
    fn rollback_transaction(&self) -> Result<()> {
        self.execute("ROLLBACK", &[]).map(|_| ())
    }
}

impl<E: Executor + ?Sized> Executor for &E {
    fn dialect(&self) -> Dialect {
        (**self).dialect()
    }

    fn records(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>> {
        (**self).records(sql, params)
    }

    fn first_row(&self, sql: &str, params: &[Value]) -> Result<Option<Row>> {
        (**self).first_row(sql, params)
    }

    fn first_cell(&self, sql: &str, params: &[Value]) -> Result<Option<Value>> {
        (**self).first_cell(sql, params)
    }

    fn execute(&self, sql: &str, params: &[Value]) -> Result<u64> {
        (**self).execute(sql, params)
    }
}

impl<G: Gateway + ?Sized> Gateway for &G {
    fn columns_and_meta_for_table(&self, table: &str) -> Result<Vec<ColumnMetadata>> {
        (**self).columns_and_meta_for_table(table)
    }

    fn foreign_keys(&self, table: &str) -> Result<ForeignKeyMap> {
        (**self).foreign_keys(table)
    }

    fn last_insert_id(&self, table: &str, primary_key: &str) -> Result<Value> {
        (**self).last_insert_id(table, primary_key)
    }

    fn begin_transaction(&self) -> Result<()> {
        (**self).begin_transaction()
    }

    fn commit_transaction(&self) -> Result<()> {
        (**self).commit_transaction()
    }

    fn rollback_transaction(&self) -> Result<()> {
        (**self).rollback_transaction()
    }
}
