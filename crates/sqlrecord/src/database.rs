//! The database context every record borrows.
//!
//! A [`Database`] owns the gateway, the schema catalog, the record
//! configuration and the entity definitions. There is no global instance:
//! records are created from a `Database` and borrow it for their lifetime,
//! and dropping the `Database` releases the gateway.
//!
//! # Example
//!
//! ```rust,ignore
//! use sqlrecord::prelude::*;
//!
//! let db = Database::builder()
//!     .config(RecordConfig::new().table_prefix("app_"))
//!     .entity(EntityDef::new("users").protect(["password"]))
//!     .build_with(gateway);
//!
//! let mut user = db.record("users")?;
//! user.set("name", "Alice")?;
//! user.save()?;
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use sqlrecord_core::{Gateway, Result, Row, TableSchema, Value};
use sqlrecord_query::{QueryBuilder, Statement};
use sqlrecord_schema::SchemaCatalog;

use crate::config::RecordConfig;
use crate::entity::EntityDef;
use crate::record::Record;

/// Gateway plus everything records need to find their way around it.
pub struct Database<G> {
    gateway: G,
    catalog: SchemaCatalog,
    config: RecordConfig,
    entities: HashMap<String, EntityDef<G>>,
}

impl<G: Gateway> Database<G> {
    /// Context with default configuration and no entity definitions.
    pub fn new(gateway: G) -> Self {
        Self::builder().build_with(gateway)
    }

    /// Create a builder.
    pub fn builder() -> DatabaseBuilder<G> {
        DatabaseBuilder::new()
    }

    /// Empty record for the entity `name` (table prefix applied).
    ///
    /// Loads the table schema on first use.
    pub fn record(&self, name: &str) -> Result<Record<'_, G>> {
        self.record_for_table(&self.config.table_name(name))
    }

    /// Empty record for `table`, used verbatim.
    pub fn record_for_table(&self, table: &str) -> Result<Record<'_, G>> {
        let schema = self.schema(table)?;
        Ok(Record::new(self, schema, self.entities.get(table)))
    }

    /// Schema for `table` from the catalog.
    pub fn schema(&self, table: &str) -> Result<Arc<TableSchema>> {
        self.catalog.load(&self.gateway, table)
    }

    /// The gateway.
    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Record configuration.
    pub fn config(&self) -> &RecordConfig {
        &self.config
    }

    /// Schema catalog.
    pub fn catalog(&self) -> &SchemaCatalog {
        &self.catalog
    }

    /// Entity definition registered for `table`.
    pub fn entity(&self, table: &str) -> Option<&EntityDef<G>> {
        self.entities.get(table)
    }

    /// Statement builder for the gateway's placeholder dialect.
    pub fn query_builder(&self) -> QueryBuilder {
        QueryBuilder::new(self.gateway.dialect())
    }

    /// Issue `BEGIN`.
    pub fn begin_transaction(&self) -> Result<()> {
        tracing::debug!(target: "sqlrecord::sql", "begin transaction");
        self.gateway.begin_transaction()
    }

    /// Issue `COMMIT`.
    pub fn commit_transaction(&self) -> Result<()> {
        tracing::debug!(target: "sqlrecord::sql", "commit transaction");
        self.gateway.commit_transaction()
    }

    /// Issue `ROLLBACK`.
    pub fn rollback_transaction(&self) -> Result<()> {
        tracing::debug!(target: "sqlrecord::sql", "rollback transaction");
        self.gateway.rollback_transaction()
    }

    /// Run `f` inside a transaction: commit on `Ok`, roll back on `Err`.
    ///
    /// Transactions are flat; calling this from inside `f` issues a second
    /// `BEGIN` that the database may reject.
    pub fn transaction<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Self) -> Result<T>,
    {
        self.begin_transaction()?;
        match f(self) {
            Ok(value) => {
                self.commit_transaction()?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback) = self.rollback_transaction() {
                    tracing::warn!(error = %rollback, "rollback failed");
                }
                Err(err)
            }
        }
    }

    /// Consume the context and return the gateway.
    pub fn into_gateway(self) -> G {
        self.gateway
    }

    pub(crate) fn fetch_all(&self, (sql, params): &Statement) -> Result<Vec<Row>> {
        tracing::debug!(target: "sqlrecord::sql", sql = %sql, params = ?params, "records");
        self.gateway.records(sql, params)
    }

    pub(crate) fn fetch_one(&self, (sql, params): &Statement) -> Result<Option<Row>> {
        tracing::debug!(target: "sqlrecord::sql", sql = %sql, params = ?params, "first row");
        self.gateway.first_row(sql, params)
    }

    pub(crate) fn fetch_cell(&self, (sql, params): &Statement) -> Result<Option<Value>> {
        tracing::debug!(target: "sqlrecord::sql", sql = %sql, params = ?params, "first cell");
        self.gateway.first_cell(sql, params)
    }

    pub(crate) fn run(&self, (sql, params): &Statement) -> Result<u64> {
        tracing::debug!(target: "sqlrecord::sql", sql = %sql, params = ?params, "execute");
        self.gateway.execute(sql, params)
    }
}

impl<G> fmt::Debug for Database<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database")
            .field("catalog", &self.catalog)
            .field("config", &self.config)
            .field("entities", &self.entities.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

/// Builder for [`Database`].
pub struct DatabaseBuilder<G> {
    config: RecordConfig,
    entities: Vec<EntityDef<G>>,
}

impl<G> Default for DatabaseBuilder<G> {
    fn default() -> Self {
        Self {
            config: RecordConfig::default(),
            entities: Vec::new(),
        }
    }
}

impl<G> fmt::Debug for DatabaseBuilder<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseBuilder")
            .field("config", &self.config)
            .field("entities", &self.entities.len())
            .finish()
    }
}

impl<G: Gateway> DatabaseBuilder<G> {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `config` instead of the defaults.
    pub fn config(mut self, config: RecordConfig) -> Self {
        self.config = config;
        self
    }

    /// Register an entity definition. A later definition for the same
    /// entity replaces an earlier one.
    pub fn entity(mut self, entity: EntityDef<G>) -> Self {
        self.entities.push(entity);
        self
    }

    /// Build the context around `gateway`.
    pub fn build_with(self, gateway: G) -> Database<G> {
        let config = self.config;
        let entities = self
            .entities
            .into_iter()
            .map(|e| (config.table_name(e.name()), e))
            .collect();
        Database {
            gateway,
            catalog: SchemaCatalog::new(),
            config,
            entities,
        }
    }
}
