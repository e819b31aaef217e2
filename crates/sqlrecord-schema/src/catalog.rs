//! Cached table metadata.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use sqlrecord_core::{ColumnMetadata, ForeignKeyRef, Gateway, Result, SchemaError, TableSchema};

/// Loads [`TableSchema`]s through a gateway and keeps them for the life of
/// the catalog.
///
/// Schemas never change while a process runs, so each table is introspected
/// once and every record of that table shares the same `Arc`. Two threads
/// racing on a cold table may both introspect it; the first insert wins and
/// both observe an identical schema.
#[derive(Debug, Default)]
pub struct SchemaCatalog {
    tables: RwLock<HashMap<String, Arc<TableSchema>>>,
}

impl SchemaCatalog {
    /// Empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Schema for `table`, introspecting on first use.
    ///
    /// Fails with `SchemaError::NoColumns` when the gateway reports no
    /// columns.
    pub fn load<G: Gateway + ?Sized>(&self, gateway: &G, table: &str) -> Result<Arc<TableSchema>> {
        if let Some(schema) = self.cached(table) {
            tracing::trace!(table = table, "schema cache hit");
            return Ok(schema);
        }

        let mut columns = gateway.columns_and_meta_for_table(table)?;
        if columns.is_empty() {
            return Err(SchemaError::NoColumns {
                table: table.to_string(),
            }
            .into());
        }
        attach_foreign_keys(table, &mut columns, gateway)?;

        let schema = Arc::new(TableSchema::new(table, columns));
        tracing::debug!(
            table = table,
            columns = schema.len(),
            primary_key = schema.primary_key().map(|c| c.name.as_str()),
            "loaded table schema"
        );

        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        Ok(Arc::clone(
            tables.entry(table.to_string()).or_insert(schema),
        ))
    }

    /// Cached schema, without introspecting.
    pub fn cached(&self, table: &str) -> Option<Arc<TableSchema>> {
        self.tables
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(table)
            .cloned()
    }

    /// Foreign keys of `table` as `referenced_table -> (referenced_column ->
    /// owning_column)`, derived from the cached schema.
    pub fn foreign_keys<G: Gateway + ?Sized>(
        &self,
        gateway: &G,
        table: &str,
    ) -> Result<HashMap<String, HashMap<String, String>>> {
        let schema = self.load(gateway, table)?;
        let mut map: HashMap<String, HashMap<String, String>> = HashMap::new();
        for column in schema.foreign_key_columns() {
            if let Some(fk) = &column.foreign_key {
                map.entry(fk.table.clone())
                    .or_default()
                    .insert(fk.column.clone(), column.name.clone());
            }
        }
        Ok(map)
    }

    /// Drop one table from the cache.
    pub fn invalidate(&self, table: &str) -> bool {
        self.tables
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(table)
            .is_some()
    }

    /// Drop everything.
    pub fn clear(&self) {
        self.tables
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Number of cached tables.
    pub fn len(&self) -> usize {
        self.tables
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn attach_foreign_keys<G: Gateway + ?Sized>(
    table: &str,
    columns: &mut [ColumnMetadata],
    gateway: &G,
) -> Result<()> {
    for (foreign_table, keys) in gateway.foreign_keys(table)? {
        for (foreign_column, owning_column) in keys {
            match columns.iter_mut().find(|c| c.name == owning_column) {
                Some(column) => {
                    column.foreign_key =
                        Some(ForeignKeyRef::new(foreign_table.clone(), foreign_column));
                }
                None => tracing::warn!(
                    table = table,
                    column = %owning_column,
                    references = %foreign_table,
                    "foreign key names a column the table does not have"
                ),
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlrecord_core::{Executor, ForeignKeyMap, Row, Value};
    use std::cell::Cell;

    struct Fixture {
        introspections: Cell<usize>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                introspections: Cell::new(0),
            }
        }
    }

    impl Executor for Fixture {
        fn records(&self, _sql: &str, _params: &[Value]) -> Result<Vec<Row>> {
            Ok(Vec::new())
        }

        fn execute(&self, _sql: &str, _params: &[Value]) -> Result<u64> {
            Ok(0)
        }
    }

    impl Gateway for Fixture {
        fn columns_and_meta_for_table(&self, table: &str) -> Result<Vec<ColumnMetadata>> {
            self.introspections.set(self.introspections.get() + 1);
            Ok(match table {
                "orders" => vec![
                    ColumnMetadata::new("id", "int").primary_key(),
                    ColumnMetadata::new("customer_id", "int"),
                ],
                _ => Vec::new(),
            })
        }

        fn foreign_keys(&self, table: &str) -> Result<ForeignKeyMap> {
            let mut map = ForeignKeyMap::new();
            if table == "orders" {
                map.entry("customers".to_string())
                    .or_default()
                    .insert("id".to_string(), "customer_id".to_string());
                map.entry("ghosts".to_string())
                    .or_default()
                    .insert("id".to_string(), "ghost_id".to_string());
            }
            Ok(map)
        }

        fn last_insert_id(&self, _table: &str, _primary_key: &str) -> Result<Value> {
            Ok(Value::Null)
        }
    }

    #[test]
    fn test_loads_once_and_shares() {
        let gateway = Fixture::new();
        let catalog = SchemaCatalog::new();
        let a = catalog.load(&gateway, "orders").unwrap();
        let b = catalog.load(&gateway, "orders").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(gateway.introspections.get(), 1);
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_attaches_foreign_keys() {
        let gateway = Fixture::new();
        let catalog = SchemaCatalog::new();
        let schema = catalog.load(&gateway, "orders").unwrap();
        assert_eq!(
            schema.column("customer_id").and_then(|c| c.foreign_key.clone()),
            Some(ForeignKeyRef::new("customers", "id"))
        );
        let fks = catalog.foreign_keys(&gateway, "orders").unwrap();
        assert_eq!(fks["customers"]["id"], "customer_id");
        assert!(!fks.contains_key("ghosts"));
    }

    #[test]
    fn test_no_columns_is_schema_error() {
        let gateway = Fixture::new();
        let catalog = SchemaCatalog::new();
        let err = catalog.load(&gateway, "missing").unwrap_err();
        assert!(matches!(
            err,
            sqlrecord_core::Error::Schema(SchemaError::NoColumns { .. })
        ));
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_invalidate_forces_reload() {
        let gateway = Fixture::new();
        let catalog = SchemaCatalog::new();
        catalog.load(&gateway, "orders").unwrap();
        assert!(catalog.invalidate("orders"));
        catalog.load(&gateway, "orders").unwrap();
        assert_eq!(gateway.introspections.get(), 2);
        catalog.clear();
        assert!(catalog.cached("orders").is_none());
    }
}
