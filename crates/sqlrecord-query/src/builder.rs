//! Statement synthesis for record CRUD.
//!
//! Every builder method returns the SQL text together with the parameters
//! to bind, in placeholder order. Identifiers are always quoted and values
//! always bound; the only text that reaches the database unbound is:
//!
//! - `DEFAULT`, `NULL` and column default expressions in INSERT lists,
//! - caller-supplied [`RawSql`] fragments.

use sqlrecord_core::{Dialect, Error, Result, SchemaError, TableSchema, Value, quote_ident};

use crate::fragment::{Filter, RawSql};

/// SQL text and its bound parameters.
pub type Statement = (String, Vec<Value>);

/// Builds parameterized statements for one placeholder dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryBuilder {
    dialect: Dialect,
}

/// Hands out placeholders in order.
struct Placeholders {
    dialect: Dialect,
    next: usize,
}

impl Placeholders {
    fn new(dialect: Dialect) -> Self {
        Self { dialect, next: 1 }
    }

    fn next(&mut self) -> String {
        let p = self.dialect.placeholder(self.next);
        self.next += 1;
        p
    }
}

impl QueryBuilder {
    /// Builder for `dialect`.
    pub const fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }

    /// Placeholder dialect in use.
    pub const fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// `SELECT * FROM "t" WHERE "pk" = ?`
    pub fn select_by_id(&self, table: &str, primary_key: &str, id: &Value) -> Statement {
        let mut ph = Placeholders::new(self.dialect);
        let sql = format!(
            "SELECT * FROM {} WHERE {} = {}",
            quote_ident(table),
            quote_ident(primary_key),
            ph.next()
        );
        (sql, vec![id.clone()])
    }

    /// `SELECT * FROM "t" WHERE "a" = ? AND "b" = ? [trailing] [LIMIT 1]`
    ///
    /// The trailing fragment goes before the limit so that `ORDER BY`
    /// clauses stay valid. An empty filter is rejected.
    pub fn select_by_columns(
        &self,
        table: &str,
        filter: &Filter,
        limit_one: bool,
        trailing: Option<&RawSql>,
    ) -> Result<Statement> {
        require_columns(filter, "select_by_columns")?;
        let mut ph = Placeholders::new(self.dialect);
        let mut sql = format!(
            "SELECT * FROM {} WHERE {}",
            quote_ident(table),
            where_clause(filter.columns(), &mut ph)
        );
        push_fragment(&mut sql, trailing);
        if limit_one {
            sql.push_str(" LIMIT 1");
        }
        Ok((sql, filter.values()))
    }

    /// `SELECT "t".* FROM "t" [conditions]` with caller-bound parameters.
    pub fn select_all(
        &self,
        table: &str,
        conditions: Option<&RawSql>,
        params: &[Value],
    ) -> Statement {
        let quoted = quote_ident(table);
        let mut sql = format!("SELECT {quoted}.* FROM {quoted}");
        push_fragment(&mut sql, conditions);
        (sql, params.to_vec())
    }

    /// `SELECT COUNT(*) FROM "t" [conditions]` with caller-bound parameters.
    pub fn count(&self, table: &str, conditions: Option<&RawSql>, params: &[Value]) -> Statement {
        let mut sql = format!("SELECT COUNT(*) FROM {}", quote_ident(table));
        push_fragment(&mut sql, conditions);
        (sql, params.to_vec())
    }

    /// INSERT of every column of `schema`, `values` aligned with its columns.
    ///
    /// Per column: the primary key becomes `DEFAULT`; an unset value falls
    /// back to the column default expression, or `NULL` without one; any
    /// other value is bound.
    pub fn insert(&self, schema: &TableSchema, values: &[Value]) -> Statement {
        let mut ph = Placeholders::new(self.dialect);
        let mut columns = Vec::with_capacity(schema.len());
        let mut slots = Vec::with_capacity(schema.len());
        let mut params = Vec::new();

        for (i, column) in schema.columns().iter().enumerate() {
            columns.push(quote_ident(&column.name));
            let value = values.get(i).cloned().unwrap_or_default();
            if column.is_primary_key {
                slots.push("DEFAULT".to_string());
            } else if value.is_null() {
                slots.push(
                    column
                        .default_value
                        .clone()
                        .unwrap_or_else(|| "NULL".to_string()),
                );
            } else {
                slots.push(ph.next());
                params.push(value);
            }
        }

        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote_ident(schema.table()),
            columns.join(", "),
            slots.join(", ")
        );
        (sql, params)
    }

    /// Full-row UPDATE: every column is written, then filtered by primary
    /// key. The key value bound in the WHERE clause is the record's current
    /// key.
    pub fn update(&self, schema: &TableSchema, values: &[Value]) -> Result<Statement> {
        let pk_pos = schema
            .primary_key_position()
            .ok_or_else(|| SchemaError::NoPrimaryKey {
                table: schema.table().to_string(),
            })?;
        let mut ph = Placeholders::new(self.dialect);
        let mut sets = Vec::with_capacity(schema.len());
        let mut params = Vec::with_capacity(schema.len() + 1);

        for (i, column) in schema.columns().iter().enumerate() {
            sets.push(format!("{} = {}", quote_ident(&column.name), ph.next()));
            params.push(values.get(i).cloned().unwrap_or_default());
        }
        params.push(values.get(pk_pos).cloned().unwrap_or_default());

        let sql = format!(
            "UPDATE {} SET {} WHERE {} = {}",
            quote_ident(schema.table()),
            sets.join(", "),
            quote_ident(&schema.columns()[pk_pos].name),
            ph.next()
        );
        Ok((sql, params))
    }

    /// `DELETE FROM "t" WHERE "pk" = ?`
    pub fn delete(&self, table: &str, primary_key: &str, id: &Value) -> Statement {
        let mut ph = Placeholders::new(self.dialect);
        let sql = format!(
            "DELETE FROM {} WHERE {} = {}",
            quote_ident(table),
            quote_ident(primary_key),
            ph.next()
        );
        (sql, vec![id.clone()])
    }

    /// `SELECT 1 FROM "t" WHERE "a" = ? ... [AND "pk" <> ?] LIMIT 1`
    ///
    /// Used by uniqueness checks; `exclude` skips the record's own row and
    /// is bound like any other value. An empty filter is rejected.
    pub fn exists(
        &self,
        table: &str,
        filter: &Filter,
        exclude: Option<(&str, &Value)>,
    ) -> Result<Statement> {
        require_columns(filter, "exists")?;
        let mut ph = Placeholders::new(self.dialect);
        let mut conditions: Vec<String> = filter
            .columns()
            .map(|c| format!("{} = {}", quote_ident(c), ph.next()))
            .collect();
        let mut params = filter.values();
        if let Some((pk, id)) = exclude {
            conditions.push(format!("{} <> {}", quote_ident(pk), ph.next()));
            params.push(id.clone());
        }

        let sql = format!(
            "SELECT 1 FROM {} WHERE {} LIMIT 1",
            quote_ident(table),
            conditions.join(" AND ")
        );
        Ok((sql, params))
    }
}

fn require_columns(filter: &Filter, method: &str) -> Result<()> {
    if filter.is_empty() {
        return Err(Error::MissingParameters {
            method: method.to_string(),
        });
    }
    Ok(())
}

fn where_clause<'a>(columns: impl Iterator<Item = &'a str>, ph: &mut Placeholders) -> String {
    columns
        .map(|c| format!("{} = {}", quote_ident(c), ph.next()))
        .collect::<Vec<_>>()
        .join(" AND ")
}

fn push_fragment(sql: &mut String, fragment: Option<&RawSql>) {
    if let Some(fragment) = fragment.filter(|f| !f.is_blank()) {
        sql.push(' ');
        sql.push_str(fragment.as_str().trim());
    }
}
