//! MySQL schema introspection on top of any [`Executor`].
//!
//! The wire protocol is somebody else's job: hand [`MySqlGateway`] anything
//! that can run SQL against a MySQL server and it supplies the rest of the
//! [`Gateway`] contract from `SHOW COLUMNS`, `SHOW CREATE TABLE` and
//! `LAST_INSERT_ID()`.

use std::sync::OnceLock;

use regex::Regex;
use sqlrecord_core::{
    ColumnMetadata, Dialect, Executor, ForeignKeyMap, Gateway, QueryError, Result, Row,
    SchemaError, TypeClass, Value,
};

use crate::config::MySqlConfig;

/// MySQL gateway wrapping an executor.
#[derive(Debug)]
pub struct MySqlGateway<E> {
    executor: E,
    config: MySqlConfig,
}

impl<E: Executor> MySqlGateway<E> {
    /// Wrap `executor`.
    pub fn new(executor: E, config: MySqlConfig) -> Self {
        Self { executor, config }
    }

    /// Open a connection with the caller's driver and apply the session
    /// settings.
    ///
    /// `open` receives the configuration (`dsn()`, `socket_addr()`,
    /// credentials, `persistent`) and returns a ready executor.
    pub fn connect<F>(config: MySqlConfig, open: F) -> Result<Self>
    where
        F: FnOnce(&MySqlConfig) -> Result<E>,
    {
        let executor = open(&config)?;
        tracing::debug!(
            target: "sqlrecord::sql",
            addr = %config.socket_addr(),
            persistent = config.persistent,
            "mysql connection opened"
        );
        let gateway = Self::new(executor, config);
        gateway.initialize()?;
        Ok(gateway)
    }

    /// Apply the configured session settings (`SET NAMES`, `sql_mode`).
    ///
    /// Call once after connecting; generated SQL quotes identifiers with
    /// double quotes and depends on an ANSI-quotes SQL mode.
    pub fn initialize(&self) -> Result<()> {
        for statement in self.config.session_statements()? {
            tracing::debug!(target: "sqlrecord::sql", sql = %statement, "mysql session setup");
            self.executor.execute(&statement, &[])?;
        }
        Ok(())
    }

    /// Connection configuration.
    pub fn config(&self) -> &MySqlConfig {
        &self.config
    }

    /// Underlying executor.
    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Release the executor.
    pub fn into_inner(self) -> E {
        self.executor
    }

    /// Primary key column names of `table`, in column order.
    pub fn primary_keys(&self, table: &str) -> Result<Vec<String>> {
        Ok(self
            .columns_and_meta_for_table(table)?
            .into_iter()
            .filter(|c| c.is_primary_key)
            .map(|c| c.name)
            .collect())
    }
}

impl<E: Executor> Executor for MySqlGateway<E> {
    fn dialect(&self) -> Dialect {
        Dialect::Question
    }

    fn records(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>> {
        self.executor.records(sql, params)
    }

    fn first_row(&self, sql: &str, params: &[Value]) -> Result<Option<Row>> {
        self.executor.first_row(sql, params)
    }

    fn first_cell(&self, sql: &str, params: &[Value]) -> Result<Option<Value>> {
        self.executor.first_cell(sql, params)
    }

    fn execute(&self, sql: &str, params: &[Value]) -> Result<u64> {
        self.executor.execute(sql, params)
    }
}

impl<E: Executor> Gateway for MySqlGateway<E> {
    fn columns_and_meta_for_table(&self, table: &str) -> Result<Vec<ColumnMetadata>> {
        let sql = format!("SHOW COLUMNS FROM {}", quote_backtick(table));
        let rows = self.executor.records(&sql, &[])?;
        if rows.is_empty() {
            return Err(SchemaError::NoColumns {
                table: table.to_string(),
            }
            .into());
        }
        rows.iter().map(|row| parse_column(row, &sql)).collect()
    }

    fn foreign_keys(&self, table: &str) -> Result<ForeignKeyMap> {
        let sql = format!("SHOW CREATE TABLE {}", quote_backtick(table));
        let Some(row) = self.executor.first_row(&sql, &[])? else {
            return Ok(ForeignKeyMap::new());
        };
        let create_sql = text_field(&row, "Create Table").unwrap_or_default();
        Ok(parse_foreign_keys(&create_sql))
    }

    fn last_insert_id(&self, _table: &str, _primary_key: &str) -> Result<Value> {
        const SQL: &str = "SELECT LAST_INSERT_ID()";
        self.executor
            .first_cell(SQL, &[])?
            .ok_or_else(|| QueryError::new(SQL, "no generated key returned").into())
    }
}

/// Quote a MySQL identifier with backticks.
pub fn quote_backtick(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// Case-insensitive text lookup; drivers differ in how they case
/// `SHOW` result headers.
fn text_field(row: &Row, name: &str) -> Option<String> {
    row.iter()
        .find(|(column, _)| column.eq_ignore_ascii_case(name))
        .and_then(|(_, value)| match value {
            Value::Null => None,
            Value::Bytes(b) => Some(String::from_utf8_lossy(b).into_owned()),
            other => Some(other.to_text()),
        })
}

fn type_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^([a-z]+)(?:\((\d+)[^)]*\))?")
            .unwrap_or_else(|e| unreachable!("static type pattern: {e}"))
    })
}

fn parse_column(row: &Row, sql: &str) -> Result<ColumnMetadata> {
    let name = text_field(row, "Field")
        .ok_or_else(|| QueryError::new(sql, "SHOW COLUMNS row without a Field"))?;
    let raw_type = text_field(row, "Type").unwrap_or_default().to_ascii_lowercase();

    let (data_type, max_length) = match type_pattern().captures(&raw_type) {
        Some(caps) => (
            caps.get(1).map_or("", |m| m.as_str()).to_string(),
            caps.get(2).and_then(|m| m.as_str().parse().ok()),
        ),
        None => (raw_type.clone(), None),
    };

    let nullable = text_field(row, "Null").unwrap_or_default();
    let key = text_field(row, "Key").unwrap_or_default();
    let extra = text_field(row, "Extra").unwrap_or_default();
    let default_value =
        text_field(row, "Default").map(|d| default_literal(&d, &data_type, &extra));

    Ok(ColumnMetadata {
        name,
        data_type,
        max_length,
        default_value,
        not_null: nullable.is_empty() || nullable.eq_ignore_ascii_case("NO"),
        is_primary_key: key.eq_ignore_ascii_case("PRI"),
        foreign_key: None,
    })
}

/// Render a `SHOW COLUMNS` default as an SQL literal for INSERT lists.
///
/// MySQL reports every default unquoted (`active`, `007`), so the column
/// type decides: numeric columns keep finite numbers bare, everything else
/// is quoted. Well-known keywords and generated expressions pass through.
pub fn default_literal(raw: &str, data_type: &str, extra: &str) -> String {
    let upper = raw.to_ascii_uppercase();
    let is_keyword = matches!(
        upper.as_str(),
        "NULL" | "CURRENT_TIMESTAMP" | "CURRENT_DATE" | "CURRENT_TIME" | "NOW()"
    ) || upper.starts_with("CURRENT_TIMESTAMP(");
    let is_expression = extra.to_ascii_uppercase().contains("DEFAULT_GENERATED");
    let is_number =
        is_numeric_type(data_type) && raw.parse::<f64>().is_ok_and(f64::is_finite);

    if is_keyword || is_expression || is_number {
        raw.to_string()
    } else {
        format!("'{}'", raw.replace('\'', "''"))
    }
}

/// Numeric classes plus the MySQL integer spellings the shared classifier
/// leaves out.
fn is_numeric_type(data_type: &str) -> bool {
    TypeClass::classify(data_type) == TypeClass::Numeric
        || matches!(
            data_type.to_ascii_lowercase().as_str(),
            "tinyint" | "bool" | "boolean" | "real" | "numeric"
        )
}

fn foreign_key_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"FOREIGN KEY \(([^)]*)\) REFERENCES [`"]?([^`"\s(]+)[`"]? ?\(([^)]*)\)"#)
            .unwrap_or_else(|e| unreachable!("static foreign key pattern: {e}"))
    })
}

fn split_identifiers(list: &str) -> Vec<String> {
    list.split(',')
        .map(|s| s.trim().trim_matches(|c| c == '`' || c == '"').to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Extract foreign keys from `SHOW CREATE TABLE` output.
///
/// Multi-column keys are zipped column by column. Accepts backtick and
/// ANSI double-quote identifier styles.
pub fn parse_foreign_keys(create_sql: &str) -> ForeignKeyMap {
    let mut keys = ForeignKeyMap::new();
    for caps in foreign_key_pattern().captures_iter(create_sql) {
        let own = split_identifiers(caps.get(1).map_or("", |m| m.as_str()));
        let table = caps.get(2).map_or("", |m| m.as_str()).to_string();
        let referenced = split_identifiers(caps.get(3).map_or("", |m| m.as_str()));

        let entry = keys.entry(table).or_default();
        for (owning, foreign) in own.into_iter().zip(referenced) {
            entry.insert(foreign, owning);
        }
    }
    keys
}
