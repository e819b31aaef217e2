//! In-memory gateway for integration tests.
//!
//! Interprets exactly the statement shapes `QueryBuilder` generates (plus
//! `WHERE`/`ORDER BY` fragments used by the tests) against tables held in
//! memory, and records every statement it sees.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;
use sqlrecord::{
    BelongsTo, ColumnMetadata, Database, EntityDef, Executor, ForeignKeyMap, Gateway, QueryError,
    RecordConfig, Result, Row, Value,
};

#[derive(Debug, Clone)]
struct Table {
    columns: Vec<ColumnMetadata>,
    rows: Vec<Vec<Value>>,
    next_id: i64,
    last_id: Option<i64>,
}

impl Table {
    fn position(&self, column: &str) -> usize {
        self.columns
            .iter()
            .position(|c| c.name == column)
            .unwrap_or_else(|| panic!("no column {column}"))
    }

    fn row(&self, values: &[Value]) -> Row {
        Row::new(
            self.columns.iter().map(|c| c.name.clone()).collect(),
            values.to_vec(),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Eq,
    Ne,
}

#[derive(Debug)]
struct Tail {
    conditions: Vec<(String, Op)>,
    order_by: Option<(String, bool)>,
    limit_one: bool,
}

/// Gateway double backed by in-memory tables.
#[derive(Debug, Default)]
pub struct MemoryGateway {
    tables: RefCell<HashMap<String, Table>>,
    snapshot: RefCell<Option<HashMap<String, Table>>>,
    log: RefCell<Vec<(String, Vec<Value>)>>,
    introspections: Cell<usize>,
}

fn re(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).unwrap())
}

fn unquote(ident: &str) -> String {
    ident.trim().trim_matches('"').to_string()
}

fn compare(a: &Value, b: &Value) -> Ordering {
    match (a.as_i64(), b.as_i64()) {
        (Some(x), Some(y)) => x.cmp(&y),
        _ => a.to_text().cmp(&b.to_text()),
    }
}

fn parse_tail(tail: &str) -> Tail {
    static TAIL: OnceLock<Regex> = OnceLock::new();
    static COND: OnceLock<Regex> = OnceLock::new();
    let caps = re(
        &TAIL,
        r#"^\s*(?:WHERE (.*?))?\s*(?:ORDER BY "?(\w+)"?( DESC)?)?\s*(LIMIT 1)?\s*$"#,
    )
    .captures(tail)
    .unwrap_or_else(|| panic!("unsupported statement tail: {tail}"));

    let conditions = caps
        .get(1)
        .map(|w| {
            w.as_str()
                .split(" AND ")
                .map(|cond| {
                    let c = re(&COND, r#"^"?(\w+)"? (=|<>) \?$"#)
                        .captures(cond.trim())
                        .unwrap_or_else(|| panic!("unsupported condition: {cond}"));
                    let op = if &c[2] == "=" { Op::Eq } else { Op::Ne };
                    (c[1].to_string(), op)
                })
                .collect()
        })
        .unwrap_or_default();

    Tail {
        conditions,
        order_by: caps
            .get(2)
            .map(|c| (c.as_str().to_string(), caps.get(3).is_some())),
        limit_one: caps.get(4).is_some(),
    }
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a table. Foreign keys are taken from the column metadata and
    /// reported separately, as a real driver would.
    pub fn create_table(&self, name: &str, columns: Vec<ColumnMetadata>) {
        self.tables.borrow_mut().insert(
            name.to_string(),
            Table {
                columns,
                rows: Vec::new(),
                next_id: 1,
                last_id: None,
            },
        );
    }

    /// Insert a row directly, bypassing SQL. Unlisted columns are NULL.
    pub fn seed(&self, table: &str, values: &[(&str, Value)]) {
        let mut tables = self.tables.borrow_mut();
        let t = tables.get_mut(table).unwrap();
        let mut row = vec![Value::Null; t.columns.len()];
        for (column, value) in values {
            let pos = t.position(column);
            row[pos] = value.clone();
        }
        if let Some(pk) = t.columns.iter().position(|c| c.is_primary_key) {
            if let Some(id) = row[pk].as_i64() {
                t.next_id = t.next_id.max(id + 1);
            }
        }
        t.rows.push(row);
    }

    /// Rows of `table` as raw rows, in storage order.
    pub fn rows(&self, table: &str) -> Vec<Row> {
        let tables = self.tables.borrow();
        let t = &tables[table];
        t.rows.iter().map(|r| t.row(r)).collect()
    }

    /// Every statement issued so far.
    pub fn statements(&self) -> Vec<(String, Vec<Value>)> {
        self.log.borrow().clone()
    }

    /// SQL text of every statement issued so far.
    pub fn sql_log(&self) -> Vec<String> {
        self.log.borrow().iter().map(|(s, _)| s.clone()).collect()
    }

    /// Last statement issued.
    pub fn last_statement(&self) -> Option<(String, Vec<Value>)> {
        self.log.borrow().last().cloned()
    }

    pub fn clear_log(&self) {
        self.log.borrow_mut().clear();
    }

    /// Number of column introspections performed.
    pub fn introspections(&self) -> usize {
        self.introspections.get()
    }

    fn matching(&self, table: &str, tail: &Tail, params: &[Value]) -> Vec<Vec<Value>> {
        let tables = self.tables.borrow();
        let t = tables
            .get(table)
            .unwrap_or_else(|| panic!("no table {table}"));
        let checks: Vec<(usize, Op, &Value)> = tail
            .conditions
            .iter()
            .zip(params)
            .map(|((column, op), value)| (t.position(column), *op, value))
            .collect();

        let mut rows: Vec<Vec<Value>> = t
            .rows
            .iter()
            .filter(|row| {
                checks.iter().all(|(pos, op, value)| match op {
                    Op::Eq => row[*pos].loosely_equals(value),
                    Op::Ne => !row[*pos].is_null() && !row[*pos].loosely_equals(value),
                })
            })
            .cloned()
            .collect();

        if let Some((column, desc)) = &tail.order_by {
            let pos = t.position(column);
            rows.sort_by(|a, b| {
                let ord = compare(&a[pos], &b[pos]);
                if *desc { ord.reverse() } else { ord }
            });
        }
        if tail.limit_one {
            rows.truncate(1);
        }
        rows
    }

    fn query(&self, sql: &str, params: &[Value]) -> Vec<Row> {
        static STAR: OnceLock<Regex> = OnceLock::new();
        static ALL: OnceLock<Regex> = OnceLock::new();
        static COUNT: OnceLock<Regex> = OnceLock::new();
        static EXISTS: OnceLock<Regex> = OnceLock::new();

        if let Some(c) = re(&STAR, r#"^SELECT \* FROM "([^"]+)"(.*)$"#).captures(sql) {
            return self.select_rows(&c[1], &c[2], params);
        }
        if let Some(c) = re(&ALL, r#"^SELECT "([^"]+)"\.\* FROM "[^"]+"(.*)$"#).captures(sql) {
            return self.select_rows(&c[1], &c[2], params);
        }
        if let Some(c) = re(&COUNT, r#"^SELECT COUNT\(\*\) FROM "([^"]+)"(.*)$"#).captures(sql) {
            let n = self.matching(&c[1], &parse_tail(&c[2]), params).len();
            return vec![Row::from_pairs([("count", Value::BigInt(n as i64))])];
        }
        if let Some(c) = re(&EXISTS, r#"^SELECT 1 FROM "([^"]+)"(.*)$"#).captures(sql) {
            let found = !self.matching(&c[1], &parse_tail(&c[2]), params).is_empty();
            return if found {
                vec![Row::from_pairs([("exists", Value::Int(1))])]
            } else {
                Vec::new()
            };
        }
        panic!("unsupported query: {sql}");
    }

    fn select_rows(&self, table: &str, tail: &str, params: &[Value]) -> Vec<Row> {
        let rows = self.matching(table, &parse_tail(tail), params);
        let tables = self.tables.borrow();
        let t = &tables[table];
        rows.iter().map(|r| t.row(r)).collect()
    }

    fn write(&self, sql: &str, params: &[Value]) -> u64 {
        static INSERT: OnceLock<Regex> = OnceLock::new();
        static UPDATE: OnceLock<Regex> = OnceLock::new();
        static DELETE: OnceLock<Regex> = OnceLock::new();

        match sql {
            "BEGIN" => {
                *self.snapshot.borrow_mut() = Some(self.tables.borrow().clone());
                return 0;
            }
            "COMMIT" => {
                *self.snapshot.borrow_mut() = None;
                return 0;
            }
            "ROLLBACK" => {
                if let Some(saved) = self.snapshot.borrow_mut().take() {
                    *self.tables.borrow_mut() = saved;
                }
                return 0;
            }
            _ => {}
        }

        if let Some(c) = re(&INSERT, r#"^INSERT INTO "([^"]+)" \((.*)\) VALUES \((.*)\)$"#)
            .captures(sql)
        {
            let mut tables = self.tables.borrow_mut();
            let t = tables.get_mut(&c[1]).unwrap();
            let columns: Vec<String> = c[2].split(", ").map(unquote).collect();
            let mut params = params.iter();
            let mut row = vec![Value::Null; t.columns.len()];
            for (column, slot) in columns.iter().zip(c[3].split(", ")) {
                let value = match slot {
                    "DEFAULT" => {
                        let id = t.next_id;
                        t.next_id += 1;
                        t.last_id = Some(id);
                        Value::BigInt(id)
                    }
                    "NULL" => Value::Null,
                    "?" => params.next().cloned().unwrap(),
                    literal if literal.starts_with('\'') => {
                        Value::Text(literal.trim_matches('\'').to_string())
                    }
                    literal => Value::BigInt(literal.parse().unwrap()),
                };
                let pos = t.position(column);
                row[pos] = value;
            }
            t.rows.push(row);
            return 1;
        }

        if let Some(c) = re(&UPDATE, r#"^UPDATE "([^"]+)" SET (.*) WHERE "([^"]+)" = \?$"#)
            .captures(sql)
        {
            let mut tables = self.tables.borrow_mut();
            let t = tables.get_mut(&c[1]).unwrap();
            let assignments: Vec<usize> = c[2]
                .split(", ")
                .map(|a| t.position(&unquote(a.trim_end_matches(" = ?"))))
                .collect();
            let key_pos = t.position(&c[3]);
            let key = params.last().unwrap();
            let mut affected = 0;
            for row in t.rows.iter_mut().filter(|r| r[key_pos].loosely_equals(key)) {
                for (pos, value) in assignments.iter().zip(params) {
                    row[*pos] = value.clone();
                }
                affected += 1;
            }
            return affected;
        }

        if let Some(c) = re(&DELETE, r#"^DELETE FROM "([^"]+)"(.*)$"#).captures(sql) {
            let tail = parse_tail(&c[2]);
            let doomed = self.matching(&c[1], &tail, params);
            let mut tables = self.tables.borrow_mut();
            let t = tables.get_mut(&c[1]).unwrap();
            let before = t.rows.len();
            t.rows.retain(|r| !doomed.contains(r));
            return (before - t.rows.len()) as u64;
        }

        panic!("unsupported statement: {sql}");
    }
}

impl Executor for MemoryGateway {
    fn records(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>> {
        self.log
            .borrow_mut()
            .push((sql.to_string(), params.to_vec()));
        Ok(self.query(sql, params))
    }

    fn execute(&self, sql: &str, params: &[Value]) -> Result<u64> {
        self.log
            .borrow_mut()
            .push((sql.to_string(), params.to_vec()));
        if sql.contains("__fail__") {
            return Err(QueryError::new(sql, "forced failure").into());
        }
        Ok(self.write(sql, params))
    }
}

impl Gateway for MemoryGateway {
    fn columns_and_meta_for_table(&self, table: &str) -> Result<Vec<ColumnMetadata>> {
        self.introspections.set(self.introspections.get() + 1);
        Ok(self
            .tables
            .borrow()
            .get(table)
            .map(|t| {
                t.columns
                    .iter()
                    .cloned()
                    .map(|mut c| {
                        c.foreign_key = None;
                        c
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    fn foreign_keys(&self, table: &str) -> Result<ForeignKeyMap> {
        let mut map = ForeignKeyMap::new();
        if let Some(t) = self.tables.borrow().get(table) {
            for column in &t.columns {
                if let Some(fk) = &column.foreign_key {
                    map.entry(fk.table.clone())
                        .or_default()
                        .insert(fk.column.clone(), column.name.clone());
                }
            }
        }
        Ok(map)
    }

    fn last_insert_id(&self, table: &str, _primary_key: &str) -> Result<Value> {
        Ok(self
            .tables
            .borrow()
            .get(table)
            .and_then(|t| t.last_id)
            .map_or(Value::Null, Value::BigInt))
    }
}

/// `users`, `customers`, `orders` and `audit_log` (no primary key).
pub fn shop_gateway() -> MemoryGateway {
    let gw = MemoryGateway::new();
    gw.create_table(
        "users",
        vec![
            ColumnMetadata::new("id", "int").primary_key().not_null(),
            ColumnMetadata::new("name", "varchar").max_length(50).not_null(),
            ColumnMetadata::new("email", "varchar").max_length(100),
            ColumnMetadata::new("active", "bool"),
            ColumnMetadata::new("age", "int"),
            ColumnMetadata::new("status", "varchar")
                .max_length(20)
                .default_value("'active'"),
        ],
    );
    gw.create_table(
        "customers",
        vec![
            ColumnMetadata::new("id", "int").primary_key().not_null(),
            ColumnMetadata::new("name", "varchar").not_null(),
        ],
    );
    gw.create_table(
        "orders",
        vec![
            ColumnMetadata::new("id", "int").primary_key().not_null(),
            ColumnMetadata::new("customer_id", "int").references("customers", "id"),
            ColumnMetadata::new("total", "decimal"),
            ColumnMetadata::new("note", "text"),
        ],
    );
    gw.create_table(
        "audit_log",
        vec![
            ColumnMetadata::new("line", "text"),
            ColumnMetadata::new("at", "datetime"),
        ],
    );
    gw
}

/// Context over [`shop_gateway`] with no entity definitions.
pub fn shop() -> Database<MemoryGateway> {
    Database::new(shop_gateway())
}

/// Context over [`shop_gateway`] with `orders` declaring its customer.
pub fn shop_with_relations() -> Database<MemoryGateway> {
    Database::builder()
        .config(RecordConfig::new())
        .entity(EntityDef::new("orders").belongs_to(BelongsTo::new("buyer", "customer_id")))
        .build_with(shop_gateway())
}
