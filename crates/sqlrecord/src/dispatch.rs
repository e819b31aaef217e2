//! Name-based access: `call("find_by_name_and_email", args)` and
//! `property("customer")`.
//!
//! Method names are parsed by [`DynamicMethod`] and then routed to the typed
//! API; nothing here matches on strings itself.

use sqlrecord_core::{Error, Gateway, Result, Row, Value};
use sqlrecord_query::{DynamicMethod, FinderKind};

use crate::record::Record;

/// Outcome of [`Record::call`].
pub enum CallResult<'db, G> {
    /// `find_by_*`: whether a row was loaded into the record.
    Found(bool),
    /// `find_all_by_*`: populated records.
    Records(Vec<Record<'db, G>>),
    /// `find_all_as_array_by_*`: raw rows.
    Rows(Vec<Row>),
    /// `get_*`: the column value.
    Value(Value),
    /// `set_*`.
    Unit,
}

impl<G> CallResult<'_, G> {
    /// The found flag, if this is a `Found`.
    pub fn found(&self) -> Option<bool> {
        match self {
            CallResult::Found(found) => Some(*found),
            _ => None,
        }
    }

    /// The value, if this is a `Value`.
    pub fn into_value(self) -> Option<Value> {
        match self {
            CallResult::Value(value) => Some(value),
            _ => None,
        }
    }
}

impl<'db, G> CallResult<'db, G> {
    /// The records, if this is a `Records`.
    pub fn into_records(self) -> Option<Vec<Record<'db, G>>> {
        match self {
            CallResult::Records(records) => Some(records),
            _ => None,
        }
    }

    /// The rows, if this is a `Rows`.
    pub fn into_rows(self) -> Option<Vec<Row>> {
        match self {
            CallResult::Rows(rows) => Some(rows),
            _ => None,
        }
    }
}

impl<G> std::fmt::Debug for CallResult<'_, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CallResult::Found(found) => f.debug_tuple("Found").field(found).finish(),
            CallResult::Records(records) => f.debug_tuple("Records").field(records).finish(),
            CallResult::Rows(rows) => f.debug_tuple("Rows").field(rows).finish(),
            CallResult::Value(value) => f.debug_tuple("Value").field(value).finish(),
            CallResult::Unit => f.write_str("Unit"),
        }
    }
}

/// Outcome of [`Record::property`].
pub enum Property<'a, 'db, G> {
    /// A relation: the related record, or `None` when it does not resolve.
    Related(Option<&'a Record<'db, G>>),
    /// A column value.
    Value(&'a Value),
}

impl<G> std::fmt::Debug for Property<'_, '_, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Property::Related(record) => f.debug_tuple("Related").field(record).finish(),
            Property::Value(value) => f.debug_tuple("Value").field(value).finish(),
        }
    }
}

impl<'db, G: Gateway> Record<'db, G> {
    /// Invoke a dynamic method by name.
    ///
    /// | name | arguments | result |
    /// |------|-----------|--------|
    /// | `find_by_<c1>_and_<c2>...` | one per column | [`CallResult::Found`] |
    /// | `find_all_by_<c1>_and_...` | one per column | [`CallResult::Records`] |
    /// | `find_all_as_array_by_<c1>_and_...` | one per column | [`CallResult::Rows`] |
    /// | `get_<column>` | none | [`CallResult::Value`] |
    /// | `set_<column>` | exactly one | [`CallResult::Unit`] |
    ///
    /// Columns are checked against the schema before any SQL is issued.
    pub fn call(&mut self, method: &str, args: Vec<Value>) -> Result<CallResult<'db, G>> {
        match DynamicMethod::parse(method)? {
            DynamicMethod::Get(column) => {
                expect_args(method, 0, args.len())?;
                Ok(CallResult::Value(self.get(&column)?.clone()))
            }
            DynamicMethod::Set(column) => {
                expect_args(method, 1, args.len())?;
                let value = args.into_iter().next().unwrap_or_default();
                self.set(&column, value)?;
                Ok(CallResult::Unit)
            }
            DynamicMethod::Find { kind, columns } => {
                if let Some(unknown) = columns.iter().find(|c| !self.schema.has_column(c)) {
                    return Err(Error::unknown_property(self.table(), unknown.as_str()));
                }
                let filter = DynamicMethod::bind(method, &columns, args)?;
                tracing::trace!(table = self.table(), method, "dynamic finder");
                match kind {
                    FinderKind::One => Ok(CallResult::Found(self.find_by_columns(&filter)?)),
                    FinderKind::All => Ok(CallResult::Records(
                        self.find_all_by_columns(&filter, None)?,
                    )),
                    FinderKind::AllAsRows => Ok(CallResult::Rows(
                        self.find_all_as_array_by_columns(&filter, None)?,
                    )),
                }
            }
        }
    }

    /// Resolve a property name: a relation when `name` is declared or
    /// `name_id` is a foreign key, the column `name` otherwise.
    pub fn property(&mut self, name: &str) -> Result<Property<'_, 'db, G>> {
        if self.is_relation(name) {
            return Ok(Property::Related(self.related(name)?));
        }
        Ok(Property::Value(self.get(name)?))
    }
}

fn expect_args(method: &str, expected: usize, got: usize) -> Result<()> {
    if expected == got {
        Ok(())
    } else {
        Err(Error::ArityMismatch {
            method: method.to_string(),
            expected,
            got,
        })
    }
}
