//! Core types and traits for sqlrecord.
//!
//! `sqlrecord-core` is the **foundation layer** of the workspace. It defines
//! the data types and contracts every other crate builds on.
//!
//! # Role In The Architecture
//!
//! - **Contract layer**: [`Executor`] and [`Gateway`] are implemented by
//!   database drivers and consumed by the record engine.
//! - **Data model**: [`Value`], [`Row`], [`ColumnMetadata`] and
//!   [`TableSchema`] describe introspected schemas and the values flowing
//!   through them.
//! - **Errors**: a single [`Error`] taxonomy shared by all crates.
//!
//! # Who Uses This Crate
//!
//! - `sqlrecord-query` turns `TableSchema` and `Value`s into SQL.
//! - `sqlrecord-schema` caches `TableSchema`s loaded through a `Gateway`.
//! - `sqlrecord-mysql` implements `Gateway` introspection for MySQL.
//! - `sqlrecord` builds records on top of all of the above.

pub mod column;
pub mod error;
pub mod gateway;
pub mod identifiers;
pub mod relationship;
pub mod row;
pub mod types;
pub mod validate;
pub mod value;

pub use column::{ColumnMetadata, ColumnState, ForeignKeyRef, TableSchema};
pub use error::{Error, QueryError, Result, SchemaError};
pub use gateway::{Executor, ForeignKeyMap, Gateway};
pub use identifiers::{Dialect, humanize, quote_ident, sequence_name};
pub use relationship::{BelongsTo, conventional_fk_column};
pub use row::Row;
pub use types::{TypeClass, unify_data_type};
pub use value::{FromValue, Value};
