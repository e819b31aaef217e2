//! Schema-driven active records.
//!
//! `sqlrecord` maps table rows to records without per-entity code. Given a
//! table name it introspects columns, types, constraints and foreign keys
//! through a [`Gateway`], and every [`Record`] of that table then offers:
//!
//! - typed access (`get`, `get_as`, `set`) and name-based access
//!   ([`Record::call`], [`Record::property`]),
//! - finders (`find`, `find_by_columns`, `find_all_by_columns`, `count`, ...),
//! - persistence (`insert`, `update`, `save`, `delete`) wrapped in ordered
//!   lifecycle hooks,
//! - validation rules that accumulate messages,
//! - lazy traversal of foreign keys ([`Record::related`]),
//! - form assignment and export.
//!
//! # Crates
//!
//! | crate | contents |
//! |-------|----------|
//! | `sqlrecord-core` | values, rows, metadata, errors, gateway traits |
//! | `sqlrecord-query` | SQL synthesis and the dynamic method parser |
//! | `sqlrecord-schema` | the schema catalog |
//! | `sqlrecord-mysql` | MySQL introspection (feature `mysql`) |
//!
//! # Example
//!
//! ```rust,ignore
//! use sqlrecord::prelude::*;
//!
//! let db = Database::builder()
//!     .entity(
//!         EntityDef::new("users").hook(HookPoint::BeforeValidate, |u| {
//!             u.validates_presence_of("email", None)?;
//!             u.validates_uniqueness_of(&["email"], None)?;
//!             Ok(())
//!         }),
//!     )
//!     .build_with(gateway);
//!
//! let mut user = db.record("users")?;
//! user.set("email", "a@example.com")?;
//! if !user.save()? {
//!     eprintln!("{:?}", user.errors());
//! }
//! ```

pub mod config;
pub mod database;
pub mod dispatch;
pub mod entity;
pub mod form;
pub mod persistence;
pub mod record;
pub mod relation;
pub mod validation;

pub use config::RecordConfig;
pub use database::{Database, DatabaseBuilder};
pub use dispatch::{CallResult, Property};
pub use entity::{EntityDef, Hook, HookPoint, Hooks};
pub use form::FormField;
pub use record::Record;
pub use relation::ForeignKeyResolver;

pub use sqlrecord_core::{
    BelongsTo, ColumnMetadata, ColumnState, Dialect, Error, Executor, ForeignKeyMap,
    ForeignKeyRef, FromValue, Gateway, QueryError, Result, Row, SchemaError, TableSchema,
    TypeClass, Value, humanize, quote_ident, sequence_name, unify_data_type,
};
pub use sqlrecord_query::{DynamicMethod, Filter, FinderKind, QueryBuilder, RawSql, Statement};
pub use sqlrecord_schema::SchemaCatalog;

#[cfg(feature = "mysql")]
pub use sqlrecord_mysql as mysql;

/// Everything needed for everyday use.
pub mod prelude {
    pub use crate::{
        BelongsTo, CallResult, Database, EntityDef, Error, Executor, Filter, Gateway, HookPoint,
        Property, RawSql, Record, RecordConfig, Result, Row, Value,
    };

    #[cfg(feature = "mysql")]
    pub use sqlrecord_mysql::{MySqlConfig, MySqlGateway};
}
