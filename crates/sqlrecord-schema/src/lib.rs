//! Schema metadata catalog for sqlrecord.
//!
//! Records never introspect the database themselves; they ask a
//! [`SchemaCatalog`], which loads each table's columns and foreign keys
//! through the gateway once and hands out shared, read-only
//! [`TableSchema`](sqlrecord_core::TableSchema)s afterwards.

pub mod catalog;

pub use catalog::SchemaCatalog;
