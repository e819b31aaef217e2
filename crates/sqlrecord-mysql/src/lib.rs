//! MySQL support for sqlrecord.
//!
//! This crate does not speak the MySQL wire protocol. It wraps any
//! [`Executor`](sqlrecord_core::Executor) connected to a MySQL server and
//! implements the introspection half of the
//! [`Gateway`](sqlrecord_core::Gateway) contract:
//!
//! - column metadata from `SHOW COLUMNS`,
//! - foreign keys parsed out of `SHOW CREATE TABLE`,
//! - generated keys from `LAST_INSERT_ID()`.
//!
//! ```ignore
//! let gateway = MySqlGateway::new(driver, MySqlConfig::new().database("shop"));
//! gateway.initialize()?;
//! ```

pub mod config;
pub mod gateway;

pub use config::MySqlConfig;
pub use gateway::{MySqlGateway, default_literal, parse_foreign_keys, quote_backtick};
pub use sqlrecord_core::unify_data_type;
