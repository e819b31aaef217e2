//! Statement synthesis for sqlrecord.
//!
//! Turns table metadata and filter criteria into parameterized SQL:
//!
//! - [`QueryBuilder`] produces SELECT / INSERT / UPDATE / DELETE / COUNT
//!   statements with bound parameters.
//! - [`Filter`] is an ordered conjunction of column equalities.
//! - [`RawSql`] marks caller-escaped fragments that are appended verbatim.
//! - [`DynamicMethod`] parses `find_by_*` / `get_*` / `set_*` names into a
//!   structured call.

pub mod builder;
pub mod finder;
pub mod fragment;

pub use builder::{QueryBuilder, Statement};
pub use finder::{DynamicMethod, FinderKind};
pub use fragment::{Filter, RawSql};
