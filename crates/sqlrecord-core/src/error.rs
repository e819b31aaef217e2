//! Error types shared by every sqlrecord crate.

use thiserror::Error;

/// Result alias used throughout sqlrecord.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong while mapping records.
///
/// Validation rejections are deliberately absent: they accumulate on the
/// record and surface as a not-saved outcome.
#[derive(Debug, Error)]
pub enum Error {
    /// A property or column name that the table does not have.
    #[error("property `{property}` does not exist on `{table}`")]
    UnknownProperty { table: String, property: String },

    /// A dynamic method name that matches no known pattern.
    #[error("call to unknown method `{method}`")]
    UnknownMethod { method: String },

    /// A dynamic method name whose pattern matched but named nothing.
    #[error("method `{method}` does not name a property")]
    MissingParameters { method: String },

    /// Argument count does not match the parsed column tokens.
    #[error("method `{method}` expects {expected} argument(s), got {got}")]
    ArityMismatch {
        method: String,
        expected: usize,
        got: usize,
    },

    /// Schema could not be discovered or is unsuitable for the operation.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// A statement failed in the gateway.
    #[error(transparent)]
    Query(#[from] QueryError),

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Human readable label for the error family.
    pub const fn kind(&self) -> &'static str {
        match self {
            Error::UnknownProperty { .. } => "Unknown Property",
            Error::UnknownMethod { .. } => "Unknown Method",
            Error::MissingParameters { .. } => {
                "You are missing some parameters in your function call"
            }
            Error::ArityMismatch { .. } => "Wrong number of arguments",
            Error::Schema(SchemaError::NoPrimaryKey { .. }) => "Table has no primary key defined",
            Error::Schema(_) => "Schema error",
            Error::Query(_) => "The SQL is invalid",
            Error::Config(_) => "Configuration error",
        }
    }

    /// Shorthand for [`Error::UnknownProperty`].
    pub fn unknown_property(table: impl Into<String>, property: impl Into<String>) -> Self {
        Error::UnknownProperty {
            table: table.into(),
            property: property.into(),
        }
    }

    /// Whether this is a dispatch (programmer) error rather than a runtime one.
    pub const fn is_dispatch(&self) -> bool {
        matches!(
            self,
            Error::UnknownProperty { .. }
                | Error::UnknownMethod { .. }
                | Error::MissingParameters { .. }
                | Error::ArityMismatch { .. }
        )
    }
}

/// Schema discovery failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// Introspection returned no columns.
    #[error("no columns discoverable for table `{table}`")]
    NoColumns { table: String },

    /// The operation needs a primary key and the table has none.
    #[error("table `{table}` has no primary key")]
    NoPrimaryKey { table: String },

    /// A relation name that is neither declared nor backed by a foreign key.
    #[error("`{relation}` is not a relation of `{table}`")]
    UnknownRelation { table: String, relation: String },

    /// A column expected to carry a foreign key does not.
    #[error("column `{column}` on `{table}` is not a foreign key")]
    NotAForeignKey { table: String, column: String },
}

/// A statement failure reported by a gateway.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("query failed: {message} (sql: [{sql}])")]
pub struct QueryError {
    /// The SQL that failed.
    pub sql: String,
    /// Driver message.
    pub message: String,
}

impl QueryError {
    /// Create a query error.
    pub fn new(sql: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            message: message.into(),
        }
    }
}
