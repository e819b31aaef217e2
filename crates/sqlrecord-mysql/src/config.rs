//! MySQL connection configuration.
//!
//! Holds the parameters a MySQL driver needs to open a connection plus the
//! session settings the record engine relies on (character set and an
//! SQL mode that accepts ANSI double-quoted identifiers).
//!
//! The gateway itself only reads `charset` and `sql_mode`. The connection
//! fields, [`MySqlConfig::dsn`] and [`MySqlConfig::socket_addr`] are for the
//! caller's driver, which receives the config in
//! [`MySqlGateway::connect`](crate::MySqlGateway::connect).

use sqlrecord_core::{Error, Result};

/// MySQL connection configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MySqlConfig {
    /// Hostname or IP address
    pub host: String,
    /// Port number (default: 3306)
    pub port: u16,
    /// Username for authentication
    pub user: String,
    /// Password for authentication
    pub password: Option<String>,
    /// Database name to connect to
    pub database: Option<String>,
    /// Character set applied with `SET NAMES` (default: utf8)
    pub charset: String,
    /// Session SQL mode (default: ANSI, which enables double-quoted
    /// identifiers)
    pub sql_mode: String,
    /// Ask the driver for a persistent connection
    pub persistent: bool,
}

impl Default for MySqlConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 3306,
            user: String::new(),
            password: None,
            database: None,
            charset: "utf8".to_string(),
            sql_mode: "ANSI".to_string(),
            persistent: false,
        }
    }
}

impl MySqlConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the hostname.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set the port.
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the username.
    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }

    /// Set the password.
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Set the database.
    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    /// Set the character set.
    pub fn charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = charset.into();
        self
    }

    /// Set the session SQL mode.
    pub fn sql_mode(mut self, mode: impl Into<String>) -> Self {
        self.sql_mode = mode.into();
        self
    }

    /// Request a persistent connection.
    pub fn persistent(mut self, persistent: bool) -> Self {
        self.persistent = persistent;
        self
    }

    /// Get the socket address string for connection.
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// PDO-style data source name: `mysql:host=..;dbname=..;port=..`.
    pub fn dsn(&self) -> String {
        let mut dsn = format!("mysql:host={}", self.host);
        if let Some(db) = &self.database {
            dsn.push_str(";dbname=");
            dsn.push_str(db);
        }
        dsn.push_str(&format!(";port={}", self.port));
        dsn
    }

    /// Statements to run right after connecting.
    ///
    /// The character set must be a bare identifier; anything else is
    /// rejected rather than interpolated.
    pub fn session_statements(&self) -> Result<Vec<String>> {
        if self.charset.is_empty()
            || !self
                .charset
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'_')
        {
            return Err(Error::Config(format!("invalid charset `{}`", self.charset)));
        }
        Ok(vec![
            format!("SET NAMES {}", self.charset),
            format!(
                "SET SESSION sql_mode = '{}'",
                self.sql_mode.replace('\'', "''")
            ),
        ])
    }
}
