//! Record engine configuration.

/// Settings shared by every record created through a [`Database`](crate::Database).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordConfig {
    /// Prepended to entity names to form table names (default: empty)
    pub table_prefix: String,
    /// Columns protected from form assignment on every record (default: `id`)
    pub default_protected_fields: Vec<String>,
    /// Driver text that means `true` for boolean columns (default: `t`)
    pub boolean_true_marker: String,
    /// Column types loaded as booleans
    pub boolean_types: Vec<String>,
    /// Column types rendered as checkboxes in forms
    pub checkbox_types: Vec<String>,
    /// Column types whose form input is reduced to digits
    pub integer_types: Vec<String>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

impl Default for RecordConfig {
    fn default() -> Self {
        Self {
            table_prefix: String::new(),
            default_protected_fields: strings(&["id"]),
            boolean_true_marker: "t".to_string(),
            boolean_types: strings(&["bool", "boolean"]),
            checkbox_types: strings(&["bool", "boolean", "tinyint"]),
            integer_types: strings(&["int", "integer"]),
        }
    }
}

impl RecordConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the table prefix.
    pub fn table_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.table_prefix = prefix.into();
        self
    }

    /// Replace the default protected fields.
    pub fn default_protected_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.default_protected_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Set the boolean truth marker.
    pub fn boolean_true_marker(mut self, marker: impl Into<String>) -> Self {
        self.boolean_true_marker = marker.into();
        self
    }

    /// Replace the boolean column types.
    pub fn boolean_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.boolean_types = types.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the checkbox column types.
    pub fn checkbox_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.checkbox_types = types.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the integer column types.
    pub fn integer_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.integer_types = types.into_iter().map(Into::into).collect();
        self
    }

    /// Table name for an entity: the prefix followed by the entity name.
    pub fn table_name(&self, entity: &str) -> String {
        format!("{}{}", self.table_prefix, entity)
    }
}
