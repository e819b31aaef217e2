//! Result rows returned by a gateway.

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::value::Value;

/// A single result row: column names paired with values, in select order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    columns: Vec<String>,
    values: Vec<Value>,
}

impl Row {
    /// Build a row from parallel column and value vectors.
    ///
    /// Extra names or values beyond the shorter of the two are dropped.
    pub fn new(columns: Vec<String>, values: Vec<Value>) -> Self {
        let mut columns = columns;
        let mut values = values;
        let len = columns.len().min(values.len());
        columns.truncate(len);
        values.truncate(len);
        Self { columns, values }
    }

    /// Build a row from `(column, value)` pairs.
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        let (columns, values) = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .unzip();
        Self { columns, values }
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the row has no columns.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value by column name. Lookups are case-sensitive.
    pub fn get_named(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|idx| &self.values[idx])
    }

    /// Value by position.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Column names in order.
    pub fn column_names(&self) -> &[String] {
        &self.columns
    }

    /// Iterate `(column, value)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }

    /// Consume the row into owned pairs.
    pub fn into_pairs(self) -> Vec<(String, Value)> {
        self.columns.into_iter().zip(self.values).collect()
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (column, value) in self.iter() {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_lookup() {
        let row = Row::from_pairs([("id", Value::BigInt(1)), ("name", Value::from("Alice"))]);
        assert_eq!(row.len(), 2);
        assert_eq!(row.get_named("name").and_then(Value::as_str), Some("Alice"));
        assert!(row.get_named("missing").is_none());
        assert_eq!(row.get(0), Some(&Value::BigInt(1)));
    }

    #[test]
    fn test_mismatched_lengths_truncate() {
        let row = Row::new(vec!["a".into(), "b".into()], vec![Value::Null]);
        assert_eq!(row.len(), 1);
        assert_eq!(row.column_names(), &["a".to_string()]);
    }

    #[test]
    fn test_serializes_as_object() {
        let row = Row::from_pairs([("id", Value::BigInt(1)), ("flag", Value::Bool(true))]);
        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, r#"{"id":1,"flag":true}"#);
    }
}
