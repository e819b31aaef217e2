//! Unified classification of vendor column types.

use std::fmt;

use serde::Serialize;

/// Coarse type family shared by every database engine.
///
/// Column metadata keeps the driver's own type name; this classification
/// is computed on demand for generic handling such as form rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeClass {
    /// Short strings (`char`, `varchar`, `enum`, ...).
    Character,
    /// Long text (`text`, `longtext`, ...).
    Text,
    /// Blobs.
    Binary,
    /// Calendar dates.
    Date,
    /// Date and time.
    DateTime,
    /// Integers, floats and decimals.
    Numeric,
    /// Anything not recognized.
    Unknown,
}

impl TypeClass {
    /// Classify a vendor type name (case-insensitive).
    pub fn classify(data_type: &str) -> Self {
        match data_type.trim().to_ascii_lowercase().as_str() {
            "string" | "char" | "varchar" | "tinyblob" | "tinytext" | "enum" | "set" => {
                TypeClass::Character
            }
            "text" | "longtext" | "mediumtext" => TypeClass::Text,
            "image" | "blob" | "longblob" | "mediumblob" => TypeClass::Binary,
            "year" | "date" => TypeClass::Date,
            "time" | "datetime" | "timestamp" => TypeClass::DateTime,
            "int" | "integer" | "bigint" | "mediumint" | "smallint" | "float" | "double"
            | "decimal" | "dec" | "fixed" => TypeClass::Numeric,
            _ => TypeClass::Unknown,
        }
    }

    /// Lowercase label.
    pub const fn as_str(self) -> &'static str {
        match self {
            TypeClass::Character => "character",
            TypeClass::Text => "text",
            TypeClass::Binary => "binary",
            TypeClass::Date => "date",
            TypeClass::DateTime => "datetime",
            TypeClass::Numeric => "numeric",
            TypeClass::Unknown => "unknown",
        }
    }
}

impl fmt::Display for TypeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a vendor type name into its unified family label.
pub fn unify_data_type(data_type: &str) -> &'static str {
    TypeClass::classify(data_type).as_str()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_families() {
        assert_eq!(TypeClass::classify("VARCHAR"), TypeClass::Character);
        assert_eq!(TypeClass::classify("enum"), TypeClass::Character);
        assert_eq!(TypeClass::classify("mediumtext"), TypeClass::Text);
        assert_eq!(TypeClass::classify("longblob"), TypeClass::Binary);
        assert_eq!(TypeClass::classify("year"), TypeClass::Date);
        assert_eq!(TypeClass::classify("timestamp"), TypeClass::DateTime);
        assert_eq!(TypeClass::classify("dec"), TypeClass::Numeric);
    }

    #[test]
    fn test_unknown_types() {
        assert_eq!(unify_data_type("int4"), "unknown");
        assert_eq!(unify_data_type("tinyint"), "unknown");
        assert_eq!(unify_data_type("geometry"), "unknown");
    }
}
