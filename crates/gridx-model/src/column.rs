//! Column metadata.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Inferred or declared type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ColumnType {
    #[default]
    Text,
    Number,
    DateTime,
}

impl ColumnType {
    /// Returns the canonical name used in configuration and summaries.
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Text => "Text",
            ColumnType::Number => "Number",
            ColumnType::DateTime => "DateTime",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColumnType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" | "string" => Ok(ColumnType::Text),
            "number" | "double" | "real" => Ok(ColumnType::Number),
            "datetime" | "date" => Ok(ColumnType::DateTime),
            other => Err(format!("unknown column type '{other}'")),
        }
    }
}

/// A named, typed column of a record set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    #[serde(rename = "type", default)]
    pub column_type: ColumnType,
    /// Host-declared nullable type (e.g. an optional number).
    #[serde(default)]
    pub nullable: bool,
    #[serde(default = "default_export_enabled")]
    pub export_enabled: bool,
}

fn default_export_enabled() -> bool {
    true
}

impl Column {
    /// Creates an export-enabled, non-nullable column.
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            nullable: false,
            export_enabled: true,
        }
    }

    /// Creates a text column.
    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, ColumnType::Text)
    }

    #[must_use]
    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    #[must_use]
    pub fn with_export(mut self, enabled: bool) -> Self {
        self.export_enabled = enabled;
        self
    }

    /// Returns the declared type with any nullable wrapper removed.
    pub fn base_type(&self) -> ColumnType {
        self.column_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_defaults() {
        let col = Column::text("Name");
        assert_eq!(col.column_type, ColumnType::Text);
        assert!(col.export_enabled);
        assert!(!col.nullable);
    }

    #[test]
    fn test_column_type_from_str() {
        assert_eq!("Number".parse::<ColumnType>(), Ok(ColumnType::Number));
        assert_eq!("double".parse::<ColumnType>(), Ok(ColumnType::Number));
        assert_eq!("DateTime".parse::<ColumnType>(), Ok(ColumnType::DateTime));
        assert!("blob".parse::<ColumnType>().is_err());
    }

    #[test]
    fn test_column_deserialize_defaults() {
        let col: Column = serde_json::from_str(r#"{"name":"Qty","type":"Number"}"#).unwrap();
        assert_eq!(col.column_type, ColumnType::Number);
        assert!(col.export_enabled);
    }
}
