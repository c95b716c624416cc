//! Adapter settings loaded from TOML.
//!
//! ```toml
//! [store]
//! endpoint = "file:///var/data/store"
//! access_key_id = "AKIA..."
//! secret_access_key = "..."
//!
//! [tables.Orders]
//! bucket = "exports"
//! key = "orders.csv"
//! message_type = "CSV"
//! separator = ";"
//! culture = "de-DE"
//! columns = [{ name = "Secret", export = false }]
//! ```

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use gridx_csv::DEFAULT_SEPARATOR;
use gridx_document::DocumentEncoding;
use gridx_model::Column;

use crate::error::{AdapterError, Result};

/// Store endpoint and credentials shared by every table.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    pub endpoint: String,
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl fmt::Debug for StoreSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secret = if self.secret_access_key.is_empty() {
            ""
        } else {
            "[REDACTED]"
        };
        f.debug_struct("StoreSettings")
            .field("endpoint", &self.endpoint)
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &secret)
            .finish()
    }
}

/// Per-column settings; columns without an entry are exported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSettings {
    pub name: String,
    #[serde(default = "default_true")]
    pub export: bool,
}

/// Wire format of a table's objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MessageType {
    #[default]
    Csv,
    Document(DocumentEncoding),
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Csv => "CSV",
            Self::Document(encoding) => encoding.as_str(),
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageType {
    type Err = AdapterError;

    fn from_str(s: &str) -> Result<Self> {
        if s.trim().eq_ignore_ascii_case("csv") {
            return Ok(Self::Csv);
        }
        s.parse::<DocumentEncoding>()
            .map(Self::Document)
            .map_err(|_| AdapterError::InvalidMessageType {
                value: s.trim().to_string(),
            })
    }
}

/// Settings for one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableSettings {
    pub bucket: String,
    /// Single object key.
    pub key: String,
    /// Import fragments; takes precedence over `key` when non-empty.
    pub keys: Vec<String>,
    pub message_type: String,
    pub separator: String,
    pub headers: bool,
    pub culture: Option<String>,
    /// Inline rule set.
    pub transform: Option<String>,
    /// Rule set file, relative to the settings file.
    pub transform_file: Option<PathBuf>,
    pub columns: Vec<ColumnSettings>,
}

impl Default for TableSettings {
    fn default() -> Self {
        Self {
            bucket: String::new(),
            key: String::new(),
            keys: Vec::new(),
            message_type: MessageType::Csv.as_str().to_string(),
            separator: DEFAULT_SEPARATOR.to_string(),
            headers: true,
            culture: None,
            transform: None,
            transform_file: None,
            columns: Vec::new(),
        }
    }
}

impl TableSettings {
    /// Object keys to read or write, ignoring blank entries.
    pub fn object_keys(&self) -> Vec<&str> {
        let keys: Vec<&str> = self
            .keys
            .iter()
            .map(String::as_str)
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .collect();
        if !keys.is_empty() {
            return keys;
        }
        match self.key.trim() {
            "" => Vec::new(),
            key => vec![key],
        }
    }

    pub fn message_type(&self) -> Result<MessageType> {
        self.message_type.parse()
    }

    /// The separator for writing; empty means `,`.
    pub fn write_separator(&self) -> &str {
        if self.separator.is_empty() {
            DEFAULT_SEPARATOR
        } else {
            &self.separator
        }
    }

    /// The separator for reading: the first character of [`write_separator`](Self::write_separator).
    pub fn read_separator(&self) -> char {
        self.write_separator().chars().next().unwrap_or(',')
    }

    /// The configured culture, if it is not blank.
    pub fn culture_name(&self) -> Option<&str> {
        self.culture
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }

    /// Export flags keyed by column name.
    pub fn export_flags(&self) -> impl Iterator<Item = (&str, bool)> {
        self.columns
            .iter()
            .map(|column| (column.name.as_str(), column.export))
    }

    /// Columns reported by an import that finds no rows.
    pub fn fallback_columns(&self) -> Vec<Column> {
        self.columns
            .iter()
            .map(|column| Column::text(column.name.as_str()))
            .collect()
    }

    /// The rule-set text; blank when neither `transform` nor
    /// `transform_file` is set.
    pub fn rule_text(&self) -> Result<Cow<'_, str>> {
        if let Some(text) = self.transform.as_deref()
            && !text.trim().is_empty()
        {
            return Ok(Cow::Borrowed(text));
        }
        match &self.transform_file {
            Some(path) => fs::read_to_string(path)
                .map(Cow::Owned)
                .map_err(|e| AdapterError::settings(path, e)),
            None => Ok(Cow::Borrowed("")),
        }
    }
}

/// All adapter settings: one store plus named tables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdapterSettings {
    pub store: StoreSettings,
    pub tables: BTreeMap<String, TableSettings>,
}

impl AdapterSettings {
    /// Loads settings from a TOML file.
    ///
    /// Relative `transform_file` paths are resolved against the file's
    /// directory.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| AdapterError::settings(path, e))?;
        let mut settings: Self =
            toml::from_str(&contents).map_err(|e| AdapterError::settings(path, e))?;

        let base = path.parent().unwrap_or_else(|| Path::new(""));
        for table in settings.tables.values_mut() {
            if let Some(file) = table.transform_file.as_mut()
                && file.is_relative()
            {
                *file = base.join(&*file);
            }
        }
        tracing::debug!(path = %path.display(), tables = settings.tables.len(), "loaded adapter settings");
        Ok(settings)
    }

    pub fn table(&self, name: &str) -> Result<TableContext<'_>> {
        self.tables
            .get_key_value(name)
            .map(|(name, table)| TableContext {
                name,
                store: &self.store,
                table,
            })
            .ok_or_else(|| AdapterError::UnknownTable {
                table: name.to_string(),
            })
    }

    pub fn table_contexts(&self) -> impl Iterator<Item = TableContext<'_>> {
        self.tables.iter().map(|(name, table)| TableContext {
            name,
            store: &self.store,
            table,
        })
    }
}

impl FromStr for AdapterSettings {
    type Err = toml::de::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        toml::from_str(s)
    }
}

/// Store and table settings for one adapter call.
#[derive(Debug, Clone, Copy)]
pub struct TableContext<'a> {
    pub name: &'a str,
    pub store: &'a StoreSettings,
    pub table: &'a TableSettings,
}

impl<'a> TableContext<'a> {
    pub fn new(name: &'a str, store: &'a StoreSettings, table: &'a TableSettings) -> Self {
        Self { name, store, table }
    }

    /// Checks the required parameters in the order they are reported, before
    /// any I/O. Returns the object keys.
    pub fn validate(&self) -> Result<Vec<&'a str>> {
        let required = [
            ("Regional Endpoint", self.store.endpoint.as_str()),
            ("Access Key ID", self.store.access_key_id.as_str()),
            ("Secret Access Key", self.store.secret_access_key.as_str()),
            ("Bucket Name", self.table.bucket.as_str()),
        ];
        if let Some((parameter, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(AdapterError::ConfigurationMissing {
                parameter: *parameter,
            });
        }
        let keys = self.table.object_keys();
        if keys.is_empty() {
            return Err(AdapterError::ConfigurationMissing {
                parameter: "Key Name",
            });
        }
        Ok(keys)
    }

    /// True when endpoint, bucket, and key are all present.
    pub(crate) fn is_bound(&self) -> bool {
        !self.store.endpoint.trim().is_empty()
            && !self.table.bucket.trim().is_empty()
            && !self.table.object_keys().is_empty()
    }

    pub(crate) fn keys_label(&self) -> String {
        self.table.object_keys().join(", ")
    }
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[store]
endpoint = "file:///srv/store"
access_key_id = "AKIAEXAMPLE"
secret_access_key = "shh"

[tables.Orders]
bucket = "exports"
key = "orders.csv"
separator = ";"
culture = "de-DE"
columns = [{ name = "Secret", export = false }, { name = "Name" }]

[tables.Feed]
bucket = "feeds"
keys = ["a.json", " ", "b.json"]
message_type = "json"
"#;

    #[test]
    fn test_parse_settings() {
        let settings: AdapterSettings = SAMPLE.parse().unwrap();
        let orders = &settings.tables["Orders"];
        assert_eq!(orders.message_type().unwrap(), MessageType::Csv);
        assert_eq!(orders.read_separator(), ';');
        assert!(orders.headers);
        assert_eq!(orders.culture_name(), Some("de-DE"));
        assert_eq!(
            orders.export_flags().collect::<Vec<_>>(),
            vec![("Secret", false), ("Name", true)]
        );

        let feed = &settings.tables["Feed"];
        assert_eq!(
            feed.message_type().unwrap(),
            MessageType::Document(DocumentEncoding::KeyValue)
        );
        assert_eq!(feed.object_keys(), vec!["a.json", "b.json"]);
        assert_eq!(feed.write_separator(), ",");
    }

    #[test]
    fn test_secret_is_redacted() {
        let settings: AdapterSettings = SAMPLE.parse().unwrap();
        let debug = format!("{:?}", settings.store);
        assert!(!debug.contains("shh"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_validation_order() {
        let mut settings: AdapterSettings = SAMPLE.parse().unwrap();
        assert_eq!(
            settings.table("Orders").unwrap().validate().unwrap(),
            vec!["orders.csv"]
        );

        settings.store.secret_access_key.clear();
        settings.tables.get_mut("Orders").unwrap().bucket.clear();
        let err = settings.table("Orders").unwrap().validate().unwrap_err();
        assert_eq!(err.to_string(), "The Secret Access Key parameter is not specified");

        settings.store.secret_access_key = "shh".to_string();
        let err = settings.table("Orders").unwrap().validate().unwrap_err();
        assert_eq!(err.to_string(), "The Bucket Name parameter is not specified");

        let table = TableSettings {
            bucket: "b".to_string(),
            ..TableSettings::default()
        };
        let err = TableContext::new("T", &settings.store, &table)
            .validate()
            .unwrap_err();
        assert_eq!(err.to_string(), "The Key Name parameter is not specified");

        assert!(matches!(
            settings.table("Missing"),
            Err(AdapterError::UnknownTable { .. })
        ));
    }

    #[test]
    fn test_message_types() {
        assert_eq!("XML".parse::<MessageType>().unwrap().as_str(), "XML");
        assert_eq!("other".parse::<MessageType>().unwrap().as_str(), "OTHER");
        let err = "YAML".parse::<MessageType>().unwrap_err();
        assert_eq!(err.to_string(), "Invalid Message Type 'YAML'");
    }

    #[test]
    fn test_transform_file_is_resolved_against_settings_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("rules.xml"), "<rules/>").unwrap();
        let path = dir.path().join("gridx.toml");
        std::fs::write(
            &path,
            "[tables.T]\nbucket = \"b\"\nkey = \"k\"\ntransform_file = \"rules.xml\"\n",
        )
        .unwrap();

        let settings = AdapterSettings::load(&path).unwrap();
        let table = &settings.tables["T"];
        assert_eq!(table.rule_text().unwrap(), "<rules/>");
        assert!(TableSettings::default().rule_text().unwrap().is_empty());
    }
}
