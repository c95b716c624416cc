//! Object-store adapters for record sets.
//!
//! Each table in [`AdapterSettings`] names a bucket, one or more keys, and a
//! message type. `CSV` tables go through the delimited codec; `XML`, `JSON`,
//! and `OTHER` tables go through the document pipeline, with an optional
//! rule set applied on the way out and on the way in.
//!
//! Every operation checks the required parameters before touching the
//! store, in this order: regional endpoint, access key id, secret access
//! key, bucket name, key name.
//!
//! # Example
//!
//! ```
//! use gridx_model::{Column, RecordSet, Value};
//! use gridx_transfer::{AdapterSettings, MemoryStore, ObjectStore, exporter_for};
//!
//! let settings: AdapterSettings = r#"
//!     [store]
//!     endpoint = "file:///srv/store"
//!     access_key_id = "id"
//!     secret_access_key = "secret"
//!
//!     [tables.Orders]
//!     bucket = "exports"
//!     key = "orders.csv"
//! "#
//! .parse()?;
//!
//! let records = RecordSet::from_rows(
//!     vec![Column::text("Name")],
//!     vec![vec![Value::text("Ann")]],
//! )?;
//!
//! let store = MemoryStore::new();
//! let context = settings.table("Orders")?;
//! let exporter = exporter_for(context.table.message_type()?, &store);
//! exporter.export(&context, &records)?;
//! assert_eq!(store.get("exports", "orders.csv")?, b"Name\nAnn\n");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod adapter;
mod delimited;
mod document;
mod error;
mod settings;
mod store;

pub use adapter::{ExportReport, Exporter, ImportedRecords, Importer, exporter_for, importer_for};
pub use delimited::{CsvExporter, CsvImporter};
pub use document::{DocumentExporter, DocumentImporter};
pub use error::{AdapterError, ErrorKind, Result, TransferError};
pub use settings::{
    AdapterSettings, ColumnSettings, MessageType, StoreSettings, TableContext, TableSettings,
};
pub use store::{FILE_SCHEME, FsStore, MemoryStore, ObjectStore, open_store};
