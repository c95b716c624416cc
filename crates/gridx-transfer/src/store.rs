//! Object-store collaborators.
//!
//! Objects are addressed by `bucket` and `key`. [`FsStore`] maps a bucket to
//! a sub-directory of its root and a key to a relative path inside it;
//! [`MemoryStore`] keeps objects in a map.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use crate::error::TransferError;

/// Endpoint prefix understood by [`open_store`].
pub const FILE_SCHEME: &str = "file://";

/// Uploads and downloads whole objects.
pub trait ObjectStore: Send + Sync {
    fn put(&self, bucket: &str, key: &str, bytes: &[u8]) -> Result<(), TransferError>;

    fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>, TransferError>;
}

/// Opens the store named by a `file://` endpoint.
pub fn open_store(endpoint: &str) -> Result<Box<dyn ObjectStore>, TransferError> {
    let endpoint = endpoint.trim();
    match endpoint.strip_prefix(FILE_SCHEME) {
        Some(root) if !root.is_empty() => Ok(Box::new(FsStore::new(root))),
        _ => Err(TransferError::UnsupportedEndpoint {
            endpoint: endpoint.to_string(),
        }),
    }
}

/// Objects held in memory, keyed by bucket and key.
#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: Mutex<BTreeMap<(String, String), Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_object(self, bucket: &str, key: &str, bytes: impl Into<Vec<u8>>) -> Self {
        self.objects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((bucket.to_string(), key.to_string()), bytes.into());
        self
    }

    pub fn len(&self) -> usize {
        self.objects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ObjectStore for MemoryStore {
    fn put(&self, bucket: &str, key: &str, bytes: &[u8]) -> Result<(), TransferError> {
        self.objects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((bucket.to_string(), key.to_string()), bytes.to_vec());
        Ok(())
    }

    fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>, TransferError> {
        self.objects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
            .ok_or_else(|| TransferError::NotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            })
    }
}

/// Objects stored as files below a root directory.
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves the file backing `bucket|key`.
    ///
    /// The bucket must be a single path segment and the key a relative path
    /// without `.` or `..` segments.
    pub fn object_path(&self, bucket: &str, key: &str) -> Result<PathBuf, TransferError> {
        let bucket_path = Path::new(bucket);
        let key_path = Path::new(key);
        let valid = bucket_path.components().count() == 1
            && is_plain_relative(bucket_path)
            && is_plain_relative(key_path);
        if !valid {
            return Err(TransferError::InvalidLocation {
                bucket: bucket.to_string(),
                key: key.to_string(),
            });
        }
        Ok(self.root.join(bucket_path).join(key_path))
    }
}

fn is_plain_relative(path: &Path) -> bool {
    let mut components = path.components().peekable();
    components.peek().is_some() && components.all(|c| matches!(c, Component::Normal(_)))
}

impl ObjectStore for FsStore {
    fn put(&self, bucket: &str, key: &str, bytes: &[u8]) -> Result<(), TransferError> {
        let path = self.object_path(bucket, key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| TransferError::upload(bucket, key, e))?;
        }
        fs::write(&path, bytes).map_err(|e| TransferError::upload(bucket, key, e))?;
        tracing::debug!(path = %path.display(), bytes = bytes.len(), "wrote object");
        Ok(())
    }

    fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>, TransferError> {
        let path = self.object_path(bucket, key)?;
        let bytes = fs::read(&path).map_err(|e| TransferError::download(bucket, key, e))?;
        tracing::debug!(path = %path.display(), bytes = bytes.len(), "read object");
        Ok(bytes)
    }
}
