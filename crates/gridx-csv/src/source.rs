//! Re-openable byte sources for the decoder.

use std::fs::File;
use std::io::{self, BufReader, Cursor, Read};
use std::path::{Path, PathBuf};

/// A byte stream that can be re-read from offset zero.
///
/// Every call to [`open`](ByteSource::open) returns an independent reader
/// positioned at the start of the data.
pub trait ByteSource {
    fn open(&self) -> io::Result<Box<dyn Read + '_>>;

    /// Human-readable name used in logs and errors.
    fn describe(&self) -> String;
}

impl<T: ByteSource + ?Sized> ByteSource for &T {
    fn open(&self) -> io::Result<Box<dyn Read + '_>> {
        (**self).open()
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// Bytes held in memory, e.g. a downloaded object.
#[derive(Debug, Clone)]
pub struct MemorySource {
    name: String,
    bytes: Vec<u8>,
}

impl MemorySource {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl ByteSource for MemorySource {
    fn open(&self) -> io::Result<Box<dyn Read + '_>> {
        Ok(Box::new(Cursor::new(self.bytes.as_slice())))
    }

    fn describe(&self) -> String {
        self.name.clone()
    }
}

/// A file on disk, re-opened for every pass.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ByteSource for FileSource {
    fn open(&self) -> io::Result<Box<dyn Read + '_>> {
        let file = File::open(&self.path)?;
        Ok(Box::new(BufReader::new(file)))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_memory_source_reopens_from_start() {
        let source = MemorySource::new("mem", "abc");
        let mut first = String::new();
        source.open().unwrap().read_to_string(&mut first).unwrap();
        let mut second = String::new();
        source.open().unwrap().read_to_string(&mut second).unwrap();
        assert_eq!(first, "abc");
        assert_eq!(second, "abc");
    }

    #[test]
    fn test_file_source() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "x,y\n1,2\n").unwrap();
        let source = FileSource::new(file.path());
        let mut text = String::new();
        source.open().unwrap().read_to_string(&mut text).unwrap();
        assert_eq!(text, "x,y\n1,2\n");
    }

    #[test]
    fn test_missing_file_fails_to_open() {
        let dir = tempfile::tempdir().unwrap();
        let source = FileSource::new(dir.path().join("missing.csv"));
        assert!(source.open().is_err());
    }
}
