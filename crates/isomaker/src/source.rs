//! File content descriptors.
//!
//! The builder never reads file data. It only records where the data will come from so the
//! layout/writer stage can fetch it later.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Stream-backed file content, implemented by whoever eventually produces the bytes.
pub trait ContentStream: fmt::Debug + Send + Sync {
    /// Number of bytes the stream will yield.
    fn size(&self) -> u64;

    /// Human readable description used in diagnostics.
    fn describe(&self) -> String {
        format!("<stream of {} bytes>", self.size())
    }
}

/// Where the content of a file object comes from.
#[derive(Debug, Clone)]
pub enum FileSource {
    /// A file on the host file system, opened by the writer.
    HostPath(PathBuf),
    /// An arbitrary stream supplied by the caller.
    Stream(Arc<dyn ContentStream>),
}

impl FileSource {
    pub fn host_path(path: impl Into<PathBuf>) -> Self {
        FileSource::HostPath(path.into())
    }

    pub fn as_host_path(&self) -> Option<&Path> {
        match self {
            FileSource::HostPath(path) => Some(path),
            FileSource::Stream(_) => None,
        }
    }

    /// Size of the content when it is known without touching the host file system.
    pub fn known_size(&self) -> Option<u64> {
        match self {
            FileSource::HostPath(_) => None,
            FileSource::Stream(stream) => Some(stream.size()),
        }
    }
}

impl fmt::Display for FileSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileSource::HostPath(path) => write!(f, "{}", path.display()),
            FileSource::Stream(stream) => f.write_str(&stream.describe()),
        }
    }
}
