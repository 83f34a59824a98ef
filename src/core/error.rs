use std::io;

use thiserror::Error;

/// Errors raised by file system backends and file handles.
///
/// Each variant mirrors the condition a caller would see from a real operating system,
/// so code under test can tell "config not found" from "cache dir missing" the same
/// way it would against a real disk.
#[derive(Debug, Error)]
pub enum FsError {
    /// The path does not resolve to a file (missing, or a directory where a file was required).
    #[error("No such file or directory: '{0}'")]
    FileNotFound(String),

    /// An ancestor directory needed by a write-type operation does not exist.
    #[error("No such directory: '{0}'")]
    DirectoryNotFound(String),

    #[error("File exists: '{0}'")]
    AlreadyExists(String),

    #[error("Not a directory: '{0}'")]
    NotADirectory(String),

    #[error("Is a directory: '{0}'")]
    IsADirectory(String),

    /// The handle was opened in a mode that does not permit the operation.
    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),

    #[error("I/O operation on closed file: '{0}'")]
    Closed(String),

    #[error("invalid mode: '{0}'")]
    InvalidMode(String),

    #[error("invalid fixture: {0}")]
    InvalidFixture(String),

    #[error("I/O error on '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
}

impl FsError {
    /// Translates a host I/O error into the taxonomy above.
    /// Unknown kinds are kept as [`FsError::Io`].
    pub fn from_io(err: io::Error, path: &str) -> Self {
        let path = path.to_string();
        match err.kind() {
            io::ErrorKind::NotFound => FsError::FileNotFound(path),
            io::ErrorKind::AlreadyExists => FsError::AlreadyExists(path),
            io::ErrorKind::NotADirectory => FsError::NotADirectory(path),
            io::ErrorKind::IsADirectory => FsError::IsADirectory(path),
            _ => FsError::Io { path, source: err },
        }
    }

    /// The closest `std::io::ErrorKind` for this error.
    pub fn kind(&self) -> io::ErrorKind {
        match self {
            FsError::FileNotFound(_) | FsError::DirectoryNotFound(_) => io::ErrorKind::NotFound,
            FsError::AlreadyExists(_) => io::ErrorKind::AlreadyExists,
            FsError::NotADirectory(_) => io::ErrorKind::NotADirectory,
            FsError::IsADirectory(_) => io::ErrorKind::IsADirectory,
            FsError::Unsupported(_) => io::ErrorKind::Unsupported,
            FsError::Closed(_) => io::ErrorKind::Other,
            FsError::InvalidMode(_) | FsError::InvalidFixture(_) => io::ErrorKind::InvalidInput,
            FsError::Io { source, .. } => source.kind(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == io::ErrorKind::NotFound
    }
}

impl From<FsError> for io::Error {
    fn from(err: FsError) -> Self {
        match err {
            FsError::Io { source, .. } => source,
            other => io::Error::new(other.kind(), other),
        }
    }
}
