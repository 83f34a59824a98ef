mod error;
mod mode;
pub mod utils;

pub use error::FsError;
pub use mode::OpenMode;

pub type Result<T> = std::result::Result<T, FsError>;

/// The file system surface that code under test talks to.
///
/// Both the real-disk [`HostFS`](crate::HostFS) and the in-memory [`MockFS`](crate::MockFS)
/// implement it, so a collaborator written against `&dyn FsBackend` runs unmodified
/// against either one.
///
/// Paths are `/`-separated strings.
pub trait FsBackend: Send + Sync {
    /// Returns `true` if `path` names a file or a directory.
    fn exists(&self, path: &str) -> bool;

    /// Returns `true` if `path` names a file.
    fn is_file(&self, path: &str) -> bool;

    /// Returns `true` if `path` names a directory. The root always is one.
    fn is_dir(&self, path: &str) -> bool;

    /// Opens a file. Preconditions depend on `mode`:
    /// * `Read` - `path` must be a file, otherwise [`FsError::FileNotFound`].
    /// * `Write`, `Append` - the parent directory must exist, otherwise
    ///   [`FsError::DirectoryNotFound`]. Missing parents are never created.
    fn open(&self, path: &str, mode: OpenMode) -> Result<Box<dyn FileHandle>>;

    /// Creates a single directory. The parent must already exist.
    fn mkdir(&self, path: &str) -> Result<()>;

    /// Lists the names of the immediate children of a directory.
    /// Each call reflects the state at the time of the call.
    fn ls(&self, path: &str) -> Result<DirListing>;

    /// Removes a file. Directories are not removable.
    fn rm(&self, path: &str) -> Result<()>;

    /// The current working directory. It does not need to exist.
    fn cwd(&self) -> String;

    /// Replaces a leading `~` with the user's home directory.
    fn expand_user(&self, path: &str) -> String;

    /// Absolute paths are returned unchanged; relative ones are joined onto [`cwd`](Self::cwd).
    fn abs_path(&self, path: &str) -> String;

    /// Returns the metadata of `path`. The in-memory backend never fails here.
    fn stat(&self, path: &str) -> Result<Metadata>;

    /// Sets the permission bits of `path`. The in-memory backend ignores the call.
    fn chmod(&self, path: &str, mode: u32) -> Result<()>;

    /// Copies the content of file `src` to `dst`. The parent of `dst` must exist.
    fn copy(&self, src: &str, dst: &str) -> Result<()>;

    /// Reads the whole content of a file.
    fn read_to_string(&self, path: &str) -> Result<String> {
        with_file(self.open(path, OpenMode::Read)?, |file| file.read())
    }

    /// Replaces the content of a file, creating it if needed.
    fn write(&self, path: &str, content: &str) -> Result<()> {
        with_file(self.open(path, OpenMode::Write)?, |file| {
            file.write(content).map(|_| ())
        })
    }
}

/// An open file.
///
/// Writes are buffered and land in the file system when the handle is closed.
/// Implementations close themselves on drop, so the commit happens on every exit
/// path; call [`close`](Self::close) explicitly to observe commit errors.
pub trait FileHandle: Send {
    fn path(&self) -> &str;

    fn mode(&self) -> OpenMode;

    /// Returns the not yet consumed content and advances to the end.
    /// Fails with [`FsError::Unsupported`] if the handle is not readable.
    fn read(&mut self) -> Result<String>;

    /// Appends `chunk` to the buffer and returns its length in bytes.
    /// Fails with [`FsError::Unsupported`] if the handle is not writable.
    fn write(&mut self, chunk: &str) -> Result<usize>;

    /// Commits the buffer. Closing an already closed handle is a no-op.
    fn close(&mut self) -> Result<()>;

    fn is_closed(&self) -> bool;
}

/// Runs `f` with an open handle and always closes it afterwards.
///
/// The error from `f` takes precedence over a commit error.
pub fn with_file<T, F>(mut file: Box<dyn FileHandle>, f: F) -> Result<T>
where
    F: FnOnce(&mut dyn FileHandle) -> Result<T>,
{
    let result = f(file.as_mut());
    let closed = file.close();
    let value = result?;
    closed?;
    Ok(value)
}

/// File metadata as returned by [`FsBackend::stat`].
/// The in-memory backend returns all zeroes.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    pub mode: u32,
    pub size: u64,
    pub uid: u32,
    pub gid: u32,
    pub atime: i64,
    pub mtime: i64,
    pub ctime: i64,
}

/// Iterator over the child names of a directory.
#[derive(Debug)]
pub struct DirListing {
    names: std::vec::IntoIter<String>,
}

impl DirListing {
    pub(crate) fn new(names: Vec<String>) -> Self {
        Self {
            names: names.into_iter(),
        }
    }
}

impl Iterator for DirListing {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        self.names.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.names.size_hint()
    }
}

impl ExactSizeIterator for DirListing {}
