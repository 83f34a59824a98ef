//! File handle returned by [`MockFS`](crate::MockFS).
//!
//! A handle moves through three states:
//!
//! * `Unloaded` - open, but nothing has been read from the tree yet. Read handles stay here
//!   until the first `read()`, append handles until the first `write()`.
//! * `Loaded` - the buffer holds the working content. Write handles start here with an
//!   empty buffer.
//! * `Closed` - the buffer has been committed (writable modes) and dropped.
//!
//! The handle never observes changes made through another handle after it has loaded:
//! the last one to close wins.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, warn};

use super::tree::{Lookup, TreeStore};
use crate::core::{FileHandle, FsError, OpenMode, Result};

#[derive(Debug)]
enum State {
    Unloaded,
    Loaded { buffer: String, pos: usize },
    Closed,
}

#[derive(Debug)]
pub struct MockFile {
    path: String,
    mode: OpenMode,
    store: Arc<Mutex<TreeStore>>,
    state: State,
}

impl MockFile {
    /// Preconditions are checked by the caller; see `MockFS::open`.
    pub(crate) fn new(path: &str, mode: OpenMode, store: Arc<Mutex<TreeStore>>) -> Self {
        let state = match mode {
            OpenMode::Write => State::Loaded {
                buffer: String::new(),
                pos: 0,
            },
            OpenMode::Read | OpenMode::Append => State::Unloaded,
        };
        Self {
            path: path.to_string(),
            mode,
            store,
            state,
        }
    }

    /// Returns `true` once the buffer holds the working content.
    pub fn is_loaded(&self) -> bool {
        matches!(self.state, State::Loaded { .. })
    }

    fn ensure_open(&self) -> Result<()> {
        match self.state {
            State::Closed => Err(FsError::Closed(self.path.clone())),
            _ => Ok(()),
        }
    }

    /// Moves `Unloaded` to `Loaded`, pulling the current content from the tree.
    /// Read mode requires the file to still exist; append mode starts empty if it doesn't.
    fn load(&mut self) -> Result<(&mut String, &mut usize)> {
        if let State::Unloaded = self.state {
            let content = match self.store.lock().lookup(&self.path) {
                Some(Lookup::File(content)) => Some(content.to_string()),
                _ => None,
            };
            let buffer = match (content, self.mode) {
                (Some(content), _) => content,
                (None, OpenMode::Append) => String::new(),
                (None, _) => return Err(FsError::FileNotFound(self.path.clone())),
            };
            debug!(path = %self.path, mode = %self.mode, len = buffer.len(), "loaded content");
            self.state = State::Loaded { buffer, pos: 0 };
        }

        match &mut self.state {
            State::Loaded { buffer, pos } => Ok((buffer, pos)),
            State::Unloaded | State::Closed => Err(FsError::Closed(self.path.clone())),
        }
    }
}

impl FileHandle for MockFile {
    fn path(&self) -> &str {
        &self.path
    }

    fn mode(&self) -> OpenMode {
        self.mode
    }

    fn read(&mut self) -> Result<String> {
        self.ensure_open()?;
        if !self.mode.is_readable() {
            return Err(FsError::Unsupported("not readable"));
        }
        let (buffer, pos) = self.load()?;
        let rest = buffer[*pos..].to_string();
        *pos = buffer.len();
        Ok(rest)
    }

    fn write(&mut self, chunk: &str) -> Result<usize> {
        self.ensure_open()?;
        if !self.mode.is_writable() {
            return Err(FsError::Unsupported("not writable"));
        }
        let (buffer, pos) = self.load()?;
        buffer.push_str(chunk);
        *pos = buffer.len();
        Ok(chunk.len())
    }

    fn close(&mut self) -> Result<()> {
        if self.is_closed() {
            return Ok(());
        }
        if !self.mode.is_writable() {
            self.state = State::Closed;
            return Ok(());
        }

        // an append handle that was never written still creates the file
        let loaded = self.load().map(|(buffer, _)| std::mem::take(buffer));
        self.state = State::Closed;
        let buffer = loaded?;

        debug!(path = %self.path, len = buffer.len(), "committing on close");
        self.store.lock().set(&self.path, buffer, false)
    }

    fn is_closed(&self) -> bool {
        matches!(self.state, State::Closed)
    }
}

impl Drop for MockFile {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            warn!(path = %self.path, error = %err, "failed to commit file on drop");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vfs::node::Children;
    use serde_json::json;

    fn setup_store() -> Arc<Mutex<TreeStore>> {
        let root: Children = serde_json::from_value(json!({
            "filename1": "content of filename 1",
            "dir1": { "dir2": {} }
        }))
        .unwrap();
        Arc::new(Mutex::new(TreeStore::new(root)))
    }

    fn content(store: &Arc<Mutex<TreeStore>>, path: &str) -> Option<String> {
        store
            .lock()
            .get(path)
            .and_then(|node| node.content().map(str::to_string))
    }

    mod read {
        use super::*;

        #[test]
        fn test_read_is_lazy() -> Result<()> {
            let store = setup_store();
            let mut file = MockFile::new("/filename1", OpenMode::Read, store.clone());
            assert!(!file.is_loaded());

            store.lock().set("/filename1", "changed before read".into(), false)?;

            assert_eq!(file.read()?, "changed before read");
            assert!(file.is_loaded());
            Ok(())
        }

        #[test]
        fn test_second_read_returns_rest() -> Result<()> {
            let mut file = MockFile::new("/filename1", OpenMode::Read, setup_store());
            assert_eq!(file.read()?, "content of filename 1");
            assert_eq!(file.read()?, "");
            Ok(())
        }

        #[test]
        fn test_read_removed_before_load() -> Result<()> {
            let store = setup_store();
            let mut file = MockFile::new("/filename1", OpenMode::Read, store.clone());
            store.lock().remove("/filename1")?;
            assert!(matches!(file.read(), Err(FsError::FileNotFound(_))));
            Ok(())
        }

        #[test]
        fn test_read_mode_not_writable() {
            let mut file = MockFile::new("/filename1", OpenMode::Read, setup_store());
            assert!(matches!(file.write("test"), Err(FsError::Unsupported("not writable"))));
        }

        #[test]
        fn test_read_handle_does_not_commit() -> Result<()> {
            let store = setup_store();
            let mut file = MockFile::new("/filename1", OpenMode::Read, store.clone());
            file.read()?;
            store.lock().remove("/filename1")?;
            file.close()?;
            assert!(content(&store, "/filename1").is_none());
            Ok(())
        }
    }

    mod write {
        use super::*;

        #[test]
        fn test_write_commits_only_on_close() -> Result<()> {
            let store = setup_store();
            let mut file = MockFile::new("/dir1/filename3", OpenMode::Write, store.clone());
            file.write("line 1\n")?;
            file.write("line 2\n")?;
            assert!(content(&store, "/dir1/filename3").is_none());

            file.close()?;
            assert_eq!(content(&store, "/dir1/filename3").as_deref(), Some("line 1\nline 2\n"));
            Ok(())
        }

        #[test]
        fn test_write_truncates_existing() -> Result<()> {
            let store = setup_store();
            let mut file = MockFile::new("/filename1", OpenMode::Write, store.clone());
            file.write("new")?;
            file.close()?;
            assert_eq!(content(&store, "/filename1").as_deref(), Some("new"));
            Ok(())
        }

        #[test]
        fn test_write_without_writes_creates_empty_file() -> Result<()> {
            let store = setup_store();
            let mut file = MockFile::new("/filename1", OpenMode::Write, store.clone());
            file.close()?;
            assert_eq!(content(&store, "/filename1").as_deref(), Some(""));
            Ok(())
        }

        #[test]
        fn test_write_mode_not_readable() {
            let mut file = MockFile::new("/dir1/filenameZ", OpenMode::Write, setup_store());
            assert!(matches!(file.read(), Err(FsError::Unsupported("not readable"))));
        }

        #[test]
        fn test_write_returns_chunk_len() -> Result<()> {
            let mut file = MockFile::new("/x", OpenMode::Write, setup_store());
            assert_eq!(file.write("héllo")?, 6);
            Ok(())
        }
    }

    mod append {
        use super::*;

        #[test]
        fn test_append_loads_on_first_write() -> Result<()> {
            let store = setup_store();
            let mut file = MockFile::new("/filename1", OpenMode::Append, store.clone());
            assert!(!file.is_loaded());

            store.lock().set("/filename1", "base".into(), false)?;
            file.write("+tail")?;
            assert!(file.is_loaded());

            file.close()?;
            assert_eq!(content(&store, "/filename1").as_deref(), Some("base+tail"));
            Ok(())
        }

        #[test]
        fn test_append_to_missing_file_starts_empty() -> Result<()> {
            let store = setup_store();
            let mut file = MockFile::new("/dir1/filenameY", OpenMode::Append, store.clone());
            file.write("content")?;
            file.close()?;
            assert_eq!(content(&store, "/dir1/filenameY").as_deref(), Some("content"));
            Ok(())
        }

        #[test]
        fn test_append_without_writes_keeps_content() -> Result<()> {
            let store = setup_store();
            let mut file = MockFile::new("/filename1", OpenMode::Append, store.clone());
            file.close()?;
            assert_eq!(
                content(&store, "/filename1").as_deref(),
                Some("content of filename 1")
            );

            let mut file = MockFile::new("/dir1/new", OpenMode::Append, store.clone());
            file.close()?;
            assert_eq!(content(&store, "/dir1/new").as_deref(), Some(""));
            Ok(())
        }
    }

    mod close {
        use super::*;

        #[test]
        fn test_close_twice_is_noop() -> Result<()> {
            let store = setup_store();
            let mut file = MockFile::new("/a", OpenMode::Write, store.clone());
            file.write("1")?;
            file.close()?;
            assert!(file.is_closed());

            store.lock().set("/a", "2".into(), false)?;
            file.close()?;
            assert_eq!(content(&store, "/a").as_deref(), Some("2"));
            Ok(())
        }

        #[test]
        fn test_io_after_close() -> Result<()> {
            let mut file = MockFile::new("/a", OpenMode::Write, setup_store());
            file.close()?;
            assert!(matches!(file.write("x"), Err(FsError::Closed(_))));

            let mut file = MockFile::new("/filename1", OpenMode::Read, setup_store());
            file.close()?;
            assert!(matches!(file.read(), Err(FsError::Closed(_))));
            Ok(())
        }

        #[test]
        fn test_drop_commits() -> Result<()> {
            let store = setup_store();
            {
                let mut file = MockFile::new("/dropped", OpenMode::Write, store.clone());
                file.write("kept")?;
            }
            assert_eq!(content(&store, "/dropped").as_deref(), Some("kept"));
            Ok(())
        }

        #[test]
        fn test_last_close_wins() -> Result<()> {
            let store = setup_store();
            let mut first = MockFile::new("/shared", OpenMode::Write, store.clone());
            let mut second = MockFile::new("/shared", OpenMode::Write, store.clone());
            second.write("second")?;
            first.write("first")?;
            second.close()?;
            first.close()?;
            assert_eq!(content(&store, "/shared").as_deref(), Some("first"));
            Ok(())
        }

        #[test]
        fn test_close_onto_directory_fails() -> Result<()> {
            let store = setup_store();
            let mut file = MockFile::new("/late", OpenMode::Write, store.clone());
            file.write("x")?;
            store.lock().insert_dir("/late")?;
            assert!(matches!(file.close(), Err(FsError::IsADirectory(_))));
            assert!(file.is_closed());
            Ok(())
        }
    }
}
