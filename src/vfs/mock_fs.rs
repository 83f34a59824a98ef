//! This module provides an in-memory file system simulator that reproduces the observable
//! behavior of a real one for the operations in [`FsBackend`].

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::mock_file::MockFile;
use super::node::{Children, Node};
use super::tree::{Lookup, TreeStore};
use crate::core::{DirListing, FileHandle, FsBackend, FsError, Metadata, OpenMode, Result, utils};

/// Scalar settings of a [`MockFS`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FsConfig {
    /// Returned by `cwd()` and used to absolutize relative paths. It does not need to exist.
    pub cwd: String,
    /// Used only for `~` expansion.
    pub user: String,
}

impl Default for FsConfig {
    fn default() -> Self {
        Self {
            cwd: "/".to_string(),
            user: "douglas".to_string(),
        }
    }
}

#[derive(Deserialize)]
struct Fixture {
    #[serde(default)]
    tree: Children,
    #[serde(flatten)]
    config: FsConfig,
}

/// A virtual file system that keeps a tree of directories and files in memory.
///
/// `MockFS` is meant to be handed to code under test instead of the real disk, either
/// directly as a `&dyn FsBackend` or through [`activate`](crate::activate).
///
/// ### Internal state
///
/// * `store` - the tree. The root is always a directory and cannot be removed.
///   Clones of a `MockFS` and every handle opened from it share the same tree, so a test can
///   keep one clone and inspect what the code under test left behind.
/// * `config` - `cwd` and `user`, see [`FsConfig`].
///
/// ### Path semantics
///
/// Paths are split on `/` and empty segments are dropped, so `/a//b`, `a/b` and `/a/b/`
/// all name the same node. Relative paths resolve against the root, not against `cwd`.
/// `.` and `..` are not special.
///
/// ### Thread Safety
///
/// The tree sits behind a single mutex; every operation locks it for its own duration.
///
/// ### Example
///
/// ```
/// use mock_vfs::{FsBackend, MockFS, OpenMode};
/// use serde_json::json;
///
/// let fs = MockFS::from_json(json!({ "etc": { "app.conf": "debug = false" } })).unwrap();
///
/// let mut file = fs.open("/etc/app.conf", OpenMode::Append).unwrap();
/// file.write("\nverbose = true").unwrap();
/// file.close().unwrap();
///
/// assert_eq!(
///     fs.get_content("/etc/app.conf").as_deref(),
///     Some("debug = false\nverbose = true")
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockFS {
    store: Arc<Mutex<TreeStore>>,
    config: FsConfig,
}

impl MockFS {
    /// Creates an empty file system: the root directory only, default config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a file system whose root holds `children`.
    pub fn from_children(children: Children) -> Self {
        Self {
            store: Arc::new(Mutex::new(TreeStore::new(children))),
            config: FsConfig::default(),
        }
    }

    /// Creates a file system from a root node. The root must be a directory.
    pub fn from_node(root: Node) -> Result<Self> {
        match root {
            Node::Directory(children) => Ok(Self::from_children(children)),
            Node::File(_) => Err(FsError::InvalidFixture(
                "the root must be a directory".to_string(),
            )),
        }
    }

    /// Creates a file system from a nested literal: objects are directories,
    /// strings are file content.
    pub fn from_json(tree: serde_json::Value) -> Result<Self> {
        let root: Node =
            serde_json::from_value(tree).map_err(|e| FsError::InvalidFixture(e.to_string()))?;
        Self::from_node(root)
    }

    /// Loads a whole fixture: `{"cwd": .., "user": .., "tree": {..}}`. Every key is optional.
    pub fn from_fixture_json(fixture: &str) -> Result<Self> {
        let fixture: Fixture =
            serde_json::from_str(fixture).map_err(|e| FsError::InvalidFixture(e.to_string()))?;
        Ok(Self::from_children(fixture.tree).with_config(fixture.config))
    }

    pub fn with_config(mut self, config: FsConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_cwd<S: Into<String>>(mut self, cwd: S) -> Self {
        self.config.cwd = cwd.into();
        self
    }

    pub fn with_user<S: Into<String>>(mut self, user: S) -> Self {
        self.config.user = user.into();
        self
    }

    pub fn config(&self) -> &FsConfig {
        &self.config
    }

    /// Returns a copy of the node at `path`, bypassing `open`.
    pub fn get(&self, path: &str) -> Option<Node> {
        self.store.lock().get(path)
    }

    /// Returns the content of the file at `path`; `None` if absent or a directory.
    pub fn get_content(&self, path: &str) -> Option<String> {
        match self.store.lock().lookup(path)? {
            Lookup::File(content) => Some(content.to_string()),
            Lookup::Directory(_) => None,
        }
    }

    /// Seeds a file directly, bypassing `open`.
    /// Missing parent directories are created only when `create_parents` is set.
    pub fn set(&self, path: &str, content: &str, create_parents: bool) -> Result<()> {
        self.store
            .lock()
            .set(path, content.to_string(), create_parents)
    }

    /// Returns a copy of the whole tree.
    pub fn snapshot(&self) -> Node {
        Node::Directory(self.store.lock().root().clone())
    }

    /// Returns the whole tree in the same literal form accepted by [`from_json`](Self::from_json).
    pub fn to_json(&self) -> serde_json::Value {
        let store = self.store.lock();
        serde_json::Value::Object(
            store
                .root()
                .iter()
                .map(|(name, node)| (name.clone(), node_to_json(node)))
                .collect(),
        )
    }

    /// Opens a file and returns the concrete handle.
    /// [`FsBackend::open`] boxes the same value.
    pub fn open_file(&self, path: &str, mode: OpenMode) -> Result<MockFile> {
        let store = self.store.lock();
        match (mode, store.lookup(path)) {
            (OpenMode::Read, Some(Lookup::File(_))) => {}
            (OpenMode::Read, _) => return Err(FsError::FileNotFound(path.to_string())),
            (_, Some(Lookup::Directory(_))) => {
                return Err(FsError::IsADirectory(path.to_string()));
            }
            (_, _) => store.ensure_parent(path)?,
        }
        drop(store);

        debug!(path, %mode, "open");
        Ok(MockFile::new(path, mode, self.store.clone()))
    }
}

fn node_to_json(node: &Node) -> serde_json::Value {
    match node {
        Node::File(content) => serde_json::Value::String(content.clone()),
        Node::Directory(children) => serde_json::Value::Object(
            children
                .iter()
                .map(|(name, child)| (name.clone(), node_to_json(child)))
                .collect(),
        ),
    }
}

impl FsBackend for MockFS {
    fn exists(&self, path: &str) -> bool {
        self.store.lock().contains(path)
    }

    fn is_file(&self, path: &str) -> bool {
        matches!(self.store.lock().lookup(path), Some(Lookup::File(_)))
    }

    fn is_dir(&self, path: &str) -> bool {
        matches!(self.store.lock().lookup(path), Some(Lookup::Directory(_)))
    }

    fn open(&self, path: &str, mode: OpenMode) -> Result<Box<dyn FileHandle>> {
        Ok(Box::new(self.open_file(path, mode)?))
    }

    /// Creates a single directory. Fails with `AlreadyExists` if anything is at `path`, and
    /// with `DirectoryNotFound` if the parent is not a directory. Parents are never created.
    fn mkdir(&self, path: &str) -> Result<()> {
        self.store.lock().insert_dir(path)
    }

    /// Lists the names of the immediate children of a directory, in name order.
    ///
    /// # Returns
    /// * `Err(FsError::FileNotFound)` - nothing at `path`.
    /// * `Err(FsError::NotADirectory)` - `path` is a file.
    ///
    /// The listing is a snapshot taken at the call; list again to see later changes.
    fn ls(&self, path: &str) -> Result<DirListing> {
        let store = self.store.lock();
        match store.lookup(path) {
            Some(Lookup::Directory(children)) => {
                Ok(DirListing::new(children.keys().cloned().collect()))
            }
            Some(Lookup::File(_)) => Err(FsError::NotADirectory(path.to_string())),
            None => Err(FsError::FileNotFound(path.to_string())),
        }
    }

    /// Removes a file. A directory at `path` counts as "no such file".
    fn rm(&self, path: &str) -> Result<()> {
        let mut store = self.store.lock();
        if !matches!(store.lookup(path), Some(Lookup::File(_))) {
            return Err(FsError::FileNotFound(path.to_string()));
        }
        store.remove(path)
    }

    fn cwd(&self) -> String {
        self.config.cwd.clone()
    }

    fn expand_user(&self, path: &str) -> String {
        utils::expand_tilde(path, &format!("/home/{}/", self.config.user))
    }

    fn abs_path(&self, path: &str) -> String {
        if path.starts_with('/') {
            return path.to_string();
        }
        utils::normalize(&utils::join(&self.config.cwd, path))
    }

    /// Always succeeds with zeroed metadata, whether or not `path` exists.
    fn stat(&self, path: &str) -> Result<Metadata> {
        trace!(path, "stat stub");
        Ok(Metadata::default())
    }

    /// Accepted and ignored.
    fn chmod(&self, path: &str, mode: u32) -> Result<()> {
        trace!(path, mode, "chmod stub");
        Ok(())
    }

    fn copy(&self, src: &str, dst: &str) -> Result<()> {
        let mut store = self.store.lock();
        let content = match store.lookup(src) {
            Some(Lookup::File(content)) => content.to_string(),
            _ => return Err(FsError::FileNotFound(src.to_string())),
        };
        debug!(src, dst, "copy");
        store.set(dst, content, false)
    }
}
