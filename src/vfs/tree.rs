//! The in-memory tree behind [`MockFS`](crate::MockFS) and the path resolution over it.
//!
//! The root is held as a bare [`Children`] map, so it is a directory by construction and
//! can never be replaced or removed. Every other node is reachable through exactly one
//! path: the structure is a strict tree.

use tracing::{debug, trace};

use super::node::{Children, Node};
use crate::core::{FsError, Result, utils};

/// Outcome of a successful lookup, borrowed from the tree.
#[derive(Debug, Copy, Clone)]
pub(crate) enum Lookup<'a> {
    Directory(&'a Children),
    File(&'a str),
}

/// Walks `path` from `root`. Returns `None` if any segment is missing or if a file is
/// met before the last segment. Never mutates the tree.
pub(crate) fn resolve<'a>(root: &'a Children, path: &str) -> Option<Lookup<'a>> {
    let mut current = Lookup::Directory(root);
    for part in utils::components(path) {
        let Lookup::Directory(children) = current else {
            return None;
        };
        current = match children.get(part)? {
            Node::Directory(children) => Lookup::Directory(children),
            Node::File(content) => Lookup::File(content),
        };
    }
    Some(current)
}

/// Walks all but the last segment of `path` and returns the directory that should hold
/// the last one, together with its name.
///
/// A missing ancestor is either synthesized as an empty directory (`create_parents`)
/// or reported as [`FsError::DirectoryNotFound`] naming the first missing ancestor.
/// A file in the middle of the path is never replaced.
pub(crate) fn resolve_for_write<'a>(
    root: &'a mut Children,
    path: &str,
    create_parents: bool,
) -> Result<(&'a mut Children, String)> {
    let parts: Vec<&str> = utils::components(path).collect();
    let Some((last, parents)) = parts.split_last() else {
        return Err(FsError::IsADirectory("/".to_string()));
    };

    let mut dir = root;
    let mut walked = String::new();
    for &part in parents {
        walked.push('/');
        walked.push_str(part);

        if !dir.contains_key(part) {
            if !create_parents {
                return Err(FsError::DirectoryNotFound(walked));
            }
            debug!(path = %walked, "creating missing parent directory");
            dir.insert(part.to_string(), Node::dir());
        }

        dir = match dir.get_mut(part) {
            Some(Node::Directory(children)) => children,
            _ if create_parents => return Err(FsError::NotADirectory(walked)),
            _ => return Err(FsError::DirectoryNotFound(walked)),
        };
    }

    Ok((dir, last.to_string()))
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct TreeStore {
    root: Children,
}

impl TreeStore {
    pub(crate) fn new(root: Children) -> Self {
        Self { root }
    }

    pub(crate) fn root(&self) -> &Children {
        &self.root
    }

    pub(crate) fn lookup(&self, path: &str) -> Option<Lookup<'_>> {
        let found = resolve(&self.root, path);
        trace!(path, found = found.is_some(), "lookup");
        found
    }

    pub(crate) fn contains(&self, path: &str) -> bool {
        self.lookup(path).is_some()
    }

    /// Returns a copy of the node at `path`, or `None` if absent.
    pub(crate) fn get(&self, path: &str) -> Option<Node> {
        match self.lookup(path)? {
            Lookup::Directory(children) => Some(Node::Directory(children.clone())),
            Lookup::File(content) => Some(Node::file(content)),
        }
    }

    /// Checks that every ancestor of `path` is an existing directory, without touching
    /// the tree. The error names the first missing ancestor.
    pub(crate) fn ensure_parent(&self, path: &str) -> Result<()> {
        let parts: Vec<&str> = utils::components(path).collect();
        let parents = parts.len().saturating_sub(1);

        let mut dir = &self.root;
        let mut walked = String::new();
        for &part in &parts[..parents] {
            walked.push('/');
            walked.push_str(part);
            match dir.get(part) {
                Some(Node::Directory(children)) => dir = children,
                _ => return Err(FsError::DirectoryNotFound(walked)),
            }
        }
        Ok(())
    }

    /// Installs `content` as a file at `path`, replacing any previous file there.
    pub(crate) fn set(&mut self, path: &str, content: String, create_parents: bool) -> Result<()> {
        let (dir, name) = resolve_for_write(&mut self.root, path, create_parents)?;
        if let Some(Node::Directory(_)) = dir.get(&name) {
            return Err(FsError::IsADirectory(path.to_string()));
        }
        debug!(path, len = content.len(), "set file content");
        dir.insert(name, Node::File(content));
        Ok(())
    }

    /// Deletes the file at `path`. Directories are refused.
    pub(crate) fn remove(&mut self, path: &str) -> Result<()> {
        if utils::is_virtual_root(path) {
            return Err(FsError::IsADirectory("/".to_string()));
        }
        match self.lookup(path) {
            None => return Err(FsError::FileNotFound(path.to_string())),
            Some(Lookup::Directory(_)) => return Err(FsError::IsADirectory(path.to_string())),
            Some(Lookup::File(_)) => {}
        }
        let (dir, name) = resolve_for_write(&mut self.root, path, false)?;
        dir.remove(&name);
        debug!(path, "removed file");
        Ok(())
    }

    /// Installs an empty directory at `path`. The immediate parent must be a directory.
    pub(crate) fn insert_dir(&mut self, path: &str) -> Result<()> {
        if self.contains(path) {
            return Err(FsError::AlreadyExists(path.to_string()));
        }
        self.ensure_parent(path)?;
        let (dir, name) = resolve_for_write(&mut self.root, path, false)?;
        dir.insert(name, Node::dir());
        debug!(path, "created directory");
        Ok(())
    }
}
