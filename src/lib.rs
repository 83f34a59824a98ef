//! An in-memory, POSIX-like file system simulator for testing code that touches files.
//!
//! ### Overview
//!
//! `mock-vfs` lets tests run file-dependent code against a tree of directories and files
//! described as a nested literal, then inspect the resulting tree, without touching the disk.
//! It defines the `FsBackend` trait with two implementations: `MockFS`, which keeps the tree
//! in memory, and `HostFS`, which forwards to the real file system.
//!
//! **Key ideas**:
//! - **Fixtures**: Describe a tree with `serde_json::json!` or a JSON document; objects are
//!   directories, strings are file content.
//! - **Faithful errors**: Missing files, missing parent directories and existing directories
//!   are reported with the same kinds a real file system would use.
//! - **Buffered handles**: Writes land in the tree when a handle is closed or dropped.
//! - **Scoped activation**: `activate` reroutes the functions in [`ambient`] to a `MockFS`
//!   for the lifetime of a guard, and restores the previous provider on every exit path.
//!
//! ```
//! use mock_vfs::{FsBackend, MockFS};
//! use serde_json::json;
//!
//! let fs = MockFS::from_json(json!({ "etc": { "app1.json": r#"{"verbose": true}"# } })).unwrap();
//! fs.write("/etc/app2.json", "{}").unwrap();
//!
//! assert_eq!(fs.read_to_string("/etc/app1.json").unwrap(), r#"{"verbose": true}"#);
//! assert_eq!(fs.ls("/etc").unwrap().collect::<Vec<_>>(), ["app1.json", "app2.json"]);
//! ```

pub mod ambient;
mod core;
mod scope;
mod vfs;

pub use crate::core::{
    DirListing, FileHandle, FsBackend, FsError, Metadata, OpenMode, Result, utils, with_file,
};
pub use crate::scope::{ActiveScope, activate, current, is_active, with_fs};
pub use crate::vfs::{Children, EntryType, FsConfig, HostFS, HostFile, MockFS, MockFile, Node};
