//! File system primitives for code that does not take a backend as a parameter.
//!
//! Every function forwards to [`scope::current`](crate::scope::current): the
//! [`MockFS`](crate::MockFS) installed by [`activate`](crate::activate) on this thread, or
//! the host file system otherwise.

use crate::core::{DirListing, FileHandle, Metadata, OpenMode, Result, with_file};
use crate::scope::current;

pub fn open(path: &str, mode: OpenMode) -> Result<Box<dyn FileHandle>> {
    current().open(path, mode)
}

/// Opens `path`, runs `f` with the handle and always closes it.
pub fn with_open<T, F>(path: &str, mode: OpenMode, f: F) -> Result<T>
where
    F: FnOnce(&mut dyn FileHandle) -> Result<T>,
{
    with_file(open(path, mode)?, f)
}

pub fn exists(path: &str) -> bool {
    current().exists(path)
}

pub fn is_file(path: &str) -> bool {
    current().is_file(path)
}

pub fn is_dir(path: &str) -> bool {
    current().is_dir(path)
}

pub fn mkdir(path: &str) -> Result<()> {
    current().mkdir(path)
}

pub fn ls(path: &str) -> Result<DirListing> {
    current().ls(path)
}

pub fn rm(path: &str) -> Result<()> {
    current().rm(path)
}

pub fn cwd() -> String {
    current().cwd()
}

pub fn expand_user(path: &str) -> String {
    current().expand_user(path)
}

pub fn abs_path(path: &str) -> String {
    current().abs_path(path)
}

pub fn stat(path: &str) -> Result<Metadata> {
    current().stat(path)
}

pub fn chmod(path: &str, mode: u32) -> Result<()> {
    current().chmod(path, mode)
}

pub fn copy(src: &str, dst: &str) -> Result<()> {
    current().copy(src, dst)
}

pub fn read_to_string(path: &str) -> Result<String> {
    current().read_to_string(path)
}

pub fn write(path: &str, content: &str) -> Result<()> {
    current().write(path, content)
}
