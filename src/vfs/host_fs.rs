//! This module provides the [`FsBackend`] implementation over the host file system.
//!
//! `HostFS` is the default provider behind the [`ambient`](crate::ambient) functions when no
//! [`MockFS`](crate::MockFS) is active. It keeps the same error taxonomy as the in-memory
//! backend: code that handles `FsError::FileNotFound` from a mock sees the same variant from
//! the disk.

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::Path;

use tracing::{debug, warn};

use crate::core::{DirListing, FileHandle, FsBackend, FsError, Metadata, OpenMode, Result, utils};

/// The real file system. Paths are host paths.
#[derive(Debug, Copy, Clone, Default)]
pub struct HostFS;

impl HostFS {
    pub fn new() -> Self {
        Self
    }

    /// Checks that the parent of `path` is an existing directory.
    fn ensure_parent(path: &str) -> Result<()> {
        match Path::new(path).parent() {
            Some(parent) if !parent.as_os_str().is_empty() && !parent.is_dir() => Err(
                FsError::DirectoryNotFound(parent.to_string_lossy().into_owned()),
            ),
            _ => Ok(()),
        }
    }
}

/// A handle over a host file. Writes go straight to the OS; `close` flushes.
#[derive(Debug)]
pub struct HostFile {
    path: String,
    mode: OpenMode,
    file: Option<File>,
}

impl FileHandle for HostFile {
    fn path(&self) -> &str {
        &self.path
    }

    fn mode(&self) -> OpenMode {
        self.mode
    }

    fn read(&mut self) -> Result<String> {
        let Some(file) = self.file.as_mut() else {
            return Err(FsError::Closed(self.path.clone()));
        };
        if !self.mode.is_readable() {
            return Err(FsError::Unsupported("not readable"));
        }
        let mut content = String::new();
        file.read_to_string(&mut content)
            .map_err(|e| FsError::from_io(e, &self.path))?;
        Ok(content)
    }

    fn write(&mut self, chunk: &str) -> Result<usize> {
        let Some(file) = self.file.as_mut() else {
            return Err(FsError::Closed(self.path.clone()));
        };
        if !self.mode.is_writable() {
            return Err(FsError::Unsupported("not writable"));
        }
        file.write_all(chunk.as_bytes())
            .map_err(|e| FsError::from_io(e, &self.path))?;
        Ok(chunk.len())
    }

    fn close(&mut self) -> Result<()> {
        let Some(mut file) = self.file.take() else {
            return Ok(());
        };
        if self.mode.is_writable() {
            file.flush().map_err(|e| FsError::from_io(e, &self.path))?;
        }
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.file.is_none()
    }
}

impl Drop for HostFile {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            warn!(path = %self.path, error = %err, "failed to flush file on drop");
        }
    }
}

impl FsBackend for HostFS {
    fn exists(&self, path: &str) -> bool {
        Path::new(path).exists()
    }

    fn is_file(&self, path: &str) -> bool {
        Path::new(path).is_file()
    }

    fn is_dir(&self, path: &str) -> bool {
        Path::new(path).is_dir()
    }

    fn open(&self, path: &str, mode: OpenMode) -> Result<Box<dyn FileHandle>> {
        let file = match mode {
            OpenMode::Read => {
                if self.is_dir(path) {
                    return Err(FsError::FileNotFound(path.to_string()));
                }
                File::open(path)
            }
            OpenMode::Write | OpenMode::Append => {
                if self.is_dir(path) {
                    return Err(FsError::IsADirectory(path.to_string()));
                }
                Self::ensure_parent(path)?;
                let mut options = OpenOptions::new();
                options.create(true);
                if mode == OpenMode::Write {
                    options.write(true).truncate(true);
                } else {
                    options.append(true);
                }
                options.open(path)
            }
        }
        .map_err(|e| FsError::from_io(e, path))?;

        debug!(path, %mode, "open host file");
        Ok(Box::new(HostFile {
            path: path.to_string(),
            mode,
            file: Some(file),
        }))
    }

    fn mkdir(&self, path: &str) -> Result<()> {
        if self.exists(path) {
            return Err(FsError::AlreadyExists(path.to_string()));
        }
        Self::ensure_parent(path)?;
        fs::create_dir(path).map_err(|e| FsError::from_io(e, path))?;
        debug!(path, "created host directory");
        Ok(())
    }

    fn ls(&self, path: &str) -> Result<DirListing> {
        if !self.exists(path) {
            return Err(FsError::FileNotFound(path.to_string()));
        }
        if !self.is_dir(path) {
            return Err(FsError::NotADirectory(path.to_string()));
        }
        let mut names = Vec::new();
        for entry in fs::read_dir(path).map_err(|e| FsError::from_io(e, path))? {
            let entry = entry.map_err(|e| FsError::from_io(e, path))?;
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        Ok(DirListing::new(names))
    }

    fn rm(&self, path: &str) -> Result<()> {
        if !self.is_file(path) {
            return Err(FsError::FileNotFound(path.to_string()));
        }
        fs::remove_file(path).map_err(|e| FsError::from_io(e, path))?;
        debug!(path, "removed host file");
        Ok(())
    }

    fn cwd(&self) -> String {
        match std::env::current_dir() {
            Ok(dir) => dir.to_string_lossy().into_owned(),
            Err(err) => {
                warn!(error = %err, "current directory is not accessible, using /");
                "/".to_string()
            }
        }
    }

    fn expand_user(&self, path: &str) -> String {
        match dirs::home_dir() {
            Some(home) => utils::expand_tilde(path, &home.to_string_lossy()),
            None => utils::normalize(path),
        }
    }

    fn abs_path(&self, path: &str) -> String {
        if path.starts_with('/') {
            return path.to_string();
        }
        utils::normalize(&utils::join(&self.cwd(), path))
    }

    fn stat(&self, path: &str) -> Result<Metadata> {
        let meta = fs::metadata(path).map_err(|e| FsError::from_io(e, path))?;

        #[cfg(unix)]
        let metadata = {
            use std::os::unix::fs::MetadataExt;
            Metadata {
                mode: meta.mode(),
                size: meta.size(),
                uid: meta.uid(),
                gid: meta.gid(),
                atime: meta.atime(),
                mtime: meta.mtime(),
                ctime: meta.ctime(),
            }
        };

        #[cfg(not(unix))]
        let metadata = Metadata {
            size: meta.len(),
            ..Metadata::default()
        };

        Ok(metadata)
    }

    fn chmod(&self, path: &str, mode: u32) -> Result<()> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(path, fs::Permissions::from_mode(mode))
                .map_err(|e| FsError::from_io(e, path))?;
            debug!(path, mode, "changed host permissions");
        }

        #[cfg(not(unix))]
        debug!(path, mode, "chmod ignored on this platform");

        Ok(())
    }

    fn copy(&self, src: &str, dst: &str) -> Result<()> {
        if !self.is_file(src) {
            return Err(FsError::FileNotFound(src.to_string()));
        }
        if self.is_dir(dst) {
            return Err(FsError::IsADirectory(dst.to_string()));
        }
        Self::ensure_parent(dst)?;
        fs::copy(src, dst).map_err(|e| FsError::from_io(e, dst))?;
        debug!(src, dst, "copied host file");
        Ok(())
    }
}
