//! Patch directory
//!
//! Series entries name patch files relative to a prefix directory (by default
//! the directory holding the series file). Patch files are treated as bytes:
//! they may contain non-UTF-8 diff hunks that must survive a rewrite untouched.

use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct Workspace {
    path: Box<Path>,
}

impl Workspace {
    pub fn new(path: Box<Path>) -> Self {
        Workspace { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn patch_path(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }

    pub fn exists(&self, name: &str) -> bool {
        self.patch_path(name).is_file()
    }

    pub fn read_file(&self, name: &str) -> std::io::Result<Vec<u8>> {
        std::fs::read(self.patch_path(name))
    }

    /// Replace a file's content without ever leaving it half written
    ///
    /// The content goes to a temporary sibling first and is renamed over the
    /// original, so readers see either the old or the new file. The original
    /// permissions are kept.
    pub fn write_file(&self, name: &str, content: &[u8]) -> std::io::Result<()> {
        write_atomic(&self.patch_path(name), content)
    }
}

/// Atomically replace `path` with `content` via a temporary sibling and a rename
pub fn write_atomic(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let (Some(dir), Some(file_name)) = (path.parent(), path.file_name()) else {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("invalid file path {}", path.display()),
        ));
    };
    let temp_path = dir.join(format!(
        ".{}.tmp-{}",
        file_name.to_string_lossy(),
        std::process::id()
    ));

    let permissions = std::fs::metadata(path).ok().map(|meta| meta.permissions());

    let result = (|| -> std::io::Result<()> {
        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)?;
        file.write_all(content)?;
        file.sync_all()?;

        if let Some(permissions) = permissions {
            std::fs::set_permissions(&temp_path, permissions)?;
        }

        std::fs::rename(&temp_path, path)
    })();

    if result.is_err() {
        let _ = std::fs::remove_file(&temp_path);
    }

    result
}
