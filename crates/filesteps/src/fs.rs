//! File-system access used by the steps.
//!
//! Steps only need two capabilities from the host: listing the files of a
//! directory that match a query, and deleting a single file. Keeping them
//! behind [`FileSystem`] lets tests script listings and inject failures.

use std::io;
use std::path::{Path, PathBuf};

use crate::error::{Result, StepError};
use crate::query::FileQuery;

pub trait FileSystem {
    /// Lists regular files directly under `query.path()` whose names match
    /// the query pattern, sorted by path.
    fn list_files(&self, query: &FileQuery) -> Result<Vec<PathBuf>>;

    /// Deletes a single file.
    fn delete_file(&self, path: &Path) -> io::Result<()>;
}

impl<T: FileSystem + ?Sized> FileSystem for &T {
    fn list_files(&self, query: &FileQuery) -> Result<Vec<PathBuf>> {
        (**self).list_files(query)
    }

    fn delete_file(&self, path: &Path) -> io::Result<()> {
        (**self).delete_file(path)
    }
}

/// The host file system.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileSystem;

impl FileSystem for LocalFileSystem {
    fn list_files(&self, query: &FileQuery) -> Result<Vec<PathBuf>> {
        let dir = query.path();
        let list_error = |source| StepError::ListDirectory {
            path: dir.to_path_buf(),
            source,
        };

        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(list_error)? {
            let entry = entry.map_err(list_error)?;
            // Entries removed between readdir and stat are skipped.
            let file_type = match entry.file_type() {
                Ok(file_type) => file_type,
                Err(error) if error.kind() == io::ErrorKind::NotFound => continue,
                Err(error) => return Err(list_error(error)),
            };
            if !is_file(file_type, &entry.path()) {
                continue;
            }
            let name = entry.file_name();
            if query.matches_name(&name.to_string_lossy()) {
                files.push(entry.path());
            }
        }
        files.sort();
        Ok(files)
    }

    fn delete_file(&self, path: &Path) -> io::Result<()> {
        std::fs::remove_file(path)
    }
}

/// Symlinks count when they point at a regular file.
fn is_file(file_type: std::fs::FileType, path: &Path) -> bool {
    if file_type.is_symlink() {
        return std::fs::metadata(path)
            .map(|meta| meta.is_file())
            .unwrap_or(false);
    }
    file_type.is_file()
}
