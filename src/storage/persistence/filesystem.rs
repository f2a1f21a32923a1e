//! Filesystem-based memory store.
//!
//! Stores each memory item as a plain `.txt` file under
//! `<root>/<category>/`.
//!
//! # Security
//!
//! - **Path traversal**: file names are validated before any write
//! - **File size limits**: oversized files are refused on read

use crate::models::Category;
use crate::storage::traits::{MAX_NAME_ATTEMPTS, MemoryStore, StoredFile, alternate_name};
use crate::{Error, Result};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

/// Maximum size of a memory file (1MB).
const MAX_FILE_SIZE: u64 = 1024 * 1024;

/// Extension of memory item files.
const MEMORY_EXTENSION: &str = "txt";

/// Filesystem-based memory store.
#[derive(Debug, Clone)]
pub struct FilesystemStore {
    /// Memory root directory.
    base_path: PathBuf,
}

impl FilesystemStore {
    /// Creates a store rooted at `base_path`.
    ///
    /// Directories are created lazily on first write.
    #[must_use]
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Creates a store and its root directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn with_create(base_path: impl Into<PathBuf>) -> Result<Self> {
        let base_path = base_path.into();
        fs::create_dir_all(&base_path).map_err(|e| Error::operation("create_memory_dir", e))?;
        Ok(Self { base_path })
    }

    /// Returns the memory root.
    #[must_use]
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Returns the directory of a category.
    #[must_use]
    pub fn category_dir(&self, category: Category) -> PathBuf {
        self.base_path.join(category.as_str())
    }

    /// Checks if a file name is safe (no path traversal).
    fn is_safe_filename(name: &str) -> bool {
        !name.is_empty()
            && name.len() <= 255
            && name != "."
            && name != ".."
            && !name.starts_with('.')
            && !name
                .chars()
                .any(|c| c.is_control() || matches!(c, '/' | '\\' | ':'))
    }

    /// Creates the first free name for `file_name` under `dir`.
    ///
    /// `create_new` makes the existence check and the create one step, so an
    /// existing item is never truncated.
    fn create_new_in(dir: &Path, file_name: &str) -> Result<(PathBuf, File)> {
        for attempt in 0..MAX_NAME_ATTEMPTS {
            let path = dir.join(alternate_name(file_name, attempt));
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => {
                    if attempt > 0 {
                        tracing::debug!(requested = file_name, path = %path.display(), "Memory file name taken, using alternate");
                    }
                    return Ok((path, file));
                },
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {},
                Err(e) => {
                    return Err(Error::operation(
                        "write_memory_file",
                        format!("{}: {e}", path.display()),
                    ));
                },
            }
        }
        Err(Error::operation(
            "write_memory_file",
            format!("no free name for {file_name} in {}", dir.display()),
        ))
    }

    fn mtime_of(path: &Path) -> Option<f64> {
        fs::metadata(path)
            .and_then(|m| m.modified())
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_secs_f64())
    }
}

impl MemoryStore for FilesystemStore {
    fn list(&self, category: Category) -> Result<Vec<StoredFile>> {
        let dir = self.category_dir(category);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(&dir).map_err(|e| {
            Error::operation("list_memory_dir", format!("{}: {e}", dir.display()))
        })?;

        let mut files: Vec<StoredFile> = entries
            .filter_map(std::result::Result::ok)
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file()
                    && path
                        .extension()
                        .is_some_and(|ext| ext.eq_ignore_ascii_case(MEMORY_EXTENSION))
            })
            .map(|path| StoredFile {
                mtime: Self::mtime_of(&path),
                path,
                category,
            })
            .collect();
        files.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(files)
    }

    fn read(&self, path: &Path) -> Result<String> {
        let metadata = fs::metadata(path).map_err(|e| {
            Error::operation("read_file_metadata", format!("{}: {e}", path.display()))
        })?;

        if metadata.len() > MAX_FILE_SIZE {
            return Err(Error::InvalidInput(format!(
                "Memory file exceeds maximum size of {MAX_FILE_SIZE} bytes: {}",
                path.display()
            )));
        }

        fs::read_to_string(path)
            .map_err(|e| Error::operation("read_memory_file", format!("{}: {e}", path.display())))
    }

    fn write(&self, category: Category, file_name: &str, content: &str) -> Result<PathBuf> {
        if !Self::is_safe_filename(file_name) {
            return Err(Error::InvalidInput(format!(
                "Memory file name contains invalid characters: {file_name}"
            )));
        }

        let dir = self.category_dir(category);
        fs::create_dir_all(&dir).map_err(|e| Error::operation("create_category_dir", e))?;

        let (path, mut file) = Self::create_new_in(&dir, file_name)?;
        file.write_all(content.as_bytes())
            .and_then(|()| file.sync_all())
            .map_err(|e| Error::operation("write_memory_file", format!("{}: {e}", path.display())))?;

        tracing::debug!(path = %path.display(), category = %category, "Stored memory file");
        Ok(path)
    }
}
