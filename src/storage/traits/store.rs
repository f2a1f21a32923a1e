//! Memory store trait.

use crate::Result;
use crate::models::Category;
use std::cmp::Ordering;
use std::path::{Path, PathBuf};

/// A memory file as seen by a directory scan.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredFile {
    /// Location of the file.
    pub path: PathBuf,
    /// Category directory the file lives in.
    pub category: Category,
    /// Modification time in seconds since epoch, `None` if unreadable.
    pub mtime: Option<f64>,
}

impl StoredFile {
    /// Returns the file name component of the path.
    #[must_use]
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map_or_else(String::new, |n| n.to_string_lossy().into_owned())
    }
}

/// Upper bound on alternate names tried for one write.
pub const MAX_NAME_ATTEMPTS: usize = 1000;

/// Returns the name tried on `attempt` when writing `file_name`.
///
/// Attempt 0 is the name itself; attempt `n` inserts `_{n + 1}` before the
/// extension.
///
/// # Example
///
/// ```rust
/// use aurora_memory::storage::alternate_name;
///
/// assert_eq!(alternate_name("short_term_chat_part1.txt", 0), "short_term_chat_part1.txt");
/// assert_eq!(alternate_name("short_term_chat_part1.txt", 1), "short_term_chat_part1_2.txt");
/// assert_eq!(alternate_name("raw", 2), "raw_3");
/// ```
#[must_use]
pub fn alternate_name(file_name: &str, attempt: usize) -> String {
    if attempt == 0 {
        return file_name.to_string();
    }
    let suffix = attempt + 1;
    match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{stem}_{suffix}.{ext}"),
        _ => format!("{file_name}_{suffix}"),
    }
}

/// Trait for memory store backends.
///
/// The store is the authoritative source of truth for memory items. Index,
/// dedup table and canonical digests are all derived from it.
pub trait MemoryStore: Send + Sync {
    /// Lists the memory files of a category.
    ///
    /// A category with no directory yields an empty list.
    fn list(&self, category: Category) -> Result<Vec<StoredFile>>;

    /// Reads a memory file.
    fn read(&self, path: &Path) -> Result<String>;

    /// Writes a new memory file.
    ///
    /// Stored items are immutable: an existing file is never replaced. When
    /// `file_name` is taken, the first free name from [`alternate_name`] is
    /// used instead. Returns the path written.
    fn write(&self, category: Category, file_name: &str, content: &str) -> Result<PathBuf>;

    /// Lists the memory files of every category, in category order.
    fn list_all(&self) -> Result<Vec<StoredFile>> {
        let mut files = Vec::new();
        for category in Category::all() {
            files.extend(self.list(*category)?);
        }
        Ok(files)
    }

    /// Lists a category's files most recently modified first.
    ///
    /// Files with unknown modification time sort last.
    fn list_recent(&self, category: Category, limit: Option<usize>) -> Result<Vec<StoredFile>> {
        let mut files = self.list(category)?;
        files.sort_by(|a, b| match (a.mtime, b.mtime) {
            (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        });
        if let Some(limit) = limit {
            files.truncate(limit);
        }
        Ok(files)
    }
}
