//! In-memory memory store.

use crate::models::Category;
use crate::storage::clock::Clock;
use crate::storage::traits::{MAX_NAME_ATTEMPTS, MemoryStore, StoredFile, alternate_name};
use crate::{Error, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
struct StoredText {
    category: Category,
    content: String,
    mtime: f64,
}

/// Volatile memory store.
///
/// Modification times come from the injected clock, so staleness logic can
/// be exercised without touching real file timestamps.
pub struct InMemoryStore {
    files: Mutex<BTreeMap<PathBuf, StoredText>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryStore {
    /// Creates an empty store driven by `clock`.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            files: Mutex::new(BTreeMap::new()),
            clock,
        }
    }

    /// Sets the modification time of an existing file.
    pub fn touch(&self, path: &Path) -> Result<()> {
        let now = self.clock.now();
        let mut files = self.lock()?;
        let file = files
            .get_mut(path)
            .ok_or_else(|| Error::InvalidInput(format!("no such file: {}", path.display())))?;
        file.mtime = now;
        Ok(())
    }

    /// Deletes a stored file, as an operator would by hand.
    pub fn remove(&self, path: &Path) -> Result<()> {
        self.lock()?
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| Error::InvalidInput(format!("no such file: {}", path.display())))
    }

    /// Returns the number of stored files.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.lock().map_or(0, |f| f.len())
    }

    /// Returns true if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<PathBuf, StoredText>>> {
        self.files
            .lock()
            .map_err(|e| Error::operation("lock_memory_store", e))
    }
}

impl MemoryStore for InMemoryStore {
    fn list(&self, category: Category) -> Result<Vec<StoredFile>> {
        Ok(self
            .lock()?
            .iter()
            .filter(|(_, f)| f.category == category)
            .map(|(path, f)| StoredFile {
                path: path.clone(),
                category,
                mtime: Some(f.mtime),
            })
            .collect())
    }

    fn read(&self, path: &Path) -> Result<String> {
        self.lock()?
            .get(path)
            .map(|f| f.content.clone())
            .ok_or_else(|| {
                Error::operation("read_memory_file", format!("{}: not found", path.display()))
            })
    }

    fn write(&self, category: Category, file_name: &str, content: &str) -> Result<PathBuf> {
        let mtime = self.clock.now();
        let mut files = self.lock()?;
        let path = (0..MAX_NAME_ATTEMPTS)
            .map(|attempt| PathBuf::from(category.as_str()).join(alternate_name(file_name, attempt)))
            .find(|candidate| !files.contains_key(candidate))
            .ok_or_else(|| {
                Error::operation("write_memory_file", format!("no free name for {file_name}"))
            })?;
        files.insert(
            path.clone(),
            StoredText {
                category,
                content: content.to_string(),
                mtime,
            },
        );
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::ManualClock;

    #[test]
    fn test_mtime_follows_clock() {
        let clock = Arc::new(ManualClock::new(100.0));
        let store = InMemoryStore::new(clock.clone());

        let path = store.write(Category::ShortTerm, "a.txt", "hello").unwrap();
        clock.advance(5.0);
        store.touch(&path).unwrap();

        let files = store.list(Category::ShortTerm).unwrap();
        assert_eq!(files[0].mtime, Some(105.0));
        assert_eq!(store.read(&path).unwrap(), "hello");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_write_keeps_existing_item() {
        let store = InMemoryStore::new(Arc::new(ManualClock::new(1.0)));
        let first = store.write(Category::LongTerm, "a.txt", "um").unwrap();
        let second = store.write(Category::LongTerm, "a.txt", "dois").unwrap();

        assert_eq!(second, PathBuf::from("long_term").join("a_2.txt"));
        assert_eq!(store.read(&first).unwrap(), "um");
        assert_eq!(store.read(&second).unwrap(), "dois");

        store.remove(&first).unwrap();
        assert!(store.remove(&first).is_err());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_list_recent_orders_by_mtime() {
        let clock = Arc::new(ManualClock::new(1.0));
        let store = InMemoryStore::new(clock.clone());
        store.write(Category::LongTerm, "old.txt", "old").unwrap();
        clock.advance(1.0);
        store.write(Category::LongTerm, "new.txt", "new").unwrap();

        let recent = store.list_recent(Category::LongTerm, Some(1)).unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].file_name(), "new.txt");
    }
}
