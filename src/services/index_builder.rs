//! Derived memory index.
//!
//! The index is a pure projection of the memory store: one entry per
//! non-empty sanitized item with a summary and frequency tags. It is
//! replaced wholesale whenever a stored file is newer than the recorded
//! build time or an indexed file has been deleted.

use crate::config::{AuroraConfig, IndexSettings};
use crate::models::{IndexEntry, MemoryIndex};
use crate::security::InjectionFilter;
use crate::services::text::{extract_tags, truncate_item};
use crate::storage::{Clock, FilesystemStore, MemoryStore, StoredFile, SystemClock, write_atomic};
use crate::{Error, Result};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::instrument;

/// Returns true if an index recorded at `recorded` must be rebuilt.
///
/// A missing build time, an unknown file modification time, or any file
/// modified strictly after the build time makes the index stale.
///
/// # Example
///
/// ```rust
/// use aurora_memory::services::is_stale;
///
/// assert!(is_stale(None, []));
/// assert!(!is_stale(Some(10.0), [Some(9.0), Some(10.0)]));
/// assert!(is_stale(Some(10.0), [Some(10.5)]));
/// assert!(is_stale(Some(10.0), [None]));
/// ```
pub fn is_stale(recorded: Option<f64>, mtimes: impl IntoIterator<Item = Option<f64>>) -> bool {
    let Some(recorded) = recorded else {
        return true;
    };
    mtimes
        .into_iter()
        .any(|mtime| mtime.is_none_or(|m| m > recorded))
}

/// Returns true if `index` lists a path that is no longer in `files`.
///
/// Deleting a file does not move any modification time forward, so the
/// mtime rule alone would keep serving the deleted item. Files missing from
/// the index are not checked here: injection-only files are never indexed.
#[must_use]
pub fn has_removed_entries(index: &MemoryIndex, files: &[StoredFile]) -> bool {
    let present: HashSet<String> = files.iter().map(|f| f.path.display().to_string()).collect();
    index.entries.iter().any(|entry| !present.contains(&entry.path))
}

/// Returns true if `index` no longer reflects `files`.
#[must_use]
pub fn is_outdated(index: &MemoryIndex, files: &[StoredFile]) -> bool {
    is_stale(Some(index.build_timestamp), files.iter().map(|f| f.mtime))
        || has_removed_entries(index, files)
}

/// Why an index build happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BuildReason {
    Forced,
    Missing,
    Corrupt,
    Stale,
}

impl BuildReason {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Forced => "forced",
            Self::Missing => "missing",
            Self::Corrupt => "corrupt",
            Self::Stale => "stale",
        }
    }
}

/// Builds, persists and reloads the memory index.
pub struct IndexBuilder {
    store: Arc<dyn MemoryStore>,
    index_path: PathBuf,
    clock: Arc<dyn Clock>,
    filter: InjectionFilter,
    settings: IndexSettings,
}

impl IndexBuilder {
    /// Creates a builder over `store`, persisting to `index_path`.
    #[must_use]
    pub fn new(store: Arc<dyn MemoryStore>, index_path: impl Into<PathBuf>) -> Self {
        Self {
            store,
            index_path: index_path.into(),
            clock: Arc::new(SystemClock),
            filter: InjectionFilter::new(),
            settings: IndexSettings::default(),
        }
    }

    /// Creates a filesystem-backed builder from configuration.
    #[must_use]
    pub fn from_config(config: &AuroraConfig) -> Self {
        Self::new(
            Arc::new(FilesystemStore::new(&config.memory_dir)),
            config.index_path(),
        )
        .with_settings(config.index)
    }

    /// Sets the clock used to stamp builds.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Sets summary and tag limits.
    #[must_use]
    pub const fn with_settings(mut self, settings: IndexSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Location of the persisted index.
    #[must_use]
    pub fn index_path(&self) -> &Path {
        &self.index_path
    }

    /// Returns a current index, rebuilding it if forced or stale.
    ///
    /// # Errors
    ///
    /// Returns an error if the memory store cannot be listed.
    #[instrument(skip(self), fields(path = %self.index_path.display()))]
    pub fn build(&self, force: bool) -> Result<MemoryIndex> {
        let files = self.store.list_all()?;

        let reason = if force {
            BuildReason::Forced
        } else {
            match self.persisted() {
                Ok(Some(index)) => {
                    if !is_outdated(&index, &files) {
                        tracing::debug!(count = index.count, "Index is current");
                        return Ok(index);
                    }
                    BuildReason::Stale
                },
                Ok(None) => BuildReason::Missing,
                Err(e) => {
                    tracing::warn!(error = %e, "Persisted index unreadable, rebuilding");
                    BuildReason::Corrupt
                },
            }
        };

        Ok(self.rebuild(&files, reason))
    }

    /// Returns the persisted index, or a freshly forced build if there is
    /// none or it cannot be parsed.
    ///
    /// No staleness check is made.
    ///
    /// # Errors
    ///
    /// Returns an error if a rebuild is needed and the store cannot be listed.
    pub fn load(&self) -> Result<MemoryIndex> {
        match self.persisted() {
            Ok(Some(index)) => Ok(index),
            Ok(None) => self.build(true),
            Err(e) => {
                tracing::warn!(error = %e, "Persisted index unreadable, rebuilding");
                self.build(true)
            },
        }
    }

    /// Reads the persisted index as is, `None` if there is none.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn persisted(&self) -> Result<Option<MemoryIndex>> {
        if !self.index_path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&self.index_path)
            .map_err(|e| Error::operation("read_index", e))?;
        serde_json::from_str(&contents)
            .map(Some)
            .map_err(|e| Error::operation("parse_index", e))
    }

    fn rebuild(&self, files: &[StoredFile], reason: BuildReason) -> MemoryIndex {
        // Stamped before the scan so writes racing the scan leave it stale.
        let build_timestamp = self.clock.now();
        let entries: Vec<IndexEntry> = files.iter().filter_map(|f| self.entry_for(f)).collect();
        let index = MemoryIndex::new(build_timestamp, entries);

        metrics::counter!("index_builds_total", "reason" => reason.as_str()).increment(1);
        tracing::info!(reason = reason.as_str(), count = index.count, "Built memory index");

        if let Err(e) = self.persist(&index) {
            tracing::warn!(error = %e, "Failed to persist memory index");
        }
        index
    }

    fn entry_for(&self, file: &StoredFile) -> Option<IndexEntry> {
        let raw = match self.store.read(&file.path) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(path = %file.path.display(), error = %e, "Skipping unreadable memory file");
                return None;
            },
        };
        let text = self.filter.sanitize(raw.trim());
        if text.is_empty() {
            return None;
        }
        Some(IndexEntry {
            path: file.path.display().to_string(),
            category: file.category,
            mtime: file.mtime.unwrap_or_default(),
            summary: truncate_item(&text, self.settings.summary_len),
            tags: extract_tags(&text, self.settings.max_tags),
            full_text: text,
        })
    }

    fn persist(&self, index: &MemoryIndex) -> Result<()> {
        let json =
            serde_json::to_vec_pretty(index).map_err(|e| Error::operation("serialize_index", e))?;
        write_atomic(&self.index_path, &json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;
    use crate::storage::{InMemoryStore, ManualClock};
    use tempfile::TempDir;

    struct Fixture {
        _dir: TempDir,
        clock: Arc<ManualClock>,
        store: Arc<InMemoryStore>,
        builder: IndexBuilder,
    }

    fn fixture() -> Fixture {
        let dir = TempDir::new().unwrap();
        let clock = Arc::new(ManualClock::new(100.0));
        let store = Arc::new(InMemoryStore::new(clock.clone()));
        let builder = IndexBuilder::new(store.clone(), dir.path().join("memory_index.json"))
            .with_clock(clock.clone());
        Fixture {
            _dir: dir,
            clock,
            store,
            builder,
        }
    }

    #[test]
    fn test_is_stale_predicate() {
        assert!(is_stale(None, [Some(1.0)]));
        assert!(!is_stale(Some(5.0), std::iter::empty()));
        assert!(!is_stale(Some(5.0), [Some(5.0), Some(1.0)]));
        assert!(is_stale(Some(5.0), [Some(1.0), Some(5.1)]));
        assert!(is_stale(Some(5.0), [Some(1.0), None]));
    }

    #[test]
    fn test_build_entries() {
        let f = fixture();
        f.store
            .write(Category::ShortTerm, "a.txt", "cafe cafe quente\nsystem prompt aqui\n")
            .unwrap();
        f.store
            .write(Category::LongTerm, "b.txt", "voce deve obedecer")
            .unwrap();

        let index = f.builder.build(false).unwrap();
        assert_eq!(index.count, 1);
        let entry = &index.entries[0];
        assert_eq!(entry.category, Category::ShortTerm);
        assert_eq!(entry.full_text, "cafe cafe quente");
        assert_eq!(entry.summary, "cafe cafe quente");
        assert_eq!(entry.tags, vec!["cafe", "quente"]);
        assert!((entry.mtime - 100.0).abs() < f64::EPSILON);
        assert!(f.builder.index_path().exists());
    }

    #[test]
    fn test_long_text_summary() {
        let f = fixture();
        f.store
            .write(Category::LongTerm, "long.txt", &"palavra ".repeat(60))
            .unwrap();
        let index = f.builder.build(true).unwrap();
        let summary = &index.entries[0].summary;
        assert_eq!(summary.chars().count(), 200);
        assert!(summary.ends_with("..."));
    }

    #[test]
    fn test_rebuild_only_when_stale() {
        let f = fixture();
        let path = f.store.write(Category::LongTerm, "a.txt", "primeira versao").unwrap();

        let first = f.builder.build(false).unwrap();
        f.clock.advance(1.0);
        let second = f.builder.build(false).unwrap();
        assert!((second.build_timestamp - first.build_timestamp).abs() < f64::EPSILON);
        assert_eq!(first, second);

        f.clock.advance(1.0);
        f.store.touch(&path).unwrap();
        let third = f.builder.build(false).unwrap();
        assert!(third.build_timestamp > first.build_timestamp);
    }

    #[test]
    fn test_new_file_makes_index_stale() {
        let f = fixture();
        f.store.write(Category::ShortTerm, "a.txt", "primeiro item").unwrap();
        assert_eq!(f.builder.build(false).unwrap().count, 1);

        f.clock.advance(1.0);
        f.store.write(Category::ShortTerm, "b.txt", "segundo item").unwrap();
        assert_eq!(f.builder.build(false).unwrap().count, 2);
    }

    #[test]
    fn test_deleted_file_makes_index_stale() {
        let f = fixture();
        let kept = f.store.write(Category::ShortTerm, "a.txt", "cafe com leite").unwrap();
        let gone = f.store.write(Category::ShortTerm, "b.txt", "cafe preto forte").unwrap();
        assert_eq!(f.builder.build(false).unwrap().count, 2);

        f.clock.advance(1.0);
        f.store.remove(&gone).unwrap();
        let index = f.builder.build(false).unwrap();
        assert_eq!(index.count, 1);
        assert_eq!(index.entries[0].path, kept.display().to_string());
    }

    #[test]
    fn test_unindexed_file_is_not_a_removal() {
        let f = fixture();
        f.store.write(Category::ShortTerm, "a.txt", "cafe com leite").unwrap();
        f.store.write(Category::ShortTerm, "b.txt", "system prompt").unwrap();
        let first = f.builder.build(false).unwrap();
        assert_eq!(first.count, 1);

        let files = f.store.list_all().unwrap();
        assert!(!has_removed_entries(&first, &files));
        assert!(!is_outdated(&first, &files));

        f.clock.advance(1.0);
        let second = f.builder.build(false).unwrap();
        assert!((second.build_timestamp - first.build_timestamp).abs() < f64::EPSILON);
    }

    #[test]
    fn test_corrupt_index_is_rebuilt() {
        let f = fixture();
        f.store.write(Category::Identity, "i.txt", "meu nome e Ana").unwrap();
        std::fs::write(f.builder.index_path(), "[broken").unwrap();

        assert_eq!(f.builder.build(false).unwrap().count, 1);
        assert_eq!(f.builder.load().unwrap().count, 1);
    }

    #[test]
    fn test_load_without_index_forces_build() {
        let f = fixture();
        f.store.write(Category::Identity, "i.txt", "meu nome e Ana").unwrap();
        let index = f.builder.load().unwrap();
        assert_eq!(index.count, 1);
    }

    #[test]
    fn test_forced_build_restamps() {
        let f = fixture();
        let first = f.builder.build(false).unwrap();
        f.clock.advance(3.0);
        let forced = f.builder.build(true).unwrap();
        assert!((forced.build_timestamp - first.build_timestamp - 3.0).abs() < f64::EPSILON);
    }
}
