//! Status command support.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use super::build_ollama_client;
use crate::config::{AuroraConfig, ContextMode};
use crate::llm::OllamaClient;
use crate::models::Category;
use crate::services::{DedupStore, IndexBuilder, is_outdated};
use crate::storage::MemoryStore;
use crate::Result;

/// State of the persisted memory index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexStatus {
    /// No index file has been written yet.
    Missing,
    /// The index file exists but cannot be parsed.
    Corrupt,
    /// The index is newer than every memory file.
    Current {
        /// Number of indexed entries.
        entries: usize,
    },
    /// Some memory file changed after the index was built.
    Stale {
        /// Number of indexed entries.
        entries: usize,
    },
}

/// Snapshot of the memory root.
#[derive(Debug, Clone)]
pub struct StatusReport {
    /// Memory root directory.
    pub memory_dir: PathBuf,
    /// Raw dump directory.
    pub data_dir: PathBuf,
    /// Configured context mode.
    pub mode: ContextMode,
    /// Model name when a generation backend is enabled.
    pub backend_model: Option<String>,
    /// Whether the enabled backend answered, `None` when disabled.
    pub backend_reachable: Option<bool>,
    /// Stored item count per category.
    pub counts: BTreeMap<Category, usize>,
    /// Index state.
    pub index: IndexStatus,
    /// Known hashes in the dedup table, `None` if the table is absent.
    pub dedup_entries: Option<usize>,
    /// Categories with a cached digest on disk.
    pub canonical_cached: Vec<Category>,
}

impl StatusReport {
    /// Total stored items across categories.
    #[must_use]
    pub fn total_items(&self) -> usize {
        self.counts.values().sum()
    }
}

/// Collects a status snapshot without rebuilding any derived file.
///
/// # Errors
///
/// Returns an error if the memory store cannot be listed.
pub fn collect_status(config: &AuroraConfig, store: Arc<dyn MemoryStore>) -> Result<StatusReport> {
    let files = store.list_all()?;
    let mut counts: BTreeMap<Category, usize> =
        Category::all().iter().map(|&c| (c, 0)).collect();
    for file in &files {
        *counts.entry(file.category).or_default() += 1;
    }

    let builder = IndexBuilder::new(Arc::clone(&store), config.index_path());
    let index = match builder.persisted() {
        Ok(None) => IndexStatus::Missing,
        Err(_) => IndexStatus::Corrupt,
        Ok(Some(index)) => {
            if is_outdated(&index, &files) {
                IndexStatus::Stale {
                    entries: index.count,
                }
            } else {
                IndexStatus::Current {
                    entries: index.count,
                }
            }
        },
    };

    let dedup_path = config.dedup_path();
    let dedup_entries = if dedup_path.exists() {
        DedupStore::load(&dedup_path, store.as_ref())
            .ok()
            .map(|table| table.len())
    } else {
        None
    };

    let canonical_cached = Category::all()
        .iter()
        .copied()
        .filter(|&c| config.canonical_path(c).is_file())
        .collect();

    let backend = config
        .features
        .uses_backend()
        .then(|| build_ollama_client(&config.llm));
    let backend_model = backend.as_ref().map(|client| client.model().to_string());
    let backend_reachable = backend.as_ref().map(OllamaClient::is_available);

    Ok(StatusReport {
        memory_dir: config.memory_dir.clone(),
        data_dir: config.data_dir.clone(),
        mode: config.mode,
        backend_model,
        backend_reachable,
        counts,
        index,
        dedup_entries,
        canonical_cached,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FeatureFlags;
    use crate::storage::FilesystemStore;
    use tempfile::TempDir;

    fn config_in(dir: &TempDir) -> AuroraConfig {
        AuroraConfig::new()
            .with_memory_dir(dir.path().join("memory"))
            .with_data_dir(dir.path().join("data"))
            .with_features(FeatureFlags::none())
    }

    #[test]
    fn test_empty_memory_root() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);
        let store: Arc<dyn MemoryStore> = Arc::new(FilesystemStore::new(&config.memory_dir));

        let report = collect_status(&config, store).unwrap();
        assert_eq!(report.total_items(), 0);
        assert_eq!(report.index, IndexStatus::Missing);
        assert_eq!(report.dedup_entries, None);
        assert!(report.canonical_cached.is_empty());
        assert!(report.backend_model.is_none());
        assert!(report.backend_reachable.is_none());
        assert_eq!(report.counts.len(), Category::all().len());
    }

    #[test]
    fn test_counts_and_index_state() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);
        let store: Arc<dyn MemoryStore> = Arc::new(FilesystemStore::new(&config.memory_dir));
        store
            .write(Category::LongTerm, "a.txt", "eu gosto de cafe")
            .unwrap();
        store
            .write(Category::ShortTerm, "b.txt", "hoje choveu bastante")
            .unwrap();

        IndexBuilder::new(Arc::clone(&store), config.index_path())
            .build(true)
            .unwrap();

        let report = collect_status(&config, store).unwrap();
        assert_eq!(report.total_items(), 2);
        assert_eq!(report.counts[&Category::LongTerm], 1);
        assert_eq!(report.index, IndexStatus::Current { entries: 2 });
    }

    #[test]
    fn test_corrupt_index_is_reported() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);
        std::fs::create_dir_all(&config.memory_dir).unwrap();
        std::fs::write(config.index_path(), "{not json").unwrap();
        let store: Arc<dyn MemoryStore> = Arc::new(FilesystemStore::new(&config.memory_dir));

        let report = collect_status(&config, store).unwrap();
        assert_eq!(report.index, IndexStatus::Corrupt);
    }
}
