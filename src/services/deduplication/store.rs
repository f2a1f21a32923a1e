//! Persisted hash to provenance table.

use super::ContentHasher;
use crate::models::{Category, DuplicateOf};
use crate::storage::{MemoryStore, write_atomic};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::instrument;

/// On-disk layout: `{"entries": {"<hash>": {"file": ..., "type": ...}}}`.
#[derive(Debug, Default, Serialize, Deserialize)]
struct DedupFile {
    #[serde(default)]
    entries: BTreeMap<String, DuplicateOf>,
}

/// Membership table of stored content hashes.
///
/// Mutations stay in memory until [`DedupStore::save`], which replaces the
/// whole file atomically. An interrupted run loses only the entries added
/// since the last save.
#[derive(Debug)]
pub struct DedupStore {
    path: PathBuf,
    entries: BTreeMap<String, DuplicateOf>,
}

impl DedupStore {
    /// Creates an empty table persisted at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: BTreeMap::new(),
        }
    }

    /// Loads the table from `path`, bootstrapping from `store` when the file
    /// is missing or unreadable.
    ///
    /// # Errors
    ///
    /// Returns an error only if the bootstrap scan cannot list the store.
    #[instrument(skip(path, store), fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>, store: &dyn MemoryStore) -> Result<Self> {
        let path = path.as_ref();
        match Self::read_file(path) {
            Ok(Some(entries)) => {
                tracing::debug!(entries = entries.len(), "Loaded dedup table");
                Ok(Self {
                    path: path.to_path_buf(),
                    entries,
                })
            },
            Ok(None) => Self::bootstrap(path, store),
            Err(e) => {
                tracing::warn!(error = %e, "Dedup table unreadable, rebuilding from memory store");
                Self::bootstrap(path, store)
            },
        }
    }

    /// Rebuilds the table by hashing every stored item.
    ///
    /// Files that cannot be read are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be listed.
    pub fn bootstrap(path: impl Into<PathBuf>, store: &dyn MemoryStore) -> Result<Self> {
        let mut table = Self::new(path);
        for file in store.list_all()? {
            match store.read(&file.path) {
                Ok(content) => {
                    table.record(
                        ContentHasher::hash(&content),
                        file.file_name(),
                        file.category,
                    );
                },
                Err(e) => {
                    tracing::warn!(path = %file.path.display(), error = %e, "Skipping unreadable memory file");
                },
            }
        }
        tracing::info!(entries = table.len(), "Bootstrapped dedup table");
        Ok(table)
    }

    fn read_file(path: &Path) -> Result<Option<BTreeMap<String, DuplicateOf>>> {
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::operation("read_dedup_index", e))?;
        let file: DedupFile = serde_json::from_str(&contents)
            .map_err(|e| Error::operation("parse_dedup_index", e))?;
        Ok(Some(file.entries))
    }

    /// Hashes text the same way stored items are hashed.
    #[must_use]
    pub fn hash(text: &str) -> String {
        ContentHasher::hash(text)
    }

    /// Returns true if `hash` is already stored.
    #[must_use]
    pub fn contains(&self, hash: &str) -> bool {
        self.entries.contains_key(hash)
    }

    /// Returns the provenance recorded for `hash`.
    #[must_use]
    pub fn get(&self, hash: &str) -> Option<&DuplicateOf> {
        self.entries.get(hash)
    }

    /// Records that `hash` is stored as `file` under `category`.
    pub fn record(&mut self, hash: impl Into<String>, file: impl Into<String>, category: Category) {
        self.entries.insert(
            hash.into(),
            DuplicateOf {
                file: file.into(),
                category,
            },
        );
    }

    /// Number of known hashes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no hash is known.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Location of the persisted table.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes the whole table, replacing the previous file atomically.
    ///
    /// # Errors
    ///
    /// Returns an error if the table cannot be serialized or written.
    pub fn save(&self) -> Result<()> {
        let file = DedupFile {
            entries: self.entries.clone(),
        };
        let json = serde_json::to_vec_pretty(&file)
            .map_err(|e| Error::operation("serialize_dedup_index", e))?;
        write_atomic(&self.path, &json)?;
        tracing::debug!(path = %self.path.display(), entries = self.len(), "Saved dedup table");
        Ok(())
    }
}
