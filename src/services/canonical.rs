//! Canonical per-category digests.
//!
//! A digest is a bulleted list of the most recent items of a category,
//! each flattened and truncated. Digests are cached on disk until
//! explicitly invalidated; there is no staleness check.

use crate::config::{AuroraConfig, CanonicalSettings};
use crate::models::Category;
use crate::services::loader::load_memory;
use crate::services::text::truncate_item;
use crate::storage::{FilesystemStore, MemoryStore, write_atomic};
use crate::{Error, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::instrument;

/// Builds and caches canonical digests.
pub struct CanonicalSummarizer {
    store: Arc<dyn MemoryStore>,
    dir: PathBuf,
    settings: CanonicalSettings,
}

impl CanonicalSummarizer {
    /// Creates a summarizer caching digests under `dir`.
    #[must_use]
    pub fn new(store: Arc<dyn MemoryStore>, dir: impl Into<PathBuf>) -> Self {
        Self {
            store,
            dir: dir.into(),
            settings: CanonicalSettings::default(),
        }
    }

    /// Creates a filesystem-backed summarizer from configuration.
    #[must_use]
    pub fn from_config(config: &AuroraConfig) -> Self {
        Self::new(
            Arc::new(FilesystemStore::new(&config.memory_dir)),
            config.canonical_dir(),
        )
        .with_settings(config.canonical)
    }

    /// Sets the item limit and bullet length.
    #[must_use]
    pub const fn with_settings(mut self, settings: CanonicalSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Path of a category's cached digest.
    #[must_use]
    pub fn path(&self, category: Category) -> PathBuf {
        self.dir.join(format!("{category}.txt"))
    }

    /// Returns the cached digest, or an empty string if there is none.
    #[must_use]
    pub fn load(&self, category: Category) -> String {
        let path = self.path(category);
        if !path.exists() {
            return String::new();
        }
        match std::fs::read_to_string(&path) {
            Ok(content) => content.trim().to_string(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Unreadable canonical digest");
                String::new()
            },
        }
    }

    /// Builds a digest from the freshest items and caches it.
    ///
    /// An empty category yields an empty digest and writes no file.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be listed or the digest cannot
    /// be written.
    #[instrument(skip(self), fields(category = %category))]
    pub fn build(&self, category: Category) -> Result<String> {
        let items = load_memory(self.store.as_ref(), category, Some(self.settings.limit))?;
        if items.is_empty() {
            tracing::debug!("No items to digest");
            return Ok(String::new());
        }

        let digest = items
            .iter()
            .map(|item| format!("- {}", truncate_item(item, self.settings.item_len)))
            .collect::<Vec<_>>()
            .join("\n");

        write_atomic(&self.path(category), digest.as_bytes())?;
        metrics::counter!("canonical_builds_total", "category" => category.as_str()).increment(1);
        tracing::info!(items = items.len(), "Built canonical digest");
        Ok(digest)
    }

    /// Returns the cached digest, building it first if absent or empty.
    ///
    /// # Errors
    ///
    /// See [`CanonicalSummarizer::build`].
    pub fn get_or_build(&self, category: Category) -> Result<String> {
        let cached = self.load(category);
        if !cached.is_empty() {
            return Ok(cached);
        }
        self.build(category)
    }

    /// Deletes the cached digest. Returns true if a file was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be removed.
    pub fn invalidate(&self, category: Category) -> Result<bool> {
        let path = self.path(category);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(Error::operation(
                "remove_canonical_digest",
                format!("{}: {e}", path.display()),
            )),
        }
    }
}
