//! Context builder service.
//!
//! Assembles bounded memory context for the generator. Sections appear in a
//! fixed order and are omitted when they have no content:
//!
//! ```text
//! IDENTITY MEMORY:      every identity item
//! IDENTITY SUMMARY:     identity canonical digest
//! SHORT-TERM MEMORY:    search hits, or the most recent items
//! LONG-TERM MEMORY:     search hits, or the most recent items
//! LONG-TERM SUMMARY:    long-term canonical digest
//! ```
//!
//! Memory is untrusted: every item passes through the injection filter
//! before it reaches the output.

use crate::config::{AuroraConfig, ContextMode};
use crate::models::Category;
use crate::services::canonical::CanonicalSummarizer;
use crate::services::index_builder::IndexBuilder;
use crate::services::loader::load_memory;
use crate::services::retrieval::RetrievalService;
use crate::services::text::truncate_item;
use crate::storage::{FilesystemStore, MemoryStore};
use crate::Result;
use std::sync::Arc;
use tracing::instrument;

/// Limits for one context build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextOptions {
    /// Maximum short-term items.
    pub short_term_limit: usize,
    /// Maximum long-term items.
    pub long_term_limit: usize,
    /// Search hits requested per tier.
    pub top_k: usize,
    /// Maximum characters per item line.
    pub max_item_chars: usize,
    /// Include canonical digests.
    pub include_canonical: bool,
    /// Rank by the query; otherwise use recency.
    pub use_search: bool,
    /// Cap on the whole context; overflow is cut and marked with `...`.
    pub max_context_chars: Option<usize>,
}

impl Default for ContextOptions {
    fn default() -> Self {
        Self {
            short_term_limit: 20,
            long_term_limit: 10,
            top_k: 8,
            max_item_chars: 400,
            include_canonical: true,
            use_search: true,
            max_context_chars: None,
        }
    }
}

impl ContextOptions {
    /// Returns the preset for `mode`.
    #[must_use]
    pub const fn for_mode(mode: ContextMode) -> Self {
        match mode {
            ContextMode::Fast => Self {
                short_term_limit: 1,
                long_term_limit: 0,
                top_k: 1,
                max_item_chars: 120,
                include_canonical: false,
                use_search: false,
                max_context_chars: Some(800),
            },
            ContextMode::Precise => Self {
                short_term_limit: 10,
                long_term_limit: 8,
                top_k: 8,
                max_item_chars: 360,
                include_canonical: true,
                use_search: true,
                max_context_chars: None,
            },
        }
    }
}

/// Service for building memory context.
pub struct ContextBuilderService {
    store: Arc<dyn MemoryStore>,
    retrieval: RetrievalService,
    canonical: CanonicalSummarizer,
    canonical_enabled: bool,
}

impl ContextBuilderService {
    /// Creates a context builder over explicit collaborators.
    #[must_use]
    pub const fn new(
        store: Arc<dyn MemoryStore>,
        retrieval: RetrievalService,
        canonical: CanonicalSummarizer,
    ) -> Self {
        Self {
            store,
            retrieval,
            canonical,
            canonical_enabled: true,
        }
    }

    /// Creates a filesystem-backed context builder from configuration.
    #[must_use]
    pub fn from_config(config: &AuroraConfig) -> Self {
        let store: Arc<dyn MemoryStore> = Arc::new(FilesystemStore::new(&config.memory_dir));
        let index = IndexBuilder::new(store.clone(), config.index_path()).with_settings(config.index);
        let canonical = CanonicalSummarizer::new(store.clone(), config.canonical_dir())
            .with_settings(config.canonical);
        Self {
            store,
            retrieval: RetrievalService::new(index),
            canonical,
            canonical_enabled: config.features.canonical,
        }
    }

    /// Returns the retrieval service.
    #[must_use]
    pub const fn retrieval(&self) -> &RetrievalService {
        &self.retrieval
    }

    /// Returns the canonical summarizer.
    #[must_use]
    pub const fn canonical(&self) -> &CanonicalSummarizer {
        &self.canonical
    }

    /// Builds the memory context.
    ///
    /// With a non-blank `query` and search enabled, short-term and long-term
    /// sections hold the top search hits of each tier; otherwise they hold
    /// the most recent items.
    ///
    /// # Errors
    ///
    /// Returns an error if the store or index cannot be read, or a digest
    /// cannot be written.
    #[instrument(skip(self, query), fields(has_query = query.is_some()))]
    pub fn build_context(&self, query: Option<&str>, options: &ContextOptions) -> Result<String> {
        let include_canonical = options.include_canonical && self.canonical_enabled;
        let query = query
            .filter(|q| !q.trim().is_empty())
            .filter(|_| options.use_search);
        let mut sections: Vec<String> = Vec::new();

        let identity = load_memory(self.store.as_ref(), Category::Identity, None)?;
        push_items(&mut sections, "IDENTITY MEMORY:", &identity, options.max_item_chars);

        if include_canonical {
            let digest = self.canonical.get_or_build(Category::Identity)?;
            push_digest(&mut sections, "IDENTITY SUMMARY:", &digest);
        }

        let (short_term, long_term) = match query {
            Some(query) => (
                self.search_texts(query, Category::ShortTerm, options.top_k, options.short_term_limit)?,
                self.search_texts(query, Category::LongTerm, options.top_k, options.long_term_limit)?,
            ),
            None => (
                load_memory(self.store.as_ref(), Category::ShortTerm, Some(options.short_term_limit))?,
                load_memory(self.store.as_ref(), Category::LongTerm, Some(options.long_term_limit))?,
            ),
        };
        push_items(&mut sections, "SHORT-TERM MEMORY:", &short_term, options.max_item_chars);
        push_items(&mut sections, "LONG-TERM MEMORY:", &long_term, options.max_item_chars);

        if include_canonical {
            let digest = self.canonical.get_or_build(Category::LongTerm)?;
            push_digest(&mut sections, "LONG-TERM SUMMARY:", &digest);
        }

        let context = sections.join("\n\n");
        Ok(match options.max_context_chars {
            Some(max) => cap_context(context, max),
            None => context,
        })
    }

    /// Builds a generator prompt: memory context followed by the query.
    ///
    /// Returns the bare query when there is no context.
    ///
    /// # Errors
    ///
    /// See [`ContextBuilderService::build_context`].
    pub fn build_prompt_with_memory(&self, query: &str, options: &ContextOptions) -> Result<String> {
        let context = self.build_context(Some(query), options)?;
        let context = context.trim();
        if context.is_empty() {
            return Ok(query.to_string());
        }
        Ok(format!("{context}\n\nUSER:\n{query}"))
    }

    fn search_texts(
        &self,
        query: &str,
        category: Category,
        top_k: usize,
        limit: usize,
    ) -> Result<Vec<String>> {
        Ok(self
            .retrieval
            .search(query, &[category], top_k)?
            .into_iter()
            .take(limit)
            .map(|entry| entry.full_text)
            .collect())
    }
}

/// Appends a header and one `- ` line per item, if there are items.
fn push_items(sections: &mut Vec<String>, header: &str, items: &[String], max_item_chars: usize) {
    if items.is_empty() {
        return;
    }
    let mut lines = vec![header.to_string()];
    lines.extend(
        items
            .iter()
            .map(|item| format!("- {}", truncate_item(item, max_item_chars))),
    );
    sections.push(lines.join("\n"));
}

/// Appends a header and a digest body, if the digest is non-empty.
fn push_digest(sections: &mut Vec<String>, header: &str, digest: &str) {
    if !digest.is_empty() {
        sections.push(format!("{header}\n{digest}"));
    }
}

/// Cuts `context` to `max` characters plus `...` if it is longer.
fn cap_context(context: String, max: usize) -> String {
    if context.chars().count() <= max {
        return context;
    }
    let mut capped: String = context.chars().take(max).collect();
    capped.push_str("...");
    capped
}
