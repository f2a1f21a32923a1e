//! # Aurora Memory
//!
//! A durable, file-backed memory corpus for a conversational agent.
//!
//! Raw conversation dumps are segmented, deduplicated by content hash,
//! classified into categories and written to disk one file per segment.
//! A derived index is rebuilt when the corpus changes and searched with
//! TF-IDF cosine ranking to assemble bounded context for a generator.
//!
//! ## Features
//!
//! - Segmentation with model-assisted, marker and paragraph strategies
//! - Corpus-wide SHA-256 deduplication with a self-healing dedup table
//! - Staleness-checked JSON index with summaries and tags
//! - Lexical TF-IDF retrieval scoped by category
//! - Cached canonical digests per category
//! - Prompt-injection line stripping on every read path
//!
//! ## Example
//!
//! ```rust,ignore
//! use aurora_memory::{AuroraConfig, ContextBuilderService, ContextOptions};
//!
//! let config = AuroraConfig::load_default();
//! let context = ContextBuilderService::from_config(&config);
//! let text = context.build_context(Some("cafe"), &ContextOptions::default())?;
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![allow(clippy::multiple_crate_versions)]

use thiserror::Error as ThisError;

// Module declarations
pub mod cli;
pub mod config;
pub mod llm;
pub mod models;
pub mod observability;
pub mod security;
pub mod services;
pub mod storage;

// Re-exports for convenience
pub use config::{AuroraConfig, ContextMode, FeatureFlags};
pub use llm::LlmProvider;
pub use models::{
    Category, IndexEntry, IngestLogEntry, IngestReport, IngestStatus, MemoryIndex, MemoryItem,
    Segment,
};
pub use services::{
    CanonicalSummarizer, Classifier, ContextBuilderService, ContextOptions, DedupStore,
    IndexBuilder, IngestPipeline, MemoryClassifier, RetrievalService, Segmenter,
};
pub use storage::{Clock, FilesystemStore, MemoryStore, SystemClock};

/// Error type for memory engine operations.
///
/// # Error Variant Triggers
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `InvalidInput` | Unknown category names, unsafe file names, malformed config values |
/// | `OperationFailed` | Filesystem I/O, JSON encoding, HTTP calls to the generation backend |
///
/// Classification failures are not represented here; they travel as
/// [`services::ClassificationError`] and degrade the item to
/// [`Category::Unclassified`].
#[derive(Debug, ThisError)]
pub enum Error {
    /// Invalid input was provided.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An operation failed.
    ///
    /// Raised when:
    /// - Memory, index, dedup or digest files cannot be read or written
    /// - JSON serialization fails
    /// - The generation backend is unreachable or returns an error status
    #[error("operation '{operation}' failed: {cause}")]
    OperationFailed {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },
}

impl Error {
    /// Builds an [`Error::OperationFailed`] from an operation name and a cause.
    pub fn operation(operation: &str, cause: impl std::fmt::Display) -> Self {
        Self::OperationFailed {
            operation: operation.to_string(),
            cause: cause.to_string(),
        }
    }
}

/// Result type alias for memory engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Returns the current Unix timestamp in fractional seconds.
///
/// Falls back to `0.0` if the system clock is before the Unix epoch.
///
/// # Examples
///
/// ```rust
/// use aurora_memory::current_timestamp;
///
/// assert!(current_timestamp() > 0.0);
/// ```
#[must_use]
pub fn current_timestamp() -> f64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}
