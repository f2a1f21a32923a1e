//! Business logic services.
//!
//! Services orchestrate the memory store and derived caches:
//!
//! - [`IngestPipeline`]: validate, segment, dedup, classify, store
//! - [`IndexBuilder`]: staleness-checked projection of the store
//! - [`RetrievalService`]: TF-IDF ranking over the index
//! - [`CanonicalSummarizer`]: cached per-category digests
//! - [`ContextBuilderService`]: bounded context for the generator

mod canonical;
mod classifier;
mod context;
pub mod deduplication;
mod index_builder;
mod ingest;
mod loader;
mod retrieval;
mod segmenter;
mod text;
mod validation;

pub use canonical::CanonicalSummarizer;
pub use classifier::{
    Classification, ClassificationError, Classifier, MemoryClassifier, Provenance,
};
pub use context::{ContextBuilderService, ContextOptions};
pub use deduplication::{ContentHasher, DedupStore};
pub use index_builder::{IndexBuilder, has_removed_entries, is_outdated, is_stale};
pub use ingest::IngestPipeline;
pub use loader::load_memory;
pub use retrieval::{RetrievalService, ScoredEntry, TermVector, cosine_similarity, rank};
pub use segmenter::Segmenter;
pub use text::{extract_tags, tokenize, truncate_item};
pub use validation::{
    DocumentValidator, MIN_DOCUMENT_LEN, Rejection, ValidDocument, read_data_files,
};
