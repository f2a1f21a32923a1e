//! Data models for the memory engine.
//!
//! This module contains the core data structures shared by the ingestion
//! pipeline, the index builder and the retrieval path.

mod category;
mod index;
mod ingest;
mod memory;

pub use category::Category;
pub use index::{IndexEntry, MemoryIndex};
pub use ingest::{DuplicateOf, IngestLogEntry, IngestReport, IngestStatus};
pub use memory::{MemoryItem, Segment};
