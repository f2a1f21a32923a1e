//! Content-hash deduplication.
//!
//! Every stored segment is identified by the SHA-256 of its trimmed text.
//! The dedup table maps those hashes to the stored file and its category,
//! corpus-wide: identical text is stored once whatever category it would
//! have been filed under.
//!
//! ```text
//! segment ──► ContentHasher::hash ──► DedupStore::contains?
//!                                        │ yes: log duplicate, skip
//!                                        │ no:  classify, store, record
//!                                        ▼
//!                         dedup_index.json (saved once per run)
//! ```
//!
//! The table is an auxiliary cache. A missing or corrupt file is rebuilt by
//! hashing every stored item with the same [`ContentHasher`].

mod hasher;
mod store;

pub use hasher::ContentHasher;
pub use store::DedupStore;
