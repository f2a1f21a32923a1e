//! Storage layer.
//!
//! The memory store is the single source of truth. Everything else written
//! under the memory root (index, dedup table, canonical digests) is a derived
//! cache that can be rebuilt from it:
//! - **Persistence**: one text file per memory item, one directory per category
//! - **Atomic files**: whole-file replace for derived JSON and digest caches
//! - **Ingest log**: append-only newline-delimited JSON audit trail

// Allow cast precision loss for timestamp conversions.
#![allow(clippy::cast_precision_loss)]

mod atomic;
mod clock;
mod ingest_log;
pub mod persistence;
pub mod traits;

pub use atomic::write_atomic;
pub use clock::{Clock, ManualClock, SystemClock};
pub use ingest_log::IngestLog;
pub use persistence::{FilesystemStore, InMemoryStore};
pub use traits::{MAX_NAME_ATTEMPTS, MemoryStore, StoredFile, alternate_name};
