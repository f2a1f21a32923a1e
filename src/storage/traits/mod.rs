//! Storage traits.

mod store;

pub use store::{MAX_NAME_ATTEMPTS, MemoryStore, StoredFile, alternate_name};
