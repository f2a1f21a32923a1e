//! Memory store backends.
//!
//! - [`FilesystemStore`]: one directory per category under the memory root
//! - [`InMemoryStore`]: volatile store with clock-driven modification times

mod filesystem;
mod memory;

pub use filesystem::FilesystemStore;
pub use memory::InMemoryStore;
