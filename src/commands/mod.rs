//! Command handlers.
//!
//! - `core.rs`: ingestion, indexing, search and status
//! - `context.rs`: context assembly, prompts and canonical digests

mod context;
mod core;

pub use context::{cmd_canonical, cmd_context, cmd_prompt};
pub use core::{cmd_index, cmd_ingest, cmd_search, cmd_status};
