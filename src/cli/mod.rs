//! Library support for the command-line interface.
//!
//! The binary in `main.rs` owns argument parsing and printing; everything
//! it needs to wire services together lives here so it can be tested.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `ingest` | Segment, deduplicate, classify and store the data directory |
//! | `index` | Rebuild the memory index if stale (or always with `--force`) |
//! | `search` | Rank memory items against a query |
//! | `context` | Print the assembled memory context |
//! | `prompt` | Print the context followed by the user turn |
//! | `canonical` | Print or rebuild a category digest |
//! | `status` | Show corpus and cache status |
//! | `completions` | Generate shell completions |
//!
//! # Example Usage
//!
//! ```bash
//! # Ingest every dump under ./data
//! aurora-memory ingest
//!
//! # Search long-term memory only
//! aurora-memory search "cafe" -c long_term -k 3
//!
//! # Build a prompt in precise mode
//! aurora-memory prompt "o que eu gosto de beber?" --mode precise
//! ```

mod llm_factory;
mod status;

pub use llm_factory::{build_llm_provider, build_ollama_client};
pub use status::{IndexStatus, StatusReport, collect_status};
