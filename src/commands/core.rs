//! Core command handlers.
//!
//! Contains the implementation of core CLI commands:
//! ingest, index, search, status.

use std::path::PathBuf;
use std::sync::Arc;

use aurora_memory::cli::{IndexStatus, build_llm_provider, collect_status};
use aurora_memory::config::AuroraConfig;
use aurora_memory::models::Category;
use aurora_memory::services::{
    CanonicalSummarizer, IndexBuilder, IngestPipeline, RetrievalService, truncate_item,
};
use aurora_memory::storage::{FilesystemStore, MemoryStore};

/// Width of the item preview printed by `search`.
const PREVIEW_CHARS: usize = 100;

/// Ingest command.
pub fn cmd_ingest(
    config: &AuroraConfig,
    data_dir: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut pipeline = IngestPipeline::from_config(config, build_llm_provider(config));
    if let Some(dir) = data_dir {
        pipeline = pipeline.with_data_dir(dir);
    }

    let report = pipeline.run_from_data_dir()?;

    // Digests of categories that grew are out of date.
    let canonical = CanonicalSummarizer::from_config(config);
    for (&category, _) in report.stored.iter().filter(|(_, n)| **n > 0) {
        if let Err(e) = canonical.invalidate(category) {
            tracing::warn!(category = %category, error = %e, "Failed to invalidate digest");
        }
    }

    println!("Ingestion complete:");
    println!(
        "  Documents: {} seen, {} ignored",
        report.documents_seen, report.documents_ignored
    );
    for category in Category::all() {
        println!("  {category}: {}", report.stored_in(*category));
    }
    println!("  Duplicates skipped: {}", report.duplicates);
    if report.errors > 0 {
        println!("  Classification errors: {}", report.errors);
    }

    Ok(())
}

/// Index command.
pub fn cmd_index(config: &AuroraConfig, force: bool) -> Result<(), Box<dyn std::error::Error>> {
    let index = IndexBuilder::from_config(config).build(force)?;
    println!(
        "Index ready: {} entries ({})",
        index.count,
        config.index_path().display()
    );
    Ok(())
}

/// Search command.
pub fn cmd_search(
    config: &AuroraConfig,
    query: &str,
    categories: &[Category],
    top_k: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let results = RetrievalService::from_config(config).search(query, categories, top_k)?;

    println!("Found {} memories:", results.len());
    println!();
    for entry in &results {
        println!("  {} ({})", entry.path, entry.category);
        println!("    {}", truncate_item(&entry.summary, PREVIEW_CHARS));
        if !entry.tags.is_empty() {
            println!("    tags: {}", entry.tags.join(", "));
        }
    }

    Ok(())
}

/// Status command.
pub fn cmd_status(config: &AuroraConfig) -> Result<(), Box<dyn std::error::Error>> {
    let store: Arc<dyn MemoryStore> = Arc::new(FilesystemStore::new(&config.memory_dir));
    let status = collect_status(config, store)?;

    println!("Aurora Memory Status");
    println!("====================");
    println!();
    println!("Memory dir: {}", status.memory_dir.display());
    println!("Data dir:   {}", status.data_dir.display());
    println!("Mode:       {}", status.mode);
    match (&status.backend_model, status.backend_reachable) {
        (Some(model), Some(true)) => println!("Backend:    ollama ({model}), reachable"),
        (Some(model), _) => println!("Backend:    ollama ({model}), unreachable"),
        (None, _) => println!("Backend:    disabled"),
    }
    println!();

    println!("Items ({} total):", status.total_items());
    for (category, count) in &status.counts {
        println!("  {category}: {count}");
    }
    println!();

    match status.index {
        IndexStatus::Missing => println!("Index:  not built"),
        IndexStatus::Corrupt => println!("Index:  unreadable (will be rebuilt)"),
        IndexStatus::Current { entries } => println!("Index:  current, {entries} entries"),
        IndexStatus::Stale { entries } => println!("Index:  stale, {entries} entries"),
    }
    match status.dedup_entries {
        Some(n) => println!("Dedup:  {n} hashes"),
        None => println!("Dedup:  not built"),
    }
    if status.canonical_cached.is_empty() {
        println!("Digests: none cached");
    } else {
        let cached: Vec<&str> = status.canonical_cached.iter().map(Category::as_str).collect();
        println!("Digests: {}", cached.join(", "));
    }

    Ok(())
}
