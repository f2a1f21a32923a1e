//! Context command handlers.

use aurora_memory::config::{AuroraConfig, ContextMode};
use aurora_memory::models::Category;
use aurora_memory::services::{CanonicalSummarizer, ContextBuilderService, ContextOptions};

/// Context command.
pub fn cmd_context(
    config: &AuroraConfig,
    query: Option<&str>,
    mode: ContextMode,
) -> Result<(), Box<dyn std::error::Error>> {
    let service = ContextBuilderService::from_config(config);
    let context = service.build_context(query, &ContextOptions::for_mode(mode))?;

    if context.is_empty() {
        tracing::info!("No memory context available");
    } else {
        println!("{context}");
    }
    Ok(())
}

/// Prompt command.
pub fn cmd_prompt(
    config: &AuroraConfig,
    query: &str,
    mode: ContextMode,
) -> Result<(), Box<dyn std::error::Error>> {
    let service = ContextBuilderService::from_config(config);
    let prompt = service.build_prompt_with_memory(query, &ContextOptions::for_mode(mode))?;
    println!("{prompt}");
    Ok(())
}

/// Canonical command.
pub fn cmd_canonical(
    config: &AuroraConfig,
    category: Category,
    rebuild: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let canonical = CanonicalSummarizer::from_config(config);
    let digest = if rebuild {
        canonical.invalidate(category)?;
        canonical.build(category)?
    } else {
        canonical.get_or_build(category)?
    };

    if digest.is_empty() {
        println!("No {category} items to summarize.");
    } else {
        println!("{digest}");
    }
    Ok(())
}
