//! Recency-ordered reads of stored memory.

use crate::models::Category;
use crate::security::InjectionFilter;
use crate::storage::MemoryStore;
use crate::Result;

/// Loads a category's items, most recently modified first.
///
/// Items are trimmed and sanitized; items that sanitize to empty and files
/// that cannot be read are skipped. `limit` caps the number of files read,
/// `None` reads them all.
///
/// # Errors
///
/// Returns an error if the category cannot be listed.
pub fn load_memory(
    store: &dyn MemoryStore,
    category: Category,
    limit: Option<usize>,
) -> Result<Vec<String>> {
    let filter = InjectionFilter::new();
    let files = store.list_recent(category, limit)?;
    Ok(files
        .iter()
        .filter_map(|file| match store.read(&file.path) {
            Ok(raw) => Some(filter.sanitize(raw.trim())),
            Err(e) => {
                tracing::debug!(path = %file.path.display(), error = %e, "Skipping unreadable memory file");
                None
            },
        })
        .filter(|text| !text.is_empty())
        .collect())
}
