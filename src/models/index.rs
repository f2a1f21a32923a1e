//! Derived search index types.

use super::Category;
use serde::{Deserialize, Serialize};

/// One indexed memory file.
///
/// A pure projection of a stored item; never authoritative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    /// Path of the memory file.
    pub path: String,
    /// Category the file is stored under.
    #[serde(rename = "type")]
    pub category: Category,
    /// Modification time of the file (seconds since epoch).
    pub mtime: f64,
    /// Single-line summary, at most 200 characters.
    pub summary: String,
    /// Most frequent tokens, at most 8.
    pub tags: Vec<String>,
    /// Sanitized full text.
    #[serde(rename = "text", alias = "full_text")]
    pub full_text: String,
}

/// The persisted memory index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryIndex {
    /// When the index was built (seconds since epoch).
    #[serde(alias = "index_mtime")]
    pub build_timestamp: f64,
    /// Number of entries.
    pub count: usize,
    /// Indexed entries.
    pub entries: Vec<IndexEntry>,
}

impl MemoryIndex {
    /// Creates an index from entries, deriving `count`.
    #[must_use]
    pub fn new(build_timestamp: f64, entries: Vec<IndexEntry>) -> Self {
        Self {
            build_timestamp,
            count: entries.len(),
            entries,
        }
    }

    /// Returns entries whose category is in `categories`.
    ///
    /// An empty slice matches every entry.
    #[must_use]
    pub fn filtered(&self, categories: &[Category]) -> Vec<&IndexEntry> {
        self.entries
            .iter()
            .filter(|e| categories.is_empty() || categories.contains(&e.category))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(category: Category) -> IndexEntry {
        IndexEntry {
            path: format!("/m/{category}/a.txt"),
            category,
            mtime: 1.0,
            summary: "s".to_string(),
            tags: vec![],
            full_text: "s".to_string(),
        }
    }

    #[test]
    fn test_json_shape() {
        let index = MemoryIndex::new(42.5, vec![entry(Category::LongTerm)]);
        let value = serde_json::to_value(&index).unwrap();
        assert_eq!(value["count"], 1);
        assert_eq!(value["build_timestamp"], 42.5);
        assert_eq!(value["entries"][0]["type"], "long_term");
        assert_eq!(value["entries"][0]["text"], "s");
    }

    #[test]
    fn test_reads_legacy_keys() {
        let json = r#"{"index_mtime": 7.0, "count": 0, "entries": []}"#;
        let index: MemoryIndex = serde_json::from_str(json).unwrap();
        assert!((index.build_timestamp - 7.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_filtered() {
        let index = MemoryIndex::new(
            0.0,
            vec![entry(Category::ShortTerm), entry(Category::LongTerm)],
        );
        assert_eq!(index.filtered(&[]).len(), 2);
        assert_eq!(index.filtered(&[Category::LongTerm]).len(), 1);
        assert!(index.filtered(&[Category::Identity]).is_empty());
    }
}
