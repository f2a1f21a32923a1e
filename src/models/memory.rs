//! Memory items and ingestion segments.

use super::Category;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored memory item.
///
/// Immutable once written. Its identity is the content hash of its trimmed
/// text, shared across all categories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryItem {
    /// The memory text.
    pub text: String,
    /// The category the item is filed under.
    pub category: Category,
    /// Name of the source document the item was extracted from.
    pub source_file: String,
    /// When the item was written.
    pub created_at: DateTime<Utc>,
}

impl MemoryItem {
    /// Creates a memory item stamped with the current time.
    #[must_use]
    pub fn new(text: impl Into<String>, category: Category, source_file: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            category,
            source_file: source_file.into(),
            created_at: Utc::now(),
        }
    }

    /// Derives the stored file name for segment `index` of `source_file`.
    ///
    /// The layout is `{category}_{stem}_part{index}{ext}`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use aurora_memory::{Category, MemoryItem};
    ///
    /// let item = MemoryItem::new("text", Category::LongTerm, "chat_01_02_2024.txt");
    /// assert_eq!(item.file_name(3), "long_term_chat_01_02_2024_part3.txt");
    /// ```
    #[must_use]
    pub fn file_name(&self, index: usize) -> String {
        let path = std::path::Path::new(&self.source_file);
        let stem = path
            .file_stem()
            .map_or_else(|| self.source_file.clone(), |s| s.to_string_lossy().into_owned());
        let ext = path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();
        format!("{}_{stem}_part{index}{ext}", self.category.as_str())
    }
}

/// A candidate memory produced by the segmenter.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Segment {
    /// Segment text, trimmed.
    pub text: String,
    /// Category suggested by a model-assisted split, unvalidated.
    pub category_hint: Option<String>,
    /// Speaker suggested by a model-assisted split (`user`, `assistant`).
    pub provenance_hint: Option<String>,
}

impl Segment {
    /// Creates a segment with no hints.
    #[must_use]
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            category_hint: None,
            provenance_hint: None,
        }
    }

    /// Returns the category hint if it is exactly an assignable category name.
    ///
    /// Spelling variants accepted by [`Category::parse`] are not accepted
    /// here.
    #[must_use]
    pub fn valid_category_hint(&self) -> Option<Category> {
        let hint = self.category_hint.as_deref()?;
        Category::parse_assignable(hint).filter(|c| c.as_str() == hint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name_layout() {
        let item = MemoryItem::new("x", Category::Identity, "notes_10_11_2023.txt");
        assert_eq!(item.file_name(1), "identity_notes_10_11_2023_part1.txt");
    }

    #[test]
    fn test_file_name_without_extension() {
        let item = MemoryItem::new("x", Category::ShortTerm, "raw");
        assert_eq!(item.file_name(2), "short_term_raw_part2");
    }

    #[test]
    fn test_valid_category_hint() {
        let mut segment = Segment::plain("hello there friend");
        assert_eq!(segment.valid_category_hint(), None);

        segment.category_hint = Some("long_term".to_string());
        assert_eq!(segment.valid_category_hint(), Some(Category::LongTerm));

        segment.category_hint = Some("unclassified".to_string());
        assert_eq!(segment.valid_category_hint(), None);

        segment.category_hint = Some("identity|short_term".to_string());
        assert_eq!(segment.valid_category_hint(), None);
    }

    #[test]
    fn test_category_hint_must_match_exactly() {
        for hint in ["Short-Term", " LONG_TERM ", "long-term", "Identity", "shortterm"] {
            let segment = Segment {
                category_hint: Some(hint.to_string()),
                ..Segment::plain("texto qualquer aqui")
            };
            assert_eq!(segment.valid_category_hint(), None, "{hint:?} should be rejected");
        }
    }
}
