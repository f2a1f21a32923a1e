//! Ingestion audit types.

use super::Category;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Outcome recorded for a document or segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IngestStatus {
    /// The document failed validation and was skipped.
    Ignored,
    /// The segment's content hash was already known.
    Duplicate,
    /// The segment was classified and stored.
    Ok,
    /// Classification failed; the segment was stored as unclassified.
    Error,
}

/// Provenance of the already-stored copy of a duplicate segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateOf {
    /// Stored file name.
    pub file: String,
    /// Category of the stored file.
    #[serde(rename = "type")]
    pub category: Category,
}

/// One line of the append-only ingest log.
///
/// Write-once audit record; never read back for rebuilding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestLogEntry {
    /// When the event was recorded.
    pub ts: DateTime<Utc>,
    /// Source document name.
    pub file: String,
    /// 1-based segment index.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segment: Option<usize>,
    /// Number of segments in the document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segments_total: Option<usize>,
    /// Outcome.
    pub status: IngestStatus,
    /// Category the segment was stored under.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    /// Classification error, when the segment was forced to unclassified.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Who decided the category (`splitter`, `heuristic`, `model`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Speaker named by a model-assisted split (`user`, `assistant`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker: Option<String>,
    /// Stored file name, when a taken name forced an alternate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stored_as: Option<String>,
    /// Why a document was ignored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// The stored copy a duplicate matched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dup_of: Option<DuplicateOf>,
}

impl IngestLogEntry {
    /// Creates an entry for `file` with the current timestamp.
    #[must_use]
    pub fn new(file: impl Into<String>, status: IngestStatus) -> Self {
        Self {
            ts: Utc::now(),
            file: file.into(),
            segment: None,
            segments_total: None,
            status,
            category: None,
            error: None,
            source: None,
            speaker: None,
            stored_as: None,
            reason: None,
            dup_of: None,
        }
    }

    /// Sets the segment position.
    #[must_use]
    pub const fn with_segment(mut self, index: usize, total: usize) -> Self {
        self.segment = Some(index);
        self.segments_total = Some(total);
        self
    }

    /// Sets the stored category.
    #[must_use]
    pub const fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    /// Sets the classification error.
    #[must_use]
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// Sets the classification source.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Sets the speaker, if the splitter named one.
    #[must_use]
    pub fn with_speaker(mut self, speaker: Option<impl Into<String>>) -> Self {
        self.speaker = speaker.map(Into::into);
        self
    }

    /// Sets the file name the item was actually stored under.
    #[must_use]
    pub fn with_stored_as(mut self, file_name: impl Into<String>) -> Self {
        self.stored_as = Some(file_name.into());
        self
    }

    /// Sets the rejection reason.
    #[must_use]
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Sets the matched duplicate.
    #[must_use]
    pub fn with_dup_of(mut self, dup_of: DuplicateOf) -> Self {
        self.dup_of = Some(dup_of);
        self
    }
}

/// Summary of an ingestion run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Documents offered to the pipeline.
    pub documents_seen: usize,
    /// Documents rejected by validation.
    pub documents_ignored: usize,
    /// Newly stored items per category.
    pub stored: BTreeMap<Category, usize>,
    /// Segments skipped as duplicates.
    pub duplicates: usize,
    /// Segments whose classification failed.
    pub errors: usize,
}

impl IngestReport {
    /// Returns the number of items stored under `category`.
    #[must_use]
    pub fn stored_in(&self, category: Category) -> usize {
        self.stored.get(&category).copied().unwrap_or(0)
    }

    /// Returns the total number of newly stored items.
    #[must_use]
    pub fn total_stored(&self) -> usize {
        self.stored.values().sum()
    }

    pub(crate) fn record_stored(&mut self, category: Category) {
        *self.stored.entry(category).or_insert(0) += 1;
    }
}
