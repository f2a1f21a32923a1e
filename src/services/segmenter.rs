//! Document segmentation.
//!
//! A raw conversation dump is split into candidate memories using the
//! first strategy that works:
//!
//! 1. Backend-assisted split into `{category, source, data}` objects
//! 2. Explicit `>>>` turn markers, when they yield more than one segment
//! 3. Blank-line paragraph boundaries
//!
//! Short segments are dropped unless that would leave nothing.
// Allow expect() on static regex patterns - these are guaranteed to compile
#![allow(clippy::expect_used)]

use crate::config::AuroraConfig;
use crate::llm::{LlmProvider, extract_json_array};
use crate::models::Segment;
use regex::Regex;
use serde_json::Value;
use std::sync::{Arc, LazyLock};
use tracing::instrument;

/// Turn delimiter at the start of a line.
static MARKER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*>>>\s*").expect("static regex: turn marker"));

/// Blank line, possibly containing whitespace.
static PARAGRAPH_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*\n").expect("static regex: paragraph break"));

/// Splits documents into segments.
pub struct Segmenter {
    llm: Option<Arc<dyn LlmProvider>>,
    min_segment_len: usize,
}

impl Segmenter {
    /// Default minimum segment length in characters.
    pub const DEFAULT_MIN_SEGMENT_LEN: usize = 10;

    /// Creates a deterministic segmenter (markers and paragraphs only).
    #[must_use]
    pub fn new() -> Self {
        Self {
            llm: None,
            min_segment_len: Self::DEFAULT_MIN_SEGMENT_LEN,
        }
    }

    /// Creates a segmenter from configuration.
    ///
    /// The backend is only consulted when the splitter feature is enabled.
    #[must_use]
    pub fn from_config(config: &AuroraConfig, llm: Option<Arc<dyn LlmProvider>>) -> Self {
        Self {
            llm: llm.filter(|_| config.features.llm_splitter),
            min_segment_len: config.segmenter.min_segment_len,
        }
    }

    /// Enables the backend-assisted split.
    #[must_use]
    pub fn with_llm(mut self, llm: Arc<dyn LlmProvider>) -> Self {
        self.llm = Some(llm);
        self
    }

    /// Sets the minimum segment length.
    #[must_use]
    pub const fn with_min_segment_len(mut self, len: usize) -> Self {
        self.min_segment_len = len;
        self
    }

    /// Splits `raw` into segments.
    ///
    /// Empty or whitespace-only input yields no segments. Otherwise at
    /// least one segment is returned.
    #[instrument(skip(self, raw), fields(len = raw.len()))]
    pub fn segment(&self, raw: &str) -> Vec<Segment> {
        let content = raw.replace("\r\n", "\n");
        let content = content.trim();
        if content.is_empty() {
            return Vec::new();
        }

        if let Some(llm) = &self.llm {
            if let Some(segments) = self.split_with_llm(llm.as_ref(), content) {
                tracing::debug!(segments = segments.len(), "Using backend-assisted split");
                return segments;
            }
        }

        let mut parts = split_non_empty(&MARKER_PATTERN, content);
        if parts.len() <= 1 {
            parts = split_non_empty(&PARAGRAPH_PATTERN, content);
        }

        let long_enough: Vec<&str> = parts
            .iter()
            .copied()
            .filter(|p| p.chars().count() >= self.min_segment_len)
            .collect();
        let kept = if long_enough.is_empty() { parts } else { long_enough };

        kept.into_iter().map(Segment::plain).collect()
    }

    fn split_with_llm(&self, llm: &dyn LlmProvider, content: &str) -> Option<Vec<Segment>> {
        let response = match llm.complete(&split_prompt(content)) {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!(provider = llm.name(), error = %e, "Backend split failed, falling back");
                return None;
            },
        };

        let Some(items) = extract_json_array(&response) else {
            tracing::debug!(provider = llm.name(), "Backend split returned no JSON array");
            return None;
        };

        let segments: Vec<Segment> = items
            .iter()
            .filter_map(|item| self.segment_from_json(item))
            .collect();
        if segments.is_empty() {
            None
        } else {
            Some(segments)
        }
    }

    fn segment_from_json(&self, item: &Value) -> Option<Segment> {
        let text = item.get("data").and_then(Value::as_str)?.trim();
        if text.chars().count() < self.min_segment_len {
            return None;
        }
        let hint = |key: &str| item.get(key).and_then(Value::as_str).map(str::to_string);
        Some(Segment {
            text: text.to_string(),
            category_hint: hint("category"),
            provenance_hint: hint("source"),
        })
    }
}

impl Default for Segmenter {
    fn default() -> Self {
        Self::new()
    }
}

fn split_non_empty<'a>(pattern: &Regex, content: &'a str) -> Vec<&'a str> {
    pattern
        .split(content)
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect()
}

fn split_prompt(content: &str) -> String {
    format!(
        "Separe o texto em mensagens individuais e retorne apenas JSON valido.\n\
         Formato: [{{\"category\":\"identity|short_term|long_term\",\
         \"source\":\"user|assistant\",\"data\":\"...\"}}]\n\
         Texto:\n{content}"
    )
}
