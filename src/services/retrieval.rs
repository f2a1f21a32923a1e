//! Lexical TF-IDF retrieval.
//!
//! Vectors are computed fresh on every query over the category-filtered
//! entry set; nothing is cached between calls.
//!
//! - `tf(t, d) = count(t, d) / len(d)`
//! - `idf(t) = ln((1 + N) / (1 + df(t))) + 1`
//! - score = cosine similarity of the query and document weight maps
//!
//! Query terms absent from the corpus weigh zero. Entries scoring zero are
//! never returned.

// Allow cast precision loss for term counts.
#![allow(clippy::cast_precision_loss)]

use crate::config::AuroraConfig;
use crate::models::{Category, IndexEntry};
use crate::services::index_builder::IndexBuilder;
use crate::services::text::tokenize;
use crate::Result;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::time::Instant;
use tracing::instrument;

/// Sparse term-weight vector.
pub type TermVector = HashMap<String, f64>;

/// A ranked index entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredEntry<'a> {
    /// Cosine similarity to the query, in `(0, 1]`.
    pub score: f64,
    /// The matching entry.
    pub entry: &'a IndexEntry,
}

/// Cosine similarity of two sparse vectors.
///
/// Empty or zero-norm vectors score `0.0`.
#[must_use]
pub fn cosine_similarity(a: &TermVector, b: &TermVector) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let dot: f64 = a
        .iter()
        .filter_map(|(term, wa)| b.get(term).map(|wb| wa * wb))
        .sum();
    let norm_a = a.values().map(|v| v * v).sum::<f64>().sqrt();
    let norm_b = b.values().map(|v| v * v).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Term frequencies weighted by `idf`.
fn weigh(tokens: &[String], idf: &HashMap<String, f64>) -> TermVector {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for token in tokens {
        *counts.entry(token.as_str()).or_insert(0) += 1;
    }
    let len = tokens.len() as f64;
    counts
        .into_iter()
        .map(|(term, count)| {
            let weight = (count as f64 / len) * idf.get(term).copied().unwrap_or(0.0);
            (term.to_string(), weight)
        })
        .collect()
}

/// Ranks `entries` against `query`, most relevant first.
///
/// Ties keep the input order. At most `top_k` entries are returned.
#[must_use]
pub fn rank<'a>(entries: &[&'a IndexEntry], query: &str, top_k: usize) -> Vec<ScoredEntry<'a>> {
    let query_tokens = tokenize(query);
    if query_tokens.is_empty() || entries.is_empty() || top_k == 0 {
        return Vec::new();
    }

    let documents: Vec<Vec<String>> = entries.iter().map(|e| tokenize(&e.full_text)).collect();

    let mut doc_freq: HashMap<&str, usize> = HashMap::new();
    for tokens in &documents {
        let unique: HashSet<&str> = tokens.iter().map(String::as_str).collect();
        for term in unique {
            *doc_freq.entry(term).or_insert(0) += 1;
        }
    }
    let n_docs = documents.len() as f64;
    let idf: HashMap<String, f64> = doc_freq
        .into_iter()
        .map(|(term, df)| {
            let weight = ((1.0 + n_docs) / (1.0 + df as f64)).ln() + 1.0;
            (term.to_string(), weight)
        })
        .collect();

    let query_vector = weigh(&query_tokens, &idf);

    let mut scored: Vec<ScoredEntry<'a>> = entries
        .iter()
        .zip(&documents)
        .filter_map(|(entry, tokens)| {
            if tokens.is_empty() {
                return None;
            }
            let score = cosine_similarity(&query_vector, &weigh(tokens, &idf));
            (score > 0.0).then_some(ScoredEntry { score, entry })
        })
        .collect();

    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    scored.truncate(top_k);
    scored
}

/// Searches the memory index.
pub struct RetrievalService {
    index: IndexBuilder,
}

impl RetrievalService {
    /// Creates a service over an index builder.
    #[must_use]
    pub const fn new(index: IndexBuilder) -> Self {
        Self { index }
    }

    /// Creates a filesystem-backed service from configuration.
    #[must_use]
    pub fn from_config(config: &AuroraConfig) -> Self {
        Self::new(IndexBuilder::from_config(config))
    }

    /// Returns the underlying index builder.
    #[must_use]
    pub const fn index(&self) -> &IndexBuilder {
        &self.index
    }

    /// Returns up to `top_k` entries relevant to `query`.
    ///
    /// `categories` restricts the corpus; an empty slice searches every
    /// category. The index is rebuilt first if it is stale.
    ///
    /// # Errors
    ///
    /// Returns an error if the index cannot be built.
    #[instrument(skip(self), fields(categories = categories.len()))]
    pub fn search(
        &self,
        query: &str,
        categories: &[Category],
        top_k: usize,
    ) -> Result<Vec<IndexEntry>> {
        let start = Instant::now();
        let index = self.index.build(false)?;
        let entries = index.filtered(categories);
        let results: Vec<IndexEntry> = rank(&entries, query, top_k)
            .into_iter()
            .map(|scored| scored.entry.clone())
            .collect();

        let duration_ms = start.elapsed().as_secs_f64() * 1000.0;
        metrics::histogram!("memory_search_duration_ms").record(duration_ms);
        tracing::debug!(
            corpus = entries.len(),
            results = results.len(),
            duration_ms,
            "Searched memory"
        );
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(text: &str) -> IndexEntry {
        IndexEntry {
            path: format!("short_term/{}.txt", text.len()),
            category: Category::ShortTerm,
            mtime: 0.0,
            summary: text.to_string(),
            tags: Vec::new(),
            full_text: text.to_string(),
        }
    }

    fn texts<'a>(scored: &[ScoredEntry<'a>]) -> Vec<&'a str> {
        scored.iter().map(|s| s.entry.full_text.as_str()).collect()
    }

    #[test]
    fn test_query_matches_only_relevant_item() {
        let a = entry("eu gosto de cafe quente");
        let b = entry("o tempo esta chuvoso hoje");
        let ranked = rank(&[&a, &b], "cafe", 8);
        assert_eq!(texts(&ranked), vec!["eu gosto de cafe quente"]);
        assert!(ranked[0].score > 0.0);
    }

    #[test]
    fn test_more_overlap_ranks_higher() {
        let a = entry("rust tokio async runtime");
        let b = entry("rust compiler borrow checker");
        let ranked = rank(&[&b, &a], "tokio async rust", 8);
        assert_eq!(texts(&ranked)[0], "rust tokio async runtime");
    }

    #[test]
    fn test_top_k_and_empty_queries() {
        let a = entry("cafe cafe");
        let b = entry("cafe com leite");
        let c = entry("cafe preto");
        assert_eq!(rank(&[&a, &b, &c], "cafe", 2).len(), 2);
        assert!(rank(&[&a, &b], "de o a", 8).is_empty());
        assert!(rank(&[&a, &b], "cafe", 0).is_empty());
        assert!(rank(&[], "cafe", 8).is_empty());
    }

    #[test]
    fn test_ties_keep_input_order() {
        let a = entry("cafe xicara");
        let b = entry("cafe caneca");
        let ranked = rank(&[&a, &b], "cafe", 8);
        assert!((ranked[0].score - ranked[1].score).abs() < 1e-12);
        assert_eq!(texts(&ranked), vec!["cafe xicara", "cafe caneca"]);
    }

    #[test]
    fn test_unknown_terms_score_zero() {
        let a = entry("eu gosto de cafe quente");
        assert!(rank(&[&a], "chocolate", 8).is_empty());
    }

    #[test]
    fn test_single_document_corpus() {
        let a = entry("cafe quente");
        let ranked = rank(&[&a], "cafe", 8);
        assert_eq!(ranked.len(), 1);
    }

    #[test]
    fn test_cosine_edge_cases() {
        let empty = TermVector::new();
        let mut v = TermVector::new();
        v.insert("cafe".to_string(), 1.0);
        let mut zero = TermVector::new();
        zero.insert("cafe".to_string(), 0.0);

        assert!(cosine_similarity(&empty, &v).abs() < f64::EPSILON);
        assert!(cosine_similarity(&zero, &v).abs() < f64::EPSILON);
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-12);
    }
}
