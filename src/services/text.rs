//! Text utilities shared by indexing, retrieval and context assembly.
// Allow expect() on static regex patterns - these are guaranteed to compile
#![allow(clippy::expect_used)]

use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

/// Runs of at least three word characters (letters, digits, underscore).
static TOKEN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\w{3,}").expect("static regex: token pattern"));

/// Splits text into lowercase index terms.
///
/// Word characters are Unicode-aware, so accented terms such as `café`
/// stay whole. An ASCII-only tokenizer would split them (`caf`), so terms
/// differ from an index built that way.
///
/// # Example
///
/// ```rust
/// use aurora_memory::services::tokenize;
///
/// assert_eq!(tokenize("Eu gosto de CAFÉ!"), vec!["gosto", "café"]);
/// ```
#[must_use]
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    TOKEN_PATTERN
        .find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Flattens text to one line and caps it at `max_len` characters.
///
/// Longer text keeps its first `max_len - 3` characters followed by `...`.
#[must_use]
pub fn truncate_item(text: &str, max_len: usize) -> String {
    let flat = text.trim().replace('\n', " ");
    if flat.chars().count() <= max_len {
        return flat;
    }
    let mut out: String = flat.chars().take(max_len.saturating_sub(3)).collect();
    out.push_str("...");
    out
}

/// Returns the up-to-`max_tags` most frequent terms of `text`.
///
/// Ordered by frequency descending, ties broken alphabetically.
#[must_use]
pub fn extract_tags(text: &str, max_tags: usize) -> Vec<String> {
    let mut freq: HashMap<String, usize> = HashMap::new();
    for token in tokenize(text) {
        *freq.entry(token).or_insert(0) += 1;
    }
    let mut ranked: Vec<(String, usize)> = freq.into_iter().collect();
    ranked.sort_by(|(a_term, a_count), (b_term, b_count)| {
        b_count.cmp(a_count).then_with(|| a_term.cmp(b_term))
    });
    ranked
        .into_iter()
        .take(max_tags)
        .map(|(term, _)| term)
        .collect()
}
