//! Memory classification.
//!
//! Classification never fails the pipeline: the outcome is a tagged result
//! whose error side tells the caller why the item must fall back to
//! [`Category::Unclassified`].
// Allow expect() on static regex patterns - these are guaranteed to compile
#![allow(clippy::expect_used)]

use crate::config::AuroraConfig;
use crate::llm::LlmProvider;
use crate::models::Category;
use crate::security::fold_diacritics;
use regex::RegexSet;
use std::fmt;
use std::sync::{Arc, LazyLock};
use tracing::instrument;

/// Statements about the speaker, matched on diacritics-folded text.
static IDENTITY_PATTERNS: LazyLock<RegexSet> = LazyLock::new(|| {
    RegexSet::new([
        r"\bmeu nome e\b",
        r"\bme chamo\b",
        r"\beu sou\b",
        r"\beu tenho \d+ anos\b",
        r"\bminha idade\b",
        r"\beu moro\b",
        r"\bminha profissao\b",
        r"\btrabalho como\b",
        r"\beu gosto de\b",
        r"\bmeus? hobbies?\b",
    ])
    .expect("static regex: identity patterns")
});

/// Who decided a segment's category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    /// Category hint from a backend-assisted split.
    Splitter,
    /// Identity heuristic.
    Heuristic,
    /// Backend classification prompt.
    Model,
}

impl Provenance {
    /// Returns the name written to the ingest log.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Splitter => "splitter",
            Self::Heuristic => "heuristic",
            Self::Model => "model",
        }
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a segment could not be classified.
///
/// The `Display` form is the error string recorded in the ingest log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassificationError {
    /// The backend answered with nothing.
    EmptyResponse,
    /// The backend failed; the message starts with `error:`.
    Backend(String),
    /// The first line of the answer is not an assignable category.
    Unrecognized(String),
    /// No backend is configured and the heuristic did not match.
    NoModel,
}

impl fmt::Display for ClassificationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyResponse => f.write_str("empty_response"),
            Self::Backend(message) => f.write_str(message),
            Self::Unrecognized(line) => write!(f, "unrecognized_response:{line}"),
            Self::NoModel => f.write_str("no_model_configured"),
        }
    }
}

impl std::error::Error for ClassificationError {}

/// Outcome of classifying one segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// The category, or why none could be assigned.
    pub result: Result<Category, ClassificationError>,
    /// Who produced the outcome.
    pub provenance: Provenance,
}

impl Classification {
    /// A successful classification.
    #[must_use]
    pub const fn ok(category: Category, provenance: Provenance) -> Self {
        Self {
            result: Ok(category),
            provenance,
        }
    }

    /// A failed classification.
    #[must_use]
    pub const fn failed(error: ClassificationError, provenance: Provenance) -> Self {
        Self {
            result: Err(error),
            provenance,
        }
    }

    /// Category to store under: the assigned one, or `Unclassified`.
    #[must_use]
    pub const fn category(&self) -> Category {
        match self.result {
            Ok(category) => category,
            Err(_) => Category::Unclassified,
        }
    }
}

/// Assigns a category to segment text.
pub trait Classifier: Send + Sync {
    /// Classifies `text`.
    fn classify(&self, text: &str) -> Classification;
}

/// Default classifier: identity heuristic first, then the backend.
pub struct MemoryClassifier {
    llm: Option<Arc<dyn LlmProvider>>,
}

impl MemoryClassifier {
    /// Creates a heuristic-only classifier.
    #[must_use]
    pub const fn heuristic_only() -> Self {
        Self { llm: None }
    }

    /// Creates a classifier backed by `llm`.
    #[must_use]
    pub fn new(llm: Arc<dyn LlmProvider>) -> Self {
        Self { llm: Some(llm) }
    }

    /// Creates a classifier from configuration.
    ///
    /// The backend is only consulted when the classifier feature is enabled.
    #[must_use]
    pub fn from_config(config: &AuroraConfig, llm: Option<Arc<dyn LlmProvider>>) -> Self {
        Self {
            llm: llm.filter(|_| config.features.llm_classifier),
        }
    }

    /// Returns true if `text` states something about the speaker.
    #[must_use]
    pub fn looks_like_identity(text: &str) -> bool {
        IDENTITY_PATTERNS.is_match(&fold_diacritics(text))
    }

    /// Interprets a backend answer.
    #[must_use]
    pub fn parse_response(response: &str) -> Result<Category, ClassificationError> {
        let response = response.trim().to_lowercase();
        if response.is_empty() {
            return Err(ClassificationError::EmptyResponse);
        }
        if response.starts_with("error:") {
            return Err(ClassificationError::Backend(response));
        }

        let first_line = response.lines().next().unwrap_or_default().trim();
        Category::parse_assignable(first_line)
            .filter(|c| c.as_str() == first_line)
            .ok_or_else(|| ClassificationError::Unrecognized(first_line.to_string()))
    }
}

impl Classifier for MemoryClassifier {
    #[instrument(skip(self, text), fields(len = text.len()))]
    fn classify(&self, text: &str) -> Classification {
        if Self::looks_like_identity(text) {
            return Classification::ok(Category::Identity, Provenance::Heuristic);
        }

        let Some(llm) = &self.llm else {
            return Classification::failed(ClassificationError::NoModel, Provenance::Model);
        };

        let result = match llm.complete(&classify_prompt(text)) {
            Ok(response) => Self::parse_response(&response),
            Err(e) => {
                tracing::warn!(provider = llm.name(), error = %e, "Classification request failed");
                Err(ClassificationError::Backend(format!("error:{e}")))
            },
        };
        Classification {
            result,
            provenance: Provenance::Model,
        }
    }
}

fn classify_prompt(content: &str) -> String {
    format!(
        "\nClassifique o texto abaixo em APENAS UM dos tipos:\n\n\
         identity\nshort_term\nlong_term\n\n\
         Responda apenas com o nome do tipo.\n\n\
         Texto:\n{content}\n"
    )
}
