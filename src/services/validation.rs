//! Source document discovery and validation.
// Allow expect() on static regex patterns - these are guaranteed to compile
#![allow(clippy::expect_used)]

use crate::{Error, Result};
use regex::Regex;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// `<name>_<DD>_<MM>_<YYYY>.txt`
static FILENAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^.+_\d{2}_\d{2}_\d{4}\.txt$").expect("static regex: source file name")
});

/// Minimum trimmed content length of a source document.
pub const MIN_DOCUMENT_LEN: usize = 10;

/// Why a source document was rejected.
///
/// The `Display` form is the `reason` recorded in the ingest log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// The file name does not follow the dated naming convention.
    InvalidFilename,
    /// The file could not be read as UTF-8 text.
    ReadError(String),
    /// Trimmed content is shorter than [`MIN_DOCUMENT_LEN`].
    ContentTooShort,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidFilename => f.write_str("invalid_filename"),
            Self::ReadError(e) => write!(f, "read_error:{e}"),
            Self::ContentTooShort => f.write_str("content_too_short"),
        }
    }
}

/// A source document that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidDocument {
    /// File name of the source.
    pub file_name: String,
    /// Trimmed content.
    pub content: String,
}

/// Validates source documents before ingestion.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentValidator;

impl DocumentValidator {
    /// Returns true if `name` follows `<name>_<DD>_<MM>_<YYYY>.txt`.
    #[must_use]
    pub fn is_valid_filename(name: &str) -> bool {
        FILENAME_PATTERN.is_match(name)
    }

    /// Validates the file at `path` and returns its trimmed content.
    ///
    /// # Errors
    ///
    /// Returns the [`Rejection`] reason when the document must be skipped.
    pub fn validate(&self, path: &Path) -> std::result::Result<ValidDocument, Rejection> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if !Self::is_valid_filename(&file_name) {
            return Err(Rejection::InvalidFilename);
        }

        let raw = std::fs::read_to_string(path).map_err(|e| Rejection::ReadError(e.to_string()))?;
        let content = raw.trim();
        if content.chars().count() < MIN_DOCUMENT_LEN {
            return Err(Rejection::ContentTooShort);
        }

        Ok(ValidDocument {
            file_name,
            content: content.to_string(),
        })
    }
}

/// Lists the `*.txt` regular files directly under `data_dir`, sorted by name.
///
/// A missing directory yields an empty list.
///
/// # Errors
///
/// Returns an error if the directory exists but cannot be read.
pub fn read_data_files(data_dir: &Path) -> Result<Vec<PathBuf>> {
    if !data_dir.is_dir() {
        tracing::warn!(path = %data_dir.display(), "Data directory not found");
        return Ok(Vec::new());
    }

    let entries = std::fs::read_dir(data_dir).map_err(|e| {
        Error::operation("read_data_dir", format!("{}: {e}", data_dir.display()))
    })?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(std::result::Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "txt"))
        .collect();
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use test_case::test_case;

    #[test_case("conversa_01_02_2024.txt", true ; "valid")]
    #[test_case("a_b_31_12_1999.txt", true ; "underscores in name")]
    #[test_case("_01_02_2024.txt", false ; "empty name")]
    #[test_case("conversa_1_02_2024.txt", false ; "single digit day")]
    #[test_case("conversa_01_02_24.txt", false ; "two digit year")]
    #[test_case("conversa_01_02_2024.txt.bak", false ; "trailing suffix")]
    #[test_case("conversa_01_02_2024.md", false ; "wrong extension")]
    #[test_case("conversa.txt", false ; "no date")]
    fn test_filename_validation(name: &str, expected: bool) {
        assert_eq!(DocumentValidator::is_valid_filename(name), expected);
    }

    #[test]
    fn test_validate_outcomes() {
        let dir = TempDir::new().unwrap();
        let good = dir.path().join("chat_01_02_2024.txt");
        std::fs::write(&good, "\n  conteudo suficiente  \n").unwrap();
        let short = dir.path().join("chat_02_02_2024.txt");
        std::fs::write(&short, "   curto   ").unwrap();
        let misnamed = dir.path().join("chat.txt");
        std::fs::write(&misnamed, "conteudo suficiente").unwrap();

        let validator = DocumentValidator;
        let doc = validator.validate(&good).unwrap();
        assert_eq!(doc.file_name, "chat_01_02_2024.txt");
        assert_eq!(doc.content, "conteudo suficiente");

        assert_eq!(validator.validate(&short), Err(Rejection::ContentTooShort));
        assert_eq!(validator.validate(&misnamed), Err(Rejection::InvalidFilename));

        let missing = dir.path().join("gone_01_01_2024.txt");
        let rejection = validator.validate(&missing).unwrap_err();
        assert!(rejection.to_string().starts_with("read_error:"));
    }

    #[test]
    fn test_read_data_files_sorted_txt_only() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("b_01_01_2024.txt"), "x").unwrap();
        std::fs::write(dir.path().join("a_01_01_2024.txt"), "x").unwrap();
        std::fs::write(dir.path().join("notes.md"), "x").unwrap();
        std::fs::create_dir(dir.path().join("nested.txt")).unwrap();

        let files = read_data_files(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a_01_01_2024.txt", "b_01_01_2024.txt"]);
    }

    #[test]
    fn test_read_data_files_missing_dir() {
        let dir = TempDir::new().unwrap();
        assert!(read_data_files(&dir.path().join("nope")).unwrap().is_empty());
    }
}
