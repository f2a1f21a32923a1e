//! Text folding for pattern matching.

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Lowercases `text` and strips diacritics.
///
/// Compatibility decomposition (NFKD) splits accented letters into a base
/// letter plus combining marks; the marks are dropped.
///
/// # Example
///
/// ```rust
/// use aurora_memory::security::fold_diacritics;
///
/// assert_eq!(fold_diacritics("Instruções Anteriores"), "instrucoes anteriores");
/// ```
#[must_use]
pub fn fold_diacritics(text: &str) -> String {
    text.nfkd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_folds_portuguese() {
        assert_eq!(fold_diacritics("Você DEVE"), "voce deve");
        assert_eq!(fold_diacritics("profissão"), "profissao");
        assert_eq!(fold_diacritics("ação rápida"), "acao rapida");
    }

    #[test]
    fn test_ascii_passthrough() {
        assert_eq!(fold_diacritics("plain text 123"), "plain text 123");
    }
}
