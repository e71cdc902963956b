//! Header label normalization.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Normalize a header label for keyword matching: lower-cased, decomposed
/// (NFD), combining marks removed, trimmed.
///
/// `"Hjärtfrekvens"` and `"HJARTFREKVENS "` both become `"hjartfrekvens"`.
pub fn normalize_label(label: &str) -> String {
    label
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .trim()
        .to_string()
}
