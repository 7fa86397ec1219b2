//! Match-only text normalization.
//!
//! Text is lowercased, canonically decomposed (NFD) and stripped of nonspacing
//! marks, so `"Café"`, `"CAFE"` and `"cafe\u{301}"` all compare equal.
//! Spacing marks such as Devanagari vowel signs are kept: they distinguish
//! syllables rather than decorate a letter. The normalized form is never shown
//! to users.

use unicode_normalization::UnicodeNormalization;
use unicode_properties::{GeneralCategory, UnicodeGeneralCategory};

/// Accent- and case-insensitive form of `text`.
///
/// Lowercasing runs before decomposition: some lowercase mappings introduce
/// combining marks (`İ` lowercases to `i` + U+0307), and they must be stripped
/// in the same pass. The final NFD puts any marks left adjacent by the
/// filter back into canonical order, so the result is a fixed point.
pub fn normalize(text: &str) -> String {
    text.to_lowercase()
        .nfd()
        .filter(|c| !is_nonspacing_mark(*c))
        .nfd()
        .collect()
}

fn is_nonspacing_mark(c: char) -> bool {
    c.general_category() == GeneralCategory::NonspacingMark
}
