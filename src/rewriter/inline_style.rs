//! Removal of `font-family` declarations from inline `style` attribute values.

use lazy_static::lazy_static;
use regex::Regex;

/// The CSS property removed from inline styles.
pub const FONT_FAMILY: &str = "font-family";

lazy_static! {
    /// A `font-family` declaration with any leading whitespace, up to and including its
    /// terminating semicolon (or the end of the value).
    static ref FONT_FAMILY_DECLARATION: Regex =
        Regex::new(r"\s*font-family\s*:[^;]*;?").unwrap();
}

/// Removes every `font-family` declaration from a `style` attribute value.
///
/// The result is trimmed. An empty result means the caller should drop the
/// attribute altogether rather than emit `style=""`.
pub fn strip_font_family(style: &str) -> String {
    FONT_FAMILY_DECLARATION
        .replace_all(style, "")
        .trim()
        .to_string()
}
