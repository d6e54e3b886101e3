//! Fixed typesetting data emitted into converted books.
//!
//! Everything the converter injects (font-face declarations, writing-mode rules,
//! descriptor metadata values) is declared here as static data. The rewriters only
//! render and splice it; none of it is derived from the input book.

use lazy_static::lazy_static;

/// A single `@font-face` declaration resolving a family name to locally installed fonts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontFace {
    /// Family name exposed to stylesheets.
    pub family: &'static str,
    /// Whether this face is the bold variant of the family.
    pub bold: bool,
    /// Platform font names, tried in order via `local()`.
    pub sources: &'static [&'static str],
}

impl FontFace {
    const fn regular(family: &'static str, sources: &'static [&'static str]) -> Self {
        Self {
            family,
            bold: false,
            sources,
        }
    }

    const fn bold(family: &'static str, sources: &'static [&'static str]) -> Self {
        Self {
            family,
            bold: true,
            sources,
        }
    }

    /// Renders the declaration as a single CSS line (without trailing newline).
    pub fn to_css(&self) -> String {
        let sources = self
            .sources
            .iter()
            .map(|name| format!("local(\"{}\")", name))
            .collect::<Vec<_>>()
            .join(", ");
        let weight = if self.bold { " font-weight: bold;" } else { "" };
        format!(
            "@font-face {{ font-family: \"{}\";{} src: {}; }}",
            self.family, weight, sources
        )
    }
}

/// Traditional Chinese, Simplified Chinese and Japanese faces available on e-ink readers.
pub const FONT_FACES: &[FontFace] = &[
    FontFace::regular("宋體繁", &["STSongTC-Light", "STSongTC"]),
    FontFace::bold("宋體繁", &["STSongTC-Bold"]),
    FontFace::regular("黑體繁", &["STHeitiTC-Light", "STHeitiTC"]),
    FontFace::bold("黑體繁", &["STHeitiTC-Medium"]),
    FontFace::regular("楷體繁", &["STKaitiTC", "STKaitiTC-Regular"]),
    FontFace::bold("楷體繁", &["STKaitiTC-Bold"]),
    FontFace::regular("圓體繁", &["STYuanTC-Light", "STYuanTC"]),
    FontFace::bold("圓體繁", &["STYuanTC-Bold"]),
    FontFace::regular("宋體", &["STSong", "STSong-Regular"]),
    FontFace::regular("黑體", &["STHeiti", "STHeiti-Regular"]),
    FontFace::regular("楷體", &["STKai", "STKai-Regular"]),
    FontFace::regular("圓體", &["STYuan", "STYuan-Regular"]),
    FontFace::regular("TBMincho", &["TBMincho-Regular"]),
    FontFace::regular("TBGothic", &["TBGothic-Regular"]),
    FontFace::regular("TsukushiMincho", &["TsukushiMincho-Regular"]),
];

/// The target presentation a book is converted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerticalProfile {
    /// Value written to `dc:language`.
    pub language: &'static str,
    /// `name` of the descriptor `meta` entry carrying the writing mode.
    pub writing_mode_key: &'static str,
    /// CSS `writing-mode` value, also used as the meta `content`.
    pub writing_mode: &'static str,
    /// Value of the spine's `page-progression-direction` attribute.
    pub page_progression_direction: &'static str,
    /// Default family for `body` and `p`.
    pub body_font: &'static str,
    /// Default family for `h1`..`h6`.
    pub heading_font: &'static str,
    /// Default family for block quotes.
    pub blockquote_font: &'static str,
}

impl VerticalProfile {
    /// Vertical right-to-left Traditional Chinese, as read on Kindle devices.
    pub const TRADITIONAL_CHINESE: VerticalProfile = VerticalProfile {
        language: "zh-tw",
        writing_mode_key: "primary-writing-mode",
        writing_mode: "vertical-rl",
        page_progression_direction: "rtl",
        body_font: "宋體繁",
        heading_font: "黑體繁",
        blockquote_font: "楷體繁",
    };

    /// Renders the `@font-face` block prepended to every stylesheet.
    pub fn font_face_css(&self) -> String {
        let mut css = String::new();
        for face in FONT_FACES {
            css.push_str(&face.to_css());
            css.push('\n');
        }
        css
    }

    /// Renders the writing-mode and default font rules appended to every stylesheet.
    ///
    /// Vendor-prefixed `writing-mode` variants are included for older WebKit and
    /// EPUB 2 renderers.
    pub fn writing_mode_css(&self) -> String {
        format!(
            "body {{\n  writing-mode: {mode};\n  -webkit-writing-mode: {mode};\n  -epub-writing-mode: {mode};\n}}\n\
             body, p {{\n  font-family: \"{body}\";\n}}\n\
             h1, h2, h3, h4, h5, h6 {{\n  font-family: \"{heading}\";\n}}\n\
             blockquote, blockquote p {{\n  font-family: \"{quote}\";\n}}\n",
            mode = self.writing_mode,
            body = self.body_font,
            heading = self.heading_font,
            quote = self.blockquote_font,
        )
    }
}

impl Default for VerticalProfile {
    fn default() -> Self {
        Self::TRADITIONAL_CHINESE
    }
}

lazy_static! {
    /// Rendered font-face block of the default profile.
    pub static ref FONT_FACE_CSS: String = VerticalProfile::TRADITIONAL_CHINESE.font_face_css();
    /// Rendered writing-mode block of the default profile.
    pub static ref WRITING_MODE_CSS: String =
        VerticalProfile::TRADITIONAL_CHINESE.writing_mode_css();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regular_face_css() {
        let face = FontFace::regular("宋體繁", &["STSongTC-Light", "STSongTC"]);
        assert_eq!(
            face.to_css(),
            "@font-face { font-family: \"宋體繁\"; src: local(\"STSongTC-Light\"), local(\"STSongTC\"); }"
        );
    }

    #[test]
    fn test_bold_face_css() {
        let face = FontFace::bold("黑體繁", &["STHeitiTC-Medium"]);
        assert_eq!(
            face.to_css(),
            "@font-face { font-family: \"黑體繁\"; font-weight: bold; src: local(\"STHeitiTC-Medium\"); }"
        );
    }

    #[test]
    fn test_font_face_block_has_one_line_per_face() {
        let css = FONT_FACE_CSS.as_str();
        assert_eq!(css.lines().count(), FONT_FACES.len());
        assert!(css.lines().all(|l| l.starts_with("@font-face {")));
        assert!(css.ends_with('\n'));
    }

    #[test]
    fn test_writing_mode_block() {
        let css = WRITING_MODE_CSS.as_str();
        assert!(css.starts_with("body {\n  writing-mode: vertical-rl;\n"));
        assert!(css.contains("-webkit-writing-mode: vertical-rl;"));
        assert!(css.contains("-epub-writing-mode: vertical-rl;"));
        assert!(css.contains("body, p {\n  font-family: \"宋體繁\";\n}"));
        assert!(css.contains("h1, h2, h3, h4, h5, h6 {\n  font-family: \"黑體繁\";\n}"));
        assert!(css.ends_with("blockquote, blockquote p {\n  font-family: \"楷體繁\";\n}\n"));
    }
}
