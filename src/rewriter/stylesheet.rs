//! Stylesheet rewriting: global `font-family` removal plus the vertical typesetting blocks.

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::Result;
use crate::profile::{FONT_FACE_CSS, WRITING_MODE_CSS};
use crate::rewriter::Rewriter;
use crate::types::EntryKind;

lazy_static! {
    /// A `font-family` declaration through its semicolon, with indentation and one trailing newline.
    static ref FONT_FAMILY_RULE: Regex = Regex::new(r"[ \t]*font-family\s*:[^;]*;\n?").unwrap();
}

/// Removes every terminated `font-family` declaration from stylesheet text.
pub fn strip_font_family_rules(css: &str) -> String {
    FONT_FAMILY_RULE.replace_all(css, "").into_owned()
}

/// Wraps stylesheets between a fixed prelude and epilogue after stripping their font families.
#[derive(Debug, Clone, PartialEq)]
pub struct StylesheetRewriter {
    prelude: String,
    epilogue: String,
}

impl StylesheetRewriter {
    /// Creates a rewriter with custom constant blocks.
    ///
    /// # Arguments
    ///
    /// * `prelude` - Text placed before the stripped stylesheet (font-face declarations)
    /// * `epilogue` - Text placed after it (writing-mode and default font rules)
    pub fn new(prelude: impl Into<String>, epilogue: impl Into<String>) -> Self {
        Self {
            prelude: prelude.into(),
            epilogue: epilogue.into(),
        }
    }

    pub fn prelude(&self) -> &str {
        &self.prelude
    }

    pub fn epilogue(&self) -> &str {
        &self.epilogue
    }

    /// Strips `font-family` declarations and wraps the result in the constant blocks.
    ///
    /// A leading byte order mark is dropped, as it would otherwise end up mid-file.
    pub fn wrap(&self, css: &str) -> String {
        let css = css.strip_prefix('\u{feff}').unwrap_or(css);
        let stripped = strip_font_family_rules(css);
        let mut out =
            String::with_capacity(self.prelude.len() + stripped.len() + self.epilogue.len() + 2);
        out.push_str(&self.prelude);
        out.push('\n');
        out.push_str(&stripped);
        out.push('\n');
        out.push_str(&self.epilogue);
        out
    }
}

impl Default for StylesheetRewriter {
    fn default() -> Self {
        Self::new(FONT_FACE_CSS.as_str(), WRITING_MODE_CSS.as_str())
    }
}

impl Rewriter for StylesheetRewriter {
    fn kind(&self) -> EntryKind {
        EntryKind::Stylesheet
    }

    fn rewrite(&self, content: &str) -> Result<String> {
        Ok(self.wrap(content))
    }
}
