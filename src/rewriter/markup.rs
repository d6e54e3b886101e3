//! Inline font stripping for XHTML/HTML content documents.
//!
//! Start tags are found with a lenient pattern over the raw text instead of a full
//! parse, so content documents that are not well-formed still convert. Everything
//! outside a targeted `style` attribute value is passed through byte for byte.

use lazy_static::lazy_static;
use regex::{Captures, Regex};

use crate::error::Result;
use crate::rewriter::Rewriter;
use crate::rewriter::inline_style::{FONT_FAMILY, strip_font_family};
use crate::types::EntryKind;
use crate::xml::local_part;

lazy_static! {
    /// A start tag: name (optionally prefixed), optional attribute text, optional self-closing slash.
    static ref START_TAG: Regex = Regex::new(r"<([a-zA-Z][\w:-]*)(\s[^>]*)?\s*/?>").unwrap();
    /// `h1` through `h6`, any case.
    static ref HEADING: Regex = Regex::new(r"(?i)^h[1-6]$").unwrap();
    /// A `style` attribute with matching quotes, and the whitespace that precedes it.
    static ref STYLE_ATTRIBUTE: Regex =
        Regex::new(r#"(\s)style=(?:"([^"]*)"|'([^']*)')"#).unwrap();
}

/// Whether `tag_name` (prefix ignored) is a heading element.
pub fn is_heading(tag_name: &str) -> bool {
    HEADING.is_match(local_part(tag_name))
}

/// Strips `font-family` from the inline styles of every non-heading element.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkupRewriter;

impl MarkupRewriter {
    pub fn new() -> Self {
        Self
    }

    /// Rewrites every start tag of `document`, leaving all other text untouched.
    pub fn strip_inline_fonts(&self, document: &str) -> String {
        START_TAG
            .replace_all(document, |caps: &Captures<'_>| {
                let name = &caps[1];
                let attributes = caps.get(2).map_or("", |m| m.as_str());
                match rewrite_attributes(name, attributes) {
                    Some(rewritten) => format!("<{}{}>", name, rewritten),
                    None => caps[0].to_string(),
                }
            })
            .into_owned()
    }
}

impl Rewriter for MarkupRewriter {
    fn kind(&self) -> EntryKind {
        EntryKind::Markup
    }

    fn rewrite(&self, content: &str) -> Result<String> {
        Ok(self.strip_inline_fonts(content))
    }
}

/// Returns the new attribute text of a tag, or `None` when the tag is left as is.
fn rewrite_attributes(tag_name: &str, attributes: &str) -> Option<String> {
    if is_heading(tag_name) || !attributes.contains(FONT_FAMILY) {
        return None;
    }

    let style = STYLE_ATTRIBUTE.captures(attributes)?;
    let whole = style.get(0)?;
    let (quote, value) = match (style.get(2), style.get(3)) {
        (Some(double), _) => ('"', double.as_str()),
        (None, Some(single)) => ('\'', single.as_str()),
        (None, None) => return None,
    };

    let cleaned = strip_font_family(value);
    let head = &attributes[..whole.start()];
    let mut tail = &attributes[whole.end()..];

    let mut rewritten = String::with_capacity(attributes.len());
    rewritten.push_str(head);
    if cleaned.is_empty() {
        // collapse the space run formed where the attribute was removed
        if head.ends_with(' ') {
            tail = tail.trim_start_matches(' ');
        }
    } else {
        rewritten.push_str(&style[1]);
        rewritten.push_str("style=");
        rewritten.push(quote);
        rewritten.push_str(&cleaned);
        rewritten.push(quote);
    }
    rewritten.push_str(tail);
    Some(rewritten)
}
